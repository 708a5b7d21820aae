use attest_types::{Credentials, Flow};
use attest_validation::Verified;
use std::sync::Arc;
use tracing::{info, warn};

use crate::backend::{Backend, BackendRequest};
use crate::error::SubmissionError;
use crate::payload::{LoginPayload, SubmissionPayload, LOGIN_PATH, ROLE_HEADER};
use crate::response::{
    classify_check_in, classify_login, classify_register, LoginSuccess, SuccessMessage,
};

/// Sends verified records to the backend and classifies the replies.
///
/// One request per call. Retrying is left to the user.
pub struct SubmissionPipeline {
    backend: Arc<dyn Backend>,
}

impl SubmissionPipeline {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    pub async fn submit(&self, verified: Verified<'_>) -> Result<SuccessMessage, SubmissionError> {
        let record = verified.record();
        let payload = SubmissionPayload::from_record(record);
        let mut request = BackendRequest::new(payload.path(), payload.to_json());
        if matches!(payload, SubmissionPayload::CheckIn(_)) {
            request = request.with_header(ROLE_HEADER.0, ROLE_HEADER.1);
        }

        let flow = record.flow();
        let result = match self.backend.post_json(request).await {
            Ok(body) => match flow {
                Flow::CheckIn => classify_check_in(body),
                Flow::Enrolment => classify_register(body),
            },
            Err(e) => Err(e.into()),
        };

        match &result {
            Ok(message) => info!(%flow, %message, "submission accepted"),
            Err(e) => warn!(%flow, error = %e, "submission failed"),
        }
        result
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<LoginSuccess, SubmissionError> {
        let body = serde_json::to_value(LoginPayload::from(credentials))
            .map_err(|e| SubmissionError::Network(e.to_string()))?;
        let result = match self
            .backend
            .post_json(BackendRequest::new(LOGIN_PATH, body))
            .await
        {
            Ok(body) => classify_login(body),
            Err(e) => Err(e.into()),
        };

        match &result {
            Ok(_) => info!(email = %credentials.email, "login accepted"),
            Err(e) => warn!(email = %credentials.email, error = %e, "login failed"),
        }
        result
    }
}
