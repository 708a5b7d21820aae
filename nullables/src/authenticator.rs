//! Nullable platform authenticator: records ceremonies, returns canned
//! outcomes.

use async_trait::async_trait;
use attest_capture::platform::UserEntity;
use attest_capture::{CredentialCreationOptions, PlatformAuthenticator, PlatformCredential, PlatformError};
use std::sync::Mutex;
use std::time::Duration;

/// What a ceremony was asked to bind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CeremonyRequest {
    pub challenge: Vec<u8>,
    pub relying_party: String,
    pub user: UserEntity,
}

/// A platform authenticator for testing.
///
/// Returns pre-configured outcomes in order; the last one repeats.
pub struct NullAuthenticator {
    supported: bool,
    outcomes: Mutex<Vec<Result<Option<PlatformCredential>, PlatformError>>>,
    delay: Duration,
    ceremonies: Mutex<Vec<CeremonyRequest>>,
}

impl NullAuthenticator {
    /// Every ceremony succeeds.
    pub fn approving() -> Self {
        Self::with_outcomes(vec![Ok(Some(PlatformCredential {
            id: b"null-credential".to_vec(),
        }))])
    }

    /// The user cancels every ceremony.
    pub fn cancelling() -> Self {
        Self::with_outcomes(vec![Err(PlatformError::Denied(
            "The operation either timed out or was not allowed.".into(),
        ))])
    }

    /// The capability is absent.
    pub fn unsupported() -> Self {
        let mut auth = Self::approving();
        auth.supported = false;
        auth
    }

    pub fn with_outcomes(outcomes: Vec<Result<Option<PlatformCredential>, PlatformError>>) -> Self {
        Self {
            supported: true,
            outcomes: Mutex::new(outcomes),
            delay: Duration::ZERO,
            ceremonies: Mutex::new(Vec::new()),
        }
    }

    /// Settle each ceremony only after `delay`.
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Every ceremony run so far (for assertions).
    pub fn ceremonies(&self) -> Vec<CeremonyRequest> {
        self.ceremonies.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlatformAuthenticator for NullAuthenticator {
    fn is_supported(&self) -> bool {
        self.supported
    }

    async fn create_credential(
        &self,
        options: &CredentialCreationOptions<'_>,
    ) -> Result<Option<PlatformCredential>, PlatformError> {
        self.ceremonies.lock().unwrap().push(CeremonyRequest {
            challenge: options.challenge.to_vec(),
            relying_party: options.relying_party.to_string(),
            user: options.user.clone(),
        });
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let mut outcomes = self.outcomes.lock().unwrap();
        match outcomes.len() {
            0 => Ok(None),
            1 => outcomes[0].clone(),
            _ => outcomes.remove(0),
        }
    }

    fn name(&self) -> &str {
        "null-authenticator"
    }
}
