use thiserror::Error;

/// Failure below the HTTP response: nothing usable came back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("backend unreachable: {0}")]
    Unreachable(String),

    #[error("request failed: {0}")]
    RequestFailed(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    /// Timeout, connection failure or unparseable response.
    #[error("network error: {0}")]
    Network(String),

    /// The backend answered and refused the submission.
    #[error("server rejected submission: {0}")]
    ServerRejected(String),
}

impl SubmissionError {
    /// Status line shown to the user: the server's words when it gave any.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => "Network error".to_string(),
            Self::ServerRejected(message) => message.clone(),
        }
    }
}

impl From<TransportError> for SubmissionError {
    fn from(e: TransportError) -> Self {
        Self::Network(e.to_string())
    }
}
