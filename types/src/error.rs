use thiserror::Error;

#[derive(Debug, Error)]
pub enum TypesError {
    #[error("unknown flow: {0} (expected \"check-in\" or \"enrolment\")")]
    UnknownFlow(String),

    #[error("invalid base64 payload: {0}")]
    InvalidBase64(String),
}
