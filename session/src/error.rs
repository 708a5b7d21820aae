use attest_capture::{BiometricError, CaptureError};
use attest_submit::SubmissionError;
use attest_validation::{RuleId, ValidationFailure};
use thiserror::Error;

/// Every way a session step can fail. None of them end the session: the
/// user can retry the failed step and keep everything else.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttestError {
    /// The capability is missing on this host.
    #[error("capture unavailable: {0}")]
    CaptureUnavailable(String),

    /// The user or the platform refused.
    #[error("capture denied: {0}")]
    CaptureDenied(String),

    #[error("validation failed ({rule}): {message}")]
    ValidationFailed { rule: RuleId, message: String },

    #[error("network error: {0}")]
    NetworkError(String),

    #[error("server rejected: {0}")]
    ServerRejected(String),

    /// Submission is blocked until a pending capture settles.
    #[error("not ready: {0}")]
    NotReady(String),

    /// The session was deactivated while the step was running; its result
    /// was discarded.
    #[error("session is no longer active")]
    Inactive,

    #[error("config error: {0}")]
    Config(String),
}

impl AttestError {
    /// Status line shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::CaptureUnavailable(m)
            | Self::CaptureDenied(m)
            | Self::ServerRejected(m)
            | Self::NotReady(m) => m.clone(),
            Self::ValidationFailed { message, .. } => message.clone(),
            Self::NetworkError(_) => "Network error".to_string(),
            Self::Inactive => "Session closed.".to_string(),
            Self::Config(e) => format!("Configuration error: {e}"),
        }
    }
}

impl From<CaptureError> for AttestError {
    fn from(e: CaptureError) -> Self {
        let message = e.user_message().to_string();
        match e {
            CaptureError::Denied(_) => Self::CaptureDenied(message),
            CaptureError::Unavailable(_) | CaptureError::NoFrame | CaptureError::Encode(_) => {
                Self::CaptureUnavailable(message)
            }
        }
    }
}

impl From<BiometricError> for AttestError {
    fn from(e: BiometricError) -> Self {
        let message = e.user_message().to_string();
        match e {
            BiometricError::Unsupported => Self::CaptureUnavailable(message),
            BiometricError::NotVerified
            | BiometricError::CeremonyFailed(_)
            | BiometricError::Randomness(_) => Self::CaptureDenied(message),
        }
    }
}

impl From<ValidationFailure> for AttestError {
    fn from(f: ValidationFailure) -> Self {
        Self::ValidationFailed {
            rule: f.rule,
            message: f.message,
        }
    }
}

impl From<SubmissionError> for AttestError {
    fn from(e: SubmissionError) -> Self {
        match e {
            SubmissionError::Network(detail) => Self::NetworkError(detail),
            SubmissionError::ServerRejected(message) => Self::ServerRejected(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_errors_keep_their_status_lines() {
        let e: AttestError = CaptureError::Denied("NotAllowedError".into()).into();
        assert_eq!(e, AttestError::CaptureDenied("Unable to access camera.".into()));

        let e: AttestError = CaptureError::Unavailable("no camera".into()).into();
        assert_eq!(e.user_message(), "Camera not supported on this device.");

        let e: AttestError = BiometricError::Unsupported.into();
        assert!(matches!(e, AttestError::CaptureUnavailable(_)));
        assert_eq!(
            e.user_message(),
            "Fingerprint/WebAuthn not supported in this browser."
        );
    }

    #[test]
    fn submission_errors_surface_server_text_or_generic_network_error() {
        let e: AttestError = SubmissionError::ServerRejected("Already marked".into()).into();
        assert_eq!(e.user_message(), "Already marked");

        let e: AttestError = SubmissionError::Network("timed out".into()).into();
        assert_eq!(e.user_message(), "Network error");
    }
}
