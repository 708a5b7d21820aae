use thiserror::Error;

/// Failure reported by a host capability.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PlatformError {
    #[error("capability not supported on this platform")]
    Unsupported,

    #[error("request denied: {0}")]
    Denied(String),

    #[error("request timed out")]
    TimedOut,

    #[error("{0}")]
    Failed(String),
}

/// The geolocation request did not produce coordinates.
///
/// Not fatal: rules that need a location decide whether absence is acceptable.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("location unavailable: {0}")]
pub struct LocationUnavailable(pub PlatformError);

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("camera unavailable: {0}")]
    Unavailable(String),

    #[error("camera access denied: {0}")]
    Denied(String),

    #[error("no video frame available")]
    NoFrame,

    #[error("failed to encode frame: {0}")]
    Encode(String),
}

impl CaptureError {
    /// Status line shown to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "Camera not supported on this device.",
            Self::Denied(_) => "Unable to access camera.",
            Self::NoFrame | Self::Encode(_) => "Unable to capture photo.",
        }
    }
}

#[derive(Debug, Error)]
pub enum BiometricError {
    #[error("platform authenticator not supported")]
    Unsupported,

    #[error("authenticator returned no credential")]
    NotVerified,

    #[error("biometric ceremony failed: {0}")]
    CeremonyFailed(String),

    #[error("challenge generation failed: {0}")]
    Randomness(String),
}

impl BiometricError {
    /// Status line shown to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Unsupported => "Fingerprint/WebAuthn not supported in this browser.",
            Self::NotVerified => "Fingerprint not verified.",
            Self::CeremonyFailed(_) | Self::Randomness(_) => {
                "Fingerprint authentication failed or was cancelled."
            }
        }
    }
}
