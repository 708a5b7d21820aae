//! Capture controllers for the three attestation factors.
//!
//! Every browser or host capability (geolocation, Wi-Fi info, camera,
//! platform authenticator, randomness) sits behind a trait in [`platform`].
//! The controllers in this crate drive those capabilities and produce values
//! for the caller to merge into an [`attest_types::SessionRecord`]:
//!
//! - [`GeolocationAcquirer`]: one-shot coordinate fetch, degrading to
//!   `Unavailable` instead of failing.
//! - [`NetworkIdentityProbe`]: SSID and MAC, with a configurable fallback.
//! - [`FaceCaptureController`]: camera lifecycle state machine producing a
//!   PNG still.
//! - [`BiometricCaptureController`]: challenge-response credential ceremony
//!   producing an opaque proof token.

pub mod biometric;
pub mod error;
pub mod face;
pub mod geolocation;
pub mod network;
pub mod platform;
pub mod random;

pub use biometric::{BiometricCaptureController, BiometricChallenge, CHALLENGE_LEN};
pub use error::{BiometricError, CaptureError, LocationUnavailable, PlatformError};
pub use face::{CameraState, FaceCaptureController};
pub use geolocation::GeolocationAcquirer;
pub use network::{NetworkFallback, NetworkIdentityProbe};
pub use platform::{
    CredentialCreationOptions, FacingMode, Frame, GeolocationSource, MediaSource, MediaStream,
    NetworkInfoSource, PlatformAuthenticator, PlatformCredential, RandomSource, VideoConstraints,
    WifiReading,
};
pub use random::OsRandom;
