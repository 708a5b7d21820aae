//! Host capability surfaces consumed by the capture controllers.
//!
//! Implementations wrap whatever the host provides (browser APIs, mobile
//! plugins, files on disk). Test doubles live in `attest-nullables`.

use async_trait::async_trait;
use attest_types::Coordinates;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::PlatformError;

// ── Geolocation ─────────────────────────────────────────────────────────

/// One-shot position source.
#[async_trait]
pub trait GeolocationSource: Send + Sync {
    /// Ask the platform for the current position, exactly once.
    async fn current_position(&self) -> Result<Coordinates, PlatformError>;

    fn name(&self) -> &str;
}

// ── Network info ────────────────────────────────────────────────────────

/// Raw Wi-Fi details; either field may be missing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WifiReading {
    pub ssid: Option<String>,
    pub mac: Option<String>,
}

#[async_trait]
pub trait NetworkInfoSource: Send + Sync {
    async fn read(&self) -> Result<WifiReading, PlatformError>;

    fn name(&self) -> &str;
}

// ── Camera ──────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Front-facing camera.
    #[default]
    User,
    Environment,
}

/// Constraints passed with a camera request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoConstraints {
    #[serde(default)]
    pub facing_mode: FacingMode,
    #[serde(default = "default_width")]
    pub ideal_width: u32,
    #[serde(default = "default_height")]
    pub ideal_height: u32,
    #[serde(default = "default_width")]
    pub max_width: u32,
    #[serde(default = "default_height")]
    pub max_height: u32,
}

fn default_width() -> u32 {
    1920
}

fn default_height() -> u32 {
    1080
}

impl Default for VideoConstraints {
    fn default() -> Self {
        Self {
            facing_mode: FacingMode::User,
            ideal_width: default_width(),
            ideal_height: default_height(),
            max_width: default_width(),
            max_height: default_height(),
        }
    }
}

/// A decoded video frame, 8-bit RGBA, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Open a camera stream matching `constraints`.
    ///
    /// `Unsupported` when no camera API exists, `Denied` when the user or
    /// platform refuses.
    async fn open(
        &self,
        constraints: &VideoConstraints,
    ) -> Result<Box<dyn MediaStream>, PlatformError>;

    fn name(&self) -> &str;
}

/// A live camera stream. Owned exclusively by the face capture controller.
pub trait MediaStream: Send {
    /// The frame currently shown in the preview, if the stream produced one.
    fn current_frame(&mut self) -> Option<Frame>;

    /// Number of tracks that have not been stopped.
    fn active_tracks(&self) -> usize;

    /// Stop every track. Must be idempotent.
    fn stop_all_tracks(&mut self);
}

// ── Platform authenticator ──────────────────────────────────────────────

/// COSE identifier for ECDSA with SHA-256.
pub const ES256: i64 = -7;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthenticatorAttachment {
    Platform,
    CrossPlatform,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UserVerification {
    Required,
    Preferred,
    Discouraged,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttestationPreference {
    None,
    Indirect,
    Direct,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserEntity {
    /// Opaque 16-byte user handle.
    pub id: [u8; 16],
    pub name: String,
    pub display_name: String,
}

/// A credential-creation request. Borrows the single-use challenge.
#[derive(Debug)]
pub struct CredentialCreationOptions<'a> {
    pub challenge: &'a [u8],
    pub relying_party: &'a str,
    pub user: UserEntity,
    pub algorithm: i64,
    pub attachment: AuthenticatorAttachment,
    pub user_verification: UserVerification,
    pub timeout: Duration,
    pub attestation: AttestationPreference,
}

/// What the authenticator hands back on success.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlatformCredential {
    pub id: Vec<u8>,
}

#[async_trait]
pub trait PlatformAuthenticator: Send + Sync {
    /// Whether the platform offers a credential API at all.
    fn is_supported(&self) -> bool;

    /// Run the ceremony. `Ok(None)` means the platform completed without
    /// producing a credential.
    async fn create_credential(
        &self,
        options: &CredentialCreationOptions<'_>,
    ) -> Result<Option<PlatformCredential>, PlatformError>;

    fn name(&self) -> &str;
}

// ── Randomness ──────────────────────────────────────────────────────────

/// Cryptographically strong random bytes.
pub trait RandomSource: Send + Sync {
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), PlatformError>;

    fn name(&self) -> &str;
}
