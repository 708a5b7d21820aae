//! Session configuration with TOML file support.

use attest_capture::{NetworkFallback, VideoConstraints};
use attest_validation::PolicyConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::AttestError;

/// Configuration for an attendance client.
///
/// Can be loaded from a TOML file via [`AttestConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttestConfig {
    /// Base URL of the attendance backend.
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Relying-party name presented during the biometric ceremony.
    #[serde(default = "default_relying_party")]
    pub relying_party: String,

    #[serde(default = "default_ceremony_timeout_ms")]
    pub ceremony_timeout_ms: u64,

    /// Delay between the camera opening and the first allowed still.
    #[serde(default = "default_stabilization_ms")]
    pub stabilization_ms: u64,

    #[serde(default)]
    pub video: VideoConstraints,

    /// What the network probe reports when the Wi-Fi plugin is missing.
    #[serde(default)]
    pub network_fallback: NetworkFallback,

    #[serde(default)]
    pub policy: PolicyConfig,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter, e.g. "info" or "warn,attest_capture=debug".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_backend_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_relying_party() -> String {
    "BioApp".to_string()
}

fn default_ceremony_timeout_ms() -> u64 {
    60_000
}

fn default_stabilization_ms() -> u64 {
    2_000
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl AttestConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, AttestError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| AttestError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, AttestError> {
        toml::from_str(s).map_err(|e| AttestError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, AttestError> {
        toml::to_string_pretty(self).map_err(|e| AttestError::Config(e.to_string()))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn ceremony_timeout(&self) -> Duration {
        Duration::from_millis(self.ceremony_timeout_ms)
    }

    pub fn stabilization(&self) -> Duration {
        Duration::from_millis(self.stabilization_ms)
    }
}

impl Default for AttestConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            relying_party: default_relying_party(),
            ceremony_timeout_ms: default_ceremony_timeout_ms(),
            stabilization_ms: default_stabilization_ms(),
            video: VideoConstraints::default(),
            network_fallback: NetworkFallback::default(),
            policy: PolicyConfig::default(),
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}
