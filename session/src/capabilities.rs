//! The host capabilities a session is built over.

use attest_capture::{
    GeolocationSource, MediaSource, NetworkInfoSource, OsRandom, PlatformAuthenticator,
    RandomSource,
};
use attest_submit::{Backend, HttpBackend};
use std::sync::Arc;

use crate::AttestConfig;

/// One handle per collaborator the controllers and the pipeline talk to.
#[derive(Clone)]
pub struct Capabilities {
    pub geolocation: Arc<dyn GeolocationSource>,
    /// `None` when the host has no Wi-Fi info plugin.
    pub wifi: Option<Arc<dyn NetworkInfoSource>>,
    pub camera: Arc<dyn MediaSource>,
    pub authenticator: Arc<dyn PlatformAuthenticator>,
    pub random: Arc<dyn RandomSource>,
    pub backend: Arc<dyn Backend>,
}

impl Capabilities {
    /// Capabilities backed by OS randomness and an HTTP backend built from
    /// `config`.
    pub fn with_http_backend(
        config: &AttestConfig,
        geolocation: Arc<dyn GeolocationSource>,
        wifi: Option<Arc<dyn NetworkInfoSource>>,
        camera: Arc<dyn MediaSource>,
        authenticator: Arc<dyn PlatformAuthenticator>,
    ) -> Self {
        Self {
            geolocation,
            wifi,
            camera,
            authenticator,
            random: Arc::new(OsRandom),
            backend: http_backend(config),
        }
    }
}

pub fn http_backend(config: &AttestConfig) -> Arc<dyn Backend> {
    Arc::new(HttpBackend::with_timeouts(
        config.backend_url.clone(),
        config.request_timeout(),
        config.connect_timeout(),
    ))
}
