//! Nullable geolocation: a fixed answer, optionally late.

use async_trait::async_trait;
use attest_capture::{GeolocationSource, PlatformError};
use attest_types::Coordinates;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// A geolocation source that always gives the same answer.
pub struct NullGeolocation {
    result: Result<Coordinates, PlatformError>,
    delay: Duration,
    requests: AtomicUsize,
}

impl NullGeolocation {
    pub fn at(latitude: f64, longitude: f64) -> Self {
        Self::with_result(Ok(Coordinates::new(latitude, longitude)))
    }

    pub fn denied() -> Self {
        Self::with_result(Err(PlatformError::Denied("User denied Geolocation".into())))
    }

    pub fn unsupported() -> Self {
        Self::with_result(Err(PlatformError::Unsupported))
    }

    pub fn with_result(result: Result<Coordinates, PlatformError>) -> Self {
        Self {
            result,
            delay: Duration::ZERO,
            requests: AtomicUsize::new(0),
        }
    }

    /// Answer only after `delay` (tokio time, so pausable in tests).
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of position requests received.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GeolocationSource for NullGeolocation {
    async fn current_position(&self) -> Result<Coordinates, PlatformError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.result.clone()
    }

    fn name(&self) -> &str {
        "null-geolocation"
    }
}
