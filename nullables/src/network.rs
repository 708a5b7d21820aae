//! Nullable Wi-Fi info plugin.

use async_trait::async_trait;
use attest_capture::{NetworkInfoSource, PlatformError, WifiReading};
use std::time::Duration;

/// A Wi-Fi info source that reports a fixed reading.
pub struct NullNetworkInfo {
    result: Result<WifiReading, PlatformError>,
    delay: Duration,
}

impl NullNetworkInfo {
    pub fn connected(ssid: &str, mac: &str) -> Self {
        Self::with_result(Ok(WifiReading {
            ssid: Some(ssid.to_string()),
            mac: Some(mac.to_string()),
        }))
    }

    /// The plugin answers but knows nothing.
    pub fn blank() -> Self {
        Self::with_result(Ok(WifiReading::default()))
    }

    pub fn failing() -> Self {
        Self::with_result(Err(PlatformError::Failed("wifi plugin error".into())))
    }

    pub fn with_result(result: Result<WifiReading, PlatformError>) -> Self {
        Self {
            result,
            delay: Duration::ZERO,
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl NetworkInfoSource for NullNetworkInfo {
    async fn read(&self) -> Result<WifiReading, PlatformError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.result.clone()
    }

    fn name(&self) -> &str {
        "null-wifi"
    }
}
