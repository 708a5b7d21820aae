//! Campus network identity probe.
//!
//! The probe always resolves. When the host has no Wi-Fi plugin, or the
//! plugin leaves a field blank, the configured [`NetworkFallback`] decides
//! what ends up in the record: a canned simulated identity, or nothing at
//! all so that validation blocks the submission.

use attest_types::NetworkIdentity;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::platform::{NetworkInfoSource, WifiReading};

pub const SIMULATED_SSID: &str = "CollegeWiFi";
pub const SIMULATED_MAC: &str = "00:1A:2B:3C:4D:5E";

/// What to report for fields the platform could not supply.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum NetworkFallback {
    /// Substitute a fixed identity. Defeats the SSID allow-list in practice;
    /// meant for hosts without a Wi-Fi plugin.
    Simulate { ssid: String, mac: String },
    /// Leave missing fields empty.
    FailClosed,
}

impl Default for NetworkFallback {
    fn default() -> Self {
        Self::Simulate {
            ssid: SIMULATED_SSID.to_string(),
            mac: SIMULATED_MAC.to_string(),
        }
    }
}

pub struct NetworkIdentityProbe {
    source: Option<Arc<dyn NetworkInfoSource>>,
    fallback: NetworkFallback,
}

impl NetworkIdentityProbe {
    pub fn new(source: Arc<dyn NetworkInfoSource>, fallback: NetworkFallback) -> Self {
        Self {
            source: Some(source),
            fallback,
        }
    }

    /// A probe for hosts with no Wi-Fi plugin at all.
    pub fn without_platform(fallback: NetworkFallback) -> Self {
        Self {
            source: None,
            fallback,
        }
    }

    /// Resolve the SSID and MAC. Never fails.
    pub async fn probe(&self) -> NetworkIdentity {
        let reading = match &self.source {
            Some(source) => match source.read().await {
                Ok(reading) => reading,
                Err(e) => {
                    warn!(source = source.name(), error = %e, "wifi info read failed");
                    WifiReading::default()
                }
            },
            None => {
                debug!("no wifi info plugin on this host");
                WifiReading::default()
            }
        };

        let (ssid, mac) = (non_empty(reading.ssid), non_empty(reading.mac));
        if let (Some(ssid), Some(mac)) = (&ssid, &mac) {
            return NetworkIdentity::new(ssid.clone(), mac.clone());
        }

        match &self.fallback {
            NetworkFallback::Simulate {
                ssid: sim_ssid,
                mac: sim_mac,
            } => {
                warn!("network identity incomplete, substituting simulated values");
                NetworkIdentity::new(
                    ssid.unwrap_or_else(|| sim_ssid.clone()),
                    mac.unwrap_or_else(|| sim_mac.clone()),
                )
            }
            NetworkFallback::FailClosed => {
                warn!("network identity incomplete, leaving missing fields empty");
                NetworkIdentity::new(ssid.unwrap_or_default(), mac.unwrap_or_default())
            }
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlatformError;
    use async_trait::async_trait;

    struct Plugin(Result<WifiReading, PlatformError>);

    #[async_trait]
    impl NetworkInfoSource for Plugin {
        async fn read(&self) -> Result<WifiReading, PlatformError> {
            self.0.clone()
        }

        fn name(&self) -> &str {
            "plugin"
        }
    }

    fn reading(ssid: Option<&str>, mac: Option<&str>) -> WifiReading {
        WifiReading {
            ssid: ssid.map(String::from),
            mac: mac.map(String::from),
        }
    }

    #[tokio::test]
    async fn platform_values_win() {
        let probe = NetworkIdentityProbe::new(
            Arc::new(Plugin(Ok(reading(Some("Hostel"), Some("AA:BB:CC:DD:EE:FF"))))),
            NetworkFallback::default(),
        );
        assert_eq!(
            probe.probe().await,
            NetworkIdentity::new("Hostel", "AA:BB:CC:DD:EE:FF")
        );
    }

    #[tokio::test]
    async fn missing_plugin_simulates_campus_identity() {
        let probe = NetworkIdentityProbe::without_platform(NetworkFallback::default());
        assert_eq!(
            probe.probe().await,
            NetworkIdentity::new(SIMULATED_SSID, SIMULATED_MAC)
        );
    }

    #[tokio::test]
    async fn partial_reading_is_filled_per_field() {
        let probe = NetworkIdentityProbe::new(
            Arc::new(Plugin(Ok(reading(Some("Hostel"), Some(""))))),
            NetworkFallback::default(),
        );
        assert_eq!(
            probe.probe().await,
            NetworkIdentity::new("Hostel", SIMULATED_MAC)
        );
    }

    #[tokio::test]
    async fn fail_closed_leaves_fields_empty() {
        let probe = NetworkIdentityProbe::new(
            Arc::new(Plugin(Err(PlatformError::Unsupported))),
            NetworkFallback::FailClosed,
        );
        assert!(probe.probe().await.is_empty());
    }

    #[test]
    fn fallback_is_tagged_by_mode() {
        let simulate: NetworkFallback =
            serde_json::from_str(r#"{"mode":"simulate","ssid":"X","mac":"Y"}"#).unwrap();
        assert_eq!(
            simulate,
            NetworkFallback::Simulate {
                ssid: "X".into(),
                mac: "Y".into()
            }
        );
        let closed: NetworkFallback = serde_json::from_str(r#"{"mode":"fail_closed"}"#).unwrap();
        assert_eq!(closed, NetworkFallback::FailClosed);
    }
}
