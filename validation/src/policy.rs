//! Policy configuration: allow-listed SSID, geofence and service hours.

use attest_types::Coordinates;
use serde::{Deserialize, Serialize};

/// Tunable parameters behind the rule set. Deserialized from the `[policy]`
/// table of the configuration file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// The single allow-listed campus SSID.
    #[serde(default = "default_campus_ssid")]
    pub campus_ssid: String,

    /// Also require the campus SSID when checking in (always required at
    /// enrolment).
    #[serde(default)]
    pub campus_ssid_on_check_in: bool,

    #[serde(default)]
    pub geofence: GeofenceConfig,

    #[serde(default)]
    pub service_hours: ServiceHoursConfig,
}

/// Distance-from-campus-centre rule. Disabled by default: the campus Wi-Fi
/// and MAC checks are the authoritative locality signal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeofenceConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_campus_latitude")]
    pub latitude: f64,
    #[serde(default = "default_campus_longitude")]
    pub longitude: f64,
    /// Radius in degrees (planar approximation).
    #[serde(default = "default_radius")]
    pub radius: f64,
}

/// Wall-clock service window `[start_hour, end_hour)`, local time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceHoursConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_start_hour")]
    pub start_hour: u32,
    #[serde(default = "default_end_hour")]
    pub end_hour: u32,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_campus_ssid() -> String {
    "CollegeWiFi".to_string()
}

fn default_campus_latitude() -> f64 {
    17.123456
}

fn default_campus_longitude() -> f64 {
    78.123456
}

fn default_radius() -> f64 {
    0.5
}

fn default_start_hour() -> u32 {
    9
}

fn default_end_hour() -> u32 {
    17
}

// ── Impl ───────────────────────────────────────────────────────────────

impl GeofenceConfig {
    pub fn centre(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    /// Strictly inside the radius.
    pub fn contains(&self, point: &Coordinates) -> bool {
        point.planar_distance(&self.centre()) < self.radius
    }
}

impl ServiceHoursConfig {
    pub fn contains_hour(&self, hour: u32) -> bool {
        hour >= self.start_hour && hour < self.end_hour
    }

    /// "9 AM - 5 PM" style label for user messages.
    pub fn label(&self) -> String {
        format!("{} - {}", twelve_hour(self.start_hour), twelve_hour(self.end_hour))
    }
}

fn twelve_hour(hour: u32) -> String {
    let suffix = if hour % 24 < 12 { "AM" } else { "PM" };
    let h = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{h} {suffix}")
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            campus_ssid: default_campus_ssid(),
            campus_ssid_on_check_in: false,
            geofence: GeofenceConfig::default(),
            service_hours: ServiceHoursConfig::default(),
        }
    }
}

impl Default for GeofenceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            latitude: default_campus_latitude(),
            longitude: default_campus_longitude(),
            radius: default_radius(),
        }
    }
}

impl Default for ServiceHoursConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            start_hour: default_start_hour(),
            end_hour: default_end_hour(),
        }
    }
}
