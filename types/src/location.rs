//! Geographic coordinates and the settled/unsettled location fix.

use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in decimal degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Planar Euclidean distance in degrees.
    ///
    /// Only meaningful over short distances; this is not a great-circle
    /// calculation.
    pub fn planar_distance(&self, other: &Coordinates) -> f64 {
        let dlat = self.latitude - other.latitude;
        let dlng = self.longitude - other.longitude;
        (dlat * dlat + dlng * dlng).sqrt()
    }
}

/// Where the geolocation request stands for this session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum LocationFix {
    /// No answer from the platform yet.
    #[default]
    Pending,
    /// The platform returned coordinates.
    Resolved(Coordinates),
    /// Denied, timed out, or the capability is absent.
    Unavailable,
}

impl LocationFix {
    pub fn coordinates(&self) -> Option<Coordinates> {
        match self {
            Self::Resolved(c) => Some(*c),
            _ => None,
        }
    }

    /// Whether the request has finished one way or the other.
    pub fn is_settled(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}
