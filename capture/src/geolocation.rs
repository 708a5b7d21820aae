//! One-shot geolocation with graceful degradation.

use attest_types::{Coordinates, LocationFix};
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::LocationUnavailable;
use crate::platform::GeolocationSource;

/// Issues a single location request per call. Never retries on its own.
#[derive(Clone)]
pub struct GeolocationAcquirer {
    source: Arc<dyn GeolocationSource>,
}

impl GeolocationAcquirer {
    pub fn new(source: Arc<dyn GeolocationSource>) -> Self {
        Self { source }
    }

    /// Request the current position once.
    ///
    /// Denial, timeout and a missing capability all map to
    /// [`LocationUnavailable`].
    pub async fn acquire(&self) -> Result<Coordinates, LocationUnavailable> {
        match self.source.current_position().await {
            Ok(coords) => {
                info!(source = self.source.name(), "location resolved");
                Ok(coords)
            }
            Err(e) => {
                warn!(source = self.source.name(), error = %e, "location unavailable");
                Err(LocationUnavailable(e))
            }
        }
    }

    /// Same as [`acquire`](Self::acquire), folded into a settled fix.
    pub async fn acquire_fix(&self) -> LocationFix {
        match self.acquire().await {
            Ok(coords) => LocationFix::Resolved(coords),
            Err(_) => LocationFix::Unavailable,
        }
    }
}
