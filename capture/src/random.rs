//! Operating-system randomness for ceremony challenges.

use crate::error::PlatformError;
use crate::platform::RandomSource;

/// Reads from the OS CSPRNG via `getrandom`.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), PlatformError> {
        getrandom::getrandom(dest).map_err(|e| PlatformError::Failed(e.to_string()))
    }

    fn name(&self) -> &str {
        "os-random"
    }
}
