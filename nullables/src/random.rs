//! Nullable random: deterministic challenge bytes for testing.

use attest_capture::{PlatformError, RandomSource};
use std::sync::Mutex;

/// A deterministic random source for testing.
///
/// Returns pre-configured byte patterns in order, cycling when exhausted.
/// Each fill repeats its pattern across the whole buffer.
pub struct NullRandom {
    outputs: Mutex<Vec<Vec<u8>>>,
    index: Mutex<usize>,
}

impl NullRandom {
    /// Create with a sequence of deterministic patterns.
    pub fn new(outputs: Vec<Vec<u8>>) -> Self {
        Self {
            outputs: Mutex::new(outputs),
            index: Mutex::new(0),
        }
    }

    /// Create with a single pattern returned for every call.
    pub fn constant(value: Vec<u8>) -> Self {
        Self::new(vec![value])
    }

    /// A distinct single-byte pattern per call: 1, 2, 3, ...
    pub fn counting() -> Self {
        Self::new((1..=u8::MAX).map(|b| vec![b]).collect())
    }

    /// How many fills have been served.
    pub fn calls(&self) -> usize {
        *self.index.lock().unwrap()
    }
}

impl RandomSource for NullRandom {
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), PlatformError> {
        let outputs = self.outputs.lock().unwrap();
        if outputs.is_empty() {
            return Err(PlatformError::Failed("no random output configured".into()));
        }
        let mut idx = self.index.lock().unwrap();
        let pattern = &outputs[*idx % outputs.len()];
        *idx += 1;
        for (byte, value) in dest.iter_mut().zip(pattern.iter().cycle()) {
            *byte = *value;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "null-random"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycles_through_patterns() {
        let random = NullRandom::new(vec![vec![1, 2], vec![9]]);
        let mut buf = [0u8; 4];
        random.fill_bytes(&mut buf).unwrap();
        assert_eq!(buf, [1, 2, 1, 2]);
        random.fill_bytes(&mut buf).unwrap();
        assert_eq!(buf, [9; 4]);
        random.fill_bytes(&mut buf).unwrap();
        assert_eq!(buf, [1, 2, 1, 2]);
        assert_eq!(random.calls(), 3);
    }

    #[test]
    fn empty_source_fails() {
        let mut buf = [0u8; 4];
        assert!(NullRandom::new(Vec::new()).fill_bytes(&mut buf).is_err());
    }
}
