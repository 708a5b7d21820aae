//! Nullable capabilities for deterministic testing.
//!
//! Every platform capability and the backend transport sit behind traits.
//! This crate provides test-friendly implementations that:
//! - Return pre-configured values, in order
//! - Record what they were asked to do, for assertions
//! - Never touch a camera, a radio, the OS RNG or the network
//!
//! Usage: hand these to the controllers and the session in place of the
//! host implementations.

pub mod authenticator;
pub mod backend;
pub mod geolocation;
pub mod media;
pub mod network;
pub mod random;

pub use authenticator::NullAuthenticator;
pub use backend::NullBackend;
pub use geolocation::NullGeolocation;
pub use media::{NullMediaSource, NullStream};
pub use network::NullNetworkInfo;
pub use random::NullRandom;
