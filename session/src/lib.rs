//! Enrol and check-in sessions.
//!
//! [`AttendanceSession`] wires the capture controllers, the rule set and the
//! submission pipeline over a set of host [`Capabilities`], as configured by
//! an [`AttestConfig`]. Every failure is reported as an [`AttestError`] and
//! mirrored in the session's [`StatusLine`]; none of them end the session.

pub mod capabilities;
pub mod config;
pub mod error;
pub mod logging;
pub mod session;
pub mod status;

pub use capabilities::{http_backend, Capabilities};
pub use config::AttestConfig;
pub use error::AttestError;
pub use logging::{init_logging, LogFormat};
pub use session::{ActivityHandle, AttendanceSession};
pub use status::{StatusKind, StatusLine};
