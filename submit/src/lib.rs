//! Submission pipeline.
//!
//! Turns a [`Verified`](attest_validation::Verified) record into the JSON
//! body its flow's endpoint expects, sends exactly one request through a
//! [`Backend`], and classifies the reply into a [`SuccessMessage`] or a
//! [`SubmissionError`]. Also carries the login call, which shares the
//! transport and the error type.

pub mod backend;
pub mod error;
pub mod payload;
pub mod pipeline;
pub mod response;

pub use backend::{Backend, BackendRequest, HttpBackend};
pub use error::{SubmissionError, TransportError};
pub use payload::{SubmissionPayload, CHECK_IN_PATH, LOGIN_PATH, REGISTER_PATH};
pub use pipeline::SubmissionPipeline;
pub use response::{LoginSuccess, SuccessMessage};
