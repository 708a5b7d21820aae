//! Core data types for campus attendance attestation.
//!
//! A [`SessionRecord`] aggregates every factor captured while a user enrols
//! or checks in: identity fields typed by the user, a face still, a platform
//! biometric proof, the campus network identity and a location fix. Each
//! capture controller owns one disjoint field group and writes it through
//! the setters defined on the record.

pub mod error;
pub mod factor;
pub mod identity;
pub mod location;
pub mod record;

pub use error::TypesError;
pub use factor::{FaceImage, ProofToken};
pub use identity::{Credentials, EnrolmentProfile, NetworkIdentity, DEPARTMENTS};
pub use location::{Coordinates, LocationFix};
pub use record::{CaptureOutcome, CredentialSubject, Flow, SessionRecord};
