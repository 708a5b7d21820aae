//! The per-session aggregate of identity fields and captured factors.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::factor::{FaceImage, ProofToken};
use crate::identity::{EnrolmentProfile, NetworkIdentity};
use crate::location::LocationFix;
use crate::TypesError;

/// Which submission a session is building towards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Flow {
    /// Daily attendance mark (`POST /attendance/mark`).
    CheckIn,
    /// First-time registration (`POST /users/register`).
    Enrolment,
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CheckIn => write!(f, "check-in"),
            Self::Enrolment => write!(f, "enrolment"),
        }
    }
}

impl FromStr for Flow {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "check-in" | "checkin" => Ok(Self::CheckIn),
            "enrolment" | "enrollment" | "register" => Ok(Self::Enrolment),
            other => Err(TypesError::UnknownFlow(other.to_string())),
        }
    }
}

/// The result of one independent capture, ready to be merged into a record.
#[derive(Clone, Debug, PartialEq)]
pub enum CaptureOutcome {
    Location(LocationFix),
    Network(NetworkIdentity),
    Face(FaceImage),
    Biometric(ProofToken),
}

/// User name and display name presented to the platform authenticator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CredentialSubject {
    pub name: String,
    pub display_name: String,
}

/// Everything captured during one enrol or check-in session.
///
/// Identity fields are edited directly by the caller. Captured factors are
/// private and written through one setter per field group, so each
/// controller owns a disjoint slice of the record. Setting a factor always
/// replaces the previous value.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionRecord {
    flow: Flow,
    /// Roll number, used by both flows.
    pub roll_number: String,
    /// Present only for enrolment sessions.
    pub profile: Option<EnrolmentProfile>,
    face_image: Option<FaceImage>,
    biometric_proof: Option<ProofToken>,
    network: NetworkIdentity,
    location: LocationFix,
}

impl SessionRecord {
    /// An empty record for the given flow.
    pub fn new(flow: Flow) -> Self {
        Self {
            flow,
            roll_number: String::new(),
            profile: match flow {
                Flow::CheckIn => None,
                Flow::Enrolment => Some(EnrolmentProfile::default()),
            },
            face_image: None,
            biometric_proof: None,
            network: NetworkIdentity::default(),
            location: LocationFix::Pending,
        }
    }

    pub fn check_in(roll_number: impl Into<String>) -> Self {
        let mut record = Self::new(Flow::CheckIn);
        record.roll_number = roll_number.into();
        record
    }

    pub fn enrolment(profile: EnrolmentProfile, roll_number: impl Into<String>) -> Self {
        let mut record = Self::new(Flow::Enrolment);
        record.roll_number = roll_number.into();
        record.profile = Some(profile);
        record
    }

    pub fn flow(&self) -> Flow {
        self.flow
    }

    pub fn face_image(&self) -> Option<&FaceImage> {
        self.face_image.as_ref()
    }

    pub fn biometric_proof(&self) -> Option<&ProofToken> {
        self.biometric_proof.as_ref()
    }

    pub fn network_identity(&self) -> &NetworkIdentity {
        &self.network
    }

    pub fn location(&self) -> LocationFix {
        self.location
    }

    /// Email carried by the enrolment profile, if any.
    pub fn email(&self) -> Option<&str> {
        self.profile.as_ref().map(|p| p.email.as_str())
    }

    /// Store a face still, returning the one it replaces.
    pub fn set_face_image(&mut self, image: FaceImage) -> Option<FaceImage> {
        self.face_image.replace(image)
    }

    pub fn set_biometric_proof(&mut self, proof: ProofToken) -> Option<ProofToken> {
        self.biometric_proof.replace(proof)
    }

    pub fn set_network_identity(&mut self, identity: NetworkIdentity) {
        self.network = identity;
    }

    /// Record the geolocation result. A `Pending` fix never overwrites a
    /// settled one.
    pub fn settle_location(&mut self, fix: LocationFix) {
        if fix.is_settled() {
            self.location = fix;
        }
    }

    /// Merge one capture result into the record.
    pub fn apply(&mut self, outcome: CaptureOutcome) {
        match outcome {
            CaptureOutcome::Location(fix) => self.settle_location(fix),
            CaptureOutcome::Network(identity) => self.set_network_identity(identity),
            CaptureOutcome::Face(image) => {
                self.set_face_image(image);
            }
            CaptureOutcome::Biometric(proof) => {
                self.set_biometric_proof(proof);
            }
        }
    }

    /// Names shown by the platform authenticator for this subject.
    ///
    /// Check-in uses the roll number; enrolment uses the email and the full
    /// name. Blank values fall back to `user` / `User`.
    pub fn subject(&self) -> CredentialSubject {
        let (name, display_name) = match (&self.flow, &self.profile) {
            (Flow::Enrolment, Some(profile)) => (profile.email.trim(), profile.name.trim()),
            _ => (self.roll_number.trim(), self.roll_number.trim()),
        };
        CredentialSubject {
            name: non_blank_or(name, "user"),
            display_name: non_blank_or(display_name, "User"),
        }
    }

    /// Drop every captured factor and identity field, keeping the flow.
    pub fn reset(&mut self) {
        *self = Self::new(self.flow);
    }
}

fn non_blank_or(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}
