//! Identity fields: enrolment profile, login credentials, network identity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Department codes accepted at enrolment.
pub const DEPARTMENTS: [&str; 6] = ["CSE", "ECE", "EEE", "MECH", "CIVIL", "AIDS"];

/// The campus network identity reported by the host platform.
///
/// `mac` is expected in six-octet colon-hex form (`00:1A:2B:3C:4D:5E`);
/// the validation engine enforces that, not this type.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkIdentity {
    pub ssid: String,
    pub mac: String,
}

impl NetworkIdentity {
    pub fn new(ssid: impl Into<String>, mac: impl Into<String>) -> Self {
        Self {
            ssid: ssid.into(),
            mac: mac.into(),
        }
    }

    /// True when neither field was detected.
    pub fn is_empty(&self) -> bool {
        self.ssid.is_empty() && self.mac.is_empty()
    }
}

/// Profile fields typed by the user during enrolment.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrolmentProfile {
    pub name: String,
    pub email: String,
    pub password: String,
    pub department: String,
}

impl fmt::Debug for EnrolmentProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnrolmentProfile")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("department", &self.department)
            .finish()
    }
}

/// Email and password pair for `POST /users/login`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}
