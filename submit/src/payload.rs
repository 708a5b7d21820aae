//! JSON bodies for the three backend endpoints.
//!
//! Field names follow the backend's camelCase contract. The two capture
//! flows differ only in the MAC field name (`mac` vs `macAddress`) and in
//! the enrolment profile fields. Coordinates are JSON numbers, or `null`
//! when the location never resolved.

use attest_types::{Credentials, Flow, SessionRecord};
use serde::Serialize;

pub const CHECK_IN_PATH: &str = "/attendance/mark";
pub const REGISTER_PATH: &str = "/users/register";
pub const LOGIN_PATH: &str = "/users/login";

/// Role header required by the check-in endpoint.
pub const ROLE_HEADER: (&str, &str) = ("x-user-role", "faculty");

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInPayload<'a> {
    pub roll_number: &'a str,
    pub face_data: &'a str,
    pub fingerprint_data: &'a str,
    pub ssid: &'a str,
    pub mac: &'a str,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPayload<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub department: &'a str,
    pub roll_number: &'a str,
    pub face_data: &'a str,
    pub fingerprint_data: &'a str,
    pub ssid: &'a str,
    pub mac_address: &'a str,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct LoginPayload<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

impl<'a> From<&'a Credentials> for LoginPayload<'a> {
    fn from(c: &'a Credentials) -> Self {
        Self {
            email: &c.email,
            password: &c.password,
        }
    }
}

/// A record's payload, shaped for its flow.
#[derive(Debug)]
pub enum SubmissionPayload<'a> {
    CheckIn(CheckInPayload<'a>),
    Register(RegisterPayload<'a>),
}

impl<'a> SubmissionPayload<'a> {
    pub fn from_record(record: &'a SessionRecord) -> Self {
        let coords = record.location().coordinates();
        let (latitude, longitude) = (coords.map(|c| c.latitude), coords.map(|c| c.longitude));
        let face_data = record.face_image().map(|f| f.as_base64()).unwrap_or_default();
        let fingerprint_data = record.biometric_proof().map(|p| p.as_str()).unwrap_or_default();
        let network = record.network_identity();

        match (record.flow(), &record.profile) {
            (Flow::Enrolment, Some(profile)) => Self::Register(RegisterPayload {
                name: &profile.name,
                email: &profile.email,
                password: &profile.password,
                department: &profile.department,
                roll_number: &record.roll_number,
                face_data,
                fingerprint_data,
                ssid: &network.ssid,
                mac_address: &network.mac,
                latitude,
                longitude,
            }),
            _ => Self::CheckIn(CheckInPayload {
                roll_number: &record.roll_number,
                face_data,
                fingerprint_data,
                ssid: &network.ssid,
                mac: &network.mac,
                latitude,
                longitude,
            }),
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Self::CheckIn(_) => CHECK_IN_PATH,
            Self::Register(_) => REGISTER_PATH,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        let value = match self {
            Self::CheckIn(p) => serde_json::to_value(p),
            Self::Register(p) => serde_json::to_value(p),
        };
        // Plain string and float fields always serialize.
        value.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attest_types::{
        Coordinates, EnrolmentProfile, FaceImage, LocationFix, NetworkIdentity, ProofToken,
    };
    use serde_json::json;

    #[test]
    fn check_in_body_shape() {
        let mut record = SessionRecord::check_in("CS101");
        record.set_face_image(FaceImage::from_base64("iVBORw0K"));
        record.set_biometric_proof(ProofToken::verified());
        record.set_network_identity(NetworkIdentity::new("CollegeWiFi", "00:1A:2B:3C:4D:5E"));
        record.settle_location(LocationFix::Resolved(Coordinates::new(17.5, 78.25)));

        let payload = SubmissionPayload::from_record(&record);
        assert_eq!(payload.path(), "/attendance/mark");
        assert_eq!(
            payload.to_json(),
            json!({
                "rollNumber": "CS101",
                "faceData": "iVBORw0K",
                "fingerprintData": "ZmluZ2VycHJpbnRfdmVyaWZpZWQ=",
                "ssid": "CollegeWiFi",
                "mac": "00:1A:2B:3C:4D:5E",
                "latitude": 17.5,
                "longitude": 78.25,
            })
        );
    }

    #[test]
    fn register_body_uses_mac_address_and_null_coordinates() {
        let profile = EnrolmentProfile {
            name: "Asha Rao".into(),
            email: "asha@college.edu".into(),
            password: "secret".into(),
            department: "CSE".into(),
        };
        let mut record = SessionRecord::enrolment(profile, "CS101");
        record.set_network_identity(NetworkIdentity::new("CollegeWiFi", "00:1A:2B:3C:4D:5E"));
        record.settle_location(LocationFix::Unavailable);

        let payload = SubmissionPayload::from_record(&record);
        assert_eq!(payload.path(), "/users/register");
        let body = payload.to_json();
        assert_eq!(body["macAddress"], "00:1A:2B:3C:4D:5E");
        assert_eq!(body["department"], "CSE");
        assert!(body.get("mac").is_none());
        assert!(body["latitude"].is_null());
        assert!(body["longitude"].is_null());
    }

    #[test]
    fn login_body_shape() {
        let creds = Credentials::new("asha@college.edu", "secret");
        let body = serde_json::to_value(LoginPayload::from(&creds)).unwrap();
        assert_eq!(body, json!({"email": "asha@college.edu", "password": "secret"}));
    }
}
