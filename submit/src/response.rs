//! Canonical response classification, one contract per endpoint.
//!
//! | Endpoint          | Rejected when                                  | Success message                  |
//! |-------------------|------------------------------------------------|----------------------------------|
//! | check-in          | `status == "error"`, or an `error` field       | non-empty `message`              |
//! | register          | `status != "success"`                          | `message`, else a fixed default  |
//! | login             | `status == "error"`                            | `message`                        |
//!
//! A check-in body with neither marker nor message is rejected with the
//! generic "Failed to mark attendance".

use serde::Deserialize;
use serde_json::Value;

use crate::error::SubmissionError;

pub const CHECK_IN_FAILED: &str = "Failed to mark attendance";
pub const REGISTER_OK: &str = "Registration successful!";
pub const REGISTER_FAILED: &str = "Registration failed";
pub const LOGIN_FAILED: &str = "Login failed";

/// What the backend said on success.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SuccessMessage(pub String);

impl SuccessMessage {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SuccessMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Successful login: the message plus the user object, if the backend sent
/// one.
#[derive(Clone, Debug, PartialEq)]
pub struct LoginSuccess {
    pub message: String,
    pub user: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct ResponseBody {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<Value>,
    #[serde(default)]
    user: Option<Value>,
}

impl ResponseBody {
    fn parse(value: Value) -> Result<Self, SubmissionError> {
        serde_json::from_value(value)
            .map_err(|e| SubmissionError::Network(format!("unexpected response shape: {e}")))
    }

    fn message(&self) -> Option<&str> {
        self.message.as_deref().map(str::trim).filter(|m| !m.is_empty())
    }

    fn error_text(&self) -> Option<String> {
        match &self.error {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
            _ => None,
        }
    }

    fn status_is(&self, expected: &str) -> bool {
        self.status.as_deref() == Some(expected)
    }
}

pub fn classify_check_in(value: Value) -> Result<SuccessMessage, SubmissionError> {
    let body = ResponseBody::parse(value)?;
    if body.status_is("error") || body.error.as_ref().is_some_and(|e| !e.is_null()) {
        let message = body
            .message()
            .map(String::from)
            .or_else(|| body.error_text())
            .unwrap_or_else(|| CHECK_IN_FAILED.to_string());
        return Err(SubmissionError::ServerRejected(message));
    }
    match body.message() {
        Some(message) => Ok(SuccessMessage(message.to_string())),
        None => Err(SubmissionError::ServerRejected(CHECK_IN_FAILED.to_string())),
    }
}

pub fn classify_register(value: Value) -> Result<SuccessMessage, SubmissionError> {
    let body = ResponseBody::parse(value)?;
    if body.status_is("success") {
        Ok(SuccessMessage(
            body.message().unwrap_or(REGISTER_OK).to_string(),
        ))
    } else {
        Err(SubmissionError::ServerRejected(
            body.message().unwrap_or(REGISTER_FAILED).to_string(),
        ))
    }
}

pub fn classify_login(value: Value) -> Result<LoginSuccess, SubmissionError> {
    let body = ResponseBody::parse(value)?;
    if body.status_is("error") {
        return Err(SubmissionError::ServerRejected(
            body.message().unwrap_or(LOGIN_FAILED).to_string(),
        ));
    }
    Ok(LoginSuccess {
        message: body.message().unwrap_or_default().to_string(),
        user: body.user.filter(|u| !u.is_null()),
    })
}
