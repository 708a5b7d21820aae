use attest_types::{Flow, SessionRecord};
use chrono::{Local, NaiveTime, Timelike};
use std::fmt;

use crate::format::{is_valid_email, is_valid_mac};
use crate::policy::PolicyConfig;
use crate::rule::{PolicyRule, RuleId, RuleSet};

/// Wall-clock input to the service-hours rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValidationContext {
    pub local_time: NaiveTime,
}

impl ValidationContext {
    pub fn now() -> Self {
        Self {
            local_time: Local::now().time(),
        }
    }

    /// Fixed time of day. Out-of-range values clamp to midnight.
    pub fn at(hour: u32, minute: u32) -> Self {
        Self {
            local_time: NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default(),
        }
    }
}

/// The first rule a record failed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationFailure {
    pub rule: RuleId,
    pub message: String,
}

/// A record that passed every active rule.
///
/// Only [`validate`] constructs this, so holding one proves the check ran
/// against the record as it is borrowed here.
#[derive(Clone, Copy)]
pub struct Verified<'a> {
    record: &'a SessionRecord,
}

impl<'a> Verified<'a> {
    pub(crate) fn new(record: &'a SessionRecord) -> Self {
        Self { record }
    }

    pub fn record(&self) -> &'a SessionRecord {
        self.record
    }
}

impl fmt::Debug for Verified<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Verified")
            .field("flow", &self.record.flow())
            .finish_non_exhaustive()
    }
}

/// Evaluate the active rules for the record's flow in priority order and
/// report the first failure.
pub fn validate<'a>(
    record: &'a SessionRecord,
    rules: &RuleSet,
    ctx: &ValidationContext,
) -> Result<Verified<'a>, ValidationFailure> {
    for rule in rules.active(record.flow()) {
        check(rule, record, rules.policy(), ctx)?;
    }
    Ok(Verified::new(record))
}

fn check(
    rule: &PolicyRule,
    record: &SessionRecord,
    policy: &PolicyConfig,
    ctx: &ValidationContext,
) -> Result<(), ValidationFailure> {
    let fail = || ValidationFailure {
        rule: rule.id,
        message: rule.message.clone(),
    };
    let network = record.network_identity();

    let passed = match rule.id {
        RuleId::RollNumberPresent => !record.roll_number.trim().is_empty(),
        RuleId::CredentialsPresent => record
            .profile
            .as_ref()
            .is_some_and(|p| !p.email.trim().is_empty() && !p.password.is_empty()),
        RuleId::FacePresent => record.face_image().is_some_and(|img| !img.is_empty()),
        RuleId::BiometricPresent => record.biometric_proof().is_some_and(|p| !p.is_empty()),
        RuleId::SsidPresent => !network.ssid.trim().is_empty(),
        RuleId::CampusSsid => network.ssid == policy.campus_ssid,
        RuleId::MacPresent => !network.mac.trim().is_empty(),
        RuleId::MacFormat => is_valid_mac(&network.mac),
        RuleId::EmailFormat => match record.email() {
            Some(email) if !email.is_empty() => is_valid_email(email),
            _ => true,
        },
        RuleId::ProfileComplete => {
            return match missing_profile_field(record) {
                Some(field) => Err(ValidationFailure {
                    rule: rule.id,
                    message: format!("{} {field} field.", rule.message),
                }),
                None => Ok(()),
            };
        }
        // An unresolved location cannot be shown to be on campus.
        RuleId::Geofence => record
            .location()
            .coordinates()
            .is_some_and(|c| policy.geofence.contains(&c)),
        RuleId::ServiceHours => policy.service_hours.contains_hour(ctx.local_time.hour()),
    };

    if passed {
        Ok(())
    } else {
        Err(fail())
    }
}

fn missing_profile_field(record: &SessionRecord) -> Option<&'static str> {
    if record.flow() != Flow::Enrolment {
        return None;
    }
    let profile = record.profile.as_ref()?;
    [
        ("name", profile.name.as_str()),
        ("department", profile.department.as_str()),
        ("rollNumber", record.roll_number.as_str()),
    ]
    .into_iter()
    .find(|(_, value)| value.trim().is_empty())
    .map(|(field, _)| field)
}
