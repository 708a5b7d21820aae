//! Named policy rules and their fixed priority order.

use attest_types::Flow;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::policy::PolicyConfig;

/// Identifier of one policy rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    RollNumberPresent,
    CredentialsPresent,
    FacePresent,
    BiometricPresent,
    SsidPresent,
    CampusSsid,
    MacPresent,
    MacFormat,
    EmailFormat,
    ProfileComplete,
    Geofence,
    ServiceHours,
}

impl RuleId {
    /// Every rule, in evaluation order.
    pub const PRIORITY: [RuleId; 12] = [
        Self::RollNumberPresent,
        Self::CredentialsPresent,
        Self::FacePresent,
        Self::BiometricPresent,
        Self::SsidPresent,
        Self::CampusSsid,
        Self::MacPresent,
        Self::MacFormat,
        Self::EmailFormat,
        Self::ProfileComplete,
        Self::Geofence,
        Self::ServiceHours,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RollNumberPresent => "roll_number_present",
            Self::CredentialsPresent => "credentials_present",
            Self::FacePresent => "face_present",
            Self::BiometricPresent => "biometric_present",
            Self::SsidPresent => "ssid_present",
            Self::CampusSsid => "campus_ssid",
            Self::MacPresent => "mac_present",
            Self::MacFormat => "mac_format",
            Self::EmailFormat => "email_format",
            Self::ProfileComplete => "profile_complete",
            Self::Geofence => "geofence",
            Self::ServiceHours => "service_hours",
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rule as configured: which flows it guards, whether it is switched on,
/// and the message reported when it fails.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PolicyRule {
    pub id: RuleId,
    pub flows: Vec<Flow>,
    pub enabled: bool,
    pub message: String,
}

impl PolicyRule {
    fn new(id: RuleId, flows: &[Flow], message: impl Into<String>) -> Self {
        Self {
            id,
            flows: flows.to_vec(),
            enabled: true,
            message: message.into(),
        }
    }

    pub fn applies_to(&self, flow: Flow) -> bool {
        self.enabled && self.flows.contains(&flow)
    }
}

/// The full rule list plus the policy parameters the rules read.
///
/// Disabled rules stay in the list so they can be switched on without a
/// code change.
#[derive(Clone, Debug, PartialEq)]
pub struct RuleSet {
    rules: Vec<PolicyRule>,
    policy: PolicyConfig,
}

const BOTH: &[Flow] = &[Flow::CheckIn, Flow::Enrolment];

impl RuleSet {
    pub fn from_config(policy: &PolicyConfig) -> Self {
        let campus_flows: &[Flow] = if policy.campus_ssid_on_check_in {
            BOTH
        } else {
            &[Flow::Enrolment]
        };

        let mut geofence = PolicyRule::new(
            RuleId::Geofence,
            BOTH,
            "You must be on campus to mark attendance.",
        );
        geofence.enabled = policy.geofence.enabled;

        let mut service_hours = PolicyRule::new(
            RuleId::ServiceHours,
            BOTH,
            format!(
                "Attendance can only be marked during college hours ({}).",
                policy.service_hours.label()
            ),
        );
        service_hours.enabled = policy.service_hours.enabled;

        let rules = vec![
            PolicyRule::new(
                RuleId::RollNumberPresent,
                &[Flow::CheckIn],
                "Please enter your roll number.",
            ),
            PolicyRule::new(
                RuleId::CredentialsPresent,
                &[Flow::Enrolment],
                "Please enter your email and password.",
            ),
            PolicyRule::new(RuleId::FacePresent, BOTH, "Please capture your face."),
            PolicyRule::new(
                RuleId::BiometricPresent,
                BOTH,
                "Please capture your fingerprint.",
            ),
            PolicyRule::new(RuleId::SsidPresent, BOTH, "SSID not detected."),
            PolicyRule::new(
                RuleId::CampusSsid,
                campus_flows,
                "You must be connected to the allowed campus WiFi.",
            ),
            PolicyRule::new(RuleId::MacPresent, BOTH, "MAC address not detected."),
            PolicyRule::new(RuleId::MacFormat, BOTH, "MAC address format is invalid."),
            PolicyRule::new(
                RuleId::EmailFormat,
                BOTH,
                "Please enter a valid email address.",
            ),
            // The missing field name is appended at evaluation time.
            PolicyRule::new(RuleId::ProfileComplete, &[Flow::Enrolment], "Please fill the"),
            geofence,
            service_hours,
        ];
        debug_assert!(rules.iter().map(|r| r.id).eq(RuleId::PRIORITY));

        Self {
            rules,
            policy: policy.clone(),
        }
    }

    pub fn rules(&self) -> &[PolicyRule] {
        &self.rules
    }

    pub fn policy(&self) -> &PolicyConfig {
        &self.policy
    }

    /// Enabled rules for `flow`, in priority order.
    pub fn active(&self, flow: Flow) -> impl Iterator<Item = &PolicyRule> {
        self.rules.iter().filter(move |r| r.applies_to(flow))
    }

    pub fn get(&self, id: RuleId) -> Option<&PolicyRule> {
        self.rules.iter().find(|r| r.id == id)
    }

    /// Switch a rule on or off. Returns false if the rule is unknown.
    pub fn set_enabled(&mut self, id: RuleId, enabled: bool) -> bool {
        match self.rules.iter_mut().find(|r| r.id == id) {
            Some(rule) => {
                rule.enabled = enabled;
                true
            }
            None => false,
        }
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::from_config(&PolicyConfig::default())
    }
}
