//! Validation engine.
//!
//! A [`RuleSet`] holds every [`PolicyRule`] in fixed priority order, each
//! tagged with the flows it applies to and an enabled flag. [`validate`]
//! walks the active rules and stops at the first failure. It is a pure
//! function of the record, the rule set and the wall-clock context: no I/O,
//! no mutation. A passing record comes back wrapped in [`Verified`], the
//! only form the submission pipeline accepts.

pub mod engine;
pub mod format;
pub mod policy;
pub mod rule;

pub use engine::{validate, ValidationContext, ValidationFailure, Verified};
pub use format::{is_valid_email, is_valid_mac};
pub use policy::{GeofenceConfig, PolicyConfig, ServiceHoursConfig};
pub use rule::{PolicyRule, RuleId, RuleSet};
