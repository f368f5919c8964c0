use serde::{Deserialize, Serialize};

pub const REASON_NO_SUBSCRIPTION: &str = "no active subscription";
pub const REASON_PARTNER_CLOSED: &str = "partner is currently closed";
pub const REASON_LOCATION_UNAVAILABLE: &str = "location unavailable";
pub const REASON_DETECTION_ERROR: &str = "detection error, try again shortly";

pub fn too_far_reason(distance_meters: f64) -> String {
    format!("too far ({:.0}m)", distance_meters)
}

pub fn cooldown_reason(cooldown_hours: f64) -> String {
    format!("already activated less than {}h ago", cooldown_hours)
}

/// Outcome of one eligibility evaluation.
///
/// Rebuilt from scratch on every tick and never persisted. `reasons` holds
/// one entry per failing condition, in evaluation order (subscription,
/// distance, opening hours, cooldown) -- empty exactly when `can_activate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityReport {
    pub can_activate: bool,
    pub distance_meters: Option<f64>,
    pub is_open: bool,
    pub has_subscription: bool,
    pub last_activation_hours_ago: Option<f64>,
    pub reasons: Vec<String>,
}

impl EligibilityReport {
    /// Fail-closed report for when the inputs could not be gathered.
    ///
    /// Carries no partial data: stale or defaulted coordinates must never
    /// satisfy the proximity check, so every signal field stays empty.
    pub fn unavailable(reason: &str) -> Self {
        Self {
            can_activate: false,
            distance_meters: None,
            is_open: false,
            has_subscription: false,
            last_activation_hours_ago: None,
            reasons: vec![reason.to_string()],
        }
    }
}
