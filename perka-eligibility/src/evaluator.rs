use chrono::{DateTime, NaiveDateTime, Utc};
use perka_shared::{ActivationRecord, Coordinates, Partner, SubscriptionStatus};
use serde::{Deserialize, Serialize};

use crate::report::{
    cooldown_reason, too_far_reason, EligibilityReport, REASON_NO_SUBSCRIPTION,
    REASON_PARTNER_CLOSED,
};
use crate::{cooldown, geo, hours};

/// Thresholds for the activation decision
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilityPolicy {
    pub max_distance_meters: f64,
    pub cooldown_hours: f64,
}

impl Default for EligibilityPolicy {
    fn default() -> Self {
        Self {
            max_distance_meters: 100.0,
            cooldown_hours: 24.0,
        }
    }
}

impl EligibilityPolicy {
    /// Boundary-inclusive: a member standing exactly on the radius qualifies
    pub fn within_radius(&self, distance_meters: f64) -> bool {
        distance_meters <= self.max_distance_meters
    }

    /// Blocked strictly inside the window; exactly at the boundary is clear
    pub fn in_cooldown(&self, hours_ago: f64) -> bool {
        hours_ago < self.cooldown_hours
    }
}

/// Aggregates the four activation signals into one decision.
///
/// Synchronous and side-effect-free given its inputs; gathering the live
/// signals is `EligibilityProbe`'s job.
pub struct EligibilityEvaluator {
    policy: EligibilityPolicy,
}

impl EligibilityEvaluator {
    pub fn new(policy: EligibilityPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &EligibilityPolicy {
        &self.policy
    }

    /// All four conditions must hold at once: active subscription, member
    /// within the radius, partner open, and no activation at this partner
    /// inside the cooldown window.
    ///
    /// Reasons are additive, never short-circuited: the caller always sees
    /// every blocking factor, one entry per failing condition. `now` drives
    /// the cooldown arithmetic; `wall_clock` is the partner-local time the
    /// opening hours are read against.
    pub fn evaluate(
        &self,
        member_location: &Coordinates,
        partner: &Partner,
        subscription: &SubscriptionStatus,
        last_activation: Option<&ActivationRecord>,
        now: DateTime<Utc>,
        wall_clock: NaiveDateTime,
    ) -> EligibilityReport {
        let mut reasons = Vec::new();

        let has_subscription = subscription.active;
        if !has_subscription {
            reasons.push(REASON_NO_SUBSCRIPTION.to_string());
        }

        let distance = geo::distance_meters(member_location, &partner.coordinates);
        if !self.policy.within_radius(distance) {
            reasons.push(too_far_reason(distance));
        }

        let is_open = hours::is_open_at(partner.opening_hours.as_ref(), wall_clock);
        if !is_open {
            reasons.push(REASON_PARTNER_CLOSED.to_string());
        }

        let hours_ago = last_activation.map(|record| cooldown::hours_since(record.activated_at, now));
        if let Some(h) = hours_ago {
            if self.policy.in_cooldown(h) {
                reasons.push(cooldown_reason(self.policy.cooldown_hours));
            }
        }

        EligibilityReport {
            can_activate: reasons.is_empty(),
            distance_meters: Some(distance),
            is_open,
            has_subscription,
            last_activation_hours_ago: hours_ago,
            reasons,
        }
    }
}
