use crate::pii::Masked;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One redeemed privilege: the record behind a validation code.
///
/// Created once per successful activation and immutable afterwards, except
/// for the feedback fields which are set exactly once. The canonical record
/// persists server-side regardless of how long the session view lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivationRecord {
    pub id: Uuid,
    pub member_id: Uuid,
    pub partner_id: Uuid,
    pub offer_id: Uuid,
    /// Opaque token shown to staff; masked in Debug/log output
    pub validation_code: Masked<String>,
    pub activated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub feedback_rating: Option<u8>,
    pub feedback_comment: Option<String>,
    pub feedback_points_awarded: Option<i64>,
}

impl ActivationRecord {
    /// Create a record valid for `validity` from now
    pub fn new(
        member_id: Uuid,
        partner_id: Uuid,
        offer_id: Uuid,
        validation_code: String,
        validity: Duration,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            member_id,
            partner_id,
            offer_id,
            validation_code: Masked(validation_code),
            activated_at: now,
            expires_at: now + validity,
            feedback_rating: None,
            feedback_comment: None,
            feedback_points_awarded: None,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Seconds until the validation code stops being honored (0 when past)
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds().max(0)
    }

    pub fn has_feedback(&self) -> bool {
        self.feedback_rating.is_some()
    }

    /// Write the one-shot feedback fields. Callers are responsible for the
    /// set-once rule; the store rejects a second submission before this runs.
    pub fn record_feedback(&mut self, rating: u8, comment: Option<String>, points_awarded: i64) {
        self.feedback_rating = Some(rating);
        self.feedback_comment = comment;
        self.feedback_points_awarded = Some(points_awarded);
    }
}
