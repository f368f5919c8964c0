use async_trait::async_trait;
use perka_shared::{ActivationRecord, Coordinates, Partner, SubscriptionStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Why the device position could not be obtained.
///
/// The engine branches on this: every variant fails the whole evaluation
/// closed, but the surfaced reason differs from a backend outage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("location request timed out")]
    Timeout,

    #[error("geolocation not supported on this device")]
    Unsupported,
}

/// A device fix as delivered by the platform location service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DevicePosition {
    pub coordinates: Coordinates,
    pub accuracy_meters: Option<f64>,
}

/// Loyalty points granted for a feedback submission
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FeedbackReceipt {
    pub points_awarded: i64,
}

/// Source of the member's live position (device GPS, browser API, ...)
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_position(&self) -> Result<DevicePosition, LocationError>;
}

/// Read access to partner records
#[async_trait]
pub trait PartnerProvider: Send + Sync {
    async fn partner(
        &self,
        partner_id: Uuid,
    ) -> Result<Option<Partner>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Membership backend: is this member's subscription currently active?
#[async_trait]
pub trait SubscriptionProvider: Send + Sync {
    async fn subscription_status(
        &self,
        member_id: Uuid,
    ) -> Result<SubscriptionStatus, Box<dyn std::error::Error + Send + Sync>>;
}

/// Activation persistence: history lookups, record creation, feedback.
///
/// The canonical records live server-side; the engine only ever sees them
/// through this seam.
#[async_trait]
pub trait ActivationRepository: Send + Sync {
    /// Most recent activation for the (member, partner) pair, if any
    async fn last_activation(
        &self,
        member_id: Uuid,
        partner_id: Uuid,
    ) -> Result<Option<ActivationRecord>, Box<dyn std::error::Error + Send + Sync>>;

    /// Create the activation record and issue its validation code
    async fn create_activation(
        &self,
        member_id: Uuid,
        partner_id: Uuid,
        offer_id: Uuid,
        location: Coordinates,
    ) -> Result<ActivationRecord, Box<dyn std::error::Error + Send + Sync>>;

    /// Attach one-shot feedback to an activation
    async fn submit_feedback(
        &self,
        activation_id: Uuid,
        rating: u8,
        comment: Option<String>,
        savings_amount: Option<f64>,
    ) -> Result<FeedbackReceipt, Box<dyn std::error::Error + Send + Sync>>;
}
