use uuid::Uuid;

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct EligibilityChangedEvent {
    pub member_id: Uuid,
    pub partner_id: Uuid,
    pub can_activate: bool,
    pub reasons: Vec<String>,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct ActivationCreatedEvent {
    pub activation_id: Uuid,
    pub member_id: Uuid,
    pub partner_id: Uuid,
    pub offer_id: Uuid,
    pub expires_at: i64,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct FeedbackSubmittedEvent {
    pub activation_id: Uuid,
    pub rating: u8,
    pub points_awarded: i64,
    pub timestamp: i64,
}
