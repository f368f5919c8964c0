use perka_shared::models::events::{
    ActivationCreatedEvent, EligibilityChangedEvent, FeedbackSubmittedEvent,
};

/// Lifecycle notifications for the embedding UI/analytics layer.
///
/// Delivered over an in-process broadcast channel; slow or absent listeners
/// never block the session.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    EligibilityChanged(EligibilityChangedEvent),
    ActivationCreated(ActivationCreatedEvent),
    FeedbackSubmitted(FeedbackSubmittedEvent),
}
