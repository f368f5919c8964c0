use serde::{Deserialize, Serialize};

/// Subscription state as reported by the membership backend.
///
/// The engine only gates on the boolean; why a subscription is inactive
/// (expired vs. never purchased) is not its business. Never cached beyond
/// one evaluation cycle -- it can change between polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionStatus {
    pub active: bool,
}

impl SubscriptionStatus {
    pub fn active() -> Self {
        Self { active: true }
    }

    pub fn inactive() -> Self {
        Self { active: false }
    }
}
