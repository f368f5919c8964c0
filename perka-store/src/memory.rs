use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Duration;
use perka_core::{ActivationRepository, FeedbackReceipt, PartnerProvider, SubscriptionProvider};
use perka_shared::{ActivationRecord, Coordinates, Partner, SubscriptionStatus};
use rand::distributions::Alphanumeric;
use rand::Rng;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::app_config::{Config, RewardRules};

const VALIDATION_CODE_LEN: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("activation not found: {0}")]
    ActivationNotFound(String),

    #[error("feedback already recorded for activation {0}")]
    FeedbackAlreadyRecorded(String),
}

/// In-memory partner directory
#[derive(Default)]
pub struct MemoryPartnerStore {
    partners: RwLock<HashMap<Uuid, Partner>>,
}

impl MemoryPartnerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, partner: Partner) {
        self.partners.write().await.insert(partner.id, partner);
    }
}

#[async_trait]
impl PartnerProvider for MemoryPartnerStore {
    async fn partner(
        &self,
        partner_id: Uuid,
    ) -> Result<Option<Partner>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.partners.read().await.get(&partner_id).cloned())
    }
}

/// In-memory membership backend.
///
/// Unknown members read as inactive, the same answer the real backend gives
/// for someone who never subscribed.
#[derive(Default)]
pub struct MemorySubscriptionStore {
    members: RwLock<HashMap<Uuid, SubscriptionStatus>>,
}

impl MemorySubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_active(&self, member_id: Uuid, active: bool) {
        self.members
            .write()
            .await
            .insert(member_id, SubscriptionStatus { active });
    }
}

#[async_trait]
impl SubscriptionProvider for MemorySubscriptionStore {
    async fn subscription_status(
        &self,
        member_id: Uuid,
    ) -> Result<SubscriptionStatus, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self
            .members
            .read()
            .await
            .get(&member_id)
            .copied()
            .unwrap_or_else(SubscriptionStatus::inactive))
    }
}

/// In-memory activation ledger: issues validation codes, tracks history,
/// enforces the set-once feedback rule.
pub struct MemoryActivationStore {
    records: RwLock<HashMap<Uuid, ActivationRecord>>,
    validity: Duration,
    rewards: RewardRules,
}

impl MemoryActivationStore {
    pub fn new() -> Self {
        Self::with_rules(Duration::minutes(15), RewardRules::default())
    }

    pub fn with_rules(validity: Duration, rewards: RewardRules) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            validity,
            rewards,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::with_rules(config.engine.activation_validity(), config.rewards.clone())
    }

    /// Preload a record, e.g. an earlier activation for cooldown scenarios
    pub async fn seed(&self, record: ActivationRecord) {
        self.records.write().await.insert(record.id, record);
    }

    pub async fn get(&self, activation_id: Uuid) -> Option<ActivationRecord> {
        self.records.read().await.get(&activation_id).cloned()
    }

    fn generate_validation_code() -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(VALIDATION_CODE_LEN)
            .map(char::from)
            .collect::<String>()
            .to_uppercase()
    }
}

impl Default for MemoryActivationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ActivationRepository for MemoryActivationStore {
    async fn last_activation(
        &self,
        member_id: Uuid,
        partner_id: Uuid,
    ) -> Result<Option<ActivationRecord>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .filter(|r| r.member_id == member_id && r.partner_id == partner_id)
            .max_by_key(|r| r.activated_at)
            .cloned())
    }

    async fn create_activation(
        &self,
        member_id: Uuid,
        partner_id: Uuid,
        offer_id: Uuid,
        _location: Coordinates,
    ) -> Result<ActivationRecord, Box<dyn std::error::Error + Send + Sync>> {
        let record = ActivationRecord::new(
            member_id,
            partner_id,
            offer_id,
            Self::generate_validation_code(),
            self.validity,
        );
        info!(
            "activation {} issued for member {} at partner {}",
            record.id, member_id, partner_id
        );
        self.records.write().await.insert(record.id, record.clone());
        Ok(record)
    }

    async fn submit_feedback(
        &self,
        activation_id: Uuid,
        rating: u8,
        comment: Option<String>,
        _savings_amount: Option<f64>,
    ) -> Result<FeedbackReceipt, Box<dyn std::error::Error + Send + Sync>> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(&activation_id)
            .ok_or_else(|| StoreError::ActivationNotFound(activation_id.to_string()))?;

        if record.has_feedback() {
            return Err(StoreError::FeedbackAlreadyRecorded(activation_id.to_string()).into());
        }

        let points_awarded = self.rewards.feedback_points;
        record.record_feedback(rating, comment, points_awarded);
        Ok(FeedbackReceipt { points_awarded })
    }
}
