pub mod app_config;
pub mod location;
pub mod memory;

pub use app_config::{Config, EngineRules, RewardRules};
pub use location::FixedLocationProvider;
pub use memory::{MemoryActivationStore, MemoryPartnerStore, MemorySubscriptionStore, StoreError};
