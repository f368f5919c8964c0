use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineRules,
    #[serde(default)]
    pub rewards: RewardRules,
}

/// Thresholds and cadences for the activation decision
#[derive(Debug, Deserialize, Clone)]
pub struct EngineRules {
    #[serde(default = "default_radius")]
    pub proximity_radius_meters: f64,
    #[serde(default = "default_cooldown")]
    pub cooldown_hours: f64,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
    #[serde(default = "default_location_timeout")]
    pub location_timeout_seconds: u64,
    /// How long a freshly issued validation code stays valid
    #[serde(default = "default_validity")]
    pub activation_validity_minutes: i64,
}

fn default_radius() -> f64 {
    100.0
}
fn default_cooldown() -> f64 {
    24.0
}
fn default_poll_interval() -> u64 {
    30
}
fn default_location_timeout() -> u64 {
    10
}
fn default_validity() -> i64 {
    15
}

impl Default for EngineRules {
    fn default() -> Self {
        Self {
            proximity_radius_meters: default_radius(),
            cooldown_hours: default_cooldown(),
            poll_interval_seconds: default_poll_interval(),
            location_timeout_seconds: default_location_timeout(),
            activation_validity_minutes: default_validity(),
        }
    }
}

impl EngineRules {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    pub fn location_timeout(&self) -> Duration {
        Duration::from_secs(self.location_timeout_seconds)
    }

    pub fn activation_validity(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.activation_validity_minutes)
    }
}

/// Loyalty points granted by the in-memory activation store
#[derive(Debug, Deserialize, Clone)]
pub struct RewardRules {
    #[serde(default = "default_feedback_points")]
    pub feedback_points: i64,
}

fn default_feedback_points() -> i64 {
    20
}

impl Default for RewardRules {
    fn default() -> Self {
        Self {
            feedback_points: default_feedback_points(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Optional defaults file; every field has a serde default
            .add_source(config::File::with_name("config/default").required(false))
            // Environment overlay, e.g. config/production
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // E.g. PERKA__ENGINE__COOLDOWN_HOURS=12
            .add_source(config::Environment::with_prefix("PERKA").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
