use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A WGS-84 position in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Both components finite, |lat| <= 90, |lng| <= 180
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude.abs() <= 90.0
            && self.longitude.abs() <= 180.0
    }
}

/// Weekly opening hours, keyed by weekday index (0 = Sunday .. 6 = Saturday).
///
/// Each entry is either `"closed"` or an `"HH:MM-HH:MM"` window, exactly as
/// the partner-management backend stores them. Parsing happens at evaluation
/// time, not here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeeklySchedule {
    days: HashMap<u8, String>,
}

impl WeeklySchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the entry for one weekday (builder style, used heavily in tests)
    pub fn with_day(mut self, weekday: u8, entry: &str) -> Self {
        self.days.insert(weekday, entry.to_string());
        self
    }

    pub fn entry(&self, weekday: u8) -> Option<&str> {
        self.days.get(&weekday).map(String::as_str)
    }
}

/// A partner business offering privileges to members.
///
/// Owned by the partner-management subsystem; read-only to the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Partner {
    pub id: Uuid,
    pub name: String,
    pub coordinates: Coordinates,
    /// Absent schedule means the partner never closes
    pub opening_hours: Option<WeeklySchedule>,
    pub default_offer_id: Uuid,
}

impl Partner {
    pub fn new(name: &str, coordinates: Coordinates, opening_hours: Option<WeeklySchedule>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            coordinates,
            opening_hours,
            default_offer_id: Uuid::new_v4(),
        }
    }
}
