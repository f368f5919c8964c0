use async_trait::async_trait;
use perka_core::{DevicePosition, LocationError, LocationProvider};
use perka_shared::Coordinates;
use tokio::sync::RwLock;

/// Scripted location source for demos and tests.
///
/// Serves a fixed position until told otherwise; `move_to` relocates the
/// device mid-session, `fail_with` simulates the platform refusing a fix.
pub struct FixedLocationProvider {
    state: RwLock<Result<DevicePosition, LocationError>>,
}

impl FixedLocationProvider {
    pub fn at(coordinates: Coordinates) -> Self {
        Self {
            state: RwLock::new(Ok(DevicePosition {
                coordinates,
                accuracy_meters: Some(10.0),
            })),
        }
    }

    pub fn failing(error: LocationError) -> Self {
        Self {
            state: RwLock::new(Err(error)),
        }
    }

    pub async fn move_to(&self, coordinates: Coordinates) {
        *self.state.write().await = Ok(DevicePosition {
            coordinates,
            accuracy_meters: Some(10.0),
        });
    }

    pub async fn fail_with(&self, error: LocationError) {
        *self.state.write().await = Err(error);
    }
}

#[async_trait]
impl LocationProvider for FixedLocationProvider {
    async fn current_position(&self) -> Result<DevicePosition, LocationError> {
        self.state.read().await.clone()
    }
}
