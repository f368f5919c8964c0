use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, Utc};
use perka_core::{ActivationRepository, DevicePosition, LocationProvider, SubscriptionProvider};
use perka_shared::Partner;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::evaluator::EligibilityEvaluator;
use crate::report::{EligibilityReport, REASON_DETECTION_ERROR, REASON_LOCATION_UNAVAILABLE};

/// One gathered-and-evaluated eligibility pass.
///
/// The position rides along because activation creation needs the raw
/// coordinates, not just the derived distance. It is `None` exactly when
/// the report is a fail-closed one.
#[derive(Debug, Clone)]
pub struct Assessment {
    pub report: EligibilityReport,
    pub position: Option<DevicePosition>,
}

impl Assessment {
    fn unavailable(reason: &str) -> Self {
        Self {
            report: EligibilityReport::unavailable(reason),
            position: None,
        }
    }
}

/// Gathers the live signals and runs one synchronous evaluation.
///
/// Collaborators are injected; the probe holds no ambient state. Any input
/// that cannot be obtained fails the whole pass closed -- a report is never
/// assembled from partial or stale signals.
pub struct EligibilityProbe {
    evaluator: EligibilityEvaluator,
    location: Arc<dyn LocationProvider>,
    subscriptions: Arc<dyn SubscriptionProvider>,
    activations: Arc<dyn ActivationRepository>,
    location_timeout: Duration,
}

impl EligibilityProbe {
    pub fn new(
        evaluator: EligibilityEvaluator,
        location: Arc<dyn LocationProvider>,
        subscriptions: Arc<dyn SubscriptionProvider>,
        activations: Arc<dyn ActivationRepository>,
        location_timeout: Duration,
    ) -> Self {
        Self {
            evaluator,
            location,
            subscriptions,
            activations,
            location_timeout,
        }
    }

    pub async fn assess(&self, member_id: Uuid, partner: &Partner) -> Assessment {
        let position = match tokio::time::timeout(
            self.location_timeout,
            self.location.current_position(),
        )
        .await
        {
            Ok(Ok(position)) => position,
            Ok(Err(e)) => {
                warn!("could not obtain device position: {}", e);
                return Assessment::unavailable(REASON_LOCATION_UNAVAILABLE);
            }
            Err(_) => {
                warn!(
                    "device position request exceeded {:?}, failing closed",
                    self.location_timeout
                );
                return Assessment::unavailable(REASON_LOCATION_UNAVAILABLE);
            }
        };

        if !position.coordinates.is_valid() {
            warn!("device reported out-of-range coordinates, failing closed");
            return Assessment::unavailable(REASON_LOCATION_UNAVAILABLE);
        }
        if let Some(accuracy) = position.accuracy_meters {
            debug!("device fix accuracy {:.0}m", accuracy);
        }

        let subscription = match self.subscriptions.subscription_status(member_id).await {
            Ok(status) => status,
            Err(e) => {
                warn!("subscription status lookup failed: {}", e);
                return Assessment::unavailable(REASON_DETECTION_ERROR);
            }
        };

        let last_activation = match self.activations.last_activation(member_id, partner.id).await {
            Ok(last) => last,
            Err(e) => {
                warn!("activation history lookup failed: {}", e);
                return Assessment::unavailable(REASON_DETECTION_ERROR);
            }
        };

        let report = self.evaluator.evaluate(
            &position.coordinates,
            partner,
            &subscription,
            last_activation.as_ref(),
            Utc::now(),
            Local::now().naive_local(),
        );

        Assessment {
            report,
            position: Some(position),
        }
    }
}
