use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::Utc;
use perka_core::{ActivationRepository, FeedbackReceipt};
use perka_eligibility::{Assessment, EligibilityProbe, EligibilityReport};
use perka_shared::models::events::{
    ActivationCreatedEvent, EligibilityChangedEvent, FeedbackSubmittedEvent,
};
use perka_shared::{ActivationRecord, Partner};
use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::events::EngineEvent;
use crate::feedback::{FeedbackCollector, FeedbackDraft};
use crate::ticker;

const EVENT_CHANNEL_SIZE: usize = 64;

/// Where a session currently stands in the activation lifecycle
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "phase", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    Idle,
    Detecting,
    Eligible(EligibilityReport),
    Ineligible(EligibilityReport),
    Activating,
    Active {
        record: ActivationRecord,
    },
    AwaitingFeedback {
        record: ActivationRecord,
    },
    FeedbackSubmitted {
        record: ActivationRecord,
        points_awarded: i64,
    },
    Closed,
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Detecting => "detecting",
            SessionState::Eligible(_) => "eligible",
            SessionState::Ineligible(_) => "ineligible",
            SessionState::Activating => "activating",
            SessionState::Active { .. } => "active",
            SessionState::AwaitingFeedback { .. } => "awaiting_feedback",
            SessionState::FeedbackSubmitted { .. } => "feedback_submitted",
            SessionState::Closed => "closed",
        }
    }

    /// The detection loop only runs in these states
    fn is_polling(&self) -> bool {
        matches!(
            self,
            SessionState::Detecting | SessionState::Eligible(_) | SessionState::Ineligible(_)
        )
    }
}

/// What came of an activation request.
///
/// A refusal is normal business data, not an error: the fresh check found a
/// condition that stopped holding since the last poll.
#[derive(Debug, Clone)]
pub enum ActivationOutcome {
    Activated(ActivationRecord),
    Refused(EligibilityReport),
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("invalid session transition from {from} to {to}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },

    #[error("activation request failed: {0}")]
    ActivationFailed(String),

    #[error(transparent)]
    Feedback(#[from] crate::feedback::FeedbackError),
}

/// Cadence knobs, usually sourced from the config layer
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub poll_interval: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
        }
    }
}

/// One member looking at one partner's privilege: the activation lifecycle.
///
/// `Idle -> Detecting -> {Eligible | Ineligible} -> Activating -> Active ->
/// {AwaitingFeedback -> FeedbackSubmitted} -> Closed`. Eligibility is
/// re-assessed once on start and every `poll_interval` after that;
/// `Ineligible` keeps looping through `Detecting` until conditions are met
/// or the member navigates away. State is published through a watch channel,
/// lifecycle moments through a broadcast channel. All collaborators are
/// injected -- the session reads no ambient state.
///
/// The poll task holds only a weak handle: `close()` ends it immediately,
/// and dropping the last strong handle ends it on its next tick.
pub struct ActivationSession {
    member_id: Uuid,
    partner: Partner,
    probe: Arc<EligibilityProbe>,
    activations: Arc<dyn ActivationRepository>,
    feedback: FeedbackCollector,
    state_tx: watch::Sender<SessionState>,
    events: broadcast::Sender<EngineEvent>,
    cancel: CancellationToken,
    poll_interval: Duration,
}

impl ActivationSession {
    pub fn new(
        member_id: Uuid,
        partner: Partner,
        probe: Arc<EligibilityProbe>,
        activations: Arc<dyn ActivationRepository>,
        settings: SessionSettings,
    ) -> Arc<Self> {
        let (state_tx, _) = watch::channel(SessionState::Idle);
        let (events, _) = broadcast::channel(EVENT_CHANNEL_SIZE);

        Arc::new(Self {
            member_id,
            partner,
            probe,
            feedback: FeedbackCollector::new(activations.clone()),
            activations,
            state_tx,
            events,
            cancel: CancellationToken::new(),
            poll_interval: settings.poll_interval,
        })
    }

    /// Observe the session state (current value plus change notifications)
    pub fn state(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    pub fn current_state(&self) -> SessionState {
        self.state_tx.borrow().clone()
    }

    /// Subscribe to lifecycle events (eligibility flips, activation, feedback)
    pub fn events(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    /// Begin detection: transitions `Idle -> Detecting` and spawns the poll
    /// task (one immediate evaluation, then one per interval). Calling it on
    /// an already-started session is a no-op.
    pub fn start(self: &Arc<Self>) {
        let started = self.state_tx.send_if_modified(|state| {
            if matches!(state, SessionState::Idle) {
                *state = SessionState::Detecting;
                true
            } else {
                false
            }
        });
        if !started {
            debug!("session already started, ignoring start()");
            return;
        }

        info!(
            "activation session started for member {} at partner '{}'",
            self.member_id, self.partner.name
        );
        let session = Arc::downgrade(self);
        tokio::spawn(Self::poll_loop(session));
    }

    /// Request activation. Only valid from `Eligible`, and even then the
    /// last poll may be a whole interval old, so all four conditions are
    /// re-assessed freshly before the record is created. A failed fresh
    /// check comes back as `Refused` -- data, not an error.
    pub async fn activate(&self) -> Result<ActivationOutcome, SessionError> {
        let from = self.state_name();
        let accepted = self.state_tx.send_if_modified(|state| {
            if matches!(state, SessionState::Eligible(_)) {
                *state = SessionState::Activating;
                true
            } else {
                false
            }
        });
        if !accepted {
            return Err(SessionError::InvalidTransition {
                from,
                to: "activating",
            });
        }

        let assessment = self.probe.assess(self.member_id, &self.partner).await;
        if !assessment.report.can_activate {
            info!(
                "activation refused on fresh check: {:?}",
                assessment.report.reasons
            );
            let report = assessment.report.clone();
            self.state_tx.send_if_modified(|state| {
                if matches!(state, SessionState::Activating) {
                    *state = SessionState::Ineligible(report.clone());
                    true
                } else {
                    false
                }
            });
            return Ok(ActivationOutcome::Refused(assessment.report));
        }

        let location = match &assessment.position {
            Some(position) => position.coordinates,
            // an eligible report always carries the position it was built from
            None => {
                self.revert_to_detecting();
                return Err(SessionError::ActivationFailed(
                    "eligible assessment carried no position".to_string(),
                ));
            }
        };

        match self
            .activations
            .create_activation(
                self.member_id,
                self.partner.id,
                self.partner.default_offer_id,
                location,
            )
            .await
        {
            Ok(record) => {
                info!(
                    "activation {} created at partner '{}', expires {}",
                    record.id, self.partner.name, record.expires_at
                );
                self.state_tx.send_if_modified(|state| {
                    if matches!(state, SessionState::Activating) {
                        *state = SessionState::Active {
                            record: record.clone(),
                        };
                        true
                    } else {
                        false
                    }
                });
                self.emit(EngineEvent::ActivationCreated(ActivationCreatedEvent {
                    activation_id: record.id,
                    member_id: record.member_id,
                    partner_id: record.partner_id,
                    offer_id: record.offer_id,
                    expires_at: record.expires_at.timestamp(),
                    timestamp: Utc::now().timestamp(),
                }));
                Ok(ActivationOutcome::Activated(record))
            }
            Err(e) => {
                warn!("activation creation failed: {}", e);
                self.revert_to_detecting();
                Err(SessionError::ActivationFailed(e.to_string()))
            }
        }
    }

    /// Open the feedback form. Optional; only valid from `Active`.
    pub fn begin_feedback(&self) -> Result<(), SessionError> {
        let from = self.state_name();
        let moved = self.state_tx.send_if_modified(|state| {
            if let SessionState::Active { record } = state {
                *state = SessionState::AwaitingFeedback {
                    record: record.clone(),
                };
                true
            } else {
                false
            }
        });
        if moved {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                from,
                to: "awaiting_feedback",
            })
        }
    }

    /// Submit the feedback form. A locally invalid draft (no rating,
    /// out-of-range values) is rejected without any collaborator call and
    /// without a state change.
    pub async fn submit_feedback(
        &self,
        draft: FeedbackDraft,
    ) -> Result<FeedbackReceipt, SessionError> {
        let record = {
            match &*self.state_tx.borrow() {
                SessionState::AwaitingFeedback { record } => record.clone(),
                state => {
                    return Err(SessionError::InvalidTransition {
                        from: state.name(),
                        to: "feedback_submitted",
                    })
                }
            }
        };

        let receipt = self.feedback.submit(record.id, &draft).await?;

        self.state_tx.send_if_modified(|state| {
            if matches!(state, SessionState::AwaitingFeedback { .. }) {
                *state = SessionState::FeedbackSubmitted {
                    record: record.clone(),
                    points_awarded: receipt.points_awarded,
                };
                true
            } else {
                false
            }
        });
        self.emit(EngineEvent::FeedbackSubmitted(FeedbackSubmittedEvent {
            activation_id: record.id,
            rating: draft.rating,
            points_awarded: receipt.points_awarded,
            timestamp: Utc::now().timestamp(),
        }));
        Ok(receipt)
    }

    /// Dismiss the session. Terminal from any state: polling stops, any
    /// in-flight evaluation is cancelled, nothing outlives the call.
    pub fn close(&self) {
        let closed = self.state_tx.send_if_modified(|state| {
            if matches!(state, SessionState::Closed) {
                false
            } else {
                *state = SessionState::Closed;
                true
            }
        });
        if closed {
            info!("activation session closed");
            self.cancel.cancel();
        }
    }

    /// Cosmetic 1 Hz countdown to the validation code's expiry.
    ///
    /// Available once a record exists; `None` before that. Stops with the
    /// session.
    pub fn expiry_clock(&self) -> Option<watch::Receiver<i64>> {
        let record = match &*self.state_tx.borrow() {
            SessionState::Active { record }
            | SessionState::AwaitingFeedback { record }
            | SessionState::FeedbackSubmitted { record, .. } => record.clone(),
            _ => return None,
        };
        Some(ticker::remaining_seconds_feed(
            record.expires_at,
            self.cancel.child_token(),
        ))
    }

    async fn poll_loop(session: Weak<ActivationSession>) {
        let (mut poll_timer, cancel) = match session.upgrade() {
            Some(s) => (tokio::time::interval(s.poll_interval), s.cancel.clone()),
            None => return,
        };
        poll_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last_decision: Option<bool> = None;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = poll_timer.tick() => {}
            }

            let s = match session.upgrade() {
                Some(s) => s,
                None => break,
            };

            // Re-detection only happens in the eligibility loop; once a
            // record exists (or a request is mid-flight) the tick is idle.
            let detecting = s.state_tx.send_if_modified(|state| {
                if state.is_polling() {
                    *state = SessionState::Detecting;
                    true
                } else {
                    false
                }
            });
            if !detecting {
                continue;
            }

            let assessment = tokio::select! {
                _ = cancel.cancelled() => break,
                assessment = s.probe.assess(s.member_id, &s.partner) => assessment,
            };
            s.publish_assessment(assessment, &mut last_decision);
        }
        debug!("eligibility poll loop stopped");
    }

    /// Install the tick's result, unless something else (activation, close)
    /// superseded it -- a stale report must never overwrite a later state.
    fn publish_assessment(&self, assessment: Assessment, last_decision: &mut Option<bool>) {
        let report = assessment.report;
        let can_activate = report.can_activate;
        let reasons = report.reasons.clone();

        let published = self.state_tx.send_if_modified(|state| {
            if matches!(state, SessionState::Detecting) {
                *state = if can_activate {
                    SessionState::Eligible(report.clone())
                } else {
                    SessionState::Ineligible(report.clone())
                };
                true
            } else {
                false
            }
        });
        if !published {
            debug!("discarding superseded eligibility result");
            return;
        }

        if *last_decision != Some(can_activate) {
            self.emit(EngineEvent::EligibilityChanged(EligibilityChangedEvent {
                member_id: self.member_id,
                partner_id: self.partner.id,
                can_activate,
                reasons,
                timestamp: Utc::now().timestamp(),
            }));
        }
        *last_decision = Some(can_activate);
    }

    fn revert_to_detecting(&self) {
        self.state_tx.send_if_modified(|state| {
            if matches!(state, SessionState::Activating) {
                *state = SessionState::Detecting;
                true
            } else {
                false
            }
        });
    }

    fn state_name(&self) -> &'static str {
        self.state_tx.borrow().name()
    }

    fn emit(&self, event: EngineEvent) {
        // no listeners is fine
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_names_cover_every_phase() {
        assert_eq!(SessionState::Idle.name(), "idle");
        assert_eq!(SessionState::Detecting.name(), "detecting");
        assert_eq!(SessionState::Closed.name(), "closed");
        assert!(SessionState::Detecting.is_polling());
        assert!(!SessionState::Closed.is_polling());
        assert!(!SessionState::Activating.is_polling());
    }

    #[test]
    fn state_serializes_with_a_phase_tag() {
        let json = serde_json::to_value(SessionState::Detecting).unwrap();
        assert_eq!(json["phase"], "DETECTING");
    }
}
