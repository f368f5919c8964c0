use std::sync::Arc;

use perka_core::{ActivationRepository, FeedbackReceipt};
use tracing::info;
use uuid::Uuid;

/// What the member filled in on the feedback form.
///
/// `rating` of 0 means "not set" -- the form starts there.
#[derive(Debug, Clone, Default)]
pub struct FeedbackDraft {
    pub rating: u8,
    pub comment: Option<String>,
    pub savings_amount: Option<f64>,
}

#[derive(Debug, thiserror::Error)]
pub enum FeedbackError {
    #[error("a rating is required")]
    MissingRating,

    #[error("rating {0} is outside the 1-5 range")]
    RatingOutOfRange(u8),

    #[error("savings amount must be a finite, non-negative number")]
    InvalidSavings,

    #[error("feedback submission failed: {0}")]
    SubmissionFailed(String),
}

/// Validates and forwards post-activation feedback.
///
/// Invalid drafts are rejected before anything leaves the device. One
/// submission per activation is the expectation; the session enforces it by
/// state, and the store collaborator owns the real set-once rule.
pub struct FeedbackCollector {
    activations: Arc<dyn ActivationRepository>,
}

impl FeedbackCollector {
    pub fn new(activations: Arc<dyn ActivationRepository>) -> Self {
        Self { activations }
    }

    pub async fn submit(
        &self,
        activation_id: Uuid,
        draft: &FeedbackDraft,
    ) -> Result<FeedbackReceipt, FeedbackError> {
        if draft.rating == 0 {
            return Err(FeedbackError::MissingRating);
        }
        if draft.rating > 5 {
            return Err(FeedbackError::RatingOutOfRange(draft.rating));
        }
        if let Some(savings) = draft.savings_amount {
            if !savings.is_finite() || savings < 0.0 {
                return Err(FeedbackError::InvalidSavings);
            }
        }

        let receipt = self
            .activations
            .submit_feedback(
                activation_id,
                draft.rating,
                draft.comment.clone(),
                draft.savings_amount,
            )
            .await
            .map_err(|e| FeedbackError::SubmissionFailed(e.to_string()))?;

        info!(
            "feedback recorded for activation {} ({} points awarded)",
            activation_id, receipt.points_awarded
        );
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use perka_shared::{ActivationRecord, Coordinates};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingRepo {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ActivationRepository for CountingRepo {
        async fn last_activation(
            &self,
            _member_id: Uuid,
            _partner_id: Uuid,
        ) -> Result<Option<ActivationRecord>, Box<dyn std::error::Error + Send + Sync>> {
            Ok(None)
        }

        async fn create_activation(
            &self,
            _member_id: Uuid,
            _partner_id: Uuid,
            _offer_id: Uuid,
            _location: Coordinates,
        ) -> Result<ActivationRecord, Box<dyn std::error::Error + Send + Sync>> {
            Err("not under test".into())
        }

        async fn submit_feedback(
            &self,
            _activation_id: Uuid,
            _rating: u8,
            _comment: Option<String>,
            _savings_amount: Option<f64>,
        ) -> Result<FeedbackReceipt, Box<dyn std::error::Error + Send + Sync>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(FeedbackReceipt { points_awarded: 20 })
        }
    }

    #[tokio::test]
    async fn unset_rating_never_reaches_the_backend() {
        let repo = Arc::new(CountingRepo::default());
        let collector = FeedbackCollector::new(repo.clone());

        let result = collector
            .submit(Uuid::new_v4(), &FeedbackDraft::default())
            .await;

        assert!(matches!(result, Err(FeedbackError::MissingRating)));
        assert_eq!(repo.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn out_of_range_rating_is_rejected_locally() {
        let repo = Arc::new(CountingRepo::default());
        let collector = FeedbackCollector::new(repo.clone());

        let draft = FeedbackDraft {
            rating: 6,
            ..Default::default()
        };
        let result = collector.submit(Uuid::new_v4(), &draft).await;

        assert!(matches!(result, Err(FeedbackError::RatingOutOfRange(6))));
        assert_eq!(repo.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn negative_savings_are_rejected_locally() {
        let repo = Arc::new(CountingRepo::default());
        let collector = FeedbackCollector::new(repo.clone());

        let draft = FeedbackDraft {
            rating: 4,
            savings_amount: Some(-3.0),
            ..Default::default()
        };
        let result = collector.submit(Uuid::new_v4(), &draft).await;

        assert!(matches!(result, Err(FeedbackError::InvalidSavings)));
        assert_eq!(repo.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn rating_without_comment_is_enough() {
        let repo = Arc::new(CountingRepo::default());
        let collector = FeedbackCollector::new(repo.clone());

        let draft = FeedbackDraft {
            rating: 3,
            ..Default::default()
        };
        let receipt = collector.submit(Uuid::new_v4(), &draft).await.unwrap();

        assert_eq!(receipt.points_awarded, 20);
        assert_eq!(repo.calls.load(Ordering::SeqCst), 1);
    }
}
