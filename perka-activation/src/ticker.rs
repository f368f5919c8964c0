use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Cosmetic 1 Hz countdown for the validation-code display.
///
/// Purely presentational: nothing about activation correctness rides on
/// this feed. It emits the whole seconds left until `expires_at`, stops at
/// zero, and dies with the token or when the last receiver is dropped.
pub fn remaining_seconds_feed(
    expires_at: DateTime<Utc>,
    cancel: CancellationToken,
) -> watch::Receiver<i64> {
    let (tx, rx) = watch::channel((expires_at - Utc::now()).num_seconds().max(0));

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(1));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }
            let remaining = (expires_at - Utc::now()).num_seconds().max(0);
            if tx.send(remaining).is_err() {
                // display went away
                break;
            }
            if remaining == 0 {
                break;
            }
        }
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn counts_down_and_stops_at_zero() {
        let cancel = CancellationToken::new();
        let mut feed = remaining_seconds_feed(Utc::now() + Duration::seconds(2), cancel);

        let first = *feed.borrow();
        assert!(first <= 2);

        // the feed must reach zero and stay non-negative on the way down
        loop {
            if feed.changed().await.is_err() {
                break;
            }
            let remaining = *feed.borrow();
            assert!(remaining >= 0);
            if remaining == 0 {
                break;
            }
        }
    }

    #[tokio::test]
    async fn cancellation_ends_the_feed() {
        let cancel = CancellationToken::new();
        let mut feed = remaining_seconds_feed(Utc::now() + Duration::minutes(10), cancel.clone());

        cancel.cancel();

        // once the task exits the sender is dropped and changed() errors out
        while feed.changed().await.is_ok() {}
    }
}
