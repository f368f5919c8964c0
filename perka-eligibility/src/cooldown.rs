use chrono::{DateTime, Utc};

/// Hours elapsed since `activated_at`, with millisecond precision
pub fn hours_since(activated_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (now - activated_at).num_milliseconds() as f64 / 3_600_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn fractional_hours() {
        let now = Utc::now();
        let earlier = now - Duration::minutes(90);
        assert!((hours_since(earlier, now) - 1.5).abs() < 1e-9);
    }

    #[test]
    fn around_the_24h_mark() {
        let now = Utc::now();
        assert!(hours_since(now - Duration::minutes(23 * 60 + 59), now) < 24.0);
        assert!(hours_since(now - Duration::minutes(24 * 60 + 1), now) > 24.0);
    }
}
