use chrono::{Datelike, NaiveDateTime, NaiveTime, Timelike};
use perka_shared::WeeklySchedule;

const CLOSED: &str = "closed";

/// Minute-of-day window, inclusive at both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DayWindow {
    open: u32,
    close: u32,
}

fn parse_window(entry: &str) -> Option<DayWindow> {
    let (open, close) = entry.split_once('-')?;
    let open = NaiveTime::parse_from_str(open.trim(), "%H:%M").ok()?;
    let close = NaiveTime::parse_from_str(close.trim(), "%H:%M").ok()?;
    Some(DayWindow {
        open: open.hour() * 60 + open.minute(),
        close: close.hour() * 60 + close.minute(),
    })
}

/// Is the partner open at `now` (partner-local wall-clock time)?
///
/// An absent schedule means the partner never closes. A missing weekday
/// entry or `"closed"` means closed for the whole day. Window boundaries
/// are inclusive on both ends: a partner open "09:00-18:00" still accepts
/// an activation at exactly 18:00. A window whose close precedes its open
/// is empty; hours past midnight need a second day entry.
pub fn is_open_at(schedule: Option<&WeeklySchedule>, now: NaiveDateTime) -> bool {
    let schedule = match schedule {
        Some(s) => s,
        None => return true,
    };

    let weekday = now.weekday().num_days_from_sunday() as u8;
    let entry = match schedule.entry(weekday) {
        Some(e) => e,
        None => return false,
    };
    if entry.eq_ignore_ascii_case(CLOSED) {
        return false;
    }

    match parse_window(entry) {
        Some(window) => {
            let minutes = now.hour() * 60 + now.minute();
            window.open <= minutes && minutes <= window.close
        }
        None => {
            tracing::debug!("unparseable opening hours entry '{}', treating as closed", entry);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    // 2024-01-07 was a Sunday (weekday index 0)
    fn sunday_at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 7)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn shop_hours() -> WeeklySchedule {
        WeeklySchedule::new()
            .with_day(0, "09:00-18:00")
            .with_day(1, "closed")
    }

    #[test]
    fn absent_schedule_means_always_open() {
        assert!(is_open_at(None, sunday_at(3, 12)));
    }

    #[test]
    fn closed_entry_is_closed_all_day() {
        let monday = sunday_at(12, 0) + chrono::Duration::days(1);
        assert!(!is_open_at(Some(&shop_hours()), monday));
    }

    #[test]
    fn missing_weekday_is_closed() {
        let tuesday = sunday_at(12, 0) + chrono::Duration::days(2);
        assert!(!is_open_at(Some(&shop_hours()), tuesday));
    }

    #[test]
    fn inside_the_window() {
        assert!(is_open_at(Some(&shop_hours()), sunday_at(12, 30)));
    }

    #[test]
    fn outside_the_window() {
        assert!(!is_open_at(Some(&shop_hours()), sunday_at(8, 59)));
        assert!(!is_open_at(Some(&shop_hours()), sunday_at(18, 1)));
    }

    #[test]
    fn boundaries_are_inclusive() {
        assert!(is_open_at(Some(&shop_hours()), sunday_at(9, 0)));
        assert!(is_open_at(Some(&shop_hours()), sunday_at(18, 0)));
    }

    #[test]
    fn malformed_entry_is_treated_as_closed() {
        let schedule = WeeklySchedule::new().with_day(0, "9am-5pm");
        assert!(!is_open_at(Some(&schedule), sunday_at(12, 0)));
    }

    #[test]
    fn wire_shape_schedule_parses() {
        let schedule: WeeklySchedule =
            serde_json::from_str(r#"{"0": "10:00-22:00"}"#).unwrap();
        assert!(is_open_at(Some(&schedule), sunday_at(10, 0)));
        assert!(!is_open_at(Some(&schedule), sunday_at(22, 1)));
    }
}
