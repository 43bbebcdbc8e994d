use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use utoipa::ToSchema;

/// Flat per-unit fee added when a line carries customization text.
pub const CUSTOMIZATION_SURCHARGE: f32 = 5.0;

/// Minimum gap between two waiter calls from the same order.
pub const CALL_COOLDOWN: TimeDelta = TimeDelta::minutes(3);

/// Nominal preparation window shown on the diner status page.
pub const PREP_WINDOW: TimeDelta = TimeDelta::minutes(15);

pub const STATUS_PENDING: &str = "Pending";
pub const STATUS_COMPLETED: &str = "Completed";

/// The calendar date an instant falls on in the business timezone. Order
/// numbers reset at local midnight, not at UTC midnight.
pub fn business_day(now: DateTime<Utc>, tz: Tz) -> NaiveDate {
    now.with_timezone(&tz).date_naive()
}

/// Next sequential number for the day, given the current maximum. The caller
/// must read the maximum and insert inside one transaction; the unique index
/// on `(order_day, order_number)` catches the remaining race.
pub fn next_order_number(current_max: Option<i32>) -> i32 {
    current_max.map_or(1, |n| n + 1)
}

/// Whether a line's customization text triggers the surcharge. Whitespace-only
/// text does not count.
pub fn has_customization(customization: Option<&str>) -> bool {
    customization.is_some_and(|c| !c.trim().is_empty())
}

/// Price of one order line: unit price times quantity, plus the surcharge per
/// unit when customized.
pub fn line_total(unit_price: f32, quantity: i32, customization: Option<&str>) -> f32 {
    let unit = if has_customization(customization) {
        unit_price + CUSTOMIZATION_SURCHARGE
    } else {
        unit_price
    };
    unit * quantity as f32
}

/// A waiter call is allowed unless the previous one happened within the
/// cooldown. Dismissing a call does not reset `last_call`, so the cooldown is
/// measured against the last actual call.
pub fn call_allowed(last_call: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match last_call {
        None => true,
        Some(t) => now - t >= CALL_COOLDOWN,
    }
}

/// Seconds left of the nominal preparation window. Negative once the window
/// has elapsed; the view clamps for display.
pub fn remaining_prep_seconds(created_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (PREP_WINDOW - (now - created_at)).num_seconds()
}

/// Which staff notification an order currently carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    CallWaiter,
    BillRequest,
    Both,
}

pub fn notification_kind(call_waiter: bool, bill_requested: bool) -> Option<NotificationKind> {
    match (call_waiter, bill_requested) {
        (true, true) => Some(NotificationKind::Both),
        (true, false) => Some(NotificationKind::CallWaiter),
        (false, true) => Some(NotificationKind::BillRequest),
        (false, false) => None,
    }
}

/// Wall-clock formatting for staff views, in the business timezone.
pub fn format_local_hm(ts: DateTime<Utc>, tz: Tz) -> String {
    ts.with_timezone(&tz).format("%H:%M").to_string()
}

pub fn format_local_hms(ts: DateTime<Utc>, tz: Tz) -> String {
    ts.with_timezone(&tz).format("%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn warsaw() -> Tz {
        "Europe/Warsaw".parse().unwrap()
    }

    #[test]
    fn test_first_order_of_the_day_is_number_one() {
        assert_eq!(next_order_number(None), 1);
    }

    #[test]
    fn test_order_numbers_increment_without_gaps() {
        let mut max = None;
        let assigned: Vec<i32> = (0..5)
            .map(|_| {
                let n = next_order_number(max);
                max = Some(n);
                n
            })
            .collect();
        assert_eq!(assigned, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_business_day_follows_configured_zone_not_utc() {
        // 23:30 UTC on June 1st is already June 2nd in Warsaw (UTC+2 in summer).
        let late_evening = Utc.with_ymd_and_hms(2026, 6, 1, 23, 30, 0).unwrap();
        assert_eq!(
            business_day(late_evening, warsaw()),
            NaiveDate::from_ymd_opt(2026, 6, 2).unwrap()
        );
        // In winter (UTC+1) the same wall-clock instant still rolls over.
        let winter = Utc.with_ymd_and_hms(2026, 1, 15, 23, 30, 0).unwrap();
        assert_eq!(
            business_day(winter, warsaw()),
            NaiveDate::from_ymd_opt(2026, 1, 16).unwrap()
        );
        // Mid-day instants agree with UTC.
        let noon = Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(
            business_day(noon, warsaw()),
            NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()
        );
    }

    #[test]
    fn test_customized_line_carries_surcharge_per_unit() {
        // (10 + 5) * 2 = 30
        assert_eq!(line_total(10.0, 2, Some("no onions")), 30.0);
    }

    #[test]
    fn test_plain_line_has_no_surcharge() {
        assert_eq!(line_total(10.0, 2, None), 20.0);
        assert_eq!(line_total(12.5, 1, Some("")), 12.5);
        // Whitespace-only customization is not a customization.
        assert_eq!(line_total(12.5, 1, Some("   ")), 12.5);
    }

    #[test]
    fn test_call_allowed_without_prior_call() {
        let now = Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap();
        assert!(call_allowed(None, now));
    }

    #[test]
    fn test_second_call_within_cooldown_is_rejected() {
        let first = Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap();
        let retry = first + TimeDelta::seconds(179);
        assert!(!call_allowed(Some(first), retry));
    }

    #[test]
    fn test_call_allowed_once_cooldown_elapses() {
        let first = Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap();
        assert!(call_allowed(Some(first), first + TimeDelta::minutes(3)));
        assert!(call_allowed(Some(first), first + TimeDelta::minutes(10)));
    }

    #[test]
    fn test_remaining_prep_seconds_counts_down() {
        let created = Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(remaining_prep_seconds(created, created), 15 * 60);
        assert_eq!(
            remaining_prep_seconds(created, created + TimeDelta::minutes(5)),
            10 * 60
        );
        // Past the window the count goes negative; the view clamps.
        assert_eq!(
            remaining_prep_seconds(created, created + TimeDelta::minutes(16)),
            -60
        );
    }

    #[test]
    fn test_notification_kind_tags_both_conditions() {
        assert_eq!(notification_kind(false, false), None);
        assert_eq!(
            notification_kind(true, false),
            Some(NotificationKind::CallWaiter)
        );
        assert_eq!(
            notification_kind(false, true),
            Some(NotificationKind::BillRequest)
        );
        assert_eq!(notification_kind(true, true), Some(NotificationKind::Both));
    }

    #[test]
    fn test_local_time_formatting() {
        let ts = Utc.with_ymd_and_hms(2026, 6, 1, 10, 5, 9).unwrap();
        // Warsaw is UTC+2 in June.
        assert_eq!(format_local_hm(ts, warsaw()), "12:05");
        assert_eq!(format_local_hms(ts, warsaw()), "12:05:09");
    }
}
