//! Follow-up urgency classification and relative-time labels.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

const HOURS_PER_DAY: f64 = 24.0;
const MS_PER_HOUR: f64 = 3_600_000.0;

/// Urgency band of a pending follow-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum UrgencyLevel {
    Critical,
    Medium,
    Low,
}

/// Classification result: the band, its 1-4 sort rank and the display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleUrgency {
    pub level: UrgencyLevel,
    pub priority: u8,
    pub label: &'static str,
}

/// Signed distance from `now` to `target` in fractional hours.
pub fn hours_between(target: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    target.signed_duration_since(now).num_milliseconds() as f64 / MS_PER_HOUR
}

/// Buckets a scheduled time relative to `now`.
///
/// Bucket thresholds are inclusive: anything up to one full day out
/// (including everything already past) is critical, up to five days out is
/// medium, beyond that low.
pub fn classify(scheduled_at: DateTime<Utc>, now: DateTime<Utc>) -> ScheduleUrgency {
    let diff_hours = hours_between(scheduled_at, now);
    let diff_days = diff_hours / HOURS_PER_DAY;

    if diff_days <= 1.0 {
        let label = if diff_hours < 0.0 { "Vencido" } else { "Urgente" };
        ScheduleUrgency {
            level: UrgencyLevel::Critical,
            priority: 1,
            label,
        }
    } else if diff_days <= 5.0 {
        ScheduleUrgency {
            level: UrgencyLevel::Medium,
            priority: 2,
            label: "Próximo",
        }
    } else {
        ScheduleUrgency {
            level: UrgencyLevel::Low,
            priority: 3,
            label: "Programado",
        }
    }
}

/// Like [`classify`] but tolerates a record with no schedule at all: such a
/// record gets the "Sin fecha" sentinel, the lowest band and rank 4 so it
/// sorts after every dated item.
pub fn classify_opt(scheduled_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> ScheduleUrgency {
    match scheduled_at {
        Some(ts) => classify(ts, now),
        None => ScheduleUrgency {
            level: UrgencyLevel::Low,
            priority: 4,
            label: "Sin fecha",
        },
    }
}

/// Strictly-past check deciding the separate overdue queue.
pub fn is_overdue(scheduled_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    scheduled_at < now
}

/// Renders a schedule distance for display.
///
/// All branch comparisons are strict; a timestamp equal to `now` takes the
/// "In 0 min" branch and one exactly a day out reads "Tomorrow". From two
/// days out the absolute date is shown instead.
pub fn format_relative(ts: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff_hours = hours_between(ts, now);

    if diff_hours < 0.0 {
        let overdue_hours = -diff_hours;
        if overdue_hours < 24.0 {
            format!("Overdue by {}h", overdue_hours.floor() as i64)
        } else if overdue_hours < 48.0 {
            "Overdue by 1 day".to_string()
        } else {
            format!("Overdue by {}d", (overdue_hours / HOURS_PER_DAY).floor() as i64)
        }
    } else if diff_hours < 1.0 {
        format!("In {} min", (diff_hours * 60.0).floor() as i64)
    } else if diff_hours < 24.0 {
        format!("In {}h", diff_hours.floor() as i64)
    } else if diff_hours < 48.0 {
        "Tomorrow".to_string()
    } else {
        ts.format("%d/%m/%Y %H:%M").to_string()
    }
}

/// Formatter variant for records that may lack a schedule.
pub fn format_relative_opt(ts: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    match ts {
        Some(ts) => format_relative(ts, now),
        None => "Sin fecha".to_string(),
    }
}

/// Ascending order by schedule with dateless records last; no secondary key.
pub fn compare_scheduled(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn base_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 20, 12, 0, 0).unwrap()
    }

    #[test]
    fn two_hours_past_is_overdue_with_exact_label() {
        let now = base_now();
        let ts = now - Duration::hours(2);

        assert!(is_overdue(ts, now));
        let urgency = classify(ts, now);
        assert_eq!(urgency.level, UrgencyLevel::Critical);
        assert_eq!(urgency.label, "Vencido");
        assert_eq!(format_relative(ts, now), "Overdue by 2h");
    }

    #[test]
    fn thirty_minutes_out_is_critical_in_minutes() {
        let now = base_now();
        let ts = now + Duration::minutes(30);

        let urgency = classify(ts, now);
        assert_eq!(urgency.level, UrgencyLevel::Critical);
        assert_eq!(urgency.priority, 1);
        assert_eq!(urgency.label, "Urgente");
        assert_eq!(format_relative(ts, now), "In 30 min");
        assert!(!is_overdue(ts, now));
    }

    #[test]
    fn three_days_out_is_medium() {
        let now = base_now();
        let urgency = classify(now + Duration::days(3), now);
        assert_eq!(urgency.level, UrgencyLevel::Medium);
        assert_eq!(urgency.priority, 2);
        assert_eq!(urgency.label, "Próximo");
    }

    #[test]
    fn ten_days_out_is_low_with_absolute_date() {
        let now = base_now();
        let ts = now + Duration::days(10);

        let urgency = classify(ts, now);
        assert_eq!(urgency.level, UrgencyLevel::Low);
        assert_eq!(urgency.priority, 3);
        assert_eq!(format_relative(ts, now), "30/08/2026 12:00");
    }

    #[test]
    fn bucket_thresholds_are_inclusive() {
        let now = base_now();

        assert_eq!(classify(now + Duration::hours(24), now).level, UrgencyLevel::Critical);
        assert_eq!(
            classify(now + Duration::hours(24) + Duration::minutes(1), now).level,
            UrgencyLevel::Medium
        );
        assert_eq!(classify(now + Duration::hours(120), now).level, UrgencyLevel::Medium);
        assert_eq!(
            classify(now + Duration::hours(120) + Duration::minutes(1), now).level,
            UrgencyLevel::Low
        );
    }

    #[test]
    fn exact_now_takes_the_zero_minutes_branch() {
        let now = base_now();
        assert_eq!(format_relative(now, now), "In 0 min");
        assert!(!is_overdue(now, now));
    }

    #[test]
    fn every_past_timestamp_formats_as_overdue() {
        let now = base_now();
        for ts in [
            now - Duration::minutes(1),
            now - Duration::hours(5),
            now - Duration::hours(23),
            now - Duration::hours(24),
            now - Duration::hours(47),
            now - Duration::days(6),
        ] {
            let label = format_relative(ts, now);
            assert!(label.starts_with("Overdue"), "got {label:?} for {ts}");
        }
    }

    #[test]
    fn first_day_out_never_reads_tomorrow_or_absolute() {
        let now = base_now();
        for ts in [
            now,
            now + Duration::minutes(30),
            now + Duration::hours(1),
            now + Duration::hours(12),
            now + Duration::hours(23) + Duration::minutes(59),
        ] {
            let label = format_relative(ts, now);
            assert!(label.starts_with("In "), "got {label:?} for {ts}");
        }
    }

    #[test]
    fn overdue_day_boundaries_match_branch_order() {
        let now = base_now();
        assert_eq!(format_relative(now - Duration::hours(24), now), "Overdue by 1 day");
        assert_eq!(format_relative(now - Duration::hours(47), now), "Overdue by 1 day");
        assert_eq!(format_relative(now - Duration::hours(49), now), "Overdue by 2d");
        assert_eq!(
            format_relative(now - Duration::hours(23) - Duration::minutes(30), now),
            "Overdue by 23h"
        );
    }

    #[test]
    fn tomorrow_band_covers_24_to_48_hours() {
        let now = base_now();
        assert_eq!(format_relative(now + Duration::hours(24), now), "Tomorrow");
        assert_eq!(format_relative(now + Duration::hours(47), now), "Tomorrow");
        assert_eq!(format_relative(now + Duration::hours(48), now), "22/08/2026 12:00");
    }

    #[test]
    fn dateless_records_get_the_sentinel_and_sort_last() {
        let now = base_now();

        let urgency = classify_opt(None, now);
        assert_eq!(urgency.level, UrgencyLevel::Low);
        assert_eq!(urgency.priority, 4);
        assert_eq!(urgency.label, "Sin fecha");
        assert_eq!(format_relative_opt(None, now), "Sin fecha");

        let early = Some(now - Duration::hours(1));
        let late = Some(now + Duration::hours(1));
        let mut schedule = vec![None, late, early];
        schedule.sort_by(|a, b| compare_scheduled(*a, *b));
        assert_eq!(schedule, vec![early, late, None]);
    }
}
