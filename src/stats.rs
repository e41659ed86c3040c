//! Derived numbers and orderings shown on the dashboard and subject screens.
//!
//! Nothing here is cached: callers re-query the store and run these again
//! whenever the underlying tables change.

use std::cmp::Ordering;

use chrono::{Local, TimeZone};

use crate::db::models::Task;

const SECONDS_PER_HOUR: u64 = 3600;

/// Converts a duration in seconds to hours with two decimals.
///
/// Rounding is half-up on the exact decimal value, so `18` seconds
/// (0.005 h) becomes `0.01`.
pub fn to_hours(seconds: u64) -> f32 {
    let hundredths = seconds
        .saturating_mul(100)
        .saturating_add(SECONDS_PER_HOUR / 2)
        / SECONDS_PER_HOUR;
    (hundredths as f64 / 100.0) as f32
}

/// Studied hours over goal hours, clamped to `[0, 1]`.
pub fn goal_progress(studied_hours: f32, goal_hours: f32) -> f32 {
    if !goal_hours.is_finite() || goal_hours <= 0.0 {
        return 0.0;
    }
    let ratio = studied_hours / goal_hours;
    if ratio.is_nan() {
        return 0.0;
    }
    ratio.clamp(0.0, 1.0)
}

fn by_due_date_then_priority(a: &Task, b: &Task) -> Ordering {
    a.due_date
        .cmp(&b.due_date)
        .then_with(|| b.priority.value().cmp(&a.priority.value()))
}

/// Incomplete tasks, earliest due date first, higher priority first on ties.
pub fn upcoming_tasks(tasks: impl IntoIterator<Item = Task>) -> Vec<Task> {
    let mut upcoming: Vec<Task> = tasks.into_iter().filter(|task| !task.is_complete).collect();
    upcoming.sort_by(by_due_date_then_priority);
    upcoming
}

/// Completed tasks, with the same ordering as [`upcoming_tasks`].
pub fn completed_tasks(tasks: impl IntoIterator<Item = Task>) -> Vec<Task> {
    let mut completed: Vec<Task> = tasks.into_iter().filter(|task| task.is_complete).collect();
    completed.sort_by(by_due_date_then_priority);
    completed
}

/// `dd MMM yyyy` in local time, e.g. `05 Mar 2026`.
pub fn format_date(epoch_millis: i64) -> String {
    match Local.timestamp_millis_opt(epoch_millis).single() {
        Some(date) => date.format("%d %b %Y").to_string(),
        None => Local::now().format("%d %b %Y").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::Priority;
    use pretty_assertions::assert_eq;

    fn task(id: i64, due_date: i64, priority: Priority, is_complete: bool) -> Task {
        Task {
            id,
            subject_id: 1,
            title: format!("Task {id}"),
            description: String::new(),
            due_date,
            priority,
            related_to_subject: "Math".into(),
            is_complete,
        }
    }

    #[test]
    fn to_hours_rounds_to_two_decimals() {
        assert_eq!(to_hours(0), 0.0);
        assert_eq!(to_hours(3600), 1.0);
        assert_eq!(to_hours(5400), 1.5);
        assert_eq!(to_hours(17), 0.0);
        assert_eq!(to_hours(18), 0.01);
        assert_eq!(to_hours(7_265), 2.02);
    }

    #[test]
    fn to_hours_is_monotonic() {
        let mut previous = 0.0f32;
        for seconds in 0..20_000u64 {
            let hours = to_hours(seconds);
            assert!(hours >= previous, "to_hours({seconds}) decreased");
            previous = hours;
        }
    }

    #[test]
    fn to_hours_saturates_instead_of_overflowing() {
        assert!(to_hours(u64::MAX) > 0.0);
    }

    #[test]
    fn goal_progress_is_clamped() {
        assert_eq!(goal_progress(5.0, 10.0), 0.5);
        assert_eq!(goal_progress(20.0, 10.0), 1.0);
        assert_eq!(goal_progress(0.0, 10.0), 0.0);
        assert_eq!(goal_progress(-3.0, 10.0), 0.0);
    }

    #[test]
    fn goal_progress_with_degenerate_goal_is_zero() {
        assert_eq!(goal_progress(5.0, 0.0), 0.0);
        assert_eq!(goal_progress(5.0, -1.0), 0.0);
        assert_eq!(goal_progress(5.0, f32::NAN), 0.0);
        assert_eq!(goal_progress(f32::NAN, 10.0), 0.0);
    }

    #[test]
    fn upcoming_tasks_skip_completed_and_sort() {
        let tasks = vec![
            task(1, 300, Priority::Low, false),
            task(2, 100, Priority::Low, false),
            task(3, 100, Priority::High, false),
            task(4, 50, Priority::High, true),
            task(5, 100, Priority::Medium, false),
        ];

        let ids: Vec<i64> = upcoming_tasks(tasks).iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 5, 2, 1]);
    }

    #[test]
    fn completed_tasks_keep_only_done_ones() {
        let tasks = vec![
            task(1, 300, Priority::Low, true),
            task(2, 100, Priority::Low, false),
            task(3, 100, Priority::High, true),
        ];

        let ids: Vec<i64> = completed_tasks(tasks).iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn format_date_uses_day_month_year() {
        let formatted = format_date(0);
        assert_eq!(formatted.len(), "01 Jan 1970".len());
        assert!(formatted.ends_with("1970") || formatted.ends_with("1969"));
    }
}
