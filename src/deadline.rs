use chrono::{DateTime, Duration, FixedOffset};
use serde::Serialize;

use crate::assignment_scraper::Assignment;

const REPORTING_WINDOW_DAYS: i64 = 7;

const MINUTES_PER_DAY: i64 = 24 * 60;

/// Day/hour/minute breakdown of the time left until a deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Remaining {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
}

/// One record of the JSON response body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentDue {
    pub title: String,
    pub course: String,
    /// Portal wall-clock deadline, `YYYY-MM-DDTHH:MM`, no timezone suffix.
    pub deadline: String,
    pub remaining: Remaining,
    pub url: String,
}

/// Pure filter: keeps assignments due within the next 7 days of `now`
/// (both sides anchored to UTC+9). Past-due and far-future records are
/// dropped silently. Every emitted record satisfies
/// `0 <= remaining < 7 days` at the moment of computation.
pub fn upcoming_within_week(
    assignments: Vec<Assignment>,
    now: DateTime<FixedOffset>,
) -> Vec<AssignmentDue> {
    let window = Duration::days(REPORTING_WINDOW_DAYS);
    let mut dues = Vec::new();
    for assignment in assignments {
        let remaining = assignment.deadline - now;
        if remaining < Duration::zero() || remaining >= window {
            continue;
        }
        dues.push(AssignmentDue {
            title: assignment.title,
            course: assignment.course,
            deadline: assignment.deadline_raw.replace(' ', "T"),
            remaining: breakdown(remaining),
            url: assignment.url,
        });
    }
    dues
}

fn breakdown(remaining: Duration) -> Remaining {
    let total_minutes = remaining.num_minutes();
    Remaining {
        days: total_minutes / MINUTES_PER_DAY,
        hours: total_minutes % MINUTES_PER_DAY / 60,
        minutes: total_minutes % 60,
    }
}
