//! Read-only statistics derived from an in-memory task list.
//!
//! Nothing here touches storage or mutates its input, so every function can be
//! rerun on each refresh of the task list.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::Serialize;

use crate::models::{Priority, Status, Task};

/// Number of calendar days covered by [`weekly_activity`], today included.
pub const ACTIVITY_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub overdue: usize,
}

impl TaskStats {
    pub fn compute(tasks: &[Task], now: DateTime<Utc>) -> Self {
        let mut stats = TaskStats {
            total: tasks.len(),
            ..TaskStats::default()
        };
        for task in tasks {
            match task.status {
                Status::Completed => stats.completed += 1,
                Status::Pending => stats.pending += 1,
                Status::InProgress => stats.in_progress += 1,
            }
            if task.is_overdue(now) {
                stats.overdue += 1;
            }
        }
        stats
    }

    pub fn completion_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64 * 100.0
        }
    }
}

/// Share of completed tasks in percent, `0` for an empty list.
pub fn completion_rate(tasks: &[Task]) -> f64 {
    let completed = tasks
        .iter()
        .filter(|task| task.status == Status::Completed)
        .count();
    if tasks.is_empty() {
        0.0
    } else {
        completed as f64 / tasks.len() as f64 * 100.0
    }
}

/// One bucket of a distribution. `percentage` is rounded to one decimal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution {
    pub label: String,
    pub count: usize,
    pub percentage: f64,
}

impl Distribution {
    fn new(label: impl Into<String>, count: usize, total: usize) -> Self {
        Self {
            label: label.into(),
            count,
            percentage: percentage(count, total),
        }
    }
}

/// Groups tasks by category in first-seen order.
pub fn category_distribution(tasks: &[Task]) -> Vec<Distribution> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for task in tasks {
        match counts.iter_mut().find(|(category, _)| *category == task.category) {
            Some((_, count)) => *count += 1,
            None => counts.push((task.category.as_str(), 1)),
        }
    }

    counts
        .into_iter()
        .map(|(category, count)| Distribution::new(category, count, tasks.len()))
        .collect()
}

/// Always three buckets: High, Medium, Low.
pub fn priority_distribution(tasks: &[Task]) -> Vec<Distribution> {
    [Priority::High, Priority::Medium, Priority::Low]
        .into_iter()
        .map(|priority| {
            let count = tasks.iter().filter(|task| task.priority == priority).count();
            Distribution::new(priority.label(), count, tasks.len())
        })
        .collect()
}

/// Always three buckets: Completed, In Progress, Pending.
pub fn status_distribution(tasks: &[Task]) -> Vec<Distribution> {
    [Status::Completed, Status::InProgress, Status::Pending]
        .into_iter()
        .map(|status| {
            let count = tasks.iter().filter(|task| task.status == status).count();
            Distribution::new(status.label(), count, tasks.len())
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayActivity {
    pub date: NaiveDate,
    pub created: usize,
    pub completed: usize,
}

/// Tasks created on each of the last seven calendar days, oldest first.
///
/// Days are taken in the time zone of `now`. `completed` counts tasks created
/// that day whose *current* status is completed, not tasks completed that day.
pub fn weekly_activity<Tz: TimeZone>(tasks: &[Task], now: DateTime<Tz>) -> Vec<DayActivity> {
    let zone = now.timezone();
    let today = now.date_naive();
    let created_days: Vec<(NaiveDate, Status)> = tasks
        .iter()
        .map(|task| (task.created_at.with_timezone(&zone).date_naive(), task.status))
        .collect();

    (0..ACTIVITY_DAYS)
        .rev()
        .map(|days_ago| {
            let date = today - Duration::days(days_ago);
            let created = created_days.iter().filter(|(day, _)| *day == date);
            DayActivity {
                date,
                created: created.clone().count(),
                completed: created
                    .filter(|(_, status)| *status == Status::Completed)
                    .count(),
            }
        })
        .collect()
}

/// Everything the analytics view shows, computed in one pass over the list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analytics {
    pub total: usize,
    pub completed: usize,
    pub completion_rate: f64,
    pub category_count: usize,
    pub status: Vec<Distribution>,
    pub priority: Vec<Distribution>,
    pub categories: Vec<Distribution>,
    pub weekly: Vec<DayActivity>,
}

impl Analytics {
    pub fn compute<Tz: TimeZone>(tasks: &[Task], now: DateTime<Tz>) -> Self {
        let stats = TaskStats::compute(tasks, now.with_timezone(&Utc));
        let categories = category_distribution(tasks);
        Self {
            total: stats.total,
            completed: stats.completed,
            completion_rate: stats.completion_rate(),
            category_count: categories.len(),
            status: status_distribution(tasks),
            priority: priority_distribution(tasks),
            categories,
            weekly: weekly_activity(tasks, now),
        }
    }
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round1(count as f64 / total as f64 * 100.0)
}

/// Rounds the exact binary value to one decimal, ties away from zero.
/// `(value * 10.0).round()` would first round the product, so 3/2000 of 100
/// (stored just below 0.15) would come out as 0.2.
fn round1(value: f64) -> f64 {
    // Exact ties at the second decimal only exist for multiples of 0.25.
    if (value * 4.0).fract() == 0.0 {
        return (value * 10.0).round() / 10.0;
    }
    format!("{value:.1}").parse().unwrap_or(value)
}
