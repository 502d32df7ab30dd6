use chrono::{DateTime, Local, Utc};
use planner_core::aggregate::Distribution;
use planner_core::{Status, Task};

pub fn status_marker(status: Status) -> &'static str {
    match status {
        Status::Completed => "✓",
        Status::InProgress => "~",
        Status::Pending => " ",
    }
}

pub fn due_label(due_date: DateTime<Utc>) -> String {
    due_date.with_timezone(&Local).format("%b %d").to_string()
}

/// One line per task: marker, title, category, priority, due date.
pub fn task_line(task: &Task, now: DateTime<Utc>) -> String {
    let mut line = format!(
        "[{}] {} ({}, {})",
        status_marker(task.status),
        task.title,
        task.category,
        task.priority
    );
    if let Some(due) = task.due_date {
        line.push_str(&format!(" due {}", due_label(due)));
    }
    if task.is_overdue(now) {
        line.push_str(" OVERDUE");
    }
    line
}

pub fn distribution_line(bucket: &Distribution) -> String {
    format!(
        "{:<22} {:>4} {:>6.1}%",
        bucket.label, bucket.count, bucket.percentage
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use planner_core::Priority;

    #[test]
    fn task_line_marks_overdue() {
        let now = Utc::now();
        let task = Task {
            id: "t1".into(),
            title: "Essay".into(),
            description: None,
            category: "Language".into(),
            priority: Priority::High,
            status: Status::Pending,
            due_date: Some(now - Duration::days(2)),
            created_at: now,
            updated_at: now,
            user_id: "u1".into(),
        };
        let line = task_line(&task, now);
        assert!(line.starts_with("[ ] Essay (Language, high) due "));
        assert!(line.ends_with("OVERDUE"));
    }

    #[test]
    fn distribution_line_shows_one_decimal() {
        let bucket = Distribution {
            label: "Science".into(),
            count: 2,
            percentage: 66.7,
        };
        assert!(distribution_line(&bucket).ends_with("66.7%"));
    }
}
