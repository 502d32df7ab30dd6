use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::models::{Priority, Status, Task};

/// Text that means "no constraint" for an equality filter.
pub const ALL: &str = "all";

/// An equality filter: either unconstrained or pinned to one value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Choice<T> {
    #[default]
    All,
    Only(T),
}

impl<T: PartialEq> Choice<T> {
    pub fn accepts(&self, value: &T) -> bool {
        match self {
            Choice::All => true,
            Choice::Only(expected) => expected == value,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Choice::All)
    }
}

impl<T: FromStr> FromStr for Choice<T> {
    type Err = T::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case(ALL) {
            Ok(Choice::All)
        } else {
            s.parse().map(Choice::Only)
        }
    }
}

impl<T: fmt::Display> fmt::Display for Choice<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::All => f.write_str(ALL),
            Choice::Only(value) => write!(f, "{value}"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub search: String,
    pub status: Choice<Status>,
    pub category: Choice<String>,
    pub priority: Choice<Priority>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        self.matches_search(task)
            && self.status.accepts(&task.status)
            && self.category.accepts(&task.category)
            && self.priority.accepts(&task.priority)
    }

    fn matches_search(&self, task: &Task) -> bool {
        let term = self.search.to_lowercase();
        if term.is_empty() {
            return true;
        }
        task.title.to_lowercase().contains(&term)
            || task
                .description
                .as_deref()
                .unwrap_or_default()
                .to_lowercase()
                .contains(&term)
            || task.category.to_lowercase().contains(&term)
    }

    /// Matching tasks in input order.
    pub fn apply<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        tasks.iter().filter(|task| self.matches(task)).collect()
    }

    /// How many of the three equality filters are set.
    pub fn active_count(&self) -> usize {
        [
            !self.status.is_all(),
            !self.category.is_all(),
            !self.priority.is_all(),
        ]
        .into_iter()
        .filter(|active| *active)
        .count()
    }

    pub fn clear(&mut self) {
        *self = TaskFilter::default();
    }
}

/// Sorted, de-duplicated categories present in `tasks`.
pub fn distinct_categories(tasks: &[Task]) -> Vec<String> {
    tasks
        .iter()
        .map(|task| task.category.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
