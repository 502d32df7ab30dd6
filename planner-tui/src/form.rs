//! Create/edit form state for the terminal front end.

use chrono::{DateTime, Local, Utc};
use planner_core::{
    NewTask, Priority, Result, SUGGESTED_CATEGORIES, Status, Task, parse_due_date,
};

use crate::format::due_label;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Description,
    Category,
    Priority,
    Status,
    DueDate,
}

impl Field {
    const ORDER: [Field; 6] = [
        Field::Title,
        Field::Description,
        Field::Category,
        Field::Priority,
        Field::Status,
        Field::DueDate,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Field::Title => "Title *",
            Field::Description => "Description",
            Field::Category => "Category *",
            Field::Priority => "Priority",
            Field::Status => "Status",
            Field::DueDate => "Due date (YYYY-MM-DD)",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskForm {
    /// Id of the task being edited, `None` when creating
    pub editing: Option<String>,
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: Priority,
    pub status: Status,
    pub due_date: String,
    /// Stored due date of the task being edited, kept at full precision
    stored_due: Option<DateTime<Utc>>,
    pub focus: Field,
}

impl TaskForm {
    pub fn create() -> Self {
        Self {
            editing: None,
            title: String::new(),
            description: String::new(),
            category: String::new(),
            priority: Priority::default(),
            status: Status::default(),
            due_date: String::new(),
            stored_due: None,
            focus: Field::Title,
        }
    }

    pub fn edit(task: &Task) -> Self {
        Self {
            editing: Some(task.id.clone()),
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            category: task.category.clone(),
            priority: task.priority,
            status: task.status,
            due_date: task.due_date.map(due_input).unwrap_or_default(),
            stored_due: task.due_date,
            focus: Field::Title,
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = (Field, String)> + '_ {
        Field::ORDER.into_iter().map(|field| (field, self.value(field)))
    }

    fn value(&self, field: Field) -> String {
        match field {
            Field::Title => self.title.clone(),
            Field::Description => self.description.clone(),
            Field::Category => self.category.clone(),
            Field::Priority => self.priority.label().to_string(),
            Field::Status => self.status.label().to_string(),
            Field::DueDate => self.due_date.clone(),
        }
    }

    pub fn next_field(&mut self) {
        self.focus = step(self.focus, 1);
    }

    pub fn previous_field(&mut self) {
        self.focus = step(self.focus, Field::ORDER.len() - 1);
    }

    pub fn push_char(&mut self, c: char) {
        if let Some(text) = self.text_mut() {
            text.push(c);
        }
    }

    pub fn pop_char(&mut self) {
        if let Some(text) = self.text_mut() {
            text.pop();
        }
    }

    /// Left/right on a choice field. Category steps through the suggestions.
    pub fn cycle(&mut self, forward: bool) {
        match self.focus {
            Field::Priority => self.priority = cycle_in(&Priority::ALL, self.priority, forward),
            Field::Status => self.status = cycle_in(&Status::ALL, self.status, forward),
            Field::Category => {
                let current = SUGGESTED_CATEGORIES
                    .iter()
                    .position(|c| *c == self.category);
                let len = SUGGESTED_CATEGORIES.len();
                let index = match (current, forward) {
                    (None, true) => 0,
                    (None, false) => len - 1,
                    (Some(i), true) => (i + 1) % len,
                    (Some(i), false) => (i + len - 1) % len,
                };
                self.category = SUGGESTED_CATEGORIES[index].to_string();
            }
            Field::Title | Field::Description | Field::DueDate => {}
        }
    }

    fn text_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            Field::Title => Some(&mut self.title),
            Field::Description => Some(&mut self.description),
            Field::Category => Some(&mut self.category),
            Field::DueDate => Some(&mut self.due_date),
            Field::Priority | Field::Status => None,
        }
    }

    /// Validated submission, or the first problem found.
    pub fn submit(&self) -> Result<NewTask> {
        let mut task = NewTask::new(self.title.as_str(), self.category.as_str())
            .with_priority(self.priority)
            .with_status(self.status);
        if !self.description.trim().is_empty() {
            task = task.with_description(self.description.as_str());
        }
        if let Some(due) = self.untouched_due() {
            task = task.with_due_date(due);
        } else if !self.due_date.trim().is_empty() {
            task = task.with_due_date(parse_due_date(&self.due_date)?);
        }
        task.validate()
    }

    /// The stored due date while its text has not been edited. The text only
    /// carries the day, so reparsing it would move the time to midnight.
    fn untouched_due(&self) -> Option<DateTime<Utc>> {
        self.stored_due
            .filter(|due| due_input(*due) == self.due_date.trim())
    }

    pub fn title(&self) -> &'static str {
        if self.editing.is_some() {
            "edit task"
        } else {
            "new task"
        }
    }

    pub fn due_preview(&self) -> Option<String> {
        parse_due_date(&self.due_date).ok().map(due_label)
    }
}

fn due_input(due: DateTime<Utc>) -> String {
    due.with_timezone(&Local).format("%Y-%m-%d").to_string()
}

fn step(field: Field, by: usize) -> Field {
    let index = Field::ORDER.iter().position(|f| *f == field).unwrap_or(0);
    Field::ORDER[(index + by) % Field::ORDER.len()]
}

fn cycle_in<T: Copy + PartialEq>(values: &[T], current: T, forward: bool) -> T {
    let index = values.iter().position(|v| *v == current).unwrap_or(0);
    let len = values.len();
    if forward {
        values[(index + 1) % len]
    } else {
        values[(index + len - 1) % len]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn stored_task(due: DateTime<Utc>) -> Task {
        Task {
            id: "t1".into(),
            title: "Essay".into(),
            description: None,
            category: "Language".into(),
            priority: Priority::High,
            status: Status::Pending,
            due_date: Some(due),
            created_at: due,
            updated_at: due,
            user_id: "u1".into(),
        }
    }

    #[test]
    fn new_form_uses_task_defaults() {
        let form = TaskForm::create();
        assert_eq!(form.priority, Priority::Medium);
        assert_eq!(form.status, Status::Pending);
        assert_eq!(form.title(), "new task");
    }

    #[test]
    fn typing_goes_to_the_focused_text_field() {
        let mut form = TaskForm::create();
        for c in "Read".chars() {
            form.push_char(c);
        }
        form.next_field();
        form.next_field();
        for c in "Math".chars() {
            form.push_char(c);
        }
        form.pop_char();
        assert_eq!(form.title, "Read");
        assert_eq!(form.category, "Mat");

        form.next_field();
        form.push_char('x');
        assert_eq!(form.priority, Priority::Medium);
    }

    #[test]
    fn choice_fields_cycle_both_ways() {
        let mut form = TaskForm::create();
        form.focus = Field::Priority;
        form.cycle(true);
        assert_eq!(form.priority, Priority::High);
        form.cycle(true);
        assert_eq!(form.priority, Priority::Low);

        form.focus = Field::Status;
        form.cycle(false);
        assert_eq!(form.status, Status::Completed);

        form.focus = Field::Category;
        form.cycle(true);
        assert_eq!(form.category, "Mathematics");
        form.cycle(false);
        assert_eq!(form.category, "Other");
    }

    #[test]
    fn focus_wraps_around() {
        let mut form = TaskForm::create();
        form.previous_field();
        assert_eq!(form.focus, Field::DueDate);
        form.next_field();
        assert_eq!(form.focus, Field::Title);
    }

    #[test]
    fn submit_validates() {
        let mut form = TaskForm::create();
        assert_eq!(form.submit().unwrap_err().to_string(), "Title is required");

        form.title = "Essay".into();
        assert_eq!(form.submit().unwrap_err().to_string(), "Category is required");

        form.category = "Language".into();
        form.due_date = "tomorrow".into();
        assert!(form.submit().is_err());

        form.due_date = "2030-01-15".into();
        let task = form.submit().unwrap();
        assert_eq!(task.title, "Essay");
        assert!(task.due_date.is_some());
        assert!(task.description.is_none());
    }

    #[test]
    fn editing_other_fields_keeps_due_time() {
        let due = Utc.with_ymd_and_hms(2030, 6, 1, 12, 30, 0).unwrap();
        let mut form = TaskForm::edit(&stored_task(due));
        form.title = "Essay draft".into();

        let task = form.submit().unwrap();
        assert_eq!(task.title, "Essay draft");
        assert_eq!(task.due_date, Some(due));
    }

    #[test]
    fn edited_due_text_is_reparsed() {
        let due = Utc.with_ymd_and_hms(2030, 6, 1, 12, 30, 0).unwrap();
        let mut form = TaskForm::edit(&stored_task(due));

        form.due_date = "2030-07-01".into();
        assert_eq!(
            form.submit().unwrap().due_date,
            Some(parse_due_date("2030-07-01").unwrap())
        );

        form.due_date.clear();
        assert_eq!(form.submit().unwrap().due_date, None);
    }
}
