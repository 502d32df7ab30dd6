//! Planner: the session plus the database, with the failure policy the front
//! ends rely on.
//!
//! Reads never fail: a failed fetch is logged and reported as an empty list.
//! Writes return their error so the caller can show a notification; nothing
//! is changed locally, callers refetch after a successful write.

use chrono::Utc;
use serde::Serialize;

use crate::aggregate::TaskStats;
use crate::db::{Database, ListQuery};
use crate::error::Result;
use crate::models::{NewTask, Status, Task, TaskPatch};
use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub stats: TaskStats,
    pub recent: Vec<Task>,
}

pub struct Planner {
    db: Database,
    session: Session,
    recent_limit: u32,
}

impl Planner {
    pub fn new(db: Database, session: Session) -> Self {
        Self {
            db,
            session,
            recent_limit: 5,
        }
    }

    pub fn with_recent_limit(mut self, recent_limit: u32) -> Self {
        self.recent_limit = recent_limit;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// All of the user's tasks, newest first.
    pub async fn fetch_tasks(&self) -> Vec<Task> {
        self.fetch(ListQuery::newest_first()).await
    }

    /// All of the user's tasks in the order they were stored. Analytics
    /// groups categories in this order.
    pub async fn fetch_history(&self) -> Vec<Task> {
        self.fetch(ListQuery::default()).await
    }

    pub async fn fetch_recent(&self) -> Vec<Task> {
        self.fetch(ListQuery::newest_first().limit(self.recent_limit))
            .await
    }

    pub async fn dashboard(&self) -> Dashboard {
        let recent = self.fetch_recent().await;
        let all = self.fetch_tasks().await;
        Dashboard {
            stats: TaskStats::compute(&all, Utc::now()),
            recent,
        }
    }

    async fn fetch(&self, query: ListQuery) -> Vec<Task> {
        let result = match self.session.user_id() {
            Ok(user_id) => self.db.list_tasks(user_id, query).await,
            Err(err) => Err(err),
        };
        result.unwrap_or_else(|err| {
            tracing::error!(error = %err, "error fetching tasks");
            Vec::new()
        })
    }

    pub async fn create_task(&self, task: NewTask) -> Result<Task> {
        let result = match self.session.user_id() {
            Ok(user_id) => self.db.insert_task(user_id, task).await,
            Err(err) => Err(err),
        };
        result.inspect_err(|err| tracing::error!(error = %err, "error saving task"))
    }

    /// Full-form edit or any other partial update.
    pub async fn update_task(&self, task_id: &str, patch: TaskPatch) -> Result<()> {
        let result = match self.session.user_id() {
            Ok(user_id) => self.db.update_task(user_id, task_id, patch).await,
            Err(err) => Err(err),
        };
        result.inspect_err(|err| tracing::error!(error = %err, task_id, "error updating task"))
    }

    pub async fn set_status(&self, task_id: &str, status: Status) -> Result<()> {
        self.update_task(task_id, TaskPatch::status(status)).await
    }

    pub async fn delete_task(&self, task_id: &str) -> Result<()> {
        let result = match self.session.user_id() {
            Ok(user_id) => self.db.delete_task(user_id, task_id).await,
            Err(err) => Err(err),
        };
        result.inspect_err(|err| tracing::error!(error = %err, task_id, "error deleting task"))
    }
}
