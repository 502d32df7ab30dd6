use std::path::PathBuf;
use std::str::FromStr;

use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{NewTask, Task, TaskPatch};

const TASK_COLUMNS: &str = "id, title, description, category, priority, status, due_date, created_at, updated_at, user_id";

/// Ordering and cap for [`Database::list_tasks`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub newest_first: bool,
    pub limit: Option<u32>,
}

impl ListQuery {
    pub fn newest_first() -> Self {
        Self {
            newest_first: true,
            limit: None,
        }
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the database in the user's state directory, creating it when
    /// missing.
    pub async fn connect_default() -> Result<Self> {
        let db_file = default_database_path()?;
        if let Some(parent) = db_file.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let database_url = format!("sqlite:{}?mode=rwc", db_file.display());
        Self::connect(&database_url).await
    }

    pub async fn connect(database_url: &str) -> Result<Self> {
        tracing::debug!(url = database_url, "connecting to task database");
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;

        Self::migrate(pool).await
    }

    /// Private in-memory database on a single connection.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::migrate(pool).await
    }

    async fn migrate(pool: SqlitePool) -> Result<Self> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Database { pool })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub async fn list_tasks(&self, user_id: &str, query: ListQuery) -> Result<Vec<Task>> {
        let order = if query.newest_first {
            "created_at DESC, rowid DESC"
        } else {
            "created_at ASC, rowid ASC"
        };
        let mut sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = ? ORDER BY {order}");
        if query.limit.is_some() {
            sql.push_str(" LIMIT ?");
        }

        let mut statement = sqlx::query_as::<_, Task>(&sql).bind(user_id);
        if let Some(limit) = query.limit {
            statement = statement.bind(i64::from(limit));
        }
        let rows = statement.fetch_all(&self.pool).await?;

        tracing::debug!(user_id, count = rows.len(), "listed tasks");
        Ok(rows)
    }

    pub async fn get_task(&self, user_id: &str, task_id: &str) -> Result<Task> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ? AND user_id = ?");
        sqlx::query_as::<_, Task>(&sql)
            .bind(task_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound(task_id.to_string()))
    }

    pub async fn insert_task(&self, user_id: &str, new_task: NewTask) -> Result<Task> {
        let new_task = new_task.validate()?;
        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4().to_string(),
            title: new_task.title,
            description: new_task.description,
            category: new_task.category,
            priority: new_task.priority,
            status: new_task.status,
            due_date: new_task.due_date,
            created_at: now,
            updated_at: now,
            user_id: user_id.to_string(),
        };

        sqlx::query(
            "INSERT INTO tasks (id, title, description, category, priority, status, due_date, created_at, updated_at, user_id)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&task.id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(&task.category)
        .bind(task.priority)
        .bind(task.status)
        .bind(task.due_date)
        .bind(task.created_at)
        .bind(task.updated_at)
        .bind(&task.user_id)
        .execute(&self.pool)
        .await?;

        tracing::debug!(user_id, task_id = %task.id, "inserted task");
        Ok(task)
    }

    pub async fn update_task(&self, user_id: &str, task_id: &str, patch: TaskPatch) -> Result<()> {
        let mut task = self.get_task(user_id, task_id).await?;
        patch.apply_to(&mut task)?;
        task.updated_at = Utc::now();

        let result = sqlx::query(
            "UPDATE tasks
             SET title = ?, description = ?, category = ?, priority = ?, status = ?, due_date = ?, updated_at = ?
             WHERE id = ? AND user_id = ?",
        )
        .bind(&task.title)
        .bind(&task.description)
        .bind(&task.category)
        .bind(task.priority)
        .bind(task.status)
        .bind(task.due_date)
        .bind(task.updated_at)
        .bind(task_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(task_id.to_string()));
        }

        tracing::debug!(user_id, task_id, "updated task");
        Ok(())
    }

    pub async fn delete_task(&self, user_id: &str, task_id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ? AND user_id = ?")
            .bind(task_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(task_id.to_string()));
        }

        tracing::debug!(user_id, task_id, "deleted task");
        Ok(())
    }
}

pub fn default_database_path() -> Result<PathBuf> {
    let state_dir = dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .or_else(|| dirs::home_dir().map(|h| h.join(".local/state")))
        .ok_or(Error::NoDataDir)?;

    Ok(state_dir.join("planner").join("data").join("planner.db"))
}
