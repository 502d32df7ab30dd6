//! Core of the personal learning planner.
//!
//! - `models`: tasks, priorities, statuses and the form/patch types
//! - `db`: SQLite storage, every query scoped to one user
//! - `session`: the signed-in user and change subscriptions
//! - `service`: `Planner`, the session plus storage with fetch/write policy
//! - `aggregate`: dashboard and analytics statistics
//! - `filter`: search and equality filters for the task list
//! - `config`: TOML configuration

pub mod aggregate;
pub mod config;
pub mod db;
pub mod error;
pub mod filter;
pub mod models;
pub mod service;
pub mod session;

pub use db::{Database, ListQuery};
pub use error::{Error, Result};
pub use filter::{Choice, TaskFilter};
pub use models::{NewTask, Priority, SUGGESTED_CATEGORIES, Status, Task, TaskPatch, parse_due_date};
pub use service::{Dashboard, Planner};
pub use session::{Session, User};
