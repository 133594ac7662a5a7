//! Persistence collaborators.
//!
//! Handlers and the authentication core talk to storage only through the
//! [`Store`] trait, so the same code runs against Postgres in production and
//! against [`MemoryStore`] in tests.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    Category, NewTask, NewTimeLog, NewUser, Task, TaskChanges, TimeLog, User, UserUpdate,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    /// A uniqueness constraint was violated (e.g. duplicate email).
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("store operation timed out")]
    Timeout,
    #[error("database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> StoreError {
        match error {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::PoolTimedOut => StoreError::Timeout,
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Conflict(db.message().to_string())
            }
            other => StoreError::Database(other.to_string()),
        }
    }
}

/// Everything the application reads or writes.
///
/// Lookups return `Ok(None)` when nothing matches; `update_*` methods return
/// `Ok(None)` and `delete_*` methods return `Ok(false)` for a missing id.
#[async_trait]
pub trait Store: Send + Sync {
    // Users
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;
    async fn find_user_by_id(&self, id: i32) -> Result<Option<User>, StoreError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn update_user(&self, id: i32, update: UserUpdate) -> Result<Option<User>, StoreError>;
    /// Replaces the stored hash. `Ok(false)` means no user has this id.
    async fn update_credential_hash(&self, id: i32, new_hash: &str) -> Result<bool, StoreError>;
    /// Removes the user together with their tasks.
    async fn delete_user(&self, id: i32) -> Result<bool, StoreError>;

    // Categories
    async fn create_category(&self, name: &str) -> Result<Category, StoreError>;
    async fn list_categories(&self) -> Result<Vec<Category>, StoreError>;
    async fn find_category(&self, id: i32) -> Result<Option<Category>, StoreError>;
    async fn update_category(&self, id: i32, name: &str) -> Result<Option<Category>, StoreError>;
    async fn delete_category(&self, id: i32) -> Result<bool, StoreError>;

    // Tasks
    async fn create_task(&self, user_id: i32, task: NewTask) -> Result<Task, StoreError>;
    async fn list_tasks_for_user(&self, user_id: i32) -> Result<Vec<Task>, StoreError>;
    async fn find_task(&self, id: i32) -> Result<Option<Task>, StoreError>;
    async fn update_task(&self, id: i32, changes: TaskChanges) -> Result<Option<Task>, StoreError>;
    /// Removes the task, its category links and its time logs.
    async fn delete_task(&self, id: i32) -> Result<bool, StoreError>;
    /// Replaces the task's category links. Ids with no matching category are skipped.
    async fn set_task_categories(&self, task_id: i32, category_ids: &[i32])
        -> Result<(), StoreError>;
    async fn task_categories(&self, task_id: i32) -> Result<Vec<Category>, StoreError>;

    // Time logs
    async fn create_time_log(&self, task_id: i32, log: NewTimeLog) -> Result<TimeLog, StoreError>;
    async fn time_logs_for_task(&self, task_id: i32) -> Result<Vec<TimeLog>, StoreError>;
    async fn update_time_log(
        &self,
        task_id: i32,
        log_id: i32,
        log: NewTimeLog,
    ) -> Result<Option<TimeLog>, StoreError>;
    async fn delete_time_log(&self, task_id: i32, log_id: i32) -> Result<bool, StoreError>;
}
