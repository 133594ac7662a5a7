use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::models::{
    Category, NewTask, NewTimeLog, NewUser, Task, TaskChanges, TimeLog, User, UserUpdate,
};
use crate::store::{Store, StoreError};

const MAX_CONNECTIONS: u32 = 10;

const USER_COLUMNS: &str = "id, name, email, hashed_password";
const TASK_COLUMNS: &str = "id, title, description, due_date, scheduled_datetime, priority, user_id";
const TIME_LOG_COLUMNS: &str = "id, task_id, start_time, end_time, time_spent";

const SCHEMA: [&str; 5] = [
    "CREATE TABLE IF NOT EXISTS users (
        id SERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        hashed_password TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS categories (
        id SERIAL PRIMARY KEY,
        name TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS tasks (
        id SERIAL PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT,
        due_date TIMESTAMPTZ,
        scheduled_datetime TIMESTAMPTZ,
        priority INTEGER NOT NULL DEFAULT 2,
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE
    )",
    "CREATE TABLE IF NOT EXISTS task_categories (
        task_id INTEGER NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
        category_id INTEGER NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
        PRIMARY KEY (task_id, category_id)
    )",
    "CREATE TABLE IF NOT EXISTS time_logs (
        id SERIAL PRIMARY KEY,
        task_id INTEGER NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
        start_time TIMESTAMPTZ NOT NULL,
        end_time TIMESTAMPTZ NOT NULL,
        time_spent DOUBLE PRECISION NOT NULL
    )",
];

/// Postgres-backed [`Store`].
///
/// Pool acquisition is bounded by a timeout, which surfaces as
/// [`StoreError::Timeout`].
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str, acquire_timeout: Duration) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(acquire_timeout)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    /// Creates any missing tables.
    pub async fn init_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        log::info!("Database schema ready");
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let sql = format!(
            "INSERT INTO users (name, email, hashed_password) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(user.name)
            .bind(user.email)
            .bind(user.hashed_password)
            .fetch_one(&self.pool)
            .await?;
        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let sql = format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql).fetch_all(&self.pool).await?)
    }

    async fn find_user_by_id(&self, id: i32) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn update_user(&self, id: i32, update: UserUpdate) -> Result<Option<User>, StoreError> {
        let sql = format!(
            "UPDATE users SET name = $1, email = $2 WHERE id = $3 RETURNING {}",
            USER_COLUMNS
        );
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(update.name)
            .bind(update.email)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn update_credential_hash(&self, id: i32, new_hash: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE users SET hashed_password = $1 WHERE id = $2")
            .bind(new_hash)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_user(&self, id: i32) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_category(&self, name: &str) -> Result<Category, StoreError> {
        Ok(sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        Ok(
            sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY id")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn find_category(&self, id: i32) -> Result<Option<Category>, StoreError> {
        Ok(
            sqlx::query_as::<_, Category>("SELECT id, name FROM categories WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn update_category(&self, id: i32, name: &str) -> Result<Option<Category>, StoreError> {
        Ok(sqlx::query_as::<_, Category>(
            "UPDATE categories SET name = $1 WHERE id = $2 RETURNING id, name",
        )
        .bind(name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete_category(&self, id: i32) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_task(&self, user_id: i32, task: NewTask) -> Result<Task, StoreError> {
        let sql = format!(
            "INSERT INTO tasks (title, description, due_date, scheduled_datetime, priority, user_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {}",
            TASK_COLUMNS
        );
        Ok(sqlx::query_as::<_, Task>(&sql)
            .bind(task.title)
            .bind(task.description)
            .bind(task.due_date)
            .bind(task.scheduled_datetime)
            .bind(task.priority)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn list_tasks_for_user(&self, user_id: i32) -> Result<Vec<Task>, StoreError> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE user_id = $1 ORDER BY id",
            TASK_COLUMNS
        );
        Ok(sqlx::query_as::<_, Task>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn find_task(&self, id: i32) -> Result<Option<Task>, StoreError> {
        let sql = format!("SELECT {} FROM tasks WHERE id = $1", TASK_COLUMNS);
        Ok(sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn update_task(&self, id: i32, changes: TaskChanges) -> Result<Option<Task>, StoreError> {
        let sql = format!(
            "UPDATE tasks
             SET title = COALESCE($1, title),
                 description = COALESCE($2, description),
                 due_date = COALESCE($3, due_date),
                 scheduled_datetime = COALESCE($4, scheduled_datetime),
                 priority = COALESCE($5, priority)
             WHERE id = $6
             RETURNING {}",
            TASK_COLUMNS
        );
        Ok(sqlx::query_as::<_, Task>(&sql)
            .bind(changes.title)
            .bind(changes.description)
            .bind(changes.due_date)
            .bind(changes.scheduled_datetime)
            .bind(changes.priority)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_task(&self, id: i32) -> Result<bool, StoreError> {
        // Links and time logs go with it through ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_task_categories(
        &self,
        task_id: i32,
        category_ids: &[i32],
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let exists = sqlx::query("SELECT 1 FROM tasks WHERE id = $1")
            .bind(task_id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(StoreError::NotFound);
        }

        sqlx::query("DELETE FROM task_categories WHERE task_id = $1")
            .bind(task_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            "INSERT INTO task_categories (task_id, category_id)
             SELECT $1, id FROM categories WHERE id = ANY($2)
             ON CONFLICT DO NOTHING",
        )
        .bind(task_id)
        .bind(category_ids.to_vec())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn task_categories(&self, task_id: i32) -> Result<Vec<Category>, StoreError> {
        Ok(sqlx::query_as::<_, Category>(
            "SELECT c.id, c.name FROM categories c
             JOIN task_categories tc ON tc.category_id = c.id
             WHERE tc.task_id = $1
             ORDER BY c.id",
        )
        .bind(task_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn create_time_log(&self, task_id: i32, log: NewTimeLog) -> Result<TimeLog, StoreError> {
        let sql = format!(
            "INSERT INTO time_logs (task_id, start_time, end_time, time_spent)
             VALUES ($1, $2, $3, $4)
             RETURNING {}",
            TIME_LOG_COLUMNS
        );
        Ok(sqlx::query_as::<_, TimeLog>(&sql)
            .bind(task_id)
            .bind(log.start_time)
            .bind(log.end_time)
            .bind(log.time_spent)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn time_logs_for_task(&self, task_id: i32) -> Result<Vec<TimeLog>, StoreError> {
        let sql = format!(
            "SELECT {} FROM time_logs WHERE task_id = $1 ORDER BY start_time",
            TIME_LOG_COLUMNS
        );
        Ok(sqlx::query_as::<_, TimeLog>(&sql)
            .bind(task_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn update_time_log(
        &self,
        task_id: i32,
        log_id: i32,
        log: NewTimeLog,
    ) -> Result<Option<TimeLog>, StoreError> {
        let sql = format!(
            "UPDATE time_logs SET start_time = $1, end_time = $2, time_spent = $3
             WHERE id = $4 AND task_id = $5
             RETURNING {}",
            TIME_LOG_COLUMNS
        );
        Ok(sqlx::query_as::<_, TimeLog>(&sql)
            .bind(log.start_time)
            .bind(log.end_time)
            .bind(log.time_spent)
            .bind(log_id)
            .bind(task_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_time_log(&self, task_id: i32, log_id: i32) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM time_logs WHERE id = $1 AND task_id = $2")
            .bind(log_id)
            .bind(task_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
