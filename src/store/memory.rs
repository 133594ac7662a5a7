use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::models::{
    Category, NewTask, NewTimeLog, NewUser, Task, TaskChanges, TimeLog, User, UserUpdate,
};
use crate::store::{Store, StoreError};

/// In-process store with the same semantics as [`PgStore`](crate::store::PgStore).
///
/// Used by the test suite and as a fallback when no `DATABASE_URL` is configured.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Tables>,
}

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i32, User>,
    categories: BTreeMap<i32, Category>,
    tasks: BTreeMap<i32, Task>,
    /// (task_id, category_id)
    task_categories: BTreeSet<(i32, i32)>,
    time_logs: BTreeMap<i32, TimeLog>,
    last_id: i32,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.last_id += 1;
        self.last_id
    }

    fn email_taken(&self, email: &str, except: Option<i32>) -> bool {
        self.users
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }

    fn remove_task(&mut self, id: i32) -> bool {
        if self.tasks.remove(&id).is_none() {
            return false;
        }
        self.task_categories.retain(|(task_id, _)| *task_id != id);
        self.time_logs.retain(|_, log| log.task_id != id);
        true
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.inner.write().await;
        if tables.email_taken(&user.email, None) {
            return Err(StoreError::Conflict(format!(
                "email {} already registered",
                user.email
            )));
        }
        let id = tables.next_id();
        let user = User {
            id,
            name: user.name,
            email: user.email,
            hashed_password: user.hashed_password,
        };
        tables.users.insert(id, user.clone());
        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.inner.read().await.users.values().cloned().collect())
    }

    async fn find_user_by_id(&self, id: i32) -> Result<Option<User>, StoreError> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let tables = self.inner.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn update_user(&self, id: i32, update: UserUpdate) -> Result<Option<User>, StoreError> {
        let mut tables = self.inner.write().await;
        if tables.email_taken(&update.email, Some(id)) {
            return Err(StoreError::Conflict(format!(
                "email {} already registered",
                update.email
            )));
        }
        Ok(tables.users.get_mut(&id).map(|user| {
            user.name = update.name;
            user.email = update.email;
            user.clone()
        }))
    }

    async fn update_credential_hash(&self, id: i32, new_hash: &str) -> Result<bool, StoreError> {
        let mut tables = self.inner.write().await;
        match tables.users.get_mut(&id) {
            Some(user) => {
                user.hashed_password = new_hash.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_user(&self, id: i32) -> Result<bool, StoreError> {
        let mut tables = self.inner.write().await;
        if tables.users.remove(&id).is_none() {
            return Ok(false);
        }
        let owned: Vec<i32> = tables
            .tasks
            .values()
            .filter(|t| t.user_id == id)
            .map(|t| t.id)
            .collect();
        for task_id in owned {
            tables.remove_task(task_id);
        }
        Ok(true)
    }

    async fn create_category(&self, name: &str) -> Result<Category, StoreError> {
        let mut tables = self.inner.write().await;
        let id = tables.next_id();
        let category = Category {
            id,
            name: name.to_string(),
        };
        tables.categories.insert(id, category.clone());
        Ok(category)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        Ok(self.inner.read().await.categories.values().cloned().collect())
    }

    async fn find_category(&self, id: i32) -> Result<Option<Category>, StoreError> {
        Ok(self.inner.read().await.categories.get(&id).cloned())
    }

    async fn update_category(&self, id: i32, name: &str) -> Result<Option<Category>, StoreError> {
        let mut tables = self.inner.write().await;
        Ok(tables.categories.get_mut(&id).map(|category| {
            category.name = name.to_string();
            category.clone()
        }))
    }

    async fn delete_category(&self, id: i32) -> Result<bool, StoreError> {
        let mut tables = self.inner.write().await;
        if tables.categories.remove(&id).is_none() {
            return Ok(false);
        }
        tables.task_categories.retain(|(_, category_id)| *category_id != id);
        Ok(true)
    }

    async fn create_task(&self, user_id: i32, task: NewTask) -> Result<Task, StoreError> {
        let mut tables = self.inner.write().await;
        if !tables.users.contains_key(&user_id) {
            return Err(StoreError::NotFound);
        }
        let id = tables.next_id();
        let task = Task {
            id,
            title: task.title,
            description: task.description,
            due_date: task.due_date,
            scheduled_datetime: task.scheduled_datetime,
            priority: task.priority,
            user_id,
        };
        tables.tasks.insert(id, task.clone());
        Ok(task)
    }

    async fn list_tasks_for_user(&self, user_id: i32) -> Result<Vec<Task>, StoreError> {
        let tables = self.inner.read().await;
        Ok(tables
            .tasks
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_task(&self, id: i32) -> Result<Option<Task>, StoreError> {
        Ok(self.inner.read().await.tasks.get(&id).cloned())
    }

    async fn update_task(&self, id: i32, changes: TaskChanges) -> Result<Option<Task>, StoreError> {
        let mut tables = self.inner.write().await;
        Ok(tables.tasks.get_mut(&id).map(|task| {
            changes.apply(task);
            task.clone()
        }))
    }

    async fn delete_task(&self, id: i32) -> Result<bool, StoreError> {
        Ok(self.inner.write().await.remove_task(id))
    }

    async fn set_task_categories(
        &self,
        task_id: i32,
        category_ids: &[i32],
    ) -> Result<(), StoreError> {
        let mut tables = self.inner.write().await;
        if !tables.tasks.contains_key(&task_id) {
            return Err(StoreError::NotFound);
        }
        tables.task_categories.retain(|(id, _)| *id != task_id);
        let known: Vec<i32> = category_ids
            .iter()
            .copied()
            .filter(|id| tables.categories.contains_key(id))
            .collect();
        for category_id in known {
            tables.task_categories.insert((task_id, category_id));
        }
        Ok(())
    }

    async fn task_categories(&self, task_id: i32) -> Result<Vec<Category>, StoreError> {
        let tables = self.inner.read().await;
        Ok(tables
            .task_categories
            .iter()
            .filter(|(id, _)| *id == task_id)
            .filter_map(|(_, category_id)| tables.categories.get(category_id).cloned())
            .collect())
    }

    async fn create_time_log(&self, task_id: i32, log: NewTimeLog) -> Result<TimeLog, StoreError> {
        let mut tables = self.inner.write().await;
        if !tables.tasks.contains_key(&task_id) {
            return Err(StoreError::NotFound);
        }
        let id = tables.next_id();
        let log = TimeLog {
            id,
            task_id,
            start_time: log.start_time,
            end_time: log.end_time,
            time_spent: log.time_spent,
        };
        tables.time_logs.insert(id, log.clone());
        Ok(log)
    }

    async fn time_logs_for_task(&self, task_id: i32) -> Result<Vec<TimeLog>, StoreError> {
        let tables = self.inner.read().await;
        Ok(tables
            .time_logs
            .values()
            .filter(|log| log.task_id == task_id)
            .cloned()
            .collect())
    }

    async fn update_time_log(
        &self,
        task_id: i32,
        log_id: i32,
        log: NewTimeLog,
    ) -> Result<Option<TimeLog>, StoreError> {
        let mut tables = self.inner.write().await;
        Ok(tables
            .time_logs
            .get_mut(&log_id)
            .filter(|stored| stored.task_id == task_id)
            .map(|stored| {
                stored.start_time = log.start_time;
                stored.end_time = log.end_time;
                stored.time_spent = log.time_spent;
                stored.clone()
            }))
    }

    async fn delete_time_log(&self, task_id: i32, log_id: i32) -> Result<bool, StoreError> {
        let mut tables = self.inner.write().await;
        let belongs = tables
            .time_logs
            .get(&log_id)
            .map_or(false, |log| log.task_id == task_id);
        if belongs {
            tables.time_logs.remove(&log_id);
        }
        Ok(belongs)
    }
}
