use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::{datetime, Category, TimeLog};

/// Represents the priority of a task.
/// Stored as an integer: high = 1, medium = 2, low = 3.
///
/// Serialized by name. Either the name or the stored integer is accepted on input.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, sqlx::Type)]
#[repr(i32)]
#[serde(rename_all = "lowercase", try_from = "PriorityRepr")]
pub enum Priority {
    High = 1,
    #[default]
    Medium = 2,
    Low = 3,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PriorityRepr {
    Code(i64),
    Name(String),
}

impl TryFrom<PriorityRepr> for Priority {
    type Error = String;

    fn try_from(repr: PriorityRepr) -> Result<Self, Self::Error> {
        match repr {
            PriorityRepr::Code(1) => Ok(Priority::High),
            PriorityRepr::Code(2) => Ok(Priority::Medium),
            PriorityRepr::Code(3) => Ok(Priority::Low),
            PriorityRepr::Code(code) => Err(format!("unknown priority {}", code)),
            PriorityRepr::Name(name) => match name.to_ascii_lowercase().as_str() {
                "high" => Ok(Priority::High),
                "medium" => Ok(Priority::Medium),
                "low" => Ok(Priority::Low),
                _ => Err(format!("unknown priority {:?}", name)),
            },
        }
    }
}

/// Represents a task row as stored in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Task {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub scheduled_datetime: Option<DateTime<Utc>>,
    pub priority: Priority,
    /// Identifier of the user who owns the task.
    pub user_id: i32,
}

impl Task {
    pub fn is_owned_by(&self, user_id: i32) -> bool {
        self.user_id == user_id
    }
}

/// A task together with its categories and time logs, as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskDetails {
    #[serde(flatten)]
    pub task: Task,
    pub categories: Vec<Category>,
    pub time_logs: Vec<TimeLog>,
}

/// Input structure for creating a task.
#[derive(Debug, Deserialize, Validate)]
pub struct TaskInput {
    /// Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "datetime::deserialize_option")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "datetime::deserialize_option")]
    pub scheduled_datetime: Option<DateTime<Utc>>,
    /// Defaults to medium.
    pub priority: Option<Priority>,
    /// Categories to link; ids that do not exist are ignored.
    pub category_ids: Option<Vec<i32>>,
}

/// Input structure for a partial task update. Absent fields are left untouched.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct TaskUpdate {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "datetime::deserialize_option")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "datetime::deserialize_option")]
    pub scheduled_datetime: Option<DateTime<Utc>>,
    pub priority: Option<Priority>,
    /// When present, replaces the task's category links (an empty list clears them).
    pub category_ids: Option<Vec<i32>>,
}

/// Task fields to insert.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub scheduled_datetime: Option<DateTime<Utc>>,
    pub priority: Priority,
}

/// Task fields to overwrite; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub scheduled_datetime: Option<DateTime<Utc>>,
    pub priority: Option<Priority>,
}

impl TaskInput {
    /// Splits the payload into the row to insert and the categories to link.
    pub fn into_parts(self) -> (NewTask, Vec<i32>) {
        let task = NewTask {
            title: self.title,
            description: self.description,
            due_date: self.due_date,
            scheduled_datetime: self.scheduled_datetime,
            priority: self.priority.unwrap_or_default(),
        };
        (task, self.category_ids.unwrap_or_default())
    }
}

impl TaskUpdate {
    pub fn into_parts(self) -> (TaskChanges, Option<Vec<i32>>) {
        let changes = TaskChanges {
            title: self.title,
            description: self.description,
            due_date: self.due_date,
            scheduled_datetime: self.scheduled_datetime,
            priority: self.priority,
        };
        (changes, self.category_ids)
    }
}

impl TaskChanges {
    pub fn apply(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = Some(description);
        }
        if let Some(due_date) = self.due_date {
            task.due_date = Some(due_date);
        }
        if let Some(scheduled) = self.scheduled_datetime {
            task.scheduled_datetime = Some(scheduled);
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
    }
}
