use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::datetime;

/// A span of time spent on a task.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct TimeLog {
    pub id: i32,
    pub task_id: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Seconds between `start_time` and `end_time`.
    pub time_spent: f64,
}

/// Payload for creating or replacing a time log. `end_time` defaults to now.
#[derive(Debug, Deserialize)]
pub struct TimeLogInput {
    #[serde(deserialize_with = "datetime::deserialize")]
    pub start_time: DateTime<Utc>,
    #[serde(default, deserialize_with = "datetime::deserialize_option")]
    pub end_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTimeLog {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub time_spent: f64,
}

impl NewTimeLog {
    /// Returns `None` when `end_time` precedes `start_time`.
    pub fn between(start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Option<Self> {
        if end_time < start_time {
            return None;
        }
        let time_spent = (end_time - start_time).num_milliseconds() as f64 / 1000.0;
        Some(Self {
            start_time,
            end_time,
            time_spent,
        })
    }
}

impl TimeLogInput {
    pub fn resolve(self, now: DateTime<Utc>) -> Option<NewTimeLog> {
        NewTimeLog::between(self.start_time, self.end_time.unwrap_or(now))
    }
}
