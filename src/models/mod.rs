pub mod category;
pub mod datetime;
pub mod task;
pub mod time_log;
pub mod user;

pub use category::{Category, CategoryInput};
pub use task::{NewTask, Priority, Task, TaskChanges, TaskDetails, TaskInput, TaskUpdate};
pub use time_log::{NewTimeLog, TimeLog, TimeLogInput};
pub use user::{NewUser, User, UserUpdate};
