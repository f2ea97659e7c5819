//! Business rules on top of the store traits.
//!
//! Each service is generic over the backend so the same rules run against
//! PostgreSQL and the in-memory store.

mod labels;
mod task_statuses;
mod tasks;
mod users;

pub use labels::LabelService;
pub use task_statuses::TaskStatusService;
pub use tasks::TaskService;
pub use users::UserService;
