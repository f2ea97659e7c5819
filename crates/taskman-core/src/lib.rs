pub mod error;
pub mod filter;
pub mod memory;
pub mod models;
pub mod password;
pub mod patch;
pub mod seed;
pub mod services;
pub mod store;
pub mod token;

pub use error::{AppError, FieldErrors};
pub use filter::{Page, Pagination, TaskFilter, UserFilter};
pub use memory::InMemoryStore;
pub use models::{
    CreateTask, CreateUser, Label, LabelUpdate, NewLabel, NewTask, NewTaskStatus, NewUser, Role,
    Task, TaskStatus, TaskStatusUpdate, TaskUpdate, User, UserUpdate,
};
pub use password::PasswordHasher;
pub use patch::Patch;
pub use seed::{AdminAccount, SeedReport, seed_defaults, seed_demo};
pub use services::{LabelService, TaskService, TaskStatusService, UserService};
pub use store::{LabelStore, Store, TaskStatusStore, TaskStore, UserStore};
pub use token::{Claims, TokenService};
