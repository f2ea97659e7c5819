use taskman_core::{
    LabelService, PasswordHasher, TaskService, TaskStatusService, TokenService, UserService,
};
use taskman_db::Backend;

/// Shared application state, available to all route handlers via `State<Arc<AppState>>`.
pub struct AppState {
    pub store: Backend,
    pub tokens: TokenService,
    pub hasher: PasswordHasher,
}

impl AppState {
    pub fn new(store: Backend, tokens: TokenService, hasher: PasswordHasher) -> Self {
        Self {
            store,
            tokens,
            hasher,
        }
    }

    pub fn users(&self) -> UserService<Backend> {
        UserService::new(self.store.clone(), self.hasher.clone())
    }

    pub fn task_statuses(&self) -> TaskStatusService<Backend> {
        TaskStatusService::new(self.store.clone())
    }

    pub fn labels(&self) -> LabelService<Backend> {
        LabelService::new(self.store.clone())
    }

    pub fn tasks(&self) -> TaskService<Backend> {
        TaskService::new(self.store.clone())
    }
}
