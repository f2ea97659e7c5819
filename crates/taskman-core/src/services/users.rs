use crate::error::AppError;
use crate::filter::{Page, Pagination, UserFilter};
use crate::models::{CreateUser, NewUser, User, UserUpdate};
use crate::password::PasswordHasher;
use crate::store::{TaskStore, UserStore};

/// Account management and credential checks.
#[derive(Debug, Clone)]
pub struct UserService<S> {
    store: S,
    hasher: PasswordHasher,
}

impl<S> UserService<S>
where
    S: UserStore + TaskStore,
{
    pub fn new(store: S, hasher: PasswordHasher) -> Self {
        Self { store, hasher }
    }

    pub async fn list(&self, filter: &UserFilter, page: Pagination) -> Result<Page<User>, AppError> {
        self.store.list_users(filter, page).await
    }

    pub async fn get(&self, id: i64) -> Result<User, AppError> {
        self.store
            .get_user(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User not found: {id}")))
    }

    pub async fn create(&self, input: CreateUser) -> Result<User, AppError> {
        input.validate()?;

        if self.store.find_user_by_email(&input.email).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "User with email {} already exists",
                input.email
            )));
        }

        let password_digest = self.hasher.hash(&input.password)?;
        let user = self
            .store
            .create_user(NewUser {
                email: input.email,
                first_name: input.first_name,
                last_name: input.last_name,
                password_digest,
                role: input.role,
            })
            .await?;

        tracing::info!(user_id = user.id, role = %user.role, "Created user");
        Ok(user)
    }

    /// Apply the fields present in `update`.
    pub async fn update(&self, id: i64, update: UserUpdate) -> Result<User, AppError> {
        update.validate()?;
        let mut user = self.get(id).await?;

        if let Some(email) = update.email.value()
            && *email != user.email
            && let Some(owner) = self.store.find_user_by_email(email).await?
            && owner.id != id
        {
            return Err(AppError::Conflict(format!(
                "User with email {email} already exists"
            )));
        }

        if let Some(password) = update.password.value() {
            user.password_digest = self.hasher.hash(password)?;
        }
        update.first_name.apply_to(&mut user.first_name);
        update.last_name.apply_to(&mut user.last_name);
        update.email.apply_required(&mut user.email);

        let user = self.store.update_user(&user).await?;
        tracing::info!(user_id = id, "Updated user");
        Ok(user)
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        self.get(id).await?;

        if self.store.has_tasks_with_assignee(id).await? {
            return Err(AppError::Conflict(
                "Cannot delete user with associated tasks".into(),
            ));
        }

        if !self.store.delete_user(id).await? {
            return Err(AppError::NotFound(format!("User not found: {id}")));
        }
        tracing::info!(user_id = id, "Deleted user");
        Ok(())
    }

    /// Resolve login credentials to a user.
    ///
    /// Unknown e-mails and wrong passwords are indistinguishable to the caller.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, AppError> {
        let Some(user) = self.store.find_user_by_email(email).await? else {
            tracing::info!("Login attempt for unknown account");
            return Err(AppError::InvalidCredentials);
        };

        if !self.hasher.verify(password, &user.password_digest) {
            tracing::info!(user_id = user.id, "Login attempt with wrong password");
            return Err(AppError::InvalidCredentials);
        }
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<User, AppError> {
        self.store
            .find_user_by_email(email)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User not found: {email}")))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::memory::InMemoryStore;
    use crate::models::{NewTask, NewTaskStatus, Role};
    use crate::patch::Patch;
    use crate::store::TaskStatusStore;

    fn service() -> (UserService<InMemoryStore>, InMemoryStore) {
        let store = InMemoryStore::new();
        let hasher = PasswordHasher::with_params(8, 1).unwrap();
        (UserService::new(store.clone(), hasher), store)
    }

    #[tokio::test]
    async fn create_hashes_password_and_rejects_duplicates() {
        let (users, _) = service();
        let user = users
            .create(CreateUser::new("jane@example.com", "secret").with_name("Jane", "Doe"))
            .await
            .unwrap();
        assert_ne!(user.password_digest, "secret");
        assert_eq!(user.role, Role::User);

        let err = users
            .create(CreateUser::new("jane@example.com", "other"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn create_validates_input() {
        let (users, _) = service();
        let err = users
            .create(CreateUser::new("not-an-email", "pw"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn authenticate_checks_password() {
        let (users, _) = service();
        users
            .create(CreateUser::new("jane@example.com", "secret"))
            .await
            .unwrap();

        assert!(users.authenticate("jane@example.com", "secret").await.is_ok());
        assert!(matches!(
            users.authenticate("jane@example.com", "wrong").await,
            Err(AppError::InvalidCredentials)
        ));
        assert!(matches!(
            users.authenticate("nobody@example.com", "secret").await,
            Err(AppError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn update_changes_only_present_fields() {
        let (users, _) = service();
        let user = users
            .create(CreateUser::new("jane@example.com", "secret").with_name("Jane", "Doe"))
            .await
            .unwrap();

        let updated = users
            .update(
                user.id,
                UserUpdate {
                    first_name: Patch::Value("Janet".into()),
                    last_name: Patch::Null,
                    password: Patch::Value("new-secret".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.first_name.as_deref(), Some("Janet"));
        assert_eq!(updated.last_name, None);
        assert_eq!(updated.email, "jane@example.com");
        assert!(users.authenticate("jane@example.com", "new-secret").await.is_ok());
    }

    #[tokio::test]
    async fn update_rejects_taken_email() {
        let (users, _) = service();
        users
            .create(CreateUser::new("a@example.com", "secret"))
            .await
            .unwrap();
        let b = users
            .create(CreateUser::new("b@example.com", "secret"))
            .await
            .unwrap();

        let err = users
            .update(
                b.id,
                UserUpdate {
                    email: Patch::Value("a@example.com".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn delete_is_blocked_by_assigned_tasks() {
        let (users, store) = service();
        let user = users
            .create(CreateUser::new("a@example.com", "secret"))
            .await
            .unwrap();
        let status = store
            .create_status(NewTaskStatus::new("Draft", "draft"))
            .await
            .unwrap();
        store
            .create_task(NewTask {
                index: None,
                name: "Assigned".into(),
                description: None,
                task_status_id: status.id,
                assignee_id: Some(user.id),
                label_ids: BTreeSet::new(),
            })
            .await
            .unwrap();

        assert!(matches!(
            users.delete(user.id).await,
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(users.delete(999).await, Err(AppError::NotFound(_))));
    }
}
