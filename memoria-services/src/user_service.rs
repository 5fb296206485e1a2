//! User resource service (spec §3, §4.4).

use std::sync::Arc;

use chrono::Utc;
use memoria_core::{ResourceId, Result, Status, User, UserRepository};
use memoria_security::access_control::{authorize, AuthenticatedUser, ResourceKind, Verb};

pub struct UserService {
    repo: Arc<dyn UserRepository>,
}

impl UserService {
    #[must_use]
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    /// Creates a new user. `owner_id` for the permission check is `None`
    /// (a user being created has no "own" row yet), so in practice only
    /// a caller holding `CREATE_USER_ANY` — i.e. `ROOT` — may call this.
    pub async fn create(
        &self,
        caller: &AuthenticatedUser,
        username: String,
        email: Option<String>,
        display_name: String,
    ) -> Result<User> {
        authorize(caller, Verb::Create, ResourceKind::User, None)?;

        if username.trim().is_empty() {
            return Err(Status::invalid_argument("username must not be empty"));
        }
        if self.repo.load_by_username(&username).await?.is_some() {
            return Err(Status::already_exists(format!(
                "username {username} is already taken"
            )));
        }
        if let Some(email) = &email {
            if self.repo.load_by_email(email).await?.is_some() {
                return Err(Status::already_exists(format!(
                    "email {email} is already in use"
                )));
            }
        }

        let now = Utc::now();
        let user = User {
            user_id: ResourceId::new_random(),
            username,
            email,
            display_name,
            roles: vec![memoria_core::Role::User],
            created_at: now,
            updated_at: now,
        };
        self.repo.save(&user).await?;
        Ok(user)
    }

    pub async fn get_by_id(&self, caller: &AuthenticatedUser, id: ResourceId) -> Result<User> {
        let user = self
            .repo
            .load_by_id(id)
            .await?
            .ok_or_else(|| Status::not_found(format!("user {id} not found")))?;
        authorize(caller, Verb::Get, ResourceKind::User, Some(user.user_id))?;
        Ok(user)
    }

    pub async fn get_by_username(&self, caller: &AuthenticatedUser, username: &str) -> Result<User> {
        let user = self
            .repo
            .load_by_username(username)
            .await?
            .ok_or_else(|| Status::not_found(format!("user {username} not found")))?;
        authorize(caller, Verb::Get, ResourceKind::User, Some(user.user_id))?;
        Ok(user)
    }

    pub async fn get_by_email(&self, caller: &AuthenticatedUser, email: &str) -> Result<User> {
        let user = self
            .repo
            .load_by_email(email)
            .await?
            .ok_or_else(|| Status::not_found(format!("no user with email {email}")))?;
        authorize(caller, Verb::Get, ResourceKind::User, Some(user.user_id))?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use memoria_core::{Role, StatusCode};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeUserRepo {
        users: Mutex<Vec<User>>,
    }

    #[async_trait]
    impl UserRepository for FakeUserRepo {
        async fn load_by_id(&self, id: ResourceId) -> Result<Option<User>> {
            Ok(self.users.lock().unwrap().iter().find(|u| u.user_id == id).cloned())
        }
        async fn load_by_username(&self, username: &str) -> Result<Option<User>> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.username == username)
                .cloned())
        }
        async fn load_by_email(&self, email: &str) -> Result<Option<User>> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.email.as_deref() == Some(email))
                .cloned())
        }
        async fn save(&self, user: &User) -> Result<()> {
            self.users.lock().unwrap().push(user.clone());
            Ok(())
        }
    }

    fn root_caller() -> AuthenticatedUser {
        AuthenticatedUser::new(ResourceId::new_random(), vec![Role::Root], ResourceId::new_random())
    }

    fn plain_caller() -> AuthenticatedUser {
        AuthenticatedUser::new(ResourceId::new_random(), vec![Role::User], ResourceId::new_random())
    }

    #[tokio::test]
    async fn root_can_create_a_user() {
        let service = UserService::new(Arc::new(FakeUserRepo::default()));
        let user = service
            .create(&root_caller(), "alice".to_string(), None, "Alice".to_string())
            .await
            .unwrap();
        assert_eq!(user.username, "alice");
    }

    #[tokio::test]
    async fn plain_user_cannot_create_a_user() {
        let service = UserService::new(Arc::new(FakeUserRepo::default()));
        let err = service
            .create(&plain_caller(), "bob".to_string(), None, "Bob".to_string())
            .await
            .unwrap_err();
        assert_eq!(err.code, StatusCode::PermissionDenied);
    }

    #[tokio::test]
    async fn duplicate_username_is_already_exists() {
        let service = UserService::new(Arc::new(FakeUserRepo::default()));
        let root = root_caller();
        service
            .create(&root, "alice".to_string(), None, "Alice".to_string())
            .await
            .unwrap();
        let err = service
            .create(&root, "alice".to_string(), None, "Alice Two".to_string())
            .await
            .unwrap_err();
        assert_eq!(err.code, StatusCode::AlreadyExists);
    }

    #[tokio::test]
    async fn user_can_get_their_own_profile_but_not_someone_elses() {
        let repo = Arc::new(FakeUserRepo::default());
        let service = UserService::new(repo.clone());
        let root = root_caller();
        let created = service
            .create(&root, "alice".to_string(), None, "Alice".to_string())
            .await
            .unwrap();

        let self_caller = AuthenticatedUser::new(created.user_id, vec![Role::User], ResourceId::new_random());
        assert!(service.get_by_id(&self_caller, created.user_id).await.is_ok());

        let other_caller = plain_caller();
        let err = service.get_by_id(&other_caller, created.user_id).await.unwrap_err();
        assert_eq!(err.code, StatusCode::PermissionDenied);
    }

    #[tokio::test]
    async fn get_by_id_missing_is_not_found() {
        let service = UserService::new(Arc::new(FakeUserRepo::default()));
        let err = service.get_by_id(&root_caller(), ResourceId::new_random()).await.unwrap_err();
        assert_eq!(err.code, StatusCode::NotFound);
    }
}
