//! System-init: idempotent, unauthenticated root-user bootstrap (spec
//! §4.5). Callable with no prior credentials — there is nothing to
//! authenticate against before a root user exists.

use std::sync::Arc;

use chrono::Utc;
use memoria_core::{ApiKey, ApiKeyStatus, LabelMap, ResourceId, Result, Role, SystemInitRepository, User};
use memoria_security::{apikey, AuditEvent, AuditLogger};

/// Outcome of a single `init()` call. `api_key` is `Some` only on the
/// call that actually performed the bootstrap — the raw secret is
/// never recoverable afterward.
#[derive(Debug, Clone)]
pub struct SystemInitResult {
    pub already_initialized: bool,
    pub api_key: Option<String>,
    pub user_id: Option<ResourceId>,
}

pub struct SystemInitService {
    init_repo: Arc<dyn SystemInitRepository>,
    pepper: String,
    audit: Arc<AuditLogger>,
}

impl SystemInitService {
    #[must_use]
    pub fn new(init_repo: Arc<dyn SystemInitRepository>, pepper: String, audit: Arc<AuditLogger>) -> Self {
        Self {
            init_repo,
            pepper,
            audit,
        }
    }

    /// Runs the procedure in spec §4.5. Safe to call any number of
    /// times from any number of concurrent callers: only the first
    /// caller to win the row lock in `SystemInitRepository::try_init`
    /// gets `already_initialized: false`.
    pub async fn init(&self) -> Result<SystemInitResult> {
        let now = Utc::now();
        let user_id = ResourceId::new_random();
        let user = User {
            user_id,
            username: User::ROOT_USERNAME.to_string(),
            email: None,
            display_name: "Root User".to_string(),
            roles: vec![Role::Root],
            created_at: now,
            updated_at: now,
        };

        let generated = apikey::generate(&self.pepper);
        let key = ApiKey {
            api_key_id: ResourceId::new_random(),
            user_id,
            key_prefix: generated.key_prefix.clone(),
            hashed_key_material: generated.hashed_key_material.clone(),
            status: ApiKeyStatus::Active,
            labels: LabelMap::new(),
            expires_at: None,
            last_used_at: None,
            created_at: now,
            updated_at: now,
            created_by_id: user_id,
            updated_by_id: user_id,
        };

        let inserted = self.init_repo.try_init(&user, &key).await?;
        if inserted {
            self.audit
                .log(AuditEvent::SystemInitialized {
                    root_user_id: user_id,
                })
                .await
                .ok();
            Ok(SystemInitResult {
                already_initialized: false,
                api_key: Some(generated.raw_secret),
                user_id: Some(user_id),
            })
        } else {
            Ok(SystemInitResult {
                already_initialized: true,
                api_key: None,
                user_id: None,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeInitRepo {
        initialized: Mutex<bool>,
    }

    #[async_trait]
    impl SystemInitRepository for FakeInitRepo {
        async fn try_init(&self, _user: &User, _key: &ApiKey) -> Result<bool> {
            let mut guard = self.initialized.lock().unwrap();
            if *guard {
                Ok(false)
            } else {
                *guard = true;
                Ok(true)
            }
        }
    }

    fn service() -> SystemInitService {
        SystemInitService::new(
            Arc::new(FakeInitRepo::default()),
            "pepper".to_string(),
            Arc::new(AuditLogger::new()),
        )
    }

    #[tokio::test]
    async fn first_call_bootstraps_and_returns_a_raw_secret() {
        let service = service();
        let result = service.init().await.unwrap();
        assert!(!result.already_initialized);
        let secret = result.api_key.expect("raw secret returned once");
        assert!(apikey::has_valid_shape(&secret));
        assert!(result.user_id.is_some());
    }

    #[tokio::test]
    async fn second_call_is_idempotent() {
        let service = service();
        service.init().await.unwrap();
        let second = service.init().await.unwrap();
        assert!(second.already_initialized);
        assert!(second.api_key.is_none());
        assert!(second.user_id.is_none());
    }
}
