//! ApiKey resource service (spec §4.6).

use std::sync::Arc;

use chrono::{DateTime, Utc};
use memoria_core::{ApiKey, ApiKeyRepository, ApiKeyStatus, LabelMap, ResourceId, Result, Status};
use memoria_security::access_control::{authorize, list_owner_filter, AuthenticatedUser, ResourceKind, Verb};
use memoria_security::{apikey, AuditEvent, AuditLogger};

use crate::labels::LabelUpdate;

pub struct ApiKeyService {
    repo: Arc<dyn ApiKeyRepository>,
    pepper: String,
    audit: Arc<AuditLogger>,
}

impl ApiKeyService {
    #[must_use]
    pub fn new(repo: Arc<dyn ApiKeyRepository>, pepper: String, audit: Arc<AuditLogger>) -> Self {
        Self { repo, pepper, audit }
    }

    /// Generates a fresh key via §4.6 and returns it alongside the raw
    /// secret, shown to the caller exactly once.
    pub async fn create(
        &self,
        caller: &AuthenticatedUser,
        owner_id: Option<ResourceId>,
        labels: LabelMap,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<(ApiKey, String)> {
        let owner_id = owner_id.unwrap_or(caller.user_id);
        authorize(caller, Verb::Create, ResourceKind::ApiKey, Some(owner_id))?;

        let generated = apikey::generate(&self.pepper);
        let now = Utc::now();
        let key = ApiKey {
            api_key_id: ResourceId::new_random(),
            user_id: owner_id,
            key_prefix: generated.key_prefix,
            hashed_key_material: generated.hashed_key_material,
            status: ApiKeyStatus::Active,
            labels,
            expires_at,
            last_used_at: None,
            created_at: now,
            updated_at: now,
            created_by_id: caller.user_id,
            updated_by_id: caller.user_id,
        };
        self.repo.save(&key).await?;
        self.audit
            .log(AuditEvent::ApiKeyCreated {
                api_key_id: key.api_key_id,
                owner_id,
            })
            .await
            .ok();
        Ok((key, generated.raw_secret))
    }

    pub async fn get(&self, caller: &AuthenticatedUser, id: ResourceId) -> Result<ApiKey> {
        let key = self
            .repo
            .load_by_id(id)
            .await?
            .ok_or_else(|| Status::not_found(format!("api key {id} not found")))?;
        authorize(caller, Verb::Get, ResourceKind::ApiKey, Some(key.user_id))?;
        Ok(key)
    }

    /// Owner-scoped list (spec §4.4): an `_OWN`-only caller may only
    /// list `owner_id == caller.user_id`'s keys; an `_ANY` caller may
    /// list any owner's.
    pub async fn list(&self, caller: &AuthenticatedUser, owner_id: ResourceId) -> Result<Vec<ApiKey>> {
        if let Some(restricted_to) = list_owner_filter(caller, ResourceKind::ApiKey) {
            if restricted_to != owner_id {
                return Err(Status::permission_denied("can only list your own API keys"));
            }
        }
        self.repo.list_by_owner(owner_id).await
    }

    pub async fn update(
        &self,
        caller: &AuthenticatedUser,
        id: ResourceId,
        status: Option<ApiKeyStatus>,
        label_update: LabelUpdate,
    ) -> Result<ApiKey> {
        let mut key = self
            .repo
            .load_by_id(id)
            .await?
            .ok_or_else(|| Status::not_found(format!("api key {id} not found")))?;
        authorize(caller, Verb::Update, ResourceKind::ApiKey, Some(key.user_id))?;

        if let Some(status) = status {
            key.status = status;
        }
        key.labels = label_update.apply(&key.labels)?;
        key.updated_at = Utc::now();
        key.updated_by_id = caller.user_id;
        self.repo.save(&key).await?;
        Ok(key)
    }

    pub async fn delete(&self, caller: &AuthenticatedUser, id: ResourceId) -> Result<()> {
        let key = self
            .repo
            .load_by_id(id)
            .await?
            .ok_or_else(|| Status::not_found(format!("api key {id} not found")))?;
        authorize(caller, Verb::Delete, ResourceKind::ApiKey, Some(key.user_id))?;
        self.repo.delete_by_id(id).await?;
        self.audit
            .log(AuditEvent::ApiKeyRevoked {
                api_key_id: id,
                revoked_by: caller.user_id,
            })
            .await
            .ok();
        Ok(())
    }
}
