//! Embedder resource service (spec §4.7).

use std::sync::Arc;

use chrono::Utc;
use memoria_core::{
    Embedder, EmbedderFilter, EmbedderRepository, LabelMap, Modality, Pagination, ProviderType,
    ResourceId, Result, Status,
};
use memoria_security::access_control::{authorize, list_owner_filter, AuthenticatedUser, ResourceKind, Verb};

use crate::labels::LabelUpdate;

pub struct EmbedderService {
    repo: Arc<dyn EmbedderRepository>,
}

/// Fields an update may change; `provider_type`/`dimensionality` are
/// immutable and are not part of this struct at all — a caller that
/// wants to change them has no field to set, which is the point.
#[derive(Debug, Clone, Default)]
pub struct EmbedderUpdate {
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub credentials: Option<String>,
    pub monitoring_endpoint: Option<String>,
    pub labels: LabelUpdate,
}

impl EmbedderService {
    #[must_use]
    pub fn new(repo: Arc<dyn EmbedderRepository>) -> Self {
        Self { repo }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        caller: &AuthenticatedUser,
        owner_id: Option<ResourceId>,
        display_name: String,
        description: String,
        provider_type: ProviderType,
        endpoint_url: String,
        api_path: String,
        model_identifier: String,
        dimensionality: u32,
        max_sequence_length: Option<u32>,
        supported_modalities: Vec<Modality>,
        credentials: String,
        labels: LabelMap,
        monitoring_endpoint: Option<String>,
    ) -> Result<Embedder> {
        let owner_id = owner_id.unwrap_or(caller.user_id);
        authorize(caller, Verb::Create, ResourceKind::Embedder, Some(owner_id))?;

        if display_name.trim().is_empty() {
            return Err(Status::invalid_argument("displayName must not be empty"));
        }
        if provider_type == ProviderType::Unspecified {
            return Err(Status::invalid_argument("providerType must not be UNSPECIFIED"));
        }
        if endpoint_url.trim().is_empty() {
            return Err(Status::invalid_argument("endpointUrl must not be empty"));
        }
        if model_identifier.trim().is_empty() {
            return Err(Status::invalid_argument("modelIdentifier must not be empty"));
        }
        if dimensionality == 0 {
            return Err(Status::invalid_argument("dimensionality must be greater than 0"));
        }
        if self
            .repo
            .load_by_connection_triple(&endpoint_url, &api_path, &model_identifier)
            .await?
            .is_some()
        {
            return Err(Status::already_exists(
                "an embedder with this endpointUrl/apiPath/modelIdentifier already exists",
            ));
        }

        let now = Utc::now();
        let embedder = Embedder {
            embedder_id: ResourceId::new_random(),
            display_name,
            description,
            provider_type,
            endpoint_url,
            api_path,
            model_identifier,
            dimensionality,
            max_sequence_length,
            supported_modalities,
            credentials,
            labels,
            version: 1,
            monitoring_endpoint,
            owner_id,
            created_at: now,
            updated_at: now,
            created_by_id: caller.user_id,
            updated_by_id: caller.user_id,
        };
        self.repo.save(&embedder).await?;
        Ok(embedder)
    }

    pub async fn get(&self, caller: &AuthenticatedUser, id: ResourceId) -> Result<Embedder> {
        let embedder = self
            .repo
            .load_by_id(id)
            .await?
            .ok_or_else(|| Status::not_found(format!("embedder {id} not found")))?;
        authorize(caller, Verb::Get, ResourceKind::Embedder, Some(embedder.owner_id))?;
        Ok(embedder)
    }

    pub async fn update(&self, caller: &AuthenticatedUser, id: ResourceId, update: EmbedderUpdate) -> Result<Embedder> {
        let mut embedder = self
            .repo
            .load_by_id(id)
            .await?
            .ok_or_else(|| Status::not_found(format!("embedder {id} not found")))?;
        authorize(caller, Verb::Update, ResourceKind::Embedder, Some(embedder.owner_id))?;

        if let Some(display_name) = update.display_name {
            embedder.display_name = display_name;
        }
        if let Some(description) = update.description {
            embedder.description = description;
        }
        if let Some(credentials) = update.credentials {
            embedder.credentials = credentials;
        }
        if let Some(monitoring_endpoint) = update.monitoring_endpoint {
            embedder.monitoring_endpoint = Some(monitoring_endpoint);
        }
        embedder.labels = update.labels.apply(&embedder.labels)?;
        embedder.updated_at = Utc::now();
        embedder.updated_by_id = caller.user_id;
        embedder.version += 1;
        self.repo.save(&embedder).await?;
        Ok(embedder)
    }

    pub async fn delete(&self, caller: &AuthenticatedUser, id: ResourceId) -> Result<()> {
        let embedder = self
            .repo
            .load_by_id(id)
            .await?
            .ok_or_else(|| Status::not_found(format!("embedder {id} not found")))?;
        authorize(caller, Verb::Delete, ResourceKind::Embedder, Some(embedder.owner_id))?;
        self.repo.delete_by_id(id).await
    }

    /// `_OWN`-only callers get an implicit `ownerId = caller` filter
    /// (spec §4.7), overriding whatever `filter.owner_id` was supplied.
    pub async fn list(
        &self,
        caller: &AuthenticatedUser,
        mut filter: EmbedderFilter,
        page: &Pagination,
    ) -> Result<Vec<Embedder>> {
        if let Some(restricted_to) = list_owner_filter(caller, ResourceKind::Embedder) {
            filter.owner_id = Some(restricted_to);
        }
        self.repo.list(&filter, page).await
    }
}
