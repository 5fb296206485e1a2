//! Space resource service (spec §4.8).

use std::sync::Arc;

use chrono::Utc;
use memoria_core::{
    EmbedderRepository, Page, Pagination, ResourceId, Result, SortBy, SortOrder, Space,
    SpaceFilter, SpaceRepository, Status,
};
use memoria_security::access_control::{authorize, list_owner_filter, AuthenticatedUser, ResourceKind, Verb};
use memoria_security::PageToken;

use crate::labels::LabelUpdate;

pub struct SpaceService {
    repo: Arc<dyn SpaceRepository>,
    embedders: Arc<dyn EmbedderRepository>,
    /// Server-side default embedder applied when a create request omits
    /// `embedderId` (spec §4.8). Configured at startup; `None` means the
    /// install has not designated one, in which case omitting
    /// `embedderId` is rejected.
    default_embedder_id: Option<ResourceId>,
}

#[derive(Debug, Clone, Default)]
pub struct SpaceUpdate {
    pub name: Option<String>,
    pub public_read: Option<bool>,
    pub labels: LabelUpdate,
}

impl SpaceService {
    #[must_use]
    pub fn new(
        repo: Arc<dyn SpaceRepository>,
        embedders: Arc<dyn EmbedderRepository>,
        default_embedder_id: Option<ResourceId>,
    ) -> Self {
        Self {
            repo,
            embedders,
            default_embedder_id,
        }
    }

    pub async fn create(
        &self,
        caller: &AuthenticatedUser,
        owner_id: Option<ResourceId>,
        name: String,
        embedder_id: Option<ResourceId>,
        labels: memoria_core::LabelMap,
        public_read: bool,
    ) -> Result<Space> {
        let owner_id = owner_id.unwrap_or(caller.user_id);
        authorize(caller, Verb::Create, ResourceKind::Space, Some(owner_id))?;

        if name.trim().is_empty() {
            return Err(Status::invalid_argument("name must not be empty"));
        }

        let embedder_id = match embedder_id.or(self.default_embedder_id) {
            Some(id) => id,
            None => {
                return Err(Status::invalid_argument(
                    "embedderId is required: no server-side default embedder is configured",
                ))
            }
        };
        if self.embedders.load_by_id(embedder_id).await?.is_none() {
            return Err(Status::failed_precondition(format!("embedder {embedder_id} does not exist")));
        }

        if self.repo.load_by_owner_and_name(owner_id, &name).await?.is_some() {
            return Err(Status::already_exists(format!(
                "space {name} already exists for this owner"
            )));
        }

        let now = Utc::now();
        let space = Space {
            space_id: ResourceId::new_random(),
            name,
            owner_id,
            embedder_id,
            labels,
            public_read,
            created_at: now,
            updated_at: now,
            created_by_id: caller.user_id,
            updated_by_id: caller.user_id,
        };
        self.repo.save(&space).await?;
        Ok(space)
    }

    pub async fn get(&self, caller: &AuthenticatedUser, id: ResourceId) -> Result<Space> {
        let space = self
            .repo
            .load_by_id(id)
            .await?
            .ok_or_else(|| Status::not_found(format!("space {id} not found")))?;
        authorize(caller, Verb::Get, ResourceKind::Space, Some(space.owner_id))?;
        Ok(space)
    }

    pub async fn update(&self, caller: &AuthenticatedUser, id: ResourceId, update: SpaceUpdate) -> Result<Space> {
        let mut space = self
            .repo
            .load_by_id(id)
            .await?
            .ok_or_else(|| Status::not_found(format!("space {id} not found")))?;
        authorize(caller, Verb::Update, ResourceKind::Space, Some(space.owner_id))?;

        if let Some(name) = update.name {
            if name.trim().is_empty() {
                return Err(Status::invalid_argument("name must not be empty"));
            }
            if name != space.name {
                if self.repo.load_by_owner_and_name(space.owner_id, &name).await?.is_some() {
                    return Err(Status::already_exists(format!(
                        "space {name} already exists for this owner"
                    )));
                }
                space.name = name;
            }
        }
        if let Some(public_read) = update.public_read {
            space.public_read = public_read;
        }
        space.labels = update.labels.apply(&space.labels)?;
        space.updated_at = Utc::now();
        space.updated_by_id = caller.user_id;
        self.repo.save(&space).await?;
        Ok(space)
    }

    pub async fn delete(&self, caller: &AuthenticatedUser, id: ResourceId) -> Result<()> {
        let space = self
            .repo
            .load_by_id(id)
            .await?
            .ok_or_else(|| Status::not_found(format!("space {id} not found")))?;
        authorize(caller, Verb::Delete, ResourceKind::Space, Some(space.owner_id))?;
        self.repo.delete_by_id(id).await
    }

    /// Lists spaces (spec §4.8, §4.9). When `page_token` is present, any
    /// of `filter`/`sort_by`/`sort_order` passed alongside it are
    /// ignored in favor of what the token carries.
    pub async fn list(
        &self,
        caller: &AuthenticatedUser,
        filter: SpaceFilter,
        sort_by: SortBy,
        sort_order: SortOrder,
        max_results: u32,
        page_token: Option<&str>,
    ) -> Result<Page<Space>> {
        let (mut filter, start, sort_by, sort_order) = match page_token.filter(|t| !t.is_empty()) {
            Some(token) => {
                let decoded = PageToken::decode(token, caller.user_id)?;
                let filter: SpaceFilter = serde_json::from_str(&decoded.filter_fingerprint)
                    .map_err(|_| Status::invalid_argument("malformed page token: filter content"))?;
                (filter, decoded.offset, decoded.sort_by, decoded.sort_order)
            }
            None => (filter, 0, sort_by, sort_order),
        };

        if let Some(restricted_to) = list_owner_filter(caller, ResourceKind::Space) {
            filter.owner_id = Some(restricted_to);
        }

        // Over-fetch by one to detect whether a next page exists without
        // a separate COUNT query.
        let page = Pagination {
            start,
            max_results: max_results + 1,
            sort_by,
            sort_order,
        };
        let mut items = self.repo.list(&filter, &page).await?;

        let next_token = if items.len() as u32 > max_results {
            items.truncate(max_results as usize);
            let fingerprint = serde_json::to_string(&filter)
                .map_err(|e| Status::with_cause(memoria_core::StatusCode::Internal, "failed to serialize filter", e))?;
            let token = PageToken {
                requestor_id: caller.user_id,
                offset: start + max_results,
                sort_by,
                sort_order,
                filter_fingerprint: fingerprint,
            };
            Some(token.encode())
        } else {
            None
        };

        Ok(Page { items, next_token })
    }
}
