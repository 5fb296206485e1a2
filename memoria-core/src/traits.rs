//! Data access layer traits (spec §4.2) and the object-store interface
//! (spec §1). One trait per aggregate, grounded on the shape of
//! `StorageBackend` from the teacher codebase: async, `Send + Sync`,
//! one method per concern, `Result<T>`/`Result<Option<T>>` returns.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::codec::LabelMap;
use crate::error::Result;
use crate::ids::ResourceId;
use crate::pagination::{SortBy, SortOrder};
use crate::types::{ApiKey, Embedder, Memory, ProviderType, Space, User};

/// Filter parameters accepted by [`EmbedderRepository::list`] (spec §4.7).
///
/// Serializable so a resource service can round-trip it through a
/// pagination token's `filter_fingerprint` (spec §4.9).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmbedderFilter {
    pub owner_id: Option<ResourceId>,
    pub provider_type: Option<ProviderType>,
    pub label_selectors: LabelMap,
}

/// Filter parameters accepted by [`SpaceRepository::list`] (spec §4.8).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpaceFilter {
    pub owner_id: Option<ResourceId>,
    pub label_selectors: LabelMap,
    /// Glob-style (`*` wildcard) match against `name`.
    pub name_filter: Option<String>,
}

/// Offset + sort parameters for a single list call. The pagination-token
/// codec in `memoria-security` is what actually carries these across
/// pages; this struct is just what a single query needs to run.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub start: u32,
    pub max_results: u32,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            start: 0,
            max_results: 50,
            sort_by: SortBy::default(),
            sort_order: SortOrder::default(),
        }
    }
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn load_by_id(&self, id: ResourceId) -> Result<Option<User>>;
    async fn load_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn load_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn save(&self, user: &User) -> Result<()>;
}

#[async_trait]
pub trait ApiKeyRepository: Send + Sync {
    async fn load_by_id(&self, id: ResourceId) -> Result<Option<ApiKey>>;
    async fn load_by_hashed_key(&self, hashed_key_material: &str) -> Result<Option<ApiKey>>;
    async fn save(&self, key: &ApiKey) -> Result<()>;
    async fn delete_by_id(&self, id: ResourceId) -> Result<()>;
    async fn list_by_owner(&self, owner_id: ResourceId) -> Result<Vec<ApiKey>>;
    /// Best-effort `lastUsedAt` bump (spec §4.3) — a storage failure here
    /// must never fail the authenticating call.
    async fn touch_last_used(&self, id: ResourceId) -> Result<()>;
}

#[async_trait]
pub trait EmbedderRepository: Send + Sync {
    async fn load_by_id(&self, id: ResourceId) -> Result<Option<Embedder>>;
    async fn load_by_connection_triple(
        &self,
        endpoint_url: &str,
        api_path: &str,
        model_identifier: &str,
    ) -> Result<Option<Embedder>>;
    async fn save(&self, embedder: &Embedder) -> Result<()>;
    async fn delete_by_id(&self, id: ResourceId) -> Result<()>;
    async fn list(&self, filter: &EmbedderFilter, page: &Pagination) -> Result<Vec<Embedder>>;
}

#[async_trait]
pub trait SpaceRepository: Send + Sync {
    async fn load_by_id(&self, id: ResourceId) -> Result<Option<Space>>;
    async fn load_by_owner_and_name(&self, owner_id: ResourceId, name: &str) -> Result<Option<Space>>;
    async fn save(&self, space: &Space) -> Result<()>;
    /// Deletes the space and cascades to its memories in one transaction
    /// (spec §3, §5).
    async fn delete_by_id(&self, id: ResourceId) -> Result<()>;
    async fn list(&self, filter: &SpaceFilter, page: &Pagination) -> Result<Vec<Space>>;
}

#[async_trait]
pub trait MemoryRepository: Send + Sync {
    async fn load_by_id(&self, id: ResourceId) -> Result<Option<Memory>>;
    async fn save(&self, memory: &Memory) -> Result<()>;
    async fn delete_by_id(&self, id: ResourceId) -> Result<()>;
    async fn list_by_space(&self, space_id: ResourceId, page: &Pagination) -> Result<Vec<Memory>>;
    /// Write the embedding vector alongside the row (spec §3: "the
    /// embedding vector itself lives in the vector-extension column").
    async fn save_embedding(&self, memory_id: ResourceId, embedding: &[f32]) -> Result<()>;
    async fn delete_embedding(&self, memory_id: ResourceId) -> Result<()>;
}

/// The transactional critical section of system-init (spec §4.5): look
/// up the reserved `"root"` username and, if absent, insert the root
/// user plus its bootstrap [`ApiKey`] atomically. A plain
/// `UserRepository`/`ApiKeyRepository` pair cannot give this operation
/// its all-or-nothing guarantee on its own, since "check, then insert
/// two rows" needs to be one statement-group under one transaction, not
/// two independently-committed saves.
#[async_trait]
pub trait SystemInitRepository: Send + Sync {
    /// Returns `true` if `user`/`key` were newly inserted, `false` if a
    /// root user already existed (in which case neither row is
    /// touched).
    async fn try_init(&self, user: &User, key: &ApiKey) -> Result<bool>;
}

/// The small `{bucketExists, makeBucket, put, get}` object-store
/// interface the core speaks against an S3-compatible blob store
/// (spec §1). Deletion is intentionally omitted from the trait's
/// required surface in spec.md's framing but is needed for memory
/// deletion's best-effort blob cleanup (spec §4.11), so it is added here.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool>;
    async fn make_bucket(&self, bucket: &str) -> Result<()>;
    async fn put(&self, bucket: &str, key: &str, data: Vec<u8>) -> Result<()>;
    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;
    async fn delete(&self, bucket: &str, key: &str) -> Result<()>;
}
