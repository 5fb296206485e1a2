//! Status/Result primitives, identifier & codec utilities, and domain
//! types shared by every other `memoria-*` crate.
//!
//! This crate has no knowledge of Postgres, S3, tonic, or axum — it is
//! the vocabulary the rest of the workspace is written in.

pub mod codec;
pub mod error;
pub mod ids;
pub mod pagination;
pub mod traits;
pub mod types;

pub use codec::LabelMap;
pub use error::{Result, Status, StatusCode};
pub use ids::ResourceId;
pub use pagination::{Page, SortBy, SortOrder};
pub use traits::{
    ApiKeyRepository, EmbedderFilter, EmbedderRepository, MemoryRepository, ObjectStore,
    Pagination, SpaceFilter, SpaceRepository, SystemInitRepository, UserRepository,
};
pub use types::{
    ApiKey, ApiKeyStatus, Embedder, Memory, Modality, ProcessingStatus, ProviderType, Role, Space,
    User,
};
