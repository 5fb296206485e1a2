//! Resource services and system-init business logic for the Memoria
//! vector memory service (spec §4.5-§4.11). Every service method opens
//! with the permission gate from `memoria_security::access_control`
//! before touching its injected `Arc<dyn XRepository>` — nothing in
//! this crate talks to Postgres or S3 directly.

pub mod apikey_service;
pub mod embedder_service;
pub mod labels;
pub mod memory_service;
pub mod space_service;
pub mod system_init;
pub mod user_service;

pub use apikey_service::ApiKeyService;
pub use embedder_service::EmbedderService;
pub use labels::LabelUpdate;
pub use memory_service::MemoryService;
pub use space_service::SpaceService;
pub use system_init::{SystemInitResult, SystemInitService};
pub use user_service::UserService;
