pub mod apikey_service;
pub mod embedder_service;
pub mod memory_service;
pub mod space_service;
pub mod system_service;
pub mod user_service;

pub use apikey_service::ApiKeyServiceImpl;
pub use embedder_service::EmbedderServiceImpl;
pub use memory_service::MemoryServiceImpl;
pub use space_service::SpaceServiceImpl;
pub use system_service::SystemServiceImpl;
pub use user_service::UserServiceImpl;
