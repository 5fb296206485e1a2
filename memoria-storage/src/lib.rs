//! Postgres+pgvector data access layer and S3-compatible object store
//! for the Memoria vector memory service. Implements every DAL trait
//! declared in `memoria-core`; nothing upstream of this crate should
//! ever import `tokio_postgres` or `aws_sdk_s3` directly.

#[cfg(feature = "test-support")]
mod fake_object_store;
mod migrations;
mod object_store;
mod pool;
mod repositories;
mod rowmap;

#[cfg(feature = "test-support")]
pub use fake_object_store::FakeObjectStore;
pub use object_store::S3ObjectStore;
pub use pool::{PgPool, PostgresConfig, SharedPgPool};
pub use repositories::{
    PgApiKeyRepository, PgEmbedderRepository, PgMemoryRepository, PgSpaceRepository,
    PgSystemInitRepository, PgUserRepository,
};
