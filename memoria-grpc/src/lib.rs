//! tonic/prost binary RPC surface for the Memoria vector memory service
//! (spec §4.10, §4.12): one service impl per resource aggregate, all
//! sharing a single [`AuthInterceptor`] so the gRPC and HTTP transports
//! can never authenticate differently.

pub mod convert;
pub mod grpc_auth;
pub mod pb;
pub mod services;

use std::sync::Arc;

use memoria_security::AuthInterceptor;
use memoria_services::{ApiKeyService, EmbedderService, MemoryService, SpaceService, SystemInitService, UserService};
use tonic_reflection::server::{Error as ReflectionError, ServerReflection, ServerReflectionServer};

use pb::memoria::v1::api_key_service_server::ApiKeyServiceServer;
use pb::memoria::v1::embedder_service_server::EmbedderServiceServer;
use pb::memoria::v1::memory_service_server::MemoryServiceServer;
use pb::memoria::v1::space_service_server::SpaceServiceServer;
use pb::memoria::v1::system_service_server::SystemServiceServer;
use pb::memoria::v1::user_service_server::UserServiceServer;
use pb::memoria::v1::FILE_DESCRIPTOR_SET;

pub use services::{
    ApiKeyServiceImpl, EmbedderServiceImpl, MemoryServiceImpl, SpaceServiceImpl, SystemServiceImpl, UserServiceImpl,
};

/// Everything a binary needs to register the full `memoria.v1` surface
/// with a [`tonic::transport::Server`] in one call.
pub struct GrpcServices {
    pub system: SystemServiceServer<SystemServiceImpl>,
    pub user: UserServiceServer<UserServiceImpl>,
    pub api_key: ApiKeyServiceServer<ApiKeyServiceImpl>,
    pub embedder: EmbedderServiceServer<EmbedderServiceImpl>,
    pub space: SpaceServiceServer<SpaceServiceImpl>,
    pub memory: MemoryServiceServer<MemoryServiceImpl>,
}

impl GrpcServices {
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        auth: Arc<AuthInterceptor>,
        system_init: Arc<SystemInitService>,
        users: Arc<UserService>,
        api_keys: Arc<ApiKeyService>,
        embedders: Arc<EmbedderService>,
        spaces: Arc<SpaceService>,
        memories: Arc<MemoryService>,
    ) -> Self {
        Self {
            system: SystemServiceServer::new(SystemServiceImpl::new(system_init)),
            user: UserServiceServer::new(UserServiceImpl::new(users, auth.clone())),
            api_key: ApiKeyServiceServer::new(ApiKeyServiceImpl::new(api_keys, auth.clone())),
            embedder: EmbedderServiceServer::new(EmbedderServiceImpl::new(embedders, auth.clone())),
            space: SpaceServiceServer::new(SpaceServiceImpl::new(spaces, auth.clone())),
            memory: MemoryServiceServer::new(MemoryServiceImpl::new(memories, auth)),
        }
    }
}

/// Builds the `tonic-reflection` service so clients like `grpcurl` can
/// discover the `memoria.v1` surface without a checked-in `.proto`
/// (spec §4.10).
pub fn reflection_service() -> Result<ServerReflectionServer<impl ServerReflection>, ReflectionError> {
    tonic_reflection::server::Builder::configure()
        .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
        .build_v1()
}
