//! Everything a handler needs to reach the shared business core (spec
//! §4.12): the same service instances `memoria-grpc` wires up, so the
//! two transports can never drift in behavior, only in wire shape.

use std::sync::Arc;

use memoria_security::AuthInterceptor;
use memoria_services::{ApiKeyService, EmbedderService, MemoryService, SpaceService, SystemInitService, UserService};

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthInterceptor>,
    pub system_init: Arc<SystemInitService>,
    pub users: Arc<UserService>,
    pub api_keys: Arc<ApiKeyService>,
    pub embedders: Arc<EmbedderService>,
    pub spaces: Arc<SpaceService>,
    pub memories: Arc<MemoryService>,
}

impl AppState {
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
            auth,
            system_init,
            users,
            api_keys,
            embedders,
            spaces,
            memories,
        }
    }
}
