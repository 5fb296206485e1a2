use std::sync::Arc;

use memoria_services::SystemInitService;
use tonic::{Request, Response, Status};

use crate::pb::memoria::v1::system_service_server::SystemService;
use crate::pb::memoria::v1::{InitSystemRequest, InitSystemResponse};

pub struct SystemServiceImpl {
    service: Arc<SystemInitService>,
}

impl SystemServiceImpl {
    #[must_use]
    pub fn new(service: Arc<SystemInitService>) -> Self {
        Self { service }
    }
}

#[tonic::async_trait]
impl SystemService for SystemServiceImpl {
    async fn init_system(
        &self,
        _request: Request<InitSystemRequest>,
    ) -> Result<Response<InitSystemResponse>, Status> {
        let result = self.service.init().await?;
        Ok(Response::new(InitSystemResponse {
            already_initialized: result.already_initialized,
            api_key: result.api_key,
            user_id: result.user_id.map(|id| id.as_bytes().to_vec()),
        }))
    }
}
