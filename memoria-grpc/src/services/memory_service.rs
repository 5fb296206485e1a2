use std::sync::Arc;

use memoria_core::{Pagination, ProcessingStatus};
use memoria_security::AuthInterceptor;
use memoria_services::MemoryService as CoreMemoryService;
use tonic::{Request, Response, Status};

use crate::convert::{id_from_bytes, id_to_bytes, labels_from_proto, labels_to_proto, millis};
use crate::grpc_auth;
use crate::pb::memoria::v1::memory_service_server::MemoryService;
use crate::pb::memoria::v1::{
    CreateMemoryRequest, DeleteMemoryRequest, DeleteMemoryResponse, GetMemoryRequest, ListMemoriesRequest,
    ListMemoriesResponse, MemoryMessage, ProcessingStatusProto,
};

pub struct MemoryServiceImpl {
    service: Arc<CoreMemoryService>,
    auth: Arc<AuthInterceptor>,
}

impl MemoryServiceImpl {
    #[must_use]
    pub fn new(service: Arc<CoreMemoryService>, auth: Arc<AuthInterceptor>) -> Self {
        Self { service, auth }
    }
}

fn status_to_proto(status: ProcessingStatus) -> i32 {
    match status {
        ProcessingStatus::Pending => ProcessingStatusProto::Pending as i32,
        ProcessingStatus::Processing => ProcessingStatusProto::Processing as i32,
        ProcessingStatus::Completed => ProcessingStatusProto::Completed as i32,
        ProcessingStatus::Failed => ProcessingStatusProto::Failed as i32,
    }
}

fn memory_to_proto(memory: &memoria_core::Memory) -> MemoryMessage {
    MemoryMessage {
        memory_id: id_to_bytes(memory.memory_id),
        space_id: id_to_bytes(memory.space_id),
        original_content_ref: memory.original_content_ref.clone(),
        content_type: memory.content_type.clone(),
        metadata: labels_to_proto(&memory.metadata),
        processing_status: status_to_proto(memory.processing_status),
        created_at_millis: millis(memory.created_at),
        updated_at_millis: millis(memory.updated_at),
    }
}

#[tonic::async_trait]
impl MemoryService for MemoryServiceImpl {
    async fn create_memory(&self, request: Request<CreateMemoryRequest>) -> Result<Response<MemoryMessage>, Status> {
        let caller = grpc_auth::authenticate(&self.auth, request.metadata()).await?;
        let req = request.into_inner();
        let space_id = id_from_bytes(&req.space_id)?;
        let memory = self
            .service
            .create(&caller, space_id, req.original_content_ref, req.content_type, labels_from_proto(&req.metadata))
            .await?;
        Ok(Response::new(memory_to_proto(&memory)))
    }

    async fn get_memory(&self, request: Request<GetMemoryRequest>) -> Result<Response<MemoryMessage>, Status> {
        let caller = grpc_auth::authenticate(&self.auth, request.metadata()).await?;
        let req = request.into_inner();
        let id = id_from_bytes(&req.memory_id)?;
        let memory = self.service.get(&caller, id).await?;
        Ok(Response::new(memory_to_proto(&memory)))
    }

    async fn list_memories(
        &self,
        request: Request<ListMemoriesRequest>,
    ) -> Result<Response<ListMemoriesResponse>, Status> {
        let caller = grpc_auth::authenticate(&self.auth, request.metadata()).await?;
        let req = request.into_inner();
        let space_id = id_from_bytes(&req.space_id)?;
        let page = Pagination {
            start: req.start,
            max_results: req.max_results,
            ..Pagination::default()
        };
        let memories = self.service.list_by_space(&caller, space_id, &page).await?;
        Ok(Response::new(ListMemoriesResponse {
            memories: memories.iter().map(memory_to_proto).collect(),
        }))
    }

    async fn delete_memory(
        &self,
        request: Request<DeleteMemoryRequest>,
    ) -> Result<Response<DeleteMemoryResponse>, Status> {
        let caller = grpc_auth::authenticate(&self.auth, request.metadata()).await?;
        let req = request.into_inner();
        let id = id_from_bytes(&req.memory_id)?;
        self.service.delete(&caller, id).await?;
        Ok(Response::new(DeleteMemoryResponse {}))
    }
}
