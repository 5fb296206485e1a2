use std::sync::Arc;

use memoria_core::ApiKeyStatus;
use memoria_security::AuthInterceptor;
use memoria_services::{ApiKeyService as CoreApiKeyService, LabelUpdate};
use tonic::{Request, Response, Status};

use crate::convert::{from_millis, id_from_bytes, id_to_bytes, labels_from_proto, labels_to_proto, millis};
use crate::grpc_auth;
use crate::pb::memoria::v1::api_key_service_server::ApiKeyService;
use crate::pb::memoria::v1::{
    ApiKeyMessage, ApiKeyStatusProto, CreateApiKeyRequest, CreateApiKeyResponse, DeleteApiKeyRequest,
    DeleteApiKeyResponse, GetApiKeyRequest, LabelUpdateProto, ListApiKeysRequest, ListApiKeysResponse,
    UpdateApiKeyRequest,
};

pub struct ApiKeyServiceImpl {
    service: Arc<CoreApiKeyService>,
    auth: Arc<AuthInterceptor>,
}

impl ApiKeyServiceImpl {
    #[must_use]
    pub fn new(service: Arc<CoreApiKeyService>, auth: Arc<AuthInterceptor>) -> Self {
        Self { service, auth }
    }
}

fn status_to_proto(status: ApiKeyStatus) -> i32 {
    match status {
        ApiKeyStatus::Active => ApiKeyStatusProto::Active as i32,
        ApiKeyStatus::Inactive => ApiKeyStatusProto::Inactive as i32,
    }
}

fn status_from_proto(value: i32) -> Result<ApiKeyStatus, Status> {
    match ApiKeyStatusProto::try_from(value).unwrap_or(ApiKeyStatusProto::Unspecified) {
        ApiKeyStatusProto::Active => Ok(ApiKeyStatus::Active),
        ApiKeyStatusProto::Inactive => Ok(ApiKeyStatus::Inactive),
        ApiKeyStatusProto::Unspecified => Err(Status::invalid_argument("status must not be UNSPECIFIED")),
    }
}

fn label_update_from_proto(proto: Option<LabelUpdateProto>) -> Result<LabelUpdate, Status> {
    let Some(proto) = proto else {
        return Ok(LabelUpdate::default());
    };
    let replace = (!proto.replace.is_empty()).then(|| labels_from_proto(&proto.replace));
    let merge = (!proto.merge.is_empty()).then(|| labels_from_proto(&proto.merge));
    Ok(LabelUpdate { replace, merge })
}

fn key_to_proto(key: &memoria_core::ApiKey) -> ApiKeyMessage {
    ApiKeyMessage {
        api_key_id: id_to_bytes(key.api_key_id),
        user_id: id_to_bytes(key.user_id),
        key_prefix: key.key_prefix.clone(),
        status: status_to_proto(key.status),
        labels: labels_to_proto(&key.labels),
        expires_at_millis: key.expires_at.map(millis),
        last_used_at_millis: key.last_used_at.map(millis),
        created_at_millis: millis(key.created_at),
        updated_at_millis: millis(key.updated_at),
    }
}

#[tonic::async_trait]
impl ApiKeyService for ApiKeyServiceImpl {
    async fn create_api_key(
        &self,
        request: Request<CreateApiKeyRequest>,
    ) -> Result<Response<CreateApiKeyResponse>, Status> {
        let caller = grpc_auth::authenticate(&self.auth, request.metadata()).await?;
        let req = request.into_inner();
        let owner_id = req.owner_id.as_deref().map(id_from_bytes).transpose()?;
        let expires_at = req.expires_at_millis.map(from_millis).transpose()?;
        let (key, raw_secret) = self
            .service
            .create(&caller, owner_id, labels_from_proto(&req.labels), expires_at)
            .await?;
        Ok(Response::new(CreateApiKeyResponse {
            api_key: Some(key_to_proto(&key)),
            raw_secret,
        }))
    }

    async fn get_api_key(&self, request: Request<GetApiKeyRequest>) -> Result<Response<ApiKeyMessage>, Status> {
        let caller = grpc_auth::authenticate(&self.auth, request.metadata()).await?;
        let req = request.into_inner();
        let id = id_from_bytes(&req.api_key_id)?;
        let key = self.service.get(&caller, id).await?;
        Ok(Response::new(key_to_proto(&key)))
    }

    async fn list_api_keys(
        &self,
        request: Request<ListApiKeysRequest>,
    ) -> Result<Response<ListApiKeysResponse>, Status> {
        let caller = grpc_auth::authenticate(&self.auth, request.metadata()).await?;
        let req = request.into_inner();
        let owner_id = id_from_bytes(&req.owner_id)?;
        let keys = self.service.list(&caller, owner_id).await?;
        Ok(Response::new(ListApiKeysResponse {
            api_keys: keys.iter().map(key_to_proto).collect(),
        }))
    }

    async fn update_api_key(&self, request: Request<UpdateApiKeyRequest>) -> Result<Response<ApiKeyMessage>, Status> {
        let caller = grpc_auth::authenticate(&self.auth, request.metadata()).await?;
        let req = request.into_inner();
        let id = id_from_bytes(&req.api_key_id)?;
        let status = req.status.map(status_from_proto).transpose()?;
        let label_update = label_update_from_proto(req.labels)?;
        let key = self.service.update(&caller, id, status, label_update).await?;
        Ok(Response::new(key_to_proto(&key)))
    }

    async fn delete_api_key(
        &self,
        request: Request<DeleteApiKeyRequest>,
    ) -> Result<Response<DeleteApiKeyResponse>, Status> {
        let caller = grpc_auth::authenticate(&self.auth, request.metadata()).await?;
        let req = request.into_inner();
        let id = id_from_bytes(&req.api_key_id)?;
        self.service.delete(&caller, id).await?;
        Ok(Response::new(DeleteApiKeyResponse {}))
    }
}
