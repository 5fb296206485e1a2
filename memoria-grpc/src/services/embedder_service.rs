use std::sync::Arc;

use memoria_core::{EmbedderFilter, Modality, Pagination, ProviderType};
use memoria_security::AuthInterceptor;
use memoria_services::embedder_service::EmbedderUpdate;
use memoria_services::EmbedderService as CoreEmbedderService;
use tonic::{Request, Response, Status};

use crate::convert::{id_from_bytes, id_to_bytes, labels_from_proto, labels_to_proto, millis};
use crate::grpc_auth;
use crate::pb::memoria::v1::embedder_service_server::EmbedderService;
use crate::pb::memoria::v1::{
    CreateEmbedderRequest, DeleteEmbedderRequest, DeleteEmbedderResponse, EmbedderMessage, GetEmbedderRequest,
    ListEmbeddersRequest, ListEmbeddersResponse, ModalityProto, ProviderTypeProto, UpdateEmbedderRequest,
};

pub struct EmbedderServiceImpl {
    service: Arc<CoreEmbedderService>,
    auth: Arc<AuthInterceptor>,
}

impl EmbedderServiceImpl {
    #[must_use]
    pub fn new(service: Arc<CoreEmbedderService>, auth: Arc<AuthInterceptor>) -> Self {
        Self { service, auth }
    }
}

fn provider_to_proto(provider: ProviderType) -> i32 {
    match provider {
        ProviderType::Unspecified => ProviderTypeProto::Unspecified as i32,
        ProviderType::Openai => ProviderTypeProto::Openai as i32,
        ProviderType::Vllm => ProviderTypeProto::Vllm as i32,
        ProviderType::Tei => ProviderTypeProto::Tei as i32,
    }
}

fn provider_from_proto(value: i32) -> ProviderType {
    match ProviderTypeProto::try_from(value).unwrap_or(ProviderTypeProto::Unspecified) {
        ProviderTypeProto::Unspecified => ProviderType::Unspecified,
        ProviderTypeProto::Openai => ProviderType::Openai,
        ProviderTypeProto::Vllm => ProviderType::Vllm,
        ProviderTypeProto::Tei => ProviderType::Tei,
    }
}

fn modality_to_proto(modality: Modality) -> i32 {
    match modality {
        Modality::Text => ModalityProto::Text as i32,
        Modality::Image => ModalityProto::Image as i32,
        Modality::Audio => ModalityProto::Audio as i32,
        Modality::Video => ModalityProto::Video as i32,
    }
}

fn modality_from_proto(value: i32) -> Modality {
    match ModalityProto::try_from(value).unwrap_or(ModalityProto::Unspecified) {
        ModalityProto::Text | ModalityProto::Unspecified => Modality::Text,
        ModalityProto::Image => Modality::Image,
        ModalityProto::Audio => Modality::Audio,
        ModalityProto::Video => Modality::Video,
    }
}

fn embedder_to_proto(embedder: &memoria_core::Embedder) -> EmbedderMessage {
    EmbedderMessage {
        embedder_id: id_to_bytes(embedder.embedder_id),
        display_name: embedder.display_name.clone(),
        description: embedder.description.clone(),
        provider_type: provider_to_proto(embedder.provider_type),
        endpoint_url: embedder.endpoint_url.clone(),
        api_path: embedder.api_path.clone(),
        model_identifier: embedder.model_identifier.clone(),
        dimensionality: embedder.dimensionality,
        max_sequence_length: embedder.max_sequence_length,
        supported_modalities: embedder.supported_modalities.iter().map(|m| modality_to_proto(*m)).collect(),
        labels: labels_to_proto(&embedder.labels),
        version: embedder.version,
        monitoring_endpoint: embedder.monitoring_endpoint.clone(),
        owner_id: id_to_bytes(embedder.owner_id),
        created_at_millis: millis(embedder.created_at),
        updated_at_millis: millis(embedder.updated_at),
    }
}

#[tonic::async_trait]
impl EmbedderService for EmbedderServiceImpl {
    async fn create_embedder(
        &self,
        request: Request<CreateEmbedderRequest>,
    ) -> Result<Response<EmbedderMessage>, Status> {
        let caller = grpc_auth::authenticate(&self.auth, request.metadata()).await?;
        let req = request.into_inner();
        let owner_id = req.owner_id.as_deref().map(id_from_bytes).transpose()?;
        let embedder = self
            .service
            .create(
                &caller,
                owner_id,
                req.display_name,
                req.description,
                provider_from_proto(req.provider_type),
                req.endpoint_url,
                req.api_path,
                req.model_identifier,
                req.dimensionality,
                req.max_sequence_length,
                req.supported_modalities.iter().map(|m| modality_from_proto(*m)).collect(),
                req.credentials,
                labels_from_proto(&req.labels),
                req.monitoring_endpoint,
            )
            .await?;
        Ok(Response::new(embedder_to_proto(&embedder)))
    }

    async fn get_embedder(&self, request: Request<GetEmbedderRequest>) -> Result<Response<EmbedderMessage>, Status> {
        let caller = grpc_auth::authenticate(&self.auth, request.metadata()).await?;
        let req = request.into_inner();
        let id = id_from_bytes(&req.embedder_id)?;
        let embedder = self.service.get(&caller, id).await?;
        Ok(Response::new(embedder_to_proto(&embedder)))
    }

    async fn update_embedder(
        &self,
        request: Request<UpdateEmbedderRequest>,
    ) -> Result<Response<EmbedderMessage>, Status> {
        let caller = grpc_auth::authenticate(&self.auth, request.metadata()).await?;
        let req = request.into_inner();
        let id = id_from_bytes(&req.embedder_id)?;
        let labels = match req.labels {
            Some(proto) => memoria_services::LabelUpdate {
                replace: (!proto.replace.is_empty()).then(|| labels_from_proto(&proto.replace)),
                merge: (!proto.merge.is_empty()).then(|| labels_from_proto(&proto.merge)),
            },
            None => memoria_services::LabelUpdate::default(),
        };
        let update = EmbedderUpdate {
            display_name: req.display_name,
            description: req.description,
            credentials: req.credentials,
            monitoring_endpoint: req.monitoring_endpoint,
            labels,
        };
        let embedder = self.service.update(&caller, id, update).await?;
        Ok(Response::new(embedder_to_proto(&embedder)))
    }

    async fn delete_embedder(
        &self,
        request: Request<DeleteEmbedderRequest>,
    ) -> Result<Response<DeleteEmbedderResponse>, Status> {
        let caller = grpc_auth::authenticate(&self.auth, request.metadata()).await?;
        let req = request.into_inner();
        let id = id_from_bytes(&req.embedder_id)?;
        self.service.delete(&caller, id).await?;
        Ok(Response::new(DeleteEmbedderResponse {}))
    }

    async fn list_embedders(
        &self,
        request: Request<ListEmbeddersRequest>,
    ) -> Result<Response<ListEmbeddersResponse>, Status> {
        let caller = grpc_auth::authenticate(&self.auth, request.metadata()).await?;
        let req = request.into_inner();
        let filter = EmbedderFilter {
            owner_id: req.owner_id.as_deref().map(id_from_bytes).transpose()?,
            provider_type: req.provider_type.map(provider_from_proto),
            label_selectors: labels_from_proto(&req.label_selectors),
        };
        let page = Pagination {
            start: req.start,
            max_results: req.max_results,
            ..Pagination::default()
        };
        let embedders = self.service.list(&caller, filter, &page).await?;
        Ok(Response::new(ListEmbeddersResponse {
            embedders: embedders.iter().map(embedder_to_proto).collect(),
        }))
    }
}
