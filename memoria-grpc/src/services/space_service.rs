use std::sync::Arc;

use memoria_core::{SortBy, SortOrder, SpaceFilter};
use memoria_security::AuthInterceptor;
use memoria_services::space_service::SpaceUpdate;
use memoria_services::{LabelUpdate, SpaceService as CoreSpaceService};
use tonic::{Request, Response, Status};

use crate::convert::{id_from_bytes, id_to_bytes, labels_from_proto, labels_to_proto, millis};
use crate::grpc_auth;
use crate::pb::memoria::v1::space_service_server::SpaceService;
use crate::pb::memoria::v1::{
    CreateSpaceRequest, DeleteSpaceRequest, DeleteSpaceResponse, GetSpaceRequest, ListSpacesRequest,
    ListSpacesResponse, SortByProto, SortOrderProto, SpaceMessage, UpdateSpaceRequest,
};

pub struct SpaceServiceImpl {
    service: Arc<CoreSpaceService>,
    auth: Arc<AuthInterceptor>,
}

impl SpaceServiceImpl {
    #[must_use]
    pub fn new(service: Arc<CoreSpaceService>, auth: Arc<AuthInterceptor>) -> Self {
        Self { service, auth }
    }
}

fn sort_by_from_proto(value: i32) -> SortBy {
    match SortByProto::try_from(value).unwrap_or(SortByProto::Unspecified) {
        SortByProto::Name => SortBy::Name,
        SortByProto::UpdatedTime => SortBy::UpdatedTime,
        SortByProto::CreatedTime | SortByProto::Unspecified => SortBy::CreatedTime,
    }
}

fn sort_order_from_proto(value: i32) -> SortOrder {
    match SortOrderProto::try_from(value).unwrap_or(SortOrderProto::Unspecified) {
        SortOrderProto::Descending => SortOrder::Descending,
        SortOrderProto::Ascending | SortOrderProto::Unspecified => SortOrder::Ascending,
    }
}

fn space_to_proto(space: &memoria_core::Space) -> SpaceMessage {
    SpaceMessage {
        space_id: id_to_bytes(space.space_id),
        name: space.name.clone(),
        owner_id: id_to_bytes(space.owner_id),
        embedder_id: id_to_bytes(space.embedder_id),
        labels: labels_to_proto(&space.labels),
        public_read: space.public_read,
        created_at_millis: millis(space.created_at),
        updated_at_millis: millis(space.updated_at),
    }
}

#[tonic::async_trait]
impl SpaceService for SpaceServiceImpl {
    async fn create_space(&self, request: Request<CreateSpaceRequest>) -> Result<Response<SpaceMessage>, Status> {
        let caller = grpc_auth::authenticate(&self.auth, request.metadata()).await?;
        let req = request.into_inner();
        let owner_id = req.owner_id.as_deref().map(id_from_bytes).transpose()?;
        let embedder_id = req.embedder_id.as_deref().map(id_from_bytes).transpose()?;
        let space = self
            .service
            .create(&caller, owner_id, req.name, embedder_id, labels_from_proto(&req.labels), req.public_read)
            .await?;
        Ok(Response::new(space_to_proto(&space)))
    }

    async fn get_space(&self, request: Request<GetSpaceRequest>) -> Result<Response<SpaceMessage>, Status> {
        let caller = grpc_auth::authenticate(&self.auth, request.metadata()).await?;
        let req = request.into_inner();
        let id = id_from_bytes(&req.space_id)?;
        let space = self.service.get(&caller, id).await?;
        Ok(Response::new(space_to_proto(&space)))
    }

    async fn update_space(&self, request: Request<UpdateSpaceRequest>) -> Result<Response<SpaceMessage>, Status> {
        let caller = grpc_auth::authenticate(&self.auth, request.metadata()).await?;
        let req = request.into_inner();
        let id = id_from_bytes(&req.space_id)?;
        let labels = match req.labels {
            Some(proto) => LabelUpdate {
                replace: (!proto.replace.is_empty()).then(|| labels_from_proto(&proto.replace)),
                merge: (!proto.merge.is_empty()).then(|| labels_from_proto(&proto.merge)),
            },
            None => LabelUpdate::default(),
        };
        let update = SpaceUpdate {
            name: req.name,
            public_read: req.public_read,
            labels,
        };
        let space = self.service.update(&caller, id, update).await?;
        Ok(Response::new(space_to_proto(&space)))
    }

    async fn delete_space(&self, request: Request<DeleteSpaceRequest>) -> Result<Response<DeleteSpaceResponse>, Status> {
        let caller = grpc_auth::authenticate(&self.auth, request.metadata()).await?;
        let req = request.into_inner();
        let id = id_from_bytes(&req.space_id)?;
        self.service.delete(&caller, id).await?;
        Ok(Response::new(DeleteSpaceResponse {}))
    }

    async fn list_spaces(&self, request: Request<ListSpacesRequest>) -> Result<Response<ListSpacesResponse>, Status> {
        let caller = grpc_auth::authenticate(&self.auth, request.metadata()).await?;
        let req = request.into_inner();
        let filter = SpaceFilter {
            owner_id: req.owner_id.as_deref().map(id_from_bytes).transpose()?,
            label_selectors: labels_from_proto(&req.label_selectors),
            name_filter: req.name_filter,
        };
        let page_token = (!req.page_token.is_empty()).then_some(req.page_token.as_str());
        let page = self
            .service
            .list(
                &caller,
                filter,
                sort_by_from_proto(req.sort_by),
                sort_order_from_proto(req.sort_order),
                req.max_results,
                page_token,
            )
            .await?;
        Ok(Response::new(ListSpacesResponse {
            spaces: page.items.iter().map(space_to_proto).collect(),
            next_page_token: page.next_token.unwrap_or_default(),
        }))
    }
}
