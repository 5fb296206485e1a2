use std::sync::Arc;

use memoria_core::{Role, User};
use memoria_security::AuthInterceptor;
use memoria_services::UserService as CoreUserService;
use tonic::{Request, Response, Status};

use crate::convert::{id_from_bytes, id_to_bytes, millis};
use crate::grpc_auth;
use crate::pb::memoria::v1::user_service_server::UserService;
use crate::pb::memoria::v1::{
    CreateUserRequest, GetUserByEmailRequest, GetUserByUsernameRequest, GetUserRequest, RoleProto, UserMessage,
};

pub struct UserServiceImpl {
    service: Arc<CoreUserService>,
    auth: Arc<AuthInterceptor>,
}

impl UserServiceImpl {
    #[must_use]
    pub fn new(service: Arc<CoreUserService>, auth: Arc<AuthInterceptor>) -> Self {
        Self { service, auth }
    }
}

fn role_to_proto(role: Role) -> i32 {
    match role {
        Role::Root => RoleProto::Root as i32,
        Role::User => RoleProto::User as i32,
    }
}

fn user_to_proto(user: &User) -> UserMessage {
    UserMessage {
        user_id: id_to_bytes(user.user_id),
        username: user.username.clone(),
        email: user.email.clone(),
        display_name: user.display_name.clone(),
        roles: user.roles.iter().map(|r| role_to_proto(*r)).collect(),
        created_at_millis: millis(user.created_at),
        updated_at_millis: millis(user.updated_at),
    }
}

#[tonic::async_trait]
impl UserService for UserServiceImpl {
    async fn create_user(&self, request: Request<CreateUserRequest>) -> Result<Response<UserMessage>, Status> {
        let caller = grpc_auth::authenticate(&self.auth, request.metadata()).await?;
        let req = request.into_inner();
        let user = self
            .service
            .create(&caller, req.username, req.email, req.display_name)
            .await?;
        Ok(Response::new(user_to_proto(&user)))
    }

    async fn get_user(&self, request: Request<GetUserRequest>) -> Result<Response<UserMessage>, Status> {
        let caller = grpc_auth::authenticate(&self.auth, request.metadata()).await?;
        let req = request.into_inner();
        let id = id_from_bytes(&req.user_id)?;
        let user = self.service.get_by_id(&caller, id).await?;
        Ok(Response::new(user_to_proto(&user)))
    }

    async fn get_user_by_username(
        &self,
        request: Request<GetUserByUsernameRequest>,
    ) -> Result<Response<UserMessage>, Status> {
        let caller = grpc_auth::authenticate(&self.auth, request.metadata()).await?;
        let req = request.into_inner();
        let user = self.service.get_by_username(&caller, &req.username).await?;
        Ok(Response::new(user_to_proto(&user)))
    }

    async fn get_user_by_email(
        &self,
        request: Request<GetUserByEmailRequest>,
    ) -> Result<Response<UserMessage>, Status> {
        let caller = grpc_auth::authenticate(&self.auth, request.metadata()).await?;
        let req = request.into_inner();
        let user = self.service.get_by_email(&caller, &req.email).await?;
        Ok(Response::new(user_to_proto(&user)))
    }
}
