//! The authentication interceptor (spec §4.4): one piece of logic that
//! both the gRPC and HTTP surfaces call to turn an `Authorization`
//! header into an [`AuthenticatedUser`], so the two transports can
//! never drift in how they authenticate a request.

use std::sync::Arc;

use memoria_core::{ApiKeyRepository, ApiKeyStatus, UserRepository};

use crate::access_control::AuthenticatedUser;
use crate::apikey;
use crate::audit::{AuditEvent, AuditLogger};

/// Methods that may be called without a bearer token (spec §4.4): the
/// one-time system-init bootstrap, plus health/reflection endpoints.
pub fn is_open_method(method_path: &str) -> bool {
    matches!(
        method_path,
        "/memoria.v1.SystemService/InitSystem"
            | "/grpc.health.v1.Health/Check"
            | "/grpc.reflection.v1alpha.ServerReflection/ServerReflectionInfo"
    ) || method_path == "/healthz"
}

/// Shared authentication logic for both transports.
pub struct AuthInterceptor {
    api_keys: Arc<dyn ApiKeyRepository>,
    users: Arc<dyn UserRepository>,
    audit: Arc<AuditLogger>,
    pepper: String,
}

impl AuthInterceptor {
    #[must_use]
    pub fn new(
        api_keys: Arc<dyn ApiKeyRepository>,
        users: Arc<dyn UserRepository>,
        audit: Arc<AuditLogger>,
        pepper: impl Into<String>,
    ) -> Self {
        Self {
            api_keys,
            users,
            audit,
            pepper: pepper.into(),
        }
    }

    /// Authenticate `Bearer <raw key>` credentials, returning the
    /// caller's identity. `bearer_token` is the header value stripped
    /// of any leading "Bearer " prefix by the caller.
    pub async fn authenticate(&self, bearer_token: &str) -> memoria_core::Result<AuthenticatedUser> {
        if !apikey::has_valid_shape(bearer_token) {
            self.audit
                .log(AuditEvent::AuthenticationFailed {
                    reason: "malformed bearer token".to_string(),
                })
                .await
                .ok();
            return Err(memoria_core::Status::unauthenticated("malformed API key"));
        }

        let hashed = apikey::hash(bearer_token, &self.pepper);
        let key = self
            .api_keys
            .load_by_hashed_key(&hashed)
            .await?
            .ok_or_else(|| memoria_core::Status::unauthenticated("unknown API key"))?;

        let now = chrono::Utc::now();
        if key.status != ApiKeyStatus::Active || !key.is_usable(now) {
            self.audit
                .log(AuditEvent::AuthenticationFailed {
                    reason: "API key inactive or expired".to_string(),
                })
                .await
                .ok();
            return Err(memoria_core::Status::unauthenticated(
                "API key is inactive or expired",
            ));
        }

        let user = self
            .users
            .load_by_id(key.user_id)
            .await?
            .ok_or_else(|| memoria_core::Status::unauthenticated("API key owner no longer exists"))?;

        // Best-effort: a storage hiccup here must never fail the request
        // (spec §4.3).
        if let Err(e) = self.api_keys.touch_last_used(key.api_key_id).await {
            tracing::warn!(error = %e, "failed to bump API key lastUsedAt");
        }

        Ok(AuthenticatedUser::new(
            user.user_id,
            user.roles,
            key.api_key_id,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_methods_bypass_auth() {
        assert!(is_open_method("/memoria.v1.SystemService/InitSystem"));
        assert!(is_open_method("/healthz"));
        assert!(!is_open_method("/memoria.v1.SpaceService/CreateSpace"));
    }
}
