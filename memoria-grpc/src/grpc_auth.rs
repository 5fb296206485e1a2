//! Pulls the `x-api-key` metadata value out of a request and runs it
//! through the shared [`AuthInterceptor`] (spec §4.4, §6).
//!
//! `tonic::service::Interceptor` is a synchronous trait and
//! `AuthInterceptor::authenticate` needs to hit storage, so each RPC
//! handler calls this helper directly at its top rather than going
//! through tonic's interceptor hook — the same function every service
//! impl in this crate uses, so the two transports still authenticate
//! through one code path (spec §4.10).

use memoria_security::access_control::AuthenticatedUser;
use memoria_security::AuthInterceptor;
use tonic::metadata::MetadataMap;
use tonic::Status as TonicStatus;

pub async fn authenticate(auth: &AuthInterceptor, metadata: &MetadataMap) -> Result<AuthenticatedUser, TonicStatus> {
    let key = metadata
        .get("x-api-key")
        .ok_or_else(|| TonicStatus::unauthenticated("missing x-api-key metadata"))?
        .to_str()
        .map_err(|_| TonicStatus::unauthenticated("malformed x-api-key metadata"))?;

    auth.authenticate(key).await.map_err(TonicStatus::from)
}
