//! Wire-shape helpers shared by every handler module (spec §3, §4.12):
//! canonical hex ids, millisecond timestamps, and the `x-api-key`
//! extraction the gRPC surface's `grpc_auth` module mirrors.

use axum::http::HeaderMap;
use memoria_core::{ResourceId, Status};
use memoria_security::access_control::AuthenticatedUser;
use memoria_security::AuthInterceptor;

use crate::error::ApiError;

/// Parses a canonical 8-4-4-4-12 hex id from a path/query parameter,
/// rejecting malformed ids with `400` (spec §4.12.2) rather than the
/// raw-bytes parsing the RPC surface uses.
pub fn parse_id(raw: &str) -> Result<ResourceId, ApiError> {
    ResourceId::from_hex(raw).map_err(ApiError::from)
}

pub fn parse_opt_id(raw: Option<&String>) -> Result<Option<ResourceId>, ApiError> {
    raw.map(|s| parse_id(s)).transpose()
}

/// Reads `x-api-key` case-insensitively (spec §6 — `HeaderMap` lookups
/// are already case-insensitive) and runs it through the one shared
/// [`AuthInterceptor`] both transports use.
pub async fn authenticate(auth: &AuthInterceptor, headers: &HeaderMap) -> Result<AuthenticatedUser, ApiError> {
    let key = headers
        .get("x-api-key")
        .ok_or_else(|| Status::unauthenticated("missing x-api-key header"))?
        .to_str()
        .map_err(|_| Status::unauthenticated("malformed x-api-key header"))?;
    auth.authenticate(key).await.map_err(ApiError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_rejects_malformed_hex() {
        assert!(parse_id("not-a-uuid").is_err());
    }

    #[test]
    fn parse_id_roundtrips_canonical_hex() {
        let id = ResourceId::new_random();
        assert_eq!(parse_id(&id.to_hex()).unwrap(), id);
    }

    #[test]
    fn parse_opt_id_passes_through_none() {
        assert_eq!(parse_opt_id(None).unwrap(), None);
    }
}
