//! The opaque pagination token codec (spec §4.9).
//!
//! A token is JSON describing the next page's filter, sort, and
//! offset, plus the id of the caller it was issued to, base64-encoded
//! so it round-trips losslessly through a JSON string field. Binding
//! the token to its requestor closes a class of bug where pasting
//! someone else's `nextPageToken` would otherwise resume their query
//! under your identity.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use memoria_core::{ResourceId, SortBy, SortOrder, Status};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageToken {
    pub requestor_id: ResourceId,
    pub offset: u32,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
    /// Opaque label-selector/filter fingerprint the next page must be
    /// issued against; carried as raw JSON so each resource service can
    /// shape its own filter without this codec knowing about it.
    pub filter_fingerprint: String,
}

/// The on-the-wire shape of a decoded token before `requestor_id` has
/// been validated as a well-formed id. Kept separate from [`PageToken`]
/// so a malformed `requestor_id` can be reported with its own message
/// (spec §4.9's "Invalid requestor ID" case) instead of falling into
/// the generic "token content" branch.
#[derive(Deserialize)]
struct WireToken {
    requestor_id: String,
    offset: u32,
    sort_by: SortBy,
    sort_order: SortOrder,
    filter_fingerprint: String,
}

impl PageToken {
    #[must_use]
    pub fn encode(&self) -> String {
        let json = serde_json::to_vec(self).expect("PageToken always serializes");
        STANDARD.encode(json)
    }

    /// Decode and verify a token was issued to `requestor_id`.
    ///
    /// Returns the four distinct outcomes spec §4.9 calls out: bad
    /// base64 ("token format"), base64 that isn't the token's JSON
    /// shape ("token content"), a `requestorId` that isn't a well-formed
    /// id ("Invalid requestor ID"), and a `requestorId` that doesn't
    /// match the caller ("Invalid pagination token", `PERMISSION_DENIED`).
    pub fn decode(raw: &str, requestor_id: ResourceId) -> Result<Self, Status> {
        let bytes = STANDARD
            .decode(raw)
            .map_err(|_| Status::invalid_argument("token format"))?;
        let wire: WireToken = serde_json::from_slice(&bytes)
            .map_err(|_| Status::invalid_argument("token content"))?;
        let token_requestor = ResourceId::from_hex(&wire.requestor_id)
            .map_err(|_| Status::invalid_argument("Invalid requestor ID"))?;

        let token = Self {
            requestor_id: token_requestor,
            offset: wire.offset,
            sort_by: wire.sort_by,
            sort_order: wire.sort_order,
            filter_fingerprint: wire.filter_fingerprint,
        };

        if token.requestor_id != requestor_id {
            return Err(Status::permission_denied("Invalid pagination token"));
        }
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(requestor_id: ResourceId) -> PageToken {
        PageToken {
            requestor_id,
            offset: 50,
            sort_by: SortBy::CreatedTime,
            sort_order: SortOrder::Descending,
            filter_fingerprint: "owner=abc".to_string(),
        }
    }

    #[test]
    fn roundtrips_through_encode_decode() {
        let requestor = ResourceId::new_random();
        let token = sample(requestor);
        let encoded = token.encode();
        let decoded = PageToken::decode(&encoded, requestor).unwrap();
        assert_eq!(decoded, token);
    }

    #[test]
    fn rejects_a_token_issued_to_someone_else() {
        let token = sample(ResourceId::new_random());
        let encoded = token.encode();
        let err = PageToken::decode(&encoded, ResourceId::new_random()).unwrap_err();
        assert_eq!(err.code, memoria_core::StatusCode::PermissionDenied);
        assert_eq!(err.message, "Invalid pagination token");
    }

    #[test]
    fn rejects_non_base64_input() {
        let err = PageToken::decode("not base64!!", ResourceId::new_random()).unwrap_err();
        assert_eq!(err.code, memoria_core::StatusCode::InvalidArgument);
        assert_eq!(err.message, "token format");
    }

    #[test]
    fn rejects_base64_that_is_not_the_expected_json_shape() {
        let garbage = STANDARD.encode(b"\"just a string\"");
        let err = PageToken::decode(&garbage, ResourceId::new_random()).unwrap_err();
        assert_eq!(err.code, memoria_core::StatusCode::InvalidArgument);
        assert_eq!(err.message, "token content");
    }

    #[test]
    fn rejects_a_requestor_id_that_is_not_a_well_formed_id() {
        let garbage = STANDARD.encode(
            serde_json::json!({
                "requestor_id": "not-an-id",
                "offset": 0,
                "sort_by": "CreatedTime",
                "sort_order": "Descending",
                "filter_fingerprint": "",
            })
            .to_string(),
        );
        let err = PageToken::decode(&garbage, ResourceId::new_random()).unwrap_err();
        assert_eq!(err.code, memoria_core::StatusCode::InvalidArgument);
        assert_eq!(err.message, "Invalid requestor ID");
    }
}
