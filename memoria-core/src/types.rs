//! Domain aggregates: User, ApiKey, Embedder, Space, Memory (spec §3).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::codec::LabelMap;
use crate::ids::ResourceId;

/// A role a [`User`] holds. Roles are bundles of permissions (spec §3,
/// §4.4), never a separately mutable permission table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Root,
    User,
}

/// One row per human or service principal (spec §3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: ResourceId,
    pub username: String,
    pub email: Option<String>,
    pub display_name: String,
    pub roles: Vec<Role>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// The reserved username system-init looks for (spec §4.5).
    pub const ROOT_USERNAME: &'static str = "root";

    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

/// Authentication credential status (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApiKeyStatus {
    Active,
    Inactive,
}

/// An authentication credential owned by a [`User`] (spec §3, §4.6).
///
/// The full secret never persists; only [`ApiKey::hashed_key_material`]
/// and the non-secret [`ApiKey::key_prefix`] are stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKey {
    pub api_key_id: ResourceId,
    pub user_id: ResourceId,
    pub key_prefix: String,
    pub hashed_key_material: String,
    pub status: ApiKeyStatus,
    pub labels: LabelMap,
    pub expires_at: Option<DateTime<Utc>>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by_id: ResourceId,
    pub updated_by_id: ResourceId,
}

impl ApiKey {
    /// Whether this key currently authenticates a caller (spec §4.3):
    /// active status and an absent or future expiry.
    #[must_use]
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.status == ApiKeyStatus::Active && self.expires_at.map_or(true, |exp| exp > now)
    }
}

/// The remote embedding provider kind an [`Embedder`] talks to (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderType {
    Unspecified,
    Openai,
    Vllm,
    Tei,
}

/// A content modality an [`Embedder`] can accept (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Modality {
    Text,
    Image,
    Audio,
    Video,
}

/// A configured remote embedding endpoint (spec §3, §4.7).
///
/// `(endpoint_url, api_path, model_identifier)` is unique across the
/// system; `provider_type` and `dimensionality` are immutable after
/// create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedder {
    pub embedder_id: ResourceId,
    pub display_name: String,
    pub description: String,
    pub provider_type: ProviderType,
    pub endpoint_url: String,
    pub api_path: String,
    pub model_identifier: String,
    pub dimensionality: u32,
    pub max_sequence_length: Option<u32>,
    pub supported_modalities: Vec<Modality>,
    /// Write-only: never round-tripped back out to a client.
    pub credentials: String,
    pub labels: LabelMap,
    pub version: u64,
    pub monitoring_endpoint: Option<String>,
    pub owner_id: ResourceId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by_id: ResourceId,
    pub updated_by_id: ResourceId,
}

/// A named, owner-scoped container of memories bound to one embedder
/// (spec §3, §4.8).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Space {
    pub space_id: ResourceId,
    pub name: String,
    pub owner_id: ResourceId,
    pub embedder_id: ResourceId,
    pub labels: LabelMap,
    pub public_read: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by_id: ResourceId,
    pub updated_by_id: ResourceId,
}

/// The lifecycle of an ingested [`Memory`]'s embedding (spec §4.11).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessingStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl ProcessingStatus {
    /// Whether `next` is a legal transition from `self` (spec §4.11:
    /// `PENDING -> PROCESSING -> COMPLETED | FAILED`).
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Processing)
                | (Self::Processing, Self::Completed)
                | (Self::Processing, Self::Failed)
        )
    }
}

/// A content item plus its computed embedding (spec §3, §4.11).
///
/// The embedding vector itself lives in the vector-extension column, not
/// in this type — it is written/read separately by `memoria-storage`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    pub memory_id: ResourceId,
    pub space_id: ResourceId,
    pub original_content_ref: String,
    pub content_type: String,
    pub metadata: LabelMap,
    pub processing_status: ProcessingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by_id: ResourceId,
    pub updated_by_id: ResourceId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn processing_status_legal_transitions() {
        assert!(ProcessingStatus::Pending.can_transition_to(ProcessingStatus::Processing));
        assert!(ProcessingStatus::Processing.can_transition_to(ProcessingStatus::Completed));
        assert!(ProcessingStatus::Processing.can_transition_to(ProcessingStatus::Failed));
    }

    #[test]
    fn processing_status_illegal_transitions() {
        assert!(!ProcessingStatus::Pending.can_transition_to(ProcessingStatus::Completed));
        assert!(!ProcessingStatus::Completed.can_transition_to(ProcessingStatus::Processing));
        assert!(!ProcessingStatus::Failed.can_transition_to(ProcessingStatus::Completed));
    }

    #[test]
    fn api_key_usable_respects_expiry() {
        let now = Utc::now();
        let mut key = ApiKey {
            api_key_id: ResourceId::new_random(),
            user_id: ResourceId::new_random(),
            key_prefix: "gm_abcd1234".to_string(),
            hashed_key_material: "hash".to_string(),
            status: ApiKeyStatus::Active,
            labels: LabelMap::new(),
            expires_at: None,
            last_used_at: None,
            created_at: now,
            updated_at: now,
            created_by_id: ResourceId::new_random(),
            updated_by_id: ResourceId::new_random(),
        };
        assert!(key.is_usable(now));

        key.expires_at = Some(now - chrono::Duration::seconds(1));
        assert!(!key.is_usable(now));

        key.status = ApiKeyStatus::Inactive;
        key.expires_at = None;
        assert!(!key.is_usable(now));
    }
}
