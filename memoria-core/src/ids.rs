//! 128-bit resource identifiers.
//!
//! Transmitted as 16 raw bytes on the RPC surface and as canonical
//! 8-4-4-4-12 hex on the REST surface (spec §3). Backed by [`uuid::Uuid`]
//! for random generation, but the public API only ever talks in bytes/hex
//! so callers cannot accidentally depend on UUID version internals.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, Status};

/// A 128-bit identifier for a User, ApiKey, Embedder, Space, or Memory row.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(Uuid);

impl ResourceId {
    /// Generate a new random id (v4-style, per spec §3).
    #[must_use]
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse canonical 8-4-4-4-12 hex (case-insensitive).
    pub fn from_hex(hex: &str) -> Result<Self> {
        Uuid::parse_str(hex)
            .map(Self)
            .map_err(|e| Status::with_cause(crate::error::StatusCode::InvalidArgument, "malformed id", e))
    }

    /// Render as canonical lowercase 8-4-4-4-12 hex.
    #[must_use]
    pub fn to_hex(self) -> String {
        self.0.hyphenated().to_string()
    }

    /// The 16 raw bytes transmitted over the RPC surface.
    #[must_use]
    pub fn as_bytes(&self) -> [u8; 16] {
        *self.0.as_bytes()
    }

    /// Parse 16 raw bytes as received over the RPC surface.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; 16] = bytes.try_into().map_err(|_| {
            Status::invalid_argument(format!("expected 16-byte id, got {} bytes", bytes.len()))
        })?;
        Ok(Self(Uuid::from_bytes(arr)))
    }
}

impl fmt::Debug for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceId({})", self.to_hex())
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_roundtrip() {
        let id = ResourceId::new_random();
        let bytes = id.as_bytes();
        assert_eq!(ResourceId::from_bytes(&bytes).unwrap(), id);
    }

    #[test]
    fn hex_roundtrip() {
        let id = ResourceId::new_random();
        let hex = id.to_hex();
        let parsed = ResourceId::from_hex(&hex).unwrap();
        assert_eq!(parsed.to_hex(), hex.to_lowercase());
    }

    #[test]
    fn rejects_short_bytes() {
        assert!(ResourceId::from_bytes(&[0u8; 15]).is_err());
    }

    #[test]
    fn rejects_malformed_hex() {
        assert!(ResourceId::from_hex("not-a-uuid").is_err());
    }
}
