//! Wire-shape conversions shared by every service impl: `ResourceId` <->
//! 16 raw bytes, `LabelMap` <-> `repeated LabelEntry`, and
//! `DateTime<Utc>` <-> milliseconds since epoch (spec §1, §4.12).

use chrono::{DateTime, TimeZone, Utc};
use memoria_core::{LabelMap, ResourceId, Result, Status};

use crate::pb::memoria::v1::LabelEntry;

pub fn id_from_bytes(bytes: &[u8]) -> Result<ResourceId> {
    ResourceId::from_bytes(bytes).map_err(|_| Status::invalid_argument("malformed resource id"))
}

pub fn id_to_bytes(id: ResourceId) -> Vec<u8> {
    id.as_bytes().to_vec()
}

pub fn labels_to_proto(labels: &LabelMap) -> Vec<LabelEntry> {
    labels
        .iter()
        .map(|(key, value)| LabelEntry {
            key: key.clone(),
            value: value.clone(),
        })
        .collect()
}

pub fn labels_from_proto(entries: &[LabelEntry]) -> LabelMap {
    entries
        .iter()
        .map(|entry| (entry.key.clone(), entry.value.clone()))
        .collect()
}

pub fn millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

pub fn from_millis(value: i64) -> Result<DateTime<Utc>> {
    Utc.timestamp_millis_opt(value)
        .single()
        .ok_or_else(|| Status::invalid_argument("malformed timestamp"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_bytes_roundtrip() {
        let id = ResourceId::new_random();
        assert_eq!(id_from_bytes(&id_to_bytes(id)).unwrap(), id);
    }

    #[test]
    fn label_roundtrip() {
        let mut labels = LabelMap::new();
        labels.insert("a".to_string(), "1".to_string());
        let proto = labels_to_proto(&labels);
        assert_eq!(labels_from_proto(&proto), labels);
    }
}
