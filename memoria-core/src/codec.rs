//! Timestamp, label-map, and vector-literal conversions shared by the
//! data access layer and both transport adapters (spec §3, §4.2).

use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::error::{Result, Status};

/// `string -> string` tag map attached to spaces, embedders, and API keys.
///
/// A `BTreeMap` rather than a `HashMap`: the spec does not require
/// insertion order, and a sorted map gives deterministic JSON output for
/// free, which the `parse(serialize(m)) = m` round-trip law (spec §8)
/// wants without extra bookkeeping.
pub type LabelMap = BTreeMap<String, String>;

/// Convert milliseconds-since-epoch (the wire representation, spec §3) to
/// a UTC instant.
pub fn from_millis(millis: i64) -> Result<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| Status::invalid_argument(format!("invalid timestamp: {millis}")))
}

/// Convert a UTC instant to milliseconds-since-epoch for the wire.
#[must_use]
pub fn to_millis(instant: DateTime<Utc>) -> i64 {
    instant.timestamp_millis()
}

/// Serialize a label map to the JSON text stored in a `JSONB` column.
#[must_use]
pub fn labels_to_json(labels: &LabelMap) -> Value {
    Value::Object(
        labels
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect(),
    )
}

/// Parse a `JSONB` column back into a label map.
///
/// An absent or JSON-null column is treated as an empty map so callers
/// never have to special-case newly-created rows.
pub fn labels_from_json(value: &Value) -> Result<LabelMap> {
    match value {
        Value::Null => Ok(LabelMap::new()),
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| match v {
                Value::String(s) => Ok((k.clone(), s.clone())),
                other => Err(Status::invalid_argument(format!(
                    "label {k} has non-string value {other}"
                ))),
            })
            .collect(),
        other => Err(Status::invalid_argument(format!(
            "expected a JSON object for labels, got {other}"
        ))),
    }
}

/// Format an embedding vector as the `[f1,f2,...]` literal pgvector reads.
#[must_use]
pub fn format_vector_literal(values: &[f32]) -> String {
    let mut out = String::with_capacity(values.len() * 8 + 2);
    out.push('[');
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&v.to_string());
    }
    out.push(']');
    out
}

/// Parse a pgvector `[f1,f2,...]` literal back into floats.
pub fn parse_vector_literal(literal: &str) -> Result<Vec<f32>> {
    let trimmed = literal.trim();
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(|| Status::invalid_argument("vector literal missing brackets"))?;
    if inner.is_empty() {
        return Ok(Vec::new());
    }
    inner
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<f32>()
                .map_err(|e| Status::with_cause(crate::error::StatusCode::Internal, "malformed vector literal", e))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millis_roundtrip() {
        let now = Utc::now();
        let millis = to_millis(now);
        let back = from_millis(millis).unwrap();
        assert_eq!(to_millis(back), millis);
    }

    #[test]
    fn labels_roundtrip_empty() {
        let labels = LabelMap::new();
        let json = labels_to_json(&labels);
        assert_eq!(labels_from_json(&json).unwrap(), labels);
    }

    #[test]
    fn labels_roundtrip_populated() {
        let mut labels = LabelMap::new();
        labels.insert("a".to_string(), "1".to_string());
        labels.insert("b".to_string(), "2".to_string());
        let json = labels_to_json(&labels);
        assert_eq!(labels_from_json(&json).unwrap(), labels);
    }

    #[test]
    fn vector_literal_roundtrip() {
        let values = vec![0.1_f32, -2.5, 3.0];
        let literal = format_vector_literal(&values);
        let parsed = parse_vector_literal(&literal).unwrap();
        for (a, b) in values.iter().zip(parsed.iter()) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn vector_literal_empty() {
        assert_eq!(parse_vector_literal("[]").unwrap(), Vec::<f32>::new());
    }

    #[test]
    fn vector_literal_rejects_missing_brackets() {
        assert!(parse_vector_literal("1,2,3").is_err());
    }
}
