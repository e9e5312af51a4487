//! Canonical JSON digest of an agent spec.
//!
//! Object keys are emitted in sorted order, so the digest is independent of
//! serialization order. Schema field order is
//! semantically meaningful, so it is hashed explicitly alongside the spec.

use serde::Serialize;
use sha2::{Digest, Sha256};

use super::error::Result;
use super::spec::AgentSpec;

#[derive(Serialize)]
struct DigestFields<'a> {
    spec: &'a AgentSpec,
    input_order: Vec<&'a str>,
    output_order: Vec<&'a str>,
}

/// Recursively rebuild objects with their keys in sorted order.
fn sort_keys(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = serde_json::Map::new();
            for key in keys {
                if let Some(v) = map.get(key) {
                    sorted.insert(key.clone(), sort_keys(v));
                }
            }
            serde_json::Value::Object(sorted)
        }
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.iter().map(sort_keys).collect())
        }
        other => other.clone(),
    }
}

/// Compact JSON with sorted object keys.
pub fn canonical_json(value: &serde_json::Value) -> Result<String> {
    Ok(serde_json::to_string(&sort_keys(value))?)
}

/// SHA256 hex digest of a spec's canonical form.
pub fn spec_digest(spec: &AgentSpec) -> Result<String> {
    let fields = DigestFields {
        spec,
        input_order: spec.input_schema.names(),
        output_order: spec.output_schema.names(),
    };
    let canonical = canonical_json(&serde_json::to_value(&fields)?)?;

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}
