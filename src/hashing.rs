//! Hashing System - SHA-256 for Pages and Archives
//!
//! Page hashes are taken over canonical JSON, so two exports of the same
//! page model share a hash regardless of settings key order.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::page::PageModel;

/// Lowercase hex SHA-256 of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// JSON with object keys sorted at every depth and no whitespace.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(&sorted(serde_json::to_value(value)?))
}

fn sorted(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            Value::Object(entries.into_iter().map(|(k, v)| (k, sorted(v))).collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sorted).collect()),
        other => other,
    }
}

/// page_hash = sha256(engine_version + ":" + canonical page JSON)
pub fn compute_page_hash(page: &PageModel, engine_version: &str) -> Result<String, serde_json::Error> {
    let canonical = canonical_json(page)?;
    Ok(sha256_hex(format!("{}:{}", engine_version, canonical).as_bytes()))
}

mod hex {
    use std::fmt::Write;

    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().fold(String::new(), |mut out, b| {
            let _ = write!(out, "{:02x}", b);
            out
        })
    }
}
