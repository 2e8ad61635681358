//! Content fingerprints for change detection.
//!
//! A snapshot is encoded canonically (records in source order, object keys
//! sorted at every depth, no whitespace) and hashed with SHA-256. The same
//! records in the same order always hash the same, whatever order the source
//! emitted their fields in. Reordering records is a change.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::domain::CatalogSnapshot;

/// Hex-encoded SHA-256 of a canonical snapshot encoding
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Length of the hex digest
    pub const LEN: usize = 64;

    /// Accept a stored digest if it is well formed
    pub fn from_hex(value: &str) -> Option<Self> {
        let value = value.trim();
        let valid = value.len() == Self::LEN && value.chars().all(|c| c.is_ascii_hexdigit());
        valid.then(|| Self(value.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex chars, for log lines
    pub fn short(&self) -> &str {
        self.0.get(..12).unwrap_or(&self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fingerprint a snapshot's raw records
pub fn fingerprint(snapshot: &CatalogSnapshot) -> Fingerprint {
    let mut hasher = Sha256::new();
    hasher.update(canonical_bytes(snapshot.raw()));
    Fingerprint(hex::encode(hasher.finalize()))
}

/// Canonical encoding of a record sequence
pub fn canonical_bytes(items: &[Value]) -> Vec<u8> {
    let mut out = Vec::with_capacity(items.len() * 256);
    out.push(b'[');
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(b',');
        }
        write_canonical(item, &mut out);
    }
    out.push(b']');
    out
}

fn write_canonical(value: &Value, out: &mut Vec<u8>) {
    match value {
        Value::Array(values) => {
            out.push(b'[');
            for (i, v) in values.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_canonical(v, out);
            }
            out.push(b']');
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));

            out.push(b'{');
            for (i, (key, v)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_string(key, out);
                out.push(b':');
                write_canonical(v, out);
            }
            out.push(b'}');
        }
        Value::String(s) => write_string(s, out),
        // null, booleans and numbers have a single JSON spelling
        scalar => out.extend_from_slice(scalar.to_string().as_bytes()),
    }
}

fn write_string(s: &str, out: &mut Vec<u8>) {
    out.extend_from_slice(Value::String(s.to_string()).to_string().as_bytes());
}
