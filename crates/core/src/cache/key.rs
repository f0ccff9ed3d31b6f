//! Request fingerprints used as cache keys.

use std::collections::BTreeMap;
use std::fmt;

use sha2::{Digest, Sha256};

/// Canonical fingerprint of a request: a type tag plus its parameters.
///
/// Parameters are ordered by name before hashing, so insertion order never
/// matters. The tag is hashed as its own field and cannot collide with a
/// parameter that happens to be called `type`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Build a key from an endpoint tag and name/value pairs.
    ///
    /// A name given twice keeps its last value.
    pub fn new<I, K, V>(tag: &str, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let params: BTreeMap<String, String> = params.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self(compute_fingerprint(tag, &params))
    }

    /// Hex-encoded SHA-256 fingerprint.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hash the canonical JSON form of `{"type": tag, "params": {...}}`.
pub fn compute_fingerprint(tag: &str, params: &BTreeMap<String, String>) -> String {
    let canonical = serde_json::json!({ "type": tag, "params": params });
    let mut hasher = Sha256::new();
    hasher.update(canonical.to_string().as_bytes());
    hex::encode(hasher.finalize())
}
