//! Vector record types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One conformance test vector.
///
/// Only `network` is interpreted here; the rest of the record is kept as-is
/// for whatever executes the vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestVector {
    /// Protocol ruleset the vector is written against
    pub network: String,
    /// Remaining fields
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl TestVector {
    /// Get a field other than `network`
    pub fn field(&self, name: &str) -> Option<&serde_json::Value> {
        self.fields.get(name)
    }
}

/// Contents of one vector file: identifier to vector
pub type VectorFile = BTreeMap<String, TestVector>;
