//! Arbitrary metadata attached to asset declarations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Metadata entries keyed by label, in deterministic order.
pub type MetadataMap = BTreeMap<String, MetadataValue>;

/// A single metadata value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MetadataValue {
    /// Plain text.
    Text(String),
    /// An integer quantity.
    Int(i64),
    /// A floating-point quantity.
    Float(f64),
    /// A boolean flag.
    Bool(bool),
    /// A URL.
    Url(String),
    /// Arbitrary structured data.
    Json(serde_json::Value),
}

impl MetadataValue {
    /// Returns the kind label of this value.
    pub fn kind(&self) -> &'static str {
        match self {
            MetadataValue::Text(_) => "text",
            MetadataValue::Int(_) => "int",
            MetadataValue::Float(_) => "float",
            MetadataValue::Bool(_) => "bool",
            MetadataValue::Url(_) => "url",
            MetadataValue::Json(_) => "json",
        }
    }
}
