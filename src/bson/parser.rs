//! Conversions between JSON text and BSON documents.

use mongodb::bson::{self, Bson, Document};
use serde_json::Value;

/// Parse a JSON string into a BSON document.
///
/// Extended JSON wrappers such as `{"$oid": ...}` and `{"$date": ...}` are
/// decoded into their BSON types.
pub fn parse_document_from_json(input: &str) -> Result<Document, String> {
    let value: Value = serde_json::from_str(input).map_err(|e| e.to_string())?;
    let bson = Bson::try_from(value).map_err(|e| e.to_string())?;
    match bson {
        Bson::Document(doc) => Ok(doc),
        _ => Err("Root JSON must be a document".to_string()),
    }
}

/// Convert a BSON document to a pretty-printed relaxed Extended JSON string.
pub fn document_to_relaxed_extjson_string(doc: &Document) -> String {
    let value = bson::Bson::Document(doc.clone()).into_relaxed_extjson();
    serde_json::to_string_pretty(&value).unwrap_or_else(|_| format!("{doc:?}"))
}

/// Convert a BSON document to a single-line relaxed Extended JSON string.
pub fn document_to_compact_extjson_string(doc: &Document) -> String {
    let value = bson::Bson::Document(doc.clone()).into_relaxed_extjson();
    serde_json::to_string(&value).unwrap_or_else(|_| format!("{doc:?}"))
}
