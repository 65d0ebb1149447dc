//! Short, single-line renderings of BSON values for status output.

use mongodb::bson::Bson;

/// Render a BSON value as a compact preview, truncated to `max_len` characters.
///
/// Identifiers and dates use their natural text forms (`ObjectId` hex,
/// RFC 3339) so they can be pasted back into a shell query.
pub fn bson_value_preview(value: &Bson, max_len: usize) -> String {
    match value {
        Bson::String(s) => truncate_for_preview(s, max_len),
        Bson::Int32(n) => n.to_string(),
        Bson::Int64(n) => n.to_string(),
        Bson::Double(n) => n.to_string(),
        Bson::Boolean(b) => b.to_string(),
        Bson::Null => "null".to_string(),
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::DateTime(dt) => (*dt).try_to_rfc3339_string().unwrap_or_else(|_| format!("{dt:?}")),
        Bson::Document(doc) => format!("{{{} fields}}", doc.len()),
        Bson::Array(arr) => format!("[{} items]", arr.len()),
        other => truncate_for_preview(&format!("{other}"), max_len),
    }
}

/// Truncate a string for preview display, adding ellipsis if needed.
pub fn truncate_for_preview(input: &str, max_len: usize) -> String {
    if input.chars().count() <= max_len {
        return input.to_string();
    }

    let mut output: String = input.chars().take(max_len.saturating_sub(3)).collect();
    output.push_str("...");
    output
}
