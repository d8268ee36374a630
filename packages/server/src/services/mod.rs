pub mod catalog;
pub mod downloads;
pub mod listing;

/// Decode a JSON-array column into a string list. Unexpected shapes decode
/// to an empty list rather than failing the request.
pub(crate) fn string_list(value: &serde_json::Value) -> Vec<String> {
    serde_json::from_value(value.clone()).unwrap_or_default()
}
