use std::sync::LazyLock;

use regex::Regex;

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.\d+\.\d+").expect("version regex is valid"));

/// Extract a semantic-version token ("1.2.3") embedded in an application id.
///
/// Ids commonly look like "myapp-1.2.3" but nothing enforces that, so a
/// missing token is a normal outcome and never an error.
pub fn extract_version(app_id: &str) -> Option<String> {
    VERSION_RE.find(app_id).map(|m| m.as_str().to_string())
}
