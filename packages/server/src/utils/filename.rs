/// Reasons an application id is rejected.
#[derive(Debug, PartialEq, Eq)]
pub enum AppIdError {
    Empty,
    TooLong,
    InvalidCharacter(char),
}

impl AppIdError {
    pub fn message(&self) -> String {
        match self {
            Self::Empty => "Application id cannot be empty".into(),
            Self::TooLong => "Application id must be at most 256 characters".into(),
            Self::InvalidCharacter(c) => {
                format!("Application id contains invalid character {c:?}")
            }
        }
    }
}

/// Validate a user-supplied application id.
///
/// The id becomes a URL path segment and a primary key, so it is restricted
/// to `[A-Za-z0-9._-]` and may not be `.` or `..`.
pub fn validate_app_id(id: &str) -> Result<&str, AppIdError> {
    let trimmed = id.trim();

    if trimmed.is_empty() {
        return Err(AppIdError::Empty);
    }
    if trimmed.len() > 256 {
        return Err(AppIdError::TooLong);
    }
    if trimmed == "." || trimmed == ".." {
        return Err(AppIdError::InvalidCharacter('.'));
    }
    if let Some(c) = trimmed
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')))
    {
        return Err(AppIdError::InvalidCharacter(c));
    }

    Ok(trimmed)
}

/// Build a safe `Content-Disposition` header value for a download.
pub fn content_disposition_value(filename: &str) -> String {
    let ascii_safe: String = filename
        .chars()
        .filter(|c| c.is_ascii_graphic() && !matches!(c, '"' | ';' | '\\'))
        .collect();
    let ascii_name = if ascii_safe.is_empty() {
        "download".to_string()
    } else {
        ascii_safe
    };

    format!("attachment; filename=\"{ascii_name}\"")
}
