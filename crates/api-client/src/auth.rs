use crate::error::ApiError;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};

/// Builds the bearer token the API expects.
///
/// The service identifies callers by name rather than by issued key: the token is the
/// caller's first and last name joined with a dot.
pub fn bearer_token(first_name: &str, last_name: &str) -> String {
    format!("Bearer {}.{}", first_name.trim(), last_name.trim())
}

/// The default headers attached to every request.
pub fn default_headers(first_name: &str, last_name: &str) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    let token = bearer_token(first_name, last_name);
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&token).map_err(|e| ApiError::InvalidHeader(e.to_string()))?,
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(headers)
}
