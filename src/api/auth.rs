use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::{ApiError, AppState};
use crate::db::User;

/// The user resolved from the request's API key.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Authentication middleware that checks:
/// 1. `X-Api-Key` header
/// 2. `Authorization: Bearer <api_key>` header
///
/// On success the resolved user is attached as a [`CurrentUser`] extension.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(key) = extract_api_key(&headers) else {
        return Err(ApiError::unauthorized("Missing API key"));
    };

    let user = state
        .store()
        .verify_api_key(&key)
        .await
        .map_err(|e| ApiError::internal(format!("Authentication error: {e}")))?
        .ok_or_else(|| ApiError::unauthorized("Invalid API key"))?;

    tracing::Span::current().record("user_id", user.id.value());
    request.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(request).await)
}

/// Extract API key from headers
fn extract_api_key(headers: &HeaderMap) -> Option<String> {
    if let Some(api_key) = headers.get("X-Api-Key")
        && let Ok(key_str) = api_key.to_str()
    {
        return Some(key_str.trim().to_string());
    }

    if let Some(auth_header) = headers.get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        return Some(token.trim().to_string());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn api_key_from_either_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_api_key(&headers), None);

        headers.insert("Authorization", HeaderValue::from_static("Bearer abc123"));
        assert_eq!(extract_api_key(&headers).as_deref(), Some("abc123"));

        headers.insert("X-Api-Key", HeaderValue::from_static("from-header"));
        assert_eq!(extract_api_key(&headers).as_deref(), Some("from-header"));
    }

    #[test]
    fn non_bearer_authorization_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert_eq!(extract_api_key(&headers), None);
    }
}
