use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::response::AppError;
use crate::state::AppState;

/// Set by the upstream gateway once it has authenticated the caller.
pub const USER_ID_HEADER: &str = "x-user-id";
pub const MAINTENANCE_TOKEN_HEADER: &str = "x-maintenance-token";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
}

pub fn extract_user_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

pub async fn require_auth(mut req: Request<Body>, next: Next) -> Response {
    let Some(id) = extract_user_id(req.headers()) else {
        return AppError::unauthorized("missing authenticated user").into_response();
    };

    req.extensions_mut().insert(AuthUser { id });
    next.run(req).await
}

/// Guards maintenance routes. With no token configured they stay closed.
pub async fn require_maintenance_token(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let Some(expected) = state.maintenance_token() else {
        return AppError::forbidden("maintenance endpoints are disabled").into_response();
    };

    let provided = req
        .headers()
        .get(MAINTENANCE_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok());

    if provided != Some(expected) {
        tracing::warn!("rejected maintenance call with invalid token");
        return AppError::unauthorized("invalid maintenance token").into_response();
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_extract_user_id() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_user_id(&headers), None);

        headers.insert(USER_ID_HEADER, HeaderValue::from_static("   "));
        assert_eq!(extract_user_id(&headers), None);

        headers.insert(USER_ID_HEADER, HeaderValue::from_static(" user-42 "));
        assert_eq!(extract_user_id(&headers).as_deref(), Some("user-42"));
    }
}
