mod characters;
mod health;
mod maintenance;
mod vocabulary;

use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::Router;

use crate::error::ReviewError;
use crate::middleware::auth::{require_auth, require_maintenance_token};
use crate::response::AppError;
use crate::state::AppState;
use crate::types::Locale;

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .nest(
            "/vocabulary",
            vocabulary::router().route_layer(middleware::from_fn(require_auth)),
        )
        .nest(
            "/kana",
            characters::router().route_layer(middleware::from_fn(require_auth)),
        )
        .nest(
            "/maintenance",
            maintenance::router().route_layer(middleware::from_fn_with_state(
                state.clone(),
                require_maintenance_token,
            )),
        );

    Router::new()
        .nest("/health", health::router())
        .nest("/api", api)
        .fallback(fallback_handler)
        .with_state(state)
}

async fn fallback_handler() -> Response {
    AppError::not_found("route not found").into_response()
}

/// Query strings arrive untyped so malformed numbers surface as validation
/// errors rather than extractor rejections.
pub(crate) fn parse_count(name: &str, value: Option<&str>) -> Result<Option<i64>, ReviewError> {
    value
        .map(|raw| {
            raw.trim()
                .parse::<i64>()
                .map_err(|_| ReviewError::validation(format!("{name} must be an integer, got '{raw}'")))
        })
        .transpose()
}

pub(crate) fn parse_locale(value: Option<&str>) -> Result<Locale, ReviewError> {
    value.map(str::parse).transpose().map(|l| l.unwrap_or(Locale::En))
}
