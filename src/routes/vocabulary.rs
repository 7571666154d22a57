use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::middleware::auth::AuthUser;
use crate::response::{ok, AppError};
use crate::routes::{parse_count, parse_locale};
use crate::services::catalog;
use crate::services::vocabulary_session::{self, SessionRequest, WordResultInput};
use crate::state::AppState;

const DEFAULT_NEW_COUNT: i64 = 20;
const DEFAULT_OLD_COUNT: i64 = 20;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionQuery {
    new_count: Option<String>,
    old_count: Option<String>,
    locale: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LocaleQuery {
    locale: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResultsRequest {
    results: Vec<WordResultInput>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionResponse<T> {
    total: usize,
    words: T,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/session", get(get_session))
        .route("/results", post(submit_results))
        .route("/words/:id", get(get_word))
}

async fn get_session(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<SessionQuery>,
) -> Result<impl IntoResponse, AppError> {
    let request = SessionRequest {
        new_count: parse_count("newCount", query.new_count.as_deref())?
            .unwrap_or(DEFAULT_NEW_COUNT),
        old_count: parse_count("oldCount", query.old_count.as_deref())?
            .unwrap_or(DEFAULT_OLD_COUNT),
        locale: parse_locale(query.locale.as_deref())?,
    };

    let proxy = state.db_proxy();
    let today = Utc::now().date_naive();
    let words = vocabulary_session::build_session(&proxy, &user.id, request, today).await?;

    Ok(ok(SessionResponse {
        total: words.len(),
        words,
    }))
}

async fn submit_results(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<ResultsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let proxy = state.db_proxy();
    let today = Utc::now().date_naive();
    let scheduled =
        vocabulary_session::submit_word_results(&proxy, &user.id, &payload.results, today).await?;
    Ok(ok(scheduled))
}

async fn get_word(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<LocaleQuery>,
) -> Result<impl IntoResponse, AppError> {
    let locale = parse_locale(query.locale.as_deref())?;
    let proxy = state.db_proxy();
    let card = catalog::get_word(&proxy, id, locale).await?;
    Ok(ok(card))
}
