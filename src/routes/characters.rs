use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::Deserialize;

use crate::error::ReviewError;
use crate::middleware::auth::AuthUser;
use crate::response::{ok, AppError};
use crate::routes::{parse_count, parse_locale};
use crate::services::character_test::{self, TestRequest};
use crate::services::test_results::{self, ResultSubmission};
use crate::services::{catalog, mastery};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct TestQuery {
    script: Option<String>,
    skill: Option<String>,
    locale: Option<String>,
    count: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LocaleQuery {
    locale: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/test", get(get_test))
        .route("/results", post(submit_results))
        .route("/history", get(get_history))
        .route("/characters/:id", get(get_character))
}

fn required<'a>(name: &str, value: Option<&'a str>) -> Result<&'a str, ReviewError> {
    value.ok_or_else(|| ReviewError::validation(format!("{name} is required")))
}

async fn get_test(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<TestQuery>,
) -> Result<impl IntoResponse, AppError> {
    let request = TestRequest {
        script: required("script", query.script.as_deref())?.parse()?,
        skill: required("skill", query.skill.as_deref())?.parse()?,
        locale: parse_locale(query.locale.as_deref())?,
        count: parse_count("count", query.count.as_deref())?,
    };

    let proxy = state.db_proxy();
    let items = character_test::build_test(&proxy, &user.id, request).await?;
    Ok(ok(items))
}

async fn submit_results(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<ResultSubmission>,
) -> Result<impl IntoResponse, AppError> {
    let proxy = state.db_proxy();
    let outcome =
        test_results::submit_results(&proxy, state.ingestion(), &user.id, &payload).await?;
    Ok(ok(outcome))
}

async fn get_history(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, AppError> {
    let proxy = state.db_proxy();
    let history = mastery::user_history(&proxy, &user.id).await?;
    Ok(ok(history))
}

async fn get_character(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<LocaleQuery>,
) -> Result<impl IntoResponse, AppError> {
    let locale = parse_locale(query.locale.as_deref())?;
    let proxy = state.db_proxy();
    let character = catalog::get_character(&proxy, id, locale).await?;
    Ok(ok(character))
}
