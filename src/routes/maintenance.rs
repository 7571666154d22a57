use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Router;

use crate::response::{ok, AppError};
use crate::services::maintenance;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/users/:user_id/drop-marks", post(drop_marks))
}

async fn drop_marks(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let proxy = state.db_proxy();
    let report = maintenance::drop_marks(&proxy, &user_id).await?;
    Ok(ok(report))
}
