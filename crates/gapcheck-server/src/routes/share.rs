use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use super::reports::load_view;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ShareQuery {
    /// `text` renders the plain-text report instead of JSON.
    #[serde(default)]
    pub format: Option<String>,
}

/// GET /reports/{slug}: the target of a share link.
pub async fn shared_report(
    State(app): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<ShareQuery>,
) -> Result<Response, AppError> {
    let view = load_view(&app, slug).await?;
    match query.format.as_deref() {
        None | Some("json") => Ok(Json(view).into_response()),
        Some("text") => Ok(view.render_text().into_response()),
        Some(other) => Err(AppError::bad_request(format!(
            "unknown format '{other}': expected json or text"
        ))),
    }
}
