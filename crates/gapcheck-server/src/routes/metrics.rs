use axum::extract::State;
use axum::Json;
use gapcheck_core::form::FormState;
use gapcheck_core::report::ReportView;
use serde_json::Value;

use crate::error::AppError;
use crate::state::AppState;

/// POST /api/metrics: compute the view of an unsaved record.
///
/// The body is a partial record; nothing is stored and no company name is
/// required.
pub async fn compute_metrics(
    State(app): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<ReportView>, AppError> {
    let mut form = FormState::new();
    form.update(&body)?;
    Ok(Json(ReportView::build(form.into_record(), None, &app.config)))
}
