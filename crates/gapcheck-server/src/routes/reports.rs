use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use gapcheck_core::config::Config;
use gapcheck_core::form::FormState;
use gapcheck_core::import::{self, ImportOutcome};
use gapcheck_core::persist::{self, ReportSummary};
use gapcheck_core::report::ReportView;
use gapcheck_core::store::ReportStore;
use gapcheck_core::{paths, AnalysisRecord};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

use super::blocking;
use crate::error::AppError;
use crate::state::AppState;

/// Stamp the share link and write the record back under `slug`.
fn save(
    store: &dyn ReportStore,
    config: &Config,
    slug: &str,
    mut record: AnalysisRecord,
) -> Result<AnalysisRecord, AppError> {
    record.require_company_name()?;
    record.share_url = Some(paths::share_url(&config.share.base_url, slug));
    persist::save_as(store, slug, &record)?;
    Ok(record)
}

/// Load a saved report and compute its view.
pub(crate) async fn load_view(app: &AppState, slug: String) -> Result<ReportView, AppError> {
    let store = app.store.clone();
    let config = app.config.clone();
    blocking(move || {
        let record = persist::load(store.as_ref(), &slug)?;
        Ok(ReportView::build(record, Some(&slug), &config))
    })
    .await
}

/// GET /api/reports: saved reports with company name and industry.
pub async fn list_reports(
    State(app): State<AppState>,
) -> Result<Json<Vec<ReportSummary>>, AppError> {
    let store = app.store.clone();
    let summaries = blocking(move || Ok(persist::list_summaries(store.as_ref())?)).await?;
    Ok(Json(summaries))
}

/// POST /api/reports: save a new report from a partial record.
///
/// The slug is derived from the company name, which is required. An existing
/// report with the same slug is a conflict.
pub async fn create_report(
    State(app): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let store = app.store.clone();
    let config = app.config.clone();
    let result = blocking(move || {
        let mut form = FormState::new();
        form.update(&body)?;
        let name = form.record().require_company_name()?;
        let slug = paths::slug_for(Some(name));
        if persist::exists(store.as_ref(), &slug)? {
            return Err(AppError::conflict(format!("report '{slug}' already exists")));
        }
        let record = save(store.as_ref(), &config, &slug, form.into_record())?;
        Ok(serde_json::json!({
            "slug": slug,
            "share_url": record.share_url,
            "record": record,
        }))
    })
    .await?;
    Ok((StatusCode::CREATED, Json(result)))
}

/// GET /api/reports/{slug}: the saved record.
pub async fn get_report(
    State(app): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<AnalysisRecord>, AppError> {
    let store = app.store.clone();
    let record = blocking(move || Ok(persist::load(store.as_ref(), &slug)?)).await?;
    Ok(Json(record))
}

/// PATCH /api/reports/{slug}: merge a partial record; `null` clears.
pub async fn patch_report(
    State(app): State<AppState>,
    Path(slug): Path<String>,
    Json(patch): Json<Value>,
) -> Result<Json<AnalysisRecord>, AppError> {
    let store = app.store.clone();
    let config = app.config.clone();
    let record = blocking(move || {
        let mut form = FormState::from_record(persist::load(store.as_ref(), &slug)?);
        form.update(&patch)?;
        save(store.as_ref(), &config, &slug, form.into_record())
    })
    .await?;
    Ok(Json(record))
}

/// DELETE /api/reports/{slug}
pub async fn delete_report(
    State(app): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Value>, AppError> {
    let store = app.store.clone();
    let deleted = blocking(move || {
        persist::delete(store.as_ref(), &slug)?;
        Ok(slug)
    })
    .await?;
    Ok(Json(serde_json::json!({ "deleted": deleted })))
}

/// PUT /api/reports/{slug}/fields: set fields by path from raw text.
///
/// Body: `{"market.buyer_rate": "6.2", "client.industry": "hvac"}`. Non-string
/// values are used as their JSON text and `null` clears. Either every field is
/// applied or none is.
pub async fn put_fields(
    State(app): State<AppState>,
    Path(slug): Path<String>,
    Json(fields): Json<BTreeMap<String, Value>>,
) -> Result<Json<Value>, AppError> {
    if fields.is_empty() {
        return Err(AppError::bad_request("no fields given"));
    }
    let store = app.store.clone();
    let config = app.config.clone();
    let result = blocking(move || {
        let mut form = FormState::from_record(persist::load(store.as_ref(), &slug)?);
        let mut updated = Vec::with_capacity(fields.len());
        for (name, value) in &fields {
            let raw = match value {
                Value::Null => String::new(),
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            updated.push(form.set(name, &raw)?.path.to_string());
        }
        let record = save(store.as_ref(), &config, &slug, form.into_record())?;
        Ok(serde_json::json!({
            "updated": updated,
            "issues": record.validate(),
            "record": record,
        }))
    })
    .await?;
    Ok(Json(result))
}

#[derive(Deserialize)]
pub struct ImportBody {
    pub paste: String,
}

/// POST /api/reports/{slug}/import: apply pasted `Label: Value` lines.
pub async fn import_report(
    State(app): State<AppState>,
    Path(slug): Path<String>,
    Json(body): Json<ImportBody>,
) -> Result<Json<Value>, AppError> {
    let store = app.store.clone();
    let config = app.config.clone();
    let result = blocking(move || {
        let mut form = FormState::from_record(persist::load(store.as_ref(), &slug)?);
        let ImportOutcome { applied, skipped } = import::import(&mut form, &body.paste)?;
        let record = save(store.as_ref(), &config, &slug, form.into_record())?;
        Ok(serde_json::json!({
            "applied": applied,
            "skipped": skipped,
            "record": record,
        }))
    })
    .await?;
    Ok(Json(result))
}

/// GET /api/reports/{slug}/view: record, derived metrics and issues.
pub async fn view_report(
    State(app): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ReportView>, AppError> {
    Ok(Json(load_view(&app, slug).await?))
}
