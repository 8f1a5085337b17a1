//! Saved reports: whole-record JSON snapshots under `report-<slug>`.

use crate::error::{GapError, Result};
use crate::paths::{self, report_key, slug_from_key, validate_slug};
use crate::record::AnalysisRecord;
use crate::store::ReportStore;
use serde::Serialize;
use tracing::{debug, info};

/// Summary row for listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub slug: String,
    pub company_name: Option<String>,
    pub industry: Option<String>,
}

/// Save a record under a slug derived from its company name. A record with no
/// usable name gets a random `company-xxxxxxxx` slug. Returns the slug.
pub fn save(store: &dyn ReportStore, record: &AnalysisRecord) -> Result<String> {
    let slug = paths::slug_for(record.company_name());
    save_as(store, &slug, record)?;
    Ok(slug)
}

/// Save a record under an explicit slug, replacing whatever was there.
pub fn save_as(store: &dyn ReportStore, slug: &str, record: &AnalysisRecord) -> Result<()> {
    validate_slug(slug)?;
    let data = serde_json::to_vec_pretty(record)?;
    store.put(&report_key(slug), &data)?;
    info!(slug, bytes = data.len(), "report saved");
    Ok(())
}

pub fn load(store: &dyn ReportStore, slug: &str) -> Result<AnalysisRecord> {
    validate_slug(slug)?;
    let data = store
        .get(&report_key(slug))?
        .ok_or_else(|| GapError::ReportNotFound(slug.to_string()))?;
    let record = serde_json::from_slice(&data)?;
    debug!(slug, "report loaded");
    Ok(record)
}

pub fn exists(store: &dyn ReportStore, slug: &str) -> Result<bool> {
    validate_slug(slug)?;
    Ok(store.get(&report_key(slug))?.is_some())
}

/// Slugs of every saved report, sorted.
pub fn list(store: &dyn ReportStore) -> Result<Vec<String>> {
    let mut slugs: Vec<String> = store
        .keys()?
        .iter()
        .filter_map(|k| slug_from_key(k))
        .map(str::to_string)
        .collect();
    slugs.sort();
    Ok(slugs)
}

/// Like [`list`], with the company name and industry of each report.
/// Reports that fail to parse are listed without details.
pub fn list_summaries(store: &dyn ReportStore) -> Result<Vec<ReportSummary>> {
    let mut out = Vec::new();
    for slug in list(store)? {
        let record = match load(store, &slug) {
            Ok(r) => Some(r),
            Err(e) => {
                debug!(slug, error = %e, "skipping unreadable report");
                None
            }
        };
        out.push(ReportSummary {
            company_name: record
                .as_ref()
                .and_then(|r| r.company_name().map(str::to_string)),
            industry: record
                .as_ref()
                .and_then(|r| r.client.industry.map(|i| i.label().to_string())),
            slug,
        });
    }
    Ok(out)
}

pub fn delete(store: &dyn ReportStore, slug: &str) -> Result<()> {
    validate_slug(slug)?;
    if !store.delete(&report_key(slug))? {
        return Err(GapError::ReportNotFound(slug.to_string()));
    }
    info!(slug, "report deleted");
    Ok(())
}
