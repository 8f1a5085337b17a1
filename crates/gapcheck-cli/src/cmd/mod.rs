pub mod budget;
pub mod channel;
pub mod config;
pub mod fields;
pub mod import;
pub mod init;
pub mod report;
pub mod scenario;
pub mod serve;
pub mod set;

use anyhow::Context;
use gapcheck_core::config::Config;
use gapcheck_core::form::FormState;
use gapcheck_core::store::{open_store, ReportStore};
use gapcheck_core::{paths, persist, AnalysisRecord, GapError};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Load config and open the configured report store.
pub fn open(root: &Path) -> anyhow::Result<(Config, Box<dyn ReportStore>)> {
    let config = Config::load(root).context("failed to load config")?;
    let store = open_store(root, &config).context("failed to open report store")?;
    Ok((config, store))
}

/// Load a saved report, pointing at `report create` when it does not exist.
pub fn load_report(store: &dyn ReportStore, slug: &str) -> anyhow::Result<AnalysisRecord> {
    match persist::load(store, slug) {
        Err(GapError::ReportNotFound(_)) => anyhow::bail!(
            "report '{slug}' not found: create it with `gapcheck report create \"<company name>\"` \
             or run `gapcheck report list`"
        ),
        other => other.with_context(|| format!("failed to load report '{slug}'")),
    }
}

/// An open report being edited. Changes are written back by [`Session::finish`]
/// only when the form reported at least one change.
pub struct Session {
    pub config: Config,
    pub store: Box<dyn ReportStore>,
    pub slug: String,
    pub form: FormState,
    dirty: Arc<AtomicBool>,
}

impl Session {
    pub fn open(root: &Path, slug: &str) -> anyhow::Result<Self> {
        let (config, store) = open(root)?;
        let record = load_report(store.as_ref(), slug)?;
        let dirty = Arc::new(AtomicBool::new(false));
        let mut form = FormState::from_record(record);
        let flag = Arc::clone(&dirty);
        form.on_change(move |_| flag.store(true, Ordering::SeqCst));
        Ok(Self {
            config,
            store,
            slug: slug.to_string(),
            form,
            dirty,
        })
    }

    pub fn record(&self) -> &AnalysisRecord {
        self.form.record()
    }

    /// Save if anything changed. Saved reports must keep a company name.
    pub fn finish(self) -> anyhow::Result<AnalysisRecord> {
        if !self.dirty.load(Ordering::SeqCst) {
            return Ok(self.form.into_record());
        }
        self.form
            .record()
            .require_company_name()
            .context("cannot save: set one with `gapcheck set <slug> client.company_name \"<name>\"`")?;
        let mut record = self.form.into_record();
        record.share_url = Some(paths::share_url(&self.config.share.base_url, &self.slug));
        persist::save_as(self.store.as_ref(), &self.slug, &record)
            .with_context(|| format!("failed to save report '{}'", self.slug))?;
        Ok(record)
    }
}
