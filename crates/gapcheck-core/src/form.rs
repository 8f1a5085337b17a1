//! In-memory form state for a single analysis.
//!
//! All mutation goes through [`FormState`] so every successful change is
//! validated as a whole record and reported to the change hook.

use crate::error::{GapError, Result};
use crate::fields::{self, FieldSpec};
use crate::record::{AnalysisRecord, MarketingChannel};
use serde_json::{Map, Value};
use tracing::debug;

type ChangeHook = Box<dyn FnMut(&AnalysisRecord) + Send>;

#[derive(Default)]
pub struct FormState {
    record: AnalysisRecord,
    on_change: Option<ChangeHook>,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_record(record: AnalysisRecord) -> Self {
        Self {
            record,
            on_change: None,
        }
    }

    pub fn record(&self) -> &AnalysisRecord {
        &self.record
    }

    pub fn into_record(self) -> AnalysisRecord {
        self.record
    }

    /// Register a hook called with the new record after every successful change.
    pub fn on_change(&mut self, hook: impl FnMut(&AnalysisRecord) + Send + 'static) {
        self.on_change = Some(Box::new(hook));
    }

    /// Merge a partial record into the current one.
    ///
    /// Objects merge key by key, scalars and arrays replace, `null` clears.
    /// Numeric fields accept the same text `set` does ("185K", "6.2%") and
    /// are range-checked the same way. If the merged document no longer
    /// describes a valid record the update is rejected and the state is left
    /// untouched.
    pub fn update(&mut self, partial: &Value) -> Result<()> {
        if !partial.is_object() {
            return Err(GapError::InvalidUpdate(
                "expected a JSON object".to_string(),
            ));
        }
        let partial = normalize_numbers(partial)?;
        let mut doc = serde_json::to_value(&self.record)?;
        merge_patch(&mut doc, &partial);
        let record: AnalysisRecord =
            serde_json::from_value(doc).map_err(|e| GapError::InvalidUpdate(e.to_string()))?;
        self.commit(record);
        Ok(())
    }

    /// Parse `raw` according to the field's kind and store it. Blank input
    /// clears the field.
    pub fn set(&mut self, name: &str, raw: &str) -> Result<&'static FieldSpec> {
        let field = fields::lookup(name)?;
        let value = field.parse(raw)?;
        self.set_value(field, value)?;
        Ok(field)
    }

    /// Store an already-parsed JSON value at `field`.
    pub fn set_value(&mut self, field: &FieldSpec, value: Value) -> Result<()> {
        let mut doc = serde_json::to_value(&self.record)?;
        let (parent, key) = field
            .pointer
            .rsplit_once('/')
            .ok_or_else(|| GapError::UnknownField(field.path.clone()))?;
        let slot = doc
            .pointer_mut(parent)
            .and_then(Value::as_object_mut)
            .ok_or_else(|| GapError::UnknownField(field.path.clone()))?;
        if value.is_null() {
            slot.remove(key);
        } else {
            slot.insert(key.to_string(), value);
        }
        let record: AnalysisRecord =
            serde_json::from_value(doc).map_err(|e| GapError::InvalidValue {
                field: field.path.clone(),
                value: String::new(),
                reason: e.to_string(),
            })?;
        debug!(field = %field.path, "field set");
        self.commit(record);
        Ok(())
    }

    /// Current value of a field, `Value::Null` when unanswered.
    pub fn get(&self, name: &str) -> Result<Value> {
        let field = fields::lookup(name)?;
        let doc = serde_json::to_value(&self.record)?;
        Ok(doc.pointer(&field.pointer).cloned().unwrap_or(Value::Null))
    }

    /// Replace the whole record, e.g. after loading a saved report.
    pub fn replace(&mut self, record: AnalysisRecord) {
        self.commit(record);
    }

    /// Reset to an empty record.
    pub fn clear(&mut self) {
        self.commit(AnalysisRecord::default());
    }

    /// Append a marketing channel. Returns the new channel count.
    pub fn add_channel(&mut self, channel: MarketingChannel) -> Result<usize> {
        if channel.name.trim().is_empty() {
            return Err(GapError::InvalidValue {
                field: "channels.name".to_string(),
                value: channel.name,
                reason: "channel name cannot be empty".to_string(),
            });
        }
        if channel.monthly_spend.is_some_and(|s| s < 0.0) {
            return Err(GapError::InvalidValue {
                field: "channels.monthly_spend".to_string(),
                value: channel.monthly_spend.unwrap_or_default().to_string(),
                reason: "cannot be negative".to_string(),
            });
        }
        let mut record = self.record.clone();
        record.channels.push(channel);
        let count = record.channels.len();
        self.commit(record);
        Ok(count)
    }

    /// Remove the first channel whose name matches (case-insensitive).
    pub fn remove_channel(&mut self, name: &str) -> Result<MarketingChannel> {
        let needle = name.trim().to_lowercase();
        let idx = self
            .record
            .channels
            .iter()
            .position(|c| c.name.trim().to_lowercase() == needle)
            .ok_or_else(|| GapError::InvalidValue {
                field: "channels".to_string(),
                value: name.to_string(),
                reason: "no channel with that name".to_string(),
            })?;
        let mut record = self.record.clone();
        let removed = record.channels.remove(idx);
        self.commit(record);
        Ok(removed)
    }

    fn commit(&mut self, record: AnalysisRecord) {
        self.record = record;
        if let Some(hook) = self.on_change.as_mut() {
            hook(&self.record);
        }
    }
}

/// JSON merge patch: objects merge recursively, `null` removes the key and
/// anything else replaces the target.
/// Parse text at numeric fields the way [`FieldSpec::parse`] does and
/// bounds-check the numbers already there.
fn normalize_numbers(partial: &Value) -> Result<Value> {
    let mut patch = partial.clone();
    for field in fields::all().iter().filter(|f| f.kind.is_numeric()) {
        let Some(slot) = patch.pointer_mut(&field.pointer) else {
            continue;
        };
        match slot {
            Value::String(raw) => {
                let parsed = field.parse(raw)?;
                *slot = parsed;
            }
            Value::Number(n) => {
                if let Some(v) = n.as_f64() {
                    field.check_bounds(&n.to_string(), v)?;
                }
            }
            _ => {}
        }
    }
    Ok(patch)
}

pub fn merge_patch(target: &mut Value, patch: &Value) {
    let Value::Object(patch) = patch else {
        *target = patch.clone();
        return;
    };
    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    if let Value::Object(map) = target {
        for (key, value) in patch {
            if value.is_null() {
                map.remove(key);
            } else {
                merge_patch(map.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{FunnelType, Level};
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[test]
    fn update_merges_sections() {
        let mut form = FormState::from_record(AnalysisRecord::new("Acme"));
        form.update(&json!({"market": {"audience_size": 1000}}))
            .unwrap();
        form.update(&json!({"market": {"buyer_rate": 5}})).unwrap();

        let r = form.record();
        assert_eq!(r.company_name(), Some("Acme"));
        assert_eq!(r.market.audience_size, Some(1000.0));
        assert_eq!(r.market.buyer_rate, Some(5.0));
    }

    #[test]
    fn update_last_write_wins_and_null_clears() {
        let mut form = FormState::new();
        form.update(&json!({"company": {"annual_revenue": 10}}))
            .unwrap();
        form.update(&json!({"company": {"annual_revenue": 20}}))
            .unwrap();
        assert_eq!(form.record().company.annual_revenue, Some(20.0));

        form.update(&json!({"company": {"annual_revenue": null}}))
            .unwrap();
        assert_eq!(form.record().company.annual_revenue, None);
    }

    #[test]
    fn invalid_update_leaves_state_unchanged() {
        let mut form = FormState::from_record(AnalysisRecord::new("Acme"));
        let before = form.record().clone();
        let err = form
            .update(&json!({"channels": "lots"}))
            .unwrap_err();
        assert!(matches!(err, GapError::InvalidUpdate(_)));
        assert_eq!(form.record(), &before);

        let err = form
            .update(&json!({"market": {"audience_size": "lots"}}))
            .unwrap_err();
        assert!(matches!(err, GapError::InvalidValue { .. }));
        assert_eq!(form.record(), &before);

        assert!(form.update(&json!(42)).is_err());
    }

    #[test]
    fn update_parses_numeric_text() {
        let mut form = FormState::from_record(AnalysisRecord::new("Acme"));
        form.update(&json!({
            "market": {"audience_size": "185K", "buyer_rate": "6.2%"},
            "client": {"years_in_business": "12"},
            "company": {"annual_revenue": "$2.1M"},
            "funnel": {"leads": ""}
        }))
        .unwrap();

        let r = form.record();
        assert_eq!(r.market.audience_size, Some(185_000.0));
        assert_eq!(r.market.buyer_rate, Some(6.2));
        assert_eq!(r.company.annual_revenue, Some(2_100_000.0));
        assert_eq!(r.client.years_in_business, Some(12));
        assert_eq!(r.funnel.leads, None);
    }

    #[test]
    fn update_range_checks_percentages() {
        let mut form = FormState::from_record(AnalysisRecord::new("Acme"));
        form.update(&json!({"market": {"buyer_rate": 5}})).unwrap();
        let before = form.record().clone();

        for bad in [json!("140%"), json!(140), json!(-1)] {
            let err = form
                .update(&json!({"market": {"buyer_rate": bad}}))
                .unwrap_err();
            assert!(matches!(err, GapError::OutOfRange { .. }), "{err}");
            assert_eq!(form.record(), &before);
        }
        assert!(form
            .update(&json!({"company": {"annual_revenue": -5}}))
            .is_err());
    }

    #[test]
    fn set_parses_by_kind() {
        let mut form = FormState::new();
        form.set("audience size", "185K").unwrap();
        form.set("market.buyer_rate", "6.2%").unwrap();
        form.set("funnel.funnel_type", "retail").unwrap();
        form.set("scenario.planning.2.impact", "High").unwrap();

        let r = form.record();
        assert_eq!(r.market.audience_size, Some(185_000.0));
        assert_eq!(r.market.buyer_rate, Some(6.2));
        assert_eq!(r.funnel.funnel_type, FunnelType::Retail);
        assert_eq!(r.scenario.planning[1].impact, Some(Level::High));
    }

    #[test]
    fn set_blank_clears_and_errors_keep_state() {
        let mut form = FormState::new();
        form.set("company.annual_revenue", "1M").unwrap();
        form.set("company.annual_revenue", "").unwrap();
        assert_eq!(form.record().company.annual_revenue, None);

        assert!(matches!(
            form.set("market.buyer_rate", "140"),
            Err(GapError::OutOfRange { .. })
        ));
        assert!(matches!(
            form.set("no.such.field", "1"),
            Err(GapError::UnknownField(_))
        ));
        assert_eq!(form.record(), &AnalysisRecord::default());
    }

    #[test]
    fn get_returns_null_when_unanswered() {
        let mut form = FormState::new();
        assert_eq!(form.get("website").unwrap(), Value::Null);
        form.set("website", "acme.example").unwrap();
        assert_eq!(form.get("client.website").unwrap(), json!("https://acme.example"));
    }

    #[test]
    fn change_hook_sees_every_successful_change() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut form = FormState::new();
        form.on_change(move |r| {
            sink.lock()
                .unwrap()
                .push(r.company.annual_revenue);
        });

        form.set("annual revenue", "500K").unwrap();
        let _ = form.set("annual revenue", "not a number");
        form.update(&json!({"company": {"annual_revenue": 600000}}))
            .unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![Some(500_000.0), Some(600_000.0)]);
    }

    #[test]
    fn channels_add_and_remove() {
        let mut form = FormState::new();
        let count = form
            .add_channel(MarketingChannel {
                name: "Google Ads".into(),
                monthly_spend: Some(1_500.0),
                notes: None,
            })
            .unwrap();
        assert_eq!(count, 1);
        assert!(form.add_channel(MarketingChannel::default()).is_err());

        let removed = form.remove_channel("google ads").unwrap();
        assert_eq!(removed.monthly_spend, Some(1_500.0));
        assert!(form.record().channels.is_empty());
        assert!(form.remove_channel("SEO").is_err());
    }

    #[test]
    fn merge_patch_replaces_arrays() {
        let mut doc = json!({"a": [1, 2], "b": {"c": 1, "d": 2}});
        merge_patch(&mut doc, &json!({"a": [3], "b": {"d": null, "e": 5}}));
        assert_eq!(doc, json!({"a": [3], "b": {"c": 1, "e": 5}}));
    }
}
