//! `Label: Value` paste import.
//!
//! Research notes are often pasted as one answer per line. Each line is
//! split on its first `:`; the label is resolved through the field registry
//! and the value parsed by the field's kind. Anything that cannot be applied
//! is reported back rather than failing the whole import.

use crate::error::Result;
use crate::fields::{self, FieldKind, FieldSpec};
use crate::form::FormState;
use crate::record::{AnalysisRecord, Industry};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// Values that mean "no answer" in pasted research.
pub const SENTINELS: &[&str] = &["N/A", "COULD NOT FIND", "UNKNOWN", "—"];

/// Fields the paste never writes.
const NOT_IMPORTABLE: &[&str] = &["raw_data"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedLine {
    pub line: usize,
    pub field: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    NoSeparator,
    UnknownLabel,
    NoAnswer,
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedLine {
    pub line: usize,
    pub text: String,
    #[serde(flatten)]
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportOutcome {
    pub applied: Vec<AppliedLine>,
    pub skipped: Vec<SkippedLine>,
}

pub fn is_sentinel(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || SENTINELS.iter().any(|s| s.eq_ignore_ascii_case(value))
}

/// Apply a paste to `form`. The paste itself is stored verbatim as
/// `raw_data`, and the form sees a single change.
pub fn import(form: &mut FormState, paste: &str) -> Result<ImportOutcome> {
    let mut scratch = FormState::from_record(form.record().clone());
    let mut outcome = ImportOutcome::default();

    for (idx, text) in paste.lines().enumerate() {
        let line = idx + 1;
        if text.trim().is_empty() {
            continue;
        }
        let skip = |reason| SkippedLine {
            line,
            text: text.to_string(),
            reason,
        };

        let Some((label, value)) = text.split_once(':') else {
            outcome.skipped.push(skip(SkipReason::NoSeparator));
            continue;
        };
        let Some(field) = fields::find(label).filter(|f| !NOT_IMPORTABLE.contains(&f.path.as_str()))
        else {
            outcome.skipped.push(skip(SkipReason::UnknownLabel));
            continue;
        };
        let value = value.trim();
        if is_sentinel(value) {
            outcome.skipped.push(skip(SkipReason::NoAnswer));
            continue;
        }

        match apply(&mut scratch, field, value) {
            Ok(applied) => {
                debug!(line, field = %field.path, "imported");
                outcome.applied.extend(applied.into_iter().map(|(field, value)| AppliedLine {
                    line,
                    field,
                    value,
                }));
            }
            Err(e) => outcome.skipped.push(skip(SkipReason::Invalid(e.to_string()))),
        }
    }

    let mut record: AnalysisRecord = scratch.into_record();
    record.raw_data = Some(paste.to_string());
    form.replace(record);
    Ok(outcome)
}

/// Write one value, returning every `(path, value)` pair that changed.
fn apply(form: &mut FormState, field: &FieldSpec, raw: &str) -> Result<Vec<(String, Value)>> {
    match field.kind {
        FieldKind::Industry if Industry::lookup(raw).is_none() => {
            let other = fields::lookup("client.industry_other")?;
            let industry = Value::from(Industry::Other.as_str());
            let text = Value::from(raw);
            form.set_value(field, industry.clone())?;
            form.set_value(other, text.clone())?;
            Ok(vec![
                (field.path.clone(), industry),
                (other.path.clone(), text),
            ])
        }
        FieldKind::Whole => {
            // "12 years" counts as 12
            let raw = raw.trim();
            let number = match raw.rsplit_once(char::is_whitespace) {
                Some((n, unit)) if unit.chars().all(char::is_alphabetic) => n,
                _ => raw,
            };
            let value = field.parse(number)?;
            form.set_value(field, value.clone())?;
            Ok(vec![(field.path.clone(), value)])
        }
        _ => {
            let value = field.parse(raw)?;
            form.set_value(field, value.clone())?;
            Ok(vec![(field.path.clone(), value)])
        }
    }
}
