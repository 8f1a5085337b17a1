//! Registry of every settable scalar field in an [`AnalysisRecord`].
//!
//! Each questionnaire section is the set of fields sharing a [`Section`]. The
//! CLI `set` command, the HTTP field endpoint and the paste import all resolve
//! names through [`lookup`] and convert text through [`FieldSpec::parse`].
//!
//! [`AnalysisRecord`]: crate::record::AnalysisRecord

use crate::error::{GapError, Result};
use crate::numeric;
use crate::record::{
    is_url, AudienceType, FunnelType, Industry, Level, BUDGET_YEARS, PLANNING_SLOTS,
};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Section
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Client,
    Project,
    Market,
    Company,
    Funnel,
    Scenario,
    Budget,
    Demographics,
    Notes,
}

impl Section {
    pub fn all() -> &'static [Section] {
        &[
            Section::Client,
            Section::Project,
            Section::Market,
            Section::Company,
            Section::Funnel,
            Section::Scenario,
            Section::Budget,
            Section::Demographics,
            Section::Notes,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Section::Client => "client",
            Section::Project => "project",
            Section::Market => "market",
            Section::Company => "company",
            Section::Funnel => "funnel",
            Section::Scenario => "scenario",
            Section::Budget => "budget",
            Section::Demographics => "demographics",
            Section::Notes => "notes",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Section::Client => "Client Information",
            Section::Project => "Project Details",
            Section::Market => "Market Overview",
            Section::Company => "Company Overview",
            Section::Funnel => "Gaps & Opportunity Funnel",
            Section::Scenario => "Scenario Planner",
            Section::Budget => "5-Year SBA Marketing Budget",
            Section::Demographics => "Demographics & Target Audience",
            Section::Notes => "Notes",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl std::str::FromStr for Section {
    type Err = GapError;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim().to_lowercase();
        Section::all()
            .iter()
            .copied()
            .find(|sec| sec.as_str() == needle || sec.title().to_lowercase() == needle)
            .ok_or_else(|| GapError::InvalidValue {
                field: "section".to_string(),
                value: s.to_string(),
                reason: format!(
                    "expected one of: {}",
                    Section::all()
                        .iter()
                        .map(|sec| sec.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            })
    }
}

// ---------------------------------------------------------------------------
// FieldKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Url,
    /// Non-negative number, `K`/`M` suffixes allowed.
    Amount,
    /// Number in [0, 100], `%` allowed.
    Percent,
    Whole,
    Date,
    FunnelType,
    AudienceType,
    Industry,
    Level,
}

impl FieldKind {
    /// Kinds stored as JSON numbers.
    pub fn is_numeric(self) -> bool {
        matches!(self, FieldKind::Amount | FieldKind::Percent | FieldKind::Whole)
    }

    pub fn hint(self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Url => "url",
            FieldKind::Amount => "number (185K, 2.1M, $1,900)",
            FieldKind::Percent => "percent 0-100",
            FieldKind::Whole => "whole number",
            FieldKind::Date => "date YYYY-MM-DD",
            FieldKind::FunnelType => "lead_generation | retail",
            FieldKind::AudienceType => "B2C | B2B | Both",
            FieldKind::Industry => "healthcare | retail | finance | construction | technology | food_beverage | other",
            FieldKind::Level => "low | medium | high",
        }
    }
}

// ---------------------------------------------------------------------------
// FieldSpec
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct FieldSpec {
    /// Dotted path, e.g. `market.audience_size`.
    pub path: String,
    /// JSON pointer into the serialized record.
    #[serde(skip)]
    pub pointer: String,
    pub label: String,
    #[serde(skip_serializing_if = "no_aliases")]
    pub aliases: &'static [&'static str],
    pub kind: FieldKind,
    pub section: Section,
}

fn no_aliases(aliases: &&[&str]) -> bool {
    aliases.is_empty()
}

impl FieldSpec {
    /// Convert user text into the JSON value stored at this field.
    ///
    /// Blank input yields `Value::Null`, which clears the field.
    pub fn parse(&self, raw: &str) -> Result<Value> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(Value::Null);
        }
        let value = match self.kind {
            FieldKind::Text => Value::String(raw.to_string()),
            FieldKind::Url => {
                let url = if raw.contains("://") {
                    raw.to_string()
                } else {
                    format!("https://{raw}")
                };
                if !is_url(&url) {
                    return Err(self.invalid(raw, "expected an http(s) URL"));
                }
                Value::String(url)
            }
            FieldKind::Amount => {
                let v = numeric::parse_amount(raw)
                    .ok_or_else(|| self.invalid(raw, "expected a number"))?;
                self.check_bounds(raw, v)?;
                Value::from(v)
            }
            FieldKind::Percent => {
                let v = numeric::parse_percent(raw)
                    .ok_or_else(|| self.invalid(raw, "expected a percentage"))?;
                self.check_bounds(raw, v)?;
                Value::from(v)
            }
            FieldKind::Whole => Value::from(
                numeric::parse_whole(raw)
                    .ok_or_else(|| self.invalid(raw, "expected a whole number"))?,
            ),
            FieldKind::Date => {
                let d = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .map_err(|_| self.invalid(raw, "expected a date as YYYY-MM-DD"))?;
                serde_json::to_value(d)?
            }
            FieldKind::FunnelType => serde_json::to_value(raw.parse::<FunnelType>()?)?,
            FieldKind::AudienceType => serde_json::to_value(raw.parse::<AudienceType>()?)?,
            FieldKind::Industry => serde_json::to_value(raw.parse::<Industry>()?)?,
            FieldKind::Level => serde_json::to_value(raw.parse::<Level>()?)?,
        };
        Ok(value)
    }

    /// Amounts cannot be negative and percentages must lie in [0, 100].
    pub(crate) fn check_bounds(&self, raw: &str, v: f64) -> Result<()> {
        match self.kind {
            FieldKind::Amount if v < 0.0 => Err(self.invalid(raw, "cannot be negative")),
            FieldKind::Percent if !(0.0..=100.0).contains(&v) => Err(GapError::OutOfRange {
                field: self.path.clone(),
                value: v,
                min: 0.0,
                max: 100.0,
            }),
            _ => Ok(()),
        }
    }

    fn invalid(&self, raw: &str, reason: &str) -> GapError {
        GapError::InvalidValue {
            field: self.path.clone(),
            value: raw.to_string(),
            reason: reason.to_string(),
        }
    }

    fn matches(&self, name: &str) -> bool {
        let needle = name.trim().to_lowercase();
        self.path == needle
            || self.label.to_lowercase() == needle
            || self.aliases.iter().any(|a| *a == needle)
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

static REGISTRY: OnceLock<Vec<FieldSpec>> = OnceLock::new();

fn spec(
    section: Section,
    path: &str,
    label: &str,
    kind: FieldKind,
    aliases: &'static [&'static str],
) -> FieldSpec {
    FieldSpec {
        path: path.to_string(),
        pointer: format!("/{}", path.replace('.', "/")),
        label: label.to_string(),
        aliases,
        kind,
        section,
    }
}

fn build_registry() -> Vec<FieldSpec> {
    use FieldKind as K;
    use Section as S;

    let mut fields = vec![
        spec(S::Client, "client.company_name", "Company name", K::Text, &["client name", "company"]),
        spec(S::Client, "client.website", "Website", K::Url, &["website url"]),
        spec(S::Client, "client.owner_primary", "Owner", K::Text, &["owner name", "primary owner"]),
        spec(S::Client, "client.owner_secondary", "Co-owner", K::Text, &["co-owner name", "co owner"]),
        spec(S::Client, "client.years_in_business", "Years in business", K::Whole, &[]),
        spec(S::Client, "client.industry", "Industry", K::Industry, &[]),
        spec(S::Client, "client.industry_other", "Other industry", K::Text, &[]),
        spec(S::Client, "client.dashboard_link", "Dashboard link", K::Url, &["looker studio link"]),
        spec(S::Project, "project.name", "Project name", K::Text, &[]),
        spec(S::Project, "project.date", "Project date", K::Date, &[]),
        spec(S::Project, "project.prepared_for", "Prepared for", K::Text, &[]),
        spec(S::Project, "project.prepared_by", "Prepared by", K::Text, &[]),
        spec(S::Market, "market.audience_size", "Audience size", K::Amount, &["market size"]),
        spec(S::Market, "market.buyer_rate", "Buyer rate", K::Percent, &["buyer %", "buyer percentage"]),
        spec(S::Market, "market.annual_customer_value", "Annual customer value", K::Amount, &["customer value", "acv"]),
        spec(S::Market, "market.notes", "Market notes", K::Text, &["market overview"]),
        spec(S::Company, "company.annual_revenue", "Annual revenue", K::Amount, &["revenue"]),
        spec(S::Company, "company.percent_new_customers", "New customers %", K::Percent, &["% new customers", "percent new customers"]),
        spec(S::Company, "company.percent_current_customers", "Current customers %", K::Percent, &["% current customers", "percent current customers"]),
        spec(S::Company, "company.mission", "Mission", K::Text, &[]),
        spec(S::Company, "company.vision", "Vision", K::Text, &[]),
        spec(S::Company, "company.values", "Values", K::Text, &[]),
        spec(S::Company, "company.products_services", "Products & services", K::Text, &["key products/services", "products"]),
        spec(S::Company, "company.competitive_advantages", "Competitive advantages", K::Text, &[]),
        spec(S::Funnel, "funnel.funnel_type", "Funnel type", K::FunnelType, &["business model"]),
        spec(S::Funnel, "funnel.website_visitors", "Website visitors", K::Amount, &["yearly website visitors", "visitors"]),
        spec(S::Funnel, "funnel.leads", "Leads", K::Amount, &["yearly leads"]),
        spec(S::Funnel, "funnel.closed_accounts", "Closed accounts", K::Amount, &["new accounts closed", "yearly new accounts closed"]),
        spec(S::Funnel, "funnel.store_visitors", "Store visitors", K::Amount, &["foot traffic"]),
        spec(S::Funnel, "funnel.purchasers", "Purchasers", K::Amount, &[]),
        spec(S::Funnel, "funnel.repeat_customers", "Repeat customers", K::Amount, &[]),
        spec(S::Scenario, "scenario.visibility_increase", "Visibility increase", K::Percent, &["visibility improvement"]),
        spec(S::Scenario, "scenario.conversion_increase", "Conversion increase", K::Percent, &["conversion improvement"]),
        spec(S::Scenario, "scenario.closing_increase", "Closing increase", K::Percent, &["retention improvement", "close rate increase"]),
    ];

    for slot in 1..=PLANNING_SLOTS {
        let idx = slot - 1;
        for (name, label, kind) in [
            ("name", "name", K::Text),
            ("description", "description", K::Text),
            ("likelihood", "likelihood", K::Level),
            ("impact", "impact", K::Level),
            ("mitigation", "mitigation", K::Text),
        ] {
            fields.push(FieldSpec {
                path: format!("scenario.planning.{slot}.{name}"),
                pointer: format!("/scenario/planning/{idx}/{name}"),
                label: format!("Scenario {slot} {label}"),
                aliases: &[],
                kind,
                section: S::Scenario,
            });
        }
    }

    for year in 1..=BUDGET_YEARS {
        fields.push(spec(
            S::Budget,
            &format!("budget.year{year}"),
            &format!("Year {year} budget"),
            K::Amount,
            &[],
        ));
    }
    fields.push(spec(S::Budget, "budget.notes", "Budget notes", K::Text, &[]));

    fields.extend([
        spec(S::Demographics, "demographics.audience_type", "Target audience", K::AudienceType, &["audience type", "target audience type"]),
        spec(S::Demographics, "demographics.b2c", "B2C demographics", K::Text, &[]),
        spec(S::Demographics, "demographics.b2b", "B2B demographics", K::Text, &[]),
        spec(S::Demographics, "demographics.notes", "Audience notes", K::Text, &[]),
        spec(S::Notes, "notes", "Notes", K::Text, &["copywriter notes"]),
        spec(S::Notes, "raw_data", "Raw data", K::Text, &[]),
    ]);

    fields
}

/// All registered fields, in questionnaire order.
pub fn all() -> &'static [FieldSpec] {
    REGISTRY.get_or_init(build_registry)
}

/// Find a field by path, label or alias (case-insensitive).
pub fn find(name: &str) -> Option<&'static FieldSpec> {
    all().iter().find(|f| f.matches(name))
}

pub fn lookup(name: &str) -> Result<&'static FieldSpec> {
    find(name).ok_or_else(|| GapError::UnknownField(name.trim().to_string()))
}

pub fn in_section(section: Section) -> impl Iterator<Item = &'static FieldSpec> {
    all().iter().filter(move |f| f.section == section)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
