use crate::error::GapError;
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// FunnelType
// ---------------------------------------------------------------------------

/// Business model that selects which funnel-gap formulas apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunnelType {
    #[default]
    LeadGeneration,
    Retail,
}

impl FunnelType {
    pub fn as_str(self) -> &'static str {
        match self {
            FunnelType::LeadGeneration => "lead_generation",
            FunnelType::Retail => "retail",
        }
    }
}

impl fmt::Display for FunnelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FunnelType {
    type Err = GapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "lead_generation" | "lead_gen" | "leadgen" => Ok(FunnelType::LeadGeneration),
            "retail" => Ok(FunnelType::Retail),
            _ => Err(invalid_choice("funnel type", s, "lead_generation, retail")),
        }
    }
}

// ---------------------------------------------------------------------------
// AudienceType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudienceType {
    B2C,
    B2B,
    Both,
}

impl AudienceType {
    pub fn as_str(self) -> &'static str {
        match self {
            AudienceType::B2C => "B2C",
            AudienceType::B2B => "B2B",
            AudienceType::Both => "Both",
        }
    }
}

impl fmt::Display for AudienceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AudienceType {
    type Err = GapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "b2c" => Ok(AudienceType::B2C),
            "b2b" => Ok(AudienceType::B2B),
            "both" => Ok(AudienceType::Both),
            _ => Err(invalid_choice("audience type", s, "B2C, B2B, Both")),
        }
    }
}

// ---------------------------------------------------------------------------
// Industry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Industry {
    Healthcare,
    Retail,
    Finance,
    Construction,
    Technology,
    FoodBeverage,
    Other,
}

impl Industry {
    pub fn all() -> &'static [Industry] {
        &[
            Industry::Healthcare,
            Industry::Retail,
            Industry::Finance,
            Industry::Construction,
            Industry::Technology,
            Industry::FoodBeverage,
            Industry::Other,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Industry::Healthcare => "healthcare",
            Industry::Retail => "retail",
            Industry::Finance => "finance",
            Industry::Construction => "construction",
            Industry::Technology => "technology",
            Industry::FoodBeverage => "food_beverage",
            Industry::Other => "other",
        }
    }

    /// Human-readable label, as shown in reports and matched by the paste import.
    pub fn label(self) -> &'static str {
        match self {
            Industry::Healthcare => "Healthcare",
            Industry::Retail => "Retail",
            Industry::Finance => "Finance",
            Industry::Construction => "Construction",
            Industry::Technology => "Technology",
            Industry::FoodBeverage => "Food & Beverage",
            Industry::Other => "Other",
        }
    }

    /// Match either the value (`food_beverage`) or the label (`Food & Beverage`).
    pub fn lookup(s: &str) -> Option<Industry> {
        let needle = s.trim().to_lowercase();
        Industry::all()
            .iter()
            .copied()
            .find(|i| i.as_str() == needle || i.label().to_lowercase() == needle)
    }
}

impl fmt::Display for Industry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Industry {
    type Err = GapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Industry::lookup(s).ok_or_else(|| {
            invalid_choice(
                "industry",
                s,
                "healthcare, retail, finance, construction, technology, food_beverage, other",
            )
        })
    }
}

// ---------------------------------------------------------------------------
// Level
// ---------------------------------------------------------------------------

/// Likelihood / impact rating for a planning scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Low,
    Medium,
    High,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Low => "low",
            Level::Medium => "medium",
            Level::High => "high",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Level {
    type Err = GapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Level::Low),
            "medium" => Ok(Level::Medium),
            "high" => Ok(Level::High),
            _ => Err(invalid_choice("level", s, "low, medium, high")),
        }
    }
}

fn invalid_choice(field: &str, value: &str, choices: &str) -> GapError {
    GapError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: format!("expected one of: {choices}"),
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_primary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_secondary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub years_in_business: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<Industry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry_other: Option<String>,
    /// External dashboard for the client (e.g. a Looker Studio report).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dashboard_link: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prepared_for: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prepared_by: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketInputs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audience_size: Option<f64>,
    /// Percent of the audience that buys in this category, 0-100.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annual_customer_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyInputs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annual_revenue: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_new_customers: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_current_customers: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mission: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vision: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub products_services: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub competitive_advantages: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FunnelInputs {
    pub funnel_type: FunnelType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website_visitors: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leads: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_accounts: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_visitors: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchasers: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat_customers: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanningScenario {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub likelihood: Option<Level>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impact: Option<Level>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mitigation: Option<String>,
}

impl PlanningScenario {
    pub fn is_empty(&self) -> bool {
        *self == PlanningScenario::default()
    }
}

/// Number of qualitative planning scenarios a record carries.
pub const PLANNING_SLOTS: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioInputs {
    /// Percentage-point increase applied to the reach / traffic rate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility_increase: Option<f64>,
    /// Percentage-point increase applied to lead conversion / purchase rate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversion_increase: Option<f64>,
    /// Percentage-point increase applied to close rate / repeat rate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closing_increase: Option<f64>,
    pub planning: [PlanningScenario; PLANNING_SLOTS],
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketingChannel {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_spend: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Number of years in the planned and projected SBA budget.
pub const BUDGET_YEARS: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetInputs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year1: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year2: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year3: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year4: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year5: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl BudgetInputs {
    pub fn years(&self) -> [Option<f64>; BUDGET_YEARS] {
        [self.year1, self.year2, self.year3, self.year4, self.year5]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Demographics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audience_type: Option<AudienceType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub b2c: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub b2b: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

// ---------------------------------------------------------------------------
// AnalysisRecord
// ---------------------------------------------------------------------------

/// The full set of questionnaire answers for one company.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisRecord {
    pub client: ClientInfo,
    pub project: ProjectDetails,
    pub market: MarketInputs,
    pub company: CompanyInputs,
    pub funnel: FunnelInputs,
    pub scenario: ScenarioInputs,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub channels: Vec<MarketingChannel>,
    pub budget: BudgetInputs,
    pub demographics: Demographics,
    /// Free-text copywriter notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Pasted source data, kept verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_url: Option<String>,
}

impl AnalysisRecord {
    pub fn new(company_name: impl Into<String>) -> Self {
        let mut record = Self::default();
        record.client.company_name = Some(company_name.into());
        record
    }

    /// Company name, trimmed, or `None` when blank.
    pub fn company_name(&self) -> Option<&str> {
        self.client
            .company_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Fails with `MissingCompanyName` when the record has no usable name.
    pub fn require_company_name(&self) -> crate::Result<&str> {
        self.company_name().ok_or(GapError::MissingCompanyName)
    }

    pub fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        let percents = [
            ("market.buyer_rate", self.market.buyer_rate),
            ("company.percent_new_customers", self.company.percent_new_customers),
            (
                "company.percent_current_customers",
                self.company.percent_current_customers,
            ),
            ("scenario.visibility_increase", self.scenario.visibility_increase),
            ("scenario.conversion_increase", self.scenario.conversion_increase),
            ("scenario.closing_increase", self.scenario.closing_increase),
        ];
        for (field, value) in percents {
            if let Some(v) = value {
                if !(0.0..=100.0).contains(&v) {
                    issues.push(ValidationIssue::error(
                        field,
                        format!("must be between 0 and 100, got {v}"),
                    ));
                }
            }
        }

        let amounts = [
            ("market.audience_size", self.market.audience_size),
            ("market.annual_customer_value", self.market.annual_customer_value),
            ("company.annual_revenue", self.company.annual_revenue),
            ("funnel.website_visitors", self.funnel.website_visitors),
            ("funnel.leads", self.funnel.leads),
            ("funnel.closed_accounts", self.funnel.closed_accounts),
            ("funnel.store_visitors", self.funnel.store_visitors),
            ("funnel.purchasers", self.funnel.purchasers),
            ("funnel.repeat_customers", self.funnel.repeat_customers),
        ];
        for (field, value) in amounts {
            if let Some(v) = value {
                if v < 0.0 {
                    issues.push(ValidationIssue::error(
                        field,
                        format!("cannot be negative, got {v}"),
                    ));
                }
            }
        }

        for (i, year) in self.budget.years().iter().enumerate() {
            if let Some(v) = year {
                if *v < 0.0 {
                    issues.push(ValidationIssue::error(
                        format!("budget.year{}", i + 1),
                        format!("cannot be negative, got {v}"),
                    ));
                }
            }
        }

        if let (Some(new), Some(current)) = (
            self.company.percent_new_customers,
            self.company.percent_current_customers,
        ) {
            if new + current > 100.0 {
                issues.push(ValidationIssue::warning(
                    "company.percent_new_customers",
                    format!("new ({new}%) and current ({current}%) customers add up to more than 100%"),
                ));
            }
        }

        for (field, value) in [
            ("client.website", &self.client.website),
            ("client.dashboard_link", &self.client.dashboard_link),
        ] {
            if let Some(url) = value {
                if !is_url(url) {
                    issues.push(ValidationIssue::warning(
                        field,
                        format!("'{url}' is not an http(s) URL"),
                    ));
                }
            }
        }

        if self.company_name().is_none() {
            issues.push(ValidationIssue::warning(
                "client.company_name",
                "required before the report can be saved",
            ));
        }

        issues
    }
}

static URL_RE: OnceLock<Regex> = OnceLock::new();

pub fn is_url(s: &str) -> bool {
    URL_RE
        .get_or_init(|| Regex::new(r"^https?://[^\s/$.?#][^\s]*$").unwrap())
        .is_match(s.trim())
}

// ---------------------------------------------------------------------------
// ValidationIssue
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueLevel {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub level: IssueLevel,
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    fn error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: IssueLevel::Error,
            field: field.into(),
            message: message.into(),
        }
    }

    fn warning(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: IssueLevel::Warning,
            field: field.into(),
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
