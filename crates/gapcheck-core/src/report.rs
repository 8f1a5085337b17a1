//! Read-only report view: the saved answers plus every derived metric.

use crate::config::Config;
use crate::fields::{self, Section};
use crate::format::{count, currency, percent};
use crate::metrics::Metrics;
use crate::paths;
use crate::record::{AnalysisRecord, ValidationIssue};
use serde::Serialize;
use serde_json::Value;
use std::fmt::Write as _;

#[derive(Debug, Clone, Serialize)]
pub struct ReportView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_url: Option<String>,
    pub record: AnalysisRecord,
    pub metrics: Metrics,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<ValidationIssue>,
}

impl ReportView {
    /// Recompute every metric for `record`. `slug` is the saved report's slug,
    /// if any; it determines the share link.
    pub fn build(record: AnalysisRecord, slug: Option<&str>, config: &Config) -> Self {
        let metrics = Metrics::compute(&record, config.budget.assumptions());
        let issues = record.validate();
        Self {
            slug: slug.map(str::to_string),
            share_url: slug.map(|s| paths::share_url(&config.share.base_url, s)),
            record,
            metrics,
            issues,
        }
    }

    /// Plain-text report. Unanswered fields and unavailable metrics render
    /// blank.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let title = self.record.company_name().unwrap_or("(unnamed company)");
        let _ = writeln!(out, "Business Gap Analysis: {title}");
        if let Some(url) = &self.share_url {
            let _ = writeln!(out, "Share: {url}");
        }

        let doc = serde_json::to_value(&self.record).unwrap_or(Value::Null);
        for section in Section::all() {
            heading(&mut out, section.title());
            for field in fields::in_section(*section) {
                if field.path == "raw_data" {
                    continue;
                }
                let value = doc.pointer(&field.pointer).map(display_value).unwrap_or_default();
                line(&mut out, &field.label, &value);
            }
            self.render_metrics(&mut out, *section);
        }

        if !self.record.channels.is_empty() {
            heading(&mut out, "Marketing Channels");
            for c in &self.record.channels {
                let mut value = currency(c.monthly_spend);
                if !value.is_empty() {
                    value.push_str("/mo");
                }
                if let Some(notes) = &c.notes {
                    let _ = write!(value, "  {notes}");
                }
                line(&mut out, &c.name, &value);
            }
            if let Some(t) = &self.metrics.channels {
                line(&mut out, "Total monthly", &currency(Some(t.monthly_spend)));
                line(&mut out, "Total annual", &currency(Some(t.annual_spend)));
                line(&mut out, "% of revenue", &percent(t.percent_of_revenue));
            }
        }

        if !self.issues.is_empty() {
            heading(&mut out, "Issues");
            for issue in &self.issues {
                let _ = writeln!(out, "  [{:?}] {}: {}", issue.level, issue.field, issue.message);
            }
        }
        out
    }

    fn render_metrics(&self, out: &mut String, section: Section) {
        let m = &self.metrics;
        match section {
            Section::Market => {
                line(out, "Total buyers", &count(m.market.total_buyers));
                line(out, "Total market revenue", &currency(m.market.total_market_revenue));
            }
            Section::Company => {
                line(out, "Market share", &percent(m.market.share.map(|s| s.share_percent)));
                line(out, "Market gap", &percent(m.market.share.map(|s| s.gap_percent)));
                line(out, "Total customers", &count(m.customers.map(|c| c.total)));
                line(out, "New customers", &count(m.customers.and_then(|c| c.new)));
                line(out, "Current customers", &count(m.customers.and_then(|c| c.current)));
            }
            Section::Funnel => {
                for (label, stage) in m.funnel.stages() {
                    line(
                        out,
                        &format!("{label} rate / gap"),
                        &format!("{} / {}", percent(Some(stage.rate)), percent(Some(stage.gap))),
                    );
                }
            }
            Section::Scenario => {
                let Some(p) = &m.scenario else {
                    line(out, "Projected revenue", "");
                    return;
                };
                for s in &p.stages {
                    line(
                        out,
                        s.label,
                        &format!(
                            "{} -> {}  ({} -> {})",
                            percent(Some(s.current_rate)),
                            percent(Some(s.projected_rate)),
                            count(Some(s.current_count)),
                            count(Some(s.projected_count)),
                        ),
                    );
                }
                line(out, "Current revenue", &currency(Some(p.current_revenue)));
                line(out, "Projected revenue", &currency(Some(p.projected_revenue)));
                let mut delta = currency(Some(p.revenue_delta));
                if let Some(pct) = p.revenue_delta_percent {
                    let _ = write!(delta, " ({})", percent(Some(pct)));
                }
                line(out, "Revenue change", &delta);
            }
            Section::Budget => {
                if let Some(b) = &m.planned_budget {
                    line(out, "Planned total", &currency(Some(b.total)));
                    line(out, "Year 1 % of revenue", &percent(b.year1_percent_of_revenue));
                }
                let Some(sba) = &m.sba else {
                    return;
                };
                let _ = writeln!(
                    out,
                    "  SBA projection ({}% of revenue, {}x ROI):",
                    sba.assumptions.marketing_rate * 100.0,
                    sba.assumptions.roi_multiple
                );
                let _ = writeln!(
                    out,
                    "    {:<6}{:>16}{:>14}{:>12}{:>16}{:>16}{:>12}",
                    "Year", "Start", "Budget", "Monthly", "Min ROI", "End", "Customers"
                );
                for y in &sba.years {
                    let _ = writeln!(
                        out,
                        "    {:<6}{:>16}{:>14}{:>12}{:>16}{:>16}{:>12}",
                        y.year,
                        currency(Some(y.start_revenue)),
                        currency(Some(y.yearly_budget)),
                        currency(Some(y.monthly_budget)),
                        currency(Some(y.minimum_roi)),
                        currency(Some(y.end_revenue)),
                        count(y.customers_needed),
                    );
                }
                line(out, "Total budget", &currency(Some(sba.total_budget)));
                line(out, "Total minimum ROI", &currency(Some(sba.total_minimum_roi)));
                line(out, "Total customers needed", &count(sba.total_customers_needed));
                line(out, "Final revenue", &currency(Some(sba.final_revenue)));
            }
            _ => {}
        }
    }
}

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{title}\n{}", "-".repeat(title.chars().count()));
}

fn line(out: &mut String, label: &str, value: &str) {
    if value.is_empty() {
        let _ = writeln!(out, "  {label}");
    } else {
        let _ = writeln!(out, "  {label:<28} {value}");
    }
}

fn display_value(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n
            .as_f64()
            .map(|f| {
                if f.fract() == 0.0 {
                    count(Some(f))
                } else {
                    crate::format::with_commas(f, 2)
                }
            })
            .unwrap_or_else(|| n.to_string()),
        other => other.to_string(),
    }
}
