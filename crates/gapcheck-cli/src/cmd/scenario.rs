use crate::output::{print_json, print_pairs, print_table};
use anyhow::Context;
use gapcheck_core::format::{count, currency, percent};
use gapcheck_core::metrics::scenario::{project, Increases};
use std::path::Path;

/// Increases given on the command line; `None` keeps the saved value.
pub struct Overrides {
    pub visibility: Option<f64>,
    pub conversion: Option<f64>,
    pub closing: Option<f64>,
}

impl Overrides {
    fn apply(&self, base: Increases) -> anyhow::Result<Increases> {
        for (flag, value) in [
            ("--visibility", self.visibility),
            ("--conversion", self.conversion),
            ("--closing", self.closing),
        ] {
            if let Some(v) = value {
                if !(0.0..=100.0).contains(&v) {
                    anyhow::bail!("{flag} must be between 0 and 100 percentage points, got {v}");
                }
            }
        }
        Ok(Increases {
            visibility: self.visibility.unwrap_or(base.visibility),
            conversion: self.conversion.unwrap_or(base.conversion),
            closing: self.closing.unwrap_or(base.closing),
        })
    }
}

pub fn run(
    root: &Path,
    slug: &str,
    overrides: Overrides,
    save: bool,
    json: bool,
) -> anyhow::Result<()> {
    let mut session = super::Session::open(root, slug)?;
    let increases = overrides.apply(Increases::from_record(session.record()))?;

    if save {
        session
            .form
            .update(&serde_json::json!({
                "scenario": {
                    "visibility_increase": increases.visibility,
                    "conversion_increase": increases.conversion,
                    "closing_increase": increases.closing,
                }
            }))
            .context("failed to store scenario increases")?;
    }
    let record = session.finish()?;
    let projection = project(&record, increases);

    if json {
        print_json(&projection)?;
        return Ok(());
    }

    let Some(p) = projection else {
        println!(
            "Not enough data to project {slug}: the scenario needs market.audience_size, \
             market.buyer_rate, market.annual_customer_value and the funnel counts \
             for a {} funnel.",
            record.funnel.funnel_type
        );
        return Ok(());
    };

    println!(
        "Scenario for {slug} ({} funnel): +{} visibility, +{} conversion, +{} closing",
        p.funnel_type,
        percent(Some(p.increases.visibility)),
        percent(Some(p.increases.conversion)),
        percent(Some(p.increases.closing)),
    );
    let rows = p
        .stages
        .iter()
        .map(|s| {
            vec![
                s.label.to_string(),
                percent(Some(s.current_rate)),
                percent(Some(s.projected_rate)),
                count(Some(s.current_count)),
                count(Some(s.projected_count)),
            ]
        })
        .collect();
    print_table(&["STAGE", "RATE", "PROJECTED", "COUNT", "PROJECTED"], rows);
    let pct = p
        .revenue_delta_percent
        .map(|v| format!(" ({})", percent(Some(v))))
        .unwrap_or_default();
    print_pairs(&[
        ("Current revenue", currency(Some(p.current_revenue))),
        ("Projected revenue", currency(Some(p.projected_revenue))),
        ("Change", format!("{}{pct}", currency(Some(p.revenue_delta)))),
    ]);
    if save {
        println!("Saved increases to {slug}.");
    }
    Ok(())
}
