use crate::output::{print_json, print_pairs, print_table};
use gapcheck_core::format::{count, currency, percent};
use gapcheck_core::metrics::budget::{planned_budget, project_sba};
use std::path::Path;

pub fn run(root: &Path, slug: &str, json: bool) -> anyhow::Result<()> {
    let (config, store) = super::open(root)?;
    let record = super::load_report(store.as_ref(), slug)?;

    let planned = planned_budget(&record);
    let sba = project_sba(
        record.company.annual_revenue,
        record.market.annual_customer_value,
        config.budget.assumptions(),
    );

    if json {
        print_json(&serde_json::json!({
            "planned": planned,
            "sba": sba,
        }))?;
        return Ok(());
    }

    match &planned {
        Some(p) => {
            println!("Planned budget");
            let rows = p
                .years
                .iter()
                .enumerate()
                .map(|(i, y)| vec![format!("Year {}", i + 1), currency(*y)])
                .collect();
            print_table(&["YEAR", "BUDGET"], rows);
            let mut totals = vec![("Total", currency(Some(p.total)))];
            if p.year1_percent_of_revenue.is_some() {
                totals.push(("Year 1 as % of revenue", percent(p.year1_percent_of_revenue)));
            }
            print_pairs(&totals);
        }
        None => println!("No planned budget entered (set budget.year1 .. budget.year5)."),
    }
    println!();

    let Some(sba) = sba else {
        println!("SBA projection needs company.annual_revenue.");
        return Ok(());
    };
    println!(
        "5-year SBA projection ({}% of revenue, {}x minimum ROI)",
        sba.assumptions.marketing_rate * 100.0,
        sba.assumptions.roi_multiple
    );
    let rows = sba
        .years
        .iter()
        .map(|y| {
            vec![
                y.year.to_string(),
                currency(Some(y.start_revenue)),
                currency(Some(y.yearly_budget)),
                currency(Some(y.monthly_budget)),
                currency(Some(y.minimum_roi)),
                currency(Some(y.end_revenue)),
                count(y.customers_needed),
            ]
        })
        .collect();
    print_table(
        &["YEAR", "START", "BUDGET", "MONTHLY", "MIN ROI", "END", "CUSTOMERS"],
        rows,
    );
    print_pairs(&[
        ("Total budget", currency(Some(sba.total_budget))),
        ("Total minimum ROI", currency(Some(sba.total_minimum_roi))),
        ("Total customers needed", count(sba.total_customers_needed)),
        ("Final revenue", currency(Some(sba.final_revenue))),
    ]);
    Ok(())
}
