use crate::numeric::{percent_of, ratio};
use crate::record::{AnalysisRecord, BUDGET_YEARS};
use serde::{Deserialize, Serialize};

/// Marketing rate and ROI multiple behind the SBA projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetAssumptions {
    /// Share of revenue spent on marketing each year (0.08 = 8%).
    pub marketing_rate: f64,
    /// Minimum return expected per marketing dollar.
    pub roi_multiple: f64,
}

impl Default for BudgetAssumptions {
    fn default() -> Self {
        Self {
            marketing_rate: 0.08,
            roi_multiple: 3.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BudgetYear {
    pub year: usize,
    pub start_revenue: f64,
    pub yearly_budget: f64,
    pub monthly_budget: f64,
    pub minimum_roi: f64,
    pub end_revenue: f64,
    pub customers_needed: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SbaProjection {
    pub assumptions: BudgetAssumptions,
    pub years: Vec<BudgetYear>,
    pub total_budget: f64,
    pub total_minimum_roi: f64,
    pub total_customers_needed: Option<f64>,
    pub final_revenue: f64,
}

/// Five-year compounding marketing budget.
///
/// Each year spends `marketing_rate` of its starting revenue and must return
/// `roi_multiple` times that spend; the year's end revenue is the next
/// year's start.
pub fn project_sba(
    current_revenue: Option<f64>,
    annual_customer_value: Option<f64>,
    assumptions: BudgetAssumptions,
) -> Option<SbaProjection> {
    let mut revenue = current_revenue?;
    let mut years = Vec::with_capacity(BUDGET_YEARS);

    for year in 1..=BUDGET_YEARS {
        let yearly_budget = revenue * assumptions.marketing_rate;
        let minimum_roi = yearly_budget * assumptions.roi_multiple;
        let end_revenue = revenue + minimum_roi;
        years.push(BudgetYear {
            year,
            start_revenue: revenue,
            yearly_budget,
            monthly_budget: yearly_budget / 12.0,
            minimum_roi,
            end_revenue,
            customers_needed: annual_customer_value.and_then(|v| ratio(minimum_roi, v)),
        });
        revenue = end_revenue;
    }

    let total_customers_needed = years
        .iter()
        .map(|y| y.customers_needed)
        .sum::<Option<f64>>();
    Some(SbaProjection {
        assumptions,
        total_budget: years.iter().map(|y| y.yearly_budget).sum(),
        total_minimum_roi: years.iter().map(|y| y.minimum_roi).sum(),
        total_customers_needed,
        final_revenue: revenue,
        years,
    })
}

/// The year1..year5 figures the client actually entered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedBudget {
    pub years: [Option<f64>; BUDGET_YEARS],
    pub total: f64,
    pub year1_percent_of_revenue: Option<f64>,
}

/// `None` when no year has been entered.
pub fn planned_budget(record: &AnalysisRecord) -> Option<PlannedBudget> {
    let years = record.budget.years();
    if years.iter().all(Option::is_none) {
        return None;
    }
    Some(PlannedBudget {
        years,
        total: years.iter().flatten().sum(),
        year1_percent_of_revenue: match (years[0], record.company.annual_revenue) {
            (Some(y1), Some(rev)) => percent_of(y1, rev),
            _ => None,
        },
    })
}
