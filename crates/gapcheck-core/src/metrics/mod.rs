//! Derived metrics. Everything here is a pure function of an
//! [`AnalysisRecord`](crate::record::AnalysisRecord); missing inputs and zero
//! denominators produce `None` rather than NaN.

pub mod budget;
pub mod channels;
pub mod customers;
pub mod funnel;
pub mod market;
pub mod scenario;

pub use budget::{BudgetAssumptions, PlannedBudget, SbaProjection};
pub use channels::ChannelTotals;
pub use customers::CustomerMix;
pub use funnel::{FunnelGaps, StageGap};
pub use market::{MarketShare, MarketSummary};
pub use scenario::{Increases, ScenarioProjection};

use crate::record::AnalysisRecord;
use serde::Serialize;

/// Every derived figure for one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    pub market: MarketSummary,
    pub customers: Option<CustomerMix>,
    pub funnel: FunnelGaps,
    pub scenario: Option<ScenarioProjection>,
    pub sba: Option<SbaProjection>,
    pub planned_budget: Option<PlannedBudget>,
    pub channels: Option<ChannelTotals>,
}

impl Metrics {
    pub fn compute(record: &AnalysisRecord, assumptions: BudgetAssumptions) -> Self {
        Metrics {
            market: market::summarize(record),
            customers: customers::customer_mix(record),
            funnel: funnel::funnel_gaps(record),
            scenario: scenario::project(record, Increases::from_record(record)),
            sba: budget::project_sba(
                record.company.annual_revenue,
                record.market.annual_customer_value,
                assumptions,
            ),
            planned_budget: budget::planned_budget(record),
            channels: channels::channel_totals(record),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_record_has_no_results() {
        let m = Metrics::compute(&AnalysisRecord::default(), BudgetAssumptions::default());
        assert_eq!(m.market, MarketSummary::default());
        assert!(m.customers.is_none());
        assert!(m.funnel.stages().is_empty());
        assert!(m.scenario.is_none());
        assert!(m.sba.is_none());
        assert!(m.planned_budget.is_none());
        assert!(m.channels.is_none());
    }

    #[test]
    fn metrics_serialize_without_nan() {
        let mut r = AnalysisRecord::new("Acme");
        r.market.audience_size = Some(0.0);
        r.market.buyer_rate = Some(5.0);
        r.market.annual_customer_value = Some(0.0);
        r.company.annual_revenue = Some(0.0);
        r.funnel.website_visitors = Some(0.0);
        r.funnel.leads = Some(0.0);
        let m = Metrics::compute(&r, BudgetAssumptions::default());
        let json = serde_json::to_string(&m).unwrap();
        assert!(!json.contains("NaN"));
        assert!(!json.contains("inf"));
    }
}
