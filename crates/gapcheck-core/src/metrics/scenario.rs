use super::market::total_buyers;
use crate::numeric::percent_of;
use crate::record::{AnalysisRecord, FunnelType};
use serde::{Deserialize, Serialize};

/// Percentage-point increases applied to the three funnel stages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Increases {
    pub visibility: f64,
    pub conversion: f64,
    pub closing: f64,
}

impl Increases {
    /// The increases saved on the record; unanswered ones count as 0.
    pub fn from_record(record: &AnalysisRecord) -> Self {
        let s = &record.scenario;
        Increases {
            visibility: s.visibility_increase.unwrap_or(0.0),
            conversion: s.conversion_increase.unwrap_or(0.0),
            closing: s.closing_increase.unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectedStage {
    pub label: &'static str,
    pub current_rate: f64,
    pub projected_rate: f64,
    pub current_count: f64,
    pub projected_count: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioProjection {
    pub funnel_type: FunnelType,
    pub increases: Increases,
    pub stages: Vec<ProjectedStage>,
    pub current_customers: f64,
    pub projected_customers: f64,
    pub current_revenue: f64,
    pub projected_revenue: f64,
    pub revenue_delta: f64,
    /// `None` when current revenue is zero.
    pub revenue_delta_percent: Option<f64>,
}

/// Apply a percentage-point increase, capped at 100 (or the current rate if it
/// is already above 100).
fn raise(rate: f64, increase: f64) -> f64 {
    if increase == 0.0 {
        return rate;
    }
    (rate + increase).clamp(0.0, rate.max(100.0))
}

/// Project one stage. `base` is the (current, projected) count of the stage
/// before it.
fn stage(label: &'static str, base: (f64, f64), count: f64, increase: f64) -> Option<ProjectedStage> {
    let (base_now, base_next) = base;
    let rate = percent_of(count, base_now)?;
    let projected_rate = raise(rate, increase);
    // unchanged stages keep the observed count exactly
    let projected_count = if projected_rate == rate && base_next == base_now {
        count
    } else {
        base_next * projected_rate / 100.0
    };
    Some(ProjectedStage {
        label,
        current_rate: rate,
        projected_rate,
        current_count: count,
        projected_count,
    })
}

/// Project revenue for the record's funnel after applying `increases`.
///
/// Reach is measured against the total buyers (`audience × buyer rate`), not
/// the raw audience. Returns `None` unless total buyers is non-zero and every
/// stage count the funnel type needs and the annual customer value are
/// present. For retail the repeat stage is optional and shown for context
/// only; revenue-bearing customers are the purchasers.
pub fn project(record: &AnalysisRecord, increases: Increases) -> Option<ScenarioProjection> {
    let buyers = total_buyers(record.market.audience_size, record.market.buyer_rate)
        .filter(|b| *b > 0.0)?;
    let value = record.market.annual_customer_value?;
    let f = &record.funnel;

    let (stages, current_customers, projected_customers) = match f.funnel_type {
        FunnelType::LeadGeneration => {
            let reach = stage(
                "Market visibility",
                (buyers, buyers),
                f.website_visitors?,
                increases.visibility,
            )?;
            let conversion = stage(
                "Lead conversion",
                (reach.current_count, reach.projected_count),
                f.leads?,
                increases.conversion,
            )?;
            let close = stage(
                "Closing",
                (conversion.current_count, conversion.projected_count),
                f.closed_accounts?,
                increases.closing,
            )?;
            let (now, next) = (close.current_count, close.projected_count);
            (vec![reach, conversion, close], now, next)
        }
        FunnelType::Retail => {
            let traffic = stage(
                "Store traffic",
                (buyers, buyers),
                f.store_visitors?,
                increases.visibility,
            )?;
            let purchase = stage(
                "Purchase",
                (traffic.current_count, traffic.projected_count),
                f.purchasers?,
                increases.conversion,
            )?;
            let repeat = f.repeat_customers.and_then(|r| {
                stage(
                    "Repeat",
                    (purchase.current_count, purchase.projected_count),
                    r,
                    increases.closing,
                )
            });
            let (now, next) = (purchase.current_count, purchase.projected_count);
            let mut stages = vec![traffic, purchase];
            stages.extend(repeat);
            (stages, now, next)
        }
    };

    let current_revenue = current_customers * value;
    let projected_revenue = projected_customers * value;
    let revenue_delta = projected_revenue - current_revenue;
    Some(ScenarioProjection {
        funnel_type: f.funnel_type,
        increases,
        stages,
        current_customers,
        projected_customers,
        current_revenue,
        projected_revenue,
        revenue_delta,
        revenue_delta_percent: percent_of(revenue_delta, current_revenue),
    })
}
