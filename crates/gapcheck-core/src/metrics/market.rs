use crate::numeric::percent_of;
use crate::record::AnalysisRecord;
use serde::Serialize;

/// `audience_size × buyer_rate / 100`.
pub fn total_buyers(audience_size: Option<f64>, buyer_rate: Option<f64>) -> Option<f64> {
    Some(audience_size? * (buyer_rate? / 100.0))
}

/// `total_buyers × annual_customer_value`.
pub fn total_market_revenue(
    total_buyers: Option<f64>,
    annual_customer_value: Option<f64>,
) -> Option<f64> {
    Some(total_buyers? * annual_customer_value?)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarketShare {
    pub share_percent: f64,
    pub gap_percent: f64,
}

/// Share of the total market captured by `annual_revenue`, and the remaining gap.
///
/// `None` when either input is missing or the market revenue is zero.
pub fn market_share(
    annual_revenue: Option<f64>,
    total_market_revenue: Option<f64>,
) -> Option<MarketShare> {
    let share = percent_of(annual_revenue?, total_market_revenue?)?;
    Some(MarketShare {
        share_percent: share,
        gap_percent: 100.0 - share,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MarketSummary {
    pub total_buyers: Option<f64>,
    pub total_market_revenue: Option<f64>,
    pub share: Option<MarketShare>,
}

pub fn summarize(record: &AnalysisRecord) -> MarketSummary {
    let buyers = total_buyers(record.market.audience_size, record.market.buyer_rate);
    let revenue = total_market_revenue(buyers, record.market.annual_customer_value);
    MarketSummary {
        total_buyers: buyers,
        total_market_revenue: revenue,
        share: market_share(record.company.annual_revenue, revenue),
    }
}
