use crate::numeric::ratio;
use crate::record::AnalysisRecord;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CustomerMix {
    pub total: f64,
    pub new: Option<f64>,
    pub current: Option<f64>,
}

/// Customers implied by revenue and customer value, split by the new/current
/// percentages. Counts are rounded to whole customers.
pub fn customer_mix(record: &AnalysisRecord) -> Option<CustomerMix> {
    let total = ratio(
        record.company.annual_revenue?,
        record.market.annual_customer_value?,
    )?
    .round();
    let split = |pct: Option<f64>| pct.map(|p| (total * p / 100.0).round());
    Some(CustomerMix {
        total,
        new: split(record.company.percent_new_customers),
        current: split(record.company.percent_current_customers),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_total_customers() {
        let mut r = AnalysisRecord::new("Acme");
        r.company.annual_revenue = Some(1_000_000.0);
        r.market.annual_customer_value = Some(2_000.0);
        r.company.percent_new_customers = Some(30.0);
        let mix = customer_mix(&r).unwrap();
        assert_eq!(mix.total, 500.0);
        assert_eq!(mix.new, Some(150.0));
        assert_eq!(mix.current, None);
    }

    #[test]
    fn zero_customer_value_is_none() {
        let mut r = AnalysisRecord::new("Acme");
        r.company.annual_revenue = Some(1_000_000.0);
        r.market.annual_customer_value = Some(0.0);
        assert!(customer_mix(&r).is_none());
        r.market.annual_customer_value = None;
        assert!(customer_mix(&r).is_none());
    }
}
