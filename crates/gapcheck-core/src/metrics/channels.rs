use crate::numeric::percent_of;
use crate::record::AnalysisRecord;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChannelTotals {
    pub channel_count: usize,
    pub monthly_spend: f64,
    pub annual_spend: f64,
    /// Annual spend as a percentage of annual revenue.
    pub percent_of_revenue: Option<f64>,
}

/// Totals across marketing channels. Channels without a spend figure count
/// toward `channel_count` only. `None` when no channels are listed.
pub fn channel_totals(record: &AnalysisRecord) -> Option<ChannelTotals> {
    if record.channels.is_empty() {
        return None;
    }
    let monthly: f64 = record.channels.iter().filter_map(|c| c.monthly_spend).sum();
    let annual = monthly * 12.0;
    Some(ChannelTotals {
        channel_count: record.channels.len(),
        monthly_spend: monthly,
        annual_spend: annual,
        percent_of_revenue: record
            .company
            .annual_revenue
            .and_then(|rev| percent_of(annual, rev)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::MarketingChannel;

    fn channel(name: &str, spend: Option<f64>) -> MarketingChannel {
        MarketingChannel {
            name: name.to_string(),
            monthly_spend: spend,
            notes: None,
        }
    }

    #[test]
    fn sums_monthly_and_annual() {
        let mut r = AnalysisRecord::new("Acme");
        r.company.annual_revenue = Some(240_000.0);
        r.channels = vec![
            channel("Google Ads", Some(1_500.0)),
            channel("SEO", Some(500.0)),
            channel("Referrals", None),
        ];
        let t = channel_totals(&r).unwrap();
        assert_eq!(t.channel_count, 3);
        assert_eq!(t.monthly_spend, 2_000.0);
        assert_eq!(t.annual_spend, 24_000.0);
        assert_eq!(t.percent_of_revenue, Some(10.0));
    }

    #[test]
    fn no_channels_is_none() {
        assert!(channel_totals(&AnalysisRecord::default()).is_none());
    }
}
