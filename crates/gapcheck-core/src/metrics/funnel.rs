use crate::numeric::percent_of;
use crate::record::{AnalysisRecord, FunnelType};
use serde::Serialize;

/// One funnel stage: the observed conversion rate and the gap to 100%.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StageGap {
    pub rate: f64,
    pub gap: f64,
}

impl StageGap {
    /// `numerator / denominator` as a stage. `None` when either count is
    /// missing or the denominator is zero.
    pub fn between(numerator: Option<f64>, denominator: Option<f64>) -> Option<StageGap> {
        let rate = percent_of(numerator?, denominator?)?;
        Some(StageGap {
            rate,
            gap: 100.0 - rate,
        })
    }
}

/// Funnel gaps for a record.
///
/// Lead generation fills `visibility`, `lead_conversion` and `closing`.
/// Retail fills `visibility` (store traffic), `closing` (purchase rate) and
/// `repeat`; its `lead_conversion` is always `None`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FunnelGaps {
    pub funnel_type: FunnelType,
    pub visibility: Option<StageGap>,
    pub lead_conversion: Option<StageGap>,
    pub closing: Option<StageGap>,
    pub repeat: Option<StageGap>,
}

impl FunnelGaps {
    /// Display labels for each populated stage, in funnel order.
    pub fn stages(&self) -> Vec<(&'static str, StageGap)> {
        let labels: [(&'static str, Option<StageGap>); 4] = match self.funnel_type {
            FunnelType::LeadGeneration => [
                ("Market visibility", self.visibility),
                ("Lead conversion", self.lead_conversion),
                ("Closing", self.closing),
                ("Repeat", self.repeat),
            ],
            FunnelType::Retail => [
                ("Store traffic", self.visibility),
                ("Lead conversion", self.lead_conversion),
                ("Purchase", self.closing),
                ("Repeat", self.repeat),
            ],
        };
        labels
            .into_iter()
            .filter_map(|(label, stage)| stage.map(|s| (label, s)))
            .collect()
    }
}

pub fn funnel_gaps(record: &AnalysisRecord) -> FunnelGaps {
    let f = &record.funnel;
    let audience = record.market.audience_size;
    match f.funnel_type {
        FunnelType::LeadGeneration => FunnelGaps {
            funnel_type: FunnelType::LeadGeneration,
            visibility: StageGap::between(f.website_visitors, audience),
            lead_conversion: StageGap::between(f.leads, f.website_visitors),
            closing: StageGap::between(f.closed_accounts, f.leads),
            repeat: None,
        },
        FunnelType::Retail => FunnelGaps {
            funnel_type: FunnelType::Retail,
            visibility: StageGap::between(f.store_visitors, audience),
            lead_conversion: None,
            closing: StageGap::between(f.purchasers, f.store_visitors),
            repeat: StageGap::between(f.repeat_customers, f.purchasers),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lead_gen() -> AnalysisRecord {
        let mut r = AnalysisRecord::new("Acme");
        r.market.audience_size = Some(100_000.0);
        r.funnel.website_visitors = Some(20_000.0);
        r.funnel.leads = Some(1_000.0);
        r.funnel.closed_accounts = Some(250.0);
        r
    }

    #[test]
    fn lead_generation_stages() {
        let g = funnel_gaps(&lead_gen());
        assert_eq!(g.visibility, Some(StageGap { rate: 20.0, gap: 80.0 }));
        assert_eq!(g.lead_conversion, Some(StageGap { rate: 5.0, gap: 95.0 }));
        assert_eq!(g.closing, Some(StageGap { rate: 25.0, gap: 75.0 }));
        assert!(g.repeat.is_none());
        assert_eq!(g.stages().len(), 3);
    }

    #[test]
    fn reach_plus_visibility_gap_is_one_hundred() {
        for (visitors, audience) in [(1.0, 3.0), (12_345.0, 67_890.0), (7.0, 7.0), (150.0, 100.0)] {
            let stage = StageGap::between(Some(visitors), Some(audience)).unwrap();
            assert!((stage.rate + stage.gap - 100.0).abs() < 1e-9);
        }
    }

    #[test]
    fn zero_or_missing_audience_yields_none() {
        let mut r = lead_gen();
        r.market.audience_size = Some(0.0);
        let g = funnel_gaps(&r);
        assert!(g.visibility.is_none());
        assert!(g.lead_conversion.is_some());

        r.market.audience_size = None;
        assert!(funnel_gaps(&r).visibility.is_none());
    }

    #[test]
    fn retail_skips_lead_conversion() {
        let mut r = AnalysisRecord::new("Shop");
        r.funnel.funnel_type = FunnelType::Retail;
        r.market.audience_size = Some(50_000.0);
        r.funnel.store_visitors = Some(5_000.0);
        r.funnel.purchasers = Some(1_000.0);
        r.funnel.repeat_customers = Some(400.0);
        // lead-gen counts are ignored for retail
        r.funnel.leads = Some(10.0);

        let g = funnel_gaps(&r);
        assert_eq!(g.visibility.map(|s| s.rate), Some(10.0));
        assert!(g.lead_conversion.is_none());
        assert_eq!(g.closing.map(|s| s.rate), Some(20.0));
        assert_eq!(g.repeat.map(|s| s.gap), Some(60.0));

        let labels: Vec<_> = g.stages().into_iter().map(|(l, _)| l).collect();
        assert_eq!(labels, ["Store traffic", "Purchase", "Repeat"]);
    }
}
