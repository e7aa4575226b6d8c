//! Analysis report handed to the presentation layer

use serde::{Deserialize, Serialize};

use super::{
    CoastDownDiagnostics, CoastDownPeriod, DecayEstimate, HeatLossSource,
    ShortCycleReport, ThresholdRecommendation,
};

/// Result of one analysis run over a building's sample history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// BTU/hr/°F
    pub heat_loss_factor: f64,
    /// BTU/hr at `temp_diff`
    pub heat_loss_total: f64,
    /// °F, `None` when auxiliary heat never ran
    pub balance_point: Option<f64>,
    /// °F where rated capacity stops covering the resolved heat loss
    pub capacity_balance_point: Option<f64>,
    /// Reference indoor/outdoor difference used for `heat_loss_total`
    pub temp_diff: f64,
    pub heat_loss_source: HeatLossSource,
    pub heat_loss_explanation: String,
    pub coast_down_period: Option<CoastDownPeriod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decay: Option<DecayEstimate>,
    /// Present only when no coast-down period qualified; flattened so the
    /// counters sit at the top level of the report
    #[serde(flatten)]
    pub diagnostics: Option<CoastDownDiagnostics>,
    pub short_cycle: ShortCycleReport,
    pub recommendation: ThresholdRecommendation,
}
