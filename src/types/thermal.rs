//! Thermal analysis outputs: coast-down windows, decay fits, heat-loss tiers,
//! balance point and short-cycle statistics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Coast-Down
// ============================================================================

/// Contiguous run of samples with heating and auxiliary heat fully off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoastDownPeriod {
    pub start_index: usize,
    /// Inclusive
    pub end_index: usize,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_hours: f64,
    pub start_indoor_temp: f64,
    pub end_indoor_temp: f64,
    pub avg_indoor_temp: f64,
    pub avg_outdoor_temp: f64,
}

impl CoastDownPeriod {
    pub fn sample_count(&self) -> usize {
        self.end_index - self.start_index + 1
    }
}

/// Why no coast-down period qualified.
///
/// Carried by the "no qualifying period" outcome so the caller can tell the
/// user how much more heating-off data to collect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoastDownDiagnostics {
    pub total_points: usize,
    pub off_rows: usize,
    pub longest_off_hours: f64,
    pub required_off_hours: f64,
}

impl CoastDownDiagnostics {
    /// Hours of additional continuous off-time needed to qualify.
    pub fn missing_hours(&self) -> f64 {
        (self.required_off_hours - self.longest_off_hours).max(0.0)
    }
}

// ============================================================================
// Thermal Decay
// ============================================================================

/// Measured heat-loss fit from a coast-down period.
///
/// Every intermediate is retained for audit display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecayEstimate {
    pub duration_hours: f64,
    /// °F, start minus end indoor temperature
    pub temperature_drop: f64,
    /// °F/hr
    pub hourly_loss_rate: f64,
    /// °F, average indoor minus average outdoor
    pub average_delta_t: f64,
    /// K, °F/hr per °F of indoor/outdoor difference
    pub decay_rate: f64,
    /// BTU/°F
    pub thermal_mass: f64,
    /// BTU/hr/°F
    pub heat_loss_factor: f64,
    /// BTU/hr at the 70 °F reference difference
    pub total_heat_loss_at_design_delta_t: f64,
}

// ============================================================================
// Heat-Loss Resolution
// ============================================================================

/// Which tier of the resolution stack produced the heat-loss factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeatLossSource {
    Measured,
    Design,
    Default,
}

impl std::fmt::Display for HeatLossSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HeatLossSource::Measured => write!(f, "measured"),
            HeatLossSource::Design => write!(f, "design"),
            HeatLossSource::Default => write!(f, "default"),
        }
    }
}

/// Resolved heat-loss factor, tagged with the tier that produced it.
///
/// Confidence differs by roughly an order of magnitude between tiers, so the
/// tier is part of the type rather than a side flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum HeatLossEstimate {
    /// Fitted from a coast-down period in this building's own data
    #[serde(rename_all = "camelCase")]
    Measured {
        value: f64,
        explanation: String,
        thermal_mass: f64,
        decay_rate: f64,
    },
    /// From a design report or Manual-J style calculation
    #[serde(rename_all = "camelCase")]
    Design {
        value: f64,
        explanation: String,
        method: String,
    },
    /// Archetype multipliers on square footage, no external input
    #[serde(rename_all = "camelCase")]
    Default { value: f64, explanation: String },
}

impl HeatLossEstimate {
    /// BTU/hr/°F
    pub fn value(&self) -> f64 {
        match self {
            HeatLossEstimate::Measured { value, .. }
            | HeatLossEstimate::Design { value, .. }
            | HeatLossEstimate::Default { value, .. } => *value,
        }
    }

    pub fn source(&self) -> HeatLossSource {
        match self {
            HeatLossEstimate::Measured { .. } => HeatLossSource::Measured,
            HeatLossEstimate::Design { .. } => HeatLossSource::Design,
            HeatLossEstimate::Default { .. } => HeatLossSource::Default,
        }
    }

    pub fn explanation(&self) -> &str {
        match self {
            HeatLossEstimate::Measured { explanation, .. }
            | HeatLossEstimate::Design { explanation, .. }
            | HeatLossEstimate::Default { explanation, .. } => explanation,
        }
    }

    /// Total heat loss (BTU/hr) at the given indoor/outdoor difference.
    pub fn total_at(&self, delta_t: f64) -> f64 {
        self.value() * delta_t
    }
}

// ============================================================================
// Balance Point
// ============================================================================

/// Highest outdoor temperature at which auxiliary heat was observed running.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalancePointResult {
    /// `None` when auxiliary heat never ran in the window. That is not the
    /// same as a very low balance point: the window may never have been cold
    /// enough to need it.
    pub outdoor_temp_threshold: Option<f64>,
    pub aux_samples: usize,
}

// ============================================================================
// Short Cycling
// ============================================================================

/// How a differential recommendation was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DifferentialMethod {
    /// Scaled from the measured setpoint offset when the system last rested
    TemperatureOffset,
    /// Setpoint columns missing; tiered on short cycles per hour
    CycleFrequency,
}

/// Recommended differential for one mode (heat or cool).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifferentialRecommendation {
    /// °F
    pub differential: f64,
    pub method: DifferentialMethod,
    /// Average heat deficit or cool excess (°F) when offsets were measured
    pub average_offset: Option<f64>,
    pub measurements: usize,
    pub cycles_per_hour: f64,
}

/// Short-cycle statistics over the full sample window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortCycleReport {
    pub total_samples: usize,
    pub observed_hours: f64,
    pub short_cycles: usize,
    pub heat_short_cycles: usize,
    pub cool_short_cycles: usize,
    /// All short cycles per observed hour
    pub cycles_per_hour: f64,
    pub heat: Option<DifferentialRecommendation>,
    pub cool: Option<DifferentialRecommendation>,
}

impl ShortCycleReport {
    pub fn has_short_cycles(&self) -> bool {
        self.short_cycles > 0
    }
}
