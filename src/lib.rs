//! Joule Thermal: building thermal analysis from thermostat history
//!
//! Estimates how a building loses heat and how its heat pump keeps up, then
//! suggests thermostat thresholds.
//!
//! ## Architecture
//!
//! - **Thermal detectors**: coast-down periods, decay fit, balance point, short cycling
//! - **Heat-loss resolution**: measured → design basis → generic default
//! - **Recommendation engine**: differential and auxiliary-heat lockout settings
//! - **Pipeline**: `ThermalAnalyzer` runs all of the above per building or zone

pub mod config;
pub mod heat_loss;
pub mod pipeline;
pub mod recommendation;
pub mod thermal;
pub mod types;

// Re-export configuration
pub use config::AnalyzerConfig;

// Re-export commonly used types
pub use types::{
    AnalysisReport, BalancePointResult, BuildingConfig, CoastDownDiagnostics, CoastDownPeriod,
    DecayEstimate, HeatLossEstimate, HeatLossSource, RecommendationProfile, Sample,
    ShortCycleReport, ThresholdRecommendation,
};

// Re-export the analysis entry points
pub use heat_loss::{resolve_heat_loss, DesignLookup, DesignLookupError};
pub use pipeline::{AnalysisError, AnalysisInput, ThermalAnalyzer, ZoneInput, ZoneReport};
pub use recommendation::recommend_thresholds;
pub use thermal::EstimatorError;
