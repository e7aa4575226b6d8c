//! Shared data structures for building thermal analysis
//!
//! - `Sample`, `BuildingConfig`: inputs, normalized upstream
//! - Coast-down, decay, heat-loss, balance point, short-cycle results
//! - `ThresholdRecommendation`: thermostat tuning output
//! - `AnalysisReport`: everything the report layer renders

mod building;
mod recommendation;
mod report;
mod sample;
mod thermal;

pub use building::*;
pub use recommendation::*;
pub use report::*;
pub use sample::*;
pub use thermal::*;
