//! Analysis Pipeline
//!
//! Entry point for callers: input deserialization, input validation, and the
//! [`ThermalAnalyzer`] that runs detectors, resolution stack and
//! recommendation engine in order.

mod analyzer;

pub use analyzer::ThermalAnalyzer;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{AnalysisReport, BuildingConfig, Sample};

/// Errors raised to the caller. Only malformed input and setup faults qualify;
/// estimator failures never surface here.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Invalid building config: {0}")]
    InvalidBuilding(String),

    #[error("Invalid sample at index {index}: {reason}")]
    InvalidSample { index: usize, reason: String },

    #[error("Malformed analysis input: {0}")]
    Input(#[from] serde_json::Error),

    #[error("Analyzer setup failed: {0}")]
    Setup(String),

    #[error("Analysis task failed: {0}")]
    Task(String),
}

/// Serialized analysis request: building metadata plus its sample history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisInput {
    pub building: BuildingConfig,
    pub samples: Vec<Sample>,
}

impl AnalysisInput {
    pub fn from_json(raw: &str) -> Result<Self, AnalysisError> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// One zone of a multi-zone building.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneInput {
    pub name: String,
    pub building: BuildingConfig,
    pub samples: Vec<Sample>,
}

/// Per-zone outcome of [`ThermalAnalyzer::analyze_zones`].
#[derive(Debug)]
pub struct ZoneReport {
    pub name: String,
    pub result: Result<AnalysisReport, AnalysisError>,
}
