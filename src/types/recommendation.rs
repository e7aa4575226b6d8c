//! Thermostat threshold recommendation types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Setting keys emitted in a recommendation's settings map
pub mod setting_keys {
    pub const HEAT_DIFFERENTIAL: &str = "heatDifferential";
    pub const HEAT_MIN_ON_TIME: &str = "heatMinOnTime";
    pub const COOL_DIFFERENTIAL: &str = "coolDifferential";
    pub const COOL_MIN_ON_TIME: &str = "coolMinOnTime";
    pub const AUX_HEAT_MAX_OUTDOOR_TEMP: &str = "auxHeatMaxOutdoorTemp";
}

/// Named tuning profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecommendationProfile {
    #[serde(rename = "short-cycle mitigation")]
    ShortCycleMitigation,
    #[serde(rename = "aux-lockout tuning")]
    AuxLockoutTuning,
    #[serde(rename = "balanced")]
    Balanced,
    #[serde(rename = "insufficient data")]
    InsufficientData,
}

impl RecommendationProfile {
    pub fn label(&self) -> &'static str {
        match self {
            RecommendationProfile::ShortCycleMitigation => "short-cycle mitigation",
            RecommendationProfile::AuxLockoutTuning => "aux-lockout tuning",
            RecommendationProfile::Balanced => "balanced",
            RecommendationProfile::InsufficientData => "insufficient data",
        }
    }
}

impl std::fmt::Display for RecommendationProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Signals the recommendation was derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationMetadata {
    pub balance_point: Option<f64>,
    pub heat_loss_factor: f64,
    pub cycles_per_hour: f64,
}

/// Settings bundle plus the justification for it.
///
/// `settings` is empty when no actionable signal exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdRecommendation {
    pub profile: RecommendationProfile,
    pub reason: String,
    pub settings: BTreeMap<String, f64>,
    pub metadata: RecommendationMetadata,
}
