//! Sample: one normalized thermostat observation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One time-stamped thermostat observation, already normalized upstream.
///
/// Temperatures are °F. Runtime fields are seconds of equipment operation
/// within the sampling interval that ends at `timestamp`. Samples arrive
/// sorted ascending by timestamp; the analyzer never re-sorts them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub indoor_temp: f64,
    pub outdoor_temp: f64,
    #[serde(default)]
    pub heat_runtime_sec: f64,
    #[serde(default)]
    pub cool_runtime_sec: f64,
    #[serde(default)]
    pub aux_runtime_sec: f64,
    /// Compressor stage runtime, reported separately by some heat-pump thermostats
    #[serde(default)]
    pub compressor_runtime_sec: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heat_setpoint: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cool_setpoint: Option<f64>,
}

impl Sample {
    /// Sample with only temperatures populated; all equipment idle.
    pub fn idle(timestamp: DateTime<Utc>, indoor_temp: f64, outdoor_temp: f64) -> Self {
        Self {
            timestamp,
            indoor_temp,
            outdoor_temp,
            heat_runtime_sec: 0.0,
            cool_runtime_sec: 0.0,
            aux_runtime_sec: 0.0,
            compressor_runtime_sec: 0.0,
            heat_setpoint: None,
            cool_setpoint: None,
        }
    }

    /// Heating system (primary and auxiliary) reported no runtime.
    pub fn is_heat_off(&self) -> bool {
        self.heat_runtime_sec == 0.0 && self.aux_runtime_sec == 0.0
    }

    /// Combined heat + cool + compressor runtime for the interval.
    pub fn total_runtime_sec(&self) -> f64 {
        self.heat_runtime_sec + self.cool_runtime_sec + self.compressor_runtime_sec
    }

    /// Nothing ran during the interval.
    pub fn is_system_off(&self) -> bool {
        self.total_runtime_sec() == 0.0 && self.aux_runtime_sec == 0.0
    }

    /// Check the invariants the analyzer relies on.
    ///
    /// Returns a description of the first violation found.
    pub fn check(&self) -> Result<(), String> {
        if !self.indoor_temp.is_finite() {
            return Err(format!("indoorTemp must be finite (got {})", self.indoor_temp));
        }
        if !self.outdoor_temp.is_finite() {
            return Err(format!("outdoorTemp must be finite (got {})", self.outdoor_temp));
        }
        let runtimes = [
            ("heatRuntimeSec", self.heat_runtime_sec),
            ("coolRuntimeSec", self.cool_runtime_sec),
            ("auxRuntimeSec", self.aux_runtime_sec),
            ("compressorRuntimeSec", self.compressor_runtime_sec),
        ];
        for (name, value) in runtimes {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{name} must be a finite value >= 0 (got {value})"));
            }
        }
        Ok(())
    }
}
