//! Thermal Analysis Module
//!
//! Deterministic detectors and estimators over a building's sample history.
//! Everything here is a pure, synchronous function of its inputs: no I/O, no
//! shared mutable state, identical output for identical input.
//!
//! - `find_coast_down()` - longest heating-off run of at least 3 hours
//! - `estimate_decay()` - heat-loss factor from the indoor temperature decay
//! - `find_balance_point()` - warmest outdoor temperature with auxiliary heat
//! - `capacity_balance_point()` - where rated heat-pump capacity runs out
//! - `analyze_short_cycles()` - sub-5-minute runs and differential advice

pub mod balance_point;
pub mod coast_down;
pub mod decay;
pub mod short_cycle;

pub use balance_point::{capacity_balance_point, capacity_factor, find_balance_point};
pub use coast_down::{find_coast_down, find_coast_down_with};
pub use decay::{check_plausible, estimate_decay};
pub use short_cycle::{analyze_short_cycles, frequency_differential, offset_differential};

use thiserror::Error;

use crate::types::{CoastDownDiagnostics, Sample};

// ============================================================================
// Error Types
// ============================================================================

/// Why the measured heat-loss tier produced nothing.
///
/// All variants are recoverable: the resolution stack falls through to the
/// design and default tiers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimatorError {
    #[error(
        "No qualifying coast-down period: longest heating-off run was {:.1} h, {:.1} h required",
        .0.longest_off_hours,
        .0.required_off_hours
    )]
    NoQualifyingCoastDownPeriod(CoastDownDiagnostics),

    #[error("Indoor temperature did not fall during the coast-down (drop {temperature_drop:.2} °F)")]
    InvalidDecay { temperature_drop: f64 },

    #[error("Average indoor/outdoor difference must be positive (got {average_delta_t:.2} °F)")]
    InvalidDeltaT { average_delta_t: f64 },

    #[error("Heat-loss factor {value:.1} BTU/hr/°F is outside the plausible range (0, {max:.0})")]
    OutOfBoundsEstimate { value: f64, max: f64 },
}

impl EstimatorError {
    /// Diagnostic counters, when the failure was a missing coast-down period.
    pub fn diagnostics(&self) -> Option<&CoastDownDiagnostics> {
        match self {
            EstimatorError::NoQualifyingCoastDownPeriod(d) => Some(d),
            _ => None,
        }
    }
}

// ============================================================================
// Sample Spacing
// ============================================================================

/// Typical spacing between samples, in hours.
///
/// Median of the positive timestamp gaps, so a few missing rows do not skew
/// it. Falls back to the configured default for series with fewer than two
/// distinct timestamps.
pub fn sample_interval_hours(samples: &[Sample]) -> f64 {
    let mut gaps: Vec<f64> = samples
        .windows(2)
        .map(|w| (w[1].timestamp - w[0].timestamp).num_milliseconds() as f64 / 1000.0)
        .filter(|gap| *gap > 0.0)
        .collect();

    if gaps.is_empty() {
        return crate::config::get().coast_down.default_sample_interval_secs / 3600.0;
    }

    gaps.sort_by(f64::total_cmp);
    let mid = gaps.len() / 2;
    let median_secs = if gaps.len() % 2 == 0 {
        (gaps[mid - 1] + gaps[mid]) / 2.0
    } else {
        gaps[mid]
    };
    median_secs / 3600.0
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{DateTime, Duration, TimeZone, Utc};

    use crate::types::Sample;

    pub fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).unwrap()
    }

    /// `count` samples at `step_minutes` spacing, heat running a full interval.
    pub fn heating_series(count: usize, step_minutes: i64) -> Vec<Sample> {
        (0..count)
            .map(|i| {
                let mut s = Sample::idle(
                    t0() + Duration::minutes(step_minutes * i as i64),
                    70.0,
                    30.0,
                );
                s.heat_runtime_sec = (step_minutes * 60) as f64;
                s
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_interval_hourly() {
        let samples = heating_series(10, 60);
        assert!((sample_interval_hours(&samples) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_interval_ignores_single_gap() {
        let mut samples = heating_series(10, 5);
        samples.remove(4);
        let hours = sample_interval_hours(&samples);
        assert!((hours - 5.0 / 60.0).abs() < 1e-12, "got {hours}");
    }

    #[test]
    fn test_interval_fallback_for_single_sample() {
        let samples = heating_series(1, 5);
        assert!((sample_interval_hours(&samples) - 300.0 / 3600.0).abs() < 1e-12);
    }
}
