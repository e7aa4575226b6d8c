//! Short-cycle analysis
//!
//! Flags sampling intervals whose combined runtime is positive but under the
//! minimum viable cycle length, then suggests a wider thermostat differential
//! per mode. With setpoints available the suggestion scales the observed
//! setpoint offset at cycle start; without them it falls back to a
//! cycle-frequency heuristic.

use statrs::statistics::Statistics;
use tracing::debug;

use super::sample_interval_hours;
use crate::config::ShortCycleConfig;
use crate::types::{DifferentialMethod, DifferentialRecommendation, Sample, ShortCycleReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Heat,
    Cool,
}

impl Mode {
    /// Signed offset that triggered a call: deficit for heat, excess for cool.
    fn offset(self, sample: &Sample) -> Option<f64> {
        match self {
            Mode::Heat => sample.heat_setpoint.map(|sp| sp - sample.indoor_temp),
            Mode::Cool => sample.cool_setpoint.map(|sp| sample.indoor_temp - sp),
        }
    }
}

#[derive(Default)]
struct ModeTally {
    cycles: usize,
    offsets: Vec<f64>,
}

/// Differential from the average setpoint offset, clamped to the configured band.
pub fn offset_differential(average_offset: f64) -> f64 {
    let cfg = &crate::config::get().short_cycle;
    if !average_offset.is_finite() {
        return cfg.min_differential_f;
    }
    (average_offset * cfg.differential_multiplier)
        .clamp(cfg.min_differential_f, cfg.max_differential_f)
}

/// Differential from cycle frequency alone (cycles per hour).
pub fn frequency_differential(cycles_per_hour: f64) -> f64 {
    let cfg = &crate::config::get().short_cycle;
    if cycles_per_hour > cfg.high_cycle_rate {
        cfg.high_rate_differential_f
    } else if cycles_per_hour > cfg.moderate_cycle_rate {
        cfg.moderate_rate_differential_f
    } else {
        cfg.low_rate_differential_f
    }
}

/// Scan the full sample series for short cycles.
pub fn analyze_short_cycles(samples: &[Sample]) -> ShortCycleReport {
    let cfg = &crate::config::get().short_cycle;
    let observed_hours = if samples.is_empty() {
        0.0
    } else {
        samples.len() as f64 * sample_interval_hours(samples)
    };

    let mut short_cycles = 0usize;
    let mut heat = ModeTally::default();
    let mut cool = ModeTally::default();

    for (i, sample) in samples.iter().enumerate() {
        let runtime = sample.total_runtime_sec();
        if !(runtime > 0.0 && runtime < cfg.min_cycle_secs) {
            continue;
        }
        short_cycles += 1;

        let (mode, tally) = if sample.heat_runtime_sec > 0.0 {
            (Mode::Heat, &mut heat)
        } else if sample.cool_runtime_sec > 0.0 {
            (Mode::Cool, &mut cool)
        } else {
            continue;
        };
        tally.cycles += 1;
        if let Some(offset) = offset_before(samples, i, mode, cfg) {
            tally.offsets.push(offset);
        }
    }

    let per_hour = |n: usize| {
        if observed_hours > 0.0 {
            n as f64 / observed_hours
        } else {
            0.0
        }
    };

    let report = ShortCycleReport {
        total_samples: samples.len(),
        observed_hours,
        short_cycles,
        heat_short_cycles: heat.cycles,
        cool_short_cycles: cool.cycles,
        cycles_per_hour: per_hour(short_cycles),
        heat: recommend(&heat, per_hour(heat.cycles)),
        cool: recommend(&cool, per_hour(cool.cycles)),
    };

    debug!(
        short_cycles,
        heat = heat.cycles,
        cool = cool.cycles,
        cycles_per_hour = report.cycles_per_hour,
        "Short-cycle scan complete"
    );
    report
}

/// Offset at the most recent resting sample within the lookback window.
///
/// The search stops at the first resting sample; if that sample lacks the
/// relevant setpoint no measurement is taken for this cycle.
fn offset_before(
    samples: &[Sample],
    index: usize,
    mode: Mode,
    cfg: &ShortCycleConfig,
) -> Option<f64> {
    let floor = index.saturating_sub(cfg.lookback_samples);
    (floor..index)
        .rev()
        .map(|j| &samples[j])
        .find(|s| s.is_system_off())
        .and_then(|s| mode.offset(s))
        .filter(|offset| offset.is_finite())
}

fn recommend(tally: &ModeTally, cycles_per_hour: f64) -> Option<DifferentialRecommendation> {
    if tally.cycles == 0 {
        return None;
    }
    if tally.offsets.is_empty() {
        return Some(DifferentialRecommendation {
            differential: frequency_differential(cycles_per_hour),
            method: DifferentialMethod::CycleFrequency,
            average_offset: None,
            measurements: 0,
            cycles_per_hour,
        });
    }
    let average = tally.offsets.iter().copied().mean();
    Some(DifferentialRecommendation {
        differential: offset_differential(average),
        method: DifferentialMethod::TemperatureOffset,
        average_offset: Some(average),
        measurements: tally.offsets.len(),
        cycles_per_hour,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thermal::test_support::heating_series;

    /// Hourly heating series with resting samples before each short heat cycle.
    fn with_heat_short_cycles(at: &[usize], setpoint: Option<f64>, indoor: f64) -> Vec<Sample> {
        let mut samples = heating_series(24, 60);
        for &i in at {
            samples[i - 1].heat_runtime_sec = 0.0;
            samples[i - 1].heat_setpoint = setpoint;
            samples[i - 1].indoor_temp = indoor;
            samples[i].heat_runtime_sec = 180.0;
        }
        samples
    }

    #[test]
    fn test_no_short_cycles() {
        let report = analyze_short_cycles(&heating_series(24, 60));
        assert_eq!(report.short_cycles, 0);
        assert!(!report.has_short_cycles());
        assert!(report.heat.is_none());
        assert!(report.cool.is_none());
        assert!((report.observed_hours - 24.0).abs() < 1e-9);
    }

    #[test]
    fn test_boundaries_are_open() {
        let mut samples = heating_series(6, 60);
        samples[1].heat_runtime_sec = 300.0;
        samples[2].heat_runtime_sec = 0.0;
        samples[3].heat_runtime_sec = 299.0;
        let report = analyze_short_cycles(&samples);
        assert_eq!(report.short_cycles, 1);
        assert_eq!(report.heat_short_cycles, 1);
    }

    #[test]
    fn test_offset_method() {
        // 68 °F setpoint, 67.2 °F indoor at rest → 0.8 °F deficit → 1.0 °F
        let samples = with_heat_short_cycles(&[5, 12], Some(68.0), 67.2);
        let report = analyze_short_cycles(&samples);
        let heat = report.heat.unwrap();
        assert_eq!(heat.method, DifferentialMethod::TemperatureOffset);
        assert_eq!(heat.measurements, 2);
        assert!((heat.average_offset.unwrap() - 0.8).abs() < 1e-9);
        assert!((heat.differential - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_frequency_fallback_without_setpoints() {
        let samples = with_heat_short_cycles(&[5, 12], None, 67.0);
        let heat = analyze_short_cycles(&samples).heat.unwrap();
        assert_eq!(heat.method, DifferentialMethod::CycleFrequency);
        assert_eq!(heat.measurements, 0);
        assert!((heat.differential - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_lookback_window_limit() {
        // resting sample six rows back is outside the window
        let mut samples = heating_series(24, 60);
        samples[3].heat_runtime_sec = 0.0;
        samples[3].heat_setpoint = Some(70.0);
        samples[9].heat_runtime_sec = 120.0;
        let heat = analyze_short_cycles(&samples).heat.unwrap();
        assert_eq!(heat.method, DifferentialMethod::CycleFrequency);
    }

    #[test]
    fn test_cooling_uses_excess() {
        let mut samples = heating_series(12, 60);
        for s in samples.iter_mut() {
            s.heat_runtime_sec = 0.0;
            s.cool_runtime_sec = 3600.0;
        }
        samples[6].cool_runtime_sec = 0.0;
        samples[6].cool_setpoint = Some(74.0);
        samples[6].indoor_temp = 75.0;
        samples[7].cool_runtime_sec = 200.0;

        let report = analyze_short_cycles(&samples);
        assert_eq!(report.cool_short_cycles, 1);
        assert!(report.heat.is_none());
        let cool = report.cool.unwrap();
        assert!((cool.average_offset.unwrap() - 1.0).abs() < 1e-9);
        assert!((cool.differential - 1.25).abs() < 1e-9);
    }

    #[test]
    fn test_differential_clamp() {
        for avg in [-3.0, 0.0, 0.1, 0.39, 0.8, 1.6, 2.5, 40.0, f64::NAN] {
            let d = offset_differential(avg);
            assert!((0.5..=2.0).contains(&d), "avg {avg} gave {d}");
        }
        assert_eq!(offset_differential(40.0), 2.0);
        assert_eq!(offset_differential(0.1), 0.5);
    }

    #[test]
    fn test_differential_is_not_rounded() {
        assert!((offset_differential(1.0) - 1.25).abs() < 1e-12);
        assert!((offset_differential(0.44) - 0.55).abs() < 1e-12);
        assert!((offset_differential(1.1) - 1.375).abs() < 1e-12);
    }

    #[test]
    fn test_frequency_bands() {
        assert_eq!(frequency_differential(7.0), 1.5);
        assert_eq!(frequency_differential(6.0), 1.0);
        assert_eq!(frequency_differential(4.5), 1.0);
        assert_eq!(frequency_differential(4.0), 0.75);
        assert_eq!(frequency_differential(0.0), 0.75);
    }

    #[test]
    fn test_empty_series() {
        let report = analyze_short_cycles(&[]);
        assert_eq!(report.total_samples, 0);
        assert_eq!(report.cycles_per_hour, 0.0);
    }
}
