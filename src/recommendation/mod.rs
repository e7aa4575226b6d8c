//! Threshold Recommendation Engine
//!
//! Turns the resolved heat loss, balance point and short-cycle statistics into
//! a named thermostat tuning profile. A setting is only emitted when the
//! signal behind it was actually observed; with nothing actionable the
//! settings map stays empty.

use std::collections::BTreeMap;

use tracing::debug;

use crate::types::{
    setting_keys, BalancePointResult, DifferentialMethod, DifferentialRecommendation,
    HeatLossEstimate, HeatLossSource, RecommendationMetadata, RecommendationProfile,
    ShortCycleReport, ThresholdRecommendation,
};

/// Build the recommendation for one analysis run.
///
/// `capacity_balance_point` only backs the auxiliary lockout when no balance
/// point was observed and the heat loss is measured or design-based; a
/// generic default is too coarse to set a lockout from.
pub fn recommend_thresholds(
    heat_loss: &HeatLossEstimate,
    balance: &BalancePointResult,
    capacity_balance_point: Option<f64>,
    short_cycle: &ShortCycleReport,
) -> ThresholdRecommendation {
    let min_on_time = crate::config::get().short_cycle.min_on_time_minutes;
    let mut settings = BTreeMap::new();
    let mut reasons = Vec::new();

    if let Some(heat) = &short_cycle.heat {
        settings.insert(setting_keys::HEAT_DIFFERENTIAL.to_string(), heat.differential);
        settings.insert(setting_keys::HEAT_MIN_ON_TIME.to_string(), min_on_time);
        reasons.push(differential_reason("heating", short_cycle.heat_short_cycles, heat));
    }
    if let Some(cool) = &short_cycle.cool {
        settings.insert(setting_keys::COOL_DIFFERENTIAL.to_string(), cool.differential);
        settings.insert(setting_keys::COOL_MIN_ON_TIME.to_string(), min_on_time);
        reasons.push(differential_reason("cooling", short_cycle.cool_short_cycles, cool));
    }
    let differential_changes = !settings.is_empty();

    let lockout = match (balance.outdoor_temp_threshold, capacity_balance_point) {
        (Some(observed), _) => Some((
            observed.ceil(),
            format!(
                "auxiliary heat ran at up to {observed:.1} °F outdoors across {} samples",
                balance.aux_samples
            ),
        )),
        (None, Some(capacity)) if heat_loss.source() != HeatLossSource::Default => Some((
            capacity.ceil(),
            format!(
                "rated heat-pump capacity stops covering {} heat loss below {capacity:.1} °F",
                heat_loss.source()
            ),
        )),
        _ => None,
    };
    if let Some((temp, why)) = lockout {
        settings.insert(setting_keys::AUX_HEAT_MAX_OUTDOOR_TEMP.to_string(), temp);
        reasons.push(format!("lock out auxiliary heat above {temp:.0} °F: {why}"));
    }

    let profile = if differential_changes {
        RecommendationProfile::ShortCycleMitigation
    } else if !settings.is_empty() {
        RecommendationProfile::AuxLockoutTuning
    } else if short_cycle.observed_hours > 0.0 {
        RecommendationProfile::Balanced
    } else {
        RecommendationProfile::InsufficientData
    };

    let reason = match profile {
        RecommendationProfile::Balanced => format!(
            "No short cycling or auxiliary heat in {:.1} h of data; current settings look fine",
            short_cycle.observed_hours
        ),
        RecommendationProfile::InsufficientData => {
            "No runtime data to base a recommendation on".to_string()
        }
        _ => capitalize(&reasons.join("; ")),
    };

    debug!(%profile, settings = settings.len(), "Threshold recommendation");

    ThresholdRecommendation {
        profile,
        reason,
        settings,
        metadata: RecommendationMetadata {
            balance_point: balance.outdoor_temp_threshold,
            heat_loss_factor: heat_loss.value(),
            cycles_per_hour: short_cycle.cycles_per_hour,
        },
    }
}

fn differential_reason(mode: &str, cycles: usize, rec: &DifferentialRecommendation) -> String {
    match rec.method {
        DifferentialMethod::TemperatureOffset => format!(
            "{cycles} {mode} short cycles starting {:.2} °F from setpoint on average; widen the {mode} differential to {:.2} °F",
            rec.average_offset.unwrap_or_default(),
            rec.differential
        ),
        DifferentialMethod::CycleFrequency => format!(
            "{cycles} {mode} short cycles ({:.2}/h) without setpoint data; widen the {mode} differential to {:.2} °F",
            rec.cycles_per_hour, rec.differential
        ),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn measured(value: f64) -> HeatLossEstimate {
        HeatLossEstimate::Measured {
            value,
            explanation: String::new(),
            thermal_mass: 14_400.0,
            decay_rate: value / 14_400.0,
        }
    }

    fn default_estimate(value: f64) -> HeatLossEstimate {
        HeatLossEstimate::Default {
            value,
            explanation: String::new(),
        }
    }

    fn quiet(hours: f64) -> ShortCycleReport {
        ShortCycleReport {
            total_samples: hours as usize,
            observed_hours: hours,
            short_cycles: 0,
            heat_short_cycles: 0,
            cool_short_cycles: 0,
            cycles_per_hour: 0.0,
            heat: None,
            cool: None,
        }
    }

    fn no_aux() -> BalancePointResult {
        BalancePointResult {
            outdoor_temp_threshold: None,
            aux_samples: 0,
        }
    }

    #[test]
    fn test_short_cycle_profile() {
        let mut sc = quiet(96.0);
        sc.short_cycles = 8;
        sc.heat_short_cycles = 8;
        sc.cycles_per_hour = 8.0 / 96.0;
        sc.heat = Some(DifferentialRecommendation {
            differential: 1.0,
            method: DifferentialMethod::TemperatureOffset,
            average_offset: Some(0.8),
            measurements: 8,
            cycles_per_hour: 8.0 / 96.0,
        });
        let aux = BalancePointResult {
            outdoor_temp_threshold: Some(24.3),
            aux_samples: 5,
        };

        let rec = recommend_thresholds(&measured(284.2), &aux, None, &sc);
        assert_eq!(rec.profile, RecommendationProfile::ShortCycleMitigation);
        assert_eq!(rec.settings[setting_keys::HEAT_DIFFERENTIAL], 1.0);
        assert_eq!(rec.settings[setting_keys::HEAT_MIN_ON_TIME], 5.0);
        assert_eq!(rec.settings[setting_keys::AUX_HEAT_MAX_OUTDOOR_TEMP], 25.0);
        assert!(!rec.settings.contains_key(setting_keys::COOL_DIFFERENTIAL));
        assert_eq!(rec.metadata.balance_point, Some(24.3));
        assert!((rec.metadata.heat_loss_factor - 284.2).abs() < 1e-12);
    }

    #[test]
    fn test_aux_lockout_profile() {
        let aux = BalancePointResult {
            outdoor_temp_threshold: Some(-3.5),
            aux_samples: 2,
        };
        let rec = recommend_thresholds(&measured(300.0), &aux, Some(10.0), &quiet(48.0));
        assert_eq!(rec.profile, RecommendationProfile::AuxLockoutTuning);
        // observed wins over capacity
        assert_eq!(rec.settings[setting_keys::AUX_HEAT_MAX_OUTDOOR_TEMP], -3.0);
        assert_eq!(rec.settings.len(), 1);
    }

    #[test]
    fn test_capacity_balance_point_backs_lockout() {
        let rec = recommend_thresholds(&measured(284.2), &no_aux(), Some(8.4), &quiet(96.0));
        assert_eq!(rec.profile, RecommendationProfile::AuxLockoutTuning);
        assert_eq!(rec.settings[setting_keys::AUX_HEAT_MAX_OUTDOOR_TEMP], 9.0);
        assert_eq!(rec.metadata.balance_point, None);
    }

    #[test]
    fn test_default_heat_loss_does_not_set_lockout() {
        let rec = recommend_thresholds(
            &default_estimate(600.0),
            &no_aux(),
            Some(20.0),
            &quiet(96.0),
        );
        assert_eq!(rec.profile, RecommendationProfile::Balanced);
        assert!(rec.settings.is_empty());
    }

    #[test]
    fn test_insufficient_data_is_empty() {
        let rec = recommend_thresholds(&default_estimate(600.0), &no_aux(), None, &quiet(0.0));
        assert_eq!(rec.profile, RecommendationProfile::InsufficientData);
        assert!(rec.settings.is_empty());
        assert_eq!(rec.profile.label(), "insufficient data");
    }
}
