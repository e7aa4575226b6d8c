//! Thermal decay estimator
//!
//! Treats the building as a single lumped thermal mass. During a coast-down
//! the indoor temperature falls at a rate proportional to the indoor/outdoor
//! difference:
//!
//! ```text
//! K = (ΔT_indoor / hours) / (T_indoor_avg - T_outdoor_avg)     [1/hr]
//! UA = C × K                                                   [BTU/hr/°F]
//! C  = square_feet × 8 BTU/°F/ft²
//! ```
//!
//! The thermal-mass constant is an approximation for framed construction,
//! not calibrated per building.

use tracing::debug;

use super::EstimatorError;
use crate::config::defaults::REFERENCE_DELTA_T_F;
use crate::types::{CoastDownPeriod, DecayEstimate};

/// Fit a heat-loss factor from a qualifying coast-down period.
pub fn estimate_decay(
    period: &CoastDownPeriod,
    square_feet: f64,
) -> Result<DecayEstimate, EstimatorError> {
    let cfg = &crate::config::get().decay;

    let temperature_drop = period.start_indoor_temp - period.end_indoor_temp;
    if !(temperature_drop > 0.0) {
        return Err(EstimatorError::InvalidDecay { temperature_drop });
    }

    let hourly_loss_rate = temperature_drop / period.duration_hours;

    let average_delta_t = period.avg_indoor_temp - period.avg_outdoor_temp;
    if !(average_delta_t > 0.0) {
        return Err(EstimatorError::InvalidDeltaT { average_delta_t });
    }

    let decay_rate = hourly_loss_rate / average_delta_t;
    let thermal_mass = square_feet * cfg.thermal_mass_per_sqft;
    let heat_loss_factor = thermal_mass * decay_rate;
    let total_heat_loss_at_design_delta_t = heat_loss_factor * REFERENCE_DELTA_T_F;

    debug!(
        temperature_drop,
        hourly_loss_rate,
        average_delta_t,
        decay_rate,
        thermal_mass,
        heat_loss_factor,
        "Decay fit"
    );

    Ok(DecayEstimate {
        duration_hours: period.duration_hours,
        temperature_drop,
        hourly_loss_rate,
        average_delta_t,
        decay_rate,
        thermal_mass,
        heat_loss_factor,
        total_heat_loss_at_design_delta_t,
    })
}

/// Reject factors that cannot describe a real building.
///
/// Valid range is the open interval (0, `max_plausible_factor`).
pub fn check_plausible(estimate: &DecayEstimate) -> Result<(), EstimatorError> {
    let max = crate::config::get().decay.max_plausible_factor;
    let value = estimate.heat_loss_factor;
    if value.is_finite() && value > 0.0 && value < max {
        Ok(())
    } else {
        Err(EstimatorError::OutOfBoundsEstimate { value, max })
    }
}
