//! Balance point detection
//!
//! Two views of the same question, kept separate:
//! - observed: the warmest outdoor temperature at which auxiliary heat ran
//! - capacity: where the heat pump's derated output stops covering the
//!   building's heat loss

use tracing::debug;

use crate::config::defaults::{
    CAPACITY_CUTOFF_TEMP_F, CAPACITY_RATED_TEMP_F, CAPACITY_SCAN_START_F, CAPACITY_SCAN_STEP_F,
    DESIGN_INDOOR_TEMP_F,
};
use crate::types::{BalancePointResult, Sample};

/// Maximum outdoor temperature among samples with auxiliary heat runtime.
///
/// Absent, not zero, when auxiliary heat never ran.
pub fn find_balance_point(samples: &[Sample]) -> BalancePointResult {
    let (threshold, aux_samples) = samples
        .iter()
        .filter(|s| s.aux_runtime_sec > 0.0)
        .fold((None::<f64>, 0usize), |(max, n), s| {
            let max = Some(max.map_or(s.outdoor_temp, |m| m.max(s.outdoor_temp)));
            (max, n + 1)
        });

    debug!(?threshold, aux_samples, "Balance point scan complete");

    BalancePointResult {
        outdoor_temp_threshold: threshold,
        aux_samples,
    }
}

/// Fraction of rated heat-pump output available at an outdoor temperature.
///
/// Full output at 47 °F and above, a 1.2 %/°F slope down to 17 °F (64 %),
/// 1 %/°F below that, and nothing at or below the -15 °F cutoff.
pub fn capacity_factor(outdoor_temp: f64) -> f64 {
    if outdoor_temp <= CAPACITY_CUTOFF_TEMP_F {
        return 0.0;
    }
    if outdoor_temp >= CAPACITY_RATED_TEMP_F {
        return 1.0;
    }
    if outdoor_temp < 17.0 {
        return (0.64 - (17.0 - outdoor_temp) * 0.01).max(0.0);
    }
    1.0 - (CAPACITY_RATED_TEMP_F - outdoor_temp) * 0.012
}

/// Outdoor temperature (°F) below which rated capacity no longer covers heat loss.
///
/// `heat_loss_factor` is BTU/hr/°F, `capacity_kbtu` is rated output in
/// kBTU/hr. Scans downward from 65 °F and interpolates the crossing between
/// grid points. `None` when capacity is unknown or covers the load all the
/// way to the compressor cutoff.
pub fn capacity_balance_point(heat_loss_factor: f64, capacity_kbtu: f64) -> Option<f64> {
    if !(heat_loss_factor > 0.0) || !(capacity_kbtu > 0.0) {
        return None;
    }

    let surplus = |t: f64| {
        capacity_kbtu * 1000.0 * capacity_factor(t) - heat_loss_factor * (DESIGN_INDOOR_TEMP_F - t)
    };

    let mut prev_t = CAPACITY_SCAN_START_F;
    let mut prev_surplus = surplus(prev_t);
    if prev_surplus <= 0.0 {
        return Some(prev_t);
    }

    // Stop one step short of the cutoff, where capacity is zero by definition
    let steps = ((CAPACITY_SCAN_START_F - CAPACITY_CUTOFF_TEMP_F) / CAPACITY_SCAN_STEP_F) as usize;
    for step in 1..steps {
        let t = CAPACITY_SCAN_START_F - step as f64 * CAPACITY_SCAN_STEP_F;
        let s = surplus(t);
        if s <= 0.0 {
            let crossing = prev_t + (t - prev_t) * prev_surplus / (prev_surplus - s);
            let rounded = (crossing * 10.0).round() / 10.0;
            debug!(
                heat_loss_factor,
                capacity_kbtu,
                balance_point = rounded,
                "Capacity balance point"
            );
            return Some(rounded);
        }
        prev_t = t;
        prev_surplus = s;
    }
    None
}
