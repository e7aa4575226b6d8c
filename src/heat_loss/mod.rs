//! Heat-Loss Resolution Stack
//!
//! Resolves one authoritative heat-loss factor by trying, strictly in order:
//!
//! 1. **Measured** - the decay estimator's fit, if it succeeded and is plausible
//! 2. **Design** - a [`DesignLookup`], bounded by a timeout and a cancellation token
//! 3. **Default** - archetype multipliers on square footage, always succeeds
//!
//! Tiers are never merged. Every failure along the way is logged and folded
//! into the explanation of the tier that finally answered.

pub mod default_model;
pub mod design;

pub use default_model::{default_heat_loss, DefaultHeatLoss};
pub use design::{
    ChainedLookup, DesignHeatLoss, DesignLookup, DesignLookupError, HttpDesignLookup,
    ManualJLookup, NoDesignLookup,
};

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::thermal::{check_plausible, EstimatorError};
use crate::types::{BuildingConfig, DecayEstimate, HeatLossEstimate};

/// Resolve the heat-loss factor for one analysis run.
///
/// Never fails: the default tier always produces a value.
pub async fn resolve_heat_loss(
    measured: &Result<DecayEstimate, EstimatorError>,
    building: &BuildingConfig,
    lookup: &dyn DesignLookup,
    timeout: Duration,
    cancel: &CancellationToken,
) -> HeatLossEstimate {
    // Tier a: measured
    let measured_miss = match measured {
        Ok(estimate) => match check_plausible(estimate) {
            Ok(()) => {
                info!(
                    factor = estimate.heat_loss_factor,
                    hours = estimate.duration_hours,
                    "Heat loss resolved from coast-down data"
                );
                return HeatLossEstimate::Measured {
                    value: estimate.heat_loss_factor,
                    explanation: format!(
                        "Measured from a {:.1} h coast-down: indoor fell {:.1} °F at an average {:.1} °F indoor/outdoor difference",
                        estimate.duration_hours, estimate.temperature_drop, estimate.average_delta_t
                    ),
                    thermal_mass: estimate.thermal_mass,
                    decay_rate: estimate.decay_rate,
                };
            }
            Err(e) => {
                warn!(error = %e, "Measured heat loss rejected");
                e.to_string()
            }
        },
        Err(e) => e.to_string(),
    };

    // Tier b: design
    let design_miss = match lookup_design(building, lookup, timeout, cancel).await {
        Ok(design) => {
            info!(
                factor = design.factor,
                method = %design.method,
                lookup = lookup.name(),
                "Heat loss resolved from design basis"
            );
            return HeatLossEstimate::Design {
                value: design.factor,
                explanation: format!(
                    "Design estimate ({}). Not measured: {}",
                    design.note, measured_miss
                ),
                method: design.method,
            };
        }
        Err(e) => {
            warn!(error = %e, lookup = lookup.name(), "Design lookup failed, using default model");
            e.to_string()
        }
    };

    // Tier c: default
    let d = default_heat_loss(building);
    info!(factor = d.factor, total = d.total_btu_hr, "Heat loss resolved from default model");
    HeatLossEstimate::Default {
        value: d.factor,
        explanation: format!(
            "Generic estimate of {:.0} BTU/hr from {:.0} ft² and home characteristics. Not measured: {}. No design basis: {}",
            d.total_btu_hr, d.effective_square_feet, measured_miss, design_miss
        ),
    }
}

/// Run the design lookup under a deadline and the caller's cancellation token.
async fn lookup_design(
    building: &BuildingConfig,
    lookup: &dyn DesignLookup,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<DesignHeatLoss, DesignLookupError> {
    let result = tokio::select! {
        _ = cancel.cancelled() => Err(DesignLookupError::Cancelled),
        res = tokio::time::timeout(timeout, lookup.design_heat_loss(building)) => {
            res.unwrap_or(Err(DesignLookupError::Timeout(timeout)))
        }
    }?;

    let max = crate::config::get().decay.max_plausible_factor;
    if !(result.factor.is_finite() && result.factor > 0.0 && result.factor < max) {
        return Err(DesignLookupError::InvalidResponse(format!(
            "design factor {:.1} BTU/hr/°F outside (0, {max:.0})",
            result.factor
        )));
    }
    Ok(result)
}
