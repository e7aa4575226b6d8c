//! Generic default heat-loss model
//!
//! Square footage scaled by archetype multipliers. No data, no I/O, always
//! produces a positive value.

use crate::config::defaults::REFERENCE_DELTA_T_F;
use crate::types::BuildingConfig;

/// Archetype-based heat loss for a building.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DefaultHeatLoss {
    /// BTU/hr at the reference indoor/outdoor difference, rounded
    pub total_btu_hr: f64,
    /// BTU/hr/°F
    pub factor: f64,
    /// Floor area actually counted after the loft adjustment (ft²)
    pub effective_square_feet: f64,
}

/// Total heat loss from square footage, insulation, shape and ceiling height.
///
/// A loft only discounts floor area for the cabin-style shape band
/// (1.2 ≤ shape < 1.3), where the upper level shares one air volume.
pub fn default_heat_loss(building: &BuildingConfig) -> DefaultHeatLoss {
    let cfg = &crate::config::get().default_model;

    let ceiling_mult =
        1.0 + (building.ceiling_height - cfg.reference_ceiling_ft) * cfg.ceiling_step_per_ft;
    let effective_square_feet =
        if building.has_loft && (1.2..1.3).contains(&building.home_shape) {
            building.square_feet * cfg.loft_area_fraction
        } else {
            building.square_feet
        };

    let raw = effective_square_feet
        * cfg.btu_per_sqft_at_reference
        * building.insulation_level
        * building.home_shape
        * ceiling_mult;

    let total_btu_hr = ((raw / cfg.rounding_btu).round() * cfg.rounding_btu).max(cfg.rounding_btu);

    DefaultHeatLoss {
        total_btu_hr,
        factor: total_btu_hr / REFERENCE_DELTA_T_F,
        effective_square_feet,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_home() {
        let building = BuildingConfig {
            square_feet: 2000.0,
            ..BuildingConfig::default()
        };
        // 2000 × 22.67 = 45,340 → 45,000
        let d = default_heat_loss(&building);
        assert_eq!(d.total_btu_hr, 45_000.0);
        assert!((d.factor - 45_000.0 / 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_tall_ceilings_and_poor_insulation() {
        let building = BuildingConfig {
            square_feet: 1500.0,
            insulation_level: 1.4,
            ceiling_height: 10.0,
            ..BuildingConfig::default()
        };
        // 1500 × 22.67 × 1.4 × 1.2 = 57,128.4 → 57,000
        assert_eq!(default_heat_loss(&building).total_btu_hr, 57_000.0);
    }

    #[test]
    fn test_loft_discount_only_for_cabin_shape() {
        let cabin = BuildingConfig {
            square_feet: 1000.0,
            home_shape: 1.25,
            has_loft: true,
            ..BuildingConfig::default()
        };
        assert!((default_heat_loss(&cabin).effective_square_feet - 650.0).abs() < 1e-9);

        let ranch = BuildingConfig {
            home_shape: 1.0,
            ..cabin.clone()
        };
        assert!((default_heat_loss(&ranch).effective_square_feet - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_never_rounds_to_zero() {
        let shed = BuildingConfig {
            square_feet: 10.0,
            ..BuildingConfig::default()
        };
        let d = default_heat_loss(&shed);
        assert!(d.factor > 0.0);
        assert_eq!(d.total_btu_hr, 1_000.0);
    }

    #[test]
    fn test_deterministic() {
        let building = BuildingConfig::default();
        assert_eq!(default_heat_loss(&building), default_heat_loss(&building));
    }
}
