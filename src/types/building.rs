//! Building metadata supplied alongside the sample history

use serde::{Deserialize, Serialize};

/// Immutable description of the building, passed once at the analysis entry point.
///
/// `capacity` is the primary heat-pump output in kBTU/hr (36 = 3 tons); zero
/// when unknown. `insulation_level` and `home_shape` are multipliers around 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingConfig {
    pub square_feet: f64,
    pub insulation_level: f64,
    pub home_shape: f64,
    pub ceiling_height: f64,
    pub capacity: f64,
    /// Open upper floor that shares conditioned air with the main level
    #[serde(default)]
    pub has_loft: bool,
    /// IECC climate zone (1-7), enables the simplified Manual-J design estimate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub climate_zone: Option<u8>,
    /// Design heat loss from an energy audit or load report, BTU/hr at the 70 °F reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design_heat_loss_btu_hr: Option<f64>,
}

impl Default for BuildingConfig {
    fn default() -> Self {
        Self {
            square_feet: 1500.0,
            insulation_level: 1.0,
            home_shape: 1.0,
            ceiling_height: 8.0,
            capacity: 0.0,
            has_loft: false,
            climate_zone: None,
            design_heat_loss_btu_hr: None,
        }
    }
}

impl BuildingConfig {
    /// Validate required fields. Returns every violation, not just the first.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        let positive = [
            ("squareFeet", self.square_feet),
            ("insulationLevel", self.insulation_level),
            ("homeShape", self.home_shape),
            ("ceilingHeight", self.ceiling_height),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                errors.push(format!("{name} must be a finite value > 0 (got {value})"));
            }
        }

        if !self.capacity.is_finite() || self.capacity < 0.0 {
            errors.push(format!(
                "capacity must be a finite value >= 0 (got {})",
                self.capacity
            ));
        }

        if let Some(zone) = self.climate_zone {
            if !(1..=7).contains(&zone) {
                errors.push(format!("climateZone must be 1-7 (got {zone})"));
            }
        }

        if let Some(design) = self.design_heat_loss_btu_hr {
            if !design.is_finite() || design <= 0.0 {
                errors.push(format!(
                    "designHeatLossBtuHr must be a finite value > 0 (got {design})"
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Whether the metadata carries enough detail for a design-basis estimate.
    pub fn has_design_basis(&self) -> bool {
        self.design_heat_loss_btu_hr.is_some() || self.climate_zone.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_building_is_valid() {
        assert!(BuildingConfig::default().validate().is_ok());
    }

    #[test]
    fn collects_every_violation() {
        let building = BuildingConfig {
            square_feet: 0.0,
            ceiling_height: f64::NAN,
            capacity: -1.0,
            climate_zone: Some(9),
            ..Default::default()
        };
        let errors = building.validate().unwrap_err();
        assert_eq!(errors.len(), 4, "{errors:?}");
        assert!(errors[0].contains("squareFeet"));
    }

    #[test]
    fn design_basis_requires_zone_or_figure() {
        let mut building = BuildingConfig::default();
        assert!(!building.has_design_basis());
        building.climate_zone = Some(5);
        assert!(building.has_design_basis());
    }
}
