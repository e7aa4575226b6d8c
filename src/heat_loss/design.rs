//! Design-basis heat-loss lookups
//!
//! The one asynchronous boundary of the analysis. Implementations turn
//! building metadata into a heat-loss factor from a design report, a
//! simplified Manual-J calculation or a remote load-calculation service.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::defaults::{
    design_heating_temp_for_zone, DESIGN_INDOOR_TEMP_F, REFERENCE_DELTA_T_F,
};
use crate::types::BuildingConfig;

/// Design lookup errors
#[derive(Debug, thiserror::Error)]
pub enum DesignLookupError {
    #[error("Building metadata is not rich enough for a design estimate: {0}")]
    InsufficientMetadata(String),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Server returned status {0}")]
    ServerStatus(u16),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Design lookup timed out after {0:?}")]
    Timeout(Duration),
    #[error("Design lookup cancelled")]
    Cancelled,
}

/// Heat-loss factor from a design source.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignHeatLoss {
    /// BTU/hr/°F
    pub factor: f64,
    /// Short name of the calculation, e.g. "manual-j"
    pub method: String,
    /// Human-readable detail for the report
    pub note: String,
}

/// Trait for design-basis heat-loss sources
#[async_trait]
pub trait DesignLookup: Send + Sync {
    /// Resolve a design heat-loss factor for the building
    async fn design_heat_loss(
        &self,
        building: &BuildingConfig,
    ) -> Result<DesignHeatLoss, DesignLookupError>;

    /// Source name for logging
    fn name(&self) -> &'static str;
}

// ============================================================================
// Local Manual-J
// ============================================================================

/// Design figure from building metadata, computed in-process.
///
/// Prefers an explicit design heat loss from an audit or load report. Falls
/// back to a simplified Manual-J (0.32 BTU/hr/°F per ft² × insulation) when a
/// climate zone is known.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualJLookup;

impl ManualJLookup {
    pub fn calculate(building: &BuildingConfig) -> Result<DesignHeatLoss, DesignLookupError> {
        let reference = REFERENCE_DELTA_T_F;

        if let Some(total) = building.design_heat_loss_btu_hr {
            return Ok(DesignHeatLoss {
                factor: total / reference,
                method: "design-report".to_string(),
                note: format!(
                    "design report figure of {total:.0} BTU/hr at {reference:.0} °F ΔT"
                ),
            });
        }

        let zone = building.climate_zone.ok_or_else(|| {
            DesignLookupError::InsufficientMetadata(
                "needs a design heat-loss figure or a climate zone".to_string(),
            )
        })?;

        let factor = building.square_feet
            * crate::config::defaults::MANUAL_J_BTU_PER_SQFT_PER_F
            * building.insulation_level;
        let design_temp = design_heating_temp_for_zone(zone).ok_or_else(|| {
            DesignLookupError::InsufficientMetadata(format!("unknown climate zone {zone}"))
        })?;
        let design_load = factor * (DESIGN_INDOOR_TEMP_F - design_temp);

        Ok(DesignHeatLoss {
            factor,
            method: "manual-j".to_string(),
            note: format!(
                "simplified Manual-J for climate zone {zone}: {design_load:.0} BTU/hr at a {design_temp:.0} °F design day"
            ),
        })
    }
}

#[async_trait]
impl DesignLookup for ManualJLookup {
    async fn design_heat_loss(
        &self,
        building: &BuildingConfig,
    ) -> Result<DesignHeatLoss, DesignLookupError> {
        Self::calculate(building)
    }

    fn name(&self) -> &'static str {
        "manual-j"
    }
}

// ============================================================================
// Remote Load-Calculation Service
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoadRequest<'a> {
    square_feet: f64,
    insulation_level: f64,
    home_shape: f64,
    ceiling_height: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    climate_zone: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    design_heat_loss_btu_hr: Option<f64>,
    source: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoadResponse {
    heating_load_btu_hr: f64,
    #[serde(default)]
    design_heating_temp: Option<f64>,
    #[serde(default)]
    method: Option<String>,
}

/// HTTP client for a remote load-calculation service
#[derive(Clone)]
pub struct HttpDesignLookup {
    http: reqwest::Client,
    base_url: String,
}

impl HttpDesignLookup {
    /// Create a client for the service at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, DesignLookupError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn to_factor(resp: &LoadResponse) -> Result<f64, DesignLookupError> {
        if !resp.heating_load_btu_hr.is_finite() || resp.heating_load_btu_hr <= 0.0 {
            return Err(DesignLookupError::InvalidResponse(format!(
                "heatingLoadBtuHr must be positive (got {})",
                resp.heating_load_btu_hr
            )));
        }
        let delta = resp
            .design_heating_temp
            .map(|t| DESIGN_INDOOR_TEMP_F - t)
            .filter(|d| d.is_finite() && *d > 0.0)
            .unwrap_or(REFERENCE_DELTA_T_F);
        Ok(resp.heating_load_btu_hr / delta)
    }
}

#[async_trait]
impl DesignLookup for HttpDesignLookup {
    async fn design_heat_loss(
        &self,
        building: &BuildingConfig,
    ) -> Result<DesignHeatLoss, DesignLookupError> {
        let body = LoadRequest {
            square_feet: building.square_feet,
            insulation_level: building.insulation_level,
            home_shape: building.home_shape,
            ceiling_height: building.ceiling_height,
            climate_zone: building.climate_zone,
            design_heat_loss_btu_hr: building.design_heat_loss_btu_hr,
            source: "joule-thermal",
        };

        let resp = self
            .http
            .post(format!("{}/api/energyplus/calculate", self.base_url))
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(DesignLookupError::ServerStatus(status.as_u16()));
        }

        let load: LoadResponse = resp
            .json()
            .await
            .map_err(|e| DesignLookupError::InvalidResponse(e.to_string()))?;
        let factor = Self::to_factor(&load)?;
        debug!(url = %self.base_url, factor, "Remote design lookup succeeded");

        let method = load.method.unwrap_or_else(|| "remote".to_string());
        Ok(DesignHeatLoss {
            factor,
            note: format!(
                "{} load calculation: {:.0} BTU/hr",
                method, load.heating_load_btu_hr
            ),
            method,
        })
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

// ============================================================================
// Composition
// ============================================================================

/// Lookup that never has a design figure.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDesignLookup;

#[async_trait]
impl DesignLookup for NoDesignLookup {
    async fn design_heat_loss(
        &self,
        _building: &BuildingConfig,
    ) -> Result<DesignHeatLoss, DesignLookupError> {
        Err(DesignLookupError::InsufficientMetadata(
            "no design source configured".to_string(),
        ))
    }

    fn name(&self) -> &'static str {
        "none"
    }
}

/// Try each lookup in order; first success wins, last error is returned.
pub struct ChainedLookup {
    lookups: Vec<Arc<dyn DesignLookup>>,
}

impl ChainedLookup {
    pub fn new(lookups: Vec<Arc<dyn DesignLookup>>) -> Self {
        Self { lookups }
    }
}

#[async_trait]
impl DesignLookup for ChainedLookup {
    async fn design_heat_loss(
        &self,
        building: &BuildingConfig,
    ) -> Result<DesignHeatLoss, DesignLookupError> {
        let mut last_err =
            DesignLookupError::InsufficientMetadata("no design source configured".to_string());
        for lookup in &self.lookups {
            match lookup.design_heat_loss(building).await {
                Ok(found) => return Ok(found),
                Err(e) => {
                    debug!(lookup = lookup.name(), error = %e, "Design lookup miss");
                    last_err = e;
                }
            }
        }
        Err(last_err)
    }

    fn name(&self) -> &'static str {
        "chain"
    }
}
