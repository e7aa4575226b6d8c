//! Thermal analyzer - one analysis run from samples to report
//!
//! ```text
//! 1. Validate building metadata and samples
//! 2. Coast-down detection → decay fit (measured tier)
//! 3. Heat-loss resolution (measured → design → default)
//! 4. Balance point + capacity balance point
//! 5. Short-cycle scan
//! 6. Threshold recommendation
//! ```
//!
//! Only step 3 suspends. Zones run concurrently on a `JoinSet` and share
//! nothing but the read-only configuration.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::{AnalysisError, ZoneInput, ZoneReport};
use crate::config::defaults::REFERENCE_DELTA_T_F;
use crate::config::AnalyzerConfig;
use crate::heat_loss::{
    resolve_heat_loss, ChainedLookup, DesignLookup, HttpDesignLookup, ManualJLookup,
};
use crate::recommendation::recommend_thresholds;
use crate::thermal::{
    analyze_short_cycles, capacity_balance_point, estimate_decay, find_balance_point,
    find_coast_down,
};
use crate::types::{AnalysisReport, BuildingConfig, Sample};

/// Runs the full analysis for a building.
///
/// Cheap to clone; clones share the design lookup and cancellation token.
#[derive(Clone)]
pub struct ThermalAnalyzer {
    lookup: Arc<dyn DesignLookup>,
    lookup_timeout: Duration,
    cancel: CancellationToken,
}

impl ThermalAnalyzer {
    /// Analyzer with an explicit design lookup and the configured timeout
    pub fn new(lookup: Arc<dyn DesignLookup>) -> Self {
        Self {
            lookup,
            lookup_timeout: Duration::from_secs(crate::config::get().design_lookup.timeout_secs),
            cancel: CancellationToken::new(),
        }
    }

    /// Local Manual-J, followed by the remote service when an endpoint is configured
    pub fn from_config(config: &AnalyzerConfig) -> Result<Self, AnalysisError> {
        let timeout = Duration::from_secs(config.design_lookup.timeout_secs);
        let mut lookups: Vec<Arc<dyn DesignLookup>> = vec![Arc::new(ManualJLookup)];
        if let Some(endpoint) = &config.design_lookup.endpoint {
            let http = HttpDesignLookup::new(endpoint, timeout)
                .map_err(|e| AnalysisError::Setup(e.to_string()))?;
            lookups.push(Arc::new(http));
            info!(endpoint = %endpoint, "Remote design lookup enabled");
        }
        Ok(Self::new(Arc::new(ChainedLookup::new(lookups))).with_timeout(timeout))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    /// Token that aborts pending design lookups; cancelled runs fall to the default tier
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Analyze one building's sample history.
    ///
    /// Only malformed input is an error. Every estimator failure is absorbed
    /// by the resolution stack and reported in the explanation.
    pub async fn analyze(
        &self,
        samples: &[Sample],
        building: &BuildingConfig,
    ) -> Result<AnalysisReport, AnalysisError> {
        let started = Instant::now();
        validate_input(samples, building)?;
        debug!(
            samples = samples.len(),
            design_basis = building.has_design_basis(),
            "Input validated"
        );

        let coast_down = find_coast_down(samples);
        let decay = coast_down
            .as_ref()
            .map_err(Clone::clone)
            .and_then(|period| estimate_decay(period, building.square_feet));
        if let Err(e) = &decay {
            debug!(error = %e, "No measured heat loss");
        }

        let heat_loss = resolve_heat_loss(
            &decay,
            building,
            self.lookup.as_ref(),
            self.lookup_timeout,
            &self.cancel,
        )
        .await;

        let balance = find_balance_point(samples);
        let capacity_bp = capacity_balance_point(heat_loss.value(), building.capacity);
        let short_cycle = analyze_short_cycles(samples);
        let recommendation = recommend_thresholds(&heat_loss, &balance, capacity_bp, &short_cycle);

        let temp_diff = REFERENCE_DELTA_T_F;
        let report = AnalysisReport {
            heat_loss_factor: heat_loss.value(),
            heat_loss_total: heat_loss.total_at(temp_diff),
            balance_point: balance.outdoor_temp_threshold,
            capacity_balance_point: capacity_bp,
            temp_diff,
            heat_loss_source: heat_loss.source(),
            heat_loss_explanation: heat_loss.explanation().to_string(),
            diagnostics: coast_down.as_ref().err().and_then(|e| e.diagnostics().cloned()),
            coast_down_period: coast_down.ok(),
            decay: decay.ok(),
            short_cycle,
            recommendation,
        };

        info!(
            samples = samples.len(),
            source = %report.heat_loss_source,
            factor = report.heat_loss_factor,
            balance_point = ?report.balance_point,
            profile = %report.recommendation.profile,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Analysis complete"
        );
        Ok(report)
    }

    /// Analyze independent zones concurrently. Results keep the input order.
    pub async fn analyze_zones(&self, zones: Vec<ZoneInput>) -> Vec<ZoneReport> {
        let count = zones.len();
        let mut set = JoinSet::new();
        let mut names = Vec::with_capacity(count);

        for (idx, zone) in zones.into_iter().enumerate() {
            names.push(zone.name.clone());
            let analyzer = self.clone();
            set.spawn(async move {
                let result = analyzer.analyze(&zone.samples, &zone.building).await;
                (idx, result)
            });
        }

        let mut slots: Vec<Option<Result<AnalysisReport, AnalysisError>>> =
            (0..count).map(|_| None).collect();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((idx, result)) => slots[idx] = Some(result),
                Err(e) => tracing::error!(error = %e, "Zone analysis task failed"),
            }
        }

        names
            .into_iter()
            .zip(slots)
            .map(|(name, slot)| ZoneReport {
                name,
                result: slot.unwrap_or_else(|| {
                    Err(AnalysisError::Task("zone analysis task did not complete".to_string()))
                }),
            })
            .collect()
    }
}

/// Reject input there is no sane fallback for.
fn validate_input(samples: &[Sample], building: &BuildingConfig) -> Result<(), AnalysisError> {
    building
        .validate()
        .map_err(|errors| AnalysisError::InvalidBuilding(errors.join("; ")))?;

    for (index, sample) in samples.iter().enumerate() {
        sample
            .check()
            .map_err(|reason| AnalysisError::InvalidSample { index, reason })?;
    }

    if let Some(index) = samples
        .windows(2)
        .position(|w| w[1].timestamp < w[0].timestamp)
    {
        return Err(AnalysisError::InvalidSample {
            index: index + 1,
            reason: "timestamps must be sorted ascending".to_string(),
        });
    }
    Ok(())
}
