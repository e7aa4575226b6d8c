//! Heat-Loss Resolution Stack Tests
//!
//! Tier ordering, timeout and cancellation of the design lookup, using stub
//! `DesignLookup` implementations. Time-dependent tests run on a paused
//! clock so a "slow" lookup costs nothing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use joule_thermal::heat_loss::{
    default_heat_loss, resolve_heat_loss, DesignHeatLoss, DesignLookup, DesignLookupError,
    NoDesignLookup,
};
use joule_thermal::types::CoastDownDiagnostics;
use joule_thermal::{
    BuildingConfig, DecayEstimate, EstimatorError, HeatLossEstimate, HeatLossSource,
};

// ============================================================================
// Stub Lookups
// ============================================================================

/// Returns a fixed factor and counts calls.
struct FixedLookup {
    factor: f64,
    calls: AtomicUsize,
}

impl FixedLookup {
    fn new(factor: f64) -> Arc<Self> {
        Arc::new(Self {
            factor,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl DesignLookup for FixedLookup {
    async fn design_heat_loss(
        &self,
        _building: &BuildingConfig,
    ) -> Result<DesignHeatLoss, DesignLookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(DesignHeatLoss {
            factor: self.factor,
            method: "stub".to_string(),
            note: "stub design figure".to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

/// Answers only after a long delay.
struct SlowLookup(Duration);

#[async_trait]
impl DesignLookup for SlowLookup {
    async fn design_heat_loss(
        &self,
        _building: &BuildingConfig,
    ) -> Result<DesignHeatLoss, DesignLookupError> {
        tokio::time::sleep(self.0).await;
        Ok(DesignHeatLoss {
            factor: 400.0,
            method: "slow".to_string(),
            note: "too late".to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "slow"
    }
}

/// Never answers.
struct HangingLookup;

#[async_trait]
impl DesignLookup for HangingLookup {
    async fn design_heat_loss(
        &self,
        _building: &BuildingConfig,
    ) -> Result<DesignHeatLoss, DesignLookupError> {
        std::future::pending().await
    }

    fn name(&self) -> &'static str {
        "hanging"
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn decay(factor: f64) -> Result<DecayEstimate, EstimatorError> {
    Ok(DecayEstimate {
        duration_hours: 8.0,
        temperature_drop: 6.0,
        hourly_loss_rate: 0.75,
        average_delta_t: 38.0,
        decay_rate: factor / 14_400.0,
        thermal_mass: 14_400.0,
        heat_loss_factor: factor,
        total_heat_loss_at_design_delta_t: factor * 70.0,
    })
}

fn no_period() -> Result<DecayEstimate, EstimatorError> {
    Err(EstimatorError::NoQualifyingCoastDownPeriod(
        CoastDownDiagnostics {
            total_points: 96,
            off_rows: 0,
            longest_off_hours: 0.0,
            required_off_hours: 3.0,
        },
    ))
}

fn house() -> BuildingConfig {
    BuildingConfig {
        square_feet: 1800.0,
        ..BuildingConfig::default()
    }
}

const TIMEOUT: Duration = Duration::from_secs(8);

// ============================================================================
// Tier Ordering
// ============================================================================

#[tokio::test]
async fn measured_is_absolute_and_skips_lookup() {
    let lookup = FixedLookup::new(500.0);
    let est = resolve_heat_loss(
        &decay(284.2),
        &house(),
        lookup.as_ref(),
        TIMEOUT,
        &CancellationToken::new(),
    )
    .await;

    assert_eq!(est.source(), HeatLossSource::Measured);
    assert!((est.value() - 284.2).abs() < 1e-12);
    assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
    match est {
        HeatLossEstimate::Measured {
            thermal_mass,
            decay_rate,
            ..
        } => {
            assert_eq!(thermal_mass, 14_400.0);
            assert!((decay_rate - 284.2 / 14_400.0).abs() < 1e-12);
        }
        other => panic!("expected measured, got {other:?}"),
    }
}

#[tokio::test]
async fn implausible_measurement_falls_to_design() {
    let lookup = FixedLookup::new(500.0);
    let est = resolve_heat_loss(
        &decay(5_000.0),
        &house(),
        lookup.as_ref(),
        TIMEOUT,
        &CancellationToken::new(),
    )
    .await;

    assert_eq!(est.source(), HeatLossSource::Design);
    assert_eq!(est.value(), 500.0);
    assert!(est.explanation().contains("plausible range"));
    assert_eq!(lookup.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn estimator_failure_uses_design() {
    let lookup = FixedLookup::new(650.0);
    let est = resolve_heat_loss(
        &no_period(),
        &house(),
        lookup.as_ref(),
        TIMEOUT,
        &CancellationToken::new(),
    )
    .await;
    assert_eq!(est.source(), HeatLossSource::Design);
    assert!(matches!(est, HeatLossEstimate::Design { ref method, .. } if method == "stub"));
}

#[tokio::test]
async fn implausible_design_falls_to_default() {
    let lookup = FixedLookup::new(9_000.0);
    let est = resolve_heat_loss(
        &no_period(),
        &house(),
        lookup.as_ref(),
        TIMEOUT,
        &CancellationToken::new(),
    )
    .await;
    assert_eq!(est.source(), HeatLossSource::Default);
}

#[tokio::test]
async fn default_is_deterministic() {
    let b = house();
    let cancel = CancellationToken::new();
    let first = resolve_heat_loss(&no_period(), &b, &NoDesignLookup, TIMEOUT, &cancel).await;
    let second = resolve_heat_loss(&no_period(), &b, &NoDesignLookup, TIMEOUT, &cancel).await;

    assert_eq!(first.source(), HeatLossSource::Default);
    assert_eq!(first, second);
    assert_eq!(first.value(), default_heat_loss(&b).factor);
    assert!(first.value() > 0.0);
}

// ============================================================================
// Timeout & Cancellation
// ============================================================================

#[tokio::test(start_paused = true)]
async fn slow_lookup_times_out_to_default() {
    let lookup = SlowLookup(Duration::from_secs(30));
    let started = tokio::time::Instant::now();
    let cancel = CancellationToken::new();
    let est = resolve_heat_loss(&no_period(), &house(), &lookup, TIMEOUT, &cancel).await;

    assert_eq!(est.source(), HeatLossSource::Default);
    assert!(est.explanation().contains("timed out"));
    let waited = started.elapsed();
    assert!(waited >= TIMEOUT && waited < Duration::from_secs(30), "{waited:?}");
}

#[tokio::test(start_paused = true)]
async fn lookup_inside_deadline_is_used() {
    let lookup = SlowLookup(Duration::from_secs(2));
    let cancel = CancellationToken::new();
    let est = resolve_heat_loss(&no_period(), &house(), &lookup, TIMEOUT, &cancel).await;
    assert_eq!(est.source(), HeatLossSource::Design);
    assert_eq!(est.value(), 400.0);
}

#[tokio::test]
async fn cancellation_abandons_lookup() {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let est = resolve_heat_loss(
        &no_period(),
        &house(),
        &HangingLookup,
        Duration::from_secs(60),
        &cancel,
    )
    .await;
    assert_eq!(est.source(), HeatLossSource::Default);
    assert!(est.explanation().contains("cancelled"));
}
