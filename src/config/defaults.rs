//! System-wide default constants.
//!
//! Calibration choices collected in one place. They are empirical, not derived
//! per building; `joule_config.toml` can override most of them.

// ============================================================================
// Coast-Down Detection
// ============================================================================

/// Minimum continuous heating-off duration for a usable coast-down (hours).
pub const MIN_COAST_DOWN_HOURS: f64 = 3.0;

/// Sample spacing assumed when a series is too short to infer one (seconds).
pub const DEFAULT_SAMPLE_INTERVAL_SECS: f64 = 300.0;

// ============================================================================
// Thermal Decay
// ============================================================================

/// Effective heat capacity per square foot of floor area (BTU/°F per ft²).
///
/// Typical framed construction. Not calibrated per building.
pub const THERMAL_MASS_PER_SQFT: f64 = 8.0;

/// Standardized indoor/outdoor difference for reporting total heat loss (°F).
///
/// Fixed. Design-report totals and the default model are defined at this ΔT.
pub const REFERENCE_DELTA_T_F: f64 = 70.0;

/// Upper sanity bound for a heat-loss factor (BTU/hr/°F).
///
/// Anything at or above this is a data or computation fault, not a house.
pub const MAX_PLAUSIBLE_HEAT_LOSS_FACTOR: f64 = 5_000.0;

// ============================================================================
// Short Cycling
// ============================================================================

/// Runs shorter than this are short cycles (seconds). 300 = 5 minutes.
pub const MIN_CYCLE_SECS: f64 = 300.0;

/// How far back to search for the last resting sample before a short cycle.
pub const SHORT_CYCLE_LOOKBACK_SAMPLES: usize = 5;

/// Differential = multiplier × average setpoint offset at cycle start.
pub const DIFFERENTIAL_MULTIPLIER: f64 = 1.25;

/// Lower clamp for a recommended differential (°F).
pub const MIN_DIFFERENTIAL_F: f64 = 0.5;

/// Upper clamp for a recommended differential (°F).
pub const MAX_DIFFERENTIAL_F: f64 = 2.0;

/// Cycles/hr above which the frequency heuristic recommends the widest band.
pub const HIGH_CYCLE_RATE: f64 = 6.0;

/// Cycles/hr above which the frequency heuristic recommends the middle band.
pub const MODERATE_CYCLE_RATE: f64 = 4.0;

/// Frequency-heuristic differentials (°F): high, moderate, low cycle rate.
pub const HIGH_RATE_DIFFERENTIAL_F: f64 = 1.5;
pub const MODERATE_RATE_DIFFERENTIAL_F: f64 = 1.0;
pub const LOW_RATE_DIFFERENTIAL_F: f64 = 0.75;

/// Minimum on-time recommended alongside a differential change (minutes).
pub const RECOMMENDED_MIN_ON_TIME_MINUTES: f64 = 5.0;

// ============================================================================
// Design-Basis Lookup
// ============================================================================

/// Timeout for the external design-basis lookup (seconds).
pub const DESIGN_LOOKUP_TIMEOUT_SECS: u64 = 8;

/// Simplified Manual-J heat loss per ft² per °F at insulation level 1.0 (DOE average).
pub const MANUAL_J_BTU_PER_SQFT_PER_F: f64 = 0.32;

/// 99% design heating temperature by IECC climate zone (°F).
///
/// `None` outside zones 1-7.
pub fn design_heating_temp_for_zone(zone: u8) -> Option<f64> {
    match zone {
        1 => Some(30.0),
        2 => Some(20.0),
        3 => Some(10.0),
        4 => Some(0.0),
        5 => Some(-5.0),
        6 => Some(-10.0),
        7 => Some(-15.0),
        _ => None,
    }
}

// ============================================================================
// Generic Default Model
// ============================================================================

/// Heat loss per ft² at the 70 °F reference for an average 1.0/1.0/8 ft home (BTU/hr).
pub const DEFAULT_BTU_PER_SQFT_AT_REFERENCE: f64 = 22.67;

/// Ceiling height the default model is normalized to (ft).
pub const REFERENCE_CEILING_FT: f64 = 8.0;

/// Fractional heat-loss change per foot of ceiling height above the reference.
pub const CEILING_STEP_PER_FT: f64 = 0.1;

/// Share of floor area counted when an open loft shares conditioned air.
pub const LOFT_AREA_FRACTION: f64 = 0.65;

/// Total default heat loss is rounded to this granularity (BTU/hr).
pub const DEFAULT_ROUNDING_BTU: f64 = 1_000.0;

// ============================================================================
// Heat-Pump Capacity Curve
// ============================================================================

/// Outdoor temperature at or above which rated capacity is fully available (°F).
pub const CAPACITY_RATED_TEMP_F: f64 = 47.0;

/// Outdoor temperature at or below which the compressor is locked out (°F).
pub const CAPACITY_CUTOFF_TEMP_F: f64 = -15.0;

/// Indoor heating design temperature (°F). Used for design loads and for
/// sizing heat loss against heat-pump capacity.
pub const DESIGN_INDOOR_TEMP_F: f64 = 70.0;

/// Search step when scanning outdoor temperature for the capacity balance point (°F).
pub const CAPACITY_SCAN_STEP_F: f64 = 0.5;

/// Warmest outdoor temperature considered for the capacity balance point (°F).
pub const CAPACITY_SCAN_START_F: f64 = 65.0;
