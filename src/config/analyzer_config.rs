//! Analyzer Configuration - calibration constants as operator-tunable TOML values
//!
//! Each struct implements `Default` with the values in `defaults`, so an absent
//! config file yields the stock calibration.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::defaults;

/// Environment variable naming the config file to load.
pub const CONFIG_ENV_VAR: &str = "JOULE_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "joule_config.toml";

// ============================================================================
// Config Provenance
// ============================================================================

/// Dotted key paths explicitly present in the user's TOML file.
///
/// `#[serde(default)]` fills every missing field, so this is the only record
/// of which values the operator actually chose.
#[derive(Debug, Clone, Default)]
pub struct ConfigProvenance {
    pub explicit_keys: HashSet<String>,
}

impl ConfigProvenance {
    /// Example: `provenance.is_user_set("decay.thermal_mass_per_sqft")`
    pub fn is_user_set(&self, dotted_key: &str) -> bool {
        self.explicit_keys.contains(dotted_key)
    }
}

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root analyzer configuration.
///
/// Load with `AnalyzerConfig::load()` which searches:
/// 1. `$JOULE_CONFIG` env var
/// 2. `./joule_config.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    #[serde(default)]
    pub coast_down: CoastDownConfig,

    #[serde(default)]
    pub decay: DecayConfig,

    #[serde(default)]
    pub short_cycle: ShortCycleConfig,

    #[serde(default)]
    pub design_lookup: DesignLookupConfig,

    #[serde(default)]
    pub default_model: DefaultModelConfig,
}

impl AnalyzerConfig {
    /// Load configuration using the standard search order.
    pub fn load() -> Self {
        Self::load_with_provenance().0
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let (config, _provenance) = Self::load_from_file_with_provenance(path)?;
        Ok(config)
    }

    /// Load from a specific TOML file path, also returning which keys the
    /// file set explicitly.
    pub fn load_from_file_with_provenance(
        path: &Path,
    ) -> Result<(Self, ConfigProvenance), ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::parse_with_provenance(&contents, path)
    }

    /// Parse TOML text. `origin` is only used in error messages.
    pub fn parse_with_provenance(
        contents: &str,
        origin: &Path,
    ) -> Result<(Self, ConfigProvenance), ConfigError> {
        // Unknown keys are warnings, never errors
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let provenance = ConfigProvenance {
            explicit_keys: super::validation::walk_toml_keys(
                &contents
                    .parse::<toml::Value>()
                    .unwrap_or(toml::Value::Table(toml::map::Map::default())),
                "",
            )
            .into_iter()
            .collect(),
        };

        let config: Self =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(origin.to_path_buf(), e))?;
        config.validate()?;
        Ok((config, provenance))
    }

    /// Standard search order, returning provenance.
    pub fn load_with_provenance() -> (Self, ConfigProvenance) {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file_with_provenance(&p) {
                    Ok(loaded) => {
                        info!(
                            path = %p.display(),
                            "Loaded analyzer config from {}",
                            CONFIG_ENV_VAR
                        );
                        return loaded;
                    }
                    Err(e) => {
                        warn!(
                            path = %p.display(),
                            error = %e,
                            "Failed to load config from {}, falling back",
                            CONFIG_ENV_VAR
                        );
                    }
                }
            } else {
                warn!(path = %path, "{} points to non-existent file, falling back", CONFIG_ENV_VAR);
            }
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file_with_provenance(&local) {
                Ok(loaded) => {
                    info!("Loaded analyzer config from ./{}", LOCAL_CONFIG_FILE);
                    return loaded;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", LOCAL_CONFIG_FILE);
                }
            }
        }

        info!("No {} found, using built-in calibration", LOCAL_CONFIG_FILE);
        (Self::default(), ConfigProvenance::default())
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Validate for internal consistency. Collects every violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        let cd = &self.coast_down;
        Self::check_positive(cd.min_off_hours, "coast_down.min_off_hours", &mut errors);
        Self::check_positive(
            cd.default_sample_interval_secs,
            "coast_down.default_sample_interval_secs",
            &mut errors,
        );

        let d = &self.decay;
        Self::check_positive(d.thermal_mass_per_sqft, "decay.thermal_mass_per_sqft", &mut errors);
        Self::check_positive(d.max_plausible_factor, "decay.max_plausible_factor", &mut errors);

        let sc = &self.short_cycle;
        Self::check_positive(sc.min_cycle_secs, "short_cycle.min_cycle_secs", &mut errors);
        Self::check_positive(
            sc.differential_multiplier,
            "short_cycle.differential_multiplier",
            &mut errors,
        );
        Self::check_positive(sc.min_differential_f, "short_cycle.min_differential_f", &mut errors);
        Self::check_ordered(
            sc.min_differential_f,
            sc.max_differential_f,
            "short_cycle.differential",
            &mut errors,
        );
        Self::check_ordered(
            sc.moderate_cycle_rate,
            sc.high_cycle_rate,
            "short_cycle.cycle_rate",
            &mut errors,
        );
        if sc.lookback_samples == 0 {
            errors.push("short_cycle.lookback_samples must be > 0".to_string());
        }
        for (name, value) in [
            ("short_cycle.high_rate_differential_f", sc.high_rate_differential_f),
            ("short_cycle.moderate_rate_differential_f", sc.moderate_rate_differential_f),
            ("short_cycle.low_rate_differential_f", sc.low_rate_differential_f),
            ("short_cycle.min_on_time_minutes", sc.min_on_time_minutes),
        ] {
            Self::check_positive(value, name, &mut errors);
        }

        let dl = &self.design_lookup;
        if !(1..=60).contains(&dl.timeout_secs) {
            errors.push(format!(
                "design_lookup.timeout_secs must be 1-60 (got {})",
                dl.timeout_secs
            ));
        }
        if let Some(ref endpoint) = dl.endpoint {
            if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                errors.push(format!(
                    "design_lookup.endpoint must be an http(s) URL (got '{endpoint}')"
                ));
            }
        }

        let dm = &self.default_model;
        Self::check_positive(
            dm.btu_per_sqft_at_reference,
            "default_model.btu_per_sqft_at_reference",
            &mut errors,
        );
        Self::check_positive(
            dm.reference_ceiling_ft,
            "default_model.reference_ceiling_ft",
            &mut errors,
        );
        Self::check_positive(dm.rounding_btu, "default_model.rounding_btu", &mut errors);
        if !dm.ceiling_step_per_ft.is_finite() || dm.ceiling_step_per_ft < 0.0 {
            errors.push(
                "default_model.ceiling_step_per_ft must be a finite value >= 0".to_string(),
            );
        }
        if !(dm.loft_area_fraction > 0.0 && dm.loft_area_fraction <= 1.0) {
            errors.push(format!(
                "default_model.loft_area_fraction must be in (0, 1] (got {})",
                dm.loft_area_fraction
            ));
        }

        let (range_errors, range_warnings) = super::validation::validate_physical_ranges(self);
        errors.extend(range_errors);
        for w in &range_warnings {
            warn!("{}", w);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    fn check_positive(value: f64, name: &str, errors: &mut Vec<String>) {
        // NaN comparisons silently pass, catch them explicitly
        if !value.is_finite() || value <= 0.0 {
            errors.push(format!("{name} must be a finite value > 0 (got {value})"));
        }
    }

    fn check_ordered(low: f64, high: f64, name: &str, errors: &mut Vec<String>) {
        if !low.is_finite() || !high.is_finite() {
            errors.push(format!(
                "{name}: bounds must be finite (got min={low}, max={high})"
            ));
            return;
        }
        if high < low {
            errors.push(format!("{name}: max ({high:.3}) must be >= min ({low:.3})"));
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Serialize(toml::ser::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Config I/O error ({}): {}", path.display(), e),
            ConfigError::Parse(path, e) => {
                write!(f, "Config parse error ({}): {}", path.display(), e)
            }
            ConfigError::Serialize(e) => write!(f, "Config serialization error: {}", e),
            ConfigError::Validation(errors) => {
                writeln!(f, "Config validation failed:")?;
                for e in errors {
                    writeln!(f, "  - {}", e)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Sections
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoastDownConfig {
    /// Minimum continuous heating-off duration (hours)
    pub min_off_hours: f64,
    /// Spacing assumed when it cannot be inferred from timestamps (seconds)
    pub default_sample_interval_secs: f64,
}

impl Default for CoastDownConfig {
    fn default() -> Self {
        Self {
            min_off_hours: defaults::MIN_COAST_DOWN_HOURS,
            default_sample_interval_secs: defaults::DEFAULT_SAMPLE_INTERVAL_SECS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecayConfig {
    /// BTU/°F per ft² of floor area
    pub thermal_mass_per_sqft: f64,
    /// BTU/hr/°F
    pub max_plausible_factor: f64,
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self {
            thermal_mass_per_sqft: defaults::THERMAL_MASS_PER_SQFT,
            max_plausible_factor: defaults::MAX_PLAUSIBLE_HEAT_LOSS_FACTOR,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShortCycleConfig {
    pub min_cycle_secs: f64,
    pub lookback_samples: usize,
    pub differential_multiplier: f64,
    pub min_differential_f: f64,
    pub max_differential_f: f64,
    pub high_cycle_rate: f64,
    pub moderate_cycle_rate: f64,
    pub high_rate_differential_f: f64,
    pub moderate_rate_differential_f: f64,
    pub low_rate_differential_f: f64,
    pub min_on_time_minutes: f64,
}

impl Default for ShortCycleConfig {
    fn default() -> Self {
        Self {
            min_cycle_secs: defaults::MIN_CYCLE_SECS,
            lookback_samples: defaults::SHORT_CYCLE_LOOKBACK_SAMPLES,
            differential_multiplier: defaults::DIFFERENTIAL_MULTIPLIER,
            min_differential_f: defaults::MIN_DIFFERENTIAL_F,
            max_differential_f: defaults::MAX_DIFFERENTIAL_F,
            high_cycle_rate: defaults::HIGH_CYCLE_RATE,
            moderate_cycle_rate: defaults::MODERATE_CYCLE_RATE,
            high_rate_differential_f: defaults::HIGH_RATE_DIFFERENTIAL_F,
            moderate_rate_differential_f: defaults::MODERATE_RATE_DIFFERENTIAL_F,
            low_rate_differential_f: defaults::LOW_RATE_DIFFERENTIAL_F,
            min_on_time_minutes: defaults::RECOMMENDED_MIN_ON_TIME_MINUTES,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignLookupConfig {
    /// Base URL of a load-calculation service; local Manual-J only when unset
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
}

impl Default for DesignLookupConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: defaults::DESIGN_LOOKUP_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultModelConfig {
    pub btu_per_sqft_at_reference: f64,
    pub reference_ceiling_ft: f64,
    pub ceiling_step_per_ft: f64,
    pub loft_area_fraction: f64,
    pub rounding_btu: f64,
}

impl Default for DefaultModelConfig {
    fn default() -> Self {
        Self {
            btu_per_sqft_at_reference: defaults::DEFAULT_BTU_PER_SQFT_AT_REFERENCE,
            reference_ceiling_ft: defaults::REFERENCE_CEILING_FT,
            ceiling_step_per_ft: defaults::CEILING_STEP_PER_FT,
            loft_area_fraction: defaults::LOFT_AREA_FRACTION,
            rounding_btu: defaults::DEFAULT_ROUNDING_BTU,
        }
    }
}
