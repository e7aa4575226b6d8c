//! Analyzer Configuration Module
//!
//! Calibration constants loaded from TOML so an operator can retune the
//! detectors without a rebuild.
//!
//! ## Loading Order
//!
//! 1. `JOULE_CONFIG` environment variable (path to TOML file)
//! 2. `joule_config.toml` in the current working directory
//! 3. Built-in defaults (`defaults` module)
//!
//! ## Usage
//!
//! ```ignore
//! // In main():
//! config::init(AnalyzerConfig::load());
//!
//! // Anywhere in the codebase:
//! let min_hours = config::get().coast_down.min_off_hours;
//! ```
//!
//! The configuration is read-only after `init()`, so concurrent analysis runs
//! share it without coordination.

mod analyzer_config;
pub mod defaults;
pub mod validation;

pub use analyzer_config::*;

use std::sync::OnceLock;

/// Global analyzer configuration, initialized once at startup.
static ANALYZER_CONFIG: OnceLock<AnalyzerConfig> = OnceLock::new();

/// Built-in calibration, used when `init()` was never called.
static BUILT_IN: OnceLock<AnalyzerConfig> = OnceLock::new();

/// Initialize the global analyzer configuration.
///
/// Later calls are ignored with a warning.
pub fn init(config: AnalyzerConfig) {
    if ANALYZER_CONFIG.set(config).is_err() {
        tracing::warn!("config::init() called more than once, ignoring");
    }
}

/// The active configuration.
///
/// Library embedders and tests that never call `init()` get the built-in
/// calibration.
pub fn get() -> &'static AnalyzerConfig {
    ANALYZER_CONFIG
        .get()
        .unwrap_or_else(|| BUILT_IN.get_or_init(AnalyzerConfig::default))
}

/// Whether `init()` has been called.
pub fn is_initialized() -> bool {
    ANALYZER_CONFIG.get().is_some()
}
