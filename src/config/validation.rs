//! Config validation: unknown-key detection with Levenshtein suggestions
//! and plausibility range checks.
//!
//! Two-pass parse: first deserialize raw TOML into `toml::Value`, walk the
//! key tree, compare against known field names, and emit warnings with
//! "did you mean?" suggestions. Then proceed with normal serde
//! deserialization. Warnings never break existing configs.

use std::collections::HashSet;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Every valid dotted key path for `AnalyzerConfig`.
///
/// Maintained by hand against analyzer_config.rs; new fields go here too.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [coast_down]
        "coast_down",
        "coast_down.min_off_hours",
        "coast_down.default_sample_interval_secs",
        // [decay]
        "decay",
        "decay.thermal_mass_per_sqft",
        "decay.max_plausible_factor",
        // [short_cycle]
        "short_cycle",
        "short_cycle.min_cycle_secs",
        "short_cycle.lookback_samples",
        "short_cycle.differential_multiplier",
        "short_cycle.min_differential_f",
        "short_cycle.max_differential_f",
        "short_cycle.high_cycle_rate",
        "short_cycle.moderate_cycle_rate",
        "short_cycle.high_rate_differential_f",
        "short_cycle.moderate_rate_differential_f",
        "short_cycle.low_rate_differential_f",
        "short_cycle.min_on_time_minutes",
        // [design_lookup]
        "design_lookup",
        "design_lookup.endpoint",
        "design_lookup.timeout_secs",
        // [default_model]
        "default_model",
        "default_model.btu_per_sqft_at_reference",
        "default_model.reference_ceiling_ft",
        "default_model.ceiling_step_per_ft",
        "default_model.loft_area_fraction",
        "default_model.rounding_btu",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively collect all dotted key paths of a `toml::Value` tree.
///
/// `{ a = { b = 1, c = 2 } }` yields `["a", "a.b", "a.c"]`.
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Closest known key within edit distance 3, if any.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|&k| (k, levenshtein(unknown, k)))
        .filter(|&(_, dist)| dist <= 3)
        .min_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)))
        .map(|(k, _)| k.to_string())
}

// ============================================================================
// Unknown Key Validation
// ============================================================================

/// Warnings for any unknown keys in a raw TOML string.
///
/// Parse errors are left to serde; this only reports typos.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let Ok(value) = raw_toml.parse::<toml::Value>() else {
        return Vec::new();
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

// ============================================================================
// Plausibility Ranges
// ============================================================================

/// Range checks on a parsed config.
///
/// Returns (errors, warnings). Errors are impossible values; warnings are
/// legal but far from any calibration seen in practice.
pub fn validate_physical_ranges(
    config: &super::AnalyzerConfig,
) -> (Vec<String>, Vec<ValidationWarning>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if config.short_cycle.min_cycle_secs > 3_600.0 {
        errors.push(format!(
            "short_cycle.min_cycle_secs = {:.0} is longer than an hour; every run would be short",
            config.short_cycle.min_cycle_secs
        ));
    }

    let mass = config.decay.thermal_mass_per_sqft;
    if !(2.0..=30.0).contains(&mass) {
        warnings.push(ValidationWarning {
            field: "decay.thermal_mass_per_sqft".to_string(),
            message: format!(
                "thermal_mass_per_sqft = {mass:.1} is outside typical construction (2-30 BTU/°F/ft²)"
            ),
            suggestion: None,
        });
    }

    let off_hours = config.coast_down.min_off_hours;
    if off_hours > 12.0 {
        warnings.push(ValidationWarning {
            field: "coast_down.min_off_hours".to_string(),
            message: format!(
                "min_off_hours = {off_hours:.1} is rarely met by winter data (typical 2-6 h)"
            ),
            suggestion: None,
        });
    }

    let max_diff = config.short_cycle.max_differential_f;
    if max_diff > 4.0 {
        warnings.push(ValidationWarning {
            field: "short_cycle.max_differential_f".to_string(),
            message: format!(
                "max_differential_f = {max_diff:.1} allows comfort swings beyond typical thermostat limits (4 °F)"
            ),
            suggestion: None,
        });
    }

    (errors, warnings)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_identical() {
        assert_eq!(levenshtein("decay", "decay"), 0);
    }

    #[test]
    fn test_levenshtein_one_edit() {
        assert_eq!(levenshtein("lookback_sample", "lookback_samples"), 1);
    }

    #[test]
    fn test_levenshtein_empty() {
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
    }

    #[test]
    fn test_walk_toml_keys_nested() {
        let toml: toml::Value = r#"
            [short_cycle]
            min_cycle_secs = 240.0
        "#
        .parse()
        .unwrap();
        let keys = walk_toml_keys(&toml, "");
        assert!(keys.contains(&"short_cycle".to_string()));
        assert!(keys.contains(&"short_cycle.min_cycle_secs".to_string()));
    }

    #[test]
    fn test_typo_key_produces_warning_with_suggestion() {
        let toml_str = r#"
[decay]
thermal_mas_per_sqft = 9.0
"#;
        let warnings = validate_unknown_keys(toml_str);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].field, "decay.thermal_mas_per_sqft");
        assert_eq!(
            warnings[0].suggestion.as_deref(),
            Some("decay.thermal_mass_per_sqft")
        );
    }

    #[test]
    fn test_unknown_section_produces_warning() {
        let warnings = validate_unknown_keys("[thresholds]\nfoo = 1\n");
        assert!(warnings.iter().any(|w| w.field == "thresholds"));
    }

    #[test]
    fn test_suggest_correction_no_match_for_garbage() {
        let known = known_config_keys();
        assert!(suggest_correction("completely_unrelated_garbage_key_xyz", &known).is_none());
    }

    #[test]
    fn test_defaults_are_in_range() {
        let config = crate::config::AnalyzerConfig::default();
        let (errors, warnings) = validate_physical_ranges(&config);
        assert!(errors.is_empty(), "{errors:?}");
        assert!(warnings.is_empty(), "{warnings:?}");
    }

    #[test]
    fn test_unusual_thermal_mass_warns() {
        let mut config = crate::config::AnalyzerConfig::default();
        config.decay.thermal_mass_per_sqft = 50.0;
        let (errors, warnings) = validate_physical_ranges(&config);
        assert!(errors.is_empty());
        assert!(warnings.iter().any(|w| w.field == "decay.thermal_mass_per_sqft"));
    }

    #[test]
    fn test_hour_long_min_cycle_is_error() {
        let mut config = crate::config::AnalyzerConfig::default();
        config.short_cycle.min_cycle_secs = 7_200.0;
        let (errors, _) = validate_physical_ranges(&config);
        assert!(errors.iter().any(|e| e.contains("min_cycle_secs")));
    }
}
