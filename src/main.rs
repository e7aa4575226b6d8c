//! Joule Thermal - command-line analyzer
//!
//! # Usage
//!
//! ```bash
//! # Generate a synthetic history and analyze it
//! cargo run --bin simulation > history.json
//! cargo run --release -- analyze --samples history.json --pretty
//!
//! # Use a remote load-calculation service as the design tier
//! joule-thermal analyze --samples history.json --design-endpoint http://bridge.local:8080
//!
//! # Check a calibration file
//! joule-thermal check-config joule_config.toml
//! ```
//!
//! # Environment Variables
//!
//! - `JOULE_CONFIG`: Path to the calibration TOML (default: ./joule_config.toml)
//! - `RUST_LOG`: Logging level (default: info). Logs go to stderr, the report to stdout.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use joule_thermal::config::{self, AnalyzerConfig};
use joule_thermal::{AnalysisInput, ThermalAnalyzer};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "joule-thermal")]
#[command(about = "Heat-loss, balance point and thermostat tuning from HVAC runtime history")]
#[command(version)]
struct CliArgs {
    #[command(subcommand)]
    command: SubCommand,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Analyze a JSON file of `{ building, samples }` and print the report
    Analyze {
        /// Path to the analysis input JSON
        #[arg(long, value_name = "FILE")]
        samples: PathBuf,

        /// Calibration TOML (overrides JOULE_CONFIG and ./joule_config.toml)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Base URL of a remote load-calculation service
        #[arg(long, env = "JOULE_DESIGN_ENDPOINT", value_name = "URL")]
        design_endpoint: Option<String>,

        /// Design lookup timeout in seconds
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,

        /// Pretty-print the JSON report
        #[arg(long)]
        pretty: bool,
    },

    /// Validate a calibration TOML and print the effective configuration
    CheckConfig {
        /// Path to the TOML file
        path: PathBuf,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();

    match args.command {
        SubCommand::Analyze {
            samples,
            config: config_path,
            design_endpoint,
            timeout,
            pretty,
        } => run_analyze(samples, config_path, design_endpoint, timeout, pretty).await,
        SubCommand::CheckConfig { path } => run_check_config(&path),
    }
}

async fn run_analyze(
    samples_path: PathBuf,
    config_path: Option<PathBuf>,
    design_endpoint: Option<String>,
    timeout: Option<u64>,
    pretty: bool,
) -> Result<()> {
    let mut analyzer_config = match &config_path {
        Some(path) => AnalyzerConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AnalyzerConfig::load(),
    };
    if design_endpoint.is_some() {
        analyzer_config.design_lookup.endpoint = design_endpoint;
    }
    if let Some(secs) = timeout {
        analyzer_config.design_lookup.timeout_secs = secs;
    }
    analyzer_config
        .validate()
        .context("Invalid analyzer configuration")?;
    config::init(analyzer_config);

    let raw = tokio::fs::read_to_string(&samples_path)
        .await
        .with_context(|| format!("Failed to read {}", samples_path.display()))?;
    let input = AnalysisInput::from_json(&raw)?;
    info!(
        samples = input.samples.len(),
        square_feet = input.building.square_feet,
        "Loaded analysis input from {}",
        samples_path.display()
    );

    let analyzer = ThermalAnalyzer::from_config(config::get())?;

    // Ctrl-C abandons a slow design lookup instead of the whole run
    let cancel = analyzer.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, skipping design lookup");
            cancel.cancel();
        }
    });

    let report = analyzer.analyze(&input.samples, &input.building).await?;

    let json = if pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{json}");

    if let Some(diag) = &report.diagnostics {
        warn!(
            "No usable coast-down period: longest heating-off run was {:.1} h. Collect about {:.1} more hours with the heat off for a measured estimate.",
            diag.longest_off_hours,
            diag.missing_hours()
        );
    }
    Ok(())
}

fn run_check_config(path: &std::path::Path) -> Result<()> {
    let loaded = AnalyzerConfig::load_from_file_with_provenance(path);
    let (analyzer_config, provenance) =
        loaded.with_context(|| format!("Config {} is invalid", path.display()))?;

    info!(
        explicit_keys = provenance.explicit_keys.len(),
        "Config {} is valid",
        path.display()
    );
    println!("{}", analyzer_config.to_toml()?);

    if provenance.is_user_set("decay.thermal_mass_per_sqft") {
        warn!(
            value = analyzer_config.decay.thermal_mass_per_sqft,
            "Thermal mass per ft² overridden; measured heat-loss factors scale with it"
        );
    }
    Ok(())
}
