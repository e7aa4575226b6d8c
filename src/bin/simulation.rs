//! Thermostat History Simulation
//!
//! Generates a synthetic analysis input for exercising joule-thermal.
//! The canonical scenario:
//! - 96 hourly samples, outdoor steady at 30 °F
//! - heat off for samples 40-47, indoor falling linearly from 71 to 65 °F
//! - heat running the rest of the time at a 70 °F setpoint
//!
//! Optional extras: sensor noise, auxiliary heat on cold nights and short
//! heating cycles.
//!
//! # Usage
//! ```bash
//! ./simulation --seed 7 --noise 0.2 --aux-events 4 --short-cycles 6 > history.json
//! ./joule-thermal analyze --samples history.json
//! ```

use chrono::{Duration, TimeZone, Utc};
use clap::Parser;
use rand::prelude::*;
use rand_distr::{Distribution, Normal};

use joule_thermal::{AnalysisInput, BuildingConfig, Sample};

// ============================================================================
// Scenario Constants
// ============================================================================

/// Total samples, one per hour
const SCENARIO_HOURS: usize = 96;
/// First heating-off sample
const OFF_START: usize = 40;
/// Last heating-off sample (inclusive)
const OFF_END: usize = 47;
/// Indoor temperature at the start / end of the coast-down (°F)
const COAST_START_TEMP: f64 = 71.0;
const COAST_END_TEMP: f64 = 65.0;
/// Steady outdoor temperature (°F)
const OUTDOOR_TEMP: f64 = 30.0;
/// Heating setpoint (°F)
const SETPOINT: f64 = 70.0;
/// Heat runtime per hour in steady state (s)
const STEADY_RUNTIME_SECS: f64 = 1_800.0;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "joule-simulation")]
#[command(about = "Synthetic thermostat history for joule-thermal testing")]
#[command(version = "1.0")]
struct Args {
    /// Conditioned floor area (ft²)
    #[arg(long, default_value = "1800")]
    square_feet: f64,

    /// Rated heat-pump capacity (kBTU/hr, 0 = unknown)
    #[arg(long, default_value = "36")]
    capacity: f64,

    /// Standard deviation of temperature noise (°F)
    #[arg(long, default_value = "0")]
    noise: f64,

    /// Cold-night samples with auxiliary heat (outside the coast-down)
    #[arg(long, default_value = "0")]
    aux_events: usize,

    /// Short heating cycles to inject (outside the coast-down)
    #[arg(long, default_value = "0")]
    short_cycles: usize,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Pretty-print the JSON
    #[arg(long)]
    pretty: bool,
}

// ============================================================================
// Generator
// ============================================================================

struct Simulator {
    rng: StdRng,
    noise: Option<Normal<f64>>,
}

impl Simulator {
    fn new(seed: Option<u64>, noise_std: f64) -> Result<Self, Box<dyn std::error::Error>> {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        let noise = if noise_std > 0.0 {
            Some(Normal::new(0.0, noise_std)?)
        } else {
            None
        };
        Ok(Self { rng, noise })
    }

    fn jitter(&mut self) -> f64 {
        match &self.noise {
            Some(n) => n.sample(&mut self.rng),
            None => 0.0,
        }
    }

    fn baseline(&mut self) -> Vec<Sample> {
        let t0 = Utc.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).single();
        let t0 = t0.unwrap_or_else(Utc::now);
        let span = (OFF_END - OFF_START) as f64;

        (0..SCENARIO_HOURS)
            .map(|i| {
                let ts = t0 + Duration::hours(i as i64);
                let coasting = (OFF_START..=OFF_END).contains(&i);
                let indoor = if coasting {
                    let k = (i - OFF_START) as f64;
                    COAST_START_TEMP - (COAST_START_TEMP - COAST_END_TEMP) * k / span
                } else {
                    SETPOINT
                };
                let mut s = Sample::idle(ts, indoor + self.jitter(), OUTDOOR_TEMP + self.jitter());
                s.heat_setpoint = Some(SETPOINT);
                if !coasting {
                    s.heat_runtime_sec = STEADY_RUNTIME_SECS;
                }
                s
            })
            .collect()
    }

    /// Hours outside the coast-down and its neighbours, shuffled.
    fn free_hours(&mut self) -> Vec<usize> {
        let mut hours: Vec<usize> = (1..SCENARIO_HOURS)
            .filter(|h| *h + 1 < OFF_START || *h > OFF_END + 1)
            .collect();
        hours.shuffle(&mut self.rng);
        hours
    }

    fn add_aux_events(&mut self, samples: &mut [Sample], count: usize) {
        for h in self.free_hours().into_iter().take(count) {
            let s = &mut samples[h];
            s.outdoor_temp = self.rng.gen_range(5.0..25.0);
            s.aux_runtime_sec = self.rng.gen_range(300.0..1_200.0);
            s.heat_runtime_sec = 3_600.0;
            eprintln!("[sim] aux heat at hour {h}, {:.1} °F outdoors", s.outdoor_temp);
        }
    }

    fn add_short_cycles(&mut self, samples: &mut [Sample], count: usize) {
        for h in self.free_hours().into_iter().take(count) {
            let deficit = self.rng.gen_range(0.3..1.2);
            let rest = &mut samples[h - 1];
            rest.heat_runtime_sec = 0.0;
            rest.aux_runtime_sec = 0.0;
            rest.indoor_temp = SETPOINT - deficit;
            samples[h].heat_runtime_sec = self.rng.gen_range(90.0..280.0);
            samples[h].aux_runtime_sec = 0.0;
            eprintln!("[sim] short cycle at hour {h}, {deficit:.2} °F below setpoint");
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut sim = Simulator::new(args.seed, args.noise)?;
    let mut samples = sim.baseline();
    sim.add_aux_events(&mut samples, args.aux_events);
    sim.add_short_cycles(&mut samples, args.short_cycles);

    let input = AnalysisInput {
        building: BuildingConfig {
            square_feet: args.square_feet,
            capacity: args.capacity,
            ..BuildingConfig::default()
        },
        samples,
    };

    let json = if args.pretty {
        serde_json::to_string_pretty(&input)?
    } else {
        serde_json::to_string(&input)?
    };
    println!("{json}");
    Ok(())
}
