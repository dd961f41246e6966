//! Command-line front end for incident energy determination.
//!
//! Reads a JSON run description, determines the incident energies from the
//! monitors, and prints or writes them.
#![allow(clippy::uninlined_format_args)]

use clap::{Parser, Subcommand};

use eifind_algorithms::{
    initial_energy_guess, resolve_incident_energy, IncidentEnergyFinder, TwoMonitorRefiner,
};
use eifind_core::config::EiConfig;
use eifind_core::services::{ChopperLogReader, GeometryProvider};
use eifind_core::setting::{EnergySelection, IncidentEnergy};
use eifind_io::{load_config, ResultWriter, RunFile};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    EifindIo(#[from] eifind_io::Error),

    #[error("{0}")]
    Core(#[from] eifind_core::Error),
}

/// Automatic incident energy determination for chopper spectrometers.
#[derive(Parser)]
#[command(name = "eifind")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output (per-candidate diagnostics)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Determine the incident energy of a run
    Determine {
        /// Run description (JSON)
        input: PathBuf,

        /// Instrument configuration file (JSON); MAPS defaults otherwise
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Incident energy setting: "Auto", a value, or a list
        #[arg(short = 'e', long, default_value = "Auto")]
        incident_energy: IncidentEnergy,

        /// Energy (meV) to use if automatic determination confirms nothing
        #[arg(long)]
        fallback: Option<f64>,

        /// Report every confirmed energy instead of the first
        #[arg(long)]
        all: bool,

        /// Refine candidates in parallel
        #[arg(long)]
        parallel: bool,

        /// Peak search half-width, as a fraction of the predicted arrival time
        #[arg(long, default_value = "0.1")]
        search_fraction: f64,

        /// Write confirmed energies to this file (.csv or .json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the candidate repetitions without refining them
    Candidates {
        /// Run description (JSON)
        input: PathBuf,

        /// Instrument configuration file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Show information about a run description
    Info {
        /// Run description (JSON)
        input: PathBuf,
    },
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn finder_for(config: Option<&Path>, parallel: bool) -> Result<IncidentEnergyFinder> {
    let config = match config {
        Some(path) => load_config(path)?,
        None => EiConfig::maps_defaults(),
    };
    let config = if parallel {
        config.with_parallel_refinement(true)
    } else {
        config
    };
    Ok(IncidentEnergyFinder::new(config)?)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Determine {
            input,
            config,
            incident_energy,
            fallback,
            all,
            parallel,
            search_fraction,
            output,
        } => {
            let finder = finder_for(config.as_deref(), parallel)?;
            let run = RunFile::open(&input)?;
            let refiner =
                TwoMonitorRefiner::new(&run, run.geometry()?).with_search_fraction(search_fraction);
            let selection = if all {
                EnergySelection::All
            } else {
                EnergySelection::Primary
            };

            let mut determined = None;
            let energies = resolve_incident_energy(&incident_energy, selection, fallback, || {
                let set = finder.determine(&run, &refiner)?;
                determined = Some(set.clone());
                Ok(set)
            })?;

            if let Some(set) = &determined {
                for entry in set {
                    println!(
                        "{:.6} meV at TOF = {:.6} mus (initial guess {:.6} meV)",
                        entry.energy_mev, entry.tof_us, entry.initial_guess_mev
                    );
                }
                if let Some(path) = &output {
                    ResultWriter::create(path)?.write(set, run.run_number())?;
                    log::info!("wrote {} energies to {}", set.len(), path.display());
                }
            } else if output.is_some() {
                log::warn!("incident energy set to {incident_energy}; nothing determined to write");
            }

            let formatted: Vec<String> = energies.iter().map(|e| format!("{e:.6}")).collect();
            println!("Incident energy: {} meV", formatted.join(", "));
        }

        Commands::Candidates { input, config } => {
            let finder = finder_for(config.as_deref(), false)?;
            let run = RunFile::open(&input)?;
            let report = finder.candidates(&run)?;

            println!("Chopper frequency: {} Hz", report.frequency_hz);
            println!("Repetition period: {:.3} us", report.period_us);
            println!("Monitor 2 peak: {} us", report.peak_tof_us);
            println!(
                "Candidates: {} generated, {} after filtering",
                report.generated.len(),
                report.surviving.len()
            );
            println!("{:>6} | {:>12} | {:>14}", "irep", "TOF (us)", "guess (meV)");
            println!("{:-<38}", "");
            for candidate in &report.surviving {
                println!(
                    "{:>6} | {:>12.3} | {:>14.4}",
                    candidate.irep,
                    candidate.tof_us,
                    initial_energy_guess(report.geometry.l_m2, candidate.tof_us)
                );
            }
        }

        Commands::Info { input } => {
            let run = RunFile::open(&input)?;
            let geometry = run.geometry()?;

            println!("File: {}", input.display());
            if let Some(number) = run.run_number() {
                println!("Run: {}", number);
            }
            println!(
                "Geometry: L_m2 = {} m, L_m3 = {} m, L_fermi = {} m",
                geometry.l_m2, geometry.l_m3, geometry.l_fermi
            );

            for name in run.log_names() {
                match run.last_log_value(name) {
                    Ok(value) => println!("Log {}: last value {}", name, value),
                    Err(_) => println!("Log {}: no samples", name),
                }
            }

            for (index, monitor) in run.monitors().iter().enumerate() {
                let spectrum = &monitor.spectrum;
                print!(
                    "Monitor {} (spectrum {}): {} bins, {} counts",
                    index,
                    monitor.spectrum_number,
                    spectrum.len(),
                    spectrum.total_counts()
                );
                match spectrum.max_bin() {
                    Some((bin, _)) => {
                        println!(", max at {} us", spectrum.bin_start(bin));
                    }
                    None => println!(),
                }
            }
        }
    }

    Ok(())
}
