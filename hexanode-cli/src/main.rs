//! hexanode CLI
//!
//! Reconstructs MCP hit positions from delay-line shot files.
#![allow(
    clippy::uninlined_format_args,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::too_many_lines
)]

use clap::{Parser, Subcommand};

use hexanode_algorithms::{find_hits_parallel, process_shots_parallel, HitFinder};
use hexanode_core::{Channel, ConfigError, Parameters, ShotPulses};
use hexanode_io::{DiagnosticsWriter, HitFileWriter, ShotFileReader};
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    HexanodeIo(#[from] hexanode_io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Delay-line anode hit reconstruction.
#[derive(Parser)]
#[command(name = "hexanode")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconstruct hits from a shot file
    Process {
        /// Detector parameter file (JSON)
        #[arg(short, long)]
        params: PathBuf,

        /// Input shot file (JSON Lines)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (.csv for text, anything else for binary)
        #[arg(short, long)]
        output: PathBuf,

        /// Named section of the parameter file holding the detector
        #[arg(long)]
        section: Option<String>,

        /// Emit time-sum residuals of every accepted pair
        #[arg(long)]
        tsum_diagnostics: bool,

        /// Emit raw end-to-end differences of every accepted pair
        #[arg(long)]
        diff_diagnostics: bool,

        /// Diagnostics output file (CSV)
        #[arg(long)]
        diagnostics_output: Option<PathBuf>,

        /// Worker threads (defaults to one per core)
        #[arg(short, long)]
        threads: Option<usize>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show information about a shot file
    Info {
        /// Input shot file (JSON Lines)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Benchmark hit finding on a shot file
    Benchmark {
        /// Detector parameter file (JSON)
        #[arg(short, long)]
        params: PathBuf,

        /// Input shot file (JSON Lines)
        #[arg(short, long)]
        input: PathBuf,

        /// Named section of the parameter file holding the detector
        #[arg(long)]
        section: Option<String>,

        /// Number of iterations
        #[arg(short = 'n', long, default_value = "3")]
        iterations: usize,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

/// Reads every record, keeping per-line failures and aborting on stream errors.
fn read_shots(path: &Path) -> Result<Vec<hexanode_io::Result<ShotPulses>>> {
    let mut shots = Vec::new();
    for shot in ShotFileReader::open(path)? {
        match shot {
            Err(err) if !err.is_per_shot() => return Err(err.into()),
            shot => shots.push(shot),
        }
    }
    Ok(shots)
}

fn load_parameters(path: &Path, section: Option<&str>) -> Result<Parameters> {
    let parameters = match section {
        Some(section) => Parameters::from_file_section(path, section)?,
        None => Parameters::from_file(path)?,
    };
    Ok(parameters)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Process {
            params,
            input,
            output,
            section,
            tsum_diagnostics,
            diff_diagnostics,
            diagnostics_output,
            threads,
            verbose,
        } => {
            init_logging(verbose);

            if let Some(threads) = threads {
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build_global()?;
            }

            let parameters = load_parameters(&params, section.as_deref())?;
            let configured = parameters.diagnostics();
            let diagnostics = configured
                .with_tsum(configured.tsum || tsum_diagnostics)
                .with_diff(configured.diff || diff_diagnostics);
            let finder = HitFinder::new(parameters.with_diagnostics(diagnostics));

            log::info!("parameters: {}", params.display());
            log::info!("input: {}", input.display());
            log::info!(
                "diagnostics: tsum={} diff={}",
                diagnostics.tsum,
                diagnostics.diff
            );
            if diagnostics_output.is_some() && !diagnostics.any() {
                log::warn!("diagnostics output requested but no diagnostics are enabled");
            }

            let start = Instant::now();
            let shots = read_shots(&input)?;
            let processed = process_shots_parallel(&finder, &shots);

            let mut writer = HitFileWriter::create(&output)?;
            log::info!(
                "writing {:?} output to: {}",
                writer.format(),
                output.display()
            );
            let mut diagnostics_writer = match &diagnostics_output {
                Some(path) => Some(DiagnosticsWriter::create(path)?),
                None => None,
            };

            for (shot, hits) in processed.hits.iter().enumerate() {
                writer.write_shot(shot as u64, hits)?;
                if let Some(diagnostics_writer) = diagnostics_writer.as_mut() {
                    diagnostics_writer.write_shot(shot as u64, hits)?;
                }
            }
            writer.flush()?;
            if let Some(diagnostics_writer) = diagnostics_writer.as_mut() {
                diagnostics_writer.flush()?;
            }

            let elapsed = start.elapsed();
            let statistics = processed.statistics;
            println!(
                "Processed {} shots in {:.2}s",
                statistics.shots,
                elapsed.as_secs_f64()
            );
            println!("Failed shots: {}", statistics.failed_shots);
            println!("MCP pulses: {}", statistics.mcp_pulses);
            println!(
                "Hits: {} ({:.1}% of MCP pulses)",
                statistics.hits,
                statistics.hit_fraction() * 100.0
            );
        }

        Commands::Info { input } => {
            let shots = read_shots(&input)?;
            let valid: Vec<&ShotPulses> = shots.iter().filter_map(|shot| shot.as_ref().ok()).collect();

            println!("File: {}", input.display());
            println!("Shots: {}", shots.len());
            println!("Malformed shots: {}", shots.len() - valid.len());

            for channel in Channel::ALL {
                let total: usize = valid
                    .iter()
                    .map(|shot| shot.lists().channel(channel).len())
                    .sum();
                println!("{:<4} pulses: {}", channel.name(), total);
            }

            let (min_mcp, max_mcp) = valid
                .iter()
                .flat_map(|shot| shot.mcp.iter().copied())
                .filter(|time| time.is_finite())
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), time| {
                    (lo.min(time), hi.max(time))
                });
            if min_mcp <= max_mcp {
                println!("MCP time range: {} - {}", min_mcp, max_mcp);
            }
        }

        Commands::Benchmark {
            params,
            input,
            section,
            iterations,
        } => {
            init_logging(false);

            let finder = HitFinder::new(load_parameters(&params, section.as_deref())?);
            let shots: Vec<ShotPulses> = read_shots(&input)?
                .into_iter()
                .filter_map(std::result::Result::ok)
                .collect();
            let pulses: usize = shots.iter().map(|shot| shot.mcp.len()).sum();

            println!(
                "Benchmarking with {} shots ({} MCP pulses), {} iterations",
                shots.len(),
                pulses,
                iterations
            );
            println!(
                "{:<10} | {:<15} | {:<15} | {:<15}",
                "Mode", "Mean Time (ms)", "Min Time (ms)", "Max Time (ms)"
            );
            println!("{:-<65}", "");

            // Warmup
            let hits: usize = find_hits_parallel(&finder, &shots)
                .iter()
                .map(hexanode_core::HitList::len)
                .sum();

            for (name, parallel) in [("Sequential", false), ("Parallel", true)] {
                let mut times = Vec::with_capacity(iterations);
                for _ in 0..iterations {
                    let start = Instant::now();
                    let found: usize = if parallel {
                        find_hits_parallel(&finder, &shots)
                            .iter()
                            .map(hexanode_core::HitList::len)
                            .sum()
                    } else {
                        shots
                            .iter()
                            .map(|shot| finder.find_hits(shot.lists()).len())
                            .sum()
                    };
                    times.push(start.elapsed().as_secs_f64() * 1000.0);
                    debug_assert_eq!(found, hits);
                }

                let min_time = times.iter().fold(f64::INFINITY, |a, &b| a.min(b));
                let max_time = times.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
                let mean_time = times.iter().sum::<f64>() / times.len().max(1) as f64;

                println!(
                    "{:<10} | {:<15.2} | {:<15.2} | {:<15.2}",
                    name, mean_time, min_time, max_time
                );
            }
            println!("Hits per pass: {}", hits);
        }
    }

    Ok(())
}
