use anyhow::Context;
use clap::{Parser, Subcommand};
use dialoguer::Confirm;
use log::{info, warn};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use photo_culler_core::config::LogLevel;
use photo_culler_core::gallery::{DirectoryGallery, DiskStorage};
use photo_culler_core::logging::{init_file_logger, init_logger};
use photo_culler_core::processing::{ProgressTracker, ScanProgress};
use photo_culler_core::{AssetId, Config, Error, PhotoCuller, ScanSummary, SelectionResult};

#[derive(Parser)]
#[command(name = "photo-culler")]
#[command(about = "Find the photos you are least likely to miss")]
#[command(version)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Write logs to a rotating file in this directory instead of the terminal
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a photo directory and report what was found
    Scan {
        /// Directory holding the photos
        directory: PathBuf,
    },

    /// Print deletion candidates
    Select {
        /// Directory holding the photos
        directory: PathBuf,

        /// Candidates per round (defaults to the configured selection size)
        #[arg(short)]
        k: Option<usize>,

        /// Number of successive selections; later rounds never repeat earlier ones
        #[arg(long, default_value_t = 1)]
        rounds: usize,

        /// Photo ids (paths relative to the directory) never to suggest
        #[arg(long)]
        exclude: Vec<String>,

        /// Print candidates as JSON
        #[arg(long)]
        json: bool,
    },

    /// Select candidates and delete them after confirmation
    Clean {
        /// Directory holding the photos
        directory: PathBuf,

        /// Number of candidates to delete
        #[arg(short)]
        k: Option<usize>,

        /// Move photos here instead of deleting them
        #[arg(long)]
        trash_dir: Option<PathBuf>,

        /// Do not ask for confirmation
        #[arg(long)]
        yes: bool,
    },

    /// Generate default configuration file
    GenerateConfig {
        /// Path to save configuration file
        #[arg(default_value = "photo-culler.json")]
        path: PathBuf,
    },
}

fn main() -> Result<(), anyhow::Error> {
    // Parse command line arguments
    let cli = Cli::parse();

    match &cli.command {
        Commands::GenerateConfig { path } => {
            let config = Config::default();
            config.save_to_file(path)?;
            println!("Configuration file generated at: {}", path.display());
            Ok(())
        }

        Commands::Scan { directory } => {
            let config = load_config(&cli)?;
            let gallery = DirectoryGallery::from_config(directory, &config);
            let mut culler = PhotoCuller::new(config)?;

            let summary = run_scan(&mut culler, &gallery)?;
            print_summary(&summary);

            let usage = culler.storage_usage(&DiskStorage::new(directory));
            println!(
                "Storage: {:.1} GB used of {:.1} GB ({:.0}%)",
                gigabytes(usage.used_bytes()),
                gigabytes(usage.total_bytes),
                usage.used_fraction() * 100.0
            );
            Ok(())
        }

        Commands::Select {
            directory,
            k,
            rounds,
            exclude,
            json,
        } => {
            let (rounds, json) = (*rounds, *json);
            let config = load_config(&cli)?;
            let k = k.unwrap_or(config.selection_size);
            let gallery = DirectoryGallery::from_config(directory, &config);
            let mut culler = PhotoCuller::new(config)?;

            let summary = run_scan(&mut culler, &gallery)?;
            if !json {
                print_summary(&summary);
            }

            let excluded: Vec<AssetId> = exclude.iter().map(|id| AssetId::new(id.as_str())).collect();
            let mut results = Vec::with_capacity(rounds);
            for round in 1..=rounds {
                let result = culler.select(&excluded, k);
                if result.is_empty() {
                    info!("Nothing left to select after {} rounds", round - 1);
                    break;
                }
                if !json {
                    println!("\nRound {}:", round);
                    print_selection(&culler, &result, cli.verbose > 0);
                }
                results.push(result);
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else if results.is_empty() {
                println!("No candidates.");
            }
            Ok(())
        }

        Commands::Clean {
            directory,
            k,
            trash_dir,
            yes,
        } => {
            let mut config = load_config(&cli)?;
            if trash_dir.is_some() {
                config.trash_dir = trash_dir.clone();
            }
            let k = k.unwrap_or(config.selection_size);
            let gallery = DirectoryGallery::from_config(directory, &config);
            let mut culler = PhotoCuller::new(config)?;

            let summary = run_scan(&mut culler, &gallery)?;
            print_summary(&summary);

            let result = culler.select(&[], k);
            if result.is_empty() {
                println!("No candidates.");
                return Ok(());
            }
            print_selection(&culler, &result, cli.verbose > 0);

            let action = match culler.config().trash_dir {
                Some(ref dir) => format!("Move {} photos to {}?", result.len(), dir.display()),
                None => format!("Permanently delete {} photos?", result.len()),
            };
            let confirmed = *yes
                || Confirm::new()
                    .with_prompt(action)
                    .default(false)
                    .interact()
                    .context("Failed to read confirmation")?;
            if !confirmed {
                println!("Nothing deleted.");
                return Ok(());
            }

            let removed = culler.delete(&gallery, &result.ids())?;
            println!("Removed {} photos.", removed);
            Ok(())
        }
    }
}

/// Load the configuration and start logging at the requested verbosity
fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    // Set up configuration
    let mut config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else {
        Config::default()
    };

    // Set log level based on verbosity
    config.log_level = match cli.verbose {
        0 => config.log_level,
        1 => LogLevel::Debug,
        _ => LogLevel::Trace,
    };

    match &cli.log_dir {
        Some(dir) => {
            init_file_logger(dir, config.log_level)?;
        }
        None => init_logger(config.log_level),
    }

    config.validate()?;
    Ok(config)
}

/// Scan with a progress bar; Ctrl-C stops the scan between batches
fn run_scan(culler: &mut PhotoCuller, gallery: &DirectoryGallery) -> anyhow::Result<ScanSummary> {
    let cancel = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&cancel);
    if let Err(e) = ctrlc::set_handler(move || handler_flag.store(true, Ordering::SeqCst)) {
        warn!("Could not install Ctrl-C handler: {}", e);
    }

    info!("Scanning {}", gallery.root().display());
    let mut tracker = ProgressTracker::new();
    let mut on_progress = |event: ScanProgress| tracker.handle(event);

    match culler.scan_with(gallery, &cancel, Some(&mut on_progress)) {
        Ok(summary) => Ok(summary),
        Err(Error::Cancelled) => {
            tracker.abandon("Cancelled");
            anyhow::bail!("Scan cancelled")
        }
        Err(e) => Err(e).with_context(|| format!("Failed to scan {}", gallery.root().display())),
    }
}

fn print_summary(summary: &ScanSummary) {
    println!(
        "Analyzed {} of {} photos in {:.1}s",
        summary.analyzed,
        summary.listed,
        summary.elapsed.as_secs_f64()
    );
    for skip in &summary.skipped {
        println!("  skipped {}: {}", skip.id, skip.reason);
    }
}

fn print_selection(culler: &PhotoCuller, result: &SelectionResult, explain: bool) {
    for (rank, selected) in result.iter().enumerate() {
        println!(
            "{:>3}. {:>5.1}  {}  ({})",
            rank + 1,
            selected.photo.score,
            selected.photo.id(),
            selected.reason
        );
        if explain {
            for penalty in culler.explain(&selected.photo) {
                println!("         {:?}: {:+.1}", penalty.kind, penalty.points);
            }
        }
    }
}

fn gigabytes(bytes: u64) -> f64 {
    bytes as f64 / 1_000_000_000.0
}
