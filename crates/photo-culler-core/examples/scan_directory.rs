use photo_culler_core::gallery::DirectoryGallery;
use photo_culler_core::logging::init_logger;
use photo_culler_core::{config::LogLevel, Config, PhotoCuller};
use log::{error, info};
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    init_logger(LogLevel::Debug);

    // Create a basic configuration
    let config = Config {
        max_depth: Some(5), // Limit directory depth
        ..Config::default()
    };

    // Directory to scan, first argument or the current directory
    let directory = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let gallery = DirectoryGallery::from_config(&directory, &config);

    let mut culler = PhotoCuller::new(config)?;
    match culler.scan(&gallery) {
        Ok(summary) => {
            info!(
                "Analyzed {} of {} photos, {} skipped",
                summary.analyzed,
                summary.listed,
                summary.skipped.len()
            );
        }
        Err(e) => {
            error!("Error scanning photos: {}", e);
            return Err(e.into());
        }
    }

    for selected in culler.select_default(&[]).iter() {
        println!(
            "{:>5.1}  {}  ({})",
            selected.photo.score,
            selected.photo.id(),
            selected.reason
        );
    }
    Ok(())
}
