use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use std::time::Instant;
use sysinfo::System;

/// Scan lifecycle events reported to the caller's progress callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanProgress {
    /// Listing done; `total` distinct assets will be processed
    Started { total: usize, batches: usize },

    /// One batch finished. `processed` counts assets handled so far,
    /// successful or skipped.
    BatchComplete {
        batch: usize,
        batches: usize,
        processed: usize,
        skipped: usize,
    },

    /// Every batch ran to completion
    Finished { analyzed: usize, skipped: usize },
}

/// Terminal progress bar driven by [`ScanProgress`] events
pub struct ProgressTracker {
    bar: ProgressBar,
    start_time: Instant,
    batch_start_time: Instant,
    last_processed: usize,
    /// Memory usage tracking
    system: System,
    start_memory_mb: u64,
    peak_memory_mb: u64,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::with_bar(ProgressBar::new(0))
    }

    /// Tracker that updates its counters but draws nothing
    pub fn hidden() -> Self {
        Self::with_bar(ProgressBar::hidden())
    }

    fn with_bar(bar: ProgressBar) -> Self {
        let style = ProgressStyle::default_bar()
            .template("{wide_bar} {pos}/{len} ({percent}%) | {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░ ");
        bar.set_style(style);

        let mut system = System::new();
        system.refresh_memory();
        let start_memory_mb = system.used_memory() / 1024 / 1024;

        let now = Instant::now();
        Self {
            bar,
            start_time: now,
            batch_start_time: now,
            last_processed: 0,
            system,
            start_memory_mb,
            peak_memory_mb: start_memory_mb,
        }
    }

    /// Position of the bar (assets handled so far)
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn handle(&mut self, event: ScanProgress) {
        match event {
            ScanProgress::Started { total, batches } => {
                self.bar.set_length(total as u64);
                self.bar.set_position(0);
                self.bar.set_message(format!("Analyzing {} batches...", batches));
                self.start_time = Instant::now();
                self.batch_start_time = self.start_time;
                self.last_processed = 0;
            }
            ScanProgress::BatchComplete {
                batch,
                batches,
                processed,
                skipped,
            } => {
                let batch_elapsed = self.batch_start_time.elapsed().as_secs_f64();
                let batch_processed = processed.saturating_sub(self.last_processed);
                let rate = if batch_elapsed > 0.0 {
                    batch_processed as f64 / batch_elapsed
                } else {
                    0.0
                };

                self.record_memory();
                info!(
                    "Batch {}/{}: {:.1} img/s, memory {}MB (peak: {}MB)",
                    batch, batches, rate, self.current_memory_mb(), self.peak_memory_mb
                );

                self.bar.set_position(processed as u64);
                self.bar.set_message(format!(
                    "{:.1} img/s | {} ok | {} skipped",
                    rate,
                    processed.saturating_sub(skipped),
                    skipped
                ));

                self.batch_start_time = Instant::now();
                self.last_processed = processed;
            }
            ScanProgress::Finished { analyzed, skipped } => {
                let elapsed = self.start_time.elapsed().as_secs_f64();
                let throughput = if elapsed > 0.0 {
                    (analyzed + skipped) as f64 / elapsed
                } else {
                    0.0
                };
                self.bar.finish_with_message(format!(
                    "Completed {} images | {} ok | {} skipped | {:.1}s elapsed | {:.1} img/s",
                    analyzed + skipped,
                    analyzed,
                    skipped,
                    elapsed,
                    throughput
                ));
                info!(
                    "Memory change over scan: {:+}MB (peak: {}MB)",
                    self.current_memory_mb() as i64 - self.start_memory_mb as i64,
                    self.peak_memory_mb
                );
            }
        }
    }

    /// Stop drawing without marking the bar complete (e.g. on cancellation)
    pub fn abandon(&self, message: &str) {
        self.bar.abandon_with_message(message.to_string());
    }

    fn record_memory(&mut self) {
        self.system.refresh_memory();
        let current = self.current_memory_mb();
        if current > self.peak_memory_mb {
            self.peak_memory_mb = current;
        }
    }

    fn current_memory_mb(&self) -> u64 {
        self.system.used_memory() / 1024 / 1024
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_follows_events() {
        let mut tracker = ProgressTracker::hidden();
        tracker.handle(ScanProgress::Started {
            total: 10,
            batches: 2,
        });
        tracker.handle(ScanProgress::BatchComplete {
            batch: 1,
            batches: 2,
            processed: 5,
            skipped: 1,
        });
        assert_eq!(tracker.position(), 5);

        tracker.handle(ScanProgress::BatchComplete {
            batch: 2,
            batches: 2,
            processed: 10,
            skipped: 1,
        });
        tracker.handle(ScanProgress::Finished {
            analyzed: 9,
            skipped: 1,
        });
        assert_eq!(tracker.position(), 10);
    }
}
