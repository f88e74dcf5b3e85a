//! Progress tracking for export operations.
//!
//! Completion is derived from the page offset and the server-reported total
//! count, and reset to zero whenever a job ends so the presentation layer
//! never shows a stale number. A progress bar can be attached for terminal
//! feedback.

use std::sync::atomic::{AtomicU8, Ordering};

use indicatif::{ProgressBar, ProgressStyle};

/// Completion percentage for a walk position.
///
/// `round(offset / total * 100)`, clamped to `[0, 100]`. A total of zero is
/// 0%, not an arithmetic fault; the offset may overshoot the total on the
/// last page because it advances by the fixed page size.
pub fn percent(offset: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = (offset as f64 / total as f64) * 100.0;
    pct.round().min(100.0) as u8
}

/// Progress tracker for one export job.
pub struct ProgressTracker {
    current: AtomicU8,
    bar: Option<ProgressBar>,
}

impl ProgressTracker {
    /// Create a new progress tracker.
    ///
    /// # Arguments
    /// * `enable_bar` - Whether to display a terminal progress bar
    pub fn new(enable_bar: bool) -> Self {
        let bar = if enable_bar {
            let bar = ProgressBar::new(100);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}% {msg}")
                    .unwrap()
                    .progress_chars("#>-"),
            );
            Some(bar)
        } else {
            None
        };

        Self {
            current: AtomicU8::new(0),
            bar,
        }
    }

    /// Update progress from the walk position.
    pub fn update(&self, offset: u64, total: u64) {
        let pct = percent(offset, total);
        self.current.store(pct, Ordering::Relaxed);

        if let Some(ref bar) = self.bar {
            bar.set_position(pct as u64);
            bar.set_message(format!("({offset} of {total} records)"));
        }
    }

    /// Current completion percentage.
    pub fn current(&self) -> u8 {
        self.current.load(Ordering::Relaxed)
    }

    /// Reset to zero and clear the bar.
    ///
    /// Called at job completion, cancellation, and failure alike.
    pub fn reset(&self) {
        self.current.store(0, Ordering::Relaxed);
        if let Some(ref bar) = self.bar {
            bar.finish_and_clear();
        }
    }
}
