//! Terminal progress bar fed by the core progress tracker

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use ziplet_core::{ProgressCallback, ProgressUnit};

/// Renders [`ziplet_core::Progress`] updates as an indicatif bar
pub struct ProgressBarCallback {
    bar: ProgressBar,
}

impl ProgressBarCallback {
    pub fn new(unit: ProgressUnit) -> Self {
        let template = match unit {
            ProgressUnit::Entries => {
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}"
            }
            ProgressUnit::Bytes => {
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}) {msg}"
            }
        };

        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(template)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    pub fn abandon(&self) {
        self.bar.abandon();
    }
}

impl ProgressCallback for ProgressBarCallback {
    fn on_progress(&self, completed: u64, total: u64) {
        self.bar.set_length(total);
        self.bar.set_position(completed);
    }

    fn on_entry(&self, name: &str) {
        self.bar.set_message(name.to_string());
    }
}
