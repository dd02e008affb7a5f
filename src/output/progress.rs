//! Progress indicators for paginated fetches.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Spinner counting items as pages arrive.
pub struct FetchProgress {
    bar: ProgressBar,
    label: String,
    fetched: usize,
}

impl FetchProgress {
    pub fn start(label: impl Into<String>) -> Self {
        let label = label.into();
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            bar.set_style(style);
        }
        bar.set_message(label.clone());
        bar.enable_steady_tick(Duration::from_millis(100));

        Self {
            bar,
            label,
            fetched: 0,
        }
    }

    /// Count one more fetched item.
    pub fn inc(&mut self) {
        self.fetched += 1;
        self.bar
            .set_message(format!("{} ({} fetched)", self.label, self.fetched));
    }

    pub fn fetched(&self) -> usize {
        self.fetched
    }

    /// Remove the spinner from the terminal.
    pub fn finish(self) {
        self.bar.finish_and_clear();
    }

    /// Leave the spinner and its count on screen after a failure.
    pub fn fail(self) {
        self.bar.abandon();
    }
}
