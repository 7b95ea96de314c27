//! Progress reporting for CLI

use crate::application::ProgressEvent;
use indicatif::{ProgressBar, ProgressStyle};

/// Progress reporter using indicatif
///
/// Renders [`ProgressEvent`]s as a percentage bar.
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Creates a new progress reporter
    pub fn new() -> Self {
        let bar = ProgressBar::new(100);
        let template =
            "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos:>3}% {msg}";
        if let Ok(style) = ProgressStyle::default_bar().template(template) {
            bar.set_style(style.progress_chars("#>-"));
        }
        Self { bar }
    }

    /// Creates a reporter that draws nothing
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Applies one event to the bar
    pub fn handle(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Update { percent, message } => {
                self.bar.set_position(u64::from(*percent));
                self.bar.set_message(message.clone());
            }
            ProgressEvent::Finished { success, message } => {
                if *success {
                    self.bar.set_position(100);
                }
                self.bar.finish_with_message(message.clone());
            }
        }
    }

    /// Returns the current position in percent
    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_updates_and_completion() {
        let reporter = ProgressReporter::hidden();
        reporter.handle(&ProgressEvent::Update {
            percent: 30,
            message: "Analyzing payload content...".into(),
        });
        assert_eq!(reporter.position(), 30);
        reporter.handle(&ProgressEvent::Finished {
            success: true,
            message: "done".into(),
        });
        assert_eq!(reporter.position(), 100);
    }
}
