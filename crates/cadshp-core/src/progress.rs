//! Ready-made [`Progress`] sinks.

use cadshp_core_common::Progress;
use log::{debug, info};

/// Discards every report.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentProgress;

impl Progress for SilentProgress {
    fn begin(&mut self, _label: &str) {}

    fn percent(&mut self, _value: u32) {}

    fn detail(&mut self, _text: &str) {}
}

/// Forwards progress to the log.
///
/// Phase changes and percentage changes are logged at info level, details at debug
/// level. Repeated percentages are suppressed.
#[derive(Debug, Clone, Default)]
pub struct LogProgress {
    label: String,
    last_percent: Option<u32>,
}

impl LogProgress {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The label of the current phase.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The last reported percentage of the current phase.
    #[must_use]
    pub fn last_percent(&self) -> Option<u32> {
        self.last_percent
    }
}

impl Progress for LogProgress {
    fn begin(&mut self, label: &str) {
        label.clone_into(&mut self.label);
        self.last_percent = None;
        info!("{label}...");
    }

    fn percent(&mut self, value: u32) {
        if self.last_percent != Some(value) {
            self.last_percent = Some(value);
            info!("{}: {value}%", self.label);
        }
    }

    fn detail(&mut self, text: &str) {
        debug!("{}: {text}", self.label);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_progress_tracks_phase() {
        let mut progress = LogProgress::new();
        progress.begin("Reading files");
        progress.percent(50);
        progress.percent(50);
        assert_eq!(progress.label(), "Reading files");
        assert_eq!(progress.last_percent(), Some(50));

        progress.begin("Writing");
        assert_eq!(progress.last_percent(), None);
    }
}
