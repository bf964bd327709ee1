//! Terminal feedback: activity log lines and spinners.

use std::time::Duration;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use harp_updater_core::activity::{LogEntry, LogLevel, LogSink};

/// Prints activity entries to stderr as the deploy flow writes them.
pub struct ConsoleSink {
    quiet: bool,
    verbose: bool,
}

impl ConsoleSink {
    /// `quiet` suppresses everything, for JSON output.
    pub fn new(quiet: bool, verbose: bool) -> Self {
        Self { quiet, verbose }
    }
}

impl LogSink for ConsoleSink {
    fn on_entry(&self, entry: &LogEntry) {
        if self.quiet || (entry.level == LogLevel::Debug && !self.verbose) {
            return;
        }
        let line = entry.to_string();
        let line = match entry.level {
            LogLevel::Info => line.normal(),
            LogLevel::Success => line.green(),
            LogLevel::Warning => line.yellow(),
            LogLevel::Error => line.red(),
            LogLevel::Debug => line.dimmed(),
        };
        eprintln!("{}", line);
    }
}

/// Spinner shown while a regulator call is in flight; hidden for JSON output.
pub fn spinner(message: impl Into<String>, hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.into());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
