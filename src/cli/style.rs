//! Terminal styling helpers shared by the CLI commands.
//!
//! All color goes through [`Stylize`] so the palette stays consistent;
//! `anstream` strips the codes when stdout is not a terminal.

use indicatif::ProgressStyle;
use owo_colors::OwoColorize;

/// Check mark used in completion messages
pub const CHECK: &str = "\u{2713}";

/// Green check mark
pub fn check() -> String {
    CHECK.green().to_string()
}

/// Arrow used between branch names
pub fn arrow() -> String {
    "\u{2192}".dimmed().to_string()
}

/// Spinner style used for long-running remote operations
pub fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// Semantic color roles for CLI output
pub trait Stylize {
    /// De-emphasized secondary text
    fn muted(&self) -> String;
    /// Branch names, MR ids, and other identifiers
    fn accent(&self) -> String;
    /// Section and action headings
    fn emphasis(&self) -> String;
    /// Completed-successfully markers
    fn success(&self) -> String;
    /// Warnings and soft failures
    fn warn(&self) -> String;
}

impl<T: std::fmt::Display> Stylize for T {
    fn muted(&self) -> String {
        self.dimmed().to_string()
    }

    fn accent(&self) -> String {
        self.cyan().to_string()
    }

    fn emphasis(&self) -> String {
        self.bold().to_string()
    }

    fn success(&self) -> String {
        self.green().to_string()
    }

    fn warn(&self) -> String {
        self.yellow().to_string()
    }
}
