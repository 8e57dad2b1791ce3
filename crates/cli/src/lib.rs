// Shared CLI plumbing for the gmark binary.

pub mod edit;
pub mod exit_codes;
pub mod stats;

use exit_codes::{EXIT_IO, EXIT_PARSE, EXIT_USAGE};

/// A CLI failure with its exit code and an optional hint for the user.
#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(message: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: message.into(), hint: None }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: message.into(), hint: None }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self { code: EXIT_PARSE, message: message.into(), hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Print `error:` and `hint:` lines to stderr.
    pub fn print(&self) {
        eprintln!("error: {}", self.message);
        if let Some(hint) = &self.hint {
            eprintln!("hint: {}", hint);
        }
    }
}
