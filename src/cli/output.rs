//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::ApiError;

/// Map domain/service errors to a string for CLI output.
pub fn map_error(e: &ApiError) -> String {
    format!("error: {}", e)
}

/// Everything a command produced: the main output for stdout plus
/// diagnostics destined for stderr.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunOutput {
    pub stdout: String,
    pub stderr: Vec<String>,
}

impl RunOutput {
    pub fn text(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: Vec::new(),
        }
    }

    pub fn with_diagnostics(mut self, lines: Vec<String>) -> Self {
        self.stderr = lines;
        self
    }
}
