//! Command-line error types.

use std::io;

use hdcp_keys::HdcpError;
use thiserror::Error;

/// Exit code for invalid user input (bad KSV, unknown role).
pub const EXIT_INPUT: u8 = 2;

/// Exit code for key material errors and failed self-tests.
pub const EXIT_FAILURE: u8 = 1;

/// Errors that abort a command-line run.
#[derive(Error, Debug)]
pub enum CliError {
    /// Key loading, KSV validation or agreement failure
    #[error(transparent)]
    Key(#[from] HdcpError),

    /// Writing output failed
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),

    /// JSON serialization failed
    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Key(err) if err.is_input_error() => EXIT_INPUT,
            _ => EXIT_FAILURE,
        }
    }
}
