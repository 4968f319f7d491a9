//! Error types for key material handling.
//!
//! Every failure here is deterministic: malformed static input or a broken
//! derivation. Nothing is transient and nothing is worth retrying. Callers
//! decide how to present a failure (exit code, HTTP status) using
//! [`HdcpError::is_input_error`].

use std::{io, path::PathBuf};

use thiserror::Error;

use crate::key::Role;

/// Reasons a key file cannot be turned into a [`crate::MasterMatrix`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyFileError {
    /// A token is not a hexadecimal integer
    #[error("invalid hex token {token:?} on line {line}")]
    InvalidToken {
        /// 1-based line number of the token
        line: usize,
        /// The offending token
        token: String,
    },

    /// The file did not contain exactly 40x40 entries
    #[error("expected 1600 entries, found {found}")]
    EntryCount {
        /// Number of entries actually read
        found: usize,
    },
}

/// Errors from matrix loading, KSV handling and key agreement.
#[derive(Error, Debug)]
pub enum HdcpError {
    /// Key file content is unusable. No partial matrix is ever returned.
    #[error("malformed key file: {0}")]
    MalformedKeyFile(#[from] KeyFileError),

    /// Key file could not be read
    #[error("failed to read key file {}: {source}", .path.display())]
    KeyFileIo {
        /// Path that was being read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Externally supplied KSV text is not a valid 40-bit hex value
    #[error("invalid KSV {input:?}: {reason}")]
    InvalidKsvFormat {
        /// The rejected input
        input: String,
        /// Why it was rejected
        reason: &'static str,
    },

    /// KSV does not have exactly 20 bits set
    #[error("KSV {ksv:010x} has {weight} bits set, expected 20")]
    InvalidKsvWeight {
        /// The rejected value
        ksv: u64,
        /// Its population count
        weight: u32,
    },

    /// Role name is neither `source` nor `sink`
    #[error("unknown key role: {0:?}")]
    UnknownRole(String),

    /// A device key was supplied in the wrong position of an agreement check
    #[error("expected a {expected} key, found a {found} key")]
    RoleMismatch {
        /// Role required at that position
        expected: Role,
        /// Role of the key actually supplied
        found: Role,
    },

    /// Source and sink computed different shared secrets.
    ///
    /// Indicates a derivation bug or corrupted key material, never a normal
    /// runtime condition.
    #[error(
        "shared secret mismatch: sink computed {sink_secret:014x}, source computed {source_secret:014x}"
    )]
    AgreementMismatch {
        /// Secret computed from the sink key and the source KSV
        sink_secret: u64,
        /// Secret computed from the source key and the sink KSV
        source_secret: u64,
    },
}

impl HdcpError {
    /// Returns true if the error was caused by caller-supplied request data
    /// (KSV text, role name) rather than by key material or a derivation bug.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidKsvFormat { .. } | Self::InvalidKsvWeight { .. } | Self::UnknownRole(_)
        )
    }
}
