//! HDCP Pairwise Key Derivation
//!
//! Derives HDCP source and sink private keys from a 40x40 master key matrix.
//! Pure functions over an immutable matrix; the only I/O is the one-time key
//! file load, and the only shared mutable state is the RNG used for KSV
//! generation (thread-local by default, caller-provided for tests).
//!
//! # Key Derivation
//!
//! ```text
//! Master Matrix (40x40, 56-bit entries)
//!        │
//!        ├── KSV selects 20 rows ──────────► Source Key (40 elements)
//!        │
//!        └── KSV selects 20 transposed rows ► Sink Key (40 elements)
//! ```
//!
//! # Key Agreement
//!
//! A source with KSV `s` and a sink with KSV `t` exchange KSVs. Each sums
//! the elements of its own key selected by the peer's KSV. Both arrive at
//! the same 56-bit secret:
//!
//! ```text
//! sink:   sum(sink_key[i]   for i in s) ┐
//!                                       ├─ == sum(M[i][j] for i in s, j in t)
//! source: sum(source_key[j] for j in t) ┘
//! ```
//!
//! # Security
//!
//! - Matrix and key material is zeroized on drop and hidden from `Debug`
//! - KSVs are validated: 40 bits wide, exactly 20 bits set
//! - Anyone holding the matrix can mint keys for any device; the matrix
//!   must never leave the process that loaded it

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod agreement;
pub mod document;
pub mod error;
pub mod key;
pub mod ksv;
pub mod matrix;

use std::path::Path;

pub use agreement::{
    Agreement, SelfTest, check_agreement, compute_agreement, self_test, shared_secret,
    verify_agreement,
};
pub use document::{HumanReadable, KeyDocument};
pub use error::{HdcpError, KeyFileError};
pub use key::{DeviceKey, Role, derive_key};
pub use ksv::{KSV_BITS, KSV_WEIGHT, Ksv, generate_ksv};
pub use matrix::{KEY_MASK, MATRIX_ENTRIES, MATRIX_SIZE, MasterMatrix};

/// Load the master key matrix from a key file.
///
/// Shorthand for [`MasterMatrix::load`].
pub fn load_matrix(path: impl AsRef<Path>) -> Result<MasterMatrix, HdcpError> {
    MasterMatrix::load(path)
}
