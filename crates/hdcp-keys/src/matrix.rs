//! Master key matrix parsing and access.
//!
//! # Key File Format
//!
//! Plain text. Lines whose first character is `#` are comments. Everything
//! else is a stream of whitespace-separated hex tokens read in row-major
//! order: the first 40 tokens are row 0, the next 40 row 1, and so on. Row
//! boundaries are independent of line boundaries.
//!
//! ```text
//! # comment
//! 00a1b2c3d4e5f6 0011223344556 ...   (1600 tokens in total)
//! ```
//!
//! Tokens are not range-checked against 56 bits. Wider values are kept as
//! their low 64 bits; derivation reduces everything mod 2^56 anyway.

use std::{fmt, fs, path::Path, str::FromStr};

use zeroize::{Zeroize, Zeroizing};

use crate::error::{HdcpError, KeyFileError};

/// Number of rows (and columns) in the master matrix.
pub const MATRIX_SIZE: usize = 40;

/// Total number of entries in a key file.
pub const MATRIX_ENTRIES: usize = MATRIX_SIZE * MATRIX_SIZE;

/// Mask reducing a value to the 56-bit key space.
pub const KEY_MASK: u64 = (1 << 56) - 1;

/// Tokens written per line by [`MasterMatrix::to_key_file`]
const TOKENS_PER_LINE: usize = 8;

/// The 40x40 master key matrix.
///
/// Immutable once built. Share it by reference (or behind an `Arc`) across
/// any number of concurrent derivations. Entries are zeroized on drop and
/// never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct MasterMatrix {
    rows: Box<[[u64; MATRIX_SIZE]; MATRIX_SIZE]>,
}

impl MasterMatrix {
    /// Build a matrix from explicit rows.
    pub fn from_rows(rows: [[u64; MATRIX_SIZE]; MATRIX_SIZE]) -> Self {
        Self { rows: Box::new(rows) }
    }

    /// Load and parse a key file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, HdcpError> {
        let path = path.as_ref();
        let text = Zeroizing::new(
            fs::read_to_string(path)
                .map_err(|source| HdcpError::KeyFileIo { path: path.to_path_buf(), source })?,
        );

        text.parse()
    }

    /// Parse a matrix from a sequence of key file lines.
    ///
    /// Fails with [`HdcpError::MalformedKeyFile`] on the first non-hex token,
    /// or if the total token count is anything other than 1600.
    pub fn parse_lines<I, S>(lines: I) -> Result<Self, HdcpError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut matrix = Self { rows: Box::new([[0; MATRIX_SIZE]; MATRIX_SIZE]) };
        let mut found = 0usize;

        for (index, line) in lines.into_iter().enumerate() {
            let line = line.as_ref();
            if line.starts_with('#') {
                continue;
            }

            for token in line.split_whitespace() {
                let value = parse_hex_token(token).ok_or_else(|| KeyFileError::InvalidToken {
                    line: index + 1,
                    token: token.to_string(),
                })?;

                // Keep counting past the end so the error reports the real total
                if found < MATRIX_ENTRIES {
                    matrix.rows[found / MATRIX_SIZE][found % MATRIX_SIZE] = value;
                }
                found += 1;
            }
        }

        if found != MATRIX_ENTRIES {
            return Err(KeyFileError::EntryCount { found }.into());
        }

        Ok(matrix)
    }

    /// Entry at `row`, `column`.
    ///
    /// # Panics
    ///
    /// Panics if either index is `>= 40`.
    pub fn entry(&self, row: usize, column: usize) -> u64 {
        self.rows[row][column]
    }

    /// Iterate rows in order.
    pub fn rows(&self) -> impl Iterator<Item = &[u64; MATRIX_SIZE]> {
        self.rows.iter()
    }

    /// Transposed copy: row `i` of the result is column `i` of `self`.
    pub fn transpose(&self) -> Self {
        let mut rows = Box::new([[0; MATRIX_SIZE]; MATRIX_SIZE]);
        for (i, row) in self.rows().enumerate() {
            for (j, &value) in row.iter().enumerate() {
                rows[j][i] = value;
            }
        }
        Self { rows }
    }

    /// Serialize to the key file format.
    ///
    /// Every entry is written as 14-digit lowercase hex, which round-trips
    /// through [`MasterMatrix::parse_lines`] exactly.
    pub fn to_key_file(&self) -> String {
        let mut out = String::with_capacity(MATRIX_ENTRIES * 15 + 64);
        out.push_str("# HDCP master key matrix: 40 rows of 40 entries, row-major\n");

        for row in self.rows() {
            for chunk in row.chunks(TOKENS_PER_LINE) {
                let line: Vec<String> = chunk.iter().map(|value| format!("{value:014x}")).collect();
                out.push_str(&line.join(" "));
                out.push('\n');
            }
        }

        out
    }
}

impl FromStr for MasterMatrix {
    type Err = HdcpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_lines(s.lines())
    }
}

impl fmt::Debug for MasterMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MasterMatrix").finish_non_exhaustive()
    }
}

impl Drop for MasterMatrix {
    fn drop(&mut self) {
        self.rows.zeroize();
    }
}

/// Parse a hex token, keeping the low 64 bits of oversized values.
fn parse_hex_token(token: &str) -> Option<u64> {
    let digits = token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")).unwrap_or(token);
    if digits.is_empty() {
        return None;
    }

    digits.chars().try_fold(0u64, |acc, c| c.to_digit(16).map(|digit| (acc << 4) | u64::from(digit)))
}
