//! Key Selection Vectors.
//!
//! A KSV is a device's public identifier: a 40-bit value with exactly 20
//! bits set. Bit `i` (LSB first) selects row `i` of the master matrix.

use std::{fmt, str::FromStr};

use rand::{Rng, seq::SliceRandom};

use crate::{error::HdcpError, matrix::MATRIX_SIZE};

/// Number of bits in a KSV.
pub const KSV_BITS: usize = MATRIX_SIZE;

/// Number of bits set in every valid KSV.
pub const KSV_WEIGHT: u32 = 20;

/// Hex digits in the canonical text form.
pub const KSV_HEX_DIGITS: usize = 10;

/// A validated Key Selection Vector.
///
/// Construction always checks the invariant: value below `2^40` with a
/// population count of exactly 20. Externally supplied values that break it
/// are rejected, since the key agreement only holds for conforming KSVs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ksv(u64);

impl Ksv {
    /// Validate a raw 40-bit value.
    pub fn new(value: u64) -> Result<Self, HdcpError> {
        if value >> KSV_BITS != 0 {
            return Err(HdcpError::InvalidKsvFormat {
                input: format!("{value:x}"),
                reason: "wider than 40 bits",
            });
        }

        let weight = value.count_ones();
        if weight != KSV_WEIGHT {
            return Err(HdcpError::InvalidKsvWeight { ksv: value, weight });
        }

        Ok(Self(value))
    }

    /// Generate a uniformly random KSV.
    ///
    /// Shuffles twenty ones and twenty zeros, then reads the result as a
    /// binary number with the first position as the most significant bit.
    /// Every one of the C(40, 20) arrangements is equally likely.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut positions = [false; KSV_BITS];
        positions[..KSV_WEIGHT as usize].fill(true);
        positions.shuffle(rng);

        let value = positions.iter().fold(0u64, |acc, &bit| (acc << 1) | u64::from(bit));
        Self(value)
    }

    /// Parse the fixed-width wire form: exactly 10 hex digits, no prefix.
    pub fn parse_wire(text: &str) -> Result<Self, HdcpError> {
        let invalid = || HdcpError::InvalidKsvFormat {
            input: text.to_string(),
            reason: "expected exactly 10 hex digits",
        };

        if text.len() != KSV_HEX_DIGITS || !text.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let value = u64::from_str_radix(text, 16).map_err(|_| invalid())?;
        Self::new(value)
    }

    /// Raw 40-bit value.
    pub fn value(self) -> u64 {
        self.0
    }

    /// Returns true if bit `index` is set.
    pub fn selects(self, index: usize) -> bool {
        index < KSV_BITS && (self.0 >> index) & 1 == 1
    }

    /// Indices of the set bits, lowest first.
    pub fn selected_rows(self) -> impl Iterator<Item = usize> {
        (0..KSV_BITS).filter(move |&index| self.selects(index))
    }
}

impl FromStr for Ksv {
    type Err = HdcpError;

    /// Accepts hex digits with an optional `0x` prefix. Leading zeros are
    /// allowed; the value itself must fit in 40 bits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| HdcpError::InvalidKsvFormat { input: s.to_string(), reason };

        let digits = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
        if digits.is_empty() {
            return Err(invalid("empty"));
        }
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid("not hexadecimal"));
        }

        let value = u64::from_str_radix(digits, 16).map_err(|_| invalid("wider than 40 bits"))?;
        Self::new(value)
    }
}

impl fmt::Display for Ksv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:010x}", self.0)
    }
}

/// Generate a random KSV using the thread-local RNG.
pub fn generate_ksv() -> Ksv {
    Ksv::generate(&mut rand::thread_rng())
}
