//! Device key derivation.
//!
//! A source key is the sum of the matrix rows selected by the device's KSV.
//! A sink key is the same computation over the transposed matrix. All
//! arithmetic is per-column addition mod 2^56.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::{
    error::HdcpError,
    ksv::Ksv,
    matrix::{KEY_MASK, MATRIX_SIZE, MasterMatrix},
};

/// Which side of a link a device key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Transmitter. Derived from the matrix as given.
    Source,
    /// Receiver. Derived from the transposed matrix.
    Sink,
}

impl Role {
    /// Lowercase name used in documents and URLs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Sink => "sink",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = HdcpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "source" => Ok(Self::Source),
            "sink" => Ok(Self::Sink),
            other => Err(HdcpError::UnknownRole(other.to_string())),
        }
    }
}

/// A device's 40-element private key.
///
/// Every element is below `2^56`. Zeroized on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct DeviceKey {
    role: Role,
    elements: [u64; MATRIX_SIZE],
}

impl DeviceKey {
    /// Role the key was derived for.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Key elements in order.
    pub fn elements(&self) -> &[u64; MATRIX_SIZE] {
        &self.elements
    }

    /// Element `index`, or `None` past the end.
    pub fn get(&self, index: usize) -> Option<u64> {
        self.elements.get(index).copied()
    }
}

impl fmt::Debug for DeviceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceKey").field("role", &self.role).finish_non_exhaustive()
    }
}

impl Drop for DeviceKey {
    fn drop(&mut self) {
        self.elements.zeroize();
    }
}

/// Derive the private key for `ksv` in the given role.
///
/// Pure and deterministic. Row iteration order does not matter since every
/// step is addition mod 2^56.
pub fn derive_key(ksv: Ksv, matrix: &MasterMatrix, role: Role) -> DeviceKey {
    let mut elements = [0u64; MATRIX_SIZE];

    for selected in ksv.selected_rows() {
        for (column, element) in elements.iter_mut().enumerate() {
            // Row `selected` of the transpose is column `selected` of the matrix
            let value = match role {
                Role::Source => matrix.entry(selected, column),
                Role::Sink => matrix.entry(column, selected),
            };
            *element = element.wrapping_add(value) & KEY_MASK;
        }
    }

    DeviceKey { role, elements }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ksv_low() -> Ksv {
        Ksv::new(0x00_000f_ffff).unwrap()
    }

    fn ksv_high() -> Ksv {
        Ksv::new(0xff_fff0_0000).unwrap()
    }

    fn index_matrix() -> MasterMatrix {
        let mut rows = [[0u64; MATRIX_SIZE]; MATRIX_SIZE];
        for (i, row) in rows.iter_mut().enumerate() {
            for (j, entry) in row.iter_mut().enumerate() {
                *entry = (i * 100 + j) as u64;
            }
        }
        MasterMatrix::from_rows(rows)
    }

    #[test]
    fn role_names() {
        assert_eq!("source".parse::<Role>().unwrap(), Role::Source);
        assert_eq!("sink".parse::<Role>().unwrap(), Role::Sink);
        assert_eq!(Role::Sink.to_string(), "sink");
    }

    #[test]
    fn unknown_role() {
        let err = "Sink".parse::<Role>().unwrap_err();
        assert!(matches!(err, HdcpError::UnknownRole(ref name) if name == "Sink"));

        assert!("repeater".parse::<Role>().is_err());
    }

    #[test]
    fn source_key_sums_selected_rows() {
        let key = derive_key(ksv_low(), &index_matrix(), Role::Source);

        // rows 0..20: sum(i * 100) + 20 * j
        let row_sum: u64 = (0..20).map(|i| i * 100).sum();
        for j in 0..MATRIX_SIZE {
            assert_eq!(key.get(j), Some(row_sum + 20 * j as u64));
        }
        assert_eq!(key.role(), Role::Source);
    }

    #[test]
    fn sink_key_sums_selected_columns() {
        let key = derive_key(ksv_high(), &index_matrix(), Role::Sink);

        // columns 20..40 of row j: 20 * j * 100 + sum(20..40)
        let column_sum: u64 = (20..40).sum();
        for j in 0..MATRIX_SIZE {
            assert_eq!(key.get(j), Some(20 * j as u64 * 100 + column_sum));
        }
        assert_eq!(key.role(), Role::Sink);
    }

    #[test]
    fn sums_wrap_at_56_bits() {
        let matrix = MasterMatrix::from_rows([[KEY_MASK; MATRIX_SIZE]; MATRIX_SIZE]);
        let key = derive_key(ksv_low(), &matrix, Role::Source);

        // 20 * (2^56 - 1) mod 2^56 == 2^56 - 20
        assert!(key.elements().iter().all(|&e| e == KEY_MASK - 19));
    }

    #[test]
    fn oversized_entries_are_reduced() {
        let matrix = MasterMatrix::from_rows([[u64::MAX; MATRIX_SIZE]; MATRIX_SIZE]);
        let key = derive_key(ksv_low(), &matrix, Role::Sink);

        assert!(key.elements().iter().all(|&e| e <= KEY_MASK));
        assert!(key.elements().iter().all(|&e| e == KEY_MASK - 19));
    }

    #[test]
    fn get_out_of_range() {
        let key = derive_key(ksv_low(), &index_matrix(), Role::Source);
        assert_eq!(key.get(MATRIX_SIZE), None);
    }

    #[test]
    fn debug_hides_elements() {
        let key = derive_key(ksv_low(), &index_matrix(), Role::Source);
        assert_eq!(format!("{key:?}"), "DeviceKey { role: Source, .. }");
    }
}
