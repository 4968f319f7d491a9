//! Presentation forms of a derived key.
//!
//! [`KeyDocument`] is the JSON shape served over HTTP and printed by the
//! command-line tool. Fields are declared in sorted order (`key`, `ksv`,
//! `type`) and serialize in declaration order, so output is stable byte for
//! byte.
//!
//! [`HumanReadable`] is the plain-text form:
//!
//! ```text
//! KSV: 00000fffff
//!
//! Source Key:
//! 00000000000014 00000000000014 00000000000014 00000000000014 00000000000014
//! ... (8 lines of 5 elements)
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    agreement::SelfTest,
    key::{DeviceKey, Role},
    ksv::Ksv,
};

/// Key elements printed per line in the human-readable form
const ELEMENTS_PER_LINE: usize = 5;

/// A KSV and its derived key, ready for serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyDocument {
    /// 40 key elements as 14 lowercase hex digits each
    pub key: Vec<String>,
    /// KSV as 10 lowercase hex digits
    pub ksv: String,
    /// `"source"` or `"sink"`
    #[serde(rename = "type")]
    pub role: Role,
}

impl KeyDocument {
    /// Build a document for `key`, derived from `ksv`.
    pub fn new(ksv: Ksv, key: &DeviceKey) -> Self {
        Self {
            key: key.elements().iter().map(|element| format!("{element:014x}")).collect(),
            ksv: ksv.to_string(),
            role: key.role(),
        }
    }
}

/// Plain-text rendering of a KSV and its key.
#[derive(Debug, Clone, Copy)]
pub struct HumanReadable<'a> {
    ksv: Ksv,
    key: &'a DeviceKey,
}

impl<'a> HumanReadable<'a> {
    /// Wrap a KSV and its key for display.
    pub fn new(ksv: Ksv, key: &'a DeviceKey) -> Self {
        Self { ksv, key }
    }
}

impl fmt::Display for HumanReadable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "KSV: {}", self.ksv)?;
        writeln!(f)?;

        let title = match self.key.role() {
            Role::Source => "Source",
            Role::Sink => "Sink",
        };
        write!(f, "{title} Key:")?;

        for line in self.key.elements().chunks(ELEMENTS_PER_LINE) {
            writeln!(f)?;
            for (index, element) in line.iter().enumerate() {
                if index > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{element:014x}")?;
            }
        }

        Ok(())
    }
}

/// Report printed by the self-test mode.
impl fmt::Display for SelfTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", HumanReadable::new(self.source_ksv, &self.source_key))?;
        writeln!(f)?;
        writeln!(f, "{}", HumanReadable::new(self.sink_ksv, &self.sink_key))?;
        writeln!(f)?;
        writeln!(
            f,
            "Generated keys: sink = {:014x}, source = {:014x}",
            self.agreement.sink_secret, self.agreement.source_secret
        )?;

        let verdict = if self.passed() { "PASSED" } else { "FAILED" };
        write!(f, "Test {verdict}")
    }
}
