//! Fuzz target for MasterMatrix parsing
//!
//! Feeds arbitrary text through the key file parser to find:
//! - Panics on odd token layouts or line endings
//! - Index errors when the token count runs past 1600
//! - Accepted inputs that fail to round-trip through `to_key_file`
//!
//! The parser should NEVER panic. Invalid files must return an error.

#![no_main]

use hdcp_keys::MasterMatrix;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(matrix) = text.parse::<MasterMatrix>() {
        let reparsed: MasterMatrix =
            matrix.to_key_file().parse().expect("serialized matrix must parse");
        assert_eq!(reparsed, matrix);
    }
});
