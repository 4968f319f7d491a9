//! Fuzz target for KSV text parsing
//!
//! Every accepted KSV must satisfy the weight invariant and print back to
//! the same value. Rejections must be errors, never panics.

#![no_main]

use hdcp_keys::{KSV_WEIGHT, Ksv};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|text: &str| {
    if let Ok(ksv) = text.parse::<Ksv>() {
        assert_eq!(ksv.value().count_ones(), KSV_WEIGHT);
        assert_eq!(ksv.to_string().parse::<Ksv>().ok(), Some(ksv));
    }

    let _ = Ksv::parse_wire(text);
});
