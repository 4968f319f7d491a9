//! Shared secret computation and the source/sink agreement check.
//!
//! A device combines its own private key with its peer's public KSV by
//! summing the key elements the peer KSV selects. For a source key from
//! KSV `s` and a sink key from KSV `t`, both sides reduce to
//!
//! ```text
//! sum(matrix[i][j] for i in s, j in t) mod 2^56
//! ```
//!
//! so the two secrets always match when both keys come from the same
//! matrix. A mismatch means broken key material or a derivation bug.

use rand::Rng;

use crate::{
    error::HdcpError,
    key::{DeviceKey, Role, derive_key},
    ksv::Ksv,
    matrix::{KEY_MASK, MasterMatrix},
};

/// Compute the 56-bit shared secret from a private key and the peer's KSV.
pub fn shared_secret(own_key: &DeviceKey, peer_ksv: Ksv) -> u64 {
    peer_ksv
        .selected_rows()
        .fold(0u64, |acc, index| acc.wrapping_add(own_key.elements()[index]) & KEY_MASK)
}

/// Both secrets from a successful agreement check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Agreement {
    /// Computed by the sink from its key and the source KSV
    pub sink_secret: u64,
    /// Computed by the source from its key and the sink KSV
    pub source_secret: u64,
}

impl Agreement {
    /// Returns true if both sides computed the same secret.
    pub fn holds(&self) -> bool {
        self.sink_secret == self.source_secret
    }
}

/// Compute both sides of the exchange without judging the outcome.
///
/// Fails only if the keys are passed in the wrong roles.
pub fn compute_agreement(
    source_ksv: Ksv,
    source_key: &DeviceKey,
    sink_ksv: Ksv,
    sink_key: &DeviceKey,
) -> Result<Agreement, HdcpError> {
    expect_role(source_key, Role::Source)?;
    expect_role(sink_key, Role::Sink)?;

    Ok(exchange(source_ksv, source_key, sink_ksv, sink_key))
}

fn exchange(source_ksv: Ksv, source_key: &DeviceKey, sink_ksv: Ksv, sink_key: &DeviceKey) -> Agreement {
    Agreement {
        sink_secret: shared_secret(sink_key, source_ksv),
        source_secret: shared_secret(source_key, sink_ksv),
    }
}

/// Check that a source and a sink agree on their shared secret.
///
/// Returns [`HdcpError::AgreementMismatch`] if they do not.
pub fn check_agreement(
    source_ksv: Ksv,
    source_key: &DeviceKey,
    sink_ksv: Ksv,
    sink_key: &DeviceKey,
) -> Result<Agreement, HdcpError> {
    let agreement = compute_agreement(source_ksv, source_key, sink_ksv, sink_key)?;
    if !agreement.holds() {
        return Err(HdcpError::AgreementMismatch {
            sink_secret: agreement.sink_secret,
            source_secret: agreement.source_secret,
        });
    }
    Ok(agreement)
}

/// Returns true if the source and sink keys agree.
///
/// Keys passed in the wrong roles never agree.
pub fn verify_agreement(
    source_ksv: Ksv,
    source_key: &DeviceKey,
    sink_ksv: Ksv,
    sink_key: &DeviceKey,
) -> bool {
    check_agreement(source_ksv, source_key, sink_ksv, sink_key).is_ok()
}

fn expect_role(key: &DeviceKey, expected: Role) -> Result<(), HdcpError> {
    if key.role() == expected {
        Ok(())
    } else {
        Err(HdcpError::RoleMismatch { expected, found: key.role() })
    }
}

/// Outcome of a full self-test run.
#[derive(Debug, Clone)]
pub struct SelfTest {
    /// Randomly generated source KSV
    pub source_ksv: Ksv,
    /// Source key derived from `source_ksv`
    pub source_key: DeviceKey,
    /// Randomly generated sink KSV
    pub sink_ksv: Ksv,
    /// Sink key derived from `sink_ksv`
    pub sink_key: DeviceKey,
    /// Secrets computed by each side
    pub agreement: Agreement,
}

impl SelfTest {
    /// Returns true if both sides computed the same secret.
    pub fn passed(&self) -> bool {
        self.agreement.holds()
    }

    /// Convert a failed run into [`HdcpError::AgreementMismatch`].
    pub fn into_result(self) -> Result<Self, HdcpError> {
        if self.passed() {
            Ok(self)
        } else {
            Err(HdcpError::AgreementMismatch {
                sink_secret: self.agreement.sink_secret,
                source_secret: self.agreement.source_secret,
            })
        }
    }
}

/// Derive a source and a sink key for two random KSVs and compute the
/// secret each side arrives at.
pub fn self_test<R: Rng + ?Sized>(matrix: &MasterMatrix, rng: &mut R) -> SelfTest {
    let source_ksv = Ksv::generate(rng);
    let source_key = derive_key(source_ksv, matrix, Role::Source);

    let sink_ksv = Ksv::generate(rng);
    let sink_key = derive_key(sink_ksv, matrix, Role::Sink);

    let agreement = exchange(source_ksv, &source_key, sink_ksv, &sink_key);
    SelfTest { source_ksv, source_key, sink_ksv, sink_key, agreement }
}
