//! HDCP key generator command.
//!
//! Loads the master matrix once, then either derives a single device key
//! (random or caller-chosen KSV) or runs the source/sink agreement
//! self-test. Output goes to any [`Write`] so the command runs unchanged in
//! tests.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;

use std::{io::Write, path::PathBuf};

pub use error::{CliError, EXIT_FAILURE, EXIT_INPUT};
use hdcp_keys::{HumanReadable, KeyDocument, Ksv, MasterMatrix, Role, derive_key, self_test};
use rand::Rng;

/// How a derived key is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// KSV and key as hex text, five elements per line
    #[default]
    Human,
    /// Pretty-printed JSON key document
    Json,
}

/// What the command should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeygenConfig {
    /// Path to the master key file
    pub master_key_path: PathBuf,
    /// Role of the key to derive
    pub role: Role,
    /// Caller-chosen KSV in hex; random if absent
    pub ksv: Option<String>,
    /// Output format for single-key derivation
    pub format: OutputFormat,
    /// Run the agreement self-test instead of deriving one key
    pub self_test: bool,
}

impl Default for KeygenConfig {
    fn default() -> Self {
        Self {
            master_key_path: PathBuf::from("master-key.txt"),
            role: Role::Source,
            ksv: None,
            format: OutputFormat::Human,
            self_test: false,
        }
    }
}

/// Result of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A single key was derived and printed
    Derived,
    /// Self-test ran and both sides agreed
    SelfTestPassed,
    /// Self-test ran and the secrets differed
    SelfTestFailed,
}

impl Outcome {
    /// Process exit code for this outcome.
    pub fn exit_code(self) -> u8 {
        match self {
            Self::Derived | Self::SelfTestPassed => 0,
            Self::SelfTestFailed => EXIT_FAILURE,
        }
    }
}

/// Run the command described by `config`, writing results to `out`.
///
/// A supplied KSV is validated before the key file is touched.
pub fn run<W, R>(config: &KeygenConfig, rng: &mut R, out: &mut W) -> Result<Outcome, CliError>
where
    W: Write,
    R: Rng + ?Sized,
{
    let ksv = config.ksv.as_deref().map(str::parse::<Ksv>).transpose()?;

    let matrix = MasterMatrix::load(&config.master_key_path)?;
    tracing::debug!(path = %config.master_key_path.display(), "loaded master key matrix");

    if config.self_test {
        if ksv.is_some() {
            tracing::warn!("--ksv is ignored when running the self-test");
        }
        return run_self_test(&matrix, rng, out);
    }

    let ksv = ksv.unwrap_or_else(|| Ksv::generate(rng));
    let key = derive_key(ksv, &matrix, config.role);
    tracing::debug!(%ksv, role = %config.role, "derived device key");

    match config.format {
        OutputFormat::Human => writeln!(out, "{}", HumanReadable::new(ksv, &key))?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &KeyDocument::new(ksv, &key))?;
            writeln!(out)?;
        },
    }

    Ok(Outcome::Derived)
}

fn run_self_test<W, R>(matrix: &MasterMatrix, rng: &mut R, out: &mut W) -> Result<Outcome, CliError>
where
    W: Write,
    R: Rng + ?Sized,
{
    writeln!(out, "Performing self test.")?;

    let report = self_test(matrix, rng);
    writeln!(out, "{report}")?;

    if report.passed() {
        Ok(Outcome::SelfTestPassed)
    } else {
        tracing::error!(
            source_ksv = %report.source_ksv,
            sink_ksv = %report.sink_ksv,
            "self-test secrets differ"
        );
        Ok(Outcome::SelfTestFailed)
    }
}
