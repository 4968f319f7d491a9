//! End-to-end runs of the key generator against key files on disk.

use std::io::Write;

use hdcp_keygen::{CliError, EXIT_INPUT, KeygenConfig, Outcome, OutputFormat, run};
use hdcp_keys::{HdcpError, KeyDocument, MATRIX_SIZE, MasterMatrix, Role};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tempfile::NamedTempFile;

fn key_file(matrix: &MasterMatrix) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(matrix.to_key_file().as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn ones_key_file() -> NamedTempFile {
    key_file(&MasterMatrix::from_rows([[1; MATRIX_SIZE]; MATRIX_SIZE]))
}

fn indexed_key_file() -> NamedTempFile {
    let mut rows = [[0u64; MATRIX_SIZE]; MATRIX_SIZE];
    for (i, row) in rows.iter_mut().enumerate() {
        for (j, entry) in row.iter_mut().enumerate() {
            *entry = ((i as u64) << 32) | (j as u64 * 0x1_0001);
        }
    }
    key_file(&MasterMatrix::from_rows(rows))
}

fn run_to_string(config: &KeygenConfig) -> Result<(Outcome, String), CliError> {
    let mut out = Vec::new();
    let outcome = run(config, &mut ChaCha8Rng::seed_from_u64(99), &mut out)?;
    Ok((outcome, String::from_utf8(out).unwrap()))
}

#[test]
fn human_output_for_given_ksv() {
    let file = ones_key_file();
    let config = KeygenConfig {
        master_key_path: file.path().to_path_buf(),
        ksv: Some("00000fffff".to_string()),
        ..KeygenConfig::default()
    };

    let (outcome, text) = run_to_string(&config).unwrap();
    assert_eq!(outcome, Outcome::Derived);

    let row = vec!["00000000000014"; 5].join(" ");
    let mut expected = String::from("KSV: 00000fffff\n\nSource Key:\n");
    for _ in 0..8 {
        expected.push_str(&row);
        expected.push('\n');
    }
    assert_eq!(text, expected);
}

#[test]
fn json_sink_output() {
    let file = ones_key_file();
    let config = KeygenConfig {
        master_key_path: file.path().to_path_buf(),
        role: Role::Sink,
        ksv: Some("0xfffff00000".to_string()),
        format: OutputFormat::Json,
        ..KeygenConfig::default()
    };

    let (_, text) = run_to_string(&config).unwrap();
    let doc: KeyDocument = serde_json::from_str(&text).unwrap();

    assert_eq!(doc.ksv, "fffff00000");
    assert_eq!(doc.role, Role::Sink);
    assert_eq!(doc.key, vec!["00000000000014".to_string(); MATRIX_SIZE]);
    assert!(text.find("\"key\"") < text.find("\"ksv\""));
    assert!(text.find("\"ksv\"") < text.find("\"type\""));
}

#[test]
fn random_ksv_when_none_given() {
    let file = ones_key_file();
    let config = KeygenConfig {
        master_key_path: file.path().to_path_buf(),
        format: OutputFormat::Json,
        ..KeygenConfig::default()
    };

    let (_, text) = run_to_string(&config).unwrap();
    let doc: KeyDocument = serde_json::from_str(&text).unwrap();
    let ksv = u64::from_str_radix(&doc.ksv, 16).unwrap();

    assert_eq!(ksv.count_ones(), 20);
    assert_eq!(doc.role, Role::Source);
}

#[test]
fn self_test_passes() {
    let file = indexed_key_file();
    let config = KeygenConfig {
        master_key_path: file.path().to_path_buf(),
        self_test: true,
        ..KeygenConfig::default()
    };

    let (outcome, text) = run_to_string(&config).unwrap();
    assert_eq!(outcome, Outcome::SelfTestPassed);
    assert_eq!(outcome.exit_code(), 0);
    assert!(text.starts_with("Performing self test.\nKSV: "));
    assert!(text.contains("\nSource Key:\n"));
    assert!(text.contains("\nSink Key:\n"));
    assert!(text.contains("\nGenerated keys: sink = "));
    assert!(text.ends_with("Test PASSED\n"));
}

#[test]
fn ksv_with_extra_leading_zeros() {
    let file = ones_key_file();
    let config = KeygenConfig {
        master_key_path: file.path().to_path_buf(),
        ksv: Some("0x000000fffff".to_string()),
        ..KeygenConfig::default()
    };

    let (_, text) = run_to_string(&config).unwrap();
    assert!(text.starts_with("KSV: 00000fffff\n"));
}

#[test]
fn bad_ksv_is_input_error() {
    let file = ones_key_file();
    for ksv in ["zz", "00000ffff", "ffffffffffff"] {
        let config = KeygenConfig {
            master_key_path: file.path().to_path_buf(),
            ksv: Some(ksv.to_string()),
            ..KeygenConfig::default()
        };

        let err = run_to_string(&config).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_INPUT, "{ksv}: {err}");
    }
}

#[test]
fn ksv_checked_before_key_file() {
    let config = KeygenConfig {
        master_key_path: "/nonexistent/master-key.txt".into(),
        ksv: Some("zz".to_string()),
        ..KeygenConfig::default()
    };

    let err = run_to_string(&config).unwrap_err();
    assert!(matches!(err, CliError::Key(HdcpError::InvalidKsvFormat { .. })));
}

#[test]
fn malformed_key_file_fails() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "# truncated").unwrap();
    writeln!(file, "00 01 02").unwrap();
    file.flush().unwrap();

    let config =
        KeygenConfig { master_key_path: file.path().to_path_buf(), ..KeygenConfig::default() };

    let err = run_to_string(&config).unwrap_err();
    assert!(matches!(err, CliError::Key(HdcpError::MalformedKeyFile(_))));
    assert_eq!(err.exit_code(), 1);
}
