//! HDCP key generator binary.
//!
//! # Usage
//!
//! ```bash
//! # Source key for a random KSV
//! hdcp-keygen --master master-key.txt
//!
//! # Sink key for a specific KSV, as JSON
//! hdcp-keygen --sink --ksv 00000fffff --json
//!
//! # Check that source and sink keys agree
//! hdcp-keygen --test
//! ```

use std::{
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::Parser;
use hdcp_keygen::{KeygenConfig, OutputFormat, run};
use hdcp_keys::Role;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// HDCP device key generator
#[derive(Parser, Debug)]
#[command(name = "hdcp-keygen")]
#[command(about = "Derive HDCP source and sink keys from a master key matrix")]
#[command(version)]
struct Args {
    /// Load the master key from FILE
    #[arg(short, long, value_name = "FILE", default_value = "master-key.txt")]
    master: PathBuf,

    /// Generate a sink key rather than a source key
    #[arg(short = 'k', long)]
    sink: bool,

    /// Use a specific KSV expressed in hexadecimal
    #[arg(long, value_name = "KSV")]
    ksv: Option<String>,

    /// Output key and KSV as JSON
    #[arg(short, long)]
    json: bool,

    /// Generate source and sink keys and test they agree
    #[arg(short, long)]
    test: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl From<Args> for KeygenConfig {
    fn from(args: Args) -> Self {
        Self {
            master_key_path: args.master,
            role: if args.sink { Role::Sink } else { Role::Source },
            ksv: args.ksv,
            format: if args.json { OutputFormat::Json } else { OutputFormat::Human },
            self_test: args.test,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer().with_writer(io::stderr)).with(filter).init();

    let config = KeygenConfig::from(args);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match run(&config, &mut rand::thread_rng(), &mut out) {
        Ok(outcome) => ExitCode::from(outcome.exit_code()),
        Err(err) => {
            let _ = writeln!(io::stderr(), "hdcp-keygen: {err}");
            ExitCode::from(err.exit_code())
        },
    }
}
