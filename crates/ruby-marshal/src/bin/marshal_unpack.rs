//! `marshal-unpack` — decode a marshal stream (stdin) to JSON (stdout).
//!
//! Usage:
//!   marshal-unpack [--encoding utf8|latin1|ascii|utf16le|hex|base64] [--pretty]
//!
//! Set `RUST_LOG=ruby_marshal=debug` to trace decoding on stderr.

use std::io::{self, Read, Write};

use ruby_marshal::cli::{unpack, UnpackArgs};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = match UnpackArgs::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };

    let mut buf = Vec::new();
    if let Err(e) = io::stdin().read_to_end(&mut buf) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    match unpack(&buf, &args) {
        Ok(json) => {
            let mut stdout = io::stdout().lock();
            if let Err(e) = writeln!(stdout, "{json}") {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
