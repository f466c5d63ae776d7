//! Tally stdio driver
//!
//! Reads one command per line from stdin and writes one JSON response per
//! line to stdout. Logs go to stderr, filtered by `TALLY_LOG` (default
//! `info`). Startup settings come from the `TALLY_*` variables described
//! in `tally::TallyConfig`.
//!
//! `quit` or end of input ends the session.

use std::io::{self, BufRead, IsTerminal, Write};
use tally::{Tally, TallyConfig};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "TALLY_LOG";
const VERSION: &str = env!("CARGO_PKG_VERSION");

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();
}

fn main() {
    init_logging();

    let config = TallyConfig::from_env();
    info!(version = VERSION, mode = %config.mode, "tally started");
    let mut tally = Tally::with_config(config);

    let stdin = io::stdin();
    let mut reader = io::BufReader::new(stdin.lock());

    loop {
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) => {
                debug!("end of input");
                break;
            }
            Ok(_) => {
                let line = line.trim();
                if matches!(line, "quit" | "exit") {
                    break;
                }
                let Some(response) = tally.run_line(line) else {
                    continue;
                };

                let json = tally.renderer().to_json_line(&response);
                let mut stdout = io::stdout().lock();
                if let Err(e) = writeln!(stdout, "{}", json).and_then(|_| stdout.flush()) {
                    error!(error = %e, "failed to write response");
                    break;
                }
            }
            Err(e) => {
                error!(error = %e, "failed to read input");
                break;
            }
        }
    }

    tally.dispose();
    info!("tally stopped");
}
