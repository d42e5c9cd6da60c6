//! Bulwark -- a grid strategy rules engine driven over stdin/stdout.
//!
//! Reads one command per line and writes responses to stdout. Input is
//! read on a helper thread so the main loop can wake up when a turn timer
//! expires; logs go to stderr and are filtered with `RUST_LOG`.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Instant;

use tracing::error;
use tracing_subscriber::EnvFilter;

use bulwark::host::{Flow, Host};
use bulwark::rules::Rules;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()))
        .with_writer(io::stderr)
        .init();

    let rules = match Rules::from_env() {
        Ok(rules) => rules,
        Err(e) => {
            error!(error = %e, "failed to load rules");
            return ExitCode::FAILURE;
        }
    };

    let (tx, rx) = mpsc::channel::<String>();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    let mut host = Host::new(rules);

    match run(&mut host, &rx, &mut out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "failed to write response");
            ExitCode::FAILURE
        }
    }
}

/// Serves commands until `quit` or end of input.
fn run(host: &mut Host, rx: &mpsc::Receiver<String>, out: &mut impl Write) -> io::Result<()> {
    loop {
        let now = Instant::now();
        host.poll_timeout(now, out)?;
        out.flush()?;

        let line = match host.time_until_deadline(now) {
            Some(wait) => match rx.recv_timeout(wait) {
                Ok(line) => line,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return Ok(()),
            },
            None => match rx.recv() {
                Ok(line) => line,
                Err(_) => return Ok(()),
            },
        };

        let flow = host.handle_line(&line, Instant::now(), out)?;
        out.flush()?;
        if flow == Flow::Quit {
            return Ok(());
        }
    }
}
