//! Random playout CLI.
//!
//! Plays batches of random matches, checking invariants after every
//! action, and writes one JSON record per game.
//!
//! Usage:
//!   cargo run --release --bin playout -- [OPTIONS]
//!
//! Options:
//!   --games N        Number of games to play (default: 10)
//!   --players N      Players per game (default: 2)
//!   --size W H       Board size (default: 10 10)
//!   --max-turns N    Abandon a game after N rounds (default: 200)
//!   --max-actions N  Abandon a game after N actions (default: 20000)
//!   --threads N      Number of parallel threads (default: 4)
//!   --seed N         Random seed, 0 for entropy (default: 0)
//!   --plain          Do not scatter forest and void
//!   --record         Include every action in the output
//!   --output FILE    Output file path (default: stdout)
//!   --quiet          Suppress summary output
//!
//! `BULWARK_RULES` may name a rules JSON file.

use std::env;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Instant;

use tracing_subscriber::EnvFilter;

use bulwark::playout::{self, PlayoutConfig, PlayoutRecord};
use bulwark::rules::Rules;

struct Options {
    config: PlayoutConfig,
    output: Option<String>,
    quiet: bool,
}

fn value<T: FromStr>(args: &[String], i: usize, flag: &str) -> Result<T, String> {
    let raw = args.get(i).ok_or_else(|| format!("missing value for {flag}"))?;
    raw.parse().map_err(|_| format!("invalid {flag} value '{raw}'"))
}

fn parse_args(args: &[String]) -> Result<Option<Options>, String> {
    let mut config = PlayoutConfig::default();
    let mut output = None;
    let mut quiet = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--games" => {
                i += 1;
                config.games = value(args, i, "--games")?;
            }
            "--players" => {
                i += 1;
                config.players = value(args, i, "--players")?;
            }
            "--size" => {
                config.width = value(args, i + 1, "--size")?;
                config.height = value(args, i + 2, "--size")?;
                i += 2;
            }
            "--max-turns" => {
                i += 1;
                config.max_turns = value(args, i, "--max-turns")?;
            }
            "--max-actions" => {
                i += 1;
                config.max_actions = value(args, i, "--max-actions")?;
            }
            "--threads" => {
                i += 1;
                config.threads = value(args, i, "--threads")?;
            }
            "--seed" => {
                i += 1;
                config.seed = value(args, i, "--seed")?;
            }
            "--plain" => config.scatter = false,
            "--record" => config.record_actions = true,
            "--output" => {
                i += 1;
                output = Some(value(args, i, "--output")?);
            }
            "--quiet" => quiet = true,
            "--help" | "-h" => return Ok(None),
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    Ok(Some(Options { config, output, quiet }))
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()))
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let mut options = match parse_args(&args) {
        Ok(Some(options)) => options,
        Ok(None) => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        Err(msg) => {
            eprintln!("{msg}");
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    options.config.rules = match Rules::from_env() {
        Ok(rules) => rules,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let mut writer: BufWriter<Box<dyn Write + Send>> = match &options.output {
        Some(path) => match File::create(path) {
            Ok(file) => BufWriter::new(Box::new(file)),
            Err(e) => {
                eprintln!("failed to create {path}: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => BufWriter::new(Box::new(io::stdout())),
    };

    let config = &options.config;
    if !options.quiet {
        eprintln!(
            "Playouts: {} games, {} players, {}x{} board, max {} turns, {} threads",
            config.games, config.players, config.width, config.height, config.max_turns, config.threads
        );
    }

    let start = Instant::now();
    let mut records: Vec<PlayoutRecord> = Vec::with_capacity(config.games);
    let mut write_error = None;
    let run = playout::run_playouts_with_callback(config, |record| {
        if write_error.is_none() {
            if let Err(e) = playout::write_record(&record, &mut writer) {
                write_error = Some(e);
            }
        }
        records.push(record);
    });
    if let Err(e) = run {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }
    if let Some(e) = write_error.or_else(|| writer.flush().err()) {
        eprintln!("failed to write output: {e}");
        return ExitCode::FAILURE;
    }

    if !options.quiet {
        let elapsed = start.elapsed().as_secs_f64();
        let s = playout::summarize(&records);
        eprintln!("Completed {} games in {:.1}s", s.games, elapsed);
        eprintln!(
            "  decided {}, no winner {}, turn limit {}, action limit {}",
            s.decided, s.no_winner, s.turn_limit, s.action_limit
        );
        eprintln!("  avg turns {:.1}, avg actions {:.1}", s.avg_turns, s.avg_actions);
        eprintln!("  invariant violations {}, rejected actions {}", s.violations, s.rejected_actions);
        if let Some(path) = &options.output {
            eprintln!("Wrote {} games to {}", records.len(), path);
        }
    }

    let s = playout::summarize(&records);
    if s.violations > 0 || s.rejected_actions > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn print_usage() {
    eprintln!("Usage: playout [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --games N        Number of games to play (default: 10)");
    eprintln!("  --players N      Players per game (default: 2)");
    eprintln!("  --size W H       Board size (default: 10 10)");
    eprintln!("  --max-turns N    Abandon a game after N rounds (default: 200)");
    eprintln!("  --max-actions N  Abandon a game after N actions (default: 20000)");
    eprintln!("  --threads N      Number of parallel threads (default: 4)");
    eprintln!("  --seed N         Random seed, 0 for entropy (default: 0)");
    eprintln!("  --plain          Do not scatter forest and void");
    eprintln!("  --record         Include every action in the output");
    eprintln!("  --output FILE    Output file path (default: stdout)");
    eprintln!("  --quiet          Suppress summary output");
    eprintln!("  --help           Show this help");
    eprintln!();
    eprintln!("BULWARK_RULES may name a rules JSON file.");
}
