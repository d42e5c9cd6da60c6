//! Random playouts.
//!
//! Plays complete matches by picking uniformly among the legal actions of
//! whoever is to move, checking every invariant after each action. Used as
//! a stress harness for the rules engine and as a benchmark workload; it
//! is not an opponent.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::game::{GameMatch, GameState};
use crate::invariants::check_invariants;
use crate::movegen::random_action;
use crate::protocol::parser::format_action;
use crate::rules::Rules;
use crate::setup::{standard_match, BoardSpec, SetupError};

/// Errors that stop a playout run before any game is played.
#[derive(Debug, thiserror::Error)]
pub enum PlayoutError {
    #[error("invalid match setup: {0}")]
    Setup(#[from] SetupError),

    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("playout worker thread panicked")]
    WorkerPanicked,
}

/// Configuration for a batch of playouts.
#[derive(Debug, Clone)]
pub struct PlayoutConfig {
    pub games: usize,
    pub players: usize,
    pub width: u16,
    pub height: u16,
    /// Scatter forest and void on the generated board.
    pub scatter: bool,
    /// Rounds after which a game is abandoned.
    pub max_turns: u32,
    /// Actions after which a game is abandoned.
    pub max_actions: usize,
    /// Worker threads; 1 plays sequentially.
    pub threads: usize,
    /// Base seed (0 = use entropy). Game `i` uses `seed + i`.
    pub seed: u64,
    /// Keep every applied action in the record.
    pub record_actions: bool,
    pub rules: Rules,
}

impl Default for PlayoutConfig {
    fn default() -> Self {
        PlayoutConfig {
            games: 10,
            players: 2,
            width: 10,
            height: 10,
            scatter: true,
            max_turns: 200,
            max_actions: 20_000,
            threads: 4,
            seed: 0,
            record_actions: false,
            rules: Rules::default(),
        }
    }
}

/// Why a playout stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    Winner,
    NoWinner,
    TurnLimit,
    ActionLimit,
    InvariantViolation,
}

/// The outcome of one playout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayoutRecord {
    pub game_id: usize,
    pub end: EndReason,
    pub winner: Option<String>,
    pub turns: u32,
    pub actions: usize,
    /// Rule rejections seen; always zero unless move generation and
    /// resolution disagree.
    pub rejected: usize,
    pub violations: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub log: Vec<String>,
}

fn new_match(config: &PlayoutConfig, rng_seed: u64) -> Result<GameMatch, SetupError> {
    let names: Vec<String> = (0..config.players).map(|i| format!("p{i}")).collect();
    let spec = BoardSpec::Size {
        width: config.width,
        height: config.height,
    };
    standard_match(config.rules.clone(), spec, names.as_slice(), config.scatter.then_some(rng_seed))
}

/// Plays one game to completion or a limit.
pub fn play_game(config: &PlayoutConfig, game_id: usize, rng: &mut SmallRng) -> Result<PlayoutRecord, SetupError> {
    let board_seed: u64 = rand::Rng::gen(rng);
    let mut game = new_match(config, board_seed)?;
    let mut record = PlayoutRecord {
        game_id,
        end: EndReason::ActionLimit,
        winner: None,
        turns: game.turn(),
        actions: 0,
        rejected: 0,
        violations: Vec::new(),
        log: Vec::new(),
    };

    while record.actions < config.max_actions {
        if let GameState::GameOver { winner } = game.state() {
            record.end = if winner.is_some() {
                EndReason::Winner
            } else {
                EndReason::NoWinner
            };
            record.winner = winner.and_then(|w| game.player(w)).map(|p| p.name.clone());
            break;
        }
        if game.turn() > config.max_turns {
            record.end = EndReason::TurnLimit;
            break;
        }
        let Some(action) = random_action(&game, rng) else {
            break;
        };
        record.actions += 1;
        if config.record_actions {
            record.log.push(format_action(&action));
        }
        if let Err(e) = game.apply(action) {
            warn!(game_id, action = %format_action(&action), error = e.code(), "generated action was rejected");
            record.rejected += 1;
        }

        let violations = check_invariants(&game);
        if !violations.is_empty() {
            record.violations = violations.iter().map(ToString::to_string).collect();
            record.end = EndReason::InvariantViolation;
            break;
        }
    }
    record.turns = game.turn();
    debug!(game_id, turns = record.turns, actions = record.actions, "playout finished");
    Ok(record)
}

fn seeded(config: &PlayoutConfig, game_id: usize) -> SmallRng {
    if config.seed != 0 {
        SmallRng::seed_from_u64(config.seed.wrapping_add(game_id as u64))
    } else {
        SmallRng::from_entropy()
    }
}

fn log_game(record: &PlayoutRecord, n: usize, total: usize, started: Instant) {
    info!(
        game = n,
        total,
        end = ?record.end,
        winner = record.winner.as_deref().unwrap_or("-"),
        turns = record.turns,
        secs = started.elapsed().as_secs_f64(),
        "playout complete"
    );
}

/// Runs all playouts and collects the records in completion order.
pub fn run_playouts(config: &PlayoutConfig) -> Result<Vec<PlayoutRecord>, PlayoutError> {
    let mut records = Vec::with_capacity(config.games);
    run_playouts_with_callback(config, |r| records.push(r))?;
    Ok(records)
}

/// Runs all playouts, handing each record to `on_game` as it completes.
pub fn run_playouts_with_callback<F>(config: &PlayoutConfig, on_game: F) -> Result<(), PlayoutError>
where
    F: FnMut(PlayoutRecord) + Send,
{
    // Surface setup errors once instead of from every worker.
    new_match(config, 0)?;
    if config.threads > 1 {
        run_parallel(config, on_game)
    } else {
        run_sequential(config, on_game)
    }
}

fn run_sequential<F>(config: &PlayoutConfig, mut on_game: F) -> Result<(), PlayoutError>
where
    F: FnMut(PlayoutRecord),
{
    for i in 0..config.games {
        let started = Instant::now();
        let mut rng = seeded(config, i);
        let record = play_game(config, i, &mut rng)?;
        log_game(&record, i + 1, config.games, started);
        on_game(record);
    }
    Ok(())
}

fn run_parallel<F>(config: &PlayoutConfig, mut on_game: F) -> Result<(), PlayoutError>
where
    F: FnMut(PlayoutRecord) + Send,
{
    use rayon::prelude::*;
    use std::sync::mpsc;

    let pool = rayon::ThreadPoolBuilder::new().num_threads(config.threads).build()?;
    let (tx, rx) = mpsc::channel::<PlayoutRecord>();
    let config = config.clone();

    let handle = std::thread::spawn(move || {
        let completed = AtomicUsize::new(0);
        pool.install(|| {
            (0..config.games).into_par_iter().for_each_with(tx, |tx, i| {
                let started = Instant::now();
                let mut rng = seeded(&config, i);
                // Setup was validated before the pool started.
                let Ok(record) = play_game(&config, i, &mut rng) else {
                    return;
                };
                let n = completed.fetch_add(1, Ordering::Relaxed) + 1;
                log_game(&record, n, config.games, started);
                let _ = tx.send(record);
            });
        });
    });

    for record in rx {
        on_game(record);
    }
    handle.join().map_err(|_| PlayoutError::WorkerPanicked)
}

/// Writes records as JSONL, one object per line.
pub fn write_jsonl<W: Write>(records: &[PlayoutRecord], out: &mut W) -> std::io::Result<()> {
    for record in records {
        write_record(record, out)?;
    }
    out.flush()
}

/// Writes a single record as one JSON line.
pub fn write_record<W: Write>(record: &PlayoutRecord, out: &mut W) -> std::io::Result<()> {
    serde_json::to_writer(&mut *out, record)?;
    writeln!(out)
}

/// Aggregate numbers over a batch of records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub games: usize,
    pub decided: usize,
    pub no_winner: usize,
    pub turn_limit: usize,
    pub action_limit: usize,
    pub violations: usize,
    pub rejected_actions: usize,
    pub avg_turns: f64,
    pub avg_actions: f64,
}

pub fn summarize(records: &[PlayoutRecord]) -> Summary {
    let mut s = Summary {
        games: records.len(),
        ..Summary::default()
    };
    for r in records {
        match r.end {
            EndReason::Winner => s.decided += 1,
            EndReason::NoWinner => s.no_winner += 1,
            EndReason::TurnLimit => s.turn_limit += 1,
            EndReason::ActionLimit => s.action_limit += 1,
            EndReason::InvariantViolation => s.violations += 1,
        }
        s.rejected_actions += r.rejected;
    }
    let n = records.len().max(1) as f64;
    s.avg_turns = records.iter().map(|r| f64::from(r.turns)).sum::<f64>() / n;
    s.avg_actions = records.iter().map(|r| r.actions as f64).sum::<f64>() / n;
    s
}
