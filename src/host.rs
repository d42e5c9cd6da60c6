//! Command handling for the line protocol.
//!
//! `Host` owns the current session and turns parsed commands into
//! responses. Every command ends with exactly one `ok ...` or
//! `error <code>` line; `show` and `state` print their body first. Events
//! that were not requested (a timed-out turn, the end of the game) are
//! written on their own lines after the response.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::board::{PlayerId, StructureKind};
use crate::game::{Action, ActionOutcome, GameMatch, GameState};
use crate::protocol::layout::render_board;
use crate::protocol::parser::{parse_command, Command, CommandError, NewBoard};
use crate::protocol::snapshot::Snapshot;
use crate::rules::Rules;
use crate::session::Session;
use crate::setup::{standard_match, BoardSpec};

/// Whether the main loop should keep reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Protocol state: the rules new games use, the active session and the
/// pending layout rows.
#[derive(Debug)]
pub struct Host {
    rules: Rules,
    session: Option<Session>,
    layout: Vec<String>,
}

impl Host {
    pub fn new(rules: Rules) -> Self {
        Host {
            rules,
            session: None,
            layout: Vec::new(),
        }
    }

    pub fn game(&self) -> Option<&GameMatch> {
        self.session.as_ref().map(Session::game)
    }

    /// How long the caller may wait for the next line.
    pub fn time_until_deadline(&self, now: Instant) -> Option<Duration> {
        self.session.as_ref().and_then(|s| s.time_until_deadline(now))
    }

    /// Passes an expired turn and reports it.
    pub fn poll_timeout(&mut self, now: Instant, out: &mut impl Write) -> io::Result<()> {
        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };
        if let Some(report) = session.poll_timeout(now) {
            let game = session.game();
            writeln!(out, "timeout turn {} player {}", report.turn, player_name(game, report.player))?;
            write_game_over(game, out)?;
        }
        Ok(())
    }

    /// Parses and executes one input line.
    pub fn handle_line(&mut self, line: &str, now: Instant, out: &mut impl Write) -> io::Result<Flow> {
        match parse_command(line) {
            Ok(Command::Quit) => Ok(Flow::Quit),
            Ok(cmd) => {
                self.execute(cmd, now, out)?;
                Ok(Flow::Continue)
            }
            Err(CommandError::Empty) => Ok(Flow::Continue),
            Err(e) => {
                debug!(line, error = %e, "unparsable command");
                writeln!(out, "error {}", e.code())?;
                Ok(Flow::Continue)
            }
        }
    }

    fn execute(&mut self, cmd: Command, now: Instant, out: &mut impl Write) -> io::Result<()> {
        match cmd {
            Command::NewGame { board, names } => self.new_game(board, &names, now, out),
            Command::Layout { row } => {
                self.layout.push(row);
                writeln!(out, "ok")
            }
            Command::Action(action) => self.action(action, now, out),
            Command::Show => match self.game() {
                Some(game) => {
                    write!(out, "{}", render_board(game.board()))?;
                    writeln!(out, "ok")
                }
                None => no_game(out),
            },
            Command::State => match self.game() {
                Some(game) => {
                    write_state(game, out)?;
                    writeln!(out, "ok")
                }
                None => no_game(out),
            },
            Command::Save => match self.game() {
                Some(game) => match Snapshot::capture(game).to_json() {
                    Ok(json) => writeln!(out, "ok {json}"),
                    Err(e) => writeln!(out, "error {}", e.code()),
                },
                None => no_game(out),
            },
            Command::Load { json } => {
                let restored = Snapshot::from_json(&json).and_then(|s| s.restore(self.rules.clone()));
                match restored {
                    Ok(game) => {
                        info!(players = game.players().len(), turn = game.turn(), "match loaded");
                        self.session = Some(Session::new(game, now));
                        writeln!(out, "ok")
                    }
                    Err(e) => writeln!(out, "error {}", e.code()),
                }
            }
            Command::Quit => Ok(()),
        }
    }

    fn new_game(&mut self, board: NewBoard, names: &[String], now: Instant, out: &mut impl Write) -> io::Result<()> {
        let text = self.layout.join("\n");
        let spec = match board {
            NewBoard::Size { width, height } => BoardSpec::Size { width, height },
            NewBoard::Layout => BoardSpec::Layout(&text),
        };
        let created = standard_match(self.rules.clone(), spec, names, None);
        self.layout.clear();
        match created {
            Ok(game) => {
                info!(
                    players = names.len(),
                    width = game.board().width(),
                    height = game.board().height(),
                    "new match"
                );
                self.session = Some(Session::new(game, now));
                writeln!(out, "ok")
            }
            Err(e) => writeln!(out, "error {}", e.code()),
        }
    }

    fn action(&mut self, action: Action, now: Instant, out: &mut impl Write) -> io::Result<()> {
        let Some(session) = self.session.as_mut() else {
            return no_game(out);
        };
        match session.apply(action, now) {
            Ok(outcome) => {
                let game = session.game();
                write_outcome(game, &outcome, out)?;
                write_game_over(game, out)
            }
            Err(e) => writeln!(out, "error {}", e.code()),
        }
    }
}

fn no_game(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "error no_game")
}

fn player_name(game: &GameMatch, id: PlayerId) -> &str {
    game.player(id).map_or("?", |p| p.name.as_str())
}

fn write_outcome(game: &GameMatch, outcome: &ActionOutcome, out: &mut impl Write) -> io::Result<()> {
    match outcome {
        ActionOutcome::Moved | ActionOutcome::Built | ActionOutcome::Deployed => writeln!(out, "ok"),
        ActionOutcome::Attacked(report) => {
            let hit = &report.primary;
            write!(out, "ok damage {} remaining {}", hit.damage, hit.remaining)?;
            if hit.destroyed {
                write!(out, " destroyed")?;
            }
            if !report.splash.is_empty() {
                write!(out, " splash {}", report.splash.len())?;
            }
            writeln!(out)
        }
        ActionOutcome::Upgraded(report) => writeln!(out, "ok level {}", report.level),
        ActionOutcome::Trained(id) => writeln!(out, "ok {}", id.0),
        ActionOutcome::Merged(unit) => writeln!(out, "ok {} {}", unit.kind.name(), unit.id.0),
        ActionOutcome::TurnPassed(report) => {
            write!(out, "ok turn {} player {}", report.turn, player_name(game, report.player))?;
            if !report.economy.paid {
                write!(out, " unpaid {}", report.economy.maintenance)?;
            }
            writeln!(out)
        }
    }
}

fn write_game_over(game: &GameMatch, out: &mut impl Write) -> io::Result<()> {
    match game.state() {
        GameState::GameOver { winner: Some(w) } => writeln!(out, "gameover {}", player_name(game, w)),
        GameState::GameOver { winner: None } => writeln!(out, "gameover none"),
        GameState::Running => Ok(()),
    }
}

fn write_state(game: &GameMatch, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "turn {}", game.turn())?;
    writeln!(out, "current {}", player_name(game, game.current_player()))?;
    match game.state() {
        GameState::Running => writeln!(out, "state running")?,
        GameState::GameOver { winner } => {
            let name = winner.map_or("none", |w| player_name(game, w));
            writeln!(out, "state gameover {name}")?;
        }
    }
    for p in game.players() {
        write!(
            out,
            "player {} gold {} food {} space {}/{} reserve {} wins {}",
            p.name,
            p.gold,
            p.food,
            game.unit_space_used(p.id),
            p.max_unit_space,
            p.reserve.len(),
            p.wins
        )?;
        if p.eliminated {
            write!(out, " eliminated")?;
        }
        writeln!(out)?;
    }
    for (c, s) in game.board().structures().filter(|(_, s)| s.kind == StructureKind::Tower) {
        writeln!(
            out,
            "tower {} {} owner {} level {} durability {} power {} range {} blocks {}",
            c.x,
            c.y,
            player_name(game, s.owner),
            s.level,
            s.durability,
            s.attack_power(),
            s.attack_range(),
            s.block_level()
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(host: &mut Host, lines: &[&str]) -> Vec<String> {
        let now = Instant::now();
        let mut out = Vec::new();
        for line in lines {
            host.handle_line(line, now, &mut out).unwrap();
        }
        String::from_utf8(out).unwrap().lines().map(str::to_string).collect()
    }

    #[test]
    fn commands_without_a_game_are_rejected() {
        let mut host = Host::new(Rules::default());
        let lines = run(&mut host, &["show", "next", "save"]);
        assert_eq!(lines, vec!["error no_game"; 3]);
    }

    #[test]
    fn parse_errors_are_reported_and_blank_lines_ignored() {
        let mut host = Host::new(Rules::default());
        let lines = run(&mut host, &["", "fly", "move 1 2"]);
        assert_eq!(lines, vec!["error unknown_command", "error usage"]);
    }

    #[test]
    fn quit_stops_the_loop() {
        let mut host = Host::new(Rules::default());
        let mut out = Vec::new();
        assert_eq!(host.handle_line("quit", Instant::now(), &mut out).unwrap(), Flow::Quit);
        assert!(out.is_empty());
    }

    #[test]
    fn new_game_and_train() {
        let mut host = Host::new(Rules::default());
        let lines = run(&mut host, &["newgame 6 6 alice bob", "train peasant", "next"]);
        assert_eq!(lines[0], "ok");
        assert_eq!(lines[1], "ok 1");
        assert_eq!(lines[2], "ok turn 1 player bob");
        let game = host.game().unwrap();
        assert_eq!(game.current_player(), PlayerId(1));
        assert_eq!(game.players()[0].reserve.len(), 1);
    }

    #[test]
    fn oversized_board_is_refused() {
        let mut host = Host::new(Rules::default());
        let lines = run(&mut host, &["newgame 65535 65535 a b", "newgame 300 300 a b", "state"]);
        assert_eq!(lines, vec!["error invalid_size", "error invalid_size", "error no_game"]);
        assert!(host.game().is_none());
    }

    #[test]
    fn oversized_snapshot_is_refused() {
        let mut host = Host::new(Rules::default());
        let saved = run(&mut host, &["newgame 6 6 alice bob", "save"]);
        let json = saved[1].strip_prefix("ok ").unwrap();
        let mut value: serde_json::Value = serde_json::from_str(json).unwrap();
        value["width"] = serde_json::json!(65535);
        value["height"] = serde_json::json!(65535);
        let load = format!("load {value}");
        let lines = run(&mut host, &[load.as_str()]);
        assert_eq!(lines, vec!["error invalid_size"]);
        assert_eq!(host.game().unwrap().board().width(), 6);
    }

    #[test]
    fn rule_errors_use_their_codes() {
        let mut host = Host::new(Rules::default());
        let lines = run(&mut host, &["newgame 6 6 alice bob", "upgrade 0 0", "move 3 3 3 4"]);
        assert_eq!(&lines[1..], ["error max_level_reached", "error invalid_target"]);
    }

    #[test]
    fn layout_rows_feed_the_next_game() {
        let mut host = Host::new(Rules::default());
        let lines = run(
            &mut host,
            &["layout ..f", "layout ...", "layout f..", "newgame layout a b", "show"],
        );
        assert_eq!(lines[..4], ["ok", "ok", "ok", "ok"]);
        assert_eq!(lines.last().map(String::as_str), Some("ok"));
        let board = host.game().unwrap().board();
        assert_eq!((board.width(), board.height()), (3, 3));
        // The layout buffer is consumed by newgame.
        assert_eq!(run(&mut host, &["newgame layout a b"]), vec!["error empty_layout"]);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut host = Host::new(Rules::default());
        assert_eq!(run(&mut host, &["newgame 5 5 a a"]), vec!["error duplicate_name"]);
        assert!(host.game().is_none());
    }

    #[test]
    fn state_lists_players() {
        let mut host = Host::new(Rules::default());
        let lines = run(&mut host, &["newgame 5 5 alice bob", "state"]);
        assert_eq!(lines[1], "turn 1");
        assert_eq!(lines[2], "current alice");
        assert_eq!(lines[3], "state running");
        assert!(lines[4].starts_with("player alice gold "));
        assert!(lines[5].starts_with("player bob gold "));
        assert_eq!(lines[6], "ok");
    }

    #[test]
    fn state_lists_towers() {
        let mut host = Host::new(Rules::default());
        let lines = run(&mut host, &["newgame 5 5 alice bob", "build tower 1 1", "upgrade 1 1", "state"]);
        assert_eq!(&lines[..3], ["ok", "ok", "ok level 2"]);
        assert_eq!(lines[8], "tower 1 1 owner alice level 2 durability 80 power 8 range 3 blocks 3");
        assert_eq!(lines[9], "ok");
    }

    #[test]
    fn save_and_load_round_trip() {
        let mut host = Host::new(Rules::default());
        let lines = run(&mut host, &["newgame 6 6 alice bob", "train spearman", "save"]);
        let json = lines[2].strip_prefix("ok ").unwrap().to_string();
        let before = host.game().unwrap().clone();

        let mut other = Host::new(Rules::default());
        let load = format!("load {json}");
        assert_eq!(run(&mut other, &[load.as_str()]), vec!["ok"]);
        assert_eq!(other.game(), Some(&before));
    }

    #[test]
    fn bad_snapshot_is_rejected() {
        let mut host = Host::new(Rules::default());
        assert_eq!(run(&mut host, &["load {not json"]), vec!["error invalid_json"]);
    }

    #[test]
    fn timed_out_turn_is_reported() {
        let rules = Rules {
            turn_timeout_secs: 10,
            ..Rules::default()
        };
        let mut host = Host::new(rules);
        let t0 = Instant::now();
        let mut out = Vec::new();
        host.handle_line("newgame 5 5 alice bob", t0, &mut out).unwrap();
        assert_eq!(host.time_until_deadline(t0), Some(Duration::from_secs(10)));

        host.poll_timeout(t0 + Duration::from_secs(11), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "ok\ntimeout turn 1 player bob\n");
    }
}
