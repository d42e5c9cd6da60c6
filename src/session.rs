//! A match behind a single serialized command boundary, with an optional
//! turn timer.
//!
//! The timer is deadline based and never spawns threads: the host asks how
//! long it may wait for input, then calls `poll_timeout` so an idle player's
//! turn passes automatically.

use std::time::{Duration, Instant};

use tracing::info;

use crate::error::RuleError;
use crate::game::{Action, ActionOutcome, GameMatch, TurnReport};

/// Deadline for the current turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnTimer {
    timeout: Option<Duration>,
    deadline: Option<Instant>,
}

impl TurnTimer {
    /// A timer that expires `timeout` after each restart. `None` never
    /// expires.
    pub fn new(timeout: Option<Duration>, now: Instant) -> Self {
        let mut timer = TurnTimer {
            timeout,
            deadline: None,
        };
        timer.restart(now);
        timer
    }

    pub fn restart(&mut self, now: Instant) {
        self.deadline = self.timeout.map(|t| now + t);
    }

    pub fn stop(&mut self) {
        self.deadline = None;
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|d| now >= d)
    }

    /// Time left before the deadline, zero once it has passed.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }
}

/// Owns a match and its turn timer.
#[derive(Debug, Clone)]
pub struct Session {
    game: GameMatch,
    timer: TurnTimer,
}

impl Session {
    /// Starts a session. The turn timeout comes from the match's rules;
    /// zero disables it.
    pub fn new(game: GameMatch, now: Instant) -> Self {
        let secs = game.rules().turn_timeout_secs;
        let timeout = (secs > 0).then(|| Duration::from_secs(secs));
        let mut timer = TurnTimer::new(timeout, now);
        if game.state().is_over() {
            timer.stop();
        }
        Session { game, timer }
    }

    pub fn game(&self) -> &GameMatch {
        &self.game
    }

    pub fn timer(&self) -> &TurnTimer {
        &self.timer
    }

    /// Applies an action for the current player. A completed turn restarts
    /// the timer; a finished game stops it.
    pub fn apply(&mut self, action: Action, now: Instant) -> Result<ActionOutcome, RuleError> {
        let outcome = self.game.apply(action)?;
        if matches!(outcome, ActionOutcome::TurnPassed(_)) {
            self.timer.restart(now);
        }
        if self.game.state().is_over() {
            self.timer.stop();
        }
        Ok(outcome)
    }

    /// Passes the turn if the current player ran out of time. Returns
    /// `None` when nothing happened.
    pub fn poll_timeout(&mut self, now: Instant) -> Option<TurnReport> {
        if self.game.state().is_over() || !self.timer.is_expired(now) {
            return None;
        }
        info!(player = %self.game.current_player(), "turn timed out");
        let outcome = self.apply(Action::EndTurn, now).ok()?;
        match outcome {
            ActionOutcome::TurnPassed(report) => Some(report),
            _ => None,
        }
    }

    /// How long the host may block waiting for input before calling
    /// `poll_timeout`. `None` means indefinitely.
    pub fn time_until_deadline(&self, now: Instant) -> Option<Duration> {
        if self.game.state().is_over() {
            return None;
        }
        self.timer.remaining(now)
    }

    /// Swaps in another match, restarting the timer.
    pub fn replace(&mut self, game: GameMatch, now: Instant) {
        *self = Session::new(game, now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::PlayerId;
    use crate::rules::Rules;
    use crate::setup::{standard_match, BoardSpec};

    fn session(timeout: u64, now: Instant) -> Session {
        let rules = Rules {
            turn_timeout_secs: timeout,
            ..Rules::default()
        };
        let game = standard_match(rules, BoardSpec::Size { width: 5, height: 5 }, &["a", "b"], None).unwrap();
        Session::new(game, now)
    }

    #[test]
    fn disabled_timer_never_fires() {
        let t0 = Instant::now();
        let mut s = session(0, t0);
        assert_eq!(s.time_until_deadline(t0), None);
        assert!(s.poll_timeout(t0 + Duration::from_secs(3_600)).is_none());
        assert_eq!(s.game().current_player(), PlayerId(0));
    }

    #[test]
    fn expired_turn_passes() {
        let t0 = Instant::now();
        let mut s = session(30, t0);
        assert_eq!(s.time_until_deadline(t0 + Duration::from_secs(10)), Some(Duration::from_secs(20)));
        assert!(s.poll_timeout(t0 + Duration::from_secs(29)).is_none());

        let t1 = t0 + Duration::from_secs(30);
        let report = s.poll_timeout(t1).unwrap();
        assert_eq!(report.player, PlayerId(1));
        // The next player gets a fresh deadline.
        assert_eq!(s.time_until_deadline(t1), Some(Duration::from_secs(30)));
    }

    #[test]
    fn explicit_end_turn_restarts_timer() {
        let t0 = Instant::now();
        let mut s = session(30, t0);
        let t1 = t0 + Duration::from_secs(25);
        s.apply(Action::EndTurn, t1).unwrap();
        assert_eq!(s.time_until_deadline(t1), Some(Duration::from_secs(30)));
        assert!(s.poll_timeout(t0 + Duration::from_secs(40)).is_none());
    }

    #[test]
    fn rejected_action_does_not_touch_timer() {
        let t0 = Instant::now();
        let mut s = session(30, t0);
        let timer = *s.timer();
        let bad = Action::Upgrade { at: crate::board::Coord::new(0, 0) };
        assert_eq!(s.apply(bad, t0 + Duration::from_secs(5)), Err(RuleError::MaxLevelReached));
        assert_eq!(*s.timer(), timer);
    }
}
