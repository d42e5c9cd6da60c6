//! Match invariants.
//!
//! Bug detectors, not gameplay rules: a correctly implemented engine never
//! produces a violation after any public operation. The playout driver and
//! the property tests call `check_invariants` after every action.

use std::collections::HashSet;
use std::fmt;

use crate::board::{Damageable, Upgradeable};
use crate::game::{GameMatch, GameState};

/// One broken invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    pub message: String,
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

/// Checks every invariant and returns the violations found.
#[must_use]
pub fn check_invariants(game: &GameMatch) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let mut fail = |message: String| violations.push(InvariantViolation { message });
    let board = game.board();
    let current = game.current_player();
    let mut ids = HashSet::new();

    for (c, tile) in board.iter() {
        if tile.terrain.is_void() && !tile.is_empty() {
            fail(format!("void tile {c} holds an entity"));
        }
        if let Some(u) = &tile.unit {
            if u.is_destroyed() || u.hit_points() > u.max_hit_points() {
                fail(format!("unit {} at {c} has {}/{} hp", u.id.0, u.hit_points(), u.max_hit_points()));
            }
            if u.has_acted && u.owner != current {
                fail(format!("unit {} at {c} acted outside its owner's turn", u.id.0));
            }
            if game.player(u.owner).is_none() {
                fail(format!("unit {} at {c} has unknown owner {}", u.id.0, u.owner));
            }
            if !ids.insert(u.id) {
                fail(format!("unit id {} appears twice", u.id.0));
            }
        }
        if let Some(s) = &tile.structure {
            if s.is_destroyed() || s.hit_points() > s.max_hit_points() {
                fail(format!("{} at {c} has {}/{} durability", s.kind.name(), s.hit_points(), s.max_hit_points()));
            }
            if s.level() == 0 || s.level() > s.max_level() {
                fail(format!("{} at {c} is level {}", s.kind.name(), s.level()));
            }
            if game.player(s.owner).is_none() {
                fail(format!("{} at {c} has unknown owner {}", s.kind.name(), s.owner));
            }
        }
    }

    for p in game.players() {
        for u in &p.reserve {
            if u.owner != p.id {
                fail(format!("{} holds unit {} owned by {}", p.id, u.id.0, u.owner));
            }
            if u.has_acted {
                fail(format!("reserve unit {} of {} is marked as acted", u.id.0, p.id));
            }
            if !ids.insert(u.id) {
                fail(format!("unit id {} appears twice", u.id.0));
            }
        }
        let used = game.unit_space_used(p.id);
        if used > p.max_unit_space {
            fail(format!("{} uses {used} unit space of {}", p.id, p.max_unit_space));
        }
    }

    match game.state() {
        GameState::Running => {
            if game.player(current).map_or(true, |p| p.eliminated) {
                fail(format!("current player {current} is not in the game"));
            }
        }
        GameState::GameOver { winner: Some(w) } => {
            if !board.has_town_hall(w) {
                fail(format!("winner {w} has no town hall"));
            }
        }
        GameState::GameOver { winner: None } => {}
    }

    violations
}
