//! Player state.
//!
//! A player's deployed units and structures live on the board; only the
//! trained-but-undeployed reserve is held here.

use std::fmt;

use super::unit::{Unit, UnitId};

/// Index of a player in the match's seating order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(pub u8);

impl PlayerId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// State for a single player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub gold: u32,
    pub food: u32,
    /// Trained units that have not been placed on the board yet.
    pub reserve: Vec<Unit>,
    pub max_unit_space: u32,
    pub wins: u32,
    /// Set once the player has lost every town hall.
    pub eliminated: bool,
}

impl Player {
    /// Creates a player with the given starting resources and no units.
    pub fn new(id: PlayerId, name: impl Into<String>, gold: u32, food: u32, max_unit_space: u32) -> Self {
        Player {
            id,
            name: name.into(),
            gold,
            food,
            reserve: Vec::new(),
            max_unit_space,
            wins: 0,
            eliminated: false,
        }
    }

    /// Whether the player holds at least `gold` and `food`.
    pub fn can_afford(&self, gold: u32, food: u32) -> bool {
        self.gold >= gold && self.food >= food
    }

    /// Deducts a cost that has already been checked with `can_afford`.
    pub fn pay(&mut self, gold: u32, food: u32) {
        self.gold = self.gold.saturating_sub(gold);
        self.food = self.food.saturating_sub(food);
    }

    /// Looks up an undeployed unit.
    pub fn reserve_unit(&self, id: UnitId) -> Option<&Unit> {
        self.reserve.iter().find(|u| u.id == id)
    }

    /// Removes and returns an undeployed unit.
    pub fn take_reserve_unit(&mut self, id: UnitId) -> Option<Unit> {
        let idx = self.reserve.iter().position(|u| u.id == id)?;
        Some(self.reserve.remove(idx))
    }

    /// Unit space consumed by the reserve alone.
    pub fn reserve_space(&self) -> u32 {
        self.reserve.iter().map(Unit::unit_space).sum()
    }
}
