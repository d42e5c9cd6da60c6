//! Unit kinds and unit instances.
//!
//! A unit's combat and movement numbers are copied from the rules table
//! when it is trained, so a unit stays self-contained once on the board.

use serde::{Deserialize, Serialize};

use super::player::PlayerId;
use super::traits::Damageable;
use crate::rules::UnitStats;

/// The four unit tiers, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    Peasant,
    Spearman,
    Swordsman,
    Knight,
}

/// All unit kinds in tier order.
pub const ALL_UNIT_KINDS: [UnitKind; 4] = [
    UnitKind::Peasant,
    UnitKind::Spearman,
    UnitKind::Swordsman,
    UnitKind::Knight,
];

impl UnitKind {
    /// Fixed tier of the kind (Peasant = 1 ... Knight = 4). Used for tower
    /// blocking and merge eligibility.
    pub const fn hierarchy_level(self) -> u8 {
        match self {
            UnitKind::Peasant => 1,
            UnitKind::Spearman => 2,
            UnitKind::Swordsman => 3,
            UnitKind::Knight => 4,
        }
    }

    /// The kind produced by merging two units of this kind.
    pub const fn next_tier(self) -> Option<UnitKind> {
        match self {
            UnitKind::Peasant => Some(UnitKind::Spearman),
            UnitKind::Spearman => Some(UnitKind::Swordsman),
            UnitKind::Swordsman => Some(UnitKind::Knight),
            UnitKind::Knight => None,
        }
    }

    /// Lowercase name used by the command protocol.
    pub const fn name(self) -> &'static str {
        match self {
            UnitKind::Peasant => "peasant",
            UnitKind::Spearman => "spearman",
            UnitKind::Swordsman => "swordsman",
            UnitKind::Knight => "knight",
        }
    }

    /// Parses a kind from its lowercase protocol name.
    pub fn from_name(s: &str) -> Option<UnitKind> {
        ALL_UNIT_KINDS.iter().copied().find(|k| k.name() == s)
    }

    /// Single-character abbreviation used when rendering the board.
    pub const fn code(self) -> char {
        match self {
            UnitKind::Peasant => 'p',
            UnitKind::Spearman => 's',
            UnitKind::Swordsman => 'w',
            UnitKind::Knight => 'k',
        }
    }
}

/// Stable identifier assigned when a unit is trained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(pub u32);

/// A trained unit, either in its owner's reserve or deployed on a tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    pub id: UnitId,
    pub kind: UnitKind,
    pub owner: PlayerId,
    pub health: u32,
    pub stats: UnitStats,
    pub has_acted: bool,
}

impl Unit {
    /// Creates a fresh unit at full health.
    pub fn new(id: UnitId, kind: UnitKind, owner: PlayerId, stats: UnitStats) -> Self {
        Unit {
            id,
            kind,
            owner,
            health: stats.max_health,
            stats,
            has_acted: false,
        }
    }

    pub fn hierarchy_level(&self) -> u8 {
        self.kind.hierarchy_level()
    }

    pub fn attack_power(&self) -> u32 {
        self.stats.attack_power
    }

    pub fn attack_range(&self) -> u32 {
        self.stats.attack_range
    }

    pub fn movement_range(&self) -> u32 {
        self.stats.movement_range
    }

    pub fn unit_space(&self) -> u32 {
        self.stats.unit_space
    }

    /// Whether this unit's attacks splash onto adjacent enemy units.
    pub fn cleaves(&self) -> bool {
        self.stats.cleave
    }
}

impl Damageable for Unit {
    fn hit_points(&self) -> u32 {
        self.health
    }

    fn max_hit_points(&self) -> u32 {
        self.stats.max_health
    }

    fn take_damage(&mut self, amount: u32) -> bool {
        self.health = self.health.saturating_sub(amount);
        self.health == 0
    }
}
