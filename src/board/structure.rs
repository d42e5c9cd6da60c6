//! Structure kinds and structure instances.
//!
//! Level-dependent numbers (durability cap, production, unit space, tower
//! combat values) are derived from the stat row and the current level, so
//! upgrading only touches `level` and `durability`.

use serde::{Deserialize, Serialize};

use super::player::PlayerId;
use super::traits::{Damageable, Producer, Production, Upgradeable};
use crate::error::RuleError;
use crate::rules::StructureStats;

/// The five structure variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructureKind {
    TownHall,
    Farm,
    Market,
    Barrack,
    Tower,
}

pub const ALL_STRUCTURE_KINDS: [StructureKind; 5] = [
    StructureKind::TownHall,
    StructureKind::Farm,
    StructureKind::Market,
    StructureKind::Barrack,
    StructureKind::Tower,
];

impl StructureKind {
    /// Lowercase name used by the command protocol.
    pub const fn name(self) -> &'static str {
        match self {
            StructureKind::TownHall => "townhall",
            StructureKind::Farm => "farm",
            StructureKind::Market => "market",
            StructureKind::Barrack => "barrack",
            StructureKind::Tower => "tower",
        }
    }

    pub fn from_name(s: &str) -> Option<StructureKind> {
        ALL_STRUCTURE_KINDS.iter().copied().find(|k| k.name() == s)
    }

    /// Single-character abbreviation used when rendering the board.
    pub const fn code(self) -> char {
        match self {
            StructureKind::TownHall => 'H',
            StructureKind::Farm => 'F',
            StructureKind::Market => 'M',
            StructureKind::Barrack => 'B',
            StructureKind::Tower => 'T',
        }
    }

    /// Whether players may construct this kind. Town halls are only seeded
    /// at match setup.
    pub const fn is_buildable(self) -> bool {
        !matches!(self, StructureKind::TownHall)
    }
}

/// A structure standing on a tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Structure {
    pub kind: StructureKind,
    pub owner: PlayerId,
    pub level: u8,
    pub durability: u32,
    pub stats: StructureStats,
}

impl Structure {
    /// Creates a level-1 structure at full durability.
    pub fn new(kind: StructureKind, owner: PlayerId, stats: StructureStats) -> Self {
        Structure {
            kind,
            owner,
            level: 1,
            durability: stats.max_durability,
            stats,
        }
    }

    /// Levels gained beyond the first.
    fn bonus_levels(&self) -> u32 {
        u32::from(self.level.saturating_sub(1))
    }

    pub fn maintenance(&self) -> u32 {
        self.stats.maintenance
    }

    /// Unit space granted to the owner (Barrack only).
    pub fn unit_space_grant(&self) -> u32 {
        if self.kind != StructureKind::Barrack {
            return 0;
        }
        self.stats.unit_space + self.stats.unit_space_per_level * self.bonus_levels()
    }

    /// Tower attack power at the current level.
    pub fn attack_power(&self) -> u32 {
        if self.kind != StructureKind::Tower {
            return 0;
        }
        self.stats.attack_power + self.stats.attack_power_per_level * self.bonus_levels()
    }

    /// Tower attack range at the current level.
    pub fn attack_range(&self) -> u32 {
        if self.kind != StructureKind::Tower {
            return 0;
        }
        self.stats.attack_range + self.stats.attack_range_per_level * self.bonus_levels()
    }

    /// Highest unit hierarchy level this tower keeps out of its
    /// neighborhood. Zero for non-towers.
    pub fn block_level(&self) -> u8 {
        if self.kind != StructureKind::Tower {
            return 0;
        }
        self.level.saturating_add(1)
    }
}

impl Damageable for Structure {
    fn hit_points(&self) -> u32 {
        self.durability
    }

    fn max_hit_points(&self) -> u32 {
        self.stats.max_durability + self.stats.durability_per_level * self.bonus_levels()
    }

    fn take_damage(&mut self, amount: u32) -> bool {
        self.durability = self.durability.saturating_sub(amount);
        self.durability == 0
    }
}

impl Producer for Structure {
    fn production(&self) -> Production {
        let bonus = self.bonus_levels();
        Production {
            gold: self.stats.gold_output + self.stats.gold_output_per_level * bonus,
            food: self.stats.food_output + self.stats.food_output_per_level * bonus,
        }
    }
}

impl Upgradeable for Structure {
    fn level(&self) -> u8 {
        self.level
    }

    fn max_level(&self) -> u8 {
        if self.kind == StructureKind::TownHall {
            return 1;
        }
        self.stats.max_level.max(1)
    }

    fn upgrade(&mut self) -> Result<(), RuleError> {
        if !self.can_upgrade() {
            return Err(RuleError::MaxLevelReached);
        }
        self.level += 1;
        self.durability = (self.durability + self.stats.durability_per_level).min(self.max_hit_points());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Rules;

    fn make(kind: StructureKind) -> Structure {
        let rules = Rules::default();
        Structure::new(kind, PlayerId(0), *rules.structure(kind))
    }

    #[test]
    fn new_structure_is_level_one_at_full_durability() {
        let farm = make(StructureKind::Farm);
        assert_eq!(farm.level, 1);
        assert_eq!(farm.durability, farm.max_hit_points());
    }

    #[test]
    fn farm_upgrade_raises_food_and_durability() {
        let mut farm = make(StructureKind::Farm);
        let before = farm.production();
        let max_before = farm.max_hit_points();
        farm.upgrade().unwrap();
        assert_eq!(farm.level, 2);
        assert!(farm.production().food > before.food);
        assert_eq!(farm.production().gold, before.gold);
        assert_eq!(farm.max_hit_points(), max_before + farm.stats.durability_per_level);
        assert_eq!(farm.durability, farm.max_hit_points());
    }

    #[test]
    fn upgrade_keeps_damage_taken() {
        let mut market = make(StructureKind::Market);
        market.take_damage(12);
        let hp = market.durability;
        market.upgrade().unwrap();
        assert_eq!(market.durability, hp + market.stats.durability_per_level);
    }

    #[test]
    fn upgrade_at_max_level_changes_nothing() {
        let mut tower = make(StructureKind::Tower);
        while tower.can_upgrade() {
            tower.upgrade().unwrap();
        }
        let snapshot = tower.clone();
        assert_eq!(tower.upgrade(), Err(RuleError::MaxLevelReached));
        assert_eq!(tower, snapshot);
    }

    #[test]
    fn town_hall_never_upgrades() {
        let mut hall = make(StructureKind::TownHall);
        assert_eq!(hall.upgrade(), Err(RuleError::MaxLevelReached));
        assert_eq!(hall.level, 1);
    }

    #[test]
    fn tower_block_level_tracks_level() {
        let mut tower = make(StructureKind::Tower);
        assert_eq!(tower.block_level(), 2);
        let range = tower.attack_range();
        tower.upgrade().unwrap();
        assert_eq!(tower.block_level(), 3);
        assert!(tower.attack_range() > range);
        assert_eq!(make(StructureKind::Farm).block_level(), 0);
    }

    #[test]
    fn barrack_grant_grows_with_level() {
        let mut barrack = make(StructureKind::Barrack);
        let base = barrack.unit_space_grant();
        assert!(base > 0);
        barrack.upgrade().unwrap();
        assert_eq!(barrack.unit_space_grant(), base + barrack.stats.unit_space_per_level);
        assert_eq!(make(StructureKind::Farm).unit_space_grant(), 0);
    }

    #[test]
    fn name_roundtrip() {
        for kind in ALL_STRUCTURE_KINDS {
            assert_eq!(StructureKind::from_name(kind.name()), Some(kind));
        }
        assert!(!StructureKind::TownHall.is_buildable());
        assert!(StructureKind::Farm.is_buildable());
    }
}
