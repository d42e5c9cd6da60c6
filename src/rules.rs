//! Match configuration: per-variant stat tables and economy constants.
//!
//! `Rules::default()` holds the standard tables. A JSON file may override
//! any subset of fields; missing fields fall back to the defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::board::{StructureKind, UnitKind, ALL_STRUCTURE_KINDS, ALL_UNIT_KINDS};

/// Environment variable naming an optional rules file for the binaries.
pub const RULES_ENV: &str = "BULWARK_RULES";

/// Errors raised while loading a rules file.
#[derive(Debug, thiserror::Error)]
pub enum RulesError {
    #[error("failed to read rules file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid rules JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cleave divisor must be at least 1")]
    ZeroCleaveDivisor,

    #[error("{0} must have at least 1 hit point")]
    ZeroHitPoints(&'static str),
}

/// Fixed numbers for one unit kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitStats {
    pub max_health: u32,
    pub attack_power: u32,
    pub attack_range: u32,
    pub movement_range: u32,
    pub gold_cost: u32,
    pub food_cost: u32,
    pub unit_space: u32,
    /// Attacks splash onto enemy units around the target.
    #[serde(default)]
    pub cleave: bool,
}

/// Fixed numbers for one structure kind, with per-level increments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StructureStats {
    pub max_durability: u32,
    pub durability_per_level: u32,
    pub maintenance: u32,
    pub gold_cost: u32,
    pub food_cost: u32,
    pub max_level: u8,
    pub upgrade_cost: u32,
    pub gold_output: u32,
    pub gold_output_per_level: u32,
    pub food_output: u32,
    pub food_output_per_level: u32,
    pub unit_space: u32,
    pub unit_space_per_level: u32,
    pub attack_power: u32,
    pub attack_power_per_level: u32,
    pub attack_range: u32,
    pub attack_range_per_level: u32,
}

/// Complete rule set for a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    pub peasant: UnitStats,
    pub spearman: UnitStats,
    pub swordsman: UnitStats,
    pub knight: UnitStats,
    pub town_hall: StructureStats,
    pub farm: StructureStats,
    pub market: StructureStats,
    pub barrack: StructureStats,
    pub tower: StructureStats,
    /// Extra damage for an attacker standing on forest.
    pub forest_attack_bonus: u32,
    /// Splash damage is `base_damage / cleave_divisor`.
    pub cleave_divisor: u32,
    /// Unit space every player has before barracks.
    pub base_unit_space: u32,
    pub starting_gold: u32,
    pub starting_food: u32,
    /// Seconds a player may idle before the turn passes automatically.
    /// Zero disables the timer.
    pub turn_timeout_secs: u64,
}

impl Default for Rules {
    fn default() -> Self {
        Rules {
            peasant: UnitStats {
                max_health: 10,
                attack_power: 2,
                attack_range: 1,
                movement_range: 2,
                gold_cost: 10,
                food_cost: 5,
                unit_space: 1,
                cleave: false,
            },
            spearman: UnitStats {
                max_health: 20,
                attack_power: 5,
                attack_range: 1,
                movement_range: 2,
                gold_cost: 20,
                food_cost: 10,
                unit_space: 1,
                cleave: false,
            },
            swordsman: UnitStats {
                max_health: 30,
                attack_power: 8,
                attack_range: 1,
                movement_range: 2,
                gold_cost: 40,
                food_cost: 15,
                unit_space: 2,
                cleave: true,
            },
            knight: UnitStats {
                max_health: 40,
                attack_power: 12,
                attack_range: 1,
                movement_range: 4,
                gold_cost: 80,
                food_cost: 20,
                unit_space: 3,
                cleave: false,
            },
            town_hall: StructureStats {
                max_durability: 100,
                maintenance: 10,
                max_level: 1,
                gold_output: 5,
                ..StructureStats::default()
            },
            farm: StructureStats {
                max_durability: 30,
                durability_per_level: 10,
                maintenance: 10,
                gold_cost: 100,
                max_level: 3,
                upgrade_cost: 50,
                food_output: 10,
                food_output_per_level: 5,
                ..StructureStats::default()
            },
            market: StructureStats {
                max_durability: 30,
                durability_per_level: 10,
                maintenance: 10,
                gold_cost: 120,
                max_level: 3,
                upgrade_cost: 60,
                gold_output: 15,
                gold_output_per_level: 5,
                ..StructureStats::default()
            },
            barrack: StructureStats {
                max_durability: 50,
                durability_per_level: 15,
                maintenance: 15,
                gold_cost: 150,
                food_cost: 20,
                max_level: 3,
                upgrade_cost: 75,
                unit_space: 5,
                unit_space_per_level: 3,
                ..StructureStats::default()
            },
            tower: StructureStats {
                max_durability: 60,
                durability_per_level: 20,
                maintenance: 15,
                gold_cost: 150,
                food_cost: 30,
                max_level: 3,
                upgrade_cost: 75,
                attack_power: 6,
                attack_power_per_level: 2,
                attack_range: 2,
                attack_range_per_level: 1,
                ..StructureStats::default()
            },
            forest_attack_bonus: 2,
            cleave_divisor: 2,
            base_unit_space: 5,
            starting_gold: 500,
            starting_food: 200,
            turn_timeout_secs: 0,
        }
    }
}

impl Rules {
    /// Stat row for a unit kind.
    pub fn unit(&self, kind: UnitKind) -> &UnitStats {
        match kind {
            UnitKind::Peasant => &self.peasant,
            UnitKind::Spearman => &self.spearman,
            UnitKind::Swordsman => &self.swordsman,
            UnitKind::Knight => &self.knight,
        }
    }

    /// Stat row for a structure kind.
    pub fn structure(&self, kind: StructureKind) -> &StructureStats {
        match kind {
            StructureKind::TownHall => &self.town_hall,
            StructureKind::Farm => &self.farm,
            StructureKind::Market => &self.market,
            StructureKind::Barrack => &self.barrack,
            StructureKind::Tower => &self.tower,
        }
    }

    pub fn structure_mut(&mut self, kind: StructureKind) -> &mut StructureStats {
        match kind {
            StructureKind::TownHall => &mut self.town_hall,
            StructureKind::Farm => &mut self.farm,
            StructureKind::Market => &mut self.market,
            StructureKind::Barrack => &mut self.barrack,
            StructureKind::Tower => &mut self.tower,
        }
    }

    /// Parses rules from JSON, filling omitted fields from the defaults.
    pub fn from_json(s: &str) -> Result<Rules, RulesError> {
        let rules: Rules = serde_json::from_str(s)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Reads a rules file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Rules, RulesError> {
        let text = std::fs::read_to_string(path)?;
        Rules::from_json(&text)
    }

    /// Loads the file named by `BULWARK_RULES`, or the defaults when the
    /// variable is unset or empty.
    pub fn from_env() -> Result<Rules, RulesError> {
        match std::env::var_os(RULES_ENV) {
            Some(path) if !path.is_empty() => Rules::load(path),
            _ => Ok(Rules::default()),
        }
    }

    fn validate(&self) -> Result<(), RulesError> {
        if self.cleave_divisor == 0 {
            return Err(RulesError::ZeroCleaveDivisor);
        }
        for kind in ALL_UNIT_KINDS {
            if self.unit(kind).max_health == 0 {
                return Err(RulesError::ZeroHitPoints(kind.name()));
            }
        }
        for kind in ALL_STRUCTURE_KINDS {
            if self.structure(kind).max_durability == 0 {
                return Err(RulesError::ZeroHitPoints(kind.name()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_costs() {
        let rules = Rules::default();
        assert_eq!(rules.structure(StructureKind::Farm).gold_cost, 100);
        assert_eq!(rules.unit(UnitKind::Peasant).unit_space, 1);
        assert!(rules.unit(UnitKind::Swordsman).cleave);
        assert!(!rules.unit(UnitKind::Knight).cleave);
        assert_eq!(rules.starting_gold, 500);
        assert_eq!(rules.starting_food, 200);
    }

    #[test]
    fn merged_units_never_need_more_space_than_their_inputs() {
        let rules = Rules::default();
        for kind in crate::board::ALL_UNIT_KINDS {
            if let Some(next) = kind.next_tier() {
                assert!(rules.unit(next).unit_space <= 2 * rules.unit(kind).unit_space);
            }
        }
    }

    #[test]
    fn partial_json_overrides_defaults() {
        let rules = Rules::from_json(r#"{"starting_gold": 42, "cleave_divisor": 3}"#).unwrap();
        assert_eq!(rules.starting_gold, 42);
        assert_eq!(rules.cleave_divisor, 3);
        assert_eq!(rules.starting_food, Rules::default().starting_food);
        assert_eq!(rules.farm, Rules::default().farm);
    }

    #[test]
    fn partial_structure_row_without_durability_is_rejected() {
        // Omitted fields inside a row fall back to zero, not to the default row.
        let err = Rules::from_json(r#"{"farm": {"gold_cost": 7}}"#).unwrap_err();
        assert!(matches!(err, RulesError::ZeroHitPoints("farm")));
    }

    #[test]
    fn zero_cleave_divisor_is_rejected() {
        let err = Rules::from_json(r#"{"cleave_divisor": 0}"#).unwrap_err();
        assert!(matches!(err, RulesError::ZeroCleaveDivisor));
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(matches!(Rules::from_json("{"), Err(RulesError::Json(_))));
    }
}
