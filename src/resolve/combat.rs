//! Attack resolution.
//!
//! Every precondition is checked before any damage is applied, so a
//! rejected attack leaves the board untouched.

use crate::board::{Board, Coord, Player, PlayerId, StructureKind, Terrain};
use crate::error::RuleError;
use crate::rules::Rules;

use super::damage::{damage_structure, damage_unit, Hit, Target};

/// The result of a successful attack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackReport {
    pub attacker: Coord,
    /// Damage before structural shielding.
    pub base_damage: u32,
    pub primary: Hit,
    /// Cleave hits on units around the target.
    pub splash: Vec<Hit>,
}

impl AttackReport {
    pub fn town_hall_destroyed(&self) -> bool {
        self.primary.destroyed_town_hall()
    }

    /// Every hit, primary first.
    pub fn hits(&self) -> impl Iterator<Item = &Hit> {
        std::iter::once(&self.primary).chain(self.splash.iter())
    }
}

/// Checks whether the unit at `from` may attack `target` this turn,
/// returning the owner of the target on success.
pub fn validate_attack(
    board: &Board,
    current: PlayerId,
    from: Coord,
    target: Target,
) -> Result<PlayerId, RuleError> {
    let attacker = board.tile(from)?.unit.as_ref().ok_or(RuleError::InvalidTarget)?;
    if attacker.owner != current {
        return Err(RuleError::NotYourTurn);
    }
    if attacker.has_acted {
        return Err(RuleError::AlreadyActed);
    }

    let at = target.coord();
    let tile = board.tile(at)?;
    let target_owner = match target {
        Target::Unit(_) => tile.unit.as_ref().map(|u| u.owner),
        Target::Structure(_) => tile.structure.as_ref().map(|s| s.owner),
    }
    .ok_or(RuleError::InvalidTarget)?;

    if from.manhattan(at) > attacker.attack_range() {
        return Err(RuleError::OutOfRange);
    }
    if target_owner == attacker.owner {
        return Err(RuleError::FriendlyFire);
    }
    Ok(target_owner)
}

/// Damage a structure actually takes: halved when a tower of its owner
/// stands on a cardinal neighbor. Towers never shield themselves.
fn shielded(board: &Board, at: Coord, damage: u32) -> u32 {
    match board.structure(at) {
        Some(s) if s.kind != StructureKind::Tower && board.is_adjacent_to_friendly_tower(at, s.owner) => {
            damage / 2
        }
        _ => damage,
    }
}

/// Resolves an attack by the unit at `from` on `target`.
pub fn attack(
    board: &mut Board,
    players: &mut [Player],
    rules: &Rules,
    current: PlayerId,
    from: Coord,
    target: Target,
) -> Result<AttackReport, RuleError> {
    validate_attack(board, current, from, target)?;

    let (owner, power, cleaves) = match board.unit(from) {
        Some(u) => (u.owner, u.attack_power(), u.cleaves()),
        None => return Err(RuleError::InvalidTarget),
    };
    let forest = board.terrain(from) == Some(Terrain::Forest);
    let base_damage = power + if forest { rules.forest_attack_bonus } else { 0 };
    let at = target.coord();

    // Collected before the primary hit so the target tile's neighborhood is
    // read from the pre-attack board.
    let splash_targets: Vec<Coord> = if cleaves {
        board
            .neighborhood8(at)
            .filter(|(_, t)| t.unit.as_ref().is_some_and(|u| u.owner != owner))
            .map(|(c, _)| c)
            .collect()
    } else {
        Vec::new()
    };

    let primary = match target {
        Target::Unit(c) => damage_unit(board, c, base_damage),
        Target::Structure(c) => {
            let dealt = shielded(board, c, base_damage);
            damage_structure(board, players, c, dealt)
        }
    }
    .ok_or(RuleError::InvalidTarget)?;

    let splash_damage = base_damage / rules.cleave_divisor.max(1);
    let splash = splash_targets
        .into_iter()
        .filter_map(|c| damage_unit(board, c, splash_damage))
        .collect();

    if let Some(unit) = board.unit_mut(from) {
        unit.has_acted = true;
    }

    Ok(AttackReport {
        attacker: from,
        base_damage,
        primary,
        splash,
    })
}
