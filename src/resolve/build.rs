//! Construction, upgrades, training and deployment.
//!
//! Each operation validates completely, then pays and mutates. Nothing is
//! deducted from a player when a check fails.

use crate::board::{
    Board, Coord, Player, PlayerId, Structure, StructureKind, Terrain, Unit, UnitId, UnitKind,
    Upgradeable,
};
use crate::error::RuleError;
use crate::rules::Rules;

use super::damage::used_unit_space;

/// The result of an upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpgradeReport {
    pub kind: StructureKind,
    pub level: u8,
    pub cost: u32,
    /// Unit space added to the owner's cap (barracks only).
    pub unit_space_gained: u32,
}

fn player_ref(players: &[Player], id: PlayerId) -> Result<&Player, RuleError> {
    players.get(id.index()).ok_or(RuleError::InvalidTarget)
}

fn player_mut(players: &mut [Player], id: PlayerId) -> Result<&mut Player, RuleError> {
    players.get_mut(id.index()).ok_or(RuleError::InvalidTarget)
}

/// Checks whether `player` may build `kind` at `at`.
pub fn validate_build(
    board: &Board,
    players: &[Player],
    rules: &Rules,
    current: PlayerId,
    player: PlayerId,
    kind: StructureKind,
    at: Coord,
) -> Result<(), RuleError> {
    if player != current {
        return Err(RuleError::NotYourTurn);
    }
    let tile = board.tile(at)?;
    if !kind.is_buildable() {
        return Err(RuleError::InvalidTarget);
    }
    let enemy_unit = tile.unit.as_ref().is_some_and(|u| u.owner != player);
    if tile.terrain.is_void()
        || tile.structure.is_some()
        || enemy_unit
        || !board.is_adjacent_to_friendly_structure(at, player, None)
    {
        return Err(RuleError::InvalidTarget);
    }
    let stats = rules.structure(kind);
    if !player_ref(players, player)?.can_afford(stats.gold_cost, stats.food_cost) {
        return Err(RuleError::InsufficientResources);
    }
    Ok(())
}

/// Builds a level-1 structure of `kind` at `at` for `player`.
pub fn build_structure(
    board: &mut Board,
    players: &mut [Player],
    rules: &Rules,
    current: PlayerId,
    player: PlayerId,
    kind: StructureKind,
    at: Coord,
) -> Result<(), RuleError> {
    validate_build(board, players, rules, current, player, kind, at)?;
    let stats = *rules.structure(kind);
    let structure = Structure::new(kind, player, stats);
    let grant = structure.unit_space_grant();

    if board.terrain(at) == Some(Terrain::Forest) {
        board.set_terrain(at, Terrain::Empty)?;
    }
    board.place_structure(at, structure)?;

    let owner = player_mut(players, player)?;
    owner.pay(stats.gold_cost, stats.food_cost);
    owner.max_unit_space += grant;
    Ok(())
}

/// Checks whether the structure at `at` may be upgraded, returning the
/// gold it would cost.
pub fn validate_upgrade(
    board: &Board,
    players: &[Player],
    current: PlayerId,
    at: Coord,
) -> Result<u32, RuleError> {
    let structure = board.tile(at)?.structure.as_ref().ok_or(RuleError::InvalidTarget)?;
    if structure.owner != current {
        return Err(RuleError::NotYourTurn);
    }
    if !structure.can_upgrade() {
        return Err(RuleError::MaxLevelReached);
    }
    let cost = structure.stats.upgrade_cost;
    if !player_ref(players, current)?.can_afford(cost, 0) {
        return Err(RuleError::InsufficientResources);
    }
    Ok(cost)
}

/// Upgrades the structure at `at` by one level.
pub fn upgrade_structure(
    board: &mut Board,
    players: &mut [Player],
    current: PlayerId,
    at: Coord,
) -> Result<UpgradeReport, RuleError> {
    let cost = validate_upgrade(board, players, current, at)?;
    let structure = board.structure_mut(at).ok_or(RuleError::InvalidTarget)?;
    let before = structure.unit_space_grant();
    structure.upgrade()?;
    let report = UpgradeReport {
        kind: structure.kind,
        level: structure.level,
        cost,
        unit_space_gained: structure.unit_space_grant() - before,
    };

    let owner = player_mut(players, current)?;
    owner.pay(cost, 0);
    owner.max_unit_space += report.unit_space_gained;
    Ok(report)
}

/// Checks whether `player` may train a unit of `kind`.
pub fn validate_train(
    board: &Board,
    players: &[Player],
    rules: &Rules,
    current: PlayerId,
    player: PlayerId,
    kind: UnitKind,
) -> Result<(), RuleError> {
    if player != current {
        return Err(RuleError::NotYourTurn);
    }
    let p = player_ref(players, player)?;
    let stats = rules.unit(kind);
    if !p.can_afford(stats.gold_cost, stats.food_cost) {
        return Err(RuleError::InsufficientResources);
    }
    if used_unit_space(p, board) + stats.unit_space > p.max_unit_space {
        return Err(RuleError::InsufficientUnitSpace);
    }
    Ok(())
}

/// Trains a unit into `player`'s reserve with the id `new_id`.
pub fn train_unit(
    board: &Board,
    players: &mut [Player],
    rules: &Rules,
    current: PlayerId,
    player: PlayerId,
    kind: UnitKind,
    new_id: UnitId,
) -> Result<UnitId, RuleError> {
    validate_train(board, players, rules, current, player, kind)?;
    let stats = *rules.unit(kind);
    let p = player_mut(players, player)?;
    p.pay(stats.gold_cost, stats.food_cost);
    p.reserve.push(Unit::new(new_id, kind, player, stats));
    Ok(new_id)
}

/// Whether `at` is a legal drop point for `player`: within one step of one
/// of their town halls or barracks, and not on an enemy structure.
pub fn is_deploy_site(board: &Board, player: PlayerId, at: Coord) -> bool {
    let Some(tile) = board.get(at) else {
        return false;
    };
    if tile.terrain.is_void() || tile.unit.is_some() {
        return false;
    }
    if tile.structure.as_ref().is_some_and(|s| s.owner != player) {
        return false;
    }
    board.is_adjacent_to_friendly_structure(at, player, Some(StructureKind::TownHall))
        || board.is_adjacent_to_friendly_structure(at, player, Some(StructureKind::Barrack))
}

/// Checks whether `player` may deploy reserve unit `id` at `at`.
pub fn validate_deploy(
    board: &Board,
    players: &[Player],
    current: PlayerId,
    player: PlayerId,
    id: UnitId,
    at: Coord,
) -> Result<(), RuleError> {
    if player != current {
        return Err(RuleError::NotYourTurn);
    }
    if player_ref(players, player)?.reserve_unit(id).is_none() {
        return Err(RuleError::InvalidTarget);
    }
    board.tile(at)?;
    if !is_deploy_site(board, player, at) {
        return Err(RuleError::InvalidTarget);
    }
    Ok(())
}

/// Moves reserve unit `id` onto the board at `at`.
pub fn deploy_unit(
    board: &mut Board,
    players: &mut [Player],
    current: PlayerId,
    player: PlayerId,
    id: UnitId,
    at: Coord,
) -> Result<(), RuleError> {
    validate_deploy(board, players, current, player, id, at)?;
    let unit = player_mut(players, player)?
        .take_reserve_unit(id)
        .ok_or(RuleError::InvalidTarget)?;
    board.place_unit(at, unit)?;
    Ok(())
}
