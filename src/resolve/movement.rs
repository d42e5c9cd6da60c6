//! Unit movement.

use crate::board::{Board, Coord, PlayerId, StructureKind};
use crate::error::RuleError;

/// Whether an enemy tower within one step (8 directions) of `at` keeps a
/// unit of `hierarchy_level` owned by `owner` out.
pub fn blocked_by_tower(board: &Board, at: Coord, owner: PlayerId, hierarchy_level: u8) -> bool {
    board.neighborhood8(at).any(|(_, t)| {
        t.structure.as_ref().is_some_and(|s| {
            s.kind == StructureKind::Tower && s.owner != owner && s.block_level() >= hierarchy_level
        })
    })
}

/// Checks whether the unit at `from` may move to `to` this turn.
pub fn validate_move(board: &Board, current: PlayerId, from: Coord, to: Coord) -> Result<(), RuleError> {
    let unit = board.tile(from)?.unit.as_ref().ok_or(RuleError::InvalidTarget)?;
    if unit.owner != current {
        return Err(RuleError::NotYourTurn);
    }
    if unit.has_acted {
        return Err(RuleError::AlreadyActed);
    }

    let dest = board.tile(to)?;
    if from.manhattan(to) > unit.movement_range() {
        return Err(RuleError::OutOfRange);
    }
    if from == to || dest.terrain.is_void() || dest.unit.is_some() {
        return Err(RuleError::InvalidTarget);
    }
    if blocked_by_tower(board, to, unit.owner, unit.hierarchy_level()) {
        return Err(RuleError::Blocked);
    }
    Ok(())
}

/// Moves the unit at `from` to `to` and marks it as having acted.
pub fn move_unit(board: &mut Board, current: PlayerId, from: Coord, to: Coord) -> Result<(), RuleError> {
    validate_move(board, current, from, to)?;
    let mut unit = board.remove_unit(from)?.ok_or(RuleError::InvalidTarget)?;
    unit.has_acted = true;
    board.place_unit(to, unit)?;
    Ok(())
}
