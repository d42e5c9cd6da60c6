//! Damage application and destruction bookkeeping shared by combat and
//! the economy.

use crate::board::{
    Board, Coord, Damageable, Player, PlayerId, StructureKind, UnitKind,
};

/// Which slot of a tile an action aims at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Unit(Coord),
    Structure(Coord),
}

impl Target {
    pub const fn coord(self) -> Coord {
        match self {
            Target::Unit(c) | Target::Structure(c) => c,
        }
    }
}

/// The variant of a damaged entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Unit(UnitKind),
    Structure(StructureKind),
}

/// The outcome of damage dealt to one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub target: Target,
    pub owner: PlayerId,
    pub kind: EntityKind,
    pub damage: u32,
    pub remaining: u32,
    pub destroyed: bool,
}

impl Hit {
    pub fn destroyed_town_hall(&self) -> bool {
        self.destroyed && self.kind == EntityKind::Structure(StructureKind::TownHall)
    }
}

/// Damages the unit at `at`, removing it if destroyed. Returns `None` if
/// the slot is empty.
pub(crate) fn damage_unit(board: &mut Board, at: Coord, amount: u32) -> Option<Hit> {
    let unit = board.unit_mut(at)?;
    let destroyed = unit.take_damage(amount);
    let hit = Hit {
        target: Target::Unit(at),
        owner: unit.owner,
        kind: EntityKind::Unit(unit.kind),
        damage: amount,
        remaining: unit.health,
        destroyed,
    };
    if destroyed {
        let _ = board.remove_unit(at);
    }
    Some(hit)
}

/// Damages the structure at `at`, removing it if destroyed. A destroyed
/// barrack takes its unit-space grant with it.
pub(crate) fn damage_structure(
    board: &mut Board,
    players: &mut [Player],
    at: Coord,
    amount: u32,
) -> Option<Hit> {
    let structure = board.structure_mut(at)?;
    let destroyed = structure.take_damage(amount);
    let hit = Hit {
        target: Target::Structure(at),
        owner: structure.owner,
        kind: EntityKind::Structure(structure.kind),
        damage: amount,
        remaining: structure.durability,
        destroyed,
    };
    if destroyed {
        if let Ok(Some(gone)) = board.remove_structure(at) {
            let grant = gone.unit_space_grant();
            if grant > 0 {
                if let Some(owner) = players.get_mut(gone.owner.index()) {
                    release_unit_space(owner, board, grant);
                }
            }
        }
    }
    Some(hit)
}

/// Shrinks a player's unit-space cap by `grant`, never below the space
/// their current units already occupy.
pub(crate) fn release_unit_space(player: &mut Player, board: &Board, grant: u32) {
    let used = board.deployed_space(player.id) + player.reserve_space();
    player.max_unit_space = player.max_unit_space.saturating_sub(grant).max(used);
}

/// Total unit space a player occupies, deployed and in reserve.
pub(crate) fn used_unit_space(player: &Player, board: &Board) -> u32 {
    board.deployed_space(player.id) + player.reserve_space()
}
