//! Match snapshots.
//!
//! A `Snapshot` is a plain, serde-friendly description of a match: terrain,
//! every unit and structure with its owner's name, and the player records.
//! It is what a persistence store saves; restoring rebuilds a `GameMatch`
//! and re-seats every entity through the board's slot API, rejecting
//! anything a live match could never contain.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::board::{
    Board, Coord, Damageable, Player, PlayerId, Structure, StructureKind, Terrain, Unit, UnitId,
    UnitKind, Upgradeable,
};
use crate::game::{GameMatch, GameState};
use crate::rules::Rules;

/// Errors that can occur while decoding or restoring a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("invalid snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("board dimensions must be at least 1x1")]
    InvalidSize,

    #[error("({x}, {y}) is outside the board")]
    OutOfBounds { x: u16, y: u16 },

    #[error("snapshot has no players")]
    NoPlayers,

    #[error("duplicate player name '{0}'")]
    DuplicatePlayer(String),

    #[error("unknown player '{0}'")]
    UnknownPlayer(String),

    #[error("duplicate unit id {0}")]
    DuplicateUnitId(u32),

    #[error("({x}, {y}) already holds a {slot}")]
    Occupied { x: u16, y: u16, slot: &'static str },

    #[error("({x}, {y}) is void")]
    OnVoid { x: u16, y: u16 },

    #[error("{kind} at ({x}, {y}) has {value} hit points, allowed 1..={max}")]
    InvalidHitPoints { kind: &'static str, x: u16, y: u16, value: u32, max: u32 },

    #[error("{kind} at ({x}, {y}) has level {level}, allowed 1..={max}")]
    InvalidLevel { kind: &'static str, x: u16, y: u16, level: u8, max: u8 },

    #[error("current player index {0} is out of range")]
    InvalidCurrent(usize),
}

impl SnapshotError {
    pub const fn code(&self) -> &'static str {
        match self {
            SnapshotError::Json(_) => "invalid_json",
            SnapshotError::InvalidSize => "invalid_size",
            SnapshotError::OutOfBounds { .. } => "out_of_bounds",
            SnapshotError::NoPlayers => "no_players",
            SnapshotError::DuplicatePlayer(_) => "duplicate_player",
            SnapshotError::UnknownPlayer(_) => "unknown_player",
            SnapshotError::DuplicateUnitId(_) => "duplicate_unit_id",
            SnapshotError::Occupied { .. } => "occupied",
            SnapshotError::OnVoid { .. } => "on_void",
            SnapshotError::InvalidHitPoints { .. } => "invalid_hit_points",
            SnapshotError::InvalidLevel { .. } => "invalid_level",
            SnapshotError::InvalidCurrent(_) => "invalid_current",
        }
    }
}

/// Terrain of one tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileRecord {
    pub x: u16,
    pub y: u16,
    pub terrain: Terrain,
}

/// A deployed unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitRecord {
    pub id: u32,
    pub kind: UnitKind,
    pub owner: String,
    pub x: u16,
    pub y: u16,
    pub health: u32,
    pub acted: bool,
}

/// A structure on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureRecord {
    pub kind: StructureKind,
    pub owner: String,
    pub x: u16,
    pub y: u16,
    pub durability: u32,
    pub level: u8,
}

/// An undeployed unit in a player's reserve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveRecord {
    pub id: u32,
    pub kind: UnitKind,
    pub health: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub name: String,
    pub gold: u32,
    pub food: u32,
    pub max_unit_space: u32,
    pub wins: u32,
    pub eliminated: bool,
    pub reserve: Vec<ReserveRecord>,
}

/// Everything needed to rebuild a match, given the rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub width: u16,
    pub height: u16,
    pub tiles: Vec<TileRecord>,
    pub units: Vec<UnitRecord>,
    pub structures: Vec<StructureRecord>,
    pub players: Vec<PlayerRecord>,
    /// Seat index of the player to move.
    pub current: usize,
    pub turn: u32,
    pub game_over: bool,
    pub winner: Option<String>,
}

impl Snapshot {
    /// Records the full state of `game`.
    pub fn capture(game: &GameMatch) -> Snapshot {
        let board = game.board();
        let name_of = |id: PlayerId| game.player(id).map(|p| p.name.clone()).unwrap_or_default();

        let tiles = board
            .iter()
            .map(|(c, t)| TileRecord {
                x: c.x,
                y: c.y,
                terrain: t.terrain,
            })
            .collect();
        let units = board
            .units()
            .map(|(c, u)| UnitRecord {
                id: u.id.0,
                kind: u.kind,
                owner: name_of(u.owner),
                x: c.x,
                y: c.y,
                health: u.health,
                acted: u.has_acted,
            })
            .collect();
        let structures = board
            .structures()
            .map(|(c, s)| StructureRecord {
                kind: s.kind,
                owner: name_of(s.owner),
                x: c.x,
                y: c.y,
                durability: s.durability,
                level: s.level,
            })
            .collect();
        let players = game
            .players()
            .iter()
            .map(|p| PlayerRecord {
                name: p.name.clone(),
                gold: p.gold,
                food: p.food,
                max_unit_space: p.max_unit_space,
                wins: p.wins,
                eliminated: p.eliminated,
                reserve: p
                    .reserve
                    .iter()
                    .map(|u| ReserveRecord {
                        id: u.id.0,
                        kind: u.kind,
                        health: u.health,
                    })
                    .collect(),
            })
            .collect();
        let (game_over, winner) = match game.state() {
            GameState::Running => (false, None),
            GameState::GameOver { winner } => (true, winner.map(name_of)),
        };

        Snapshot {
            width: board.width(),
            height: board.height(),
            tiles,
            units,
            structures,
            players,
            current: game.current_player().index(),
            turn: game.turn(),
            game_over,
            winner,
        }
    }

    /// Rebuilds a match. Unit and structure stats come from `rules`.
    pub fn restore(&self, rules: Rules) -> Result<GameMatch, SnapshotError> {
        self.rebuild(rules).map_err(|e| {
            error!(error = %e, "snapshot restore failed");
            e
        })
    }

    fn rebuild(&self, rules: Rules) -> Result<GameMatch, SnapshotError> {
        let mut board = Board::new(self.width, self.height).ok_or(SnapshotError::InvalidSize)?;
        for t in &self.tiles {
            board
                .set_terrain(Coord::new(t.x, t.y), t.terrain)
                .map_err(|_| SnapshotError::OutOfBounds { x: t.x, y: t.y })?;
        }

        if self.players.is_empty() {
            return Err(SnapshotError::NoPlayers);
        }
        if self.players.len() > usize::from(u8::MAX) {
            return Err(SnapshotError::InvalidCurrent(self.players.len()));
        }
        let mut seats: HashMap<&str, PlayerId> = HashMap::new();
        for (i, p) in self.players.iter().enumerate() {
            if seats.insert(p.name.as_str(), PlayerId(i as u8)).is_some() {
                return Err(SnapshotError::DuplicatePlayer(p.name.clone()));
            }
        }
        let seat = |name: &str| {
            seats
                .get(name)
                .copied()
                .ok_or_else(|| SnapshotError::UnknownPlayer(name.to_string()))
        };

        let mut ids = HashSet::new();
        let mut players = Vec::with_capacity(self.players.len());
        for (i, rec) in self.players.iter().enumerate() {
            let id = PlayerId(i as u8);
            let mut p = Player::new(id, rec.name.clone(), rec.gold, rec.food, rec.max_unit_space);
            p.wins = rec.wins;
            p.eliminated = rec.eliminated;
            for r in &rec.reserve {
                if !ids.insert(r.id) {
                    return Err(SnapshotError::DuplicateUnitId(r.id));
                }
                let mut unit = Unit::new(UnitId(r.id), r.kind, id, *rules.unit(r.kind));
                check_hit_points(r.kind.name(), 0, 0, r.health, unit.max_hit_points())?;
                unit.health = r.health;
                p.reserve.push(unit);
            }
            players.push(p);
        }

        for r in &self.structures {
            let at = placeable(&board, r.x, r.y)?;
            if board.structure(at).is_some() {
                return Err(SnapshotError::Occupied { x: r.x, y: r.y, slot: "structure" });
            }
            let mut s = Structure::new(r.kind, seat(&r.owner)?, *rules.structure(r.kind));
            if r.level == 0 || r.level > s.max_level() {
                return Err(SnapshotError::InvalidLevel {
                    kind: r.kind.name(),
                    x: r.x,
                    y: r.y,
                    level: r.level,
                    max: s.max_level(),
                });
            }
            s.level = r.level;
            check_hit_points(r.kind.name(), r.x, r.y, r.durability, s.max_hit_points())?;
            s.durability = r.durability;
            board
                .place_structure(at, s)
                .map_err(|_| SnapshotError::OutOfBounds { x: r.x, y: r.y })?;
        }

        for r in &self.units {
            let at = placeable(&board, r.x, r.y)?;
            if board.unit(at).is_some() {
                return Err(SnapshotError::Occupied { x: r.x, y: r.y, slot: "unit" });
            }
            if !ids.insert(r.id) {
                return Err(SnapshotError::DuplicateUnitId(r.id));
            }
            let mut unit = Unit::new(UnitId(r.id), r.kind, seat(&r.owner)?, *rules.unit(r.kind));
            check_hit_points(r.kind.name(), r.x, r.y, r.health, unit.max_hit_points())?;
            unit.health = r.health;
            unit.has_acted = r.acted;
            board
                .place_unit(at, unit)
                .map_err(|_| SnapshotError::OutOfBounds { x: r.x, y: r.y })?;
        }

        if self.current >= players.len() {
            return Err(SnapshotError::InvalidCurrent(self.current));
        }
        let state = if self.game_over {
            let winner = self.winner.as_deref().map(seat).transpose()?;
            GameState::GameOver { winner }
        } else {
            GameState::Running
        };

        Ok(GameMatch::from_parts(
            rules,
            board,
            players,
            PlayerId(self.current as u8),
            state,
            self.turn,
        ))
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(s: &str) -> Result<Snapshot, SnapshotError> {
        Ok(serde_json::from_str(s)?)
    }
}

/// An in-bounds, non-void coordinate.
fn placeable(board: &Board, x: u16, y: u16) -> Result<Coord, SnapshotError> {
    let at = Coord::new(x, y);
    match board.terrain(at) {
        None => Err(SnapshotError::OutOfBounds { x, y }),
        Some(Terrain::Void) => Err(SnapshotError::OnVoid { x, y }),
        Some(_) => Ok(at),
    }
}

fn check_hit_points(kind: &'static str, x: u16, y: u16, value: u32, max: u32) -> Result<(), SnapshotError> {
    if value == 0 || value > max {
        return Err(SnapshotError::InvalidHitPoints { kind, x, y, value, max });
    }
    Ok(())
}
