//! Board representation and entity types.
//!
//! Contains the grid, terrain, units, structures, their capability traits
//! and the per-player records.

pub mod coord;
pub mod grid;
pub mod player;
pub mod structure;
pub mod tile;
pub mod traits;
pub mod unit;

pub use coord::Coord;
pub use grid::{Board, MAX_TILES};
pub use player::{Player, PlayerId};
pub use structure::{Structure, StructureKind, ALL_STRUCTURE_KINDS};
pub use tile::{Terrain, Tile};
pub use traits::{Damageable, Producer, Production, Upgradeable};
pub use unit::{Unit, UnitId, UnitKind, ALL_UNIT_KINDS};
