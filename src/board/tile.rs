//! Terrain and tiles.

use serde::{Deserialize, Serialize};

use super::structure::Structure;
use super::unit::Unit;

/// Terrain of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Terrain {
    Empty,
    /// Gives attackers standing here a damage bonus. Cleared by building.
    Forest,
    /// Never holds units or structures.
    Void,
}

impl Terrain {
    /// Layout character: `.` empty, `f` forest, `#` void.
    pub const fn layout_char(self) -> char {
        match self {
            Terrain::Empty => '.',
            Terrain::Forest => 'f',
            Terrain::Void => '#',
        }
    }

    pub fn from_layout_char(c: char) -> Option<Terrain> {
        match c {
            '.' => Some(Terrain::Empty),
            'f' => Some(Terrain::Forest),
            '#' => Some(Terrain::Void),
            _ => None,
        }
    }

    pub const fn is_void(self) -> bool {
        matches!(self, Terrain::Void)
    }
}

/// A single cell. A unit and a structure may share a tile, but never two
/// of either.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub terrain: Terrain,
    pub unit: Option<Unit>,
    pub structure: Option<Structure>,
}

impl Tile {
    pub const fn new(terrain: Terrain) -> Self {
        Tile {
            terrain,
            unit: None,
            structure: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.unit.is_none() && self.structure.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_char_roundtrip() {
        for t in [Terrain::Empty, Terrain::Forest, Terrain::Void] {
            assert_eq!(Terrain::from_layout_char(t.layout_char()), Some(t));
        }
        assert_eq!(Terrain::from_layout_char('x'), None);
    }

    #[test]
    fn new_tile_is_empty() {
        let tile = Tile::new(Terrain::Forest);
        assert!(tile.is_empty());
        assert_eq!(tile.terrain, Terrain::Forest);
    }
}
