//! The board grid.
//!
//! Pure storage: slot mutation and neighborhood queries. Rules are enforced
//! by the resolvers, never here.

use crate::error::RuleError;

use super::coord::Coord;
use super::player::PlayerId;
use super::structure::{Structure, StructureKind};
use super::tile::{Terrain, Tile};
use super::unit::{Unit, UnitId};

/// Largest number of tiles a board may hold.
pub const MAX_TILES: usize = 256 * 256;

/// A fixed-size grid of tiles stored in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: u16,
    height: u16,
    tiles: Vec<Tile>,
}

impl Board {
    /// Creates a board of empty terrain. Returns `None` if either
    /// dimension is zero or the area exceeds [`MAX_TILES`].
    pub fn new(width: u16, height: u16) -> Option<Self> {
        if !Board::fits(width, height) {
            return None;
        }
        Board::from_terrain(width, height, vec![Terrain::Empty; usize::from(width) * usize::from(height)])
    }

    /// Creates a board from row-major terrain. Returns `None` if a
    /// dimension is zero, the area exceeds [`MAX_TILES`] or the terrain
    /// count does not match.
    pub fn from_terrain(width: u16, height: u16, terrain: Vec<Terrain>) -> Option<Self> {
        if !Board::fits(width, height) || terrain.len() != usize::from(width) * usize::from(height) {
            return None;
        }
        Some(Board {
            width,
            height,
            tiles: terrain.into_iter().map(Tile::new).collect(),
        })
    }

    /// True for non-zero dimensions within [`MAX_TILES`].
    pub const fn fits(width: u16, height: u16) -> bool {
        width != 0 && height != 0 && (width as usize) * (height as usize) <= MAX_TILES
    }

    pub const fn width(&self) -> u16 {
        self.width
    }

    pub const fn height(&self) -> u16 {
        self.height
    }

    pub const fn in_bounds(&self, c: Coord) -> bool {
        c.x < self.width && c.y < self.height
    }

    fn index(&self, c: Coord) -> Option<usize> {
        if self.in_bounds(c) {
            Some(usize::from(c.y) * usize::from(self.width) + usize::from(c.x))
        } else {
            None
        }
    }

    fn coord_of(&self, idx: usize) -> Coord {
        let w = usize::from(self.width);
        Coord::new((idx % w) as u16, (idx / w) as u16)
    }

    /// The tile at `c`, or `OutOfBounds`.
    pub fn tile(&self, c: Coord) -> Result<&Tile, RuleError> {
        self.index(c).map(|i| &self.tiles[i]).ok_or(RuleError::OutOfBounds)
    }

    /// The tile at `(x, y)`, or `OutOfBounds`.
    pub fn tile_at(&self, x: u16, y: u16) -> Result<&Tile, RuleError> {
        self.tile(Coord::new(x, y))
    }

    pub fn tile_mut(&mut self, c: Coord) -> Result<&mut Tile, RuleError> {
        match self.index(c) {
            Some(i) => Ok(&mut self.tiles[i]),
            None => Err(RuleError::OutOfBounds),
        }
    }

    /// The tile at `c`, or `None` when out of bounds.
    pub fn get(&self, c: Coord) -> Option<&Tile> {
        self.index(c).map(|i| &self.tiles[i])
    }

    pub fn terrain(&self, c: Coord) -> Option<Terrain> {
        self.get(c).map(|t| t.terrain)
    }

    pub fn set_terrain(&mut self, c: Coord, terrain: Terrain) -> Result<(), RuleError> {
        self.tile_mut(c)?.terrain = terrain;
        Ok(())
    }

    pub fn unit(&self, c: Coord) -> Option<&Unit> {
        self.get(c).and_then(|t| t.unit.as_ref())
    }

    pub fn unit_mut(&mut self, c: Coord) -> Option<&mut Unit> {
        self.tile_mut(c).ok().and_then(|t| t.unit.as_mut())
    }

    pub fn structure(&self, c: Coord) -> Option<&Structure> {
        self.get(c).and_then(|t| t.structure.as_ref())
    }

    pub fn structure_mut(&mut self, c: Coord) -> Option<&mut Structure> {
        self.tile_mut(c).ok().and_then(|t| t.structure.as_mut())
    }

    /// Puts a unit into the tile's unit slot, returning whatever was there.
    pub fn place_unit(&mut self, c: Coord, unit: Unit) -> Result<Option<Unit>, RuleError> {
        Ok(self.tile_mut(c)?.unit.replace(unit))
    }

    pub fn remove_unit(&mut self, c: Coord) -> Result<Option<Unit>, RuleError> {
        Ok(self.tile_mut(c)?.unit.take())
    }

    /// Puts a structure into the tile's structure slot, returning whatever
    /// was there.
    pub fn place_structure(&mut self, c: Coord, structure: Structure) -> Result<Option<Structure>, RuleError> {
        Ok(self.tile_mut(c)?.structure.replace(structure))
    }

    pub fn remove_structure(&mut self, c: Coord) -> Result<Option<Structure>, RuleError> {
        Ok(self.tile_mut(c)?.structure.take())
    }

    /// Iterates over all coordinates and tiles in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, &Tile)> {
        self.tiles.iter().enumerate().map(move |(i, t)| (self.coord_of(i), t))
    }

    /// Every deployed unit with its position.
    pub fn units(&self) -> impl Iterator<Item = (Coord, &Unit)> {
        self.iter().filter_map(|(c, t)| t.unit.as_ref().map(|u| (c, u)))
    }

    /// Mutable access to every deployed unit.
    pub fn units_mut(&mut self) -> impl Iterator<Item = &mut Unit> {
        self.tiles.iter_mut().filter_map(|t| t.unit.as_mut())
    }

    /// Every structure with its position.
    pub fn structures(&self) -> impl Iterator<Item = (Coord, &Structure)> {
        self.iter().filter_map(|(c, t)| t.structure.as_ref().map(|s| (c, s)))
    }

    pub fn units_owned_by(&self, player: PlayerId) -> impl Iterator<Item = (Coord, &Unit)> {
        self.units().filter(move |(_, u)| u.owner == player)
    }

    pub fn structures_owned_by(&self, player: PlayerId) -> impl Iterator<Item = (Coord, &Structure)> {
        self.structures().filter(move |(_, s)| s.owner == player)
    }

    /// Finds a deployed unit by id.
    pub fn find_unit(&self, id: UnitId) -> Option<(Coord, &Unit)> {
        self.units().find(|(_, u)| u.id == id)
    }

    /// In-bounds cardinal neighbors of `c`.
    pub fn neighborhood4(&self, c: Coord) -> impl Iterator<Item = (Coord, &Tile)> {
        let (adj, n) = c.cardinal(self.width, self.height);
        adj.into_iter()
            .take(n)
            .filter_map(move |a| self.get(a).map(|t| (a, t)))
    }

    /// In-bounds Moore neighbors of `c`.
    pub fn neighborhood8(&self, c: Coord) -> impl Iterator<Item = (Coord, &Tile)> {
        let (adj, n) = c.moore(self.width, self.height);
        adj.into_iter()
            .take(n)
            .filter_map(move |a| self.get(a).map(|t| (a, t)))
    }

    /// Whether any tile in the 8-neighborhood of `c` holds a structure owned
    /// by `player`, optionally restricted to one kind.
    pub fn is_adjacent_to_friendly_structure(
        &self,
        c: Coord,
        player: PlayerId,
        kind: Option<StructureKind>,
    ) -> bool {
        self.neighborhood8(c).any(|(_, t)| {
            t.structure
                .as_ref()
                .is_some_and(|s| s.owner == player && kind.map_or(true, |k| s.kind == k))
        })
    }

    /// Whether a tower owned by `player` stands on a cardinal neighbor of `c`.
    pub fn is_adjacent_to_friendly_tower(&self, c: Coord, player: PlayerId) -> bool {
        self.neighborhood4(c).any(|(_, t)| {
            t.structure
                .as_ref()
                .is_some_and(|s| s.owner == player && s.kind == StructureKind::Tower)
        })
    }

    /// Whether `player` still has a town hall standing.
    pub fn has_town_hall(&self, player: PlayerId) -> bool {
        self.structures_owned_by(player)
            .any(|(_, s)| s.kind == StructureKind::TownHall)
    }

    /// Unit space used by `player`'s deployed units.
    pub fn deployed_space(&self, player: PlayerId) -> u32 {
        self.units_owned_by(player).map(|(_, u)| u.unit_space()).sum()
    }
}
