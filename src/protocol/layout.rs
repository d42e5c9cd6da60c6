//! ASCII board layouts.
//!
//! A layout is one line per row, one character per tile:
//!
//! ```text
//! ..f.
//! .##.
//! ....
//! ```
//!
//! `.` is empty ground, `f` forest and `#` void. Blank lines and
//! surrounding whitespace are ignored. Layouts carry terrain only; units
//! and structures are seated afterwards.

use crate::board::{Board, Coord, Terrain, MAX_TILES};

/// Errors that can occur while parsing a layout.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("layout has no rows")]
    Empty,

    #[error("row {row} has {found} tiles, expected {expected}")]
    RaggedRow { row: usize, expected: usize, found: usize },

    #[error("invalid terrain character '{ch}' at row {row}, column {col}")]
    InvalidChar { row: usize, col: usize, ch: char },

    #[error("layout exceeds {max} tiles")]
    TooLarge { max: usize },
}

impl LayoutError {
    pub const fn code(&self) -> &'static str {
        match self {
            LayoutError::Empty => "empty_layout",
            LayoutError::RaggedRow { .. } => "ragged_row",
            LayoutError::InvalidChar { .. } => "invalid_terrain",
            LayoutError::TooLarge { .. } => "layout_too_large",
        }
    }
}

/// Parses a layout into a board with no entities.
pub fn parse_layout(s: &str) -> Result<Board, LayoutError> {
    let rows: Vec<&str> = s.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    let first = rows.first().ok_or(LayoutError::Empty)?;
    let width = first.chars().count();
    if width.saturating_mul(rows.len()) > MAX_TILES {
        return Err(LayoutError::TooLarge { max: MAX_TILES });
    }

    let mut terrain = Vec::with_capacity(width * rows.len());
    for (row, line) in rows.iter().enumerate() {
        let found = line.chars().count();
        if found != width {
            return Err(LayoutError::RaggedRow { row, expected: width, found });
        }
        for (col, ch) in line.chars().enumerate() {
            let t = Terrain::from_layout_char(ch).ok_or(LayoutError::InvalidChar { row, col, ch })?;
            terrain.push(t);
        }
    }

    Board::from_terrain(width as u16, rows.len() as u16, terrain).ok_or(LayoutError::Empty)
}

/// Encodes a board's terrain as a layout, one `\n`-terminated line per row.
pub fn encode_layout(board: &Board) -> String {
    let mut out = String::with_capacity((usize::from(board.width()) + 1) * usize::from(board.height()));
    for y in 0..board.height() {
        for x in 0..board.width() {
            let t = board.terrain(Coord::new(x, y)).unwrap_or(Terrain::Void);
            out.push(t.layout_char());
        }
        out.push('\n');
    }
    out
}

/// Renders terrain, structures and units for humans.
///
/// Each tile is a five-column cell: a bare tile shows its terrain
/// character, a structure shows its code and owner (`H0`), a unit its code
/// and owner (`k1`). A tile holding both shows the structure then the unit.
pub fn render_board(board: &Board) -> String {
    let mut out = String::new();
    for y in 0..board.height() {
        let cells: Vec<String> = (0..board.width())
            .map(|x| {
                let Some(tile) = board.get(Coord::new(x, y)) else {
                    return String::from("?");
                };
                let mut cell = String::new();
                if let Some(s) = &tile.structure {
                    cell.push(s.kind.code());
                    cell.push_str(&s.owner.0.to_string());
                }
                if let Some(u) = &tile.unit {
                    cell.push(u.kind.code());
                    cell.push_str(&u.owner.0.to_string());
                }
                if cell.is_empty() {
                    cell.push(tile.terrain.layout_char());
                }
                format!("{cell:<5}")
            })
            .collect();
        out.push_str(cells.join("").trim_end());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{PlayerId, Structure, StructureKind, Unit, UnitId, UnitKind};
    use crate::rules::Rules;

    #[test]
    fn parse_small_layout() {
        let board = parse_layout("..f\n#..\n").unwrap();
        assert_eq!(board.width(), 3);
        assert_eq!(board.height(), 2);
        assert_eq!(board.terrain(Coord::new(2, 0)), Some(Terrain::Forest));
        assert_eq!(board.terrain(Coord::new(0, 1)), Some(Terrain::Void));
        assert_eq!(board.terrain(Coord::new(1, 1)), Some(Terrain::Empty));
    }

    #[test]
    fn whitespace_and_blank_lines_are_ignored() {
        let board = parse_layout("\n  ..  \n\n  ff\n").unwrap();
        assert_eq!((board.width(), board.height()), (2, 2));
    }

    #[test]
    fn encode_matches_input() {
        let text = "..f.\n.##.\n....\n";
        assert_eq!(encode_layout(&parse_layout(text).unwrap()), text);
    }

    #[test]
    fn errors() {
        assert_eq!(parse_layout(""), Err(LayoutError::Empty));
        assert_eq!(parse_layout("  \n \n"), Err(LayoutError::Empty));
        assert_eq!(
            parse_layout("...\n..\n"),
            Err(LayoutError::RaggedRow { row: 1, expected: 3, found: 2 })
        );
        assert_eq!(
            parse_layout("..\n.x\n"),
            Err(LayoutError::InvalidChar { row: 1, col: 1, ch: 'x' })
        );
        let wide = format!("{}\n", ".".repeat(MAX_TILES + 1));
        assert_eq!(parse_layout(&wide), Err(LayoutError::TooLarge { max: MAX_TILES }));
    }

    #[test]
    fn render_shows_entities() {
        let rules = Rules::default();
        let mut board = parse_layout("f..\n...\n").unwrap();
        board
            .place_structure(Coord::new(1, 0), Structure::new(StructureKind::TownHall, PlayerId(0), rules.town_hall))
            .unwrap();
        board
            .place_unit(Coord::new(1, 0), Unit::new(UnitId(1), UnitKind::Knight, PlayerId(1), rules.knight))
            .unwrap();
        let text = render_board(&board);
        let first = text.lines().next().unwrap();
        assert_eq!(first, "f    H0k1 .");
    }
}
