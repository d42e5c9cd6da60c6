//! Match setup: seating players and generating boards.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::board::{Board, Coord, PlayerId, Structure, StructureKind, Terrain};
use crate::game::GameMatch;
use crate::protocol::layout::{parse_layout, LayoutError};
use crate::rules::Rules;

/// Errors raised while creating a match.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SetupError {
    #[error("a match needs at least one player")]
    NoPlayers,

    #[error("too many players: {0}")]
    TooManyPlayers(usize),

    #[error("duplicate player name '{0}'")]
    DuplicateName(String),

    #[error("board has room for {seats} town halls, {players} players requested")]
    NotEnoughSeats { players: usize, seats: usize },

    #[error("board dimensions must be at least 1x1")]
    InvalidSize,

    #[error(transparent)]
    Layout(#[from] LayoutError),
}

impl SetupError {
    /// Stable identifier for protocol responses.
    pub const fn code(&self) -> &'static str {
        match self {
            SetupError::NoPlayers => "no_players",
            SetupError::TooManyPlayers(_) => "too_many_players",
            SetupError::DuplicateName(_) => "duplicate_name",
            SetupError::NotEnoughSeats { .. } => "not_enough_seats",
            SetupError::InvalidSize => "invalid_size",
            SetupError::Layout(e) => e.code(),
        }
    }
}

/// Where the board of a standard match comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardSpec<'a> {
    /// A blank board of this size.
    Size { width: u16, height: u16 },
    /// An ASCII layout (see `protocol::layout`).
    Layout(&'a str),
}

/// Percent of open tiles turned into forest when scattering terrain.
pub const FOREST_PERCENT: u32 = 15;
/// Percent of open tiles turned into void when scattering terrain.
pub const VOID_PERCENT: u32 = 5;

/// Town hall positions in seating order: opposite corners first, then
/// the remaining corners, then edge midpoints. Duplicates on tiny boards
/// are dropped.
pub fn seat_positions(width: u16, height: u16) -> Vec<Coord> {
    let (r, b) = (width.saturating_sub(1), height.saturating_sub(1));
    let (mx, my) = (width / 2, height / 2);
    let candidates = [
        Coord::new(0, 0),
        Coord::new(r, b),
        Coord::new(r, 0),
        Coord::new(0, b),
        Coord::new(mx, 0),
        Coord::new(mx, b),
        Coord::new(0, my),
        Coord::new(r, my),
    ];
    let mut seats: Vec<Coord> = Vec::with_capacity(candidates.len());
    for c in candidates {
        if !seats.contains(&c) {
            seats.push(c);
        }
    }
    seats
}

/// Turns a share of the tiles into forest and void. Tiles within one step
/// of a seat are kept clear so every player can build and deploy.
pub fn scatter_terrain(board: &mut Board, seats: &[Coord], rng: &mut impl Rng) {
    let open: Vec<Coord> = board
        .iter()
        .map(|(c, _)| c)
        .filter(|c| seats.iter().all(|s| s.chebyshev(*c) > 1))
        .collect();
    for c in open {
        let roll = rng.gen_range(0..100);
        let terrain = if roll < VOID_PERCENT {
            Terrain::Void
        } else if roll < VOID_PERCENT + FOREST_PERCENT {
            Terrain::Forest
        } else {
            continue;
        };
        let _ = board.set_terrain(c, terrain);
    }
}

/// Creates a match with one town hall per player.
///
/// With a `seed`, a blank board of the requested size gets random forest
/// and void; layouts are always used as given. Void under a seat is
/// cleared to empty ground.
pub fn standard_match<S: AsRef<str>>(
    rules: Rules,
    spec: BoardSpec<'_>,
    names: &[S],
    seed: Option<u64>,
) -> Result<GameMatch, SetupError> {
    if names.is_empty() {
        return Err(SetupError::NoPlayers);
    }
    let mut board = match spec {
        BoardSpec::Size { width, height } => Board::new(width, height).ok_or(SetupError::InvalidSize)?,
        BoardSpec::Layout(text) => parse_layout(text)?,
    };

    let seats = seat_positions(board.width(), board.height());
    if names.len() > seats.len() {
        return Err(SetupError::NotEnoughSeats {
            players: names.len(),
            seats: seats.len(),
        });
    }
    let seats = &seats[..names.len()];

    if let (BoardSpec::Size { .. }, Some(seed)) = (spec, seed) {
        let mut rng = SmallRng::seed_from_u64(seed);
        scatter_terrain(&mut board, seats, &mut rng);
    }

    for (i, &at) in seats.iter().enumerate() {
        if board.terrain(at) == Some(Terrain::Void) {
            let _ = board.set_terrain(at, Terrain::Empty);
        }
        let hall = Structure::new(StructureKind::TownHall, PlayerId(i as u8), rules.town_hall);
        let _ = board.place_structure(at, hall);
    }

    GameMatch::new(rules, board, names.iter().map(|n| n.as_ref().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_players_sit_in_opposite_corners() {
        let game = standard_match(Rules::default(), BoardSpec::Size { width: 8, height: 6 }, &["a", "b"], None).unwrap();
        let halls: Vec<(Coord, PlayerId)> = game
            .board()
            .structures()
            .map(|(c, s)| (c, s.owner))
            .collect();
        assert_eq!(halls, vec![(Coord::new(0, 0), PlayerId(0)), (Coord::new(7, 5), PlayerId(1))]);
    }

    #[test]
    fn seats_are_unique_on_tiny_boards() {
        assert_eq!(seat_positions(1, 1), vec![Coord::new(0, 0)]);
        assert_eq!(seat_positions(2, 1).len(), 2);
        assert_eq!(seat_positions(9, 9).len(), 8);
    }

    #[test]
    fn too_many_players() {
        let err = standard_match(Rules::default(), BoardSpec::Size { width: 1, height: 2 }, &["a", "b", "c"], None)
            .unwrap_err();
        assert_eq!(err, SetupError::NotEnoughSeats { players: 3, seats: 2 });
        assert_eq!(
            standard_match(Rules::default(), BoardSpec::Size { width: 0, height: 2 }, &["a"], None).unwrap_err(),
            SetupError::InvalidSize
        );
        assert_eq!(
            standard_match(Rules::default(), BoardSpec::Size { width: u16::MAX, height: u16::MAX }, &["a"], None)
                .unwrap_err(),
            SetupError::InvalidSize
        );
    }

    #[test]
    fn void_under_seat_is_cleared() {
        let game = standard_match(Rules::default(), BoardSpec::Layout("#..\n...\n..#\n"), &["a", "b"], None).unwrap();
        assert_eq!(game.board().terrain(Coord::new(0, 0)), Some(Terrain::Empty));
        assert_eq!(game.board().terrain(Coord::new(2, 2)), Some(Terrain::Empty));
        assert!(game.board().has_town_hall(PlayerId(1)));
    }

    #[test]
    fn scatter_is_seeded_and_keeps_seats_clear() {
        let make = |seed| {
            standard_match(Rules::default(), BoardSpec::Size { width: 16, height: 16 }, &["a", "b", "c"], Some(seed))
                .unwrap()
        };
        let a = make(7);
        assert_eq!(a.board(), make(7).board());
        for seat in seat_positions(16, 16).into_iter().take(3) {
            for (_, tile) in a.board().neighborhood8(seat) {
                assert_eq!(tile.terrain, Terrain::Empty);
            }
        }
        assert!(a.board().iter().any(|(_, t)| t.terrain != Terrain::Empty));
    }

    #[test]
    fn layout_errors_propagate() {
        let err = standard_match(Rules::default(), BoardSpec::Layout("..\n.q\n"), &["a"], None).unwrap_err();
        assert!(matches!(err, SetupError::Layout(LayoutError::InvalidChar { .. })));
    }
}
