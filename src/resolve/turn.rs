//! Turn rotation and the win check.

use crate::board::{Board, Player, PlayerId};

/// How a finished match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Winner(PlayerId),
    /// Nobody has a town hall left.
    NoWinner,
}

impl Outcome {
    pub const fn winner(self) -> Option<PlayerId> {
        match self {
            Outcome::Winner(p) => Some(p),
            Outcome::NoWinner => None,
        }
    }
}

/// The next player in seating order who is still in the game, and whether
/// the rotation wrapped past the last seat.
pub fn next_seat(players: &[Player], current: PlayerId) -> (PlayerId, bool) {
    let n = players.len();
    for step in 1..=n {
        let raw = current.index() + step;
        let idx = raw % n;
        if !players[idx].eliminated {
            return (PlayerId(idx as u8), raw >= n);
        }
    }
    (current, true)
}

/// Eliminates every player without a town hall and decides whether the
/// match is over.
pub fn check_winner(board: &Board, players: &mut [Player]) -> Option<Outcome> {
    for p in players.iter_mut() {
        if !p.eliminated && !board.has_town_hall(p.id) {
            p.eliminated = true;
        }
    }
    let mut alive = players.iter().filter(|p| !p.eliminated).map(|p| p.id);
    match (alive.next(), alive.next()) {
        (None, _) => Some(Outcome::NoWinner),
        (Some(only), None) if players.len() >= 2 => Some(Outcome::Winner(only)),
        _ => None,
    }
}

/// Clears the acted flag on every deployed unit.
pub fn reset_acted(board: &mut Board) {
    for unit in board.units_mut() {
        unit.has_acted = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Coord, Structure, StructureKind};
    use crate::rules::Rules;

    fn players(n: u8) -> Vec<Player> {
        (0..n).map(|i| Player::new(PlayerId(i), format!("p{i}"), 0, 0, 5)).collect()
    }

    fn hall(board: &mut Board, owner: u8, x: u16) {
        let s = Structure::new(StructureKind::TownHall, PlayerId(owner), Rules::default().town_hall);
        board.place_structure(Coord::new(x, 0), s).unwrap();
    }

    #[test]
    fn rotation_wraps_and_skips_eliminated() {
        let mut ps = players(3);
        assert_eq!(next_seat(&ps, PlayerId(0)), (PlayerId(1), false));
        assert_eq!(next_seat(&ps, PlayerId(2)), (PlayerId(0), true));
        ps[1].eliminated = true;
        assert_eq!(next_seat(&ps, PlayerId(0)), (PlayerId(2), false));
        ps[0].eliminated = true;
        assert_eq!(next_seat(&ps, PlayerId(2)), (PlayerId(2), true));
    }

    #[test]
    fn last_standing_player_wins() {
        let mut board = Board::new(4, 1).unwrap();
        hall(&mut board, 0, 0);
        hall(&mut board, 1, 3);
        let mut ps = players(3);
        // Player 2 never had a hall; two players remain.
        assert_eq!(check_winner(&board, &mut ps), None);
        assert!(ps[2].eliminated);

        board.remove_structure(Coord::new(3, 0)).unwrap();
        assert_eq!(check_winner(&board, &mut ps), Some(Outcome::Winner(PlayerId(0))));
        assert!(ps[1].eliminated);
    }

    #[test]
    fn nobody_left_is_no_winner() {
        let board = Board::new(2, 1).unwrap();
        let mut ps = players(2);
        assert_eq!(check_winner(&board, &mut ps), Some(Outcome::NoWinner));
    }

    #[test]
    fn solo_match_continues_while_hall_stands() {
        let mut board = Board::new(2, 1).unwrap();
        hall(&mut board, 0, 0);
        let mut ps = players(1);
        assert_eq!(check_winner(&board, &mut ps), None);
        board.remove_structure(Coord::new(0, 0)).unwrap();
        assert_eq!(check_winner(&board, &mut ps), Some(Outcome::NoWinner));
    }
}
