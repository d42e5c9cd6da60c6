//! Legal moves, attacks and merges for deployed units.

use crate::board::{Board, Coord, Player, PlayerId, Unit};
use crate::game::Action;
use crate::resolve::combat::validate_attack;
use crate::resolve::merge::validate_merge;
use crate::resolve::movement::validate_move;
use crate::resolve::Target;
use crate::rules::Rules;

/// Every in-bounds coordinate within Manhattan distance `range` of `c`,
/// excluding `c` itself.
pub(crate) fn diamond(board: &Board, c: Coord, range: u32) -> impl Iterator<Item = Coord> + '_ {
    let r = range.min(u32::from(u16::MAX)) as i32;
    let (cx, cy) = (i32::from(c.x), i32::from(c.y));
    (-r..=r).flat_map(move |dy| {
        let span = r - dy.abs();
        (-span..=span).filter_map(move |dx| {
            let (x, y) = (cx + dx, cy + dy);
            if (dx, dy) == (0, 0) || x < 0 || y < 0 {
                return None;
            }
            let t = Coord::new(u16::try_from(x).ok()?, u16::try_from(y).ok()?);
            board.in_bounds(t).then_some(t)
        })
    })
}

/// Moves the unit at `from` could legally make.
pub fn legal_moves(board: &Board, current: PlayerId, from: Coord, unit: &Unit) -> Vec<Action> {
    if unit.has_acted || unit.owner != current {
        return Vec::new();
    }
    diamond(board, from, unit.movement_range())
        .filter(|&to| validate_move(board, current, from, to).is_ok())
        .map(|to| Action::Move { from, to })
        .collect()
}

/// Attacks the unit at `from` could legally make.
pub fn legal_attacks(board: &Board, current: PlayerId, from: Coord, unit: &Unit) -> Vec<Action> {
    if unit.has_acted || unit.owner != current {
        return Vec::new();
    }
    let mut out = Vec::new();
    for at in diamond(board, from, unit.attack_range()) {
        for target in [Target::Unit(at), Target::Structure(at)] {
            if validate_attack(board, current, from, target).is_ok() {
                out.push(Action::Attack { from, target });
            }
        }
    }
    out
}

/// Merges with the unit at `a` as the surviving position.
pub fn legal_merges(board: &Board, players: &[Player], rules: &Rules, current: PlayerId, a: Coord) -> Vec<Action> {
    board
        .neighborhood8(a)
        .map(|(b, _)| b)
        .filter(|&b| validate_merge(board, players, rules, current, a, b).is_ok())
        .map(|b| Action::Merge { a, b })
        .collect()
}
