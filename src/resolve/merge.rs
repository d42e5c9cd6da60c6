//! Merging two same-tier units into one of the next tier.

use crate::board::{Board, Coord, Player, PlayerId, Unit, UnitId, UnitKind};
use crate::error::RuleError;
use crate::rules::Rules;

use super::damage::used_unit_space;

/// Checks whether the units at `a` and `b` may merge, returning the
/// resulting kind.
pub fn validate_merge(
    board: &Board,
    players: &[Player],
    rules: &Rules,
    current: PlayerId,
    a: Coord,
    b: Coord,
) -> Result<UnitKind, RuleError> {
    let ua = board.tile(a)?.unit.as_ref().ok_or(RuleError::IneligibleMerge)?;
    let ub = board.tile(b)?.unit.as_ref().ok_or(RuleError::IneligibleMerge)?;
    if ua.owner != current {
        return Err(RuleError::NotYourTurn);
    }
    if ub.owner != ua.owner || ua.kind != ub.kind || a == b || a.chebyshev(b) > 1 {
        return Err(RuleError::IneligibleMerge);
    }
    let next = ua.kind.next_tier().ok_or(RuleError::IneligibleMerge)?;

    let player = players.get(current.index()).ok_or(RuleError::InvalidTarget)?;
    let used = used_unit_space(player, board) - ua.unit_space() - ub.unit_space();
    if used + rules.unit(next).unit_space > player.max_unit_space {
        return Err(RuleError::InsufficientUnitSpace);
    }
    Ok(next)
}

/// Replaces the units at `a` and `b` with one unit of the next tier at
/// `a`, carrying the id `new_id`.
pub fn merge_units(
    board: &mut Board,
    players: &[Player],
    rules: &Rules,
    current: PlayerId,
    a: Coord,
    b: Coord,
    new_id: UnitId,
) -> Result<Unit, RuleError> {
    let kind = validate_merge(board, players, rules, current, a, b)?;
    let ua = board.remove_unit(a)?.ok_or(RuleError::IneligibleMerge)?;
    let ub = board.remove_unit(b)?.ok_or(RuleError::IneligibleMerge)?;

    let mut merged = Unit::new(new_id, kind, ua.owner, *rules.unit(kind));
    merged.has_acted = ua.has_acted || ub.has_acted;
    board.place_unit(a, merged.clone())?;
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Board, Vec<Player>, Rules) {
        let rules = Rules::default();
        let board = Board::new(5, 5).unwrap();
        let players = vec![
            Player::new(PlayerId(0), "a", 0, 0, rules.base_unit_space),
            Player::new(PlayerId(1), "b", 0, 0, rules.base_unit_space),
        ];
        (board, players, rules)
    }

    fn put(board: &mut Board, rules: &Rules, id: u32, kind: UnitKind, owner: u8, at: Coord) {
        let unit = Unit::new(UnitId(id), kind, PlayerId(owner), *rules.unit(kind));
        board.place_unit(at, unit).unwrap();
    }

    #[test]
    fn two_peasants_become_a_spearman() {
        let (mut board, players, rules) = setup();
        let a = Coord::new(1, 1);
        let b = Coord::new(2, 2);
        put(&mut board, &rules, 1, UnitKind::Peasant, 0, a);
        put(&mut board, &rules, 2, UnitKind::Peasant, 0, b);

        let merged = merge_units(&mut board, &players, &rules, PlayerId(0), a, b, UnitId(9)).unwrap();
        assert_eq!(merged.kind, UnitKind::Spearman);
        assert_eq!(merged.health, 20);
        assert!(!merged.has_acted);
        assert_eq!(board.unit(a).map(|u| u.id), Some(UnitId(9)));
        assert!(board.unit(b).is_none());
        assert_eq!(board.units_owned_by(PlayerId(0)).count(), 1);
    }

    #[test]
    fn acted_flag_is_inherited() {
        let (mut board, players, rules) = setup();
        let a = Coord::new(1, 1);
        let b = Coord::new(1, 2);
        put(&mut board, &rules, 1, UnitKind::Peasant, 0, a);
        put(&mut board, &rules, 2, UnitKind::Peasant, 0, b);
        board.unit_mut(b).unwrap().has_acted = true;

        let merged = merge_units(&mut board, &players, &rules, PlayerId(0), a, b, UnitId(3)).unwrap();
        assert!(merged.has_acted);
    }

    #[test]
    fn ineligible_pairs_are_rejected() {
        let (mut board, players, rules) = setup();
        put(&mut board, &rules, 1, UnitKind::Peasant, 0, Coord::new(0, 0));
        put(&mut board, &rules, 2, UnitKind::Spearman, 0, Coord::new(1, 0));
        put(&mut board, &rules, 3, UnitKind::Peasant, 1, Coord::new(0, 1));
        put(&mut board, &rules, 4, UnitKind::Peasant, 0, Coord::new(3, 3));
        put(&mut board, &rules, 5, UnitKind::Knight, 0, Coord::new(4, 4));
        put(&mut board, &rules, 6, UnitKind::Knight, 0, Coord::new(4, 3));
        let before = board.clone();

        let cases = [
            (Coord::new(0, 0), Coord::new(1, 0), RuleError::IneligibleMerge),
            (Coord::new(0, 0), Coord::new(0, 1), RuleError::IneligibleMerge),
            (Coord::new(0, 0), Coord::new(3, 3), RuleError::IneligibleMerge),
            (Coord::new(0, 0), Coord::new(0, 0), RuleError::IneligibleMerge),
            (Coord::new(0, 0), Coord::new(2, 2), RuleError::IneligibleMerge),
            (Coord::new(4, 4), Coord::new(4, 3), RuleError::IneligibleMerge),
            (Coord::new(0, 1), Coord::new(0, 0), RuleError::NotYourTurn),
        ];
        for (a, b, err) in cases {
            assert_eq!(
                merge_units(&mut board, &players, &rules, PlayerId(0), a, b, UnitId(99)),
                Err(err),
                "{a} + {b}"
            );
        }
        assert_eq!(board, before);
    }

    #[test]
    fn merged_unit_must_fit_unit_space() {
        let (mut board, mut players, mut rules) = setup();
        rules.spearman.unit_space = 7;
        players[0].max_unit_space = 6;
        put(&mut board, &rules, 1, UnitKind::Peasant, 0, Coord::new(0, 0));
        put(&mut board, &rules, 2, UnitKind::Peasant, 0, Coord::new(0, 1));
        assert_eq!(
            merge_units(&mut board, &players, &rules, PlayerId(0), Coord::new(0, 0), Coord::new(0, 1), UnitId(3)),
            Err(RuleError::InsufficientUnitSpace)
        );
    }
}
