//! Legal action generation.
//!
//! Enumerates every action the current player could issue successfully
//! right now. Each candidate is checked with the same validation the
//! resolvers use, so a generated action never fails when applied.

pub mod economy;
pub mod units;

use rand::Rng;

use crate::game::{Action, GameMatch};

/// All legal actions for the current player, in a stable order: unit
/// actions by board position, then builds, upgrades, training,
/// deployments and finally ending the turn. Empty once the game is over.
pub fn legal_actions(game: &GameMatch) -> Vec<Action> {
    if game.state().is_over() {
        return Vec::new();
    }
    let board = game.board();
    let players = game.players();
    let rules = game.rules();
    let current = game.current_player();

    let mut actions = Vec::new();
    for (c, unit) in board.units_owned_by(current) {
        actions.extend(units::legal_moves(board, current, c, unit));
        actions.extend(units::legal_attacks(board, current, c, unit));
        actions.extend(units::legal_merges(board, players, rules, current, c));
    }
    actions.extend(economy::legal_builds(board, players, rules, current));
    actions.extend(economy::legal_upgrades(board, players, current));
    actions.extend(economy::legal_trains(board, players, rules, current));
    actions.extend(economy::legal_deploys(board, players, current));
    actions.push(Action::EndTurn);
    actions
}

/// Picks one legal action uniformly at random.
pub fn random_action(game: &GameMatch, rng: &mut impl Rng) -> Option<Action> {
    let legal = legal_actions(game);
    if legal.is_empty() {
        return None;
    }
    Some(legal[rng.gen_range(0..legal.len())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Coord, PlayerId, StructureKind, UnitKind};
    use crate::rules::Rules;
    use crate::setup::{standard_match, BoardSpec};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn fresh() -> GameMatch {
        standard_match(Rules::default(), BoardSpec::Size { width: 6, height: 6 }, &["a", "b"], None).unwrap()
    }

    #[test]
    fn opening_actions() {
        let game = fresh();
        let actions = legal_actions(&game);
        // Three tiles around a corner hall, four buildable kinds.
        let builds = actions.iter().filter(|a| matches!(a, Action::Build { .. })).count();
        assert_eq!(builds, 12);
        let trains = actions.iter().filter(|a| matches!(a, Action::Train { .. })).count();
        assert_eq!(trains, 4);
        assert!(actions.contains(&Action::EndTurn));
        assert!(!actions.iter().any(|a| matches!(a, Action::Upgrade { .. } | Action::Move { .. })));
    }

    #[test]
    fn every_generated_action_applies() {
        let mut game = fresh();
        let id = game.train_unit(PlayerId(0), UnitKind::Peasant).unwrap();
        game.deploy_unit(PlayerId(0), id, Coord::new(1, 1)).unwrap();
        game.build_structure(PlayerId(0), StructureKind::Barrack, Coord::new(1, 0)).unwrap();
        game.train_unit(PlayerId(0), UnitKind::Peasant).unwrap();

        for action in legal_actions(&game) {
            let mut copy = game.clone();
            assert!(copy.apply(action).is_ok(), "{action:?}");
        }
    }

    #[test]
    fn nothing_after_game_over() {
        let mut rules = Rules::default();
        rules.town_hall.maintenance = 1_000;
        rules.town_hall.max_durability = 1;
        let mut game = standard_match(rules, BoardSpec::Size { width: 6, height: 6 }, &["a", "b"], None).unwrap();
        let mut rng = SmallRng::seed_from_u64(1);
        assert!(random_action(&game, &mut rng).is_some());

        // Player 1 cannot pay upkeep and loses their only hall.
        game.next_turn().unwrap();
        assert!(game.state().is_over());
        assert!(legal_actions(&game).is_empty());
        assert_eq!(random_action(&game, &mut rng), None);
    }
}
