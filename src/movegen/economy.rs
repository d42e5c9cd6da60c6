//! Legal builds, upgrades, training and deployments.

use std::collections::BTreeSet;

use crate::board::{Board, Coord, Player, PlayerId, StructureKind, ALL_STRUCTURE_KINDS, ALL_UNIT_KINDS};
use crate::game::Action;
use crate::resolve::build::{is_deploy_site, validate_build, validate_train, validate_upgrade};
use crate::rules::Rules;

/// Tiles next to any of `player`'s structures, optionally of given kinds.
fn frontier(board: &Board, player: PlayerId, kinds: &[StructureKind]) -> BTreeSet<Coord> {
    board
        .structures_owned_by(player)
        .filter(|(_, s)| kinds.is_empty() || kinds.contains(&s.kind))
        .flat_map(|(c, _)| board.neighborhood8(c).map(|(n, _)| n))
        .collect()
}

pub fn legal_builds(board: &Board, players: &[Player], rules: &Rules, current: PlayerId) -> Vec<Action> {
    let sites = frontier(board, current, &[]);
    let mut out = Vec::new();
    for kind in ALL_STRUCTURE_KINDS.into_iter().filter(|k| k.is_buildable()) {
        for &at in &sites {
            if validate_build(board, players, rules, current, current, kind, at).is_ok() {
                out.push(Action::Build { kind, at });
            }
        }
    }
    out
}

pub fn legal_upgrades(board: &Board, players: &[Player], current: PlayerId) -> Vec<Action> {
    board
        .structures_owned_by(current)
        .map(|(at, _)| at)
        .filter(|&at| validate_upgrade(board, players, current, at).is_ok())
        .map(|at| Action::Upgrade { at })
        .collect()
}

pub fn legal_trains(board: &Board, players: &[Player], rules: &Rules, current: PlayerId) -> Vec<Action> {
    ALL_UNIT_KINDS
        .into_iter()
        .filter(|&kind| validate_train(board, players, rules, current, current, kind).is_ok())
        .map(|kind| Action::Train { kind })
        .collect()
}

pub fn legal_deploys(board: &Board, players: &[Player], current: PlayerId) -> Vec<Action> {
    let Some(player) = players.get(current.index()) else {
        return Vec::new();
    };
    let sites: Vec<Coord> = frontier(board, current, &[StructureKind::TownHall, StructureKind::Barrack])
        .into_iter()
        .filter(|&at| is_deploy_site(board, current, at))
        .collect();
    player
        .reserve
        .iter()
        .flat_map(|u| sites.iter().map(move |&at| Action::Deploy { unit: u.id, at }))
        .collect()
}
