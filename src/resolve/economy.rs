//! Start-of-turn income and maintenance.

use crate::board::{Board, Coord, Player, PlayerId, Producer, Production};

use super::damage::{damage_structure, Hit};

/// What happened to one player's treasury at the start of their turn.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EconomyReport {
    pub income: Production,
    pub maintenance: u32,
    /// False when the player could not cover maintenance and their
    /// structures took damage instead.
    pub paid: bool,
    /// Maintenance left uncovered by the gold held after income.
    pub deficit: u32,
    /// Damage dealt to each structure when maintenance went unpaid.
    pub damage_per_structure: u32,
    pub hits: Vec<Hit>,
}

impl EconomyReport {
    /// Structures lost to unpaid maintenance.
    pub fn destroyed(&self) -> impl Iterator<Item = &Hit> {
        self.hits.iter().filter(|h| h.destroyed)
    }

    pub fn town_hall_destroyed(&self) -> bool {
        self.hits.iter().any(Hit::destroyed_town_hall)
    }
}

/// Collects income for `player`, then charges maintenance. An unpaid bill
/// leaves gold untouched and wears every structure down by an equal share
/// of the deficit.
pub fn run_economy(board: &mut Board, players: &mut [Player], player: PlayerId) -> EconomyReport {
    let owned: Vec<(Coord, Production, u32)> = board
        .structures_owned_by(player)
        .map(|(c, s)| (c, s.production(), s.maintenance()))
        .collect();
    let income = owned
        .iter()
        .fold(Production::default(), |acc, (_, p, _)| acc + *p);
    let maintenance: u32 = owned.iter().map(|(_, _, m)| m).sum();

    let Some(p) = players.get_mut(player.index()) else {
        return EconomyReport::default();
    };
    p.gold = p.gold.saturating_add(income.gold);
    p.food = p.food.saturating_add(income.food);

    if p.gold >= maintenance {
        p.gold -= maintenance;
        return EconomyReport {
            income,
            maintenance,
            paid: true,
            deficit: 0,
            damage_per_structure: 0,
            hits: Vec::new(),
        };
    }

    let deficit = maintenance - p.gold;
    let share = deficit / owned.len().max(1) as u32;
    let hits = owned
        .iter()
        .filter_map(|(c, _, _)| damage_structure(board, players, *c, share))
        .collect();
    EconomyReport {
        income,
        maintenance,
        paid: false,
        deficit,
        damage_per_structure: share,
        hits,
    }
}
