//! Rule resolution.
//!
//! Free functions over the board and player records. Each resolver checks
//! every precondition before it touches anything, so a returned error
//! always means nothing changed.

pub mod build;
pub mod combat;
pub mod damage;
pub mod economy;
pub mod merge;
pub mod movement;
pub mod turn;

pub use build::{
    build_structure, deploy_unit, is_deploy_site, train_unit, upgrade_structure, UpgradeReport,
};
pub use combat::{attack, AttackReport};
pub use damage::{EntityKind, Hit, Target};
pub use economy::{run_economy, EconomyReport};
pub use merge::merge_units;
pub use movement::{blocked_by_tower, move_unit};
pub use turn::{check_winner, next_seat, reset_acted, Outcome};
