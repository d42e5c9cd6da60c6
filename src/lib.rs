//! Bulwark rules engine library.
//!
//! A turn-based grid strategy engine: the board and its entities, action
//! resolution, the match state machine, legal-action generation and the
//! text and JSON formats used by the binaries and integration tests.

pub mod board;
pub mod error;
pub mod game;
pub mod host;
pub mod invariants;
pub mod movegen;
pub mod playout;
pub mod protocol;
pub mod resolve;
pub mod rules;
pub mod session;
pub mod setup;

pub use error::RuleError;
pub use game::{Action, ActionOutcome, GameMatch, GameState, TurnReport};
pub use rules::Rules;
