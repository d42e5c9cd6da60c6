//! Text and persistence formats.
//!
//! The ASCII layout codec for terrain, JSON snapshots for saving and
//! restoring matches, and the line-oriented command parser used by the
//! main loop.

pub mod layout;
pub mod parser;
pub mod snapshot;

pub use layout::{encode_layout, parse_layout, render_board, LayoutError};
pub use parser::{format_action, parse_command, Command, CommandError, NewBoard};
pub use snapshot::{Snapshot, SnapshotError};
