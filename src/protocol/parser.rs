//! Command parser.
//!
//! Turns lines of the text protocol into structured `Command` values the
//! main loop dispatches on, and formats actions back into the same
//! notation. Coordinates are always written `x y`.

use crate::board::{Coord, StructureKind, UnitId, UnitKind};
use crate::game::Action;
use crate::resolve::Target;

/// Why a line could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("empty line")]
    Empty,

    #[error("unknown command '{0}'")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("unknown unit kind '{0}'")]
    UnknownUnitKind(String),

    #[error("unknown structure kind '{0}'")]
    UnknownStructureKind(String),
}

impl CommandError {
    /// Stable snake_case identifier written after `error` in responses.
    pub const fn code(&self) -> &'static str {
        match self {
            CommandError::Empty => "empty",
            CommandError::Unknown(_) => "unknown_command",
            CommandError::Usage(_) => "usage",
            CommandError::InvalidNumber(_) => "invalid_number",
            CommandError::UnknownUnitKind(_) => "unknown_unit_kind",
            CommandError::UnknownStructureKind(_) => "unknown_structure_kind",
        }
    }
}

/// Where the board of a new game comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewBoard {
    Size { width: u16, height: u16 },
    /// The rows collected with `layout` since the last game started.
    Layout,
}

/// A parsed protocol command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `newgame <w> <h> <name>...` or `newgame layout <name>...`.
    NewGame { board: NewBoard, names: Vec<String> },

    /// `layout <row>`: append one terrain row for the next `newgame layout`.
    Layout { row: String },

    /// Any engine action issued by the current player.
    Action(Action),

    /// Print the board.
    Show,

    /// Print the match state and player records.
    State,

    /// Print the match as snapshot JSON.
    Save,

    /// `load <json>`: replace the match with a snapshot.
    Load { json: String },

    Quit,
}

const USAGE_NEWGAME: &str = "newgame <width> <height> <name>... | newgame layout <name>...";
const USAGE_LAYOUT: &str = "layout <row>";
const USAGE_MOVE: &str = "move <x> <y> <x> <y>";
const USAGE_ATTACK: &str = "attack <x> <y> unit|structure <x> <y>";
const USAGE_BUILD: &str = "build <kind> <x> <y>";
const USAGE_UPGRADE: &str = "upgrade <x> <y>";
const USAGE_TRAIN: &str = "train <kind>";
const USAGE_DEPLOY: &str = "deploy <id> <x> <y>";
const USAGE_MERGE: &str = "merge <x> <y> <x> <y>";
const USAGE_LOAD: &str = "load <json>";

/// Parses a single line into a `Command`.
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let trimmed = line.trim();
    let tokens: Vec<&str> = trimmed.split_whitespace().collect();
    let Some(&head) = tokens.first() else {
        return Err(CommandError::Empty);
    };
    let args = &tokens[1..];

    match head {
        "newgame" => parse_newgame(args),
        "layout" => match args {
            [row] => Ok(Command::Layout { row: (*row).to_string() }),
            _ => Err(CommandError::Usage(USAGE_LAYOUT)),
        },
        "move" => {
            let [fx, fy, tx, ty] = exact(args, USAGE_MOVE)?;
            Ok(Command::Action(Action::Move {
                from: coord(fx, fy)?,
                to: coord(tx, ty)?,
            }))
        }
        "attack" => {
            let [fx, fy, slot, tx, ty] = exact(args, USAGE_ATTACK)?;
            let at = coord(tx, ty)?;
            let target = match slot {
                "unit" => Target::Unit(at),
                "structure" => Target::Structure(at),
                _ => return Err(CommandError::Usage(USAGE_ATTACK)),
            };
            Ok(Command::Action(Action::Attack {
                from: coord(fx, fy)?,
                target,
            }))
        }
        "build" => {
            let [kind, x, y] = exact(args, USAGE_BUILD)?;
            let kind = StructureKind::from_name(kind)
                .ok_or_else(|| CommandError::UnknownStructureKind(kind.to_string()))?;
            Ok(Command::Action(Action::Build { kind, at: coord(x, y)? }))
        }
        "upgrade" => {
            let [x, y] = exact(args, USAGE_UPGRADE)?;
            Ok(Command::Action(Action::Upgrade { at: coord(x, y)? }))
        }
        "train" => {
            let [kind] = exact(args, USAGE_TRAIN)?;
            let kind = UnitKind::from_name(kind).ok_or_else(|| CommandError::UnknownUnitKind(kind.to_string()))?;
            Ok(Command::Action(Action::Train { kind }))
        }
        "deploy" => {
            let [id, x, y] = exact(args, USAGE_DEPLOY)?;
            Ok(Command::Action(Action::Deploy {
                unit: UnitId(number(id)?),
                at: coord(x, y)?,
            }))
        }
        "merge" => {
            let [ax, ay, bx, by] = exact(args, USAGE_MERGE)?;
            Ok(Command::Action(Action::Merge {
                a: coord(ax, ay)?,
                b: coord(bx, by)?,
            }))
        }
        "next" => Ok(Command::Action(Action::EndTurn)),
        "show" => Ok(Command::Show),
        "state" => Ok(Command::State),
        "save" => Ok(Command::Save),
        "load" => {
            // JSON may contain spaces, so take the rest of the line verbatim.
            let json = trimmed.strip_prefix("load").unwrap_or("").trim();
            if json.is_empty() {
                return Err(CommandError::Usage(USAGE_LOAD));
            }
            Ok(Command::Load { json: json.to_string() })
        }
        "quit" => Ok(Command::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

/// Parses `newgame <w> <h> <name>...` and `newgame layout <name>...`.
fn parse_newgame(args: &[&str]) -> Result<Command, CommandError> {
    let names = |rest: &[&str]| -> Result<Vec<String>, CommandError> {
        if rest.is_empty() {
            return Err(CommandError::Usage(USAGE_NEWGAME));
        }
        Ok(rest.iter().map(|s| (*s).to_string()).collect())
    };
    match args {
        ["layout", rest @ ..] => Ok(Command::NewGame {
            board: NewBoard::Layout,
            names: names(rest)?,
        }),
        [w, h, rest @ ..] => Ok(Command::NewGame {
            board: NewBoard::Size {
                width: number(w)?,
                height: number(h)?,
            },
            names: names(rest)?,
        }),
        _ => Err(CommandError::Usage(USAGE_NEWGAME)),
    }
}

fn exact<'a, const N: usize>(args: &[&'a str], usage: &'static str) -> Result<[&'a str; N], CommandError> {
    <[&str; N]>::try_from(args).map_err(|_| CommandError::Usage(usage))
}

fn number<T: std::str::FromStr>(s: &str) -> Result<T, CommandError> {
    s.parse().map_err(|_| CommandError::InvalidNumber(s.to_string()))
}

fn coord(x: &str, y: &str) -> Result<Coord, CommandError> {
    Ok(Coord::new(number(x)?, number(y)?))
}

/// Formats an action in protocol notation, e.g. `attack 1 2 unit 1 3`.
pub fn format_action(action: &Action) -> String {
    match *action {
        Action::Move { from, to } => format!("move {} {} {} {}", from.x, from.y, to.x, to.y),
        Action::Attack { from, target } => {
            let (slot, at) = match target {
                Target::Unit(c) => ("unit", c),
                Target::Structure(c) => ("structure", c),
            };
            format!("attack {} {} {slot} {} {}", from.x, from.y, at.x, at.y)
        }
        Action::Build { kind, at } => format!("build {} {} {}", kind.name(), at.x, at.y),
        Action::Upgrade { at } => format!("upgrade {} {}", at.x, at.y),
        Action::Train { kind } => format!("train {}", kind.name()),
        Action::Deploy { unit, at } => format!("deploy {} {} {}", unit.0, at.x, at.y),
        Action::Merge { a, b } => format!("merge {} {} {} {}", a.x, a.y, b.x, b.y),
        Action::EndTurn => "next".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(line: &str) -> Action {
        match parse_command(line) {
            Ok(Command::Action(a)) => a,
            other => panic!("expected an action from '{line}', got {other:?}"),
        }
    }

    #[test]
    fn parse_simple_commands() {
        assert_eq!(parse_command("show"), Ok(Command::Show));
        assert_eq!(parse_command("state"), Ok(Command::State));
        assert_eq!(parse_command("save"), Ok(Command::Save));
        assert_eq!(parse_command("quit"), Ok(Command::Quit));
        assert_eq!(parse_command("next"), Ok(Command::Action(Action::EndTurn)));
    }

    #[test]
    fn parse_empty_line() {
        assert_eq!(parse_command(""), Err(CommandError::Empty));
        assert_eq!(parse_command("  \t"), Err(CommandError::Empty));
    }

    #[test]
    fn parse_unknown_command() {
        assert_eq!(parse_command("fly 1 2"), Err(CommandError::Unknown("fly".to_string())));
    }

    #[test]
    fn parse_newgame_with_size() {
        assert_eq!(
            parse_command("newgame 8 6 ann bo"),
            Ok(Command::NewGame {
                board: NewBoard::Size { width: 8, height: 6 },
                names: vec!["ann".to_string(), "bo".to_string()],
            })
        );
    }

    #[test]
    fn parse_newgame_from_layout() {
        assert_eq!(
            parse_command("newgame layout ann"),
            Ok(Command::NewGame {
                board: NewBoard::Layout,
                names: vec!["ann".to_string()],
            })
        );
        assert_eq!(
            parse_command("layout ..f#"),
            Ok(Command::Layout { row: "..f#".to_string() })
        );
    }

    #[test]
    fn parse_newgame_malformed() {
        assert_eq!(parse_command("newgame 8 6"), Err(CommandError::Usage(USAGE_NEWGAME)));
        assert_eq!(parse_command("newgame"), Err(CommandError::Usage(USAGE_NEWGAME)));
        assert_eq!(
            parse_command("newgame x 6 ann"),
            Err(CommandError::InvalidNumber("x".to_string()))
        );
    }

    #[test]
    fn parse_move_and_merge() {
        assert_eq!(
            action("move 1 2 3 2"),
            Action::Move {
                from: Coord::new(1, 2),
                to: Coord::new(3, 2),
            }
        );
        assert_eq!(
            action("merge 0 0 1 1"),
            Action::Merge {
                a: Coord::new(0, 0),
                b: Coord::new(1, 1),
            }
        );
    }

    #[test]
    fn parse_attack_slots() {
        assert_eq!(
            action("attack 1 1 structure 1 2"),
            Action::Attack {
                from: Coord::new(1, 1),
                target: Target::Structure(Coord::new(1, 2)),
            }
        );
        assert_eq!(
            parse_command("attack 1 1 roof 1 2"),
            Err(CommandError::Usage(USAGE_ATTACK))
        );
    }

    #[test]
    fn parse_kinds() {
        assert_eq!(action("train knight"), Action::Train { kind: UnitKind::Knight });
        assert_eq!(
            action("build barrack 2 3"),
            Action::Build {
                kind: StructureKind::Barrack,
                at: Coord::new(2, 3),
            }
        );
        assert_eq!(
            parse_command("train dragon"),
            Err(CommandError::UnknownUnitKind("dragon".to_string()))
        );
        assert_eq!(
            parse_command("build castle 1 1"),
            Err(CommandError::UnknownStructureKind("castle".to_string()))
        );
    }

    #[test]
    fn parse_negative_coordinate_rejected() {
        assert_eq!(
            parse_command("upgrade -1 0"),
            Err(CommandError::InvalidNumber("-1".to_string()))
        );
        assert_eq!(parse_command("upgrade 1"), Err(CommandError::Usage(USAGE_UPGRADE)));
    }

    #[test]
    fn parse_load_keeps_spaces() {
        assert_eq!(
            parse_command("load {\"a\": 1, \"b\": 2}"),
            Ok(Command::Load {
                json: "{\"a\": 1, \"b\": 2}".to_string(),
            })
        );
        assert_eq!(parse_command("load"), Err(CommandError::Usage(USAGE_LOAD)));
    }

    #[test]
    fn formatted_actions_parse_back() {
        for line in [
            "move 1 2 3 4",
            "attack 0 0 unit 0 1",
            "build tower 4 4",
            "upgrade 2 2",
            "train swordsman",
            "deploy 12 1 0",
            "merge 3 3 3 4",
            "next",
        ] {
            assert_eq!(format_action(&action(line)), line);
        }
    }

    #[test]
    fn parse_with_surrounding_whitespace() {
        assert_eq!(parse_command("   show  "), Ok(Command::Show));
    }
}
