//! Rule violations.
//!
//! Every rejected operation reports one of these kinds and leaves the
//! match untouched.

/// A recoverable rule violation surfaced to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum RuleError {
    #[error("not your turn")]
    NotYourTurn,

    #[error("unit has already acted this turn")]
    AlreadyActed,

    #[error("target is out of range")]
    OutOfRange,

    #[error("cannot attack your own entity")]
    FriendlyFire,

    #[error("invalid or occupied target")]
    InvalidTarget,

    #[error("destination is blocked by an enemy tower")]
    Blocked,

    #[error("insufficient resources")]
    InsufficientResources,

    #[error("insufficient unit space")]
    InsufficientUnitSpace,

    #[error("units cannot be merged")]
    IneligibleMerge,

    #[error("structure is already at its maximum level")]
    MaxLevelReached,

    #[error("the game is already over")]
    GameAlreadyOver,

    #[error("coordinate is out of bounds")]
    OutOfBounds,
}

impl RuleError {
    /// Stable snake_case identifier used by the command protocol and logs.
    pub const fn code(self) -> &'static str {
        match self {
            RuleError::NotYourTurn => "not_your_turn",
            RuleError::AlreadyActed => "already_acted",
            RuleError::OutOfRange => "out_of_range",
            RuleError::FriendlyFire => "friendly_fire",
            RuleError::InvalidTarget => "invalid_target",
            RuleError::Blocked => "blocked",
            RuleError::InsufficientResources => "insufficient_resources",
            RuleError::InsufficientUnitSpace => "insufficient_unit_space",
            RuleError::IneligibleMerge => "ineligible_merge",
            RuleError::MaxLevelReached => "max_level_reached",
            RuleError::GameAlreadyOver => "game_already_over",
            RuleError::OutOfBounds => "out_of_bounds",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        let all = [
            RuleError::NotYourTurn,
            RuleError::AlreadyActed,
            RuleError::OutOfRange,
            RuleError::FriendlyFire,
            RuleError::InvalidTarget,
            RuleError::Blocked,
            RuleError::InsufficientResources,
            RuleError::InsufficientUnitSpace,
            RuleError::IneligibleMerge,
            RuleError::MaxLevelReached,
            RuleError::GameAlreadyOver,
            RuleError::OutOfBounds,
        ];
        let mut codes: Vec<&str> = all.iter().map(|e| e.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), all.len());
    }

    #[test]
    fn display_is_human_readable() {
        assert_eq!(RuleError::FriendlyFire.to_string(), "cannot attack your own entity");
    }
}
