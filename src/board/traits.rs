//! Entity capabilities.
//!
//! Units and structures share behavior through these small traits rather
//! than a type hierarchy; each implementation dispatches on the variant tag.

use crate::error::RuleError;

/// Anything with hit points that can be destroyed by damage.
pub trait Damageable {
    /// Current health or durability.
    fn hit_points(&self) -> u32;

    fn max_hit_points(&self) -> u32;

    /// Applies damage, saturating at zero. Returns true if this destroyed
    /// the entity.
    fn take_damage(&mut self, amount: u32) -> bool;

    fn is_destroyed(&self) -> bool {
        self.hit_points() == 0
    }
}

/// Per-turn resource output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Production {
    pub gold: u32,
    pub food: u32,
}

impl std::ops::Add for Production {
    type Output = Production;

    fn add(self, rhs: Production) -> Production {
        Production {
            gold: self.gold.saturating_add(rhs.gold),
            food: self.food.saturating_add(rhs.food),
        }
    }
}

/// Anything that yields resources at the start of its owner's turn.
pub trait Producer {
    fn production(&self) -> Production;
}

/// Anything that can be leveled up.
pub trait Upgradeable {
    fn level(&self) -> u8;

    fn max_level(&self) -> u8;

    /// Raises the level by one. Fails with `MaxLevelReached` and changes
    /// nothing when already at the cap.
    fn upgrade(&mut self) -> Result<(), RuleError>;

    fn can_upgrade(&self) -> bool {
        self.level() < self.max_level()
    }
}
