//! ID types for player slots, facing and fighter archetypes.

use serde::{Deserialize, Serialize};

/// Which side of the arena a combatant occupies.
///
/// The left slot spawns at negative x facing +x, the right slot spawns at
/// positive x facing -x.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerSlot {
    /// Player one (keyboard A/D side, gamepad 0).
    Left,
    /// Player two (keyboard J/L side, gamepad 1).
    Right,
}

impl PlayerSlot {
    /// Both slots in index order.
    pub const ALL: [Self; 2] = [Self::Left, Self::Right];

    /// Array index for this slot (0 or 1).
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Right => 1,
        }
    }

    /// Slot from an array index. Anything other than 0 or 1 is `None`.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Left),
            1 => Some(Self::Right),
            _ => None,
        }
    }

    /// The opposing slot.
    #[must_use]
    pub const fn rival(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Facing direction a fighter in this slot spawns with.
    #[must_use]
    pub const fn facing(self) -> Facing {
        match self {
            Self::Left => Facing::PositiveX,
            Self::Right => Facing::NegativeX,
        }
    }
}

impl std::fmt::Display for PlayerSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Left => write!(f, "player one"),
            Self::Right => write!(f, "player two"),
        }
    }
}

/// Horizontal facing direction (the `±1` multiplier of every mirrored value).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facing {
    /// Facing toward +x (sign +1).
    PositiveX,
    /// Facing toward -x (sign -1).
    NegativeX,
}

impl Facing {
    /// Direction multiplier, `1.0` or `-1.0`.
    #[must_use]
    pub const fn sign(self) -> f32 {
        match self {
            Self::PositiveX => 1.0,
            Self::NegativeX => -1.0,
        }
    }

    /// The mirrored direction.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::PositiveX => Self::NegativeX,
            Self::NegativeX => Self::PositiveX,
        }
    }
}

/// Identifier of a fighter archetype (index into an archetype table).
///
/// Validity is checked against a concrete table, never assumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArchetypeId(u8);

impl ArchetypeId {
    /// The hand fighter.
    pub const HAND_FIGHTER: Self = Self(0);
    /// Original fighter, left-player model.
    pub const OG_LEFT: Self = Self(1);
    /// Original fighter, right-player model.
    pub const OG_RIGHT: Self = Self(2);
    /// Monday Memo.
    pub const MONDAY_MEMO: Self = Self(3);

    /// Creates an archetype id from a raw value.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Returns the raw id value.
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Returns the id as a table index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for ArchetypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "archetype#{}", self.0)
    }
}
