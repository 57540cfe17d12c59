// crates/pgsolve-core/src/types.rs

//! Canonical scalar types used across the pgsolve workspace.
//!
//! These live in `pgsolve-core` and are broadly re-exported at the crate
//! root so other crates can import via `pgsolve_core::Player` etc.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Vertex identifier in `[0, n)`.
pub type Vertex = u32;

/// Vertex priority (non-negative; vertices are stored sorted by priority).
pub type Priority = u32;

/// One of the two players of a parity game.
///
/// Even wins plays whose maximum recurring priority is even, Odd those
/// where it is odd. The numeric representation (`Even = 0`, `Odd = 1`)
/// matches the parity of the priorities the player likes.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Player {
    /// Player 0; favours even priorities.
    Even,
    /// Player 1; favours odd priorities.
    Odd,
}

impl Player {
    /// Player whose parity matches `p`.
    #[inline]
    #[must_use]
    pub const fn of_priority(p: Priority) -> Self {
        if p & 1 == 0 {
            Self::Even
        } else {
            Self::Odd
        }
    }

    /// Player with index `i & 1` (0 = Even, 1 = Odd).
    #[inline]
    #[must_use]
    pub const fn from_index(i: usize) -> Self {
        if i & 1 == 0 {
            Self::Even
        } else {
            Self::Odd
        }
    }

    /// The other player.
    #[inline]
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Even => Self::Odd,
            Self::Odd => Self::Even,
        }
    }

    /// Numeric index in `{0, 1}`; also the parity this player favours.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Even => 0,
            Self::Odd => 1,
        }
    }

    /// Whether `p` has this player's parity.
    #[inline]
    #[must_use]
    pub const fn likes(self, p: Priority) -> bool {
        (p & 1) as usize == self.index()
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Even => write!(f, "even"),
            Self::Odd => write!(f, "odd"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parity_roundtrip() {
        assert_eq!(Player::of_priority(0), Player::Even);
        assert_eq!(Player::of_priority(7), Player::Odd);
        assert_eq!(Player::Even.opponent(), Player::Odd);
        assert_eq!(Player::Odd.opponent().index(), 0);
        assert!(Player::Odd.likes(3));
        assert!(!Player::Odd.likes(4));
    }
}
