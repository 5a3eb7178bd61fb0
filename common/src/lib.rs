use std::fmt::Display;

use derive_more::{Deref, DerefMut};

pub mod board;
pub mod message;
pub mod rules;

/// Cached copy of the player's score. The server owns the real value.
pub type Score = i64;

#[derive(
    serde::Serialize,
    serde::Deserialize,
    Debug,
    Clone,
    Default,
    Deref,
    DerefMut,
    derive_more::Into,
    Hash,
    PartialEq,
    Eq,
)]
#[serde(transparent)]
pub struct GameId {
    pub id: String,
}

impl GameId {
    /// Parses the identifier embedded in the game page. Empty values and the
    /// literal `None` (what the page renders for a missing game) are rejected.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() || raw == "None" {
            return None;
        }

        Some(Self {
            id: raw.to_string(),
        })
    }
}

impl Display for GameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.id, f)
    }
}

/// Index of a square along the board path.
#[derive(
    serde::Serialize,
    serde::Deserialize,
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    PartialOrd,
    Eq,
    Ord,
    Hash,
    derive_more::Display,
    derive_more::From,
    derive_more::Into,
)]
#[serde(transparent)]
pub struct BoardPosition(pub u32);

impl BoardPosition {
    pub const START: Self = Self(0);

    pub fn advanced_by(self, steps: u32) -> Self {
        Self(self.0.saturating_add(steps))
    }

    pub fn distance_to(self, other: Self) -> u32 {
        other.0.saturating_sub(self.0)
    }
}
