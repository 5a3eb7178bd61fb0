use common::{rules::RollOutcome, BoardPosition};
use rand::Rng;

/// Number of stars shown when the token settles.
pub const CELEBRATION_MARKERS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationPhase {
    Moving,
    Celebrating,
}

/// Token walk for a single roll, one square per step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Animation {
    pub roll: RollOutcome,
    pub origin: BoardPosition,
    pub destination: BoardPosition,
    pub current: BoardPosition,
    pub steps_taken: u32,
    pub phase: AnimationPhase,
}

impl Animation {
    pub fn new(roll: RollOutcome, origin: BoardPosition, destination: BoardPosition) -> Self {
        Self {
            roll,
            origin,
            destination,
            current: origin,
            steps_taken: 0,
            phase: AnimationPhase::Moving,
        }
    }

    pub fn total_steps(&self) -> u32 {
        self.origin.distance_to(self.destination)
    }

    pub fn remaining(&self) -> u32 {
        self.current.distance_to(self.destination)
    }

    /// Moves one square. Returns `None` once the destination had already
    /// been reached, switching to the celebration phase.
    pub fn step(&mut self) -> Option<BoardPosition> {
        if self.phase != AnimationPhase::Moving {
            return None;
        }

        if self.current < self.destination {
            self.current = self.current.advanced_by(1);
            self.steps_taken += 1;
            Some(self.current)
        } else {
            self.phase = AnimationPhase::Celebrating;
            None
        }
    }
}

/// A short lived star drawn over the board. Percentages are relative to the
/// board area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    pub left: f32,
    pub top: f32,
    pub size: f32,
    pub duration: f32,
}

impl Marker {
    pub fn random(rng: &mut impl Rng) -> Self {
        Self {
            left: rng.random_range(10.0..90.0),
            top: rng.random_range(10.0..50.0),
            size: rng.random_range(12.0..24.0),
            duration: rng.random_range(0.8..1.3),
        }
    }

    pub fn burst(rng: &mut impl Rng) -> Vec<Self> {
        (0..CELEBRATION_MARKERS).map(|_| Self::random(rng)).collect()
    }
}
