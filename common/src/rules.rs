use crate::Score;

/// Points reported when landing on a bonus square.
pub const BONUS_POINTS: Score = 50;
/// Points removed when landing on a penalty square.
pub const PENALTY_POINTS: Score = 30;
/// Cost of revealing a trivia hint. Charged by the server on submission.
pub const HINT_COST: Score = 30;
/// Server award for a correct trivia answer (before the hint cost).
pub const CORRECT_ANSWER_POINTS: Score = 100;
/// Server penalty for a wrong trivia answer.
pub const WRONG_ANSWER_PENALTY: Score = 20;

pub const DIE_FACES: u32 = 6;

/// A single die roll. Only drives animation pacing and colour; the server
/// never sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub struct RollOutcome(u32);

impl RollOutcome {
    pub fn new(value: u32) -> Option<Self> {
        (1..=DIE_FACES).contains(&value).then_some(Self(value))
    }

    /// Like [`RollOutcome::new`], pulling out-of-range values onto the die.
    pub fn clamped(value: u32) -> Self {
        Self(value.clamp(1, DIE_FACES))
    }

    pub fn value(self) -> u32 {
        self.0
    }

    pub fn color(self) -> &'static str {
        die_color(self.0)
    }
}

/// Colour of the die face, `0` is the idle die.
pub fn die_color(value: u32) -> &'static str {
    match value {
        1 => "#e74c3c",
        2 => "#f1c40f",
        3 => "#2ecc71",
        4 => "#3498db",
        5 => "#9b59b6",
        6 => "#e67e22",
        _ => "#c9a14a",
    }
}

/// Score change the server applies when a trivia answer is processed.
/// Only used to explain the outcome to the player.
pub fn expected_answer_delta(correct: bool, used_hint: bool) -> Score {
    match (correct, used_hint) {
        (true, true) => CORRECT_ANSWER_POINTS - HINT_COST,
        (true, false) => CORRECT_ANSWER_POINTS,
        (false, _) => -WRONG_ANSWER_PENALTY,
    }
}
