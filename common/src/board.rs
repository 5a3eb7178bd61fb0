use std::collections::{BTreeMap, BTreeSet};

use itertools::Itertools;

use crate::{
    rules::{RollOutcome, BONUS_POINTS, PENALTY_POINTS},
    BoardPosition, Score,
};

// Classic board:
// - 22 squares on the path (0 = start, 21 = arrival)
// - Bonus on 6 and 13, penalty on 9 and 17
// - One trivia zone per question category
// - The path snakes through a 4 column grid of 28 cells

pub const CLASSIC_TERMINAL: BoardPosition = BoardPosition(21);
pub const GRID_COLUMNS: usize = 4;
const CLASSIC_GRID_PATH: [usize; 22] = [
    0, 4, 5, 6, 7, 11, 10, 9, 8, 12, 13, 14, 15, 19, 18, 17, 16, 20, 21, 22, 23, 27,
];
const CLASSIC_GRID_CELLS: usize = 28;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SquareKind {
    Start,
    Empty,
    Bonus,
    Penalty,
    TriviaZone,
    Arrival,
}

/// What has to happen once the token settles on a square.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SquareEvent {
    Arrival,
    Bonus { points: Score },
    Penalty { points: Score },
    Trivia { square: BoardPosition },
    Nothing,
}

impl SquareEvent {
    /// Score delta the client reports for this event. Trivia squares report
    /// nothing; the server scores the answer.
    pub fn score_delta(&self) -> Option<Score> {
        match self {
            SquareEvent::Bonus { points } => Some(*points),
            SquareEvent::Penalty { points } => Some(-*points),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardLayout {
    terminal: BoardPosition,
    bonus: BTreeSet<BoardPosition>,
    penalty: BTreeSet<BoardPosition>,
    trivia: BTreeMap<BoardPosition, String>,
    grid_path: Vec<usize>,
    grid_cells: usize,
}

impl Default for BoardLayout {
    fn default() -> Self {
        Self::classic()
    }
}

impl BoardLayout {
    /// An empty straight board; every cell of the grid is a square.
    pub fn new(terminal: BoardPosition) -> Self {
        let squares = terminal.0 as usize + 1;
        Self {
            terminal,
            bonus: BTreeSet::new(),
            penalty: BTreeSet::new(),
            trivia: BTreeMap::new(),
            grid_path: (0..squares).collect(),
            grid_cells: squares.div_ceil(GRID_COLUMNS) * GRID_COLUMNS,
        }
    }

    pub fn classic() -> Self {
        let mut layout = Self::new(CLASSIC_TERMINAL)
            .with_bonus([6, 13])
            .with_penalty([9, 17])
            .with_trivia_zone(3, "Basic Statistics")
            .with_trivia_zone(8, "Central Tendency")
            .with_trivia_zone(12, "Probability")
            .with_trivia_zone(16, "Dispersion")
            .with_trivia_zone(20, "Correlation");
        layout.grid_path = CLASSIC_GRID_PATH.to_vec();
        layout.grid_cells = CLASSIC_GRID_CELLS;
        layout
    }

    pub fn with_bonus(mut self, squares: impl IntoIterator<Item = u32>) -> Self {
        self.bonus.extend(squares.into_iter().map(BoardPosition));
        self
    }

    pub fn with_penalty(mut self, squares: impl IntoIterator<Item = u32>) -> Self {
        self.penalty.extend(squares.into_iter().map(BoardPosition));
        self
    }

    pub fn with_trivia_zone(mut self, square: u32, name: impl Into<String>) -> Self {
        self.trivia.insert(BoardPosition(square), name.into());
        self
    }

    pub fn terminal(&self) -> BoardPosition {
        self.terminal
    }

    pub fn is_terminal(&self, position: BoardPosition) -> bool {
        position >= self.terminal
    }

    /// Where a roll from `from` ends. The token never overshoots the arrival.
    pub fn destination(&self, from: BoardPosition, roll: RollOutcome) -> BoardPosition {
        from.advanced_by(roll.value()).min(self.terminal)
    }

    /// Kind of the square, resolved in a fixed priority order:
    /// arrival, bonus, penalty, trivia zone, start, empty.
    pub fn kind_of(&self, position: BoardPosition) -> SquareKind {
        if self.is_terminal(position) {
            SquareKind::Arrival
        } else if self.bonus.contains(&position) {
            SquareKind::Bonus
        } else if self.penalty.contains(&position) {
            SquareKind::Penalty
        } else if self.trivia.contains_key(&position) {
            SquareKind::TriviaZone
        } else if position == BoardPosition::START {
            SquareKind::Start
        } else {
            SquareKind::Empty
        }
    }

    pub fn classify(&self, position: BoardPosition) -> SquareEvent {
        match self.kind_of(position) {
            SquareKind::Arrival => SquareEvent::Arrival,
            SquareKind::Bonus => SquareEvent::Bonus {
                points: BONUS_POINTS,
            },
            SquareKind::Penalty => SquareEvent::Penalty {
                points: PENALTY_POINTS,
            },
            SquareKind::TriviaZone => SquareEvent::Trivia { square: position },
            SquareKind::Start | SquareKind::Empty => SquareEvent::Nothing,
        }
    }

    pub fn zone_name(&self, position: BoardPosition) -> Option<&str> {
        self.trivia.get(&position).map(String::as_str)
    }

    /// Squares configured with more than one special kind. Only the highest
    /// priority kind takes effect on them.
    pub fn overlapping_squares(&self) -> Vec<BoardPosition> {
        self.bonus
            .iter()
            .chain(self.penalty.iter())
            .chain(self.trivia.keys())
            .copied()
            .counts()
            .into_iter()
            .filter(|(pos, count)| *count > 1 || self.is_terminal(*pos))
            .map(|(pos, _)| pos)
            .sorted()
            .collect()
    }

    pub fn squares(&self) -> impl Iterator<Item = (BoardPosition, SquareKind)> + '_ {
        (0..=self.terminal.0).map(|p| (BoardPosition(p), self.kind_of(BoardPosition(p))))
    }

    /// Grid cell the square is drawn in.
    pub fn grid_cell(&self, position: BoardPosition) -> Option<usize> {
        self.grid_path.get(position.0 as usize).copied()
    }

    /// Grid rows, each cell holding the square drawn there (if any).
    pub fn grid_rows(&self) -> Vec<Vec<Option<BoardPosition>>> {
        let mut cells = vec![None; self.grid_cells];
        for (square, cell) in self.grid_path.iter().enumerate() {
            if let Some(slot) = cells.get_mut(*cell) {
                *slot = Some(BoardPosition(square as u32));
            }
        }

        cells.chunks(GRID_COLUMNS).map(<[_]>::to_vec).collect()
    }
}
