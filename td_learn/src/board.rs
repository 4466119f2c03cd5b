use crate::error::{Error, Result};
use itertools::Itertools;
use ndarray::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const SIZE: usize = 3;
pub const CELLS: usize = SIZE * SIZE;

const BORDER: &str = "----------------------------";
const DIVIDER: &str = "|--------------------------|";

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Mark {
    X,
    O,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum Cell {
    #[default]
    Empty,
    Taken(Mark),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    InPlay,
    Won(Mark),
    Drawn,
}

/// Base-3 packing of the nine cells in row-major order, first cell most
/// significant. 0 = empty, 1 = X, 2 = O.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct StateKey(u16);

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Board {
    cells: Array2<Cell>,
}

impl Mark {
    pub fn other(self) -> Self {
        match self {
            Self::X => Mark::O,
            Self::O => Mark::X,
        }
    }
    pub fn as_char(self) -> char {
        match self {
            Self::X => 'X',
            Self::O => 'O',
        }
    }
    /// Mark placed on the given 0-based turn.
    pub fn for_turn(turn: usize) -> Self {
        if turn % 2 == 0 {
            Mark::X
        } else {
            Mark::O
        }
    }
}

impl Cell {
    pub fn as_char(self) -> char {
        match self {
            Self::Empty => ' ',
            Self::Taken(mark) => mark.as_char(),
        }
    }
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }
    pub fn swapped(self) -> Self {
        match self {
            Self::Empty => Cell::Empty,
            Self::Taken(mark) => Cell::Taken(mark.other()),
        }
    }
    fn digit(self) -> u16 {
        match self {
            Self::Empty => 0,
            Self::Taken(Mark::X) => 1,
            Self::Taken(Mark::O) => 2,
        }
    }
    fn from_digit(digit: u16) -> Self {
        match digit {
            1 => Cell::Taken(Mark::X),
            2 => Cell::Taken(Mark::O),
            _ => Cell::Empty,
        }
    }
}

impl From<Mark> for Cell {
    fn from(mark: Mark) -> Self {
        Cell::Taken(mark)
    }
}

impl Outcome {
    pub fn is_terminal(self) -> bool {
        self != Outcome::InPlay
    }
    pub fn winner(self) -> Option<Mark> {
        match self {
            Self::Won(mark) => Some(mark),
            _ => None,
        }
    }
    pub fn swapped(self) -> Self {
        match self {
            Self::Won(mark) => Outcome::Won(mark.other()),
            other => other,
        }
    }
}

impl StateKey {
    pub fn value(self) -> u16 {
        self.0
    }
    pub fn to_board(self) -> Board {
        Board::from_key(self)
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        Board {
            cells: Array::from_elem((SIZE, SIZE), Cell::Empty),
        }
    }

    pub fn from_cells(cells: [Cell; CELLS]) -> Self {
        Board {
            cells: Array::from_shape_fn((SIZE, SIZE), |(r, c)| cells[r * SIZE + c]),
        }
    }

    pub fn from_key(key: StateKey) -> Self {
        let mut rest = key.0;
        let mut cells = [Cell::Empty; CELLS];
        for slot in cells.iter_mut().rev() {
            *slot = Cell::from_digit(rest % 3);
            rest /= 3;
        }
        Self::from_cells(cells)
    }

    /// Converts a `(row, col)` pair to a row-major cell index.
    pub fn index_of(row: usize, col: usize) -> Result<usize> {
        if row >= SIZE || col >= SIZE {
            return Err(Error::InvalidCoords { row, col });
        }
        Ok(row * SIZE + col)
    }

    pub fn coords_of(index: usize) -> (usize, usize) {
        (index / SIZE, index % SIZE)
    }

    pub fn get(&self, index: usize) -> Option<Cell> {
        if index >= CELLS {
            return None;
        }
        Some(self.cells[[index / SIZE, index % SIZE]])
    }

    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells.iter().copied()
    }

    pub(crate) fn set(&mut self, index: usize, cell: Cell) {
        self.cells[[index / SIZE, index % SIZE]] = cell;
    }

    pub fn place(&mut self, index: usize, mark: Mark) -> Result<()> {
        match self.get(index) {
            None => Err(Error::InvalidPosition { position: index }),
            Some(Cell::Taken(_)) => Err(Error::CellOccupied { position: index }),
            Some(Cell::Empty) => {
                self.set(index, Cell::Taken(mark));
                Ok(())
            }
        }
    }

    pub fn clear(&mut self, index: usize) {
        if index < CELLS {
            self.set(index, Cell::Empty);
        }
    }

    pub fn empty_cells(&self) -> Vec<usize> {
        self.cells()
            .enumerate()
            .filter(|(_, cell)| cell.is_empty())
            .map(|(index, _)| index)
            .collect()
    }

    pub fn is_full(&self) -> bool {
        self.cells().all(|cell| !cell.is_empty())
    }

    pub fn counts(&self) -> (usize, usize) {
        self.cells().fold((0, 0), |(x, o), cell| match cell {
            Cell::Taken(Mark::X) => (x + 1, o),
            Cell::Taken(Mark::O) => (x, o + 1),
            Cell::Empty => (x, o),
        })
    }

    /// Whose move it is, judged from the piece counts alone.
    pub fn next_to_act(&self) -> Result<Mark> {
        let (x_count, o_count) = self.counts();
        if x_count == o_count {
            Ok(Mark::X)
        } else if x_count == o_count + 1 {
            Ok(Mark::O)
        } else {
            Err(Error::InvalidPieceCounts { x_count, o_count })
        }
    }

    /// Rows and columns are scanned pairwise, then both diagonals; the
    /// first aligned line wins.
    pub fn terminal_outcome(&self) -> Outcome {
        for i in 0..SIZE {
            if let Some(mark) = line_owner(self.cells.row(i).iter()) {
                return Outcome::Won(mark);
            }
            if let Some(mark) = line_owner(self.cells.column(i).iter()) {
                return Outcome::Won(mark);
            }
        }
        if let Some(mark) = line_owner(self.cells.diag().iter()) {
            return Outcome::Won(mark);
        }
        let anti = (0..SIZE).map(|i| &self.cells[[i, SIZE - 1 - i]]);
        if let Some(mark) = line_owner(anti) {
            return Outcome::Won(mark);
        }
        if self.is_full() {
            Outcome::Drawn
        } else {
            Outcome::InPlay
        }
    }

    pub fn key(&self) -> StateKey {
        StateKey(self.cells().fold(0, |acc, cell| acc * 3 + cell.digit()))
    }

    /// The same position with every X and O exchanged.
    pub fn swapped(&self) -> Self {
        Board {
            cells: self.cells.mapv(Cell::swapped),
        }
    }
}

fn line_owner<'a>(mut line: impl Iterator<Item = &'a Cell>) -> Option<Mark> {
    let first = *line.next()?;
    match first {
        Cell::Taken(mark) if line.all(|cell| *cell == first) => Some(mark),
        _ => None,
    }
}

/// Lays out nine labels on the ASCII grid, centred in six columns each.
pub fn render_grid<S: AsRef<str>>(labels: &[S]) -> String {
    let rows = labels
        .iter()
        .map(|label| format!("{:^6}", label.as_ref()))
        .tuples::<(_, _, _)>()
        .map(|(a, b, c)| format!("| {a} | {b} | {c} |"))
        .join(&format!("\n{DIVIDER}\n"));
    format!("{BORDER}\n{rows}\n{BORDER}")
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let labels: Vec<String> = self.cells().map(|cell| cell.as_char().to_string()).collect();
        write!(f, "{}", render_grid(&labels))
    }
}
