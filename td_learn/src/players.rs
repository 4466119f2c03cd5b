use crate::board::{Board, Cell, Mark, Outcome};
use crate::error::{Error, InputError, Result};
use itertools::Itertools;
use std::io::{BufRead, Write};

const QUIT_COMMANDS: [&str; 3] = ["q", "quit", "exit"];

/// Anything that can take a seat at the board.
pub trait Player {
    fn mark(&self) -> Mark;
    /// Picks an empty cell (row-major index) for the position on `board`.
    fn select_action(&mut self, board: &Board) -> Result<usize>;
    /// Called once with the final outcome after every finished game.
    fn episode_over(&mut self, outcome: Outcome) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveInput {
    Cell(usize),
    Quit,
}

/// Parses `row,col` into a cell index that is free on `board`.
pub fn parse_move(line: &str, board: &Board) -> std::result::Result<MoveInput, InputError> {
    let line = line.trim();
    if QUIT_COMMANDS.contains(&line.to_ascii_lowercase().as_str()) {
        return Ok(MoveInput::Quit);
    }
    let format_error = || InputError::Format(line.to_owned());
    let (row, col) = line
        .split(',')
        .map(|part| part.trim().parse::<usize>())
        .collect_tuple()
        .ok_or_else(format_error)?;
    let (row, col) = row.and_then(|r| col.map(|c| (r, c))).map_err(|_| format_error())?;
    let index = Board::index_of(row, col).map_err(|_| InputError::OutOfRange { row, col })?;
    match board.get(index) {
        Some(Cell::Empty) => Ok(MoveInput::Cell(index)),
        _ => Err(InputError::Occupied { row, col }),
    }
}

/// A person at the terminal, or any line-oriented input.
#[derive(Debug)]
pub struct HumanPlayer<R, W> {
    mark: Mark,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> HumanPlayer<R, W> {
    pub fn new(mark: Mark, input: R, output: W) -> Self {
        HumanPlayer {
            mark,
            input,
            output,
        }
    }

    pub fn show(&mut self, board: &Board) -> Result<()> {
        writeln!(self.output, "{board}")?;
        Ok(())
    }
}

impl<R: BufRead, W: Write> Player for HumanPlayer<R, W> {
    fn mark(&self) -> Mark {
        self.mark
    }

    fn select_action(&mut self, board: &Board) -> Result<usize> {
        self.show(board)?;
        loop {
            write!(self.output, "Your move? ")?;
            self.output.flush()?;
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Err(Error::SessionEnded);
            }
            match parse_move(&line, board) {
                Ok(MoveInput::Cell(index)) => return Ok(index),
                Ok(MoveInput::Quit) => return Err(Error::SessionEnded),
                Err(err) => writeln!(self.output, "{err}. Please, try again.")?,
            }
        }
    }

    fn episode_over(&mut self, outcome: Outcome) -> Result<()> {
        match outcome {
            Outcome::Drawn => writeln!(self.output, "Game over! It was a draw.")?,
            Outcome::Won(mark) if mark == self.mark => {
                writeln!(self.output, "Game over! Winner: {} (you)", mark.as_char())?
            }
            Outcome::Won(mark) => {
                writeln!(self.output, "Game over! Winner: {} (computer)", mark.as_char())?
            }
            Outcome::InPlay => {}
        }
        Ok(())
    }
}
