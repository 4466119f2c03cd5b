//! Exhaustive generation of the positions a player has to decide in.
//!
//! Every cell is given every value in row-major order, so the walk also
//! yields some boards that alternating play never reaches. They are harmless
//! extra table entries. A subtree is cut as soon as the cells assigned so far
//! already contain a completed line.

use crate::board::{Board, Cell, Mark, CELLS};

/// Calls `visit` once for every full assignment where `target` is next to act.
pub fn for_each_decision_state<F>(target: Mark, mut visit: F)
where
    F: FnMut(&Board),
{
    let mut board = Board::new();
    assign(&mut board, 0, target, &mut visit);
}

pub fn decision_states(target: Mark) -> Vec<Board> {
    let mut states = Vec::new();
    for_each_decision_state(target, |board| states.push(board.clone()));
    states
}

fn assign<F>(board: &mut Board, index: usize, target: Mark, visit: &mut F)
where
    F: FnMut(&Board),
{
    if index == CELLS {
        if matches!(board.next_to_act(), Ok(mark) if mark == target) {
            visit(board);
        }
        return;
    }
    if board.terminal_outcome().winner().is_some() {
        return;
    }
    for cell in [Cell::Empty, Cell::Taken(Mark::X), Cell::Taken(Mark::O)] {
        board.set(index, cell);
        assign(board, index + 1, target, visit);
    }
    board.set(index, Cell::Empty);
}
