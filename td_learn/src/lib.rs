//! Tic-Tac-Toe agents that learn afterstate values with TD(0).

use crate::board::CELLS;

pub mod agent;
pub mod board;
pub mod config;
pub mod enumerate;
pub mod error;
pub mod players;
pub mod session;
pub mod training;
pub mod value_table;

pub use agent::TdAgent;
pub use board::{Board, Cell, Mark, Outcome, StateKey};
pub use error::{Error, Result};
pub use players::{HumanPlayer, Player};

/// A finished (or fully played out) game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRecord {
    pub board: Board,
    pub moves: Vec<usize>,
    pub outcome: Outcome,
}

/// Plays one game: `first` places X on even turns, `second` places O on odd
/// turns. The runner, not the players, commits every move.
pub fn play_game<A, B>(first: &mut A, second: &mut B) -> Result<GameRecord>
where
    A: Player + ?Sized,
    B: Player + ?Sized,
{
    check_seat(first.mark(), Mark::X)?;
    check_seat(second.mark(), Mark::O)?;
    let mut board = Board::new();
    let mut moves = Vec::with_capacity(CELLS);
    let mut outcome = Outcome::InPlay;
    for turn in 0..CELLS {
        let mark = Mark::for_turn(turn);
        check_turn(&board, mark)?;
        let mv = if turn % 2 == 0 {
            first.select_action(&board)?
        } else {
            second.select_action(&board)?
        };
        board.place(mv, mark).map_err(|err| {
            log::error!("{:?} chose an illegal cell {}: {}", mark, mv, err);
            err
        })?;
        moves.push(mv);
        outcome = board.terminal_outcome();
        if outcome.is_terminal() {
            break;
        }
    }
    Ok(GameRecord {
        board,
        moves,
        outcome,
    })
}

pub fn play<A, B>(first: &mut A, second: &mut B) -> Result<Outcome>
where
    A: Player + ?Sized,
    B: Player + ?Sized,
{
    Ok(play_game(first, second)?.outcome)
}

/// Plays a game and tells both players how it ended.
pub fn play_episode<A, B>(first: &mut A, second: &mut B) -> Result<Outcome>
where
    A: Player + ?Sized,
    B: Player + ?Sized,
{
    let outcome = play(first, second)?;
    first.episode_over(outcome)?;
    second.episode_over(outcome)?;
    Ok(outcome)
}

fn check_seat(found: Mark, expected: Mark) -> Result<()> {
    if found != expected {
        log::error!("player with mark {:?} seated as {:?}", found, expected);
        return Err(Error::TurnParity { expected, found });
    }
    Ok(())
}

fn check_turn(board: &Board, expected: Mark) -> Result<()> {
    match board.next_to_act() {
        Ok(found) if found == expected => Ok(()),
        Ok(found) => {
            log::error!("turn parity broken on board {}:\n{}", board.key(), board);
            Err(Error::TurnParity { expected, found })
        }
        Err(err) => {
            log::error!("board {} is unreachable: {}\n{}", board.key(), err, board);
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AgentConfig;

    /// Plays a fixed list of cells and records what it was told.
    struct Scripted {
        mark: Mark,
        moves: Vec<usize>,
        outcomes: Vec<Outcome>,
    }

    impl Scripted {
        fn new(mark: Mark, moves: &[usize]) -> Self {
            Scripted {
                mark,
                moves: moves.iter().rev().copied().collect(),
                outcomes: Vec::new(),
            }
        }
    }

    impl Player for Scripted {
        fn mark(&self) -> Mark {
            self.mark
        }
        fn select_action(&mut self, _board: &Board) -> Result<usize> {
            self.moves.pop().ok_or(Error::NoValidMoves)
        }
        fn episode_over(&mut self, outcome: Outcome) -> Result<()> {
            self.outcomes.push(outcome);
            Ok(())
        }
    }

    #[test]
    fn is_game_working() {
        // (0,0) X, (0,1) O, (1,1) X, (1,0) O, (2,2) X
        let mut crosses = Scripted::new(Mark::X, &[0, 4, 8]);
        let mut noughts = Scripted::new(Mark::O, &[1, 3]);
        let game = play_game(&mut crosses, &mut noughts).unwrap();
        assert_eq!(game.outcome, Outcome::Won(Mark::X));
        assert_eq!(game.moves, vec![0, 1, 4, 3, 8]);
        assert_eq!(game.board.counts(), (3, 2));
    }

    #[test]
    fn is_drawn_game_played_out() {
        let mut crosses = Scripted::new(Mark::X, &[0, 2, 3, 7, 8]);
        let mut noughts = Scripted::new(Mark::O, &[1, 4, 5, 6]);
        let outcome = play_episode(&mut crosses, &mut noughts).unwrap();
        assert_eq!(outcome, Outcome::Drawn);
        assert_eq!(crosses.outcomes, vec![Outcome::Drawn]);
        assert_eq!(noughts.outcomes, vec![Outcome::Drawn]);
    }

    #[test]
    fn is_illegal_move_rejected() {
        let mut crosses = Scripted::new(Mark::X, &[0, 4]);
        let mut noughts = Scripted::new(Mark::O, &[0]);
        assert!(matches!(
            play(&mut crosses, &mut noughts),
            Err(Error::CellOccupied { position: 0 })
        ));
        let mut crosses = Scripted::new(Mark::X, &[12]);
        assert!(matches!(
            play(&mut crosses, &mut noughts),
            Err(Error::InvalidPosition { position: 12 })
        ));
    }

    #[test]
    fn is_wrong_seating_rejected() {
        let mut crosses = Scripted::new(Mark::X, &[0]);
        let mut noughts = Scripted::new(Mark::O, &[1]);
        assert!(matches!(
            play(&mut noughts, &mut crosses),
            Err(Error::TurnParity {
                expected: Mark::X,
                found: Mark::O
            })
        ));
    }

    #[test]
    fn is_turn_check_catching_bad_boards() {
        let mut board = Board::new();
        board.place(0, Mark::X).unwrap();
        assert!(check_turn(&board, Mark::O).is_ok());
        assert!(matches!(
            check_turn(&board, Mark::X),
            Err(Error::TurnParity { .. })
        ));
        board.place(1, Mark::X).unwrap();
        assert!(matches!(
            check_turn(&board, Mark::O),
            Err(Error::InvalidPieceCounts { .. })
        ));
    }

    #[test]
    fn is_agent_game_legal() {
        let mut crosses = TdAgent::random(Mark::X).with_seed(3);
        let mut noughts = TdAgent::new(Mark::O, AgentConfig::default()).with_seed(4);
        for _ in 0..20 {
            let game = play_game(&mut crosses, &mut noughts).unwrap();
            assert!(game.outcome.is_terminal());
            assert_eq!(game.board.terminal_outcome(), game.outcome);
            crosses.episode_over(game.outcome).unwrap();
            noughts.episode_over(game.outcome).unwrap();
        }
    }
}
