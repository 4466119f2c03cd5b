//! Tabular TD(0) agent with an epsilon-greedy policy over afterstates.
//!
//! The agent values the board it leaves behind after its own move. When it
//! exploits, it first backs its previous afterstate up toward the best value
//! it can reach now, then remembers the new afterstate. At the end of an
//! episode the last afterstate is backed up toward the true outcome.

use crate::board::{render_grid, Board, Cell, Mark, Outcome, StateKey, CELLS};
use crate::config::AgentConfig;
use crate::enumerate;
use crate::error::{Error, Result};
use crate::players::Player;
use crate::value_table::ValueTable;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone)]
pub struct TdAgent {
    mark: Mark,
    config: AgentConfig,
    values: ValueTable,
    verbose: bool,
    prev_state: Option<StateKey>,
    prev_score: f64,
    rng: StdRng,
}

impl TdAgent {
    /// Seeds the table with the positions where `mark` has to decide. Moves
    /// are valued on the afterstates, which `lookup` registers as they come.
    pub fn new(mark: Mark, config: AgentConfig) -> Self {
        let mut agent = TdAgent {
            mark,
            config,
            values: ValueTable::new(),
            verbose: false,
            prev_state: None,
            prev_score: 0.0,
            rng: StdRng::from_entropy(),
        };
        enumerate::for_each_decision_state(mark, |board| agent.register_state(board));
        agent
    }

    /// A uniformly random, non-learning opponent.
    pub fn random(mark: Mark) -> Self {
        Self::new(mark, AgentConfig::random())
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn config(&self) -> AgentConfig {
        self.config
    }
    pub fn epsilon(&self) -> f64 {
        self.config.epsilon
    }
    pub fn set_epsilon(&mut self, epsilon: f64) {
        self.config.epsilon = epsilon;
    }
    pub fn is_learning(&self) -> bool {
        self.config.learning
    }
    pub fn set_learning(&mut self, learning: bool) {
        self.config.learning = learning;
    }
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    pub fn values(&self) -> &ValueTable {
        &self.values
    }

    /// Every known state and its value, ordered by key.
    pub fn value_snapshot(&self) -> Vec<(StateKey, f64)> {
        self.values.sorted()
    }

    /// Terminal value of `outcome` from this agent's point of view.
    pub fn value_of(&self, outcome: Outcome) -> f64 {
        outcome_value(self.mark, self.config.loss_value, outcome)
    }

    pub fn register_state(&mut self, board: &Board) {
        let value = self.value_of(board.terminal_outcome());
        self.values.insert(board.key(), value);
    }

    /// Value of `board`, registering it first if it was never seen.
    pub fn lookup(&mut self, board: &Board) -> f64 {
        let (mark, loss_value) = (self.mark, self.config.loss_value);
        self.values.get_or_insert_with(board.key(), || {
            outcome_value(mark, loss_value, board.terminal_outcome())
        })
    }

    /// TD(0): moves the previous afterstate toward `target`.
    pub fn backup(&mut self, target: f64) {
        if let Some(prev) = self.prev_state {
            if self.config.learning {
                self.values
                    .adjust(prev, self.config.alpha * (target - self.prev_score));
            }
        }
    }

    fn explore(&mut self, empty: &[usize]) -> Result<usize> {
        let mv = *empty.choose(&mut self.rng).ok_or(Error::NoValidMoves)?;
        log::trace!("{:?} explores cell {}", self.mark, mv);
        Ok(mv)
    }

    fn exploit(&mut self, board: &Board, empty: &[usize]) -> Result<usize> {
        let mut scratch = board.clone();
        let mut best: Option<(usize, f64)> = None;
        let mut lookahead = [None; CELLS];
        for &index in empty {
            scratch.place(index, self.mark)?;
            let value = self.lookup(&scratch);
            scratch.clear(index);
            lookahead[index] = Some(value);
            if best.map_or(true, |(_, max)| value > max) {
                best = Some((index, value));
            }
        }
        let (mv, max) = best.ok_or(Error::NoValidMoves)?;
        if self.verbose {
            log::info!("{:?} lookahead:\n{}", self.mark, render_lookahead(board, &lookahead));
        }
        log::trace!(
            "{:?} exploits cell {:?} valued {:.3}",
            self.mark,
            Board::coords_of(mv),
            max
        );
        self.backup(max);
        Ok(mv)
    }

    fn remember(&mut self, board: &Board, mv: usize) -> Result<()> {
        let mut after = board.clone();
        after.place(mv, self.mark)?;
        self.prev_state = Some(after.key());
        self.prev_score = self.lookup(&after);
        Ok(())
    }
}

fn outcome_value(own: Mark, loss_value: f64, outcome: Outcome) -> f64 {
    match outcome {
        Outcome::Won(mark) if mark == own => 1.0,
        Outcome::Won(_) => loss_value,
        Outcome::InPlay => 0.5,
        Outcome::Drawn => 0.0,
    }
}

impl Player for TdAgent {
    fn mark(&self) -> Mark {
        self.mark
    }

    fn select_action(&mut self, board: &Board) -> Result<usize> {
        let empty = board.empty_cells();
        if empty.is_empty() {
            return Err(Error::NoValidMoves);
        }
        let explore = self.config.epsilon > 0.0 && self.rng.gen::<f64>() < self.config.epsilon;
        let mv = if explore {
            self.explore(&empty)?
        } else {
            self.exploit(board, &empty)?
        };
        self.remember(board, mv)?;
        Ok(mv)
    }

    fn episode_over(&mut self, outcome: Outcome) -> Result<()> {
        self.backup(self.value_of(outcome));
        self.prev_state = None;
        self.prev_score = 0.0;
        Ok(())
    }
}

/// The board with each candidate cell showing the value of moving there.
pub fn render_lookahead(board: &Board, lookahead: &[Option<f64>; CELLS]) -> String {
    let labels: Vec<String> = board
        .cells()
        .zip(lookahead)
        .map(|(cell, value)| match (cell, value) {
            (Cell::Empty, Some(value)) => format!("{value:.3}"),
            (cell, _) => cell.as_char().to_string(),
        })
        .collect();
    render_grid(&labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn greedy(mark: Mark) -> TdAgent {
        TdAgent::new(
            mark,
            AgentConfig {
                epsilon: 0.0,
                ..AgentConfig::default()
            },
        )
        .with_seed(11)
    }

    #[test]
    fn is_value_of_working() {
        let agent = TdAgent::new(
            Mark::O,
            AgentConfig {
                loss_value: -1.0,
                ..AgentConfig::default()
            },
        );
        assert_eq!(agent.value_of(Outcome::Won(Mark::O)), 1.0);
        assert_eq!(agent.value_of(Outcome::Won(Mark::X)), -1.0);
        assert_eq!(agent.value_of(Outcome::Drawn), 0.0);
        assert_eq!(agent.value_of(Outcome::InPlay), 0.5);
    }

    #[test]
    fn is_table_seeded_from_enumeration() {
        let agent = greedy(Mark::X);
        assert_eq!(agent.values().len(), enumerate::decision_states(Mark::X).len());
        assert_eq!(agent.values()[&Board::new().key()], 0.5);
    }

    #[test]
    fn is_lookup_lazily_registering() {
        let mut agent = greedy(Mark::O);
        let mut board = Board::new();
        board.place(0, Mark::X).unwrap();
        board.place(4, Mark::O).unwrap();
        let key = board.key();
        assert!(!agent.values().contains_key(&key));
        let first = agent.lookup(&board);
        assert!(agent.values().contains_key(&key));
        assert_eq!(first, 0.5);
        assert_eq!(agent.lookup(&board), first);

        for (index, mark) in [(3, Mark::X), (5, Mark::O), (6, Mark::X)] {
            board.place(index, mark).unwrap();
        }
        assert_eq!(board.terminal_outcome(), Outcome::Won(Mark::X));
        assert_eq!(agent.lookup(&board), agent.config().loss_value);
        agent.values.adjust(board.key(), 0.25);
        assert_eq!(agent.lookup(&board), agent.config().loss_value + 0.25);
    }

    #[test]
    fn is_greedy_taking_the_win() {
        let mut agent = greedy(Mark::X);
        let mut board = Board::new();
        for (index, mark) in [(0, Mark::X), (1, Mark::O), (3, Mark::X), (4, Mark::O)] {
            board.place(index, mark).unwrap();
        }
        assert_eq!(agent.select_action(&board).unwrap(), 6);
    }

    #[test]
    fn is_greedy_tie_broken_by_first_cell() {
        let mut agent = greedy(Mark::X);
        assert_eq!(agent.select_action(&Board::new()).unwrap(), 0);
    }

    #[test]
    fn is_greedy_choice_deterministic() {
        let mut first = greedy(Mark::O).with_seed(1);
        let mut second = greedy(Mark::O).with_seed(2);
        let mut board = Board::new();
        board.place(4, Mark::X).unwrap();
        let mv = first.select_action(&board).unwrap();
        assert_eq!(second.select_action(&board).unwrap(), mv);
        first.episode_over(Outcome::InPlay).unwrap();
        assert_eq!(first.select_action(&board).unwrap(), mv);
    }

    #[test]
    fn is_random_agent_picking_empty_cells() {
        let mut agent = TdAgent::random(Mark::O).with_seed(5);
        let mut board = Board::new();
        for (index, mark) in [(0, Mark::X), (1, Mark::O), (2, Mark::X)] {
            board.place(index, mark).unwrap();
        }
        for _ in 0..50 {
            let mv = agent.select_action(&board).unwrap();
            assert!(board.empty_cells().contains(&mv));
        }
        let before = agent.value_snapshot();
        agent.episode_over(Outcome::Won(Mark::X)).unwrap();
        assert_eq!(agent.value_snapshot(), before);
    }

    #[test]
    fn is_terminal_backup_working() {
        let mut agent = TdAgent::new(
            Mark::X,
            AgentConfig {
                alpha: 0.5,
                epsilon: 0.0,
                loss_value: -1.0,
                learning: true,
            },
        );
        let mv = agent.select_action(&Board::new()).unwrap();
        let mut after = Board::new();
        after.place(mv, Mark::X).unwrap();
        assert_eq!(agent.lookup(&after), 0.5);

        agent.episode_over(Outcome::Won(Mark::O)).unwrap();
        // 0.5 + 0.5 * (-1.0 - 0.5)
        assert_eq!(agent.lookup(&after), -0.25);

        // Transient state is gone, so a second notification changes nothing.
        agent.episode_over(Outcome::Won(Mark::X)).unwrap();
        assert_eq!(agent.lookup(&after), -0.25);
    }

    #[test]
    fn is_exploitation_backup_working() {
        let mut agent = TdAgent::new(
            Mark::X,
            AgentConfig {
                alpha: 1.0,
                epsilon: 0.0,
                loss_value: 0.0,
                learning: true,
            },
        );
        let mut board = Board::new();
        let first = agent.select_action(&board).unwrap();
        board.place(first, Mark::X).unwrap();
        let first_key = board.key();
        board.place(3, Mark::O).unwrap();
        let second = agent.select_action(&board).unwrap();
        assert_eq!(second, 1);
        // Best reachable value is still 0.5, so the estimate does not move.
        assert_eq!(agent.values()[&first_key], 0.5);

        board.place(second, Mark::X).unwrap();
        board.place(4, Mark::O).unwrap();
        // X can now complete the top row: the previous afterstate is pulled
        // up to the winning value.
        let third = agent.select_action(&board).unwrap();
        assert_eq!(third, 2);
        let mut second_after = Board::new();
        for (index, mark) in [(0, Mark::X), (3, Mark::O), (1, Mark::X)] {
            second_after.place(index, mark).unwrap();
        }
        assert_eq!(agent.values()[&second_after.key()], 1.0);
    }

    #[test]
    fn is_frozen_agent_not_learning() {
        let mut agent = greedy(Mark::X);
        agent.set_learning(false);
        let before = agent.value_snapshot();
        let mv = agent.select_action(&Board::new()).unwrap();
        assert_eq!(mv, 0);
        agent.episode_over(Outcome::Won(Mark::O)).unwrap();
        let after = agent.value_snapshot();
        // Only lazily registered afterstates may appear.
        assert!(before.iter().all(|entry| after.contains(entry)));
    }

    #[test]
    fn is_lookahead_rendering_working() {
        let mut board = Board::new();
        board.place(0, Mark::X).unwrap();
        let mut lookahead = [None; CELLS];
        lookahead[1] = Some(0.5);
        lookahead[8] = Some(-1.0);
        let drawn = render_lookahead(&board, &lookahead);
        assert!(drawn.contains("0.500"));
        assert!(drawn.contains("-1.000"));
        assert!(drawn.contains('X'));
    }
}
