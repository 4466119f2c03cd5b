use crate::agent::TdAgent;
use crate::board::{Mark, Outcome};
use crate::config::TrainingConfig;
use crate::error::Result;
use crate::play_episode;
use crate::players::Player;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Win/loss/draw tally from one side's point of view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MatchStats {
    pub wins: usize,
    pub losses: usize,
    pub draws: usize,
}

impl MatchStats {
    pub fn record(&mut self, outcome: Outcome, side: Mark) {
        match outcome {
            Outcome::Won(mark) if mark == side => self.wins += 1,
            Outcome::Won(_) => self.losses += 1,
            Outcome::Drawn => self.draws += 1,
            Outcome::InPlay => {}
        }
    }
    pub fn games(&self) -> usize {
        self.wins + self.losses + self.draws
    }
    fn fraction(&self, count: usize) -> f64 {
        if self.games() == 0 {
            0.0
        } else {
            count as f64 / self.games() as f64
        }
    }
    pub fn win_rate(&self) -> f64 {
        self.fraction(self.wins)
    }
    pub fn loss_rate(&self) -> f64 {
        self.fraction(self.losses)
    }
    pub fn draw_rate(&self) -> f64 {
        self.fraction(self.draws)
    }
}

impl fmt::Display for MatchStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "win {:.2} / loss {:.2} / draw {:.2}",
            self.win_rate(),
            self.loss_rate(),
            self.draw_rate()
        )
    }
}

/// Performance of both learners against random opponents at one point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub episode: usize,
    pub as_x: MatchStats,
    pub as_o: MatchStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    pub episodes: usize,
    pub config: TrainingConfig,
    pub evaluations: Vec<Evaluation>,
}

impl TrainingReport {
    pub fn last_evaluation(&self) -> Option<&Evaluation> {
        self.evaluations.last()
    }

    /// Writes the report as JSON. A directory gets a dated file name.
    pub fn write_json(&self, path: &Path) -> Result<PathBuf> {
        let target = if path.is_dir() {
            let today = self.finished_at.date_naive();
            path.join(format!("training-report-{today}.json"))
        } else {
            path.to_path_buf()
        };
        let mut file = File::create(&target)?;
        file.write_all(serde_json::to_string_pretty(self)?.as_bytes())?;
        Ok(target)
    }
}

/// Plays `agent` greedily and without learning against `opponent`, then
/// puts its exploration and learning settings back.
pub fn evaluate_against(
    agent: &mut TdAgent,
    opponent: &mut TdAgent,
    games: usize,
) -> Result<MatchStats> {
    let saved = agent.config();
    agent.set_epsilon(0.0);
    agent.set_learning(false);
    let result = tally(agent, opponent, games);
    agent.set_epsilon(saved.epsilon);
    agent.set_learning(saved.learning);
    result
}

fn tally(agent: &mut TdAgent, opponent: &mut TdAgent, games: usize) -> Result<MatchStats> {
    let side = agent.mark();
    let mut stats = MatchStats::default();
    for _ in 0..games {
        let outcome = match side {
            Mark::X => play_episode(agent, opponent)?,
            Mark::O => play_episode(opponent, agent)?,
        };
        stats.record(outcome, side);
    }
    Ok(stats)
}

/// Self-play trainer for one X learner and one O learner.
pub struct Trainer {
    config: TrainingConfig,
    crosses: TdAgent,
    noughts: TdAgent,
    random_crosses: TdAgent,
    random_noughts: TdAgent,
    episode: usize,
}

impl Trainer {
    pub fn new(config: TrainingConfig) -> Result<Self> {
        config.validate()?;
        let seeded = |agent: TdAgent, slot: u64| match config.seed_for(slot) {
            Some(seed) => agent.with_seed(seed),
            None => agent,
        };
        let crosses = seeded(TdAgent::new(Mark::X, config.learner()), 0);
        let noughts = seeded(TdAgent::new(Mark::O, config.learner()), 1);
        let random_crosses = seeded(TdAgent::random(Mark::X), 2);
        let random_noughts = seeded(TdAgent::random(Mark::O), 3);
        Ok(Trainer {
            config,
            crosses,
            noughts,
            random_crosses,
            random_noughts,
            episode: 0,
        })
    }

    pub fn episode(&self) -> usize {
        self.episode
    }
    pub fn crosses(&self) -> &TdAgent {
        &self.crosses
    }
    pub fn noughts(&self) -> &TdAgent {
        &self.noughts
    }
    pub fn into_agents(self) -> (TdAgent, TdAgent) {
        (self.crosses, self.noughts)
    }

    /// One self-play game, plus a game of the O learner against a random X
    /// when `train_against_random` is set. Returns the self-play outcome.
    pub fn train_episode(&mut self) -> Result<Outcome> {
        let outcome = play_episode(&mut self.crosses, &mut self.noughts)?;
        if self.config.train_against_random {
            play_episode(&mut self.random_crosses, &mut self.noughts)?;
        }
        self.episode += 1;
        Ok(outcome)
    }

    pub fn evaluate(&mut self) -> Result<Evaluation> {
        let games = self.config.eval_games;
        let as_x = evaluate_against(&mut self.crosses, &mut self.random_noughts, games)?;
        let as_o = evaluate_against(&mut self.noughts, &mut self.random_crosses, games)?;
        Ok(Evaluation {
            episode: self.episode,
            as_x,
            as_o,
        })
    }

    fn evaluate_and_log(&mut self) -> Result<Evaluation> {
        let evaluation = self.evaluate()?;
        log::info!(
            "Self played {} games | X vs random: {} | O vs random: {}",
            evaluation.episode,
            evaluation.as_x,
            evaluation.as_o
        );
        Ok(evaluation)
    }

    /// Trains until `episodes` games have been self-played, sampling
    /// performance every `eval_interval` games and once at the end.
    pub fn run(&mut self) -> Result<TrainingReport> {
        let started_at = Local::now();
        log::info!(
            "Training agents by self playing {} games. Please wait.",
            self.config.episodes
        );
        let mut evaluations = Vec::new();
        while self.episode < self.config.episodes {
            if self.episode % self.config.eval_interval == 0 {
                evaluations.push(self.evaluate_and_log()?);
            }
            self.train_episode()?;
        }
        evaluations.push(self.evaluate_and_log()?);
        log::info!(
            "Agents have trained; value tables hold {} (X) and {} (O) states",
            self.crosses.values().len(),
            self.noughts.values().len()
        );
        Ok(TrainingReport {
            started_at,
            finished_at: Local::now(),
            episodes: self.episode,
            config: self.config.clone(),
            evaluations,
        })
    }
}
