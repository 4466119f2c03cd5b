use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use std::io;
use std::path::PathBuf;
use td_learn::config::TrainingConfig;
use td_learn::session::run_session;
use td_learn::training::Trainer;

/// Train two TD(0) agents by self-play, then play against the O agent.
#[derive(Parser, Debug)]
#[command(name = "tictactoe", about = "Learn Tic-Tac-Toe by self-play, then play the agent")]
struct Cli {
    /// Path to a TOML training configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the number of self-play episodes
    #[arg(long)]
    episodes: Option<usize>,

    /// Override how often (in episodes) performance is sampled
    #[arg(long)]
    eval_interval: Option<usize>,

    /// Override the number of sample games per side
    #[arg(long)]
    eval_games: Option<usize>,

    /// Override the learning rate
    #[arg(long)]
    alpha: Option<f64>,

    /// Override the exploration rate
    #[arg(long)]
    epsilon: Option<f64>,

    /// Override the value of a lost game
    #[arg(long, allow_hyphen_values = true)]
    loss_value: Option<f64>,

    /// Seed every agent's random source
    #[arg(long)]
    seed: Option<u64>,

    /// Skip the extra games of the O learner against a random X
    #[arg(long)]
    no_random_opponent: bool,

    /// Write the training report as JSON to this file or directory
    #[arg(long)]
    report: Option<PathBuf>,

    /// Log candidate move values, and the whole table at debug level
    #[arg(long)]
    show_values: bool,

    /// Stop after training
    #[arg(long)]
    no_play: bool,
}

impl Cli {
    fn training_config(&self) -> Result<TrainingConfig> {
        let mut config = match &self.config {
            Some(path) => TrainingConfig::load_or_default(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
            None => TrainingConfig::default(),
        };
        if let Some(episodes) = self.episodes {
            config.episodes = episodes;
        }
        if let Some(eval_interval) = self.eval_interval {
            config.eval_interval = eval_interval;
        }
        if let Some(eval_games) = self.eval_games {
            config.eval_games = eval_games;
        }
        if let Some(alpha) = self.alpha {
            config.alpha = alpha;
        }
        if let Some(epsilon) = self.epsilon {
            config.epsilon = epsilon;
        }
        if let Some(loss_value) = self.loss_value {
            config.loss_value = loss_value;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.no_random_opponent {
            config.train_against_random = false;
        }
        config.validate().context("invalid training configuration")?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let config = cli.training_config()?;
    log::debug!("training with {:?}", config);

    let mut trainer = Trainer::new(config).context("setting up the trainer")?;
    let report = trainer.run().context("training failed")?;
    if let Some(path) = &cli.report {
        let written = report
            .write_json(path)
            .with_context(|| format!("writing report to {}", path.display()))?;
        log::info!("training report written to {}", written.display());
    }
    if cli.no_play {
        return Ok(());
    }

    println!("Agent has trained. Let's play a game now.");
    let (_, mut noughts) = trainer.into_agents();
    noughts.set_verbose(cli.show_values);
    if cli.show_values && log::log_enabled!(log::Level::Debug) {
        for (key, value) in noughts.value_snapshot() {
            log::debug!("state {key} valued {value:.3}\n{}", key.to_board());
        }
    }
    run_session(&mut noughts, io::stdin().lock(), io::stdout()).context("interactive session")?;
    Ok(())
}
