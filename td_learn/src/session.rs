//! Human-versus-agent games on a line-oriented terminal.

use crate::agent::TdAgent;
use crate::board::Mark;
use crate::error::{Error, Result};
use crate::players::{HumanPlayer, Player};
use crate::training::MatchStats;
use crate::play_game;
use std::io::{BufRead, Write};

/// Keeps starting new games against `agent` until the human quits or the
/// input runs dry. Returns the human's score.
pub fn run_session<R, W>(agent: &mut TdAgent, mut input: R, mut output: W) -> Result<MatchStats>
where
    R: BufRead,
    W: Write,
{
    let human_mark = agent.mark().other();
    writeln!(
        output,
        "[ You: {} and AI: {}    Input guide: 0,0 is the top left cell and 2,2 the bottom right. Type q to quit. ]",
        human_mark.as_char(),
        agent.mark().as_char()
    )?;
    log::info!("interactive session started");
    let mut score = MatchStats::default();
    loop {
        let mut human = HumanPlayer::new(human_mark, &mut input, &mut output);
        let played = match human_mark {
            Mark::X => play_game(&mut human, agent),
            Mark::O => play_game(agent, &mut human),
        };
        let game = match played {
            Ok(game) => game,
            Err(Error::SessionEnded) => break,
            Err(err) => return Err(err),
        };
        human.show(&game.board)?;
        human.episode_over(game.outcome)?;
        agent.episode_over(game.outcome)?;
        score.record(game.outcome, human_mark);
        log::debug!("game finished: {:?} after moves {:?}", game.outcome, game.moves);
    }
    writeln!(
        output,
        "\nThanks for playing! You won {}, lost {} and drew {}.",
        score.wins, score.losses, score.draws
    )?;
    log::info!("interactive session finished after {} games", score.games());
    Ok(score)
}
