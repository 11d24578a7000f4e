use std::fmt::Debug;
use std::time::Instant;

use anyhow::Result;
use log::info;
use rand::thread_rng;

use engine::{GameEngine, GameState};
use self_play::{play_self_one, SelfPlayOptions};

use super::{Trainer, WeightSink};

/// Plays games with the trainer's current network and feeds each one straight back into the
/// trainer. Runs `games` games, or forever when `None`.
pub fn self_learn<E, W>(
    game_engine: &E,
    trainer: &mut Trainer<W>,
    self_play_options: &SelfPlayOptions,
    games: Option<usize>,
) -> Result<()>
where
    E: GameEngine + Sync,
    E::State: GameState + Sync,
    E::Action: Clone + Debug + Send,
    W: WeightSink,
{
    let starting_run_time = Instant::now();
    let mut rng = thread_rng();
    let mut num_of_games_played: usize = 0;

    while games.map_or(true, |games| num_of_games_played < games) {
        let game = play_self_one(game_engine, trainer.network(), self_play_options, &mut rng)?;
        let plies = game.plies;
        let result = game.result;

        let loss = trainer.add_game(game.into_triplets())?;
        num_of_games_played += 1;

        info!(
            "Version: {}, Plies: {}, Result: {}, Loss: {}, Elapsed: {:.2}m, Number of Games Played: {}",
            trainer.network().version(),
            plies,
            result,
            loss.map_or_else(|| "n/a".to_string(), |l| format!("{:.4}", l)),
            starting_run_time.elapsed().as_secs_f32() / 60.0,
            num_of_games_played
        );
    }

    Ok(())
}
