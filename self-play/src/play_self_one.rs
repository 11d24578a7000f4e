use anyhow::{anyhow, Result};
use log::{debug, info};
use rand::Rng;
use std::fmt::Debug;

use engine::{GameEngine, GameState};
use mcts::MCTS;
use model::{Predictor, TrainingTriplet};

use super::{backfill_outcomes, SelfPlayGame, SelfPlayOptions};

/// Plays one game from the initial position.
pub fn play_self_one<E, P, R>(
    game_engine: &E,
    predictor: &P,
    options: &SelfPlayOptions,
    rng: &mut R,
) -> Result<SelfPlayGame>
where
    E: GameEngine + Sync,
    E::State: GameState + Sync,
    E::Action: Clone + Debug + Send,
    P: Predictor + Sync,
    R: Rng,
{
    play_self_from(game_engine, predictor, E::State::initial(), options, rng)
}

/// Plays one game from `game_state` until it ends or reaches the ply cap, recording the
/// encoded state and normalized visit counts of every ply.
pub fn play_self_from<E, P, R>(
    game_engine: &E,
    predictor: &P,
    game_state: E::State,
    options: &SelfPlayOptions,
    rng: &mut R,
) -> Result<SelfPlayGame>
where
    E: GameEngine + Sync,
    E::State: Clone + Sync,
    E::Action: Clone + Debug + Send,
    P: Predictor + Sync,
    R: Rng,
{
    let mcts = MCTS::new(options.mcts_options(), game_engine, predictor);
    let action_space_size = game_engine.action_space_size();

    let mut game_state = game_state;
    let mut states = Vec::new();
    let mut policies = Vec::new();
    let mut players_to_move = Vec::new();

    while !game_engine.is_terminal(&game_state) && states.len() < options.max_plies {
        let metrics = match mcts.search_parallel(
            &game_state,
            options.simulations,
            options.search_threads,
        )? {
            Some(metrics) => metrics,
            None => break,
        };

        let ply = states.len();
        let chosen = if ply < options.exploration_plies {
            metrics.sample_by_visits(rng)
        } else {
            metrics.child_max_visits()
        };
        let chosen = chosen.ok_or_else(|| anyhow!("Search returned a root without children"))?;

        let action = chosen.action().clone();

        debug!("Ply {}: {:?} with {} visits", ply, action, chosen.visits());

        states.push(game_engine.encode(&game_state));
        policies.push(metrics.policy_target(action_space_size, |a| game_engine.action_index(a)));
        players_to_move.push(game_engine.player_to_move(&game_state));

        game_state = game_engine.take_action(&game_state, &action);
    }

    let terminal = game_engine.is_terminal(&game_state);
    let result = if terminal {
        game_engine.result(&game_state).unwrap_or(0.0)
    } else {
        0.0
    };

    let outcomes = backfill_outcomes(result, &players_to_move);
    let plies = states.len();

    let triplets = states
        .into_iter()
        .zip(policies)
        .zip(outcomes)
        .map(|((state, policy), outcome)| TrainingTriplet::new(state, policy, outcome))
        .collect();

    info!(
        "Game finished, Plies: {}, Result: {}, Terminal: {}",
        plies, result, terminal
    );

    Ok(SelfPlayGame {
        triplets,
        result,
        plies,
        terminal,
    })
}
