use anyhow::Result;
use assert_approx_eq::assert_approx_eq;
use engine::engine::GameEngine;
use engine::game_state::GameState;
use model::{ConstantPredictor, Prediction, Predictor};

use super::counting_game::{CountingAction, CountingGameEngine, CountingGameState, TARGET};
use super::{DirichletOptions, MCTSOptions, MCTS};

fn uniform(game_engine: &CountingGameEngine) -> ConstantPredictor {
    ConstantPredictor::uniform(game_engine.input_size(), game_engine.action_space_size(), 0.0)
}

/// Gives the full policy to positions where player 1 moves and a single logit otherwise.
struct ShortPolicyPredictor;

impl Predictor for ShortPolicyPredictor {
    fn predict(&self, input: &[f32]) -> Result<Prediction> {
        let logits = if input[1] == 1.0 { vec![0.0; 3] } else { vec![0.0] };

        Ok(Prediction::new(logits, 0.0))
    }
}

#[test]
fn test_root_visits_equal_simulations() {
    let game_engine = CountingGameEngine::new();
    let predictor = uniform(&game_engine);
    let mcts = MCTS::new(MCTSOptions::default(), &game_engine, &predictor);

    let tree = mcts
        .search_tree(&CountingGameState::initial(), 200)
        .unwrap()
        .unwrap();
    let metrics = tree.root_metrics();

    assert_eq!(tree.root_visits(), 200);
    assert_eq!(metrics.visits, 200);
    assert_eq!(metrics.children.iter().map(|c| c.visits).sum::<usize>(), 200);
}

#[test]
fn test_two_moves_with_uniform_policy() {
    let game_engine = CountingGameEngine::two_actions();
    let predictor = uniform(&game_engine);
    let mcts = MCTS::new(MCTSOptions::new(1.4, None), &game_engine, &predictor);

    let metrics = mcts
        .search(&CountingGameState::initial(), 100)
        .unwrap()
        .unwrap();

    assert_eq!(metrics.children.len(), 2);
    assert_eq!(metrics.children[0].visits + metrics.children[1].visits, 100);
    assert_approx_eq!(metrics.children[0].prior, 0.5);
    assert_approx_eq!(metrics.children[1].prior, 0.5);
}

#[test]
fn test_policy_target_is_zero_on_illegal_actions() {
    let game_engine = CountingGameEngine::new();
    let predictor = uniform(&game_engine);
    let mcts = MCTS::new(MCTSOptions::default(), &game_engine, &predictor);
    let p2_to_move = CountingGameState::new(5, false);

    let metrics = mcts.search(&p2_to_move, 64).unwrap().unwrap();
    let policy = metrics.policy_target(game_engine.action_space_size(), |a| {
        game_engine.action_index(a)
    });

    assert_eq!(policy.len(), 3);
    assert_eq!(policy[2], 0.0);
    assert_approx_eq!(policy.iter().sum::<f32>(), 1.0, 1e-6);
}

#[test]
fn test_terminal_root_returns_no_move() {
    let game_engine = CountingGameEngine::new();
    let predictor = uniform(&game_engine);
    let mcts = MCTS::new(MCTSOptions::default(), &game_engine, &predictor);

    let won = CountingGameState::new(TARGET, false);
    let lost = CountingGameState::new(0, true);

    assert!(mcts.search(&won, 10).unwrap().is_none());
    assert!(mcts.search(&lost, 10).unwrap().is_none());
}

#[test]
fn test_chooses_winning_move_for_p1() {
    let game_engine = CountingGameEngine::new();
    let predictor = uniform(&game_engine);
    let mcts = MCTS::new(MCTSOptions::default(), &game_engine, &predictor);

    let metrics = mcts
        .search(&CountingGameState::new(TARGET - 1, true), 100)
        .unwrap()
        .unwrap();
    let best = metrics.child_max_visits().unwrap();

    assert_eq!(best.action, CountingAction::Increment);
    assert_approx_eq!(best.q(), 1.0);
}

#[test]
fn test_chooses_winning_move_for_p2() {
    let game_engine = CountingGameEngine::new();
    let predictor = uniform(&game_engine);
    let mcts = MCTS::new(MCTSOptions::default(), &game_engine, &predictor);

    let metrics = mcts
        .search(&CountingGameState::new(1, false), 100)
        .unwrap()
        .unwrap();
    let best = metrics.child_max_visits().unwrap();

    assert_eq!(best.action, CountingAction::Decrement);
    assert_approx_eq!(best.q(), 1.0);
}

#[test]
fn test_ties_are_broken_by_expansion_order() {
    let game_engine = CountingGameEngine::new();
    let predictor = uniform(&game_engine);
    let mcts = MCTS::new(MCTSOptions::default(), &game_engine, &predictor);

    let metrics = mcts
        .search(&CountingGameState::initial(), 1)
        .unwrap()
        .unwrap();

    assert_eq!(metrics.children[0].action, CountingAction::Increment);
    assert_eq!(metrics.children[0].visits, 1);
    assert_eq!(metrics.children[1].visits, 0);
    assert_eq!(metrics.children[2].visits, 0);
}

#[test]
fn test_search_is_deterministic_without_noise() {
    let game_engine = CountingGameEngine::new();
    let predictor = uniform(&game_engine);
    let mcts = MCTS::new(MCTSOptions::default(), &game_engine, &predictor);

    let left = mcts.search(&CountingGameState::initial(), 150).unwrap();
    let right = mcts.search(&CountingGameState::initial(), 150).unwrap();

    assert_eq!(left, right);
}

#[test]
fn test_out_of_range_action_abandons_simulation() {
    let game_engine = CountingGameEngine::new();
    let mcts = MCTS::new(MCTSOptions::default(), &game_engine, &ShortPolicyPredictor);

    let tree = mcts
        .search_tree(&CountingGameState::initial(), 20)
        .unwrap()
        .unwrap();

    // Only the root and its three children exist. No statistic changed.
    assert_eq!(tree.len(), 4);
    assert_eq!(tree.root_visits(), 0);
    assert!(tree.root_metrics().children.iter().all(|c| c.visits == 0));
}

#[test]
fn test_out_of_range_action_at_root_is_an_error() {
    let game_engine = CountingGameEngine::new();
    let predictor = ConstantPredictor::uniform(game_engine.input_size(), 1, 0.0);
    let mcts = MCTS::new(MCTSOptions::default(), &game_engine, &predictor);

    assert!(mcts.search(&CountingGameState::initial(), 10).is_err());
}

#[test]
fn test_predictor_failure_is_propagated() {
    let game_engine = CountingGameEngine::new();
    let predictor = ConstantPredictor::uniform(7, game_engine.action_space_size(), 0.0);
    let mcts = MCTS::new(MCTSOptions::default(), &game_engine, &predictor);

    assert!(mcts.search(&CountingGameState::initial(), 10).is_err());
}

#[test]
fn test_root_noise_keeps_priors_normalized() {
    let game_engine = CountingGameEngine::new();
    let predictor = uniform(&game_engine);
    let options = MCTSOptions::new(
        1.4,
        Some(DirichletOptions {
            alpha: 0.3,
            epsilon: 0.25,
        }),
    );
    let mcts = MCTS::new(options, &game_engine, &predictor);

    let metrics = mcts
        .search(&CountingGameState::initial(), 50)
        .unwrap()
        .unwrap();

    assert_eq!(metrics.visits, 50);
    assert_approx_eq!(metrics.children.iter().map(|c| c.prior).sum::<f32>(), 1.0, 1e-5);
}

#[test]
fn test_parallel_search_conserves_simulations() {
    let game_engine = CountingGameEngine::new();
    let predictor = uniform(&game_engine);
    let mcts = MCTS::new(MCTSOptions::default(), &game_engine, &predictor);

    let metrics = mcts
        .search_parallel(&CountingGameState::initial(), 101, 4)
        .unwrap()
        .unwrap();

    assert_eq!(metrics.visits, 101);
    assert_eq!(metrics.children.iter().map(|c| c.visits).sum::<usize>(), 101);
    assert_approx_eq!(metrics.children.iter().map(|c| c.prior).sum::<f32>(), 1.0, 1e-5);
}

#[test]
fn test_parallel_search_with_more_threads_than_simulations() {
    let game_engine = CountingGameEngine::new();
    let predictor = uniform(&game_engine);
    let mcts = MCTS::new(MCTSOptions::default(), &game_engine, &predictor);

    let metrics = mcts
        .search_parallel(&CountingGameState::initial(), 3, 8)
        .unwrap()
        .unwrap();

    assert_eq!(metrics.visits, 3);
}

#[test]
fn test_parallel_search_of_terminal_root() {
    let game_engine = CountingGameEngine::new();
    let predictor = uniform(&game_engine);
    let mcts = MCTS::new(MCTSOptions::default(), &game_engine, &predictor);

    let metrics = mcts
        .search_parallel(&CountingGameState::new(TARGET, false), 40, 4)
        .unwrap();

    assert!(metrics.is_none());
}
