use engine::GameEngine;

use super::{Action, GameState, ACTION_SPACE_SIZE, INPUT_SIZE};

#[derive(Default)]
pub struct Engine {}

impl Engine {
    pub fn new() -> Self {
        Self {}
    }
}

impl GameEngine for Engine {
    type Action = Action;
    type State = GameState;

    fn legal_actions(&self, game_state: &Self::State) -> Vec<Self::Action> {
        game_state.legal_actions()
    }

    fn take_action(&self, game_state: &Self::State, action: &Self::Action) -> Self::State {
        game_state.drop_piece(action.column())
    }

    fn is_terminal(&self, game_state: &Self::State) -> bool {
        game_state.result().is_some()
    }

    fn result(&self, game_state: &Self::State) -> Option<f32> {
        game_state.result()
    }

    fn player_to_move(&self, game_state: &Self::State) -> usize {
        game_state.player_to_move()
    }

    fn encode(&self, game_state: &Self::State) -> Vec<f32> {
        game_state.encode()
    }

    fn action_index(&self, action: &Self::Action) -> usize {
        action.column() - 1
    }

    fn input_size(&self) -> usize {
        INPUT_SIZE
    }

    fn action_space_size(&self) -> usize {
        ACTION_SPACE_SIZE
    }
}
