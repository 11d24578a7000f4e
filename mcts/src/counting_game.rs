use engine::engine::GameEngine;
use engine::game_state::GameState;

pub const TARGET: usize = 10;

/// Player 1 wins by counting up to `TARGET`, player 2 wins by counting down to zero.
#[derive(Hash, PartialEq, Eq, Clone, Debug)]
pub struct CountingGameState {
    pub p1_turn: bool,
    pub count: usize,
}

impl CountingGameState {
    pub fn new(count: usize, p1_turn: bool) -> Self {
        Self { p1_turn, count }
    }
}

impl GameState for CountingGameState {
    fn initial() -> Self {
        Self::new(TARGET / 2, true)
    }
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum CountingAction {
    Increment,
    Decrement,
    /// Only available to player 1.
    Stay,
}

pub struct CountingGameEngine {
    allow_stay: bool,
}

impl CountingGameEngine {
    pub fn new() -> Self {
        Self { allow_stay: true }
    }

    /// A variant where every position has exactly two legal actions.
    pub fn two_actions() -> Self {
        Self { allow_stay: false }
    }
}

impl GameEngine for CountingGameEngine {
    type Action = CountingAction;
    type State = CountingGameState;

    fn legal_actions(&self, game_state: &Self::State) -> Vec<Self::Action> {
        if self.is_terminal(game_state) {
            return vec![];
        }

        let mut actions = vec![CountingAction::Increment, CountingAction::Decrement];
        if self.allow_stay && game_state.p1_turn {
            actions.push(CountingAction::Stay);
        }

        actions
    }

    fn take_action(&self, game_state: &Self::State, action: &Self::Action) -> Self::State {
        let count = game_state.count;

        let new_count = match action {
            CountingAction::Increment => count + 1,
            CountingAction::Decrement => count - 1,
            CountingAction::Stay => count,
        };

        CountingGameState::new(new_count, !game_state.p1_turn)
    }

    fn is_terminal(&self, game_state: &Self::State) -> bool {
        self.result(game_state).is_some()
    }

    fn result(&self, game_state: &Self::State) -> Option<f32> {
        if game_state.count >= TARGET {
            Some(1.0)
        } else if game_state.count == 0 {
            Some(-1.0)
        } else {
            None
        }
    }

    fn player_to_move(&self, game_state: &Self::State) -> usize {
        if game_state.p1_turn {
            1
        } else {
            2
        }
    }

    fn encode(&self, game_state: &Self::State) -> Vec<f32> {
        vec![
            game_state.count as f32 / TARGET as f32,
            if game_state.p1_turn { 1.0 } else { 0.0 },
        ]
    }

    fn action_index(&self, action: &Self::Action) -> usize {
        match action {
            CountingAction::Increment => 0,
            CountingAction::Decrement => 1,
            CountingAction::Stay => 2,
        }
    }

    fn input_size(&self) -> usize {
        2
    }

    fn action_space_size(&self) -> usize {
        if self.allow_stay {
            3
        } else {
            2
        }
    }
}
