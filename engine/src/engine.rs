/// The capabilities search and self-play need from a game's rules.
///
/// Players are numbered `1` and `2`. Results are always reported from the perspective
/// of player `1`, the reference player.
pub trait GameEngine {
    type Action;
    type State;

    fn legal_actions(&self, game_state: &Self::State) -> Vec<Self::Action>;
    fn take_action(&self, game_state: &Self::State, action: &Self::Action) -> Self::State;
    fn is_terminal(&self, game_state: &Self::State) -> bool;

    /// The final result of the game as `1.0`, `0.0` or `-1.0` from the reference player's
    /// perspective. `None` while the game is still in progress.
    fn result(&self, game_state: &Self::State) -> Option<f32>;

    fn player_to_move(&self, game_state: &Self::State) -> usize;

    /// Encodes the state into a tensor of exactly `input_size()` values.
    fn encode(&self, game_state: &Self::State) -> Vec<f32>;

    /// A stable mapping of an action onto its position in the policy vector.
    fn action_index(&self, action: &Self::Action) -> usize;

    fn input_size(&self) -> usize;
    fn action_space_size(&self) -> usize;
}

pub const REFERENCE_PLAYER: usize = 1;

/// Converts a result reported from the reference player's perspective into the
/// perspective of `player`.
pub fn result_for_player(result: f32, player: usize) -> f32 {
    if player == REFERENCE_PLAYER {
        result
    } else {
        -result
    }
}
