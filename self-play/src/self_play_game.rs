use engine::engine::result_for_player;
use model::TrainingTriplet;

/// Everything a finished self-play game produced.
#[derive(Clone, Debug, PartialEq)]
pub struct SelfPlayGame {
    pub triplets: Vec<TrainingTriplet>,
    /// Result from the reference player's perspective. `0.0` for games stopped by the ply cap.
    pub result: f32,
    pub plies: usize,
    /// Whether the game reached a terminal state rather than the ply cap.
    pub terminal: bool,
}

impl SelfPlayGame {
    pub fn into_triplets(self) -> Vec<TrainingTriplet> {
        self.triplets
    }
}

/// The outcome stored for each ply: the result as seen by the player who was to move.
pub fn backfill_outcomes(result: f32, players_to_move: &[usize]) -> Vec<f32> {
    players_to_move
        .iter()
        .map(|player| result_for_player(result, *player))
        .collect()
}
