
use super::{map_board_to_arr, Action};

const TOP_ROW_MASK: u64 = 0b0100000_0100000_0100000_0100000_0100000_0100000_0100000;

#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct GameState {
    pub p1_turn_to_move: bool,
    pub p1_piece_board: u64,
    pub p2_piece_board: u64,
}

impl engine::GameState for GameState {
    fn initial() -> Self {
        GameState {
            p1_turn_to_move: true,
            p1_piece_board: 0,
            p2_piece_board: 0,
        }
    }
}

impl GameState {
    pub fn player_to_move(&self) -> usize {
        if self.p1_turn_to_move {
            1
        } else {
            2
        }
    }

    pub fn drop_piece(&self, column: usize) -> Self {
        let column_adder = 1 << (7 * (column - 1));
        let all_pieces = self.p1_piece_board | self.p2_piece_board;
        let dropped_piece = (all_pieces + column_adder) & !all_pieces;
        let p1_turn_to_move = self.p1_turn_to_move;
        let mut p1_piece_board = self.p1_piece_board;
        let mut p2_piece_board = self.p2_piece_board;

        if p1_turn_to_move {
            p1_piece_board |= dropped_piece;
        } else {
            p2_piece_board |= dropped_piece;
        }

        Self {
            p1_turn_to_move: !p1_turn_to_move,
            p1_piece_board,
            p2_piece_board,
        }
    }

    pub fn get_valid_actions(&self) -> Vec<bool> {
        let all_pieces = self.p1_piece_board | self.p2_piece_board;

        (1..8)
            .map(|column| {
                let column_mask = 1 << (7 * (column - 1));
                let column_mask_row_six = column_mask << 5;
                let is_column_full = column_mask_row_six & all_pieces != 0;
                !is_column_full
            })
            .collect()
    }

    /// The columns that can still be played, in ascending order. Empty once the game is over.
    pub fn legal_actions(&self) -> Vec<Action> {
        if self.result().is_some() {
            return vec![];
        }

        self.get_valid_actions()
            .into_iter()
            .zip(1..)
            .filter(|(valid, _)| *valid)
            .map(|(_, column)| Action::DropPiece(column))
            .collect()
    }

    /// Determines if the current state is either a winning or drawn position.
    ///
    /// Win: `Some(1.0)` if player 1 connected four, `Some(-1.0)` if player 2 did.
    ///
    /// Drawn: If the board is full without a connection the return will be `Some(0.0)`.
    ///
    /// Not Terminal: If the position is not yet the end of the game then None will be returned.
    pub fn result(&self) -> Option<f32> {
        let all_pieces = self.p1_piece_board | self.p2_piece_board;

        if self.has_connected_4() {
            // Only the player who just moved can have completed a connection.
            return Some(if self.p1_turn_to_move { -1.0 } else { 1.0 });
        }

        if all_pieces & TOP_ROW_MASK == TOP_ROW_MASK {
            return Some(0.0);
        }

        None
    }

    pub fn number_of_actions(&self) -> usize {
        (self.p1_piece_board | self.p2_piece_board).count_ones() as usize
    }

    /// Two planes of 42 cells: the pieces of the player to move followed by the opponent's.
    pub fn encode(&self) -> Vec<f32> {
        let (current, opponent) = if self.p1_turn_to_move {
            (self.p1_piece_board, self.p2_piece_board)
        } else {
            (self.p2_piece_board, self.p1_piece_board)
        };

        let mut input = Vec::with_capacity(84);
        input.extend_from_slice(&map_board_to_arr(current));
        input.extend_from_slice(&map_board_to_arr(opponent));
        input
    }

    fn has_connected_4(&self) -> bool {
        let board = if self.p1_turn_to_move {
            self.p2_piece_board
        } else {
            self.p1_piece_board
        };

        let c2 = board & (board << 6);
        if c2 & (c2 << (2 * 6)) != 0 {
            return true;
        }

        let c2 = board & (board << 7);
        if c2 & (c2 << (2 * 7)) != 0 {
            return true;
        }

        let c2 = board & (board << 8);
        if c2 & (c2 << (2 * 8)) != 0 {
            return true;
        }

        let c2 = board & (board << 1);
        if c2 & (c2 << 2) != 0 {
            return true;
        }

        false
    }
}
