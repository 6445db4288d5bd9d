use std::error::Error;
use std::fmt;

use crate::game_state::board::Board;
use crate::game_state::chess_types::{Color, Square};
use crate::game_state::position::Position;
use crate::move_generation::legal_move_checks;
use crate::moves::chess_move::Move;

pub type MoveGenResult<T> = Result<T, MoveGenerationError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveGenerationError {
    InvalidState(String),
}

impl fmt::Display for MoveGenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveGenerationError::InvalidState(msg) => write!(f, "invalid game state: {msg}"),
        }
    }
}

impl Error for MoveGenerationError {}

/// Legal-move oracle. Every returned move leaves the mover's king safe.
pub trait MoveGenerator: Send + Sync {
    /// All legal moves of `color` under the position's board and rights.
    fn all_legal_moves(&self, position: &Position, color: Color) -> MoveGenResult<Vec<Move>>;

    /// Legal moves of the piece on `square`; empty unless that piece belongs
    /// to the side to move.
    fn moves_from(&self, position: &Position, square: Square) -> MoveGenResult<Vec<Move>>;

    #[inline]
    fn generate_legal_moves(&self, position: &Position) -> MoveGenResult<Vec<Move>> {
        self.all_legal_moves(position, position.side_to_move)
    }

    #[inline]
    fn is_in_check(&self, board: &Board, color: Color) -> bool {
        legal_move_checks::is_in_check(board, color)
    }
}
