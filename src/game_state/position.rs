//! A complete position: board, side to move, move rights and clocks.
//!
//! This is what the move generator reads and what move application mutates.

use crate::game_state::board::Board;
use crate::game_state::chess_types::*;
use crate::game_state::zobrist::compute_position_key;
use crate::utils::fen_generator::generate_fen;
use crate::utils::fen_parser::parse_fen;

/// Castling availability and en-passant target, carried per position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveRights {
    pub castling: CastlingRights,
    pub en_passant: Option<Square>,
}

impl MoveRights {
    #[inline]
    pub fn can_castle_kingside(&self, color: Color) -> bool {
        self.castling & castle_kingside_flag(color) != 0
    }

    #[inline]
    pub fn can_castle_queenside(&self, color: Color) -> bool {
        self.castling & castle_queenside_flag(color) != 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub board: Board,
    pub side_to_move: Color,
    pub rights: MoveRights,
    pub halfmove_clock: u16,
    pub fullmove_number: u16,
}

impl Default for Position {
    fn default() -> Self {
        Self {
            board: Board::empty(),
            side_to_move: Color::White,
            rights: MoveRights::default(),
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }
}

impl Position {
    pub fn new_game() -> Self {
        Self {
            board: Board::standard_setup(),
            rights: MoveRights {
                castling: CASTLE_ALL,
                en_passant: None,
            },
            ..Self::default()
        }
    }

    #[inline]
    pub fn from_fen(fen: &str) -> Result<Self, String> {
        parse_fen(fen)
    }

    #[inline]
    pub fn to_fen(&self) -> String {
        generate_fen(self)
    }

    /// Hash identifying the position for repetition detection.
    #[inline]
    pub fn key(&self) -> u64 {
        compute_position_key(self)
    }
}
