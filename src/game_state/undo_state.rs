use crate::game_state::chess_types::*;
use crate::game_state::position::MoveRights;
use crate::moves::chess_move::Move;

/// Single undo record produced by `make_move` and consumed by `unmake_move`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UndoState {
    pub mv: Move,
    pub moved_piece: Piece,
    pub captured_piece: Option<Piece>,

    pub prev_rights: MoveRights,
    pub prev_halfmove_clock: u16,
    pub prev_fullmove_number: u16,
}
