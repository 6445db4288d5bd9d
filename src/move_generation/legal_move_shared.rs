use crate::game_state::chess_types::*;
use crate::game_state::position::Position;
use crate::moves::chess_move::{Move, MoveFlag};

/// Emits one move per set bit of `targets`, flagged as a capture when the
/// target holds an enemy piece. Callers have already masked out own pieces.
#[inline]
pub fn push_moves_to_targets(position: &Position, from: Square, targets: u64, out: &mut Vec<Move>) {
    let enemy_occ = position.board.occupancy_of(position.side_to_move.opposite());
    for to in bitboard_squares(targets) {
        let flag = if enemy_occ & to.bit() != 0 {
            MoveFlag::Capture
        } else {
            MoveFlag::Normal
        };
        out.push(Move::new(from, to, flag));
    }
}

/// Pieces of `kind` belonging to the side to move, restricted to `from_mask`.
#[inline]
pub fn own_pieces(position: &Position, kind: PieceKind, from_mask: u64) -> u64 {
    position.board.pieces_of(position.side_to_move, kind) & from_mask
}
