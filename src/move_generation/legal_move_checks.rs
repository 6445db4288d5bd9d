//! Attack and check detection.

use crate::game_state::board::Board;
use crate::game_state::chess_types::*;
use crate::moves::bishop_moves::bishop_attacks;
use crate::moves::king_moves::king_attacks;
use crate::moves::knight_moves::knight_attacks;
use crate::moves::pawn_moves::pawn_attacks;
use crate::moves::rook_moves::rook_attacks;

/// True when `color` has a king and it is attacked. A side without a king is
/// never in check.
#[inline]
pub fn is_in_check(board: &Board, color: Color) -> bool {
    let Some(king_sq) = board.king_square(color) else {
        return false;
    };
    is_square_attacked(board, king_sq, color.opposite())
}

pub fn is_square_attacked(board: &Board, square: Square, attacker_color: Color) -> bool {
    // A pawn of the defending color on `square` would attack exactly the
    // squares from which attacking pawns hit `square`.
    let attacker_pawns = board.pieces_of(attacker_color, PieceKind::Pawn);
    if pawn_attacks(attacker_color.opposite(), square) & attacker_pawns != 0 {
        return true;
    }

    let attacker_knights = board.pieces_of(attacker_color, PieceKind::Knight);
    if knight_attacks(square) & attacker_knights != 0 {
        return true;
    }

    let attacker_kings = board.pieces_of(attacker_color, PieceKind::King);
    if king_attacks(square) & attacker_kings != 0 {
        return true;
    }

    let occupancy = board.occupancy();
    let queens = board.pieces_of(attacker_color, PieceKind::Queen);

    let bishops_queens = board.pieces_of(attacker_color, PieceKind::Bishop) | queens;
    if bishop_attacks(square, occupancy) & bishops_queens != 0 {
        return true;
    }

    let rooks_queens = board.pieces_of(attacker_color, PieceKind::Rook) | queens;
    if rook_attacks(square, occupancy) & rooks_queens != 0 {
        return true;
    }

    false
}
