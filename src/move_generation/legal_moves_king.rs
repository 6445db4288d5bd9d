use crate::game_state::chess_types::*;
use crate::game_state::position::Position;
use crate::move_generation::legal_move_checks::is_square_attacked;
use crate::move_generation::legal_move_shared::{own_pieces, push_moves_to_targets};
use crate::moves::chess_move::{Move, MoveFlag};
use crate::moves::king_moves::king_attacks;

pub fn generate_king_moves(position: &Position, from_mask: u64, out: &mut Vec<Move>) {
    let own_occ = position.board.occupancy_of(position.side_to_move);

    for from in bitboard_squares(own_pieces(position, PieceKind::King, from_mask)) {
        push_moves_to_targets(position, from, king_attacks(from) & !own_occ, out);
        generate_castling_moves(position, from, out);
    }
}

fn generate_castling_moves(position: &Position, king_from: Square, out: &mut Vec<Move>) {
    let side = position.side_to_move;
    let enemy = side.opposite();
    let home = side.home_rank();
    let board = &position.board;

    let Some(king_home) = Square::from_file_rank(4, home) else {
        return;
    };
    if king_from != king_home {
        return;
    }

    // Cannot castle out of check.
    if is_square_attacked(board, king_from, enemy) {
        return;
    }

    let rook = Piece::new(PieceKind::Rook, side);
    let square = |file: u8| Square::from_file_rank(file, home);

    if position.rights.can_castle_kingside(side) {
        if let (Some(f), Some(g), Some(h)) = (square(5), square(6), square(7)) {
            if board.piece_at(h) == Some(rook)
                && board.occupancy() & (f.bit() | g.bit()) == 0
                && !is_square_attacked(board, f, enemy)
                && !is_square_attacked(board, g, enemy)
            {
                out.push(Move::new(king_from, g, MoveFlag::CastleKingside));
            }
        }
    }

    if position.rights.can_castle_queenside(side) {
        if let (Some(a), Some(b), Some(c), Some(d)) = (square(0), square(1), square(2), square(3)) {
            if board.piece_at(a) == Some(rook)
                && board.occupancy() & (b.bit() | c.bit() | d.bit()) == 0
                && !is_square_attacked(board, d, enemy)
                && !is_square_attacked(board, c, enemy)
            {
                out.push(Move::new(king_from, c, MoveFlag::CastleQueenside));
            }
        }
    }
}
