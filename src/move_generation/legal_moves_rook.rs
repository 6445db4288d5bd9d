use crate::game_state::chess_types::*;
use crate::game_state::position::Position;
use crate::move_generation::legal_move_shared::{own_pieces, push_moves_to_targets};
use crate::moves::chess_move::Move;
use crate::moves::rook_moves::rook_attacks;

pub fn generate_rook_moves(position: &Position, from_mask: u64, out: &mut Vec<Move>) {
    let own_occ = position.board.occupancy_of(position.side_to_move);
    let occupancy = position.board.occupancy();

    for from in bitboard_squares(own_pieces(position, PieceKind::Rook, from_mask)) {
        let targets = rook_attacks(from, occupancy) & !own_occ;
        push_moves_to_targets(position, from, targets, out);
    }
}
