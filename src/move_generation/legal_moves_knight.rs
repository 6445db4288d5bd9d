use crate::game_state::chess_types::*;
use crate::game_state::position::Position;
use crate::move_generation::legal_move_shared::{own_pieces, push_moves_to_targets};
use crate::moves::chess_move::Move;
use crate::moves::knight_moves::knight_attacks;

pub fn generate_knight_moves(position: &Position, from_mask: u64, out: &mut Vec<Move>) {
    let own_occ = position.board.occupancy_of(position.side_to_move);

    for from in bitboard_squares(own_pieces(position, PieceKind::Knight, from_mask)) {
        let targets = knight_attacks(from) & !own_occ;
        push_moves_to_targets(position, from, targets, out);
    }
}
