//! Pawn move generation: pushes, double pushes, captures, en passant and
//! promotions (one move per promotion choice).

use crate::game_state::chess_types::*;
use crate::game_state::position::Position;
use crate::move_generation::legal_move_shared::own_pieces;
use crate::moves::chess_move::{Move, MoveFlag};
use crate::moves::pawn_moves::pawn_attacks;

pub fn generate_pawn_moves(position: &Position, from_mask: u64, out: &mut Vec<Move>) {
    let side = position.side_to_move;
    let enemy_occ = position.board.occupancy_of(side.opposite());
    let empty = !position.board.occupancy();
    let forward: i8 = match side {
        Color::White => 1,
        Color::Black => -1,
    };
    let start_rank = match side {
        Color::White => 1,
        Color::Black => 6,
    };

    for from in bitboard_squares(own_pieces(position, PieceKind::Pawn, from_mask)) {
        if let Some(to) = from.offset(0, forward) {
            if to.bit() & empty != 0 {
                push_pawn_move(side, from, to, MoveFlag::Normal, out);

                if from.rank() == start_rank {
                    if let Some(two_step) = to.offset(0, forward) {
                        if two_step.bit() & empty != 0 {
                            out.push(Move::new(from, two_step, MoveFlag::Normal));
                        }
                    }
                }
            }
        }

        let attacks = pawn_attacks(side, from);
        for to in bitboard_squares(attacks & enemy_occ) {
            push_pawn_move(side, from, to, MoveFlag::Capture, out);
        }

        if let Some(ep_square) = position.rights.en_passant {
            if attacks & ep_square.bit() & empty != 0 {
                out.push(Move::new(from, ep_square, MoveFlag::EnPassant));
            }
        }
    }
}

fn push_pawn_move(side: Color, from: Square, to: Square, flag: MoveFlag, out: &mut Vec<Move>) {
    if to.rank() == side.promotion_rank() {
        for promo in PieceKind::PROMOTION_CHOICES {
            out.push(Move::promotion(from, to, promo));
        }
    } else {
        out.push(Move::new(from, to, flag));
    }
}
