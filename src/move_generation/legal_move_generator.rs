//! Full legal move generation pipeline.
//!
//! Orchestrates piece-wise pseudo-legal generation, applies each candidate to
//! a scratch position and drops the ones that leave the mover's king attacked.

use crate::game_state::chess_types::*;
use crate::game_state::position::Position;
use crate::move_generation::legal_move_apply::{make_move, unmake_move};
use crate::move_generation::legal_move_checks::is_in_check;
use crate::move_generation::legal_moves_bishop::generate_bishop_moves;
use crate::move_generation::legal_moves_king::generate_king_moves;
use crate::move_generation::legal_moves_knight::generate_knight_moves;
use crate::move_generation::legal_moves_pawn::generate_pawn_moves;
use crate::move_generation::legal_moves_queen::generate_queen_moves;
use crate::move_generation::legal_moves_rook::generate_rook_moves;
use crate::move_generation::move_generator::{MoveGenResult, MoveGenerationError, MoveGenerator};
use crate::moves::chess_move::Move;

#[derive(Debug, Clone, Copy, Default)]
pub struct LegalMoveGenerator;

impl MoveGenerator for LegalMoveGenerator {
    fn all_legal_moves(&self, position: &Position, color: Color) -> MoveGenResult<Vec<Move>> {
        if color == position.side_to_move {
            return legal_moves_masked(position, !0);
        }

        // Asking for the side not to move: same board, that side on move, and
        // no en-passant target since it belongs to the other side's reply.
        let mut as_color = position.clone();
        as_color.side_to_move = color;
        as_color.rights.en_passant = None;
        legal_moves_masked(&as_color, !0)
    }

    fn moves_from(&self, position: &Position, square: Square) -> MoveGenResult<Vec<Move>> {
        match position.board.piece_at(square) {
            Some(piece) if piece.color == position.side_to_move => {
                legal_moves_masked(position, square.bit())
            }
            _ => Ok(Vec::new()),
        }
    }
}

fn legal_moves_masked(position: &Position, from_mask: u64) -> MoveGenResult<Vec<Move>> {
    let mut pseudo = Vec::<Move>::with_capacity(64);

    generate_pawn_moves(position, from_mask, &mut pseudo);
    generate_knight_moves(position, from_mask, &mut pseudo);
    generate_bishop_moves(position, from_mask, &mut pseudo);
    generate_rook_moves(position, from_mask, &mut pseudo);
    generate_queen_moves(position, from_mask, &mut pseudo);
    generate_king_moves(position, from_mask, &mut pseudo);

    let mover = position.side_to_move;
    let mut scratch = position.clone();
    let mut legal = Vec::<Move>::with_capacity(pseudo.len());
    for mv in pseudo {
        let undo = make_move(&mut scratch, &mv)
            .map_err(|x| MoveGenerationError::InvalidState(format!("make_move failed: {x}")))?;

        // Illegal if own king is in check after move.
        let leaves_king_attacked = is_in_check(&scratch.board, mover);

        unmake_move(&mut scratch, &undo)
            .map_err(|x| MoveGenerationError::InvalidState(format!("unmake_move failed: {x}")))?;

        if !leaves_king_attacked {
            legal.push(mv);
        }
    }

    Ok(legal)
}

#[cfg(test)]
mod tests {
    use super::LegalMoveGenerator;
    use crate::game_state::chess_types::*;
    use crate::game_state::position::Position;
    use crate::move_generation::legal_move_apply::apply_move;
    use crate::move_generation::legal_move_checks::is_in_check;
    use crate::move_generation::move_generator::MoveGenerator;
    use crate::moves::chess_move::MoveFlag;

    fn sq(index: u8) -> Square {
        Square::new(index).expect("test square in range")
    }

    fn position(fen: &str) -> Position {
        Position::from_fen(fen).expect("FEN should parse")
    }

    fn targets(position: &Position, from: Square) -> Vec<u8> {
        let mut out: Vec<u8> = LegalMoveGenerator
            .moves_from(position, from)
            .expect("generation should succeed")
            .into_iter()
            .map(|mv| mv.target.value())
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    #[test]
    fn starting_position_has_twenty_moves() {
        let moves = LegalMoveGenerator
            .generate_legal_moves(&Position::new_game())
            .expect("generation should succeed");
        assert_eq!(moves.len(), 20);
    }

    #[test]
    fn e2_pawn_reaches_e3_and_e4() {
        assert_eq!(targets(&Position::new_game(), sq(12)), vec![20, 28]);
    }

    #[test]
    fn empty_or_enemy_square_yields_nothing() {
        let game = Position::new_game();
        assert!(targets(&game, sq(28)).is_empty());
        assert!(targets(&game, sq(52)).is_empty());
    }

    #[test]
    fn pinned_rook_only_moves_along_the_pin() {
        // Rook on e2 pinned by the rook on e8.
        let game = position("4r1k1/8/8/8/8/8/4R3/4K3 w - - 0 1");
        assert_eq!(targets(&game, sq(12)), vec![20, 28, 36, 44, 52, 60]);
    }

    #[test]
    fn pinned_knight_cannot_move() {
        let game = position("4r1k1/8/8/8/8/8/4N3/4K3 w - - 0 1");
        assert!(targets(&game, sq(12)).is_empty());
    }

    #[test]
    fn king_in_check_must_resolve_it() {
        // Black rook on e8 checks; only king steps off the file or block Re2.
        let game = position("4r1k1/8/8/8/8/8/3R4/4K3 w - - 0 1");
        let moves = LegalMoveGenerator
            .generate_legal_moves(&game)
            .expect("generation should succeed");
        for mv in &moves {
            let next = apply_move(&game, mv).expect("legal move should apply");
            assert!(!is_in_check(&next.board, Color::White), "{mv} leaves king in check");
        }
        assert!(moves.iter().any(|mv| mv.source == sq(11) && mv.target == sq(12)));
        assert!(!moves.iter().any(|mv| mv.source == sq(11) && mv.target == sq(19)));
    }

    #[test]
    fn en_passant_exposing_own_king_is_illegal() {
        // Capturing d6 would clear the fifth rank between Ka5 and the rook on h5.
        let game = position("7k/8/8/K2pP2r/8/8/8/8 w - d6 0 2");
        let moves = targets(&game, sq(36));
        assert_eq!(moves, vec![44]);
    }

    #[test]
    fn en_passant_capture_is_offered() {
        let game = position("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2");
        let moves = LegalMoveGenerator
            .moves_from(&game, sq(36))
            .expect("generation should succeed");
        assert!(moves.iter().any(|mv| mv.flag == MoveFlag::EnPassant && mv.target == sq(43)));
    }

    #[test]
    fn moves_for_side_not_to_move() {
        let game = Position::new_game();
        let black = LegalMoveGenerator
            .all_legal_moves(&game, Color::Black)
            .expect("generation should succeed");
        assert_eq!(black.len(), 20);
        assert!(black.iter().all(|mv| {
            game.board.piece_at(mv.source).map(|p| p.color) == Some(Color::Black)
        }));
    }

    #[test]
    fn checkmated_side_has_no_moves() {
        // Position after fool's mate.
        let game = position("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3");
        assert!(is_in_check(&game.board, Color::White));
        assert!(LegalMoveGenerator
            .generate_legal_moves(&game)
            .expect("generation should succeed")
            .is_empty());
    }

    #[test]
    fn stalemated_side_has_no_moves() {
        let game = position("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
        assert!(!is_in_check(&game.board, Color::Black));
        assert!(LegalMoveGenerator
            .generate_legal_moves(&game)
            .expect("generation should succeed")
            .is_empty());
    }
}
