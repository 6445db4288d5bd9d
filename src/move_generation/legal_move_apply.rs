//! Make/unmake of a single move on a [`Position`].
//!
//! `make_move` trusts that the move came from the generator; it only checks
//! what it needs to keep the board consistent. `unmake_move` reverses it
//! exactly from the returned [`UndoState`].

use crate::game_state::chess_types::*;
use crate::game_state::position::Position;
use crate::game_state::undo_state::UndoState;
use crate::moves::chess_move::{Move, MoveFlag};

/// Applies `mv` to a copy of `position`.
pub fn apply_move(position: &Position, mv: &Move) -> Result<Position, String> {
    let mut next = position.clone();
    make_move(&mut next, mv)?;
    Ok(next)
}

pub fn make_move(position: &mut Position, mv: &Move) -> Result<UndoState, String> {
    let moving_color = position.side_to_move;
    let moved_piece = position
        .board
        .piece_at(mv.source)
        .ok_or_else(|| format!("No piece on from-square {}", mv.source))?;
    if moved_piece.color != moving_color {
        return Err(format!(
            "Piece on {} does not belong to side to move ({moving_color})",
            mv.source
        ));
    }

    let undo_base = UndoState {
        mv: *mv,
        moved_piece,
        captured_piece: None,
        prev_rights: position.rights,
        prev_halfmove_clock: position.halfmove_clock,
        prev_fullmove_number: position.fullmove_number,
    };

    let board = &mut position.board;

    // Handle captures.
    let captured_piece = if mv.flag == MoveFlag::EnPassant {
        let capture_sq = en_passant_capture_square(mv, moving_color)?;
        board.remove(capture_sq)
    } else {
        board.remove(mv.target)
    };
    if captured_piece.is_some_and(|piece| piece.color == moving_color) {
        return Err(format!("Move {mv} captures a friendly piece"));
    }

    // Place moved/promoted piece on destination.
    board.remove(mv.source);
    let placed = match mv.promotion {
        Some(kind) => Piece::new(kind, moving_color),
        None => moved_piece,
    };
    board.place(mv.target, placed);

    // Castling rook move.
    if let Some((rook_from, rook_to)) = castling_rook_squares(mv.flag, moving_color) {
        let rook = board
            .remove(rook_from)
            .ok_or_else(|| format!("Castling without a rook on {rook_from}"))?;
        board.place(rook_to, rook);
    }

    update_castling_rights(position, moved_piece, mv.source, mv.target);

    position.rights.en_passant =
        if moved_piece.kind == PieceKind::Pawn && mv.source.rank().abs_diff(mv.target.rank()) == 2 {
            Square::new((mv.source.value() + mv.target.value()) / 2)
        } else {
            None
        };

    if moved_piece.kind == PieceKind::Pawn || captured_piece.is_some() {
        position.halfmove_clock = 0;
    } else {
        position.halfmove_clock = position.halfmove_clock.saturating_add(1);
    }
    if moving_color == Color::Black {
        position.fullmove_number = position.fullmove_number.saturating_add(1);
    }

    position.side_to_move = moving_color.opposite();

    Ok(UndoState {
        captured_piece,
        ..undo_base
    })
}

pub fn unmake_move(position: &mut Position, undo: &UndoState) -> Result<(), String> {
    let mv = undo.mv;
    let moving_color = undo.moved_piece.color;
    let board = &mut position.board;

    board
        .remove(mv.target)
        .ok_or_else(|| format!("Nothing on {} to take back", mv.target))?;
    board.place(mv.source, undo.moved_piece);

    if let Some((rook_from, rook_to)) = castling_rook_squares(mv.flag, moving_color) {
        let rook = board
            .remove(rook_to)
            .ok_or_else(|| format!("Castled rook missing from {rook_to}"))?;
        board.place(rook_from, rook);
    }

    if let Some(captured) = undo.captured_piece {
        let capture_sq = if mv.flag == MoveFlag::EnPassant {
            en_passant_capture_square(&mv, moving_color)?
        } else {
            mv.target
        };
        board.place(capture_sq, captured);
    }

    position.rights = undo.prev_rights;
    position.halfmove_clock = undo.prev_halfmove_clock;
    position.fullmove_number = undo.prev_fullmove_number;
    position.side_to_move = moving_color;

    Ok(())
}

fn en_passant_capture_square(mv: &Move, moving_color: Color) -> Result<Square, String> {
    let back = match moving_color {
        Color::White => -1,
        Color::Black => 1,
    };
    mv.target
        .offset(0, back)
        .ok_or_else(|| format!("Invalid en-passant target {}", mv.target))
}

fn castling_rook_squares(flag: MoveFlag, color: Color) -> Option<(Square, Square)> {
    let home = color.home_rank();
    match flag {
        MoveFlag::CastleKingside => Some((
            Square::from_file_rank(7, home)?,
            Square::from_file_rank(5, home)?,
        )),
        MoveFlag::CastleQueenside => Some((
            Square::from_file_rank(0, home)?,
            Square::from_file_rank(3, home)?,
        )),
        _ => None,
    }
}

fn update_castling_rights(position: &mut Position, moved_piece: Piece, from: Square, to: Square) {
    if moved_piece.kind == PieceKind::King {
        position.rights.castling &=
            !(castle_kingside_flag(moved_piece.color) | castle_queenside_flag(moved_piece.color));
    }

    // Moving a rook off, or capturing onto, an original corner removes rights.
    for sq in [from, to] {
        position.rights.castling &= !corner_right(sq);
    }
}

fn corner_right(square: Square) -> CastlingRights {
    match square {
        Square::A1 => CASTLE_WHITE_QUEENSIDE,
        Square::H1 => CASTLE_WHITE_KINGSIDE,
        Square::A8 => CASTLE_BLACK_QUEENSIDE,
        Square::H8 => CASTLE_BLACK_KINGSIDE,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::{apply_move, make_move, unmake_move};
    use crate::game_state::chess_types::*;
    use crate::game_state::position::Position;
    use crate::move_generation::legal_move_generator::LegalMoveGenerator;
    use crate::move_generation::move_generator::MoveGenerator;
    use crate::moves::chess_move::{Move, MoveFlag};

    fn sq(index: u8) -> Square {
        Square::new(index).expect("test square in range")
    }

    #[test]
    fn double_push_sets_en_passant_target() {
        let game = Position::new_game();
        let next = apply_move(&game, &Move::new(sq(12), sq(28), MoveFlag::Normal))
            .expect("e2e4 should apply");
        assert_eq!(next.rights.en_passant, Some(sq(20)));
        assert_eq!(next.side_to_move, Color::Black);
        assert_eq!(next.halfmove_clock, 0);
        assert_eq!(next.fullmove_number, 1);
    }

    #[test]
    fn castling_moves_rook_and_clears_rights() {
        let position =
            Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 3 10").expect("FEN should parse");
        let next = apply_move(&position, &Move::new(Square::E1, Square::G1, MoveFlag::CastleKingside))
            .expect("castle should apply");
        assert_eq!(next.board.piece_at(Square::F1), Some(Piece::new(PieceKind::Rook, Color::White)));
        assert_eq!(next.board.piece_at(Square::H1), None);
        assert_eq!(next.rights.castling, CASTLE_BLACK_KINGSIDE | CASTLE_BLACK_QUEENSIDE);
        assert_eq!(next.halfmove_clock, 4);
    }

    #[test]
    fn capturing_a_corner_rook_removes_that_right() {
        let position =
            Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").expect("FEN should parse");
        let next = apply_move(&position, &Move::new(Square::A1, Square::A8, MoveFlag::Capture))
            .expect("rook capture should apply");
        assert_eq!(next.rights.castling, CASTLE_WHITE_KINGSIDE | CASTLE_BLACK_KINGSIDE);
    }

    #[test]
    fn en_passant_removes_the_passed_pawn() {
        let position =
            Position::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2").expect("FEN should parse");
        let next = apply_move(&position, &Move::new(sq(36), sq(43), MoveFlag::EnPassant))
            .expect("en passant should apply");
        assert_eq!(next.board.piece_at(sq(35)), None);
        assert_eq!(next.board.piece_at(sq(43)), Some(Piece::new(PieceKind::Pawn, Color::White)));
    }

    #[test]
    fn make_then_unmake_restores_every_child_position() {
        let fens = [
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "r2q1rk1/pP1p2pp/Q4n2/bbp1p3/Np6/1B3NBn/pPPP1PPP/R3K2R b KQ - 0 1",
            "4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2",
        ];
        for fen in fens {
            let original = Position::from_fen(fen).expect("FEN should parse");
            let moves = LegalMoveGenerator
                .generate_legal_moves(&original)
                .expect("generation should succeed");
            assert!(!moves.is_empty());
            for mv in moves {
                let mut scratch = original.clone();
                let undo = make_move(&mut scratch, &mv).expect("legal move should apply");
                unmake_move(&mut scratch, &undo).expect("undo should apply");
                assert_eq!(scratch, original, "make/unmake mismatch for {mv} in {fen}");
            }
        }
    }

    #[test]
    fn moving_from_an_empty_square_fails() {
        let game = Position::new_game();
        assert!(apply_move(&game, &Move::new(sq(28), sq(36), MoveFlag::Normal)).is_err());
    }
}
