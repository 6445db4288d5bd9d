//! Terminal-oriented Unicode board renderer.
//!
//! Creates a human-readable board view for the text front end, tests and
//! diagnostics. Empty squares that are valid move targets get a marker.

use crate::game_state::board::Board;
use crate::game_state::chess_types::*;

const EMPTY_SQUARE: char = '·';
const TARGET_MARKER: char = '⬧';

/// Render the board to a Unicode string for terminal output.
///
/// Assumes square indexing where `0 == a1`, `7 == h1`, and `63 == h8`.
pub fn render_board(board: &Board, targets: &[Square]) -> String {
    let mut out = String::new();

    out.push_str("  a b c d e f g h\n");

    for rank in (0..8u8).rev() {
        out.push(char::from(b'1' + rank));
        out.push(' ');

        for file in 0..8u8 {
            let Some(sq) = Square::from_file_rank(file, rank) else {
                continue;
            };
            match board.piece_at(sq) {
                Some(piece) => out.push(piece_to_unicode(piece)),
                None if targets.contains(&sq) => out.push(TARGET_MARKER),
                None => out.push(EMPTY_SQUARE),
            }

            if file < 7 {
                out.push(' ');
            }
        }

        out.push(' ');
        out.push(char::from(b'1' + rank));
        out.push('\n');
    }

    out.push_str("  a b c d e f g h");

    out
}

pub fn piece_to_unicode(piece: Piece) -> char {
    match (piece.color, piece.kind) {
        (Color::White, PieceKind::Pawn) => '♙',
        (Color::White, PieceKind::Knight) => '♘',
        (Color::White, PieceKind::Bishop) => '♗',
        (Color::White, PieceKind::Rook) => '♖',
        (Color::White, PieceKind::Queen) => '♕',
        (Color::White, PieceKind::King) => '♔',
        (Color::Black, PieceKind::Pawn) => '♟',
        (Color::Black, PieceKind::Knight) => '♞',
        (Color::Black, PieceKind::Bishop) => '♝',
        (Color::Black, PieceKind::Rook) => '♜',
        (Color::Black, PieceKind::Queen) => '♛',
        (Color::Black, PieceKind::King) => '♚',
    }
}
