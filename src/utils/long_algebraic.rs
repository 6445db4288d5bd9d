//! Long algebraic move text (`e2e4`, `e7e8q`).
//!
//! Parsing only yields coordinates and an optional promotion choice; whether
//! the move is legal is for the session to decide.

use crate::game_state::chess_types::*;
use crate::moves::chess_move::Move;
use crate::utils::algebraic::algebraic_to_square;

/// A move request as typed by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRequest {
    pub source: Square,
    pub target: Square,
    pub promotion: Option<PieceKind>,
}

pub fn parse_long_algebraic(long_algebraic: &str) -> Result<MoveRequest, String> {
    let text = long_algebraic.trim();
    if !text.is_ascii() || (text.len() != 4 && text.len() != 5) {
        return Err(format!("Invalid long algebraic move: {long_algebraic}"));
    }

    let source = algebraic_to_square(&text[0..2])?;
    let target = algebraic_to_square(&text[2..4])?;
    let promotion = match text[4..].chars().next() {
        Some(ch) => Some(char_to_promotion(ch)?),
        None => None,
    };

    Ok(MoveRequest {
        source,
        target,
        promotion,
    })
}

/// Promotion letter (either case) to the piece it selects.
pub fn char_to_promotion(ch: char) -> Result<PieceKind, String> {
    match PieceKind::from_fen_char(ch.to_ascii_lowercase()) {
        Some(kind) if PieceKind::PROMOTION_CHOICES.contains(&kind) => Ok(kind),
        _ => Err(format!("Invalid promotion piece: {ch}")),
    }
}

/// Space-separated long algebraic rendering of a move list.
pub fn moves_to_long_algebraic(moves: &[Move]) -> String {
    moves
        .iter()
        .map(Move::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
