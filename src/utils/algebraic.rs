//! Square conversions for algebraic coordinates and front-end square tokens.
//!
//! Converts between human-readable coordinates (e.g., `e4`) and [`Square`],
//! and parses the looser square tokens the text front end accepts.

use crate::game_state::chess_types::Square;

/// Convert algebraic notation (for example: "e4") to a square.
#[inline]
pub fn algebraic_to_square(square: &str) -> Result<Square, String> {
    let bytes = square.as_bytes();
    if bytes.len() != 2 {
        return Err(format!("Invalid algebraic square: {square}"));
    }

    let file = bytes[0].to_ascii_lowercase();
    let rank = bytes[1];

    if !(b'a'..=b'h').contains(&file) {
        return Err(format!("Invalid algebraic file: {}", file as char));
    }
    if !(b'1'..=b'8').contains(&rank) {
        return Err(format!("Invalid algebraic rank: {}", rank as char));
    }

    Square::from_file_rank(file - b'a', rank - b'1')
        .ok_or_else(|| format!("Invalid algebraic square: {square}"))
}

/// Convert a square to algebraic notation (for example: "e4").
#[inline]
pub fn square_to_algebraic(square: Square) -> String {
    square.to_string()
}

/// Parses a square as typed by a client: algebraic (`e2`) or a numeric index
/// (`12`). The legacy "nothing selected" sentinels `255` and `-1` map to
/// `None`.
pub fn parse_square_token(token: &str) -> Result<Option<Square>, String> {
    let token = token.trim();
    if token.starts_with(|ch: char| ch.is_ascii_alphabetic()) {
        return algebraic_to_square(token).map(Some);
    }

    let index = token
        .parse::<i32>()
        .map_err(|_| format!("Invalid square: {token}"))?;
    match index {
        -1 | 255 => Ok(None),
        0..=63 => Ok(Square::new(index as u8)),
        _ => Err(format!("Square index out of bounds: {index}")),
    }
}
