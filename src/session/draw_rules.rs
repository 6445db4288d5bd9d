//! Automatic draw detection: insufficient material, fifty-move rule and
//! threefold repetition, checked in that order.

use crate::game_state::board::Board;
use crate::game_state::chess_rules::{FIFTY_MOVE_RULE_HALFMOVES, REPETITION_LIMIT};
use crate::game_state::chess_types::*;
use crate::game_state::position::Position;
use crate::session::game_result::DrawRule;

/// Neither side can mate: each side has its king plus at most one bishop or
/// knight.
pub fn is_insufficient_material(board: &Board) -> bool {
    Color::BOTH.into_iter().all(|color| {
        let heavy_or_pawns = board.pieces_of(color, PieceKind::Pawn)
            | board.pieces_of(color, PieceKind::Rook)
            | board.pieces_of(color, PieceKind::Queen);
        let minors = board.pieces_of(color, PieceKind::Bishop)
            | board.pieces_of(color, PieceKind::Knight);
        heavy_or_pawns == 0 && minors.count_ones() <= 1
    })
}

#[inline]
pub fn fifty_move_rule_reached(halfmove_clock: u16) -> bool {
    halfmove_clock >= FIFTY_MOVE_RULE_HALFMOVES
}

/// Occurrences of the last key among positions reachable by repetition.
///
/// `keys` holds one key per position of the game, the current one last. Only
/// the trailing `halfmove_clock + 1` entries can repeat: anything older lies
/// before a capture or pawn move.
pub fn repetition_count(keys: &[u64], halfmove_clock: u16) -> usize {
    let Some(&current) = keys.last() else {
        return 0;
    };
    let window = (usize::from(halfmove_clock) + 1).min(keys.len());
    keys[keys.len() - window..]
        .iter()
        .filter(|&&key| key == current)
        .count()
}

pub fn detect_draw(position: &Position, keys: &[u64]) -> Option<DrawRule> {
    if is_insufficient_material(&position.board) {
        return Some(DrawRule::InsufficientMaterial);
    }
    if fifty_move_rule_reached(position.halfmove_clock) {
        return Some(DrawRule::FiftyMove);
    }
    if repetition_count(keys, position.halfmove_clock) >= REPETITION_LIMIT {
        return Some(DrawRule::ThreefoldRepetition);
    }
    None
}
