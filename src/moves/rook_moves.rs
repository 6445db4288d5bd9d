//! Rook ray tracing over an occupancy bitboard.

use crate::game_state::chess_types::Square;

pub const ROOK_DIRECTIONS: [(i8, i8); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

/// Squares a rook on `square` attacks. Each ray stops at, and includes, the
/// first occupied square.
#[inline]
pub fn rook_attacks(square: Square, occupancy: u64) -> u64 {
    ROOK_DIRECTIONS
        .iter()
        .fold(0u64, |acc, &(file_step, rank_step)| {
            acc | trace_ray(square, file_step, rank_step, occupancy)
        })
}

pub(crate) fn trace_ray(square: Square, file_step: i8, rank_step: i8, occupancy: u64) -> u64 {
    let mut attacks = 0u64;
    let mut current = square.offset(file_step, rank_step);

    while let Some(target) = current {
        attacks |= target.bit();
        if occupancy & target.bit() != 0 {
            break;
        }
        current = target.offset(file_step, rank_step);
    }

    attacks
}
