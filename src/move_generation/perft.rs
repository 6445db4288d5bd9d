use std::sync::Arc;
use std::thread;

use crate::game_state::position::Position;
use crate::move_generation::legal_move_apply::apply_move;
use crate::move_generation::legal_move_checks::is_in_check;
use crate::move_generation::move_generator::{MoveGenResult, MoveGenerationError, MoveGenerator};
use crate::moves::chess_move::{Move, MoveFlag};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerftCounts {
    pub nodes: usize,
    pub captures: usize,
    pub en_passant: usize,
    pub castles: usize,
    pub promotions: usize,
    pub checks: usize,
    pub checkmates: usize,
}

impl PerftCounts {
    fn merge(&mut self, rhs: PerftCounts) {
        self.nodes += rhs.nodes;
        self.captures += rhs.captures;
        self.en_passant += rhs.en_passant;
        self.castles += rhs.castles;
        self.promotions += rhs.promotions;
        self.checks += rhs.checks;
        self.checkmates += rhs.checkmates;
    }
}

pub fn perft<G: MoveGenerator>(generator: &G, position: &Position, depth: u8) -> MoveGenResult<PerftCounts> {
    let mut total = PerftCounts::default();
    perft_recurse(generator, position, depth, &mut total)?;
    Ok(total)
}

/// Splits the root moves across one thread each.
pub fn perft_multi_threaded(
    generator: Arc<dyn MoveGenerator>,
    position: &Position,
    depth: u8,
) -> MoveGenResult<PerftCounts> {
    if depth == 0 {
        return Ok(PerftCounts {
            nodes: 1,
            ..PerftCounts::default()
        });
    }

    let root_moves = generator.generate_legal_moves(position)?;
    let mut handles = Vec::with_capacity(root_moves.len());

    for mv in root_moves {
        let generator_ref = Arc::clone(&generator);
        let root = position.clone();
        handles.push(thread::spawn(move || {
            let mut local = PerftCounts::default();
            let result = perft_from_move(generator_ref.as_ref(), &root, &mv, depth, &mut local);
            (result, local)
        }));
    }

    let mut total = PerftCounts::default();
    for handle in handles {
        let (result, local) = handle
            .join()
            .map_err(|_| MoveGenerationError::InvalidState("perft worker thread panicked".to_owned()))?;
        result?;
        total.merge(local);
    }

    Ok(total)
}

fn perft_recurse(
    generator: &dyn MoveGenerator,
    position: &Position,
    depth: u8,
    counts: &mut PerftCounts,
) -> MoveGenResult<()> {
    if depth == 0 {
        counts.nodes += 1;
        return Ok(());
    }

    for mv in generator.generate_legal_moves(position)? {
        perft_from_move(generator, position, &mv, depth, counts)?;
    }

    Ok(())
}

fn perft_from_move(
    generator: &dyn MoveGenerator,
    position: &Position,
    mv: &Move,
    depth: u8,
    counts: &mut PerftCounts,
) -> MoveGenResult<()> {
    let next = apply_move(position, mv)
        .map_err(|x| MoveGenerationError::InvalidState(format!("apply_move failed: {x}")))?;

    if depth > 1 {
        return perft_recurse(generator, &next, depth - 1, counts);
    }

    counts.nodes += 1;
    match mv.flag {
        MoveFlag::Capture => counts.captures += 1,
        MoveFlag::EnPassant => {
            counts.captures += 1;
            counts.en_passant += 1;
        }
        MoveFlag::CastleKingside | MoveFlag::CastleQueenside => counts.castles += 1,
        MoveFlag::Promotion => {
            counts.promotions += 1;
            if position.board.piece_at(mv.target).is_some() {
                counts.captures += 1;
            }
        }
        MoveFlag::Normal => {}
    }

    if is_in_check(&next.board, next.side_to_move) {
        counts.checks += 1;
        if generator.generate_legal_moves(&next)?.is_empty() {
            counts.checkmates += 1;
        }
    }

    Ok(())
}
