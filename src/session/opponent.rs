//! Automated opponent played by the front end.
//!
//! Selects uniformly from legal moves; no search. Seeded opponents replay the
//! same game for the same human moves, which tests rely on.

use rand::prelude::IndexedRandom;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::game_state::chess_rules::OPPONENT_DRAW_ACCEPT_HALFMOVES;
use crate::game_state::chess_types::Color;
use crate::game_state::position::Position;
use crate::move_generation::legal_move_generator::LegalMoveGenerator;
use crate::move_generation::move_generator::{MoveGenResult, MoveGenerator};
use crate::moves::chess_move::Move;

pub trait Opponent: Send {
    fn name(&self) -> &str;

    /// A move for the side to move, or `None` when it has no legal move.
    fn choose_move(&mut self, position: &Position) -> MoveGenResult<Option<Move>>;

    /// Answer to a draw offered by the other side.
    fn accepts_draw(&self, position: &Position, color: Color) -> bool;
}

pub struct RandomOpponent {
    move_generator: LegalMoveGenerator,
    rng: StdRng,
}

impl RandomOpponent {
    pub fn new() -> Self {
        Self {
            move_generator: LegalMoveGenerator,
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            move_generator: LegalMoveGenerator,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomOpponent {
    fn default() -> Self {
        Self::new()
    }
}

impl Opponent for RandomOpponent {
    fn name(&self) -> &str {
        "random"
    }

    fn choose_move(&mut self, position: &Position) -> MoveGenResult<Option<Move>> {
        let legal_moves = self.move_generator.generate_legal_moves(position)?;
        log::debug!("{} opponent choosing among {} moves", self.name(), legal_moves.len());
        Ok(legal_moves.as_slice().choose(&mut self.rng).copied())
    }

    /// Accepts once the game has stalled for fifty moves or only its king is
    /// left.
    fn accepts_draw(&self, position: &Position, color: Color) -> bool {
        position.halfmove_clock >= OPPONENT_DRAW_ACCEPT_HALFMOVES
            || position.board.count(color) == 1
    }
}

#[cfg(test)]
mod tests {
    use super::{Opponent, RandomOpponent};
    use crate::game_state::chess_types::Color;
    use crate::game_state::position::Position;
    use crate::move_generation::legal_move_generator::LegalMoveGenerator;
    use crate::move_generation::move_generator::MoveGenerator;

    #[test]
    fn picks_a_legal_move() {
        let mut opponent = RandomOpponent::with_seed(7);
        assert_eq!(opponent.name(), "random");
        let game = Position::new_game();
        let legal = LegalMoveGenerator
            .generate_legal_moves(&game)
            .expect("generation should succeed");
        let picked = opponent
            .choose_move(&game)
            .expect("choice should succeed")
            .expect("start position has moves");
        assert!(legal.contains(&picked));
    }

    #[test]
    fn same_seed_same_choice() {
        let game = Position::new_game();
        let a = RandomOpponent::with_seed(42).choose_move(&game).expect("choice");
        let b = RandomOpponent::with_seed(42).choose_move(&game).expect("choice");
        assert_eq!(a, b);
    }

    #[test]
    fn no_move_when_mated() {
        let mated = Position::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")
            .expect("FEN should parse");
        assert_eq!(RandomOpponent::with_seed(1).choose_move(&mated).expect("choice"), None);
    }

    #[test]
    fn draw_acceptance_policy() {
        let opponent = RandomOpponent::with_seed(0);
        let early = Position::new_game();
        assert!(!opponent.accepts_draw(&early, Color::Black));

        let stalled = Position::from_fen("r3k3/8/8/8/8/8/8/R3K3 w - - 100 90").expect("FEN");
        assert!(opponent.accepts_draw(&stalled, Color::Black));

        let lone_king = Position::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 3 90").expect("FEN");
        assert!(opponent.accepts_draw(&lone_king, Color::Black));
        assert!(!opponent.accepts_draw(&lone_king, Color::White));
    }
}
