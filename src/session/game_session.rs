//! One game between two sides: the authoritative position, its history and
//! the active/ended state machine.
//!
//! Every mutating operation validates against the legal-move oracle, works on
//! a scratch copy of the position and only commits once every check passed,
//! so a rejected request leaves the session exactly as it was.

use log::{debug, info};

use crate::errors::{InvariantViolation, SelectionFault, SessionError};
use crate::game_state::chess_types::*;
use crate::game_state::position::Position;
use crate::game_state::undo_state::UndoState;
use crate::move_generation::legal_move_apply::{make_move, unmake_move};
use crate::move_generation::legal_move_checks::is_in_check;
use crate::move_generation::legal_move_generator::LegalMoveGenerator;
use crate::move_generation::move_generator::MoveGenerator;
use crate::moves::chess_move::Move;
use crate::session::draw_rules::detect_draw;
use crate::session::game_result::{EndReason, GameResult};
use crate::utils::long_algebraic::moves_to_long_algebraic;

/// Everything needed to take a move back exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryEntry {
    pub undo: UndoState,
    pub prev_result: Option<GameResult>,
}

impl HistoryEntry {
    #[inline]
    pub fn mv(&self) -> Move {
        self.undo.mv
    }
}

/// Outcome of a successful `attempt_move`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedMove {
    pub mv: Move,
    pub captured: Option<Piece>,
    /// The side now to move is in check.
    pub check: bool,
    /// Set when this move ended the game.
    pub result: Option<GameResult>,
}

#[derive(Debug, Clone)]
pub struct GameSession {
    position: Position,
    history: Vec<HistoryEntry>,
    /// One key per position of the game, the current one last.
    position_keys: Vec<u64>,
    pending_draw_offer: Option<Color>,
    result: Option<GameResult>,
    move_generator: LegalMoveGenerator,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GameSession {
    /// A game from the standard starting position.
    pub fn new() -> Self {
        let position = Position::new_game();
        Self {
            position_keys: vec![position.key()],
            position,
            history: Vec::new(),
            pending_draw_offer: None,
            result: None,
            move_generator: LegalMoveGenerator,
        }
    }

    /// A game starting from an arbitrary position. The position must be one
    /// that can arise in play: one king per side, no pawns on the back ranks,
    /// the side that just moved not left in check, and an en-passant square
    /// only right behind a pawn that just double-pushed. A position that is
    /// already decided starts out ended.
    pub fn from_fen(fen: &str) -> Result<Self, SessionError> {
        let position = Position::from_fen(fen).map_err(SessionError::InvalidPosition)?;
        validate_start_position(&position)?;

        let mut session = Self {
            position_keys: vec![position.key()],
            position,
            history: Vec::new(),
            pending_draw_offer: None,
            result: None,
            move_generator: LegalMoveGenerator,
        };
        session.result = session.evaluate_position(&session.position, &session.position_keys)?;
        Ok(session)
    }

    #[inline]
    pub fn position(&self) -> &Position {
        &self.position
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.position.side_to_move
    }

    #[inline]
    pub fn result(&self) -> Option<GameResult> {
        self.result
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.result.is_none()
    }

    #[inline]
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    #[inline]
    pub fn pending_draw_offer(&self) -> Option<Color> {
        self.pending_draw_offer
    }

    pub fn is_in_check(&self) -> bool {
        self.move_generator.is_in_check(&self.position.board, self.position.side_to_move)
    }

    pub fn fen(&self) -> String {
        self.position.to_fen()
    }

    /// Moves played so far in long algebraic form.
    pub fn move_list(&self) -> String {
        let moves: Vec<Move> = self.history.iter().map(HistoryEntry::mv).collect();
        moves_to_long_algebraic(&moves)
    }

    /// All legal moves of the side to move.
    pub fn legal_moves(&self) -> Result<Vec<Move>, SessionError> {
        Ok(self.move_generator.generate_legal_moves(&self.position)?)
    }

    /// Legal moves of the piece on `square`; empty for an empty square or a
    /// piece of the side not to move. Never mutates the session.
    pub fn select_and_query(&self, square: Square) -> Result<Vec<Move>, SessionError> {
        self.ensure_active("select a piece")?;
        Ok(self.move_generator.moves_from(&self.position, square)?)
    }

    /// Plays `source -> target`. A promotion without an explicit choice
    /// promotes to a queen.
    pub fn attempt_move(
        &mut self,
        source: Square,
        target: Square,
        promotion: Option<PieceKind>,
    ) -> Result<AppliedMove, SessionError> {
        self.ensure_active("move")?;

        let side = self.position.side_to_move;
        match self.position.board.piece_at(source) {
            None => {
                return Err(SessionError::InvalidSelection(SelectionFault::EmptySquare(source)));
            }
            Some(piece) if piece.color != side => {
                return Err(SessionError::InvalidSelection(SelectionFault::WrongColor {
                    square: source,
                    color: piece.color,
                }));
            }
            Some(_) => {}
        }

        let candidates = self.move_generator.moves_from(&self.position, source)?;
        let mv = candidates
            .into_iter()
            .find(|mv| mv.target == target && promotion_matches(mv, promotion))
            .ok_or(SessionError::IllegalMove { source, target })?;

        let mut next = self.position.clone();
        let undo = make_move(&mut next, &mv).map_err(internal)?;
        next.board.check_invariants()?;

        let mut keys = self.position_keys.clone();
        keys.push(next.key());
        let result = self.evaluate_position(&next, &keys)?;
        let check = self.move_generator.is_in_check(&next.board, next.side_to_move);

        self.history.push(HistoryEntry {
            undo,
            prev_result: self.result,
        });
        self.position = next;
        self.position_keys = keys;
        self.pending_draw_offer = None;
        self.result = result;

        debug!("{side} played {mv}");
        if let Some(result) = result {
            info!("game over after {mv}: {result}");
        }

        Ok(AppliedMove {
            mv,
            captured: undo.captured_piece,
            check,
            result,
        })
    }

    /// Takes back the last move. Also reopens a game that move ended; a game
    /// ended by resignation or agreement stays ended.
    pub fn undo_last_move(&mut self) -> Result<Move, SessionError> {
        if let Some(result) = self.result {
            if !result.reason.is_produced_by_move() {
                return Err(SessionError::IllegalOperation("undo"));
            }
        }

        let entry = *self.history.last().ok_or(SessionError::NothingToUndo)?;

        let mut prev = self.position.clone();
        unmake_move(&mut prev, &entry.undo).map_err(internal)?;
        prev.board.check_invariants()?;

        self.history.pop();
        self.position_keys.pop();
        self.position = prev;
        self.result = entry.prev_result;
        self.pending_draw_offer = None;

        debug!("took back {}", entry.mv());
        Ok(entry.mv())
    }

    pub fn resign(&mut self, color: Color) -> Result<GameResult, SessionError> {
        self.ensure_active("resign")?;
        let result = GameResult::win(color.opposite(), EndReason::Resignation);
        self.finish(result);
        Ok(result)
    }

    /// Records a draw offer by `color`. Has no effect on the board.
    pub fn offer_draw(&mut self, color: Color) -> Result<(), SessionError> {
        self.ensure_active("offer a draw")?;
        self.pending_draw_offer = Some(color);
        debug!("{color} offers a draw");
        Ok(())
    }

    /// Ends the game as agreed when the other side has an offer pending.
    pub fn accept_draw(&mut self, color: Color) -> Result<GameResult, SessionError> {
        self.ensure_active("accept a draw")?;
        if self.pending_draw_offer != Some(color.opposite()) {
            return Err(SessionError::DrawNotOffered);
        }
        let result = GameResult::draw(EndReason::DrawAgreement);
        self.finish(result);
        Ok(result)
    }

    pub fn decline_draw(&mut self, color: Color) -> Result<(), SessionError> {
        self.ensure_active("decline a draw")?;
        if self.pending_draw_offer != Some(color.opposite()) {
            return Err(SessionError::DrawNotOffered);
        }
        self.pending_draw_offer = None;
        debug!("{color} declines the draw");
        Ok(())
    }

    fn finish(&mut self, result: GameResult) {
        self.pending_draw_offer = None;
        self.result = Some(result);
        info!("game over: {result}");
    }

    fn ensure_active(&self, action: &'static str) -> Result<(), SessionError> {
        if self.result.is_some() {
            return Err(SessionError::IllegalOperation(action));
        }
        Ok(())
    }

    /// Result of the game in `position`, which the side that just moved
    /// left behind. `keys` ends with that position's key.
    fn evaluate_position(
        &self,
        position: &Position,
        keys: &[u64],
    ) -> Result<Option<GameResult>, SessionError> {
        let side = position.side_to_move;
        if self.move_generator.generate_legal_moves(position)?.is_empty() {
            return Ok(Some(if self.move_generator.is_in_check(&position.board, side) {
                GameResult::win(side.opposite(), EndReason::Checkmate)
            } else {
                GameResult::draw(EndReason::Stalemate)
            }));
        }

        Ok(detect_draw(position, keys).map(|rule| GameResult::draw(EndReason::DrawByRule(rule))))
    }
}

fn promotion_matches(mv: &Move, requested: Option<PieceKind>) -> bool {
    match mv.promotion {
        Some(kind) => requested.unwrap_or(PieceKind::Queen) == kind,
        None => requested.is_none(),
    }
}

fn internal(msg: String) -> SessionError {
    SessionError::Internal(InvariantViolation::MoveGeneration(msg))
}

fn validate_start_position(position: &Position) -> Result<(), SessionError> {
    let board = &position.board;
    for color in Color::BOTH {
        let kings = board.pieces_of(color, PieceKind::King).count_ones();
        if kings != 1 {
            return Err(SessionError::InvalidPosition(format!(
                "{color} must have exactly one king, found {kings}"
            )));
        }
    }

    let back_ranks = 0xFF00_0000_0000_00FF_u64;
    let pawns = board.pieces_of(Color::White, PieceKind::Pawn)
        | board.pieces_of(Color::Black, PieceKind::Pawn);
    if pawns & back_ranks != 0 {
        return Err(SessionError::InvalidPosition(
            "pawns cannot stand on the first or last rank".to_owned(),
        ));
    }

    if is_in_check(board, position.side_to_move.opposite()) {
        return Err(SessionError::InvalidPosition(format!(
            "{} is in check but not to move",
            position.side_to_move.opposite()
        )));
    }

    if let Some(target) = position.rights.en_passant {
        validate_en_passant_target(position, target)?;
    }

    Ok(())
}

/// The target must be the empty square a double-pushed enemy pawn just
/// crossed: enemy pawn in front of it, its start square empty.
fn validate_en_passant_target(position: &Position, target: Square) -> Result<(), SessionError> {
    let mover = position.side_to_move;
    let pusher = mover.opposite();
    let (target_rank, forward) = match mover {
        Color::White => (5, -1),
        Color::Black => (2, 1),
    };
    let invalid = |why: &str| {
        Err(SessionError::InvalidPosition(format!(
            "en-passant square {target} {why}"
        )))
    };

    if target.rank() != target_rank {
        return invalid(&format!("is not on rank {} for {mover} to move", target_rank + 1));
    }
    if position.board.piece_at(target).is_some() {
        return invalid("is occupied");
    }

    let pushed_to = target.offset(0, forward);
    let expected = Piece::new(PieceKind::Pawn, pusher);
    if pushed_to.and_then(|sq| position.board.piece_at(sq)) != Some(expected) {
        return invalid(&format!("has no {pusher} pawn in front of it"));
    }

    let pushed_from = target.offset(0, -forward);
    if pushed_from.and_then(|sq| position.board.piece_at(sq)).is_some() {
        return invalid("cannot follow a double push: the start square is occupied");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::GameSession;
    use crate::errors::{SelectionFault, SessionError};
    use crate::game_state::chess_types::*;
    use crate::moves::chess_move::MoveFlag;
    use crate::session::game_result::{DrawRule, EndReason, GameResult};

    fn sq(name: &str) -> Square {
        name.parse().expect("test square should parse")
    }

    fn play(session: &mut GameSession, moves: &[&str]) {
        for text in moves {
            let (from, to) = text.split_at(2);
            session
                .attempt_move(sq(from), sq(&to[..2]), None)
                .unwrap_or_else(|err| panic!("{text} should be legal: {err}"));
        }
    }

    #[test]
    fn selecting_e2_offers_e3_and_e4() {
        let session = GameSession::new();
        let mut targets: Vec<u8> = session
            .select_and_query(sq("e2"))
            .expect("query should succeed")
            .into_iter()
            .map(|mv| mv.target.value())
            .collect();
        targets.sort_unstable();
        assert_eq!(targets, vec![20, 28]);
    }

    #[test]
    fn selecting_an_enemy_piece_yields_nothing() {
        let session = GameSession::new();
        assert!(session.select_and_query(sq("e7")).expect("query").is_empty());
        assert!(session.select_and_query(sq("e4")).expect("query").is_empty());
    }

    #[test]
    fn fools_mate_ends_in_checkmate_for_black() {
        let mut session = GameSession::new();
        play(&mut session, &["f2f3", "e7e5", "g2g4"]);
        let applied = session
            .attempt_move(sq("d8"), sq("h4"), None)
            .expect("Qh4 should be legal");
        let expected = GameResult::win(Color::Black, EndReason::Checkmate);
        assert!(applied.check);
        assert_eq!(applied.result, Some(expected));
        assert_eq!(session.result(), Some(expected));
        assert!(!session.is_active());
    }

    #[test]
    fn ended_game_rejects_further_actions() {
        let mut session = GameSession::new();
        play(&mut session, &["f2f3", "e7e5", "g2g4", "d8h4"]);
        assert_eq!(
            session.attempt_move(sq("e2"), sq("e4"), None),
            Err(SessionError::IllegalOperation("move"))
        );
        assert!(matches!(
            session.select_and_query(sq("e2")),
            Err(SessionError::IllegalOperation(_))
        ));
        assert!(matches!(session.resign(Color::White), Err(SessionError::IllegalOperation(_))));
        assert!(matches!(session.offer_draw(Color::White), Err(SessionError::IllegalOperation(_))));
    }

    #[test]
    fn wrong_color_is_an_invalid_selection() {
        let mut session = GameSession::new();
        let before = session.position().clone();
        assert_eq!(
            session.attempt_move(sq("e7"), sq("e5"), None),
            Err(SessionError::InvalidSelection(SelectionFault::WrongColor {
                square: sq("e7"),
                color: Color::Black,
            }))
        );
        assert_eq!(
            session.attempt_move(sq("e4"), sq("e5"), None),
            Err(SessionError::InvalidSelection(SelectionFault::EmptySquare(sq("e4"))))
        );
        assert_eq!(session.position(), &before);
        assert!(session.history().is_empty());
    }

    #[test]
    fn target_outside_legal_set_is_an_illegal_move() {
        let mut session = GameSession::new();
        assert_eq!(
            session.attempt_move(sq("e2"), sq("e5"), None),
            Err(SessionError::IllegalMove {
                source: sq("e2"),
                target: sq("e5"),
            })
        );
        assert_eq!(session.side_to_move(), Color::White);
    }

    #[test]
    fn undo_restores_everything() {
        let mut session = GameSession::new();
        play(&mut session, &["e2e4", "d7d5"]);
        let before = session.position().clone();
        let fen_before = session.fen();

        let applied = session.attempt_move(sq("e4"), sq("d5"), None).expect("exd5");
        assert_eq!(applied.captured, Some(Piece::new(PieceKind::Pawn, Color::Black)));
        assert_eq!(session.undo_last_move(), Ok(applied.mv));

        assert_eq!(session.position(), &before);
        assert_eq!(session.fen(), fen_before);
        assert_eq!(session.history().len(), 2);
        assert!(session.is_active());
    }

    #[test]
    fn undo_reopens_a_mated_game() {
        let mut session = GameSession::new();
        play(&mut session, &["f2f3", "e7e5", "g2g4", "d8h4"]);
        session.undo_last_move().expect("undo of mate should succeed");
        assert!(session.is_active());
        assert_eq!(session.side_to_move(), Color::Black);
    }

    #[test]
    fn nothing_to_undo_on_a_fresh_game() {
        assert_eq!(GameSession::new().undo_last_move(), Err(SessionError::NothingToUndo));
    }

    #[test]
    fn resignation_cannot_be_undone() {
        let mut session = GameSession::new();
        play(&mut session, &["e2e4"]);
        assert_eq!(
            session.resign(Color::Black),
            Ok(GameResult::win(Color::White, EndReason::Resignation))
        );
        assert_eq!(session.undo_last_move(), Err(SessionError::IllegalOperation("undo")));
    }

    #[test]
    fn draw_handshake_needs_the_other_side() {
        let mut session = GameSession::new();
        assert_eq!(session.accept_draw(Color::Black), Err(SessionError::DrawNotOffered));

        session.offer_draw(Color::White).expect("offer");
        assert_eq!(session.pending_draw_offer(), Some(Color::White));
        assert_eq!(session.accept_draw(Color::White), Err(SessionError::DrawNotOffered));
        assert_eq!(
            session.accept_draw(Color::Black),
            Ok(GameResult::draw(EndReason::DrawAgreement))
        );
        assert_eq!(session.undo_last_move(), Err(SessionError::IllegalOperation("undo")));
    }

    #[test]
    fn draw_offer_can_be_declined_or_lapse() {
        let mut session = GameSession::new();
        session.offer_draw(Color::White).expect("offer");
        session.decline_draw(Color::Black).expect("decline");
        assert_eq!(session.pending_draw_offer(), None);
        assert_eq!(session.decline_draw(Color::Black), Err(SessionError::DrawNotOffered));

        session.offer_draw(Color::White).expect("offer");
        play(&mut session, &["e2e4"]);
        assert_eq!(session.pending_draw_offer(), None);
        assert_eq!(session.accept_draw(Color::Black), Err(SessionError::DrawNotOffered));
    }

    #[test]
    fn promotion_defaults_to_queen_and_honours_choice() {
        let fen = "3r2k1/4P3/8/8/8/8/8/4K3 w - - 0 1";
        let mut session = GameSession::from_fen(fen).expect("FEN should load");
        let applied = session.attempt_move(sq("e7"), sq("e8"), None).expect("e8=Q");
        assert_eq!(applied.mv.promotion, Some(PieceKind::Queen));
        assert!(applied.check);

        let mut session = GameSession::from_fen(fen).expect("FEN should load");
        let applied = session
            .attempt_move(sq("e7"), sq("d8"), Some(PieceKind::Knight))
            .expect("exd8=N");
        assert_eq!(applied.mv.flag, MoveFlag::Promotion);
        assert_eq!(applied.captured, Some(Piece::new(PieceKind::Rook, Color::Black)));
        assert_eq!(
            session.position().board.piece_at(sq("d8")),
            Some(Piece::new(PieceKind::Knight, Color::White))
        );
        session.undo_last_move().expect("undo");
        assert_eq!(session.fen(), fen);
    }

    #[test]
    fn promotion_choice_on_a_plain_move_is_illegal() {
        let mut session = GameSession::new();
        assert!(matches!(
            session.attempt_move(sq("e2"), sq("e4"), Some(PieceKind::Queen)),
            Err(SessionError::IllegalMove { .. })
        ));
    }

    #[test]
    fn fifty_quiet_moves_draw_by_rule() {
        let mut session =
            GameSession::from_fen("4k2r/8/8/8/8/8/8/R3K3 w - - 99 70").expect("FEN should load");
        let applied = session.attempt_move(sq("a1"), sq("a2"), None).expect("Ra2");
        assert_eq!(
            applied.result,
            Some(GameResult::draw(EndReason::DrawByRule(DrawRule::FiftyMove)))
        );
    }

    #[test]
    fn threefold_repetition_draws() {
        let mut session = GameSession::new();
        play(&mut session, &["g1f3", "g8f6", "f3g1", "f6g8", "g1f3", "g8f6", "f3g1"]);
        assert!(session.is_active());
        let applied = session.attempt_move(sq("f6"), sq("g8"), None).expect("Ng8");
        assert_eq!(
            applied.result,
            Some(GameResult::draw(EndReason::DrawByRule(DrawRule::ThreefoldRepetition)))
        );
    }

    #[test]
    fn capture_down_to_bare_kings_is_insufficient_material() {
        let mut session =
            GameSession::from_fen("4k3/8/8/8/8/8/3r4/4K3 w - - 0 40").expect("FEN should load");
        let applied = session.attempt_move(sq("e1"), sq("d2"), None).expect("Kxd2");
        assert_eq!(
            applied.result,
            Some(GameResult::draw(EndReason::DrawByRule(DrawRule::InsufficientMaterial)))
        );
    }

    #[test]
    fn stalemate_has_no_winner() {
        let mut session =
            GameSession::from_fen("7k/8/6K1/8/8/8/8/5Q2 w - - 0 1").expect("FEN should load");
        let applied = session.attempt_move(sq("f1"), sq("f7"), None).expect("Qf7");
        assert_eq!(applied.result, Some(GameResult::draw(EndReason::Stalemate)));
    }

    #[test]
    fn repeated_queries_are_identical() {
        let session = GameSession::new();
        let first = session.select_and_query(sq("g1")).expect("query");
        let second = session.select_and_query(sq("g1")).expect("query");
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn implausible_positions_are_rejected() {
        for fen in [
            "8/8/8/8/8/8/8/4K3 w - - 0 1",
            "4k3/8/8/8/8/8/8/3KK3 w - - 0 1",
            "4k3/8/8/8/8/8/8/P3K3 w - - 0 1",
            "4k3/8/8/8/8/8/8/4K2r b - - 0 1",
            "not a fen",
        ] {
            assert!(
                matches!(GameSession::from_fen(fen), Err(SessionError::InvalidPosition(_))),
                "{fen} should be rejected"
            );
        }
    }

    fn rejects_fen(fen: &str, reason: &str) {
        match GameSession::from_fen(fen) {
            Err(SessionError::InvalidPosition(msg)) => {
                assert!(msg.contains(reason), "{fen}: {msg}");
            }
            other => panic!("{fen} should be rejected, got {other:?}"),
        }
    }

    #[test]
    fn en_passant_square_on_the_wrong_rank_is_rejected() {
        rejects_fen("4k3/8/8/8/8/8/3PP3/4K3 w - e3 0 1", "is not on rank 6");
        rejects_fen("4k3/8/8/3Pp3/8/8/8/4K3 b - e6 0 1", "is not on rank 3");
    }

    #[test]
    fn occupied_en_passant_square_is_rejected() {
        rejects_fen("4k3/8/4n3/3Pp3/8/8/8/4K3 w - e6 0 1", "is occupied");
    }

    #[test]
    fn en_passant_square_without_pushed_pawn_is_rejected() {
        rejects_fen("4k3/8/8/3Pn3/8/8/8/4K3 w - e6 0 1", "has no black pawn");
        rejects_fen("4k3/8/8/3PP3/8/8/8/4K3 w - e6 0 1", "has no black pawn");
    }

    #[test]
    fn en_passant_square_with_occupied_start_is_rejected() {
        rejects_fen("4k3/4n3/8/3Pp3/8/8/8/4K3 w - e6 0 1", "start square is occupied");
    }

    #[test]
    fn genuine_en_passant_fen_captures_the_pawn() {
        let mut session =
            GameSession::from_fen("4k3/8/8/3Pp3/8/8/8/4K3 w - e6 0 2").expect("FEN should load");
        let applied = session.attempt_move(sq("d5"), sq("e6"), None).expect("dxe6");
        assert_eq!(applied.mv.flag, MoveFlag::EnPassant);
        assert_eq!(applied.captured, Some(Piece::new(PieceKind::Pawn, Color::Black)));
        assert_eq!(session.fen(), "4k3/8/4P3/8/8/8/8/4K3 b - - 0 2");

        let black = GameSession::from_fen("4k3/8/8/8/3pP3/8/8/4K3 b - e3 0 1");
        assert!(black.is_ok());
    }

    #[test]
    fn move_list_is_long_algebraic() {
        let mut session = GameSession::new();
        play(&mut session, &["e2e4", "e7e5", "g1f3"]);
        assert_eq!(session.move_list(), "e2e4 e7e5 g1f3");
    }
}
