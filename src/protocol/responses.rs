//! Request handlers producing the client-facing response documents.
//!
//! Recoverable session errors become rejected responses carrying the message;
//! only fatal errors are returned as `Err`.

use serde::Serialize;

use crate::errors::SessionError;
use crate::game_state::chess_types::*;
use crate::moves::chess_move::Move;
use crate::session::game_result::GameResult;
use crate::session::game_session::GameSession;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardResponse {
    /// FEN letter per square in square order; `None` for empty squares.
    pub pieces: Vec<Option<char>>,
    pub valid_moves: Vec<Square>,
    pub side_to_move: Color,
    pub result: Option<GameResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveResponse {
    pub move_made: bool,
    pub pieces: Vec<Option<char>>,
    /// Empty after a move; the source square's targets after a rejection.
    pub valid_moves: Vec<Square>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub played: Option<Move>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection: Option<String>,
    pub result: Option<GameResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UndoResponse {
    pub pieces: Vec<Option<char>>,
    pub undone: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    Resign,
    OfferDraw,
    AcceptDraw,
    DeclineDraw,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse {
    pub action: Action,
    pub accepted: bool,
    pub result: Option<GameResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection: Option<String>,
}

/// Board plus the targets of `selected`, sorted and de-duplicated. A finished
/// game or a square without a movable piece yields no targets.
pub fn query_board(
    session: &GameSession,
    selected: Option<Square>,
) -> Result<BoardResponse, SessionError> {
    let valid_moves = match selected {
        Some(square) if session.is_active() => targets(&session.select_and_query(square)?),
        _ => Vec::new(),
    };
    Ok(BoardResponse {
        pieces: session.position().board.symbols(),
        valid_moves,
        side_to_move: session.side_to_move(),
        result: session.result(),
    })
}

pub fn submit_move(
    session: &mut GameSession,
    source: Square,
    target: Square,
    promotion: Option<PieceKind>,
) -> Result<MoveResponse, SessionError> {
    match session.attempt_move(source, target, promotion) {
        Ok(applied) => Ok(MoveResponse {
            move_made: true,
            pieces: session.position().board.symbols(),
            valid_moves: Vec::new(),
            played: Some(applied.mv),
            rejection: None,
            result: applied.result,
        }),
        Err(err) if err.is_fatal() => Err(err),
        Err(err) => {
            let valid_moves = if session.is_active() {
                targets(&session.select_and_query(source)?)
            } else {
                Vec::new()
            };
            Ok(MoveResponse {
                move_made: false,
                pieces: session.position().board.symbols(),
                valid_moves,
                played: None,
                rejection: Some(err.to_string()),
                result: session.result(),
            })
        }
    }
}

pub fn undo(session: &mut GameSession) -> Result<UndoResponse, SessionError> {
    let rejection = match session.undo_last_move() {
        Ok(_) => None,
        Err(err) if err.is_fatal() => return Err(err),
        Err(err) => Some(err.to_string()),
    };
    Ok(UndoResponse {
        pieces: session.position().board.symbols(),
        undone: rejection.is_none(),
        rejection,
    })
}

/// Runs one of the non-move actions on behalf of `color`.
pub fn perform_action(
    session: &mut GameSession,
    action: Action,
    color: Color,
) -> Result<ActionResponse, SessionError> {
    let outcome = match action {
        Action::Resign => session.resign(color).map(|_| ()),
        Action::OfferDraw => session.offer_draw(color),
        Action::AcceptDraw => session.accept_draw(color).map(|_| ()),
        Action::DeclineDraw => session.decline_draw(color),
    };
    let rejection = match outcome {
        Ok(()) => None,
        Err(err) if err.is_fatal() => return Err(err),
        Err(err) => Some(err.to_string()),
    };
    Ok(ActionResponse {
        action,
        accepted: rejection.is_none(),
        result: session.result(),
        rejection,
    })
}

fn targets(moves: &[Move]) -> Vec<Square> {
    let mut out: Vec<Square> = moves.iter().map(|mv| mv.target).collect();
    out.sort_unstable();
    out.dedup();
    out
}
