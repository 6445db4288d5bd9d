//! Errors reported by sessions and the registry.
//!
//! Every `SessionError` except `Internal` is a rejected action the front end
//! surfaces and recovers from by re-rendering. `Internal` means the session
//! state can no longer be trusted.

use std::error::Error;
use std::fmt;

use crate::game_state::chess_types::{Color, Square};
use crate::move_generation::move_generator::MoveGenerationError;

/// Why a selected source square cannot move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionFault {
    EmptySquare(Square),
    WrongColor { square: Square, color: Color },
}

impl fmt::Display for SelectionFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionFault::EmptySquare(square) => write!(f, "no piece on {square}"),
            SelectionFault::WrongColor { square, color } => {
                write!(f, "piece on {square} belongs to {color}, not the side to move")
            }
        }
    }
}

/// Broken board or session bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    MultipleKings { color: Color, count: u32 },
    BoardOutOfSync(Square),
    PoisonedLock(String),
    MoveGeneration(String),
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvariantViolation::MultipleKings { color, count } => {
                write!(f, "{color} has {count} kings")
            }
            InvariantViolation::BoardOutOfSync(square) => {
                write!(f, "square list and bitboards disagree on {square}")
            }
            InvariantViolation::PoisonedLock(what) => write!(f, "lock poisoned: {what}"),
            InvariantViolation::MoveGeneration(msg) => write!(f, "move generation failed: {msg}"),
        }
    }
}

impl Error for InvariantViolation {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The game has ended; only undo of a move-produced result is allowed.
    IllegalOperation(&'static str),
    InvalidSelection(SelectionFault),
    IllegalMove { source: Square, target: Square },
    NothingToUndo,
    UnknownSession(String),
    DrawNotOffered,
    InvalidPosition(String),
    Internal(InvariantViolation),
}

impl SessionError {
    /// True for errors after which the session must not be used further.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SessionError::Internal(_))
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::IllegalOperation(what) => {
                write!(f, "cannot {what}: the game is over")
            }
            SessionError::InvalidSelection(fault) => write!(f, "invalid selection: {fault}"),
            SessionError::IllegalMove { source, target } => {
                write!(f, "illegal move {source}{target}")
            }
            SessionError::NothingToUndo => write!(f, "no moves to undo"),
            SessionError::UnknownSession(id) => write!(f, "unknown session '{id}'"),
            SessionError::DrawNotOffered => write!(f, "no draw offer from the opponent is pending"),
            SessionError::InvalidPosition(msg) => write!(f, "invalid position: {msg}"),
            SessionError::Internal(violation) => write!(f, "internal error: {violation}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SessionError::Internal(violation) => Some(violation),
            _ => None,
        }
    }
}

impl From<InvariantViolation> for SessionError {
    fn from(value: InvariantViolation) -> Self {
        SessionError::Internal(value)
    }
}

impl From<MoveGenerationError> for SessionError {
    fn from(value: MoveGenerationError) -> Self {
        SessionError::Internal(InvariantViolation::MoveGeneration(value.to_string()))
    }
}
