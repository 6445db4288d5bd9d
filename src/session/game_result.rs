use std::fmt;

use serde::Serialize;

use crate::game_state::chess_types::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DrawRule {
    /// One hundred halfmoves without a capture or pawn move.
    FiftyMove,
    ThreefoldRepetition,
    InsufficientMaterial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EndReason {
    Checkmate,
    Stalemate,
    Resignation,
    DrawAgreement,
    DrawByRule(DrawRule),
}

impl EndReason {
    /// Results that follow from the position after a move, as opposed to a
    /// player's decision. Only these may be taken back with undo.
    #[inline]
    pub fn is_produced_by_move(self) -> bool {
        matches!(
            self,
            EndReason::Checkmate | EndReason::Stalemate | EndReason::DrawByRule(_)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct GameResult {
    pub winner: Option<Color>,
    pub reason: EndReason,
}

impl GameResult {
    pub const fn win(winner: Color, reason: EndReason) -> Self {
        Self {
            winner: Some(winner),
            reason,
        }
    }

    pub const fn draw(reason: EndReason) -> Self {
        Self {
            winner: None,
            reason,
        }
    }
}

impl fmt::Display for DrawRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawRule::FiftyMove => write!(f, "fifty-move rule"),
            DrawRule::ThreefoldRepetition => write!(f, "threefold repetition"),
            DrawRule::InsufficientMaterial => write!(f, "insufficient material"),
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self.reason {
            EndReason::Checkmate => "checkmate".to_owned(),
            EndReason::Stalemate => "stalemate".to_owned(),
            EndReason::Resignation => "resignation".to_owned(),
            EndReason::DrawAgreement => "draw agreed".to_owned(),
            EndReason::DrawByRule(rule) => format!("draw by {rule}"),
        };
        match self.winner {
            Some(color) => write!(f, "{color} wins by {reason}"),
            None => write!(f, "{reason}"),
        }
    }
}
