//! Move value type exchanged between the generator, the session and clients.

use std::fmt;

use serde::Serialize;

use crate::game_state::chess_types::{PieceKind, Square};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MoveFlag {
    Normal,
    Capture,
    CastleKingside,
    CastleQueenside,
    EnPassant,
    /// Pawn reaching the last rank, with or without a capture.
    Promotion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Move {
    pub source: Square,
    pub target: Square,
    pub promotion: Option<PieceKind>,
    pub flag: MoveFlag,
}

impl Move {
    #[inline]
    pub const fn new(source: Square, target: Square, flag: MoveFlag) -> Self {
        Self {
            source,
            target,
            promotion: None,
            flag,
        }
    }

    #[inline]
    pub const fn promotion(source: Square, target: Square, piece: PieceKind) -> Self {
        Self {
            source,
            target,
            promotion: Some(piece),
            flag: MoveFlag::Promotion,
        }
    }

    #[inline]
    pub fn is_castle(&self) -> bool {
        matches!(self.flag, MoveFlag::CastleKingside | MoveFlag::CastleQueenside)
    }
}

/// Long algebraic form, e.g. `e2e4` or `e7e8q`.
impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.source, self.target)?;
        if let Some(piece) = self.promotion {
            write!(f, "{}", piece.fen_char())?;
        }
        Ok(())
    }
}
