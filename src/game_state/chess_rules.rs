//! Canonical chess-rule constants.
//!
//! Static rule literals: the standard starting position and the thresholds
//! behind the draw rules.

/// Standard chess starting position in Forsyth-Edwards Notation (FEN).
pub const STARTING_POSITION_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Halfmoves without capture or pawn move after which the game is drawn.
pub const FIFTY_MOVE_RULE_HALFMOVES: u16 = 100;

/// Occurrences of the same position that end the game.
pub const REPETITION_LIMIT: usize = 3;

/// Halfmove clock at which the automated opponent agrees to a draw offer.
pub const OPPONENT_DRAW_ACCEPT_HALFMOVES: u16 = 100;
