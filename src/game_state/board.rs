//! Fixed 8x8 board of optional pieces.
//!
//! The square array is the source of truth. Per-color/per-kind bitboards are
//! derived caches kept in sync by `place` and `remove`, so attack lookups can
//! work on occupancy masks.

use crate::errors::InvariantViolation;
use crate::game_state::chess_types::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    squares: [Option<Piece>; 64],
    // [color][piece_kind]
    pieces: [[u64; 6]; 2],
    occupancy_by_color: [u64; 2],
}

impl Default for Board {
    fn default() -> Self {
        Self {
            squares: [None; 64],
            pieces: [[0; 6]; 2],
            occupancy_by_color: [0; 2],
        }
    }
}

impl Board {
    #[inline]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Board with the pieces on their standard starting squares.
    pub fn standard_setup() -> Self {
        let mut board = Self::empty();
        let back_rank = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];

        for color in Color::BOTH {
            let home = color.home_rank();
            let pawn_rank = match color {
                Color::White => 1,
                Color::Black => 6,
            };
            for (file, kind) in (0u8..8).zip(back_rank) {
                if let Some(sq) = Square::from_file_rank(file, home) {
                    board.place(sq, Piece::new(kind, color));
                }
                if let Some(sq) = Square::from_file_rank(file, pawn_rank) {
                    board.place(sq, Piece::new(PieceKind::Pawn, color));
                }
            }
        }

        board
    }

    #[inline]
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.squares[square.index()]
    }

    /// Puts `piece` on `square`, returning whatever stood there before.
    pub(crate) fn place(&mut self, square: Square, piece: Piece) -> Option<Piece> {
        let displaced = self.remove(square);
        self.squares[square.index()] = Some(piece);
        self.pieces[piece.color.index()][piece.kind.index()] |= square.bit();
        self.occupancy_by_color[piece.color.index()] |= square.bit();
        displaced
    }

    pub(crate) fn remove(&mut self, square: Square) -> Option<Piece> {
        let piece = self.squares[square.index()].take()?;
        let mask = !square.bit();
        self.pieces[piece.color.index()][piece.kind.index()] &= mask;
        self.occupancy_by_color[piece.color.index()] &= mask;
        Some(piece)
    }

    #[inline]
    pub fn occupancy(&self) -> u64 {
        self.occupancy_by_color[0] | self.occupancy_by_color[1]
    }

    #[inline]
    pub fn occupancy_of(&self, color: Color) -> u64 {
        self.occupancy_by_color[color.index()]
    }

    #[inline]
    pub fn pieces_of(&self, color: Color, kind: PieceKind) -> u64 {
        self.pieces[color.index()][kind.index()]
    }

    #[inline]
    pub fn count(&self, color: Color) -> u32 {
        self.occupancy_of(color).count_ones()
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        bitboard_squares(self.pieces_of(color, PieceKind::King)).next()
    }

    /// Occupied squares with their pieces, in square order.
    pub fn iter(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |sq| self.piece_at(sq).map(|piece| (sq, piece)))
    }

    /// FEN letter per square in square order, `None` for empty squares.
    pub fn symbols(&self) -> Vec<Option<char>> {
        self.squares.iter().map(|slot| slot.map(Piece::symbol)).collect()
    }

    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        for color in Color::BOTH {
            let kings = self.pieces_of(color, PieceKind::King).count_ones();
            if kings > 1 {
                return Err(InvariantViolation::MultipleKings { color, count: kings });
            }
        }

        for sq in Square::all() {
            let cached = Color::BOTH.iter().find_map(|&color| {
                PieceKind::ALL
                    .iter()
                    .find(|&&kind| self.pieces_of(color, kind) & sq.bit() != 0)
                    .map(|&kind| Piece::new(kind, color))
            });
            if cached != self.piece_at(sq) {
                return Err(InvariantViolation::BoardOutOfSync(sq));
            }
        }

        Ok(())
    }
}
