//! Crate root module declarations for the chess session back end.
//!
//! Exposes the board and position model, the legal-move oracle, the game
//! session state machine, the session registry and the client-facing protocol
//! so the binary, tests and benchmarks share stable module paths.

pub mod errors;

pub mod game_state {
    pub mod board;
    pub mod chess_rules;
    pub mod chess_types;
    pub mod position;
    pub mod undo_state;
    pub mod zobrist;
}

pub mod moves {
    pub mod bishop_moves;
    pub mod chess_move;
    pub mod king_moves;
    pub mod knight_moves;
    pub mod pawn_moves;
    pub mod queen_moves;
    pub mod rook_moves;
}

pub mod move_generation {
    pub mod legal_move_apply;
    pub mod legal_move_checks;
    pub mod legal_move_generator;
    pub mod legal_move_shared;
    pub mod legal_moves_bishop;
    pub mod legal_moves_king;
    pub mod legal_moves_knight;
    pub mod legal_moves_pawn;
    pub mod legal_moves_queen;
    pub mod legal_moves_rook;
    pub mod move_generator;
    pub mod perft;
}

pub mod session {
    pub mod draw_rules;
    pub mod game_result;
    pub mod game_session;
    pub mod opponent;
}

pub mod registry {
    pub mod registry_config;
    pub mod session_registry;
}

pub mod protocol {
    pub mod command_loop;
    pub mod responses;
}

pub mod utils {
    pub mod algebraic;
    pub mod fen_generator;
    pub mod fen_parser;
    pub mod long_algebraic;
    pub mod render_game_state;
}
