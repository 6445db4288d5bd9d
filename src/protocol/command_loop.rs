//! Line-oriented front end over stdin/stdout.
//!
//! Plays the presentation layer: keeps the client's current selection, turns
//! each command into one session operation through the registry, and prints
//! either a text board or the YAML response document.

use std::fmt;
use std::io::{self, BufRead, Write};

use clap::ValueEnum;
use log::{debug, warn};
use serde::Serialize;

use crate::errors::SessionError;
use crate::game_state::chess_types::*;
use crate::protocol::responses::{
    perform_action, query_board, submit_move, undo, Action, ActionResponse, BoardResponse,
    MoveResponse, UndoResponse,
};
use crate::registry::session_registry::{SessionId, SessionRegistry};
use crate::session::game_session::GameSession;
use crate::session::opponent::Opponent;
use crate::utils::algebraic::parse_square_token;
use crate::utils::long_algebraic::{char_to_promotion, moves_to_long_algebraic, parse_long_algebraic};
use crate::utils::render_game_state::render_board;

const HELP_TEXT: &str = "commands: board | select <sq> | deselect | move <from> <to> [q|r|b|n] | \
move e2e4[q] | undo | resign | draw | accept | decline | fen | moves | new [fen] | quit";

/// The color the human plays when an opponent is configured.
const HUMAN_COLOR: Color = Color::White;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Unicode board diagrams and one-line messages.
    #[default]
    Text,
    /// One YAML document per response.
    Yaml,
}

pub fn run_stdio_loop(
    registry: &SessionRegistry,
    session_id: SessionId,
    format: OutputFormat,
    opponent: Option<Box<dyn Opponent>>,
) -> io::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut front_end = CommandLoop::new(registry, session_id, format, opponent);

    let stop = front_end.handle_command("board", &mut stdout)?;
    stdout.flush()?;
    if stop {
        return Ok(());
    }

    for line in stdin.lock().lines() {
        let line = line?;
        let should_quit = front_end.handle_command(&line, &mut stdout)?;
        stdout.flush()?;
        if should_quit {
            break;
        }
    }

    Ok(())
}

#[derive(Debug)]
enum CommandError {
    Usage(String),
    Session(SessionError),
    Io(io::Error),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Usage(msg) => write!(f, "{msg}"),
            CommandError::Session(err) => write!(f, "{err}"),
            CommandError::Io(err) => write!(f, "{err}"),
        }
    }
}

impl From<SessionError> for CommandError {
    fn from(value: SessionError) -> Self {
        CommandError::Session(value)
    }
}

impl From<io::Error> for CommandError {
    fn from(value: io::Error) -> Self {
        CommandError::Io(value)
    }
}

fn usage(msg: impl Into<String>) -> CommandError {
    CommandError::Usage(msg.into())
}

pub struct CommandLoop<'a> {
    registry: &'a SessionRegistry,
    session_id: SessionId,
    format: OutputFormat,
    selected: Option<Square>,
    opponent: Option<Box<dyn Opponent>>,
}

impl<'a> CommandLoop<'a> {
    pub fn new(
        registry: &'a SessionRegistry,
        session_id: SessionId,
        format: OutputFormat,
        opponent: Option<Box<dyn Opponent>>,
    ) -> Self {
        Self {
            registry,
            session_id,
            format,
            selected: None,
            opponent,
        }
    }

    /// Handles one input line. Returns `true` when the loop should stop.
    pub fn handle_command(&mut self, line: &str, out: &mut impl Write) -> io::Result<bool> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(false);
        }

        debug!("command: {trimmed}");
        match self.dispatch(trimmed, out) {
            Ok(quit) => Ok(quit),
            Err(CommandError::Io(err)) => Err(err),
            Err(CommandError::Session(err)) if err.is_fatal() => {
                warn!("stopping after fatal error: {err}");
                writeln!(out, "fatal: {err}")?;
                Ok(true)
            }
            Err(err) => {
                writeln!(out, "error: {err}")?;
                Ok(false)
            }
        }
    }

    fn dispatch(&mut self, line: &str, out: &mut impl Write) -> Result<bool, CommandError> {
        let mut parts = line.split_whitespace();
        let cmd = parts.next().unwrap_or_default();
        let args: Vec<&str> = parts.collect();

        match cmd {
            "board" => self.show_board(out)?,
            "select" => {
                let token = args.first().ok_or_else(|| usage("select needs a square"))?;
                self.selected = parse_square_token(token).map_err(usage)?;
                self.show_board(out)?;
            }
            "deselect" => {
                self.selected = None;
                self.show_board(out)?;
            }
            "move" => self.handle_move(&args, out)?,
            "undo" => self.handle_undo(out)?,
            "resign" => {
                let color = self.acting_color()?;
                self.handle_action(Action::Resign, color, out)?;
            }
            "draw" => self.handle_draw_offer(out)?,
            "accept" => {
                let color = self.responding_color()?;
                self.handle_action(Action::AcceptDraw, color, out)?;
            }
            "decline" => {
                let color = self.responding_color()?;
                self.handle_action(Action::DeclineDraw, color, out)?;
            }
            "fen" => {
                let fen = self.registry.with_session(&self.session_id, |s| Ok(s.fen()))?;
                writeln!(out, "{fen}")?;
            }
            "moves" => {
                let moves = self
                    .registry
                    .with_session(&self.session_id, |s| s.legal_moves())?;
                match self.format {
                    OutputFormat::Text => writeln!(out, "{}", moves_to_long_algebraic(&moves))?,
                    OutputFormat::Yaml => emit_yaml(out, &moves)?,
                }
            }
            "new" => self.handle_new(&args, out)?,
            "help" => writeln!(out, "{HELP_TEXT}")?,
            "quit" | "exit" => return Ok(true),
            other => return Err(usage(format!("unknown command '{other}'; {HELP_TEXT}"))),
        }

        Ok(false)
    }

    fn handle_move(&mut self, args: &[&str], out: &mut impl Write) -> Result<(), CommandError> {
        let (source, target, promotion) = match args {
            [text] => {
                let request = parse_long_algebraic(text).map_err(usage)?;
                (request.source, request.target, request.promotion)
            }
            [from, to, rest @ ..] if rest.len() <= 1 => {
                let source = required_square(from)?;
                let target = required_square(to)?;
                let promotion = match rest.first().and_then(|p| p.chars().next()) {
                    Some(ch) => Some(char_to_promotion(ch).map_err(usage)?),
                    None => None,
                };
                (source, target, promotion)
            }
            _ => return Err(usage("usage: move <from> <to> [promotion] or move e2e4[q]")),
        };

        if let Some(color) = self.opponent.as_ref().map(|_| HUMAN_COLOR) {
            let to_move = self
                .registry
                .with_session(&self.session_id, |s| Ok(s.side_to_move()))?;
            if to_move != color {
                return Err(usage("it is not your turn"));
            }
        }

        let response = self.registry.with_session(&self.session_id, |s| {
            submit_move(s, source, target, promotion)
        })?;
        self.selected = if response.move_made { None } else { Some(source) };
        self.emit_move(out, &response)?;

        if response.move_made {
            self.play_opponent(out)?;
        }
        Ok(())
    }

    /// Lets the configured opponent answer when it is its turn.
    fn play_opponent(&mut self, out: &mut impl Write) -> Result<(), CommandError> {
        let Some(opponent) = self.opponent.as_mut() else {
            return Ok(());
        };

        let response = self.registry.with_session(&self.session_id, |s| {
            if !s.is_active() || s.side_to_move() == HUMAN_COLOR {
                return Ok(None);
            }
            match opponent.choose_move(s.position())? {
                Some(mv) => submit_move(s, mv.source, mv.target, mv.promotion).map(Some),
                None => Ok(None),
            }
        })?;

        if let Some(response) = response {
            self.emit_move(out, &response)?;
        }
        Ok(())
    }

    fn handle_undo(&mut self, out: &mut impl Write) -> Result<(), CommandError> {
        let with_opponent = self.opponent.is_some();
        let response = self.registry.with_session(&self.session_id, |s| {
            let first = undo(s)?;
            // Take back the opponent's reply together with the human move.
            let opponent_to_move = s.side_to_move() != HUMAN_COLOR;
            if with_opponent && first.undone && opponent_to_move && !s.history().is_empty() {
                return undo(s);
            }
            Ok(first)
        })?;
        self.selected = None;
        self.emit_undo(out, &response)
    }

    fn handle_draw_offer(&mut self, out: &mut impl Write) -> Result<(), CommandError> {
        let color = self.acting_color()?;
        let offer = self
            .registry
            .with_session(&self.session_id, |s| perform_action(s, Action::OfferDraw, color))?;
        self.emit_action(out, &offer)?;
        if !offer.accepted {
            return Ok(());
        }

        let Some(opponent) = self.opponent.as_ref() else {
            return Ok(());
        };
        let answer = self.registry.with_session(&self.session_id, |s| {
            let responder = color.opposite();
            let action = if opponent.accepts_draw(s.position(), responder) {
                Action::AcceptDraw
            } else {
                Action::DeclineDraw
            };
            perform_action(s, action, responder)
        })?;
        self.emit_action(out, &answer)?;
        Ok(())
    }

    fn handle_action(
        &mut self,
        action: Action,
        color: Color,
        out: &mut impl Write,
    ) -> Result<(), CommandError> {
        let response = self
            .registry
            .with_session(&self.session_id, |s| perform_action(s, action, color))?;
        self.emit_action(out, &response)?;
        Ok(())
    }

    fn handle_new(&mut self, args: &[&str], out: &mut impl Write) -> Result<(), CommandError> {
        let custom = if args.is_empty() {
            None
        } else {
            Some(GameSession::from_fen(&args.join(" "))?)
        };

        self.registry.new_game(&self.session_id)?;
        if let Some(session) = custom {
            self.registry.with_session(&self.session_id, |s| {
                *s = session;
                Ok(())
            })?;
        }
        self.selected = None;
        self.show_board(out)?;
        Ok(())
    }

    /// Color of the player issuing a command: the human when playing an
    /// opponent, otherwise whoever is to move.
    fn acting_color(&self) -> Result<Color, CommandError> {
        if self.opponent.is_some() {
            return Ok(HUMAN_COLOR);
        }
        Ok(self
            .registry
            .with_session(&self.session_id, |s| Ok(s.side_to_move()))?)
    }

    /// Color answering a draw offer: the side that did not make it.
    fn responding_color(&self) -> Result<Color, CommandError> {
        let (pending, to_move) = self.registry.with_session(&self.session_id, |s| {
            Ok((s.pending_draw_offer(), s.side_to_move()))
        })?;
        Ok(pending.map_or(to_move.opposite(), Color::opposite))
    }

    fn show_board(&self, out: &mut impl Write) -> Result<(), CommandError> {
        let response = self
            .registry
            .with_session(&self.session_id, |s| query_board(s, self.selected))?;
        self.emit_board(out, &response)
    }

    fn emit_board(
        &self,
        out: &mut impl Write,
        response: &BoardResponse,
    ) -> Result<(), CommandError> {
        if self.format == OutputFormat::Yaml {
            return Ok(emit_yaml(out, response)?);
        }

        let board = self
            .registry
            .with_session(&self.session_id, |s| Ok(s.position().board.clone()))?;
        writeln!(out, "{}", render_board(&board, &response.valid_moves))?;
        match response.result {
            Some(result) => writeln!(out, "game over: {result}")?,
            None => writeln!(out, "{} to move", response.side_to_move)?,
        }
        Ok(())
    }

    fn emit_move(
        &self,
        out: &mut impl Write,
        response: &MoveResponse,
    ) -> Result<(), CommandError> {
        if self.format == OutputFormat::Yaml {
            return Ok(emit_yaml(out, response)?);
        }

        match (&response.played, &response.rejection) {
            (Some(mv), _) => writeln!(out, "played {mv}")?,
            (None, Some(reason)) => writeln!(out, "rejected: {reason}")?,
            (None, None) => {}
        }
        self.show_board(out)
    }

    fn emit_undo(
        &self,
        out: &mut impl Write,
        response: &UndoResponse,
    ) -> Result<(), CommandError> {
        if self.format == OutputFormat::Yaml {
            return Ok(emit_yaml(out, response)?);
        }

        match &response.rejection {
            Some(reason) => writeln!(out, "rejected: {reason}")?,
            None => writeln!(out, "move taken back")?,
        }
        self.show_board(out)
    }

    fn emit_action(&self, out: &mut impl Write, response: &ActionResponse) -> io::Result<()> {
        if self.format == OutputFormat::Yaml {
            return emit_yaml(out, response);
        }

        let verb = match response.action {
            Action::Resign => "resignation",
            Action::OfferDraw => "draw offer",
            Action::AcceptDraw => "draw acceptance",
            Action::DeclineDraw => "draw decline",
        };
        match (&response.rejection, response.result) {
            (Some(reason), _) => writeln!(out, "{verb} rejected: {reason}"),
            (None, Some(result)) => writeln!(out, "game over: {result}"),
            (None, None) => writeln!(out, "{verb} recorded"),
        }
    }
}

fn required_square(token: &str) -> Result<Square, CommandError> {
    parse_square_token(token)
        .map_err(usage)?
        .ok_or_else(|| usage(format!("'{token}' does not name a square")))
}

fn emit_yaml<T: Serialize + ?Sized>(out: &mut impl Write, value: &T) -> io::Result<()> {
    let text = serde_yaml::to_string(value)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
    writeln!(out, "---")?;
    write!(out, "{text}")
}
