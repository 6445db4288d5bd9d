use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand};
use env_logger::Env;
use log::{error, info};

use chess_session::game_state::position::Position;
use chess_session::move_generation::legal_move_generator::LegalMoveGenerator;
use chess_session::move_generation::perft::perft_multi_threaded;
use chess_session::protocol::command_loop::{run_stdio_loop, OutputFormat};
use chess_session::registry::registry_config::RegistryConfig;
use chess_session::registry::session_registry::{SessionId, SessionRegistry};

#[derive(Parser)]
#[command(name = "chess_session", version, about = "Chess game sessions over stdin/stdout")]
struct Cli {
    /// YAML configuration file.
    #[arg(long, env = "CHESS_SESSION_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play through the line-oriented front end (the default).
    Play {
        /// Session identifier used with the registry.
        #[arg(long, default_value = "local")]
        session: String,

        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Start from this position instead of the configured one.
        #[arg(long)]
        fen: Option<String>,
    },
    /// Count leaf nodes of the legal move tree.
    Perft {
        depth: u8,

        #[arg(long)]
        fen: Option<String>,
    },
}

fn main() -> ExitCode {
    let env = Env::default().filter_or("CHESS_SESSION_LOG", "info");
    env_logger::Builder::from_env(env).init();

    let cli = Cli::parse();
    let config = match RegistryConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let command = cli.command.unwrap_or(Commands::Play {
        session: "local".to_owned(),
        format: OutputFormat::Text,
        fen: None,
    });

    let outcome = match command {
        Commands::Play {
            session,
            format,
            fen,
        } => play(config, session, format, fen),
        Commands::Perft { depth, fen } => perft(depth, fen),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn play(
    mut config: RegistryConfig,
    session: String,
    format: OutputFormat,
    fen: Option<String>,
) -> Result<(), String> {
    if fen.is_some() {
        config.start_fen = fen;
    }
    let opponent = config.build_opponent();
    let registry = SessionRegistry::new(config);
    let id = SessionId::from(session);
    registry.new_game(&id).map_err(|err| err.to_string())?;

    info!("session {id} ready");
    run_stdio_loop(&registry, id.clone(), format, opponent).map_err(|err| err.to_string())?;
    registry.remove(&id).map_err(|err| err.to_string())?;
    Ok(())
}

fn perft(depth: u8, fen: Option<String>) -> Result<(), String> {
    let position = match fen {
        Some(fen) => Position::from_fen(&fen)?,
        None => Position::new_game(),
    };

    let start = Instant::now();
    let counts = perft_multi_threaded(Arc::new(LegalMoveGenerator), &position, depth)
        .map_err(|err| err.to_string())?;
    let elapsed = start.elapsed();

    println!("depth {depth}: {counts:?}");
    println!(
        "{:.0} nodes/s",
        counts.nodes as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
    );
    Ok(())
}
