//! # Gloomcrawl Main Entry Point
//!
//! Initializes the game state and runs a line-oriented command loop over
//! stdin or a script file, printing an ASCII view after every command.

use clap::Parser;
use gloomcrawl::{
    AsciiDisplay, Command, GameConfig, GameError, GameResult, GameRng, GameState, InputHandler,
    PlayerInput, RunStatus, HELP,
};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
#[cfg(feature = "dev-tools")]
use tracing::{info, Level};

#[cfg(not(feature = "dev-tools"))]
use log::info;

/// Command line arguments for Gloomcrawl.
#[derive(Parser, Debug)]
#[command(name = "gloomcrawl")]
#[command(about = "A single-room-per-level dungeon crawler with timed turn-based combat")]
#[command(version)]
struct Args {
    /// Random seed for dungeon generation
    #[arg(short, long)]
    seed: Option<u64>,

    /// JSON file overriding the default game configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Read commands from this file instead of stdin
    #[arg(long)]
    script: Option<PathBuf>,

    /// Show the whole room, ignoring fog-of-war
    #[arg(long)]
    reveal: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> GameResult<()> {
    let args = Args::parse();

    initialize_logging(&args.log_level)?;

    info!("Starting Gloomcrawl v{}", gloomcrawl::VERSION);

    let config = match &args.config {
        Some(path) => GameConfig::from_json_file(path)?,
        None => GameConfig::new(),
    };

    let rng = match args.seed {
        Some(seed) => GameRng::new(seed),
        None => GameRng::from_entropy(),
    };
    info!("Using seed {}", rng.seed());
    let mut state = GameState::new(config, Box::new(rng))?;

    let mut display = AsciiDisplay::new();
    display.reveal_enemies = args.reveal;
    display.reveal_map = args.reveal;

    let reader: Box<dyn BufRead> = match &args.script {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(BufReader::new(io::stdin())),
    };

    run(&mut state, &display, reader, args.script.is_none())
}

/// Initializes the logging system based on the specified log level.
fn initialize_logging(log_level: &str) -> GameResult<()> {
    #[cfg(feature = "dev-tools")]
    {
        let level = match log_level.to_lowercase().as_str() {
            "error" => Level::ERROR,
            "warn" => Level::WARN,
            "info" => Level::INFO,
            "debug" => Level::DEBUG,
            "trace" => Level::TRACE,
            _ => Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(false)
            .with_writer(io::stderr)
            .try_init()
            .map_err(|e| GameError::Config(format!("logging: {e}")))?;
    }

    #[cfg(not(feature = "dev-tools"))]
    {
        env_logger::Builder::new()
            .parse_filters(log_level)
            .try_init()
            .map_err(|e| GameError::Config(format!("logging: {e}")))?;
    }

    Ok(())
}

/// Runs the command loop until the input ends, the player quits or the run
/// is over.
fn run(state: &mut GameState, display: &AsciiDisplay, reader: Box<dyn BufRead>, interactive: bool) -> GameResult<()> {
    let handler = InputHandler::new();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    writeln!(out, "{}", display.render(&state.snapshot()))?;
    prompt(&mut out, interactive)?;

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            prompt(&mut out, interactive)?;
            continue;
        }

        let input = match handler.parse_line(&line) {
            Ok(input) => input,
            Err(e) => {
                writeln!(out, "{e}")?;
                prompt(&mut out, interactive)?;
                continue;
            }
        };

        match input {
            PlayerInput::Quit => break,
            PlayerInput::Help => writeln!(out, "{HELP}")?,
            PlayerInput::Look => writeln!(out, "{}", display.render(&state.snapshot()))?,
            PlayerInput::ShowInventory => write!(out, "{}", display.ui.inventory_panel(&state.snapshot()))?,
            PlayerInput::ShowShop => write!(out, "{}", display.ui.shop_panel(&state.snapshot()))?,
            PlayerInput::ShowSkills => write!(out, "{}", display.ui.skills_panel(&state.snapshot()))?,
            PlayerInput::Dump => writeln!(out, "{}", state.to_json()?)?,
            other => match handler.input_to_command(other, state) {
                Ok(Some(command)) => {
                    let resolves_turn = matches!(command, Command::Attack | Command::UseItem { .. });
                    state.execute(command)?;
                    if resolves_turn {
                        // No animations to watch in a terminal.
                        state.resolve_pending_combat()?;
                    }
                    writeln!(out, "{}", display.render(&state.snapshot()))?;
                }
                Ok(None) => {}
                Err(e) => writeln!(out, "{e}")?,
            },
        }

        if state.status != RunStatus::Playing {
            break;
        }
        prompt(&mut out, interactive)?;
    }

    match state.status {
        RunStatus::Playing => info!("Input ended on level {}", state.current_level),
        RunStatus::Victory => writeln!(out, "Victory after {} levels.", state.current_level)?,
        RunStatus::Defeated => {
            info!("Run ended in defeat on level {}", state.current_level);
            writeln!(out, "Final score: {} monsters defeated.", state.total_defeated)?;
        }
    }
    Ok(())
}

fn prompt(out: &mut impl Write, interactive: bool) -> GameResult<()> {
    if interactive {
        write!(out, "> ")?;
        out.flush()?;
    }
    Ok(())
}
