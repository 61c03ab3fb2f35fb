//! # Gloomcrawl
//!
//! A single-player dungeon crawler simulation engine: one procedurally
//! generated room per level, tile-based movement under fog-of-war, wandering
//! enemies and timed turn-based combat, with loot, a merchant and a skill tree
//! layered on top.
//!
//! ## Architecture Overview
//!
//! - **Game State**: one owned [`GameState`] aggregate per run; every command
//!   is a method on it
//! - **World**: rooms of [`TileType`]s with a fog mask and pixel-space enemies
//! - **Generation**: room, monster and merchant generators behind the
//!   [`Generator`] trait
//! - **Systems**: movement, combat, economy and progression
//! - **Randomness**: every draw goes through [`RandomSource`] so tests can
//!   script outcomes exactly
//! - **Input/Rendering**: a text command parser and an ASCII view used by the
//!   command-line driver
//!
//! ## Example
//!
//! ```
//! use gloomcrawl::{Direction, GameState};
//!
//! let mut state = GameState::with_seed(42).unwrap();
//! state.attempt_move(Direction::Down).unwrap();
//! state.advance_tick().unwrap();
//! assert!(state.snapshot().messages.len() <= state.log.len());
//! ```

pub mod game;
pub mod generation;
pub mod input;
pub mod rendering;
pub mod utils;

// Core module re-exports
pub use game::*;
pub use generation::*;
pub use input::*;
pub use rendering::*;
pub use utils::*;

/// Core error type for the Gloomcrawl engine.
#[derive(thiserror::Error, Debug)]
pub enum GameError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Game state is internally inconsistent
    #[error("Invalid game state: {0}")]
    InvalidState(String),

    /// Text command could not be parsed
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    /// Generation failed
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// Configuration is unusable
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type used throughout the Gloomcrawl codebase.
pub type GameResult<T> = Result<T, GameError>;

/// Version information for the engine.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Game configuration constants.
pub mod config {
    /// Default player starting health
    pub const DEFAULT_PLAYER_HEALTH: u32 = 100;

    /// Default player attack
    pub const DEFAULT_PLAYER_ATTACK: u32 = 1;

    /// Side of a tile in pixels
    pub const TILE_SIZE: f64 = 30.0;

    /// Side of an enemy hitbox in pixels
    pub const ENEMY_SIZE: f64 = 15.0;

    /// Pixels an enemy moves per frame
    pub const ENEMY_SPEED: f64 = 1.0;

    /// Entering a door on this level ends the run in victory
    pub const MAX_DUNGEON_LEVELS: u32 = 500;

    /// Frames per second target for the game loop
    pub const TARGET_FPS: u64 = 60;

    /// Player dice animation in milliseconds
    pub const PLAYER_ROLL_MS: u64 = 350;

    /// Pause before the monster's turn in milliseconds
    pub const TURN_DELAY_MS: u64 = 1000;

    /// Monster dice animation in milliseconds
    pub const ENEMY_ROLL_MS: u64 = 350;
}
