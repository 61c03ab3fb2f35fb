//! # Generation Module
//!
//! Procedural content generation for rooms, monsters and merchant stock.
//!
//! Every generator draws exclusively from a [`RandomSource`], so a scripted
//! source reproduces any room, roster or shop exactly.

pub mod dungeon;
pub mod encounters;
pub mod items;

pub use dungeon::*;
pub use encounters::*;
pub use items::*;

use crate::utils::RandomSource;
use crate::GameResult;
use serde::{Deserialize, Serialize};

/// Configuration for procedural generation.
///
/// Ranges are inclusive; chances are percentages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Minimum room width (including walls)
    pub min_width: u32,
    /// Maximum room width (including walls)
    pub max_width: u32,
    /// Minimum room height (including walls)
    pub min_height: u32,
    /// Maximum room height (including walls)
    pub max_height: u32,
    /// Chance of a single healing tile
    pub healing_chance: u32,
    /// Number of independent chest placement attempts
    pub chest_attempts: u32,
    /// Chance that each chest attempt places a chest
    pub chest_chance: u32,
    /// Fraction of all cells turned into extra interior walls
    pub wall_density: f64,
    /// Minimum monsters in a regular room
    pub min_monsters: u32,
    /// Maximum monsters in a regular room
    pub max_monsters: u32,
    /// Rejection-sampling budget for each placement
    pub placement_tries: u32,
    /// Chance that a merchant sets up shop in a new room
    pub merchant_chance: u32,
}

impl GenerationConfig {
    /// Creates the standard generation configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use gloomcrawl::GenerationConfig;
    ///
    /// let config = GenerationConfig::new();
    /// assert!(config.min_width >= 3);
    /// assert!(config.max_width >= config.min_width);
    /// ```
    pub fn new() -> Self {
        Self {
            min_width: 10,
            max_width: 20,
            min_height: 10,
            max_height: 20,
            healing_chance: 25,
            chest_attempts: 9,
            chest_chance: 25,
            wall_density: 0.10,
            min_monsters: 3,
            max_monsters: 7,
            placement_tries: 1000,
            merchant_chance: 90,
        }
    }

    /// Creates a configuration for testing with small, sparse rooms.
    pub fn for_testing() -> Self {
        Self {
            min_width: 10,
            max_width: 12,
            min_height: 10,
            max_height: 12,
            healing_chance: 0,
            chest_attempts: 0,
            chest_chance: 0,
            wall_density: 0.0,
            min_monsters: 1,
            max_monsters: 1,
            placement_tries: 1000,
            merchant_chance: 0,
        }
    }

    /// Number of extra interior walls for a room of the given size.
    pub fn wall_count(&self, width: u32, height: u32) -> u32 {
        ((width * height) as f64 * self.wall_density).floor() as u32
    }

    /// Most interior cells generation can stamp in a room of the given size:
    /// the healing tile, every chest attempt, the extra walls and a full
    /// roster of monsters.
    pub fn worst_case_placements(&self, width: u32, height: u32) -> u32 {
        let healing = u32::from(self.healing_chance > 0);
        let chests = if self.chest_chance > 0 { self.chest_attempts } else { 0 };
        healing + chests + self.wall_count(width, height) + self.max_monsters
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// What is being generated: the level number, whether it is a boss room and
/// the index the resulting room will occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationContext {
    pub level: u32,
    pub is_boss: bool,
    pub room_index: usize,
}

impl GenerationContext {
    pub fn new(level: u32, is_boss: bool) -> Self {
        Self {
            level,
            is_boss,
            room_index: level.saturating_sub(1) as usize,
        }
    }
}

/// Trait for procedural generators.
///
/// All generation systems implement this trait, allowing for consistent
/// interfaces and easy substitution in tests.
pub trait Generator<T> {
    /// Generates content for the given context.
    fn generate(&self, context: &GenerationContext, rng: &mut dyn RandomSource) -> GameResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, context: &GenerationContext) -> GameResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_config_creation() {
        let config = GenerationConfig::new();
        assert!(config.min_width <= config.max_width);
        assert!(config.min_height <= config.max_height);
        assert!(config.min_monsters <= config.max_monsters);
        assert_eq!(config.placement_tries, 1000);
    }

    #[test]
    fn test_wall_count_is_ten_percent_floored() {
        let config = GenerationConfig::new();
        assert_eq!(config.wall_count(10, 10), 10);
        assert_eq!(config.wall_count(13, 17), 22);
        assert_eq!(GenerationConfig::for_testing().wall_count(20, 20), 0);
    }

    #[test]
    fn test_context_room_index() {
        assert_eq!(GenerationContext::new(1, false).room_index, 0);
        assert_eq!(GenerationContext::new(6, true).room_index, 5);
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: GenerationConfig = serde_json::from_str(r#"{"max_monsters": 9}"#).unwrap();
        assert_eq!(config.max_monsters, 9);
        assert_eq!(config.min_monsters, 3);
    }
}
