//! # Display Management
//!
//! ASCII rendering of the current room, used by the command-line driver and
//! handy for eyeballing generated levels in tests.

use crate::game::{tile_containing, GameSnapshot, Position, TileType};
use crate::rendering::UI;

/// Glyph drawn for enemies.
pub const ENEMY_GLYPH: char = 'e';

/// Glyph drawn for undiscovered cells.
pub const FOG_GLYPH: char = ' ';

/// Text display manager for the game.
///
/// Draws the room under fog-of-war with the player arrow and wandering
/// enemies on top, followed by the text panels from [`UI`].
#[derive(Debug, Clone)]
pub struct AsciiDisplay {
    /// Draw enemies standing in undiscovered cells
    pub reveal_enemies: bool,
    /// Draw undiscovered tiles as well
    pub reveal_map: bool,
    pub ui: UI,
}

impl Default for AsciiDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl AsciiDisplay {
    /// Creates a display that respects fog-of-war.
    pub fn new() -> Self {
        Self {
            reveal_enemies: false,
            reveal_map: false,
            ui: UI::new(),
        }
    }

    /// Renders the map portion of a snapshot, one line per row.
    ///
    /// # Examples
    ///
    /// ```
    /// use gloomcrawl::{AsciiDisplay, GameState};
    ///
    /// let state = GameState::with_seed(3).unwrap();
    /// let snapshot = state.snapshot();
    /// let map = AsciiDisplay::new().render_map(&snapshot);
    /// assert_eq!(map.lines().count(), snapshot.height as usize);
    /// assert!(map.contains('↑'));
    /// ```
    pub fn render_map(&self, snapshot: &GameSnapshot) -> String {
        let enemy_tiles: Vec<Position> = snapshot
            .enemies
            .iter()
            .map(|enemy| tile_containing(enemy.pixel_x, enemy.pixel_y))
            .collect();

        let mut out = String::new();
        for (y, row) in snapshot.map.iter().enumerate() {
            for (x, &code) in row.iter().enumerate() {
                let pos = Position::new(x as i32, y as i32);
                let discovered = snapshot
                    .discovered
                    .get(y)
                    .and_then(|row| row.get(x))
                    .copied()
                    .unwrap_or(false);

                let glyph = if pos == snapshot.player_position {
                    snapshot.facing.arrow()
                } else if enemy_tiles.contains(&pos) && (discovered || self.reveal_enemies) {
                    ENEMY_GLYPH
                } else if discovered || self.reveal_map {
                    TileType::from_code(code).map_or('?', TileType::glyph)
                } else {
                    FOG_GLYPH
                };
                out.push(glyph);
            }
            out.push('\n');
        }
        out
    }

    /// Renders the map followed by the status, battle and message panels.
    pub fn render(&self, snapshot: &GameSnapshot) -> String {
        let mut out = self.render_map(snapshot);
        out.push_str(&self.ui.status_line(snapshot));
        out.push('\n');
        if let Some(battle) = self.ui.battle_panel(snapshot) {
            out.push_str(&battle);
        }
        out.push_str(&self.ui.messages_panel(snapshot));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{DiceType, Direction, GameConfig, GameState, Monster, MonsterKey, Room};
    use crate::generation::GeneratedLevel;
    use crate::utils::ScriptedRandom;

    fn small_state() -> GameState {
        let mut room = Room::walled(5, 5);
        room.start = Position::new(1, 1);
        room.set_tile(Position::new(2, 1), TileType::Chest);
        let spawn = Position::new(3, 3);
        let key = MonsterKey::new(0, spawn);
        let monster = Monster::new("Rust Crawler", 42, 1, DiceType::D6, "crawler.png", vec![]);
        let level = GeneratedLevel {
            room,
            spawns: vec![(key, monster)],
        };
        GameState::from_level(
            GameConfig::for_testing(),
            level,
            Box::new(ScriptedRandom::new(vec![ScriptedRandom::pick(0, 4)])),
        )
        .unwrap()
    }

    #[test]
    fn test_render_map_respects_fog() {
        let state = small_state();
        let map = AsciiDisplay::new().render_map(&state.snapshot());
        let lines: Vec<&str> = map.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], " #   ");
        assert_eq!(lines[1], "#↑$  ");
        assert_eq!(lines[2], " .   ");
        assert_eq!(lines[3], "     ");
    }

    #[test]
    fn test_render_map_revealed() {
        let state = small_state();
        let display = AsciiDisplay {
            reveal_enemies: true,
            reveal_map: true,
            ui: UI::new(),
        };
        let map = display.render_map(&state.snapshot());
        let lines: Vec<&str> = map.lines().collect();
        assert_eq!(lines[3], "#..e#");
        assert_eq!(lines[4], "#####");
    }

    #[test]
    fn test_player_arrow_follows_facing() {
        let mut state = small_state();
        state.attempt_move(Direction::Right).unwrap();
        let map = AsciiDisplay::new().render_map(&state.snapshot());
        assert_eq!(map.lines().nth(1), Some("#→$  "));
    }

    #[test]
    fn test_render_includes_panels() {
        let state = small_state();
        let text = AsciiDisplay::new().render(&state.snapshot());
        assert!(text.contains("Level 1"));
        assert!(text.contains("HP 100/100"));
    }
}
