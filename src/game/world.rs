//! # World Module
//!
//! Tile codes, rooms and the pixel-space enemies that wander them.
//!
//! A dungeon level is a single [`Room`]: a rectangular grid of [`TileType`]s
//! with a parallel fog-of-war mask. Enemies live in pixel space on top of the
//! grid and refer to their monster through a [`MonsterKey`] into the game
//! state's monster lookup.

use crate::config::{ENEMY_SIZE, TILE_SIZE};
use crate::game::{Direction, Position};
use crate::utils::Rect;
use serde::{Deserialize, Serialize};

/// Terrain or feature category of a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileType {
    Floor,
    Wall,
    ExitDoor,
    /// Left behind where a monster was spawned.
    MonsterSpawn,
    Healing,
    Chest,
    Merchant,
    /// Exit leading into a boss room.
    BossDoor,
    /// Exit leading into a boss room guarded by the elite table.
    EliteBossDoor,
}

impl TileType {
    /// Numeric tile code.
    ///
    /// # Examples
    ///
    /// ```
    /// use gloomcrawl::TileType;
    ///
    /// assert_eq!(TileType::Wall.code(), 1);
    /// assert_eq!(TileType::from_code(5), Some(TileType::Chest));
    /// ```
    pub fn code(self) -> u8 {
        match self {
            TileType::Floor => 0,
            TileType::Wall => 1,
            TileType::ExitDoor => 2,
            TileType::MonsterSpawn => 3,
            TileType::Healing => 4,
            TileType::Chest => 5,
            TileType::Merchant => 6,
            TileType::BossDoor => 7,
            TileType::EliteBossDoor => 8,
        }
    }

    /// Parses a numeric tile code.
    pub fn from_code(code: u8) -> Option<TileType> {
        match code {
            0 => Some(TileType::Floor),
            1 => Some(TileType::Wall),
            2 => Some(TileType::ExitDoor),
            3 => Some(TileType::MonsterSpawn),
            4 => Some(TileType::Healing),
            5 => Some(TileType::Chest),
            6 => Some(TileType::Merchant),
            7 => Some(TileType::BossDoor),
            8 => Some(TileType::EliteBossDoor),
            _ => None,
        }
    }

    pub fn is_door(self) -> bool {
        matches!(
            self,
            TileType::ExitDoor | TileType::BossDoor | TileType::EliteBossDoor
        )
    }

    /// Whether the door leads into a boss room.
    pub fn is_boss_door(self) -> bool {
        matches!(self, TileType::BossDoor | TileType::EliteBossDoor)
    }

    /// The player can step onto everything except walls.
    pub fn is_walkable(self) -> bool {
        self != TileType::Wall
    }

    /// Wandering enemies stay off walls, doors and healing tiles.
    pub fn blocks_enemies(self) -> bool {
        self == TileType::Wall || self == TileType::Healing || self.is_door()
    }

    /// Character used by text renderers.
    pub fn glyph(self) -> char {
        match self {
            TileType::Floor | TileType::MonsterSpawn => '.',
            TileType::Wall => '#',
            TileType::ExitDoor => '>',
            TileType::BossDoor | TileType::EliteBossDoor => 'B',
            TileType::Healing => '+',
            TileType::Chest => '$',
            TileType::Merchant => 'M',
        }
    }
}

/// Lookup key for a monster: the room it was generated in and its spawn cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MonsterKey {
    pub room_index: usize,
    pub x: i32,
    pub y: i32,
}

impl MonsterKey {
    pub fn new(room_index: usize, position: Position) -> Self {
        Self {
            room_index,
            x: position.x,
            y: position.y,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }
}

impl std::fmt::Display for MonsterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}-{}", self.room_index, self.x, self.y)
    }
}

/// A wandering enemy in pixel space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    /// Top-left corner of the hitbox, in pixels.
    pub pixel_x: f64,
    pub pixel_y: f64,
    pub direction: Direction,
    pub monster: MonsterKey,
}

impl Enemy {
    /// Creates an enemy centred on a tile.
    ///
    /// # Examples
    ///
    /// ```
    /// use gloomcrawl::{Direction, Enemy, MonsterKey, Position};
    ///
    /// let key = MonsterKey::new(0, Position::new(2, 3));
    /// let enemy = Enemy::centered_on(Position::new(2, 3), Direction::Up, key);
    /// assert_eq!(enemy.tile(), Position::new(2, 3));
    /// ```
    pub fn centered_on(tile: Position, direction: Direction, monster: MonsterKey) -> Self {
        let offset = (TILE_SIZE - ENEMY_SIZE) / 2.0;
        Self {
            pixel_x: tile.x as f64 * TILE_SIZE + offset,
            pixel_y: tile.y as f64 * TILE_SIZE + offset,
            direction,
            monster,
        }
    }

    pub fn hitbox(&self) -> Rect {
        Rect::new(self.pixel_x, self.pixel_y, ENEMY_SIZE, ENEMY_SIZE)
    }

    /// The tile containing the centre of the hitbox.
    pub fn tile(&self) -> Position {
        tile_containing(self.pixel_x, self.pixel_y)
    }
}

/// The tile containing the centre of an enemy hitbox whose top-left corner is
/// at the given pixel position.
pub fn tile_containing(pixel_x: f64, pixel_y: f64) -> Position {
    let center_x = pixel_x + ENEMY_SIZE / 2.0;
    let center_y = pixel_y + ENEMY_SIZE / 2.0;
    Position::new(
        (center_x / TILE_SIZE).floor() as i32,
        (center_y / TILE_SIZE).floor() as i32,
    )
}

/// The player's tile-aligned hitbox.
pub fn player_hitbox(tile: Position) -> Rect {
    Rect::new(
        tile.x as f64 * TILE_SIZE,
        tile.y as f64 * TILE_SIZE,
        TILE_SIZE,
        TILE_SIZE,
    )
}

/// One dungeon level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    /// Tiles indexed as `map[y][x]`.
    pub map: Vec<Vec<TileType>>,
    /// Fog-of-war mask, same shape as `map`. Never reset once set.
    pub discovered: Vec<Vec<bool>>,
    pub width: u32,
    pub height: u32,
    pub start: Position,
    pub enemies: Vec<Enemy>,
    /// Set once the follow-on exit has been stamped.
    pub exit_placed: bool,
}

impl Room {
    /// Creates an all-floor room surrounded by a one-tile wall.
    ///
    /// # Examples
    ///
    /// ```
    /// use gloomcrawl::{Position, Room, TileType};
    ///
    /// let room = Room::walled(10, 8);
    /// assert_eq!(room.tile(Position::new(0, 0)), Some(TileType::Wall));
    /// assert_eq!(room.tile(Position::new(1, 1)), Some(TileType::Floor));
    /// assert_eq!(room.tile(Position::new(10, 1)), None);
    /// ```
    pub fn walled(width: u32, height: u32) -> Self {
        let mut map = vec![vec![TileType::Floor; width as usize]; height as usize];
        for (y, row) in map.iter_mut().enumerate() {
            for (x, tile) in row.iter_mut().enumerate() {
                if x == 0 || y == 0 || x == width as usize - 1 || y == height as usize - 1 {
                    *tile = TileType::Wall;
                }
            }
        }

        Self {
            map,
            discovered: vec![vec![false; width as usize]; height as usize],
            width,
            height,
            start: Position::new(1, 1),
            enemies: Vec::new(),
            exit_placed: false,
        }
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    pub fn tile(&self, pos: Position) -> Option<TileType> {
        if !self.in_bounds(pos) {
            return None;
        }
        Some(self.map[pos.y as usize][pos.x as usize])
    }

    /// Overwrites a tile. Out-of-bounds writes are ignored.
    pub fn set_tile(&mut self, pos: Position, tile: TileType) {
        if self.in_bounds(pos) {
            self.map[pos.y as usize][pos.x as usize] = tile;
        }
    }

    pub fn is_border(&self, pos: Position) -> bool {
        self.in_bounds(pos)
            && (pos.x == 0
                || pos.y == 0
                || pos.x as u32 == self.width - 1
                || pos.y as u32 == self.height - 1)
    }

    pub fn is_discovered(&self, pos: Position) -> bool {
        self.in_bounds(pos) && self.discovered[pos.y as usize][pos.x as usize]
    }

    /// Reveals a single tile.
    pub fn discover(&mut self, pos: Position) {
        if self.in_bounds(pos) {
            self.discovered[pos.y as usize][pos.x as usize] = true;
        }
    }

    /// Reveals a tile and its four orthogonal neighbours.
    pub fn discover_around(&mut self, pos: Position) {
        self.discover(pos);
        for neighbour in pos.cardinal_adjacent_positions() {
            self.discover(neighbour);
        }
    }

    /// Counts tiles of the given type.
    pub fn count_tiles(&self, tile: TileType) -> usize {
        self.map
            .iter()
            .flat_map(|row| row.iter())
            .filter(|t| **t == tile)
            .count()
    }

    /// Finds every position holding the given tile type, row-major.
    pub fn positions_of(&self, tile: TileType) -> Vec<Position> {
        let mut positions = Vec::new();
        for (y, row) in self.map.iter().enumerate() {
            for (x, t) in row.iter().enumerate() {
                if *t == tile {
                    positions.push(Position::new(x as i32, y as i32));
                }
            }
        }
        positions
    }

    pub fn discovered_count(&self) -> usize {
        self.discovered
            .iter()
            .flat_map(|row| row.iter())
            .filter(|seen| **seen)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_codes_round_trip() {
        for code in 0..=8u8 {
            let tile = TileType::from_code(code).unwrap();
            assert_eq!(tile.code(), code);
        }
        assert_eq!(TileType::from_code(9), None);
    }

    #[test]
    fn test_tile_walkability() {
        assert!(!TileType::Wall.is_walkable());
        for tile in [
            TileType::Floor,
            TileType::ExitDoor,
            TileType::MonsterSpawn,
            TileType::Healing,
            TileType::Chest,
            TileType::Merchant,
            TileType::BossDoor,
            TileType::EliteBossDoor,
        ] {
            assert!(tile.is_walkable(), "{tile:?} should be walkable");
        }
    }

    #[test]
    fn test_enemy_blocking_tiles() {
        assert!(TileType::Wall.blocks_enemies());
        assert!(TileType::ExitDoor.blocks_enemies());
        assert!(TileType::BossDoor.blocks_enemies());
        assert!(TileType::Healing.blocks_enemies());
        assert!(!TileType::Chest.blocks_enemies());
        assert!(!TileType::MonsterSpawn.blocks_enemies());
        assert!(!TileType::Merchant.blocks_enemies());
    }

    #[test]
    fn test_walled_room_borders() {
        let room = Room::walled(12, 10);
        for y in 0..10 {
            for x in 0..12 {
                let pos = Position::new(x, y);
                if room.is_border(pos) {
                    assert_eq!(room.tile(pos), Some(TileType::Wall));
                } else {
                    assert_eq!(room.tile(pos), Some(TileType::Floor));
                }
            }
        }
        assert_eq!(room.count_tiles(TileType::Wall), 2 * 12 + 2 * 8);
    }

    #[test]
    fn test_discovery_is_bounded() {
        let mut room = Room::walled(10, 10);
        room.discover_around(Position::new(0, 0));
        assert!(room.is_discovered(Position::new(0, 0)));
        assert!(room.is_discovered(Position::new(1, 0)));
        assert!(room.is_discovered(Position::new(0, 1)));
        assert!(!room.is_discovered(Position::new(1, 1)));
        assert_eq!(room.discovered_count(), 3);
    }

    #[test]
    fn test_enemy_centering() {
        let key = MonsterKey::new(0, Position::new(3, 4));
        let enemy = Enemy::centered_on(Position::new(3, 4), Direction::Left, key);
        assert_eq!(enemy.pixel_x, 97.5);
        assert_eq!(enemy.pixel_y, 127.5);
        assert_eq!(enemy.tile(), Position::new(3, 4));
        assert!(player_hitbox(Position::new(3, 4)).overlaps(&enemy.hitbox()));
        assert!(!player_hitbox(Position::new(5, 4)).overlaps(&enemy.hitbox()));
    }

    #[test]
    fn test_monster_key_display() {
        let key = MonsterKey::new(2, Position::new(7, 9));
        assert_eq!(key.to_string(), "2-7-9");
        assert_eq!(key.position(), Position::new(7, 9));
    }
}
