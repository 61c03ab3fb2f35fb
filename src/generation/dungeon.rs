//! # Dungeon Generation
//!
//! Builds one walled room per level and populates it with healing tiles,
//! chests, interior walls and monsters.
//!
//! Every feature is placed with the same bounded rejection sampler,
//! [`place_random_tile`]: it draws random cells until it finds an empty floor
//! cell, and after `placement_tries` failures gives up and reports cell
//! `(0, 0)` without stamping anything. The fallback is non-fatal: a monster
//! "placed" there keys its lookup entry on `(0, 0)` and spawns inside the
//! corner wall.

use crate::game::{MonsterKey, Monster, Position, Room, TileType};
use crate::generation::{EncounterGenerator, GenerationConfig, GenerationContext, Generator};
use crate::utils::RandomSource;
use crate::{GameError, GameResult};
use log::{debug, warn};

/// Boss exits: clearing a room on exactly this level stamps this door.
pub const BOSS_GATES: [(u32, TileType); 2] = [(2, TileType::BossDoor), (5, TileType::EliteBossDoor)];

/// A freshly generated level, before enemies get pixel-space state.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedLevel {
    pub room: Room,
    /// Monsters in placement order, keyed by spawn cell.
    pub spawns: Vec<(MonsterKey, Monster)>,
}

/// Primary room generator.
///
/// Generation order:
/// 1. Size and perimeter walls
/// 2. Optional healing tile, chest attempts
/// 3. Extra interior walls
/// 4. Monsters
/// 5. Player start cell
#[derive(Debug, Clone, Default)]
pub struct DungeonGenerator {
    pub config: GenerationConfig,
    encounters: EncounterGenerator,
}

impl DungeonGenerator {
    /// Creates a new dungeon generator.
    ///
    /// # Examples
    ///
    /// ```
    /// use gloomcrawl::{DungeonGenerator, GameRng, GenerationConfig, GenerationContext, Generator};
    ///
    /// let generator = DungeonGenerator::new(GenerationConfig::new());
    /// let mut rng = GameRng::new(12345);
    /// let level = generator.generate(&GenerationContext::new(1, false), &mut rng).unwrap();
    /// assert!(level.room.width >= 10);
    /// ```
    pub fn new(config: GenerationConfig) -> Self {
        Self {
            encounters: EncounterGenerator::new(config.clone()),
            config,
        }
    }

    /// Places a tile with this generator's placement budget.
    pub fn place(&self, room: &mut Room, tile: TileType, rng: &mut dyn RandomSource) -> Position {
        place_random_tile(room, tile, self.config.placement_tries, &[], rng)
    }

    fn place_features(&self, room: &mut Room, rng: &mut dyn RandomSource) {
        if rng.chance(self.config.healing_chance) {
            self.place(room, TileType::Healing, rng);
        }

        for _ in 0..self.config.chest_attempts {
            if rng.chance(self.config.chest_chance) {
                self.place(room, TileType::Chest, rng);
            }
        }

        for _ in 0..self.config.wall_count(room.width, room.height) {
            self.place(room, TileType::Wall, rng);
        }
    }

    fn place_monsters(
        &self,
        room: &mut Room,
        context: &GenerationContext,
        rng: &mut dyn RandomSource,
    ) -> GameResult<Vec<(MonsterKey, Monster)>> {
        let count = self.encounters.monster_count(context.is_boss, rng);
        let mut spawns = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let cell = self.place(room, TileType::MonsterSpawn, rng);
            let monster = self.encounters.generate(context, rng)?;
            debug!("Spawned {} at {} on level {}", monster.name, cell, context.level);
            spawns.push((MonsterKey::new(context.room_index, cell), monster));
        }
        Ok(spawns)
    }

    /// Picks the start cell by rejection sampling over floor and healing cells.
    ///
    /// Terminates for any configuration `GameConfig::validate` accepts,
    /// since those always leave interior floor after placement.
    fn pick_start(&self, room: &Room, rng: &mut dyn RandomSource) -> Position {
        loop {
            let x = rng.index(room.width as usize) as i32;
            let y = rng.index(room.height as usize) as i32;
            let pos = Position::new(x, y);
            if matches!(room.tile(pos), Some(TileType::Floor) | Some(TileType::Healing)) {
                return pos;
            }
        }
    }
}

impl Generator<GeneratedLevel> for DungeonGenerator {
    fn generate(&self, context: &GenerationContext, rng: &mut dyn RandomSource) -> GameResult<GeneratedLevel> {
        let width = rng.int_inclusive(self.config.min_width, self.config.max_width);
        let height = rng.int_inclusive(self.config.min_height, self.config.max_height);
        let mut room = Room::walled(width, height);

        self.place_features(&mut room, rng);
        let spawns = self.place_monsters(&mut room, context, rng)?;
        room.start = self.pick_start(&room, rng);

        let level = GeneratedLevel { room, spawns };
        self.validate(&level, context)?;

        debug!(
            "Generated {}x{} room for level {} (boss: {}, monsters: {})",
            width,
            height,
            context.level,
            context.is_boss,
            level.spawns.len()
        );
        Ok(level)
    }

    fn validate(&self, content: &GeneratedLevel, _context: &GenerationContext) -> GameResult<()> {
        let room = &content.room;
        if room.width < 3 || room.height < 3 {
            return Err(GameError::GenerationFailed(format!(
                "room {}x{} is too small to hold a floor",
                room.width, room.height
            )));
        }

        for y in 0..room.height as i32 {
            for x in 0..room.width as i32 {
                let pos = Position::new(x, y);
                if room.is_border(pos) && room.tile(pos) != Some(TileType::Wall) {
                    return Err(GameError::GenerationFailed(format!(
                        "border cell {pos} is not a wall"
                    )));
                }
            }
        }

        match room.tile(room.start) {
            Some(TileType::Floor) | Some(TileType::Healing) => Ok(()),
            other => Err(GameError::GenerationFailed(format!(
                "start cell {} holds {:?}",
                room.start, other
            ))),
        }
    }

    fn generator_type(&self) -> &'static str {
        "DungeonGenerator"
    }
}

/// Stamps `tile` on a random empty floor cell.
///
/// Draws up to `max_tries` cells (x first, then y), skipping anything that is
/// not floor and anything listed in `reserved`. When the budget runs out the
/// placement falls back to `(0, 0)`, which is returned but not stamped.
pub fn place_random_tile(
    room: &mut Room,
    tile: TileType,
    max_tries: u32,
    reserved: &[Position],
    rng: &mut dyn RandomSource,
) -> Position {
    for _ in 0..max_tries {
        let x = rng.index(room.width as usize) as i32;
        let y = rng.index(room.height as usize) as i32;
        let pos = Position::new(x, y);
        if room.tile(pos) == Some(TileType::Floor) && !reserved.contains(&pos) {
            room.set_tile(pos, tile);
            return pos;
        }
    }

    warn!(
        "Placement of {:?} exhausted {} tries; falling back to (0, 0)",
        tile, max_tries
    );
    Position::origin()
}

/// The exit tile stamped once a room on `level` is cleared.
///
/// # Examples
///
/// ```
/// use gloomcrawl::{exit_tile_for_level, TileType};
///
/// assert_eq!(exit_tile_for_level(1), TileType::ExitDoor);
/// assert_eq!(exit_tile_for_level(2), TileType::BossDoor);
/// assert_eq!(exit_tile_for_level(5), TileType::EliteBossDoor);
/// ```
pub fn exit_tile_for_level(level: u32) -> TileType {
    BOSS_GATES
        .iter()
        .find(|(gate_level, _)| *gate_level == level)
        .map(|(_, tile)| *tile)
        .unwrap_or(TileType::ExitDoor)
}

/// Stamps the exit on the bottom wall.
///
/// Prefers a column whose cell just inside the wall is not itself a wall, so
/// the exit can be reached; falls back to any interior column.
pub fn place_exit(room: &mut Room, level: u32, rng: &mut dyn RandomSource) -> Position {
    let door_y = room.height as i32 - 1;
    let reachable: Vec<i32> = (1..room.width as i32 - 1)
        .filter(|x| {
            room.tile(Position::new(*x, door_y - 1))
                .is_some_and(|tile| tile.is_walkable())
        })
        .collect();

    let x = if reachable.is_empty() {
        1 + rng.index((room.width - 2) as usize) as i32
    } else {
        reachable[rng.index(reachable.len())]
    };

    let pos = Position::new(x, door_y);
    room.set_tile(pos, exit_tile_for_level(level));
    room.exit_placed = true;
    pos
}
