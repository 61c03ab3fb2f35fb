//! # Game State Module
//!
//! Central game state management and coordination between all game systems.
//!
//! [`GameState`] is the single owned aggregate for a run: the rooms visited so
//! far, the player, the monster lookup, the active battle, the merchant, the
//! skill tree and the narrative log. The movement, combat, economy and
//! progression modules each add their commands to it through `impl GameState`
//! blocks; this module owns construction, level loading, the clock and
//! read-only snapshots.

use crate::config::{
    DEFAULT_PLAYER_ATTACK, DEFAULT_PLAYER_HEALTH, ENEMY_ROLL_MS, ENEMY_SPEED, MAX_DUNGEON_LEVELS,
    PLAYER_ROLL_MS, TARGET_FPS, TURN_DELAY_MS,
};
use crate::game::{
    Battle, Direction, Enemy, Merchant, Monster, MonsterKey, Player, Position, Room, SkillNodeState,
    SkillTree, TileType, TurnPhase,
};
use crate::generation::{
    place_random_tile, DungeonGenerator, GeneratedLevel, GenerationConfig, GenerationContext,
    Generator, MerchantGenerator,
};
use crate::input::Command;
use crate::utils::{GameRng, RandomSource};
use crate::{GameError, GameResult};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Tunable parameters for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Entering a door on this level wins the run.
    pub max_dungeon_levels: u32,
    /// Length of one frame for [`GameState::advance_tick`].
    pub tick_ms: u64,
    /// Player dice animation.
    pub player_roll_ms: u64,
    /// Pause between the player's turn and the monster's.
    pub turn_delay_ms: u64,
    /// Monster dice animation.
    pub enemy_roll_ms: u64,
    /// Pixels an enemy moves per tick.
    pub enemy_speed: f64,
    pub player_health: u32,
    pub player_attack: u32,
    pub generation: GenerationConfig,
}

impl GameConfig {
    /// Creates the standard configuration.
    pub fn new() -> Self {
        Self {
            max_dungeon_levels: MAX_DUNGEON_LEVELS,
            tick_ms: 1000 / TARGET_FPS,
            player_roll_ms: PLAYER_ROLL_MS,
            turn_delay_ms: TURN_DELAY_MS,
            enemy_roll_ms: ENEMY_ROLL_MS,
            enemy_speed: ENEMY_SPEED,
            player_health: DEFAULT_PLAYER_HEALTH,
            player_attack: DEFAULT_PLAYER_ATTACK,
            generation: GenerationConfig::new(),
        }
    }

    /// Creates a configuration for testing: sparse rooms, no merchant and
    /// no combat delays.
    pub fn for_testing() -> Self {
        Self {
            player_roll_ms: 0,
            turn_delay_ms: 0,
            enemy_roll_ms: 0,
            generation: GenerationConfig::for_testing(),
            ..Self::new()
        }
    }

    /// Loads a configuration from a JSON file. Missing fields take their
    /// defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> GameResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: GameConfig = serde_json::from_str(&text)?;
        config.validate()?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Checks that every range and timing is usable.
    pub fn validate(&self) -> GameResult<()> {
        let generation = &self.generation;
        if self.max_dungeon_levels == 0 {
            return Err(GameError::Config("max_dungeon_levels must be at least 1".to_string()));
        }
        if self.tick_ms == 0 {
            return Err(GameError::Config("tick_ms must be positive".to_string()));
        }
        if generation.min_width < 3 || generation.min_height < 3 {
            return Err(GameError::Config("rooms must be at least 3x3".to_string()));
        }
        if generation.min_width > generation.max_width
            || generation.min_height > generation.max_height
            || generation.min_monsters > generation.max_monsters
        {
            return Err(GameError::Config("inverted generation range".to_string()));
        }
        if generation.min_monsters == 0 {
            return Err(GameError::Config("rooms need at least one monster".to_string()));
        }
        let chances = [
            generation.healing_chance,
            generation.chest_chance,
            generation.merchant_chance,
        ];
        if chances.iter().any(|chance| *chance > 100) {
            return Err(GameError::Config("chances are percentages".to_string()));
        }
        if !(0.0..0.5).contains(&generation.wall_density) {
            return Err(GameError::Config("wall_density must be in [0, 0.5)".to_string()));
        }

        // The start cell and the merchant stall need floor left over after
        // every other placement.
        let merchant = u32::from(generation.merchant_chance > 0);
        let heights = generation.min_height..=generation.max_height;
        let sizes = (generation.min_width..=generation.max_width)
            .flat_map(|width| heights.clone().map(move |height| (width, height)));
        for (width, height) in sizes {
            let interior = (width - 2) * (height - 2);
            let needed = generation.worst_case_placements(width, height) + merchant;
            if interior <= needed {
                return Err(GameError::Config(format!(
                    "a {width}x{height} room has {interior} interior cells but generation may fill {needed}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Where a run stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Playing,
    /// A door was entered on the final level.
    Victory,
    /// The player died. Commands are ignored from here on.
    Defeated,
}

/// Append-only narrative log. Every entry is also sent to the `log` facade.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageLog {
    entries: Vec<String>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) {
        let message = message.into();
        info!("{message}");
        self.entries.push(message);
    }

    /// Messages, most recent first.
    pub fn recent(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().rev().map(String::as_str)
    }

    pub fn latest(&self) -> Option<&str> {
        self.entries.last().map(String::as_str)
    }

    /// Whether any message contains the given text.
    pub fn contains(&self, text: &str) -> bool {
        self.entries.iter().any(|entry| entry.contains(text))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Central game state containing all data for a single run.
#[derive(Debug)]
pub struct GameState {
    pub config: GameConfig,
    /// 1-based level number.
    pub current_level: u32,
    /// Every room visited, indexed by level - 1.
    pub rooms: Vec<Room>,
    pub player: Player,
    pub player_position: Position,
    pub facing: Direction,
    /// Monster lookup for every room generated so far.
    pub monsters: HashMap<MonsterKey, Monster>,
    pub battle: Option<Battle>,
    pub total_defeated: u32,
    pub merchant: Option<Merchant>,
    /// Set while the player stands on the merchant tile.
    pub merchant_open: bool,
    pub skill_tree: SkillTree,
    pub status: RunStatus,
    pub log: MessageLog,
    /// Simulated time since the run started.
    pub elapsed_ms: u64,
    pub(crate) rng: Box<dyn RandomSource>,
}

impl GameState {
    /// Starts a new run on a freshly generated first level.
    pub fn new(config: GameConfig, rng: Box<dyn RandomSource>) -> GameResult<Self> {
        config.validate()?;
        let mut state = Self::empty(config, rng);
        state.load_level(false)?;
        Ok(state)
    }

    /// Starts a new run with the standard configuration and a seeded source.
    ///
    /// # Examples
    ///
    /// ```
    /// use gloomcrawl::{GameState, RunStatus};
    ///
    /// let state = GameState::with_seed(12345).unwrap();
    /// assert_eq!(state.current_level, 1);
    /// assert_eq!(state.rooms.len(), 1);
    /// assert_eq!(state.status, RunStatus::Playing);
    /// ```
    pub fn with_seed(seed: u64) -> GameResult<Self> {
        Self::new(GameConfig::new(), Box::new(GameRng::new(seed)))
    }

    /// Starts a run on a prebuilt first level.
    pub fn from_level(
        config: GameConfig,
        level: GeneratedLevel,
        rng: Box<dyn RandomSource>,
    ) -> GameResult<Self> {
        config.validate()?;
        let mut state = Self::empty(config, rng);
        state.install_level(level, &GenerationContext::new(1, false))?;
        Ok(state)
    }

    fn empty(config: GameConfig, rng: Box<dyn RandomSource>) -> Self {
        let player = Player::new(config.player_health, config.player_attack);
        Self {
            config,
            current_level: 1,
            rooms: Vec::new(),
            player,
            player_position: Position::origin(),
            facing: Direction::Up,
            monsters: HashMap::new(),
            battle: None,
            total_defeated: 0,
            merchant: None,
            merchant_open: false,
            skill_tree: SkillTree::new(),
            status: RunStatus::Playing,
            log: MessageLog::new(),
            elapsed_ms: 0,
            rng,
        }
    }

    /// Replaces the random source.
    pub fn set_random_source(&mut self, rng: Box<dyn RandomSource>) {
        self.rng = rng;
    }

    /// Generates the room for `current_level` and moves the player into it.
    pub fn load_level(&mut self, is_boss: bool) -> GameResult<()> {
        let context = GenerationContext::new(self.current_level, is_boss);
        let generator = DungeonGenerator::new(self.config.generation.clone());
        debug!("Running {} for level {}", generator.generator_type(), context.level);
        let level = generator.generate(&context, self.rng.as_mut())?;
        self.install_level(level, &context)
    }

    /// Turns spawns into wandering enemies, rolls the merchant and places the
    /// player on the level's start cell.
    fn install_level(&mut self, level: GeneratedLevel, context: &GenerationContext) -> GameResult<()> {
        if self.rooms.len() != context.room_index {
            return Err(GameError::InvalidState(format!(
                "level {} would be stored at room {} but {} rooms exist",
                context.level,
                context.room_index,
                self.rooms.len()
            )));
        }

        let GeneratedLevel { mut room, spawns } = level;
        for (key, monster) in spawns {
            let direction = Direction::all()[self.rng.index(4)];
            room.enemies.push(Enemy::centered_on(key.position(), direction, key));
            self.monsters.insert(key, monster);
        }

        self.merchant = None;
        if self.rng.chance(self.config.generation.merchant_chance) {
            let merchant = MerchantGenerator.generate(context, self.rng.as_mut())?;
            let tries = self.config.generation.placement_tries;
            let start = room.start;
            let stall = place_random_tile(&mut room, TileType::Merchant, tries, &[start], self.rng.as_mut());
            debug!("Merchant set up at {stall}");
            self.merchant = Some(merchant);
        }

        self.player_position = room.start;
        self.facing = Direction::Up;
        self.battle = None;
        self.merchant_open = false;
        room.discover_around(room.start);
        info!(
            "Entered level {} ({}x{}, {} enemies{})",
            context.level,
            room.width,
            room.height,
            room.enemies.len(),
            if context.is_boss { ", boss" } else { "" }
        );
        self.rooms.push(room);
        Ok(())
    }

    pub fn room_index(&self) -> usize {
        self.current_level.saturating_sub(1) as usize
    }

    /// The room for the current level.
    pub fn room(&self) -> Option<&Room> {
        self.rooms.get(self.room_index())
    }

    pub fn room_mut(&mut self) -> Option<&mut Room> {
        let index = self.room_index();
        self.rooms.get_mut(index)
    }

    pub fn monster(&self, key: MonsterKey) -> GameResult<&Monster> {
        self.monsters
            .get(&key)
            .ok_or_else(|| GameError::InvalidState(format!("monster {key} is missing")))
    }

    pub fn monster_mut(&mut self, key: MonsterKey) -> GameResult<&mut Monster> {
        self.monsters
            .get_mut(&key)
            .ok_or_else(|| GameError::InvalidState(format!("monster {key} is missing")))
    }

    /// The monster being fought, if any.
    pub fn battle_monster(&self) -> Option<&Monster> {
        self.battle
            .as_ref()
            .and_then(|battle| self.monsters.get(&battle.monster))
    }

    /// Advances the clock by one frame.
    pub fn advance_tick(&mut self) -> GameResult<()> {
        self.tick(self.config.tick_ms)
    }

    /// Advances the clock by `ms`, one frame at a time.
    ///
    /// Enemies wander once per frame; combat timers count down continuously.
    pub fn advance_time(&mut self, ms: u64) -> GameResult<()> {
        let mut remaining = ms;
        while remaining > 0 {
            let step = remaining.min(self.config.tick_ms);
            self.tick(step)?;
            remaining -= step;
        }
        Ok(())
    }

    fn tick(&mut self, ms: u64) -> GameResult<()> {
        self.elapsed_ms += ms;
        self.advance_combat(ms)?;
        if self.status == RunStatus::Playing && !self.in_combat() {
            self.wander_enemies()?;
        }
        Ok(())
    }

    /// Dispatches a command. Returns `Ok(false)` if it was ignored.
    pub fn execute(&mut self, command: Command) -> GameResult<bool> {
        debug!("Executing {command:?}");
        match command {
            Command::Move { direction } => self.attempt_move(direction),
            Command::Attack => self.attempt_attack(),
            Command::UseItem { id } => self.use_item(id),
            Command::Purchase { id } => self.purchase_item(id),
            Command::ChooseSkill { id } => self.choose_skill_node(&id),
            Command::Tick => self.advance_tick().map(|_| true),
            Command::Wait { ms } => self.advance_time(ms).map(|_| true),
        }
    }

    /// Read-only view of everything a UI layer draws.
    pub fn snapshot(&self) -> GameSnapshot {
        let room = self.room();
        let battle = self.battle.as_ref().and_then(|battle| {
            self.monsters.get(&battle.monster).map(|monster| BattleSnapshot {
                monster: monster.clone(),
                phase: battle.phase,
            })
        });

        GameSnapshot {
            level: self.current_level,
            status: self.status,
            width: room.map_or(0, |room| room.width),
            height: room.map_or(0, |room| room.height),
            map: room
                .map(|room| {
                    room.map
                        .iter()
                        .map(|row| row.iter().map(|tile| tile.code()).collect())
                        .collect()
                })
                .unwrap_or_default(),
            discovered: room.map(|room| room.discovered.clone()).unwrap_or_default(),
            player: self.player.clone(),
            player_position: self.player_position,
            facing: self.facing,
            enemies: room
                .map(|room| {
                    room.enemies
                        .iter()
                        .map(|enemy| EnemySnapshot {
                            pixel_x: enemy.pixel_x,
                            pixel_y: enemy.pixel_y,
                            name: self
                                .monsters
                                .get(&enemy.monster)
                                .map(|monster| monster.name.clone())
                                .unwrap_or_default(),
                        })
                        .collect()
                })
                .unwrap_or_default(),
            battle,
            merchant: self.merchant.clone(),
            merchant_open: self.merchant_open,
            skills: self
                .skill_tree
                .nodes()
                .iter()
                .map(|node| SkillSnapshot {
                    id: node.id.clone(),
                    name: node.name.clone(),
                    state: self.skill_tree.state(&node.id).unwrap_or(SkillNodeState::Locked),
                })
                .collect(),
            total_defeated: self.total_defeated,
            messages: self.log.recent().map(str::to_string).collect(),
        }
    }

    /// The snapshot as pretty-printed JSON.
    pub fn to_json(&self) -> GameResult<String> {
        Ok(serde_json::to_string_pretty(&self.snapshot())?)
    }
}

/// Serializable view of a [`GameState`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub level: u32,
    pub status: RunStatus,
    pub width: u32,
    pub height: u32,
    /// Tile codes, `map[y][x]`.
    pub map: Vec<Vec<u8>>,
    pub discovered: Vec<Vec<bool>>,
    pub player: Player,
    pub player_position: Position,
    pub facing: Direction,
    pub enemies: Vec<EnemySnapshot>,
    pub battle: Option<BattleSnapshot>,
    pub merchant: Option<Merchant>,
    pub merchant_open: bool,
    pub skills: Vec<SkillSnapshot>,
    pub total_defeated: u32,
    /// Most recent first.
    pub messages: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemySnapshot {
    pub pixel_x: f64,
    pub pixel_y: f64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleSnapshot {
    pub monster: Monster,
    pub phase: TurnPhase,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillSnapshot {
    pub id: String,
    pub name: String,
    pub state: SkillNodeState,
}
