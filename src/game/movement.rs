//! # Movement Module
//!
//! Player movement with fog-of-war discovery, arrival effects, enemy
//! wandering and encounter detection.

use crate::game::{
    player_hitbox, tile_containing, Direction, Enemy, GameState, Monster, MonsterKey, Position,
    RunStatus, TileType,
};
use crate::utils::RandomSource;
use crate::GameResult;
use log::{debug, info, warn};
use std::collections::HashMap;

/// Whether an enemy whose hitbox starts at the given pixel position may stand
/// there. The tile under the hitbox centre must exist and not block enemies.
pub fn enemy_can_enter(map: &[Vec<TileType>], pixel_x: f64, pixel_y: f64) -> bool {
    let tile = tile_containing(pixel_x, pixel_y);
    if tile.x < 0 || tile.y < 0 {
        return false;
    }
    map.get(tile.y as usize)
        .and_then(|row| row.get(tile.x as usize))
        .is_some_and(|tile| !tile.blocks_enemies())
}

/// Moves one enemy a single step.
///
/// When the step is blocked the enemy turns to a random direction and tries
/// once more; if that is blocked too it keeps the new direction and holds
/// position. Returns whether the enemy moved.
pub fn step_enemy(map: &[Vec<TileType>], enemy: &mut Enemy, speed: f64, rng: &mut dyn RandomSource) -> bool {
    let mut next = next_pixel(enemy, speed);
    if !enemy_can_enter(map, next.0, next.1) {
        enemy.direction = Direction::all()[rng.index(4)];
        next = next_pixel(enemy, speed);
        if !enemy_can_enter(map, next.0, next.1) {
            return false;
        }
    }

    enemy.pixel_x = next.0;
    enemy.pixel_y = next.1;
    true
}

fn next_pixel(enemy: &Enemy, speed: f64) -> (f64, f64) {
    let delta = enemy.direction.to_delta();
    (
        enemy.pixel_x + delta.x as f64 * speed,
        enemy.pixel_y + delta.y as f64 * speed,
    )
}

impl GameState {
    /// Whether the player may step onto a tile. Only walls and the outside of
    /// the room block.
    pub fn can_move_to_tile(&self, pos: Position) -> bool {
        self.room()
            .and_then(|room| room.tile(pos))
            .is_some_and(|tile| tile.is_walkable())
    }

    /// Handles a directional input.
    ///
    /// A direction other than the current facing only turns the player; the
    /// same direction again attempts a one-tile step. Returns `Ok(false)` if
    /// the input was ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use gloomcrawl::{Direction, GameState};
    ///
    /// let mut state = GameState::with_seed(7).unwrap();
    /// assert_eq!(state.facing, Direction::Up);
    /// state.attempt_move(Direction::Left).unwrap();
    /// assert_eq!(state.facing, Direction::Left);
    /// ```
    pub fn attempt_move(&mut self, direction: Direction) -> GameResult<bool> {
        if !self.ensure_playing() {
            return Ok(false);
        }
        if self.in_combat() {
            self.log.push("You cannot move during combat.");
            return Ok(false);
        }

        if direction != self.facing {
            self.facing = direction;
            return Ok(true);
        }

        let target = self.player_position.step(direction);
        if !self.can_move_to_tile(target) {
            self.log.push("Something blocks your way.");
            return Ok(false);
        }

        self.player_position = target;
        if let Some(room) = self.room_mut() {
            room.discover_around(target);
        }
        self.arrive(target)?;
        Ok(true)
    }

    /// Applies the effects of the tile the player just stepped onto.
    fn arrive(&mut self, pos: Position) -> GameResult<()> {
        let Some(tile) = self.room().and_then(|room| room.tile(pos)) else {
            return Ok(());
        };
        self.merchant_open = false;

        match tile {
            TileType::Healing => {
                self.player.full_heal();
                self.log.push("You have been fully healed!");
                self.clear_tile(pos);
            }
            TileType::Chest => {
                self.loot_chest();
                self.clear_tile(pos);
            }
            door if door.is_door() => {
                if self.current_level < self.config.max_dungeon_levels {
                    self.current_level += 1;
                    self.log.push(format!("You proceed to level {}!", self.current_level));
                    self.load_level(door.is_boss_door())?;
                    return Ok(());
                }
                info!("Final door reached on level {}", self.current_level);
                self.log.push("You have completed all levels! You Win!");
                self.status = RunStatus::Victory;
                return Ok(());
            }
            TileType::Merchant => {
                self.merchant_open = self.merchant.is_some();
            }
            _ => {}
        }

        self.check_for_encounter()?;
        Ok(())
    }

    fn clear_tile(&mut self, pos: Position) {
        if let Some(room) = self.room_mut() {
            room.set_tile(pos, TileType::Floor);
        }
    }

    /// Moves every living enemy one step, then checks for an encounter.
    ///
    /// Does nothing while a battle is active.
    pub fn wander_enemies(&mut self) -> GameResult<()> {
        if self.in_combat() {
            return Ok(());
        }

        let speed = self.config.enemy_speed;
        let index = self.room_index();
        let monsters: &HashMap<MonsterKey, Monster> = &self.monsters;
        let rng = self.rng.as_mut();
        let Some(room) = self.rooms.get_mut(index) else {
            return Ok(());
        };

        let map = &room.map;
        for enemy in room.enemies.iter_mut() {
            let alive = monsters.get(&enemy.monster).is_some_and(|m| !m.defeated);
            if alive && !step_enemy(map, enemy, speed, rng) {
                debug!("Enemy {} holds at ({}, {})", enemy.monster, enemy.pixel_x, enemy.pixel_y);
            }
        }

        self.check_for_encounter()?;
        Ok(())
    }

    /// Tests the player's hitbox against every enemy.
    ///
    /// The first overlapping enemy ends the scan. A battle starts only if
    /// that enemy's monster is still alive and no battle is active. Returns
    /// whether a battle started.
    pub fn check_for_encounter(&mut self) -> GameResult<bool> {
        let hitbox = player_hitbox(self.player_position);
        let Some(key) = self.room().and_then(|room| {
            room.enemies
                .iter()
                .find(|enemy| hitbox.overlaps(&enemy.hitbox()))
                .map(|enemy| enemy.monster)
        }) else {
            return Ok(false);
        };

        if self.in_combat() {
            return Ok(false);
        }
        let Some(monster) = self.monsters.get(&key) else {
            warn!("Enemy refers to missing monster {key}");
            return Ok(false);
        };
        if monster.defeated {
            return Ok(false);
        }

        self.start_battle(key)?;
        Ok(true)
    }
}
