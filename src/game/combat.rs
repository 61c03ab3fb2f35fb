//! # Combat Module
//!
//! The turn-based battle state machine.
//!
//! A battle moves through explicit [`TurnPhase`]s. Player input is accepted
//! only in [`TurnPhase::AwaitingPlayer`]; every other phase is a countdown
//! that [`GameState::advance_time`] drives to completion. Leftover time from a
//! finished phase flows into the next one, so a single large time step can
//! resolve a whole exchange.
//!
//! ```text
//! AwaitingPlayer --attack--> PlayerRolling --> EnemyWindup --> EnemyRolling --> AwaitingPlayer
//!                --item----------------------> EnemyWindup
//!                                              EnemyWindup --special--> AwaitingPlayer
//! ```
//!
//! Killing the monster or losing the player concludes the battle from any
//! resolving phase.

use crate::game::{roll_monster_loot, GameState, ItemId, ItemKind, MonsterKey, RunStatus};
use crate::generation::place_exit;
use crate::{GameError, GameResult};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Die rolled by the player for bare attacks.
pub const PLAYER_DIE_SIDES: u32 = 20;

/// Where a battle is in its turn cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum TurnPhase {
    /// Waiting for an attack or item.
    AwaitingPlayer,
    /// The player's d20 is in the air.
    PlayerRolling { remaining_ms: u64 },
    /// Pause before the monster acts.
    EnemyWindup { remaining_ms: u64 },
    /// The monster's die is in the air.
    EnemyRolling { remaining_ms: u64 },
}

impl TurnPhase {
    /// Whether player input is locked out.
    pub fn is_locked(self) -> bool {
        self != TurnPhase::AwaitingPlayer
    }

    /// Time left before this phase resolves, if it is timed.
    pub fn remaining_ms(self) -> Option<u64> {
        match self {
            TurnPhase::AwaitingPlayer => None,
            TurnPhase::PlayerRolling { remaining_ms }
            | TurnPhase::EnemyWindup { remaining_ms }
            | TurnPhase::EnemyRolling { remaining_ms } => Some(remaining_ms),
        }
    }

    fn with_remaining(self, remaining_ms: u64) -> Self {
        match self {
            TurnPhase::AwaitingPlayer => TurnPhase::AwaitingPlayer,
            TurnPhase::PlayerRolling { .. } => TurnPhase::PlayerRolling { remaining_ms },
            TurnPhase::EnemyWindup { .. } => TurnPhase::EnemyWindup { remaining_ms },
            TurnPhase::EnemyRolling { .. } => TurnPhase::EnemyRolling { remaining_ms },
        }
    }
}

/// The single active battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Battle {
    pub monster: MonsterKey,
    pub phase: TurnPhase,
}

impl Battle {
    pub fn new(monster: MonsterKey) -> Self {
        Self {
            monster,
            phase: TurnPhase::AwaitingPlayer,
        }
    }

    pub fn is_turn_locked(&self) -> bool {
        self.phase.is_locked()
    }
}

impl GameState {
    /// Whether a battle is active.
    pub fn in_combat(&self) -> bool {
        self.battle.is_some()
    }

    /// Engages the given monster.
    pub(crate) fn start_battle(&mut self, key: MonsterKey) -> GameResult<()> {
        let name = self.monster(key)?.name.clone();
        self.battle = Some(Battle::new(key));
        info!("Battle started against {name} ({key})");
        self.log.push(format!("A {name} appears!"));
        Ok(())
    }

    /// Starts a bare attack. The d20 is rolled when the roll delay elapses.
    ///
    /// Returns `Ok(false)` when there is nothing to attack or the turn is
    /// locked.
    pub fn attempt_attack(&mut self) -> GameResult<bool> {
        if !self.ensure_playing() || !self.ensure_player_turn() {
            return Ok(false);
        }
        self.set_phase(TurnPhase::PlayerRolling {
            remaining_ms: self.config.player_roll_ms,
        });
        self.advance_combat(0)?;
        Ok(true)
    }

    /// Uses an active item from the inventory.
    ///
    /// In battle this takes the player's turn: attack items damage the
    /// monster and heal items heal the player, both without a roll. Out of
    /// battle only heal items can be used. Passive items can never be used.
    pub fn use_item(&mut self, id: ItemId) -> GameResult<bool> {
        if !self.ensure_playing() {
            return Ok(false);
        }
        let Some(item) = self.player.find_item(id).cloned() else {
            self.log.push("You don't have that item.");
            return Ok(false);
        };
        if !item.is_active() {
            self.log.push(format!("The {} works on its own and cannot be used.", item.name));
            return Ok(false);
        }

        if self.battle.is_some() {
            if !self.ensure_player_turn() {
                return Ok(false);
            }
            self.player.remove_item(id);
            match item.kind {
                ItemKind::Heal => {
                    let healed = self.player.heal(item.effect);
                    self.log.push(format!("You used {} and healed {} health!", item.name, healed));
                    self.enter_enemy_windup()?;
                }
                ItemKind::Attack | ItemKind::Defense => {
                    self.strike_monster(item.effect)?;
                }
            }
            self.advance_combat(0)?;
            return Ok(true);
        }

        match item.kind {
            ItemKind::Heal => {
                self.player.remove_item(id);
                let healed = self.player.heal(item.effect);
                self.log.push(format!("You used {} and healed {} health!", item.name, healed));
                Ok(true)
            }
            ItemKind::Attack | ItemKind::Defense => {
                self.log.push(format!("There is nothing to use the {} on.", item.name));
                Ok(false)
            }
        }
    }

    /// Runs every pending combat timer to completion without moving enemies.
    ///
    /// Stops once the battle is back in [`TurnPhase::AwaitingPlayer`] or has
    /// concluded.
    pub fn resolve_pending_combat(&mut self) -> GameResult<()> {
        while let Some(remaining) = self.battle.as_ref().and_then(|b| b.phase.remaining_ms()) {
            self.elapsed_ms += remaining;
            self.advance_combat(remaining)?;
        }
        Ok(())
    }

    /// Counts combat timers down by `elapsed` milliseconds, resolving every
    /// phase that completes.
    pub(crate) fn advance_combat(&mut self, mut elapsed: u64) -> GameResult<()> {
        loop {
            let Some(battle) = self.battle.as_mut() else {
                return Ok(());
            };
            let phase = battle.phase;
            let Some(remaining) = phase.remaining_ms() else {
                return Ok(());
            };
            if elapsed < remaining {
                battle.phase = phase.with_remaining(remaining - elapsed);
                return Ok(());
            }
            elapsed -= remaining;

            match phase {
                TurnPhase::PlayerRolling { .. } => self.resolve_player_roll()?,
                TurnPhase::EnemyWindup { .. } => self.begin_enemy_turn()?,
                TurnPhase::EnemyRolling { .. } => self.resolve_enemy_roll()?,
                TurnPhase::AwaitingPlayer => return Ok(()),
            }
        }
    }

    /// Ends the active battle.
    ///
    /// Safe to call any number of times: once the room is clear the exit is
    /// stamped exactly once.
    pub fn conclude_combat(&mut self) {
        if let Some(battle) = self.battle.take() {
            debug!("Battle against {} concluded", battle.monster);
        }

        let level = self.current_level;
        let monsters = &self.monsters;
        let Some(room) = self.rooms.last_mut() else {
            return;
        };
        let cleared = room
            .enemies
            .iter()
            .all(|enemy| monsters.get(&enemy.monster).map_or(true, |m| m.defeated));
        if cleared && !room.exit_placed {
            let door = place_exit(room, level, self.rng.as_mut());
            info!("Room on level {level} cleared; exit stamped at {door}");
            self.log.push("The way forward is open.");
        }
    }

    fn ensure_player_turn(&mut self) -> bool {
        match &self.battle {
            None => {
                self.log.push("There is nothing to attack.");
                false
            }
            Some(battle) if battle.is_turn_locked() => {
                self.log.push("Wait for your turn.");
                false
            }
            Some(_) => true,
        }
    }

    fn set_phase(&mut self, phase: TurnPhase) {
        if let Some(battle) = self.battle.as_mut() {
            battle.phase = phase;
        }
    }

    fn active_key(&self) -> GameResult<MonsterKey> {
        self.battle
            .as_ref()
            .map(|battle| battle.monster)
            .ok_or_else(|| GameError::InvalidState("no active battle".to_string()))
    }

    fn resolve_player_roll(&mut self) -> GameResult<()> {
        let roll = self.rng.roll(PLAYER_DIE_SIDES);
        debug!("Player rolled {roll}");
        if roll <= 1 {
            self.log.push("You missed!");
            return self.enter_enemy_windup();
        }
        self.strike_monster(self.player.attack + roll)
    }

    /// Applies player damage to the active monster and either defeats it or
    /// hands the turn to the monster.
    fn strike_monster(&mut self, damage: u32) -> GameResult<()> {
        let key = self.active_key()?;
        let monster = self.monster_mut(key)?;
        monster.take_damage(damage);
        let name = monster.name.clone();
        let slain = monster.health == 0;
        self.log.push(format!("You dealt {damage} damage to {name}."));

        if damage > 0 && slain {
            self.defeat_monster(key)
        } else {
            self.enter_enemy_windup()
        }
    }

    fn defeat_monster(&mut self, key: MonsterKey) -> GameResult<()> {
        let monster = self
            .monsters
            .get_mut(&key)
            .ok_or_else(|| GameError::InvalidState(format!("monster {key} is missing")))?;
        monster.defeated = true;
        let name = monster.name.clone();
        self.log.push(format!("{name} is defeated!"));

        let lines = roll_monster_loot(&self.monsters[&key], &mut self.player, self.rng.as_mut());
        for line in lines {
            self.log.push(line);
        }

        if let Some(room) = self.rooms.get_mut(key.room_index) {
            room.enemies.retain(|enemy| enemy.monster != key);
        }
        self.total_defeated += 1;
        self.player.experience += 1;
        info!("{name} defeated; {} monsters down", self.total_defeated);
        self.conclude_combat();
        Ok(())
    }

    fn enter_enemy_windup(&mut self) -> GameResult<()> {
        self.set_phase(TurnPhase::EnemyWindup {
            remaining_ms: self.config.turn_delay_ms,
        });
        Ok(())
    }

    /// Checks specials in order; the first to fire ends the turn. Otherwise
    /// the monster starts rolling its die.
    fn begin_enemy_turn(&mut self) -> GameResult<()> {
        let key = self.active_key()?;
        let monster = self.monster(key)?.clone();

        for special in &monster.specials {
            if self.rng.chance(special.trigger_chance) {
                let dealt = self.player.take_damage(special.damage);
                debug!("{} fired {} for {}", monster.name, special.name, dealt);
                self.log.push(format!(
                    "{} used {} and dealt {} damage to you!",
                    monster.name, special.name, dealt
                ));
                return self.after_enemy_strike();
            }
        }

        self.set_phase(TurnPhase::EnemyRolling {
            remaining_ms: self.config.enemy_roll_ms,
        });
        Ok(())
    }

    fn resolve_enemy_roll(&mut self) -> GameResult<()> {
        let key = self.active_key()?;
        let monster = self.monster(key)?.clone();
        let roll = self.rng.roll(monster.dice.sides());
        debug!("{} rolled {} on a {}", monster.name, roll, monster.dice);

        if roll <= 1 {
            self.log.push(format!("{} missed!", monster.name));
            self.set_phase(TurnPhase::AwaitingPlayer);
            return Ok(());
        }

        let damage = (monster.attack + roll).saturating_sub(self.player.defense);
        self.player.take_damage(damage);
        self.log.push(format!("{} dealt {} damage to you!", monster.name, damage));
        self.after_enemy_strike()
    }

    fn after_enemy_strike(&mut self) -> GameResult<()> {
        if self.player.is_alive() {
            self.set_phase(TurnPhase::AwaitingPlayer);
            return Ok(());
        }

        self.player.health = 0;
        self.log.push("You have been defeated!");
        self.log.push(format!(
            "Game Over! You defeated {} monsters and reached level {}!",
            self.total_defeated, self.current_level
        ));
        self.status = RunStatus::Defeated;
        self.conclude_combat();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_lock_is_phase_based() {
        assert!(!TurnPhase::AwaitingPlayer.is_locked());
        assert!(TurnPhase::PlayerRolling { remaining_ms: 0 }.is_locked());
        assert!(TurnPhase::EnemyWindup { remaining_ms: 10 }.is_locked());
        assert!(TurnPhase::EnemyRolling { remaining_ms: 5 }.is_locked());
    }

    #[test]
    fn test_phase_remaining() {
        assert_eq!(TurnPhase::AwaitingPlayer.remaining_ms(), None);
        let phase = TurnPhase::EnemyWindup { remaining_ms: 1000 };
        assert_eq!(phase.remaining_ms(), Some(1000));
        assert_eq!(
            phase.with_remaining(250),
            TurnPhase::EnemyWindup { remaining_ms: 250 }
        );
    }

    #[test]
    fn test_phase_serialization() {
        let json = serde_json::to_string(&TurnPhase::PlayerRolling { remaining_ms: 350 }).unwrap();
        assert_eq!(json, r#"{"phase":"player_rolling","remaining_ms":350}"#);
    }

    #[test]
    fn test_new_battle_awaits_player() {
        let battle = Battle::new(MonsterKey {
            room_index: 0,
            x: 3,
            y: 4,
        });
        assert!(!battle.is_turn_locked());
    }
}
