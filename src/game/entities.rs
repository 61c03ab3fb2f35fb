//! # Entity Model
//!
//! Value types for the player, monsters, items and the merchant.
//!
//! Entities carry stat arithmetic only; the rules that decide *when* stats
//! change live in the combat, economy and progression systems. All permanent
//! stat changes go through [`StatEffect`] and [`Player::apply_effect`].

use crate::game::{new_item_id, ItemId};
use serde::{Deserialize, Serialize};

/// Tagged permanent stat change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", content = "amount")]
pub enum StatEffect {
    /// Raises attack.
    AddAttack(u32),
    /// Raises defense.
    AddDefense(u32),
    /// Raises maximum health and current health by the same amount.
    AddMaxHealth(u32),
}

impl std::fmt::Display for StatEffect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatEffect::AddAttack(n) => write!(f, "+{n} Attack"),
            StatEffect::AddDefense(n) => write!(f, "+{n} Defense"),
            StatEffect::AddMaxHealth(n) => write!(f, "+{n} Max Health"),
        }
    }
}

/// What an item does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Heal,
    Attack,
    Defense,
}

/// Point of action: how an item's effect is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointOfAction {
    /// Consumed on use.
    Active,
    /// Permanent stat delta applied once when acquired.
    Passive,
}

/// An item that can be owned by the player or stocked by the merchant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub kind: ItemKind,
    pub effect: u32,
    pub poa: PointOfAction,
    /// Only set for merchant stock.
    pub price: Option<u32>,
}

impl Item {
    /// Creates a new item with a fresh unique id.
    ///
    /// # Examples
    ///
    /// ```
    /// use gloomcrawl::{Item, ItemKind, PointOfAction, StatEffect};
    ///
    /// let shield = Item::new("shield", ItemKind::Defense, 3, PointOfAction::Passive);
    /// assert_eq!(shield.passive_effect(), Some(StatEffect::AddDefense(3)));
    /// ```
    pub fn new(name: impl Into<String>, kind: ItemKind, effect: u32, poa: PointOfAction) -> Self {
        Self {
            id: new_item_id(),
            name: name.into(),
            kind,
            effect,
            poa,
            price: None,
        }
    }

    /// Attaches a merchant price.
    pub fn priced(mut self, price: u32) -> Self {
        self.price = Some(price);
        self
    }

    /// Whether the item is consumed on use.
    pub fn is_active(&self) -> bool {
        self.poa == PointOfAction::Active
    }

    /// The permanent effect this item grants on acquisition, if passive.
    pub fn passive_effect(&self) -> Option<StatEffect> {
        if self.poa != PointOfAction::Passive {
            return None;
        }
        Some(match self.kind {
            ItemKind::Attack => StatEffect::AddAttack(self.effect),
            ItemKind::Defense => StatEffect::AddDefense(self.effect),
            ItemKind::Heal => StatEffect::AddMaxHealth(self.effect),
        })
    }
}

/// The player character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub health: u32,
    /// Maximum health.
    pub starting_health: u32,
    pub attack: u32,
    pub defense: u32,
    /// Display order only.
    pub inventory: Vec<Item>,
    pub credits: u32,
    pub experience: u32,
    pub skill_points: u32,
}

impl Player {
    /// Name of the item every run starts with.
    pub const STARTING_ITEM: &'static str = "Bandage";
    /// Heal amount of the starting bandage.
    pub const STARTING_ITEM_EFFECT: u32 = 20;

    /// Creates a player with a single starting bandage.
    ///
    /// # Examples
    ///
    /// ```
    /// use gloomcrawl::Player;
    ///
    /// let player = Player::new(100, 1);
    /// assert_eq!(player.health, 100);
    /// assert_eq!(player.inventory.len(), 1);
    /// ```
    pub fn new(health: u32, attack: u32) -> Self {
        Self {
            health,
            starting_health: health,
            attack,
            defense: 0,
            inventory: vec![Item::new(
                Self::STARTING_ITEM,
                ItemKind::Heal,
                Self::STARTING_ITEM_EFFECT,
                PointOfAction::Active,
            )],
            credits: 0,
            experience: 0,
            skill_points: 0,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Heals up to the maximum. Returns the amount actually restored.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let before = self.health;
        self.health = self.health.saturating_add(amount).min(self.starting_health);
        self.health - before
    }

    /// Restores health to the maximum.
    pub fn full_heal(&mut self) {
        self.health = self.starting_health;
    }

    /// Applies damage, flooring health at zero. Returns the damage taken.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let before = self.health;
        self.health = self.health.saturating_sub(amount);
        before - self.health
    }

    /// Applies a permanent stat change.
    pub fn apply_effect(&mut self, effect: StatEffect) {
        match effect {
            StatEffect::AddAttack(n) => self.attack += n,
            StatEffect::AddDefense(n) => self.defense += n,
            StatEffect::AddMaxHealth(n) => {
                self.starting_health += n;
                self.health = (self.health + n).min(self.starting_health);
            }
        }
    }

    /// Adds an item to the inventory, applying its passive effect.
    ///
    /// Passive effects are granted here and nowhere else; removing the item
    /// later does not revoke them.
    pub fn acquire(&mut self, item: Item) -> Option<StatEffect> {
        let effect = item.passive_effect();
        if let Some(effect) = effect {
            self.apply_effect(effect);
        }
        self.inventory.push(item);
        effect
    }

    pub fn find_item(&self, id: ItemId) -> Option<&Item> {
        self.inventory.iter().find(|item| item.id == id)
    }

    /// Removes an item by id.
    pub fn remove_item(&mut self, id: ItemId) -> Option<Item> {
        let index = self.inventory.iter().position(|item| item.id == id)?;
        Some(self.inventory.remove(index))
    }

    pub fn owns_item_named(&self, name: &str) -> bool {
        self.inventory.iter().any(|item| item.name == name)
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_PLAYER_HEALTH, crate::config::DEFAULT_PLAYER_ATTACK)
    }
}

/// Die sizes used by monsters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiceType {
    D6,
    D8,
    D10,
    D12,
    D20,
}

impl DiceType {
    pub fn sides(self) -> u32 {
        match self {
            DiceType::D6 => 6,
            DiceType::D8 => 8,
            DiceType::D10 => 10,
            DiceType::D12 => 12,
            DiceType::D20 => 20,
        }
    }
}

impl std::fmt::Display for DiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "d{}", self.sides())
    }
}

/// A monster ability checked before its normal attack roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialAttack {
    pub name: String,
    /// Percentage chance to fire on the monster's turn.
    pub trigger_chance: u32,
    /// Damage dealt when it fires; ignores defense.
    pub damage: u32,
}

impl SpecialAttack {
    pub fn new(name: impl Into<String>, trigger_chance: u32, damage: u32) -> Self {
        Self {
            name: name.into(),
            trigger_chance,
            damage,
        }
    }
}

/// Whether a monster belongs to the boss table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MonsterRank {
    Common,
    Elite,
}

/// A monster instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Monster {
    pub name: String,
    pub health: u32,
    pub starting_health: u32,
    pub attack: u32,
    pub dice: DiceType,
    pub defeated: bool,
    pub image_path: String,
    pub specials: Vec<SpecialAttack>,
    pub rank: MonsterRank,
}

impl Monster {
    /// Creates a common monster at full health.
    pub fn new(
        name: impl Into<String>,
        health: u32,
        attack: u32,
        dice: DiceType,
        image_path: impl Into<String>,
        specials: Vec<SpecialAttack>,
    ) -> Self {
        Self {
            name: name.into(),
            health,
            starting_health: health,
            attack,
            dice,
            defeated: false,
            image_path: image_path.into(),
            specials,
            rank: MonsterRank::Common,
        }
    }

    /// Marks the monster as belonging to the boss table.
    pub fn elite(mut self) -> Self {
        self.rank = MonsterRank::Elite;
        self
    }

    pub fn is_elite(&self) -> bool {
        self.rank == MonsterRank::Elite
    }

    /// Applies damage, flooring health at zero. Returns the damage taken.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let before = self.health;
        self.health = self.health.saturating_sub(amount);
        before - self.health
    }
}

/// A travelling merchant. Stock is never replenished.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Merchant {
    pub inventory: Vec<Item>,
}

impl Merchant {
    pub fn new(inventory: Vec<Item>) -> Self {
        Self { inventory }
    }

    pub fn find_item(&self, id: ItemId) -> Option<&Item> {
        self.inventory.iter().find(|item| item.id == id)
    }

    /// Removes an item from stock permanently.
    pub fn take_item(&mut self, id: ItemId) -> Option<Item> {
        let index = self.inventory.iter().position(|item| item.id == id)?;
        Some(self.inventory.remove(index))
    }
}
