//! # Economy Module
//!
//! Monster drops, chest tables and merchant purchases.
//!
//! The loot functions operate on a [`Player`] and a [`RandomSource`] only and
//! return the narrative lines they produce; [`GameState`] wires them into the
//! run and the message log.

use crate::game::{GameState, Item, ItemId, ItemKind, Merchant, Monster, Player, RunStatus};
use crate::generation::{
    aetherweaver, chest_bandage, chest_grenade, damage_booster, dual_pistols, plasma_dagger,
    AETHERWEAVER, DUAL_PISTOLS, PLASMA_DAGGER,
};
use crate::utils::RandomSource;
use crate::GameResult;
use log::debug;

/// Credits range (inclusive) dropped by elite monsters.
pub const ELITE_CREDITS: (u32, u32) = (50, 100);
/// Skill points granted by elite monsters.
pub const ELITE_SKILL_POINTS: u32 = 2;
/// Chance that a common monster drops anything.
pub const COMMON_DROP_CHANCE: u32 = 70;
/// Credits range (inclusive) dropped by common monsters.
pub const COMMON_CREDITS: (u32, u32) = (1, 10);

/// Chance that a chest holds anything at all.
pub const CHEST_FILLED_CHANCE: u32 = 85;
pub const CHEST_BANDAGE_CHANCE: u32 = 50;
/// Chance for each link of the weapon chain.
pub const CHEST_WEAPON_CHANCE: u32 = 15;
pub const CHEST_BOOSTER_CHANCE: u32 = 20;
pub const CHEST_GRENADE_CHANCE: u32 = 15;
pub const CHEST_CREDITS_CHANCE: u32 = 30;
/// Half-open credits range found in chests.
pub const CHEST_CREDITS: (u32, u32) = (3, 25);

/// Rolls the drop for a defeated monster and credits it to the player.
///
/// # Examples
///
/// ```
/// use gloomcrawl::{roll_monster_loot, DiceType, Monster, Player, ScriptedRandom};
///
/// let viper = Monster::new("Viper", 50, 4, DiceType::D8, "viper.jpg", vec![]);
/// let mut player = Player::new(100, 1);
/// let mut rng = ScriptedRandom::new(vec![ScriptedRandom::PASS, ScriptedRandom::value_in(7, 1, 10)]);
/// let lines = roll_monster_loot(&viper, &mut player, &mut rng);
/// assert_eq!(player.credits, 7);
/// assert_eq!(lines, vec!["You found 7 credits!".to_string()]);
/// ```
pub fn roll_monster_loot(monster: &Monster, player: &mut Player, rng: &mut dyn RandomSource) -> Vec<String> {
    if monster.is_elite() {
        let credits = rng.int_inclusive(ELITE_CREDITS.0, ELITE_CREDITS.1);
        player.credits += credits;
        player.skill_points += ELITE_SKILL_POINTS;
        return vec![format!(
            "The {} dropped {} credits and {} skill points!",
            monster.name, credits, ELITE_SKILL_POINTS
        )];
    }

    if rng.chance(COMMON_DROP_CHANCE) {
        let credits = rng.int_inclusive(COMMON_CREDITS.0, COMMON_CREDITS.1);
        player.credits += credits;
        vec![format!("You found {credits} credits!")]
    } else {
        vec!["Nothing found.".to_string()]
    }
}

/// Opens a chest, handing its contents to the player.
///
/// Each roll is independent except the weapon chain, where at most one
/// weapon is found and weapons already owned are skipped. The chance for a
/// weapon link is drawn before ownership is checked.
pub fn open_chest(player: &mut Player, rng: &mut dyn RandomSource) -> Vec<String> {
    let mut lines = Vec::new();

    if rng.chance(CHEST_FILLED_CHANCE) {
        if rng.chance(CHEST_BANDAGE_CHANCE) {
            let bandage = chest_bandage(rng);
            lines.push(format!(
                "You found a Bandage that heals for {} health!",
                bandage.effect
            ));
            player.acquire(bandage);
        }

        if let Some(weapon) = roll_weapon(player, rng) {
            lines.push(format!(
                "You found {} that hits for {} damage!",
                with_article(&weapon.name),
                weapon.effect
            ));
            player.acquire(weapon);
        }

        if rng.chance(CHEST_BOOSTER_CHANCE) {
            let booster = damage_booster(rng);
            lines.push(format!(
                "You found a damage booster that increases your attack by {}!",
                booster.effect
            ));
            player.acquire(booster);
        }

        if rng.chance(CHEST_GRENADE_CHANCE) {
            let grenade = chest_grenade(rng);
            lines.push(format!(
                "You found a grenade that hits for {} damage!",
                grenade.effect
            ));
            player.acquire(grenade);
        }

        if rng.chance(CHEST_CREDITS_CHANCE) {
            let credits = rng.between(CHEST_CREDITS.0, CHEST_CREDITS.1);
            player.credits += credits;
            lines.push(format!("You found {credits} credits!"));
        }
    }

    if lines.is_empty() {
        lines.push("The chest was empty.".to_string());
    }
    lines
}

type WeaponFactory = fn(&mut dyn RandomSource) -> Item;

const WEAPON_CHAIN: [(&str, WeaponFactory); 3] = [
    (PLASMA_DAGGER, plasma_dagger),
    (AETHERWEAVER, aetherweaver),
    (DUAL_PISTOLS, dual_pistols),
];

fn roll_weapon(player: &Player, rng: &mut dyn RandomSource) -> Option<Item> {
    for (name, factory) in WEAPON_CHAIN {
        if rng.chance(CHEST_WEAPON_CHANCE) && !player.owns_item_named(name) {
            return Some(factory(rng));
        }
    }
    None
}

fn with_article(name: &str) -> String {
    match name.chars().next() {
        Some(c) if "aeiouAEIOU".contains(c) => format!("an {name}"),
        _ => format!("a {name}"),
    }
}

/// Result of a purchase attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum PurchaseOutcome {
    /// The item changed hands.
    Purchased { name: String, price: u32, effect: u32, kind: ItemKind },
    /// Credits did not strictly exceed the price.
    NotEnoughCredits { name: String },
    /// The merchant does not stock that item.
    NotStocked,
}

impl PurchaseOutcome {
    /// Narrative line describing the outcome.
    pub fn message(&self) -> String {
        match self {
            PurchaseOutcome::Purchased {
                name, effect, kind, ..
            } => {
                let verb = match kind {
                    ItemKind::Attack => "hits",
                    ItemKind::Heal => "heals",
                    ItemKind::Defense => "defends",
                };
                format!("You bought {} that {} for {}!", with_article(name), verb, effect)
            }
            PurchaseOutcome::NotEnoughCredits { name } => {
                format!("Not enough credits to buy a {name}")
            }
            PurchaseOutcome::NotStocked => "The merchant does not sell that.".to_string(),
        }
    }

    pub fn is_purchased(&self) -> bool {
        matches!(self, PurchaseOutcome::Purchased { .. })
    }
}

/// Buys an item from the merchant.
///
/// Credits must be strictly greater than the price. On success the price is
/// deducted, the item's passive effect is applied and the item leaves the
/// merchant's stock for good. Otherwise nothing changes.
pub fn purchase(merchant: &mut Merchant, player: &mut Player, id: ItemId) -> PurchaseOutcome {
    let Some(item) = merchant.find_item(id) else {
        return PurchaseOutcome::NotStocked;
    };
    let price = item.price.unwrap_or(0);
    if player.credits <= price {
        return PurchaseOutcome::NotEnoughCredits {
            name: item.name.clone(),
        };
    }

    let Some(item) = merchant.take_item(id) else {
        return PurchaseOutcome::NotStocked;
    };
    player.credits -= price;
    let outcome = PurchaseOutcome::Purchased {
        name: item.name.clone(),
        price,
        effect: item.effect,
        kind: item.kind,
    };
    player.acquire(item);
    outcome
}

impl GameState {
    /// Buys an item from the current merchant.
    ///
    /// Returns `Ok(false)` when the purchase is refused; the reason is logged
    /// to the narrative.
    pub fn purchase_item(&mut self, id: ItemId) -> GameResult<bool> {
        if !self.ensure_playing() {
            return Ok(false);
        }
        let Some(merchant) = self.merchant.as_mut() else {
            self.log.push("There is no merchant here.");
            return Ok(false);
        };

        let outcome = purchase(merchant, &mut self.player, id);
        debug!("Purchase of {id}: {outcome:?}");
        self.log.push(outcome.message());
        Ok(outcome.is_purchased())
    }

    /// Opens the chest the player is standing on and clears it.
    pub(crate) fn loot_chest(&mut self) {
        let lines = open_chest(&mut self.player, self.rng.as_mut());
        for line in lines {
            self.log.push(line);
        }
    }

    /// Whether commands are currently accepted; logs a notice when not.
    pub(crate) fn ensure_playing(&mut self) -> bool {
        if self.status == RunStatus::Playing {
            return true;
        }
        self.log.push("The run is over.");
        false
    }
}
