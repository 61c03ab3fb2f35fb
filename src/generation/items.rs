//! # Item Generation
//!
//! Factories for every item the dungeon hands out, and the merchant's
//! fixed-composition stock. Magnitudes and prices are drawn from half-open
//! ranges.

use crate::game::{Item, ItemKind, Merchant, PointOfAction};
use crate::generation::{GenerationContext, Generator};
use crate::utils::RandomSource;
use crate::{GameError, GameResult};

pub const PLASMA_DAGGER: &str = "Plasma Dagger";
pub const AETHERWEAVER: &str = "Aetherweaver";
pub const DUAL_PISTOLS: &str = "dual-pistols";
pub const DAMAGE_BOOSTER: &str = "damage booster";
pub const GRENADE: &str = "grenade";
pub const BANDAGE: &str = "Bandage";

/// Healing consumable found in chests.
pub fn chest_bandage(rng: &mut dyn RandomSource) -> Item {
    Item::new(BANDAGE, ItemKind::Heal, rng.between(25, 35), PointOfAction::Active)
}

pub fn plasma_dagger(rng: &mut dyn RandomSource) -> Item {
    Item::new(PLASMA_DAGGER, ItemKind::Attack, rng.between(2, 3), PointOfAction::Passive)
}

pub fn aetherweaver(rng: &mut dyn RandomSource) -> Item {
    Item::new(AETHERWEAVER, ItemKind::Attack, rng.between(2, 4), PointOfAction::Passive)
}

pub fn dual_pistols(rng: &mut dyn RandomSource) -> Item {
    Item::new(DUAL_PISTOLS, ItemKind::Attack, rng.between(3, 7), PointOfAction::Passive)
}

/// Stacking passive attack boost.
pub fn damage_booster(rng: &mut dyn RandomSource) -> Item {
    Item::new(DAMAGE_BOOSTER, ItemKind::Attack, rng.between(1, 3), PointOfAction::Passive)
}

/// High-damage consumable found in chests.
pub fn chest_grenade(rng: &mut dyn RandomSource) -> Item {
    Item::new(GRENADE, ItemKind::Attack, rng.between(25, 30), PointOfAction::Active)
}

/// One line of the merchant's stock list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockEntry {
    pub name: &'static str,
    pub kind: ItemKind,
    pub poa: PointOfAction,
    /// Half-open price range.
    pub price: (u32, u32),
    /// Half-open effect range.
    pub effect: (u32, u32),
}

const fn entry(
    name: &'static str,
    kind: ItemKind,
    poa: PointOfAction,
    price: (u32, u32),
    effect: (u32, u32),
) -> StockEntry {
    StockEntry {
        name,
        kind,
        poa,
        price,
        effect,
    }
}

/// Everything a merchant carries, in display order.
pub const MERCHANT_STOCK: [StockEntry; 7] = [
    entry("axe", ItemKind::Attack, PointOfAction::Passive, (40, 50), (3, 6)),
    entry("plasma-pistol", ItemKind::Attack, PointOfAction::Passive, (12, 30), (2, 4)),
    entry("shield", ItemKind::Defense, PointOfAction::Passive, (20, 30), (2, 4)),
    entry(GRENADE, ItemKind::Attack, PointOfAction::Active, (4, 12), (25, 40)),
    entry("bandage", ItemKind::Heal, PointOfAction::Active, (7, 12), (25, 45)),
    entry("bandage", ItemKind::Heal, PointOfAction::Active, (7, 12), (25, 45)),
    entry("bandage", ItemKind::Heal, PointOfAction::Active, (7, 12), (25, 45)),
];

impl StockEntry {
    /// Rolls price then effect.
    pub fn roll(&self, rng: &mut dyn RandomSource) -> Item {
        let price = rng.between(self.price.0, self.price.1);
        let effect = rng.between(self.effect.0, self.effect.1);
        Item::new(self.name, self.kind, effect, self.poa).priced(price)
    }
}

/// Builds a fresh merchant with randomized prices and effects.
#[derive(Debug, Clone, Copy, Default)]
pub struct MerchantGenerator;

impl Generator<Merchant> for MerchantGenerator {
    fn generate(&self, context: &GenerationContext, rng: &mut dyn RandomSource) -> GameResult<Merchant> {
        let merchant = Merchant::new(MERCHANT_STOCK.iter().map(|entry| entry.roll(rng)).collect());
        self.validate(&merchant, context)?;
        Ok(merchant)
    }

    fn validate(&self, content: &Merchant, _context: &GenerationContext) -> GameResult<()> {
        if content.inventory.iter().any(|item| item.price.is_none()) {
            return Err(GameError::GenerationFailed(
                "merchant stock contains an unpriced item".to_string(),
            ));
        }
        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "MerchantGenerator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{GameRng, ScriptedRandom};
    use std::collections::HashSet;

    #[test]
    fn test_half_open_ranges() {
        let mut rng = ScriptedRandom::new(vec![0.999, 0.999, 0.999, 0.0]);
        assert_eq!(plasma_dagger(&mut rng).effect, 2);
        assert_eq!(dual_pistols(&mut rng).effect, 6);
        assert_eq!(chest_bandage(&mut rng).effect, 34);
        assert_eq!(chest_grenade(&mut rng).effect, 25);
    }

    #[test]
    fn test_passive_flags() {
        let mut rng = ScriptedRandom::new(vec![]);
        assert_eq!(damage_booster(&mut rng).poa, PointOfAction::Passive);
        assert_eq!(aetherweaver(&mut rng).poa, PointOfAction::Passive);
        assert_eq!(chest_grenade(&mut rng).poa, PointOfAction::Active);
    }

    #[test]
    fn test_merchant_composition() {
        let mut rng = GameRng::new(7);
        let merchant = MerchantGenerator
            .generate(&GenerationContext::new(1, false), &mut rng)
            .unwrap();
        let names: Vec<&str> = merchant.inventory.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["axe", "plasma-pistol", "shield", "grenade", "bandage", "bandage", "bandage"]
        );

        for (item, entry) in merchant.inventory.iter().zip(MERCHANT_STOCK.iter()) {
            let price = item.price.unwrap();
            assert!((entry.price.0..entry.price.1).contains(&price));
            assert!((entry.effect.0..entry.effect.1).contains(&item.effect));
        }

        let ids: HashSet<_> = merchant.inventory.iter().map(|i| i.id).collect();
        assert_eq!(ids.len(), 7);
    }

    #[test]
    fn test_stock_entry_draw_order() {
        let mut rng = ScriptedRandom::new(vec![
            ScriptedRandom::value_in(20, 20, 29),
            ScriptedRandom::value_in(3, 2, 3),
        ]);
        let shield = MERCHANT_STOCK[2].roll(&mut rng);
        assert_eq!(shield.price, Some(20));
        assert_eq!(shield.effect, 3);
        assert_eq!(shield.kind, ItemKind::Defense);
    }
}
