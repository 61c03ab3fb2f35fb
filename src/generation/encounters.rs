//! # Encounter Generation
//!
//! Monster templates grouped into level-gated tiers, plus the elite boss
//! table.

use crate::game::{DiceType, Monster, SpecialAttack};
use crate::generation::{GenerationConfig, GenerationContext, Generator};
use crate::utils::RandomSource;
use crate::{GameError, GameResult};
use serde::{Deserialize, Serialize};

/// Highest level that still draws from the starting tier.
pub const STARTING_TIER_MAX_LEVEL: u32 = 3;

/// Static description of a monster kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonsterTemplate {
    pub name: &'static str,
    pub base_health: u32,
    pub base_attack: u32,
    /// Attack added per dungeon level.
    pub attack_per_level: u32,
    pub dice: DiceType,
    pub image_path: &'static str,
    pub special_name: &'static str,
    pub special_chance: u32,
    /// Half-open damage range of the special, drawn per instance.
    pub special_damage: (u32, u32),
}

impl MonsterTemplate {
    /// Health gained per dungeon level by every monster.
    pub const HEALTH_PER_LEVEL: u32 = 2;

    /// Creates a monster from this template for the given level.
    pub fn instantiate(&self, level: u32, rng: &mut dyn RandomSource) -> Monster {
        let (min, max) = self.special_damage;
        let special = SpecialAttack::new(self.special_name, self.special_chance, rng.between(min, max));
        Monster::new(
            self.name,
            self.base_health + Self::HEALTH_PER_LEVEL * level,
            self.base_attack + self.attack_per_level * level,
            self.dice,
            self.image_path,
            vec![special],
        )
    }
}

const fn template(
    name: &'static str,
    base_health: u32,
    base_attack: u32,
    attack_per_level: u32,
    dice: DiceType,
    image_path: &'static str,
    special: (&'static str, u32, u32, u32),
) -> MonsterTemplate {
    MonsterTemplate {
        name,
        base_health,
        base_attack,
        attack_per_level,
        dice,
        image_path,
        special_name: special.0,
        special_chance: special.1,
        special_damage: (special.2, special.3),
    }
}

/// Monsters found from the first level on.
pub const STARTING_MONSTERS: [MonsterTemplate; 5] = [
    template("Rust Crawler", 40, 1, 0, DiceType::D6, "images/enemies/rust-crawler.png", ("backstab", 15, 7, 11)),
    template("Glow Leech", 60, 2, 0, DiceType::D6, "images/enemies/glow-leech.png", ("drain", 15, 8, 13)),
    template("Fracture Sentinel", 30, 3, 0, DiceType::D6, "images/enemies/shard-sentinel.jpg", ("shard", 15, 9, 14)),
    template("Scrap Vulture", 55, 3, 0, DiceType::D6, "images/enemies/vulture.jpg", ("scratch", 15, 9, 14)),
    template("Viper", 50, 4, 0, DiceType::D8, "images/enemies/viper.jpg", ("poison", 15, 10, 15)),
];

/// Monsters added to the pool past [`STARTING_TIER_MAX_LEVEL`].
pub const ADVANCED_MONSTERS: [MonsterTemplate; 3] = [
    template("Vanguard Stalker", 45, 6, 0, DiceType::D8, "images/enemies/vanguard-stalker.jpg", ("shock", 25, 10, 15)),
    template("Chrono Sentinel", 70, 4, 0, DiceType::D8, "images/enemies/chrono-sentinel.jpg", ("time warp", 25, 12, 18)),
    template("Mist Reaver", 40, 5, 1, DiceType::D12, "images/enemies/mist-reaver.jpg", ("mist", 25, 10, 20)),
];

pub const MOLTEN_GIANT: MonsterTemplate = template(
    "Molten Giant",
    100,
    10,
    1,
    DiceType::D20,
    "images/enemies/molten-giant.jpg",
    ("molten slash", 25, 20, 27),
);

pub const ANCIENT_GOLEM: MonsterTemplate = template(
    "Ancient Golem",
    250,
    20,
    1,
    DiceType::D20,
    "images/enemies/ancient-golem.jpg",
    ("fire stone punch", 25, 30, 50),
);

/// Elite boss table: the first entry whose threshold the level exceeds wins.
/// A level exactly at a threshold falls through to the next entry.
pub const ELITE_TABLE: [(u32, MonsterTemplate); 2] = [(4, ANCIENT_GOLEM), (0, MOLTEN_GIANT)];

/// Template pool a room draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncounterTier {
    Starting,
    Advanced,
    Boss,
}

impl EncounterTier {
    /// Picks the tier for a level.
    ///
    /// # Examples
    ///
    /// ```
    /// use gloomcrawl::EncounterTier;
    ///
    /// assert_eq!(EncounterTier::for_level(3, false), EncounterTier::Starting);
    /// assert_eq!(EncounterTier::for_level(4, false), EncounterTier::Advanced);
    /// assert_eq!(EncounterTier::for_level(1, true), EncounterTier::Boss);
    /// ```
    pub fn for_level(level: u32, is_boss: bool) -> Self {
        if is_boss {
            EncounterTier::Boss
        } else if level <= STARTING_TIER_MAX_LEVEL {
            EncounterTier::Starting
        } else {
            EncounterTier::Advanced
        }
    }

    /// Templates available in this tier at the given level.
    pub fn templates(self, level: u32) -> Vec<MonsterTemplate> {
        match self {
            EncounterTier::Starting => STARTING_MONSTERS.to_vec(),
            EncounterTier::Advanced => STARTING_MONSTERS
                .iter()
                .chain(ADVANCED_MONSTERS.iter())
                .copied()
                .collect(),
            EncounterTier::Boss => ELITE_TABLE
                .iter()
                .find(|(threshold, _)| level > *threshold)
                .map(|(_, template)| vec![*template])
                .unwrap_or_default(),
        }
    }
}

/// Rolls monster counts and individual monsters.
#[derive(Debug, Clone, Default)]
pub struct EncounterGenerator {
    pub config: GenerationConfig,
}

impl EncounterGenerator {
    pub fn new(config: GenerationConfig) -> Self {
        Self { config }
    }

    /// Number of monsters for a room. Boss rooms always hold exactly one.
    pub fn monster_count(&self, is_boss: bool, rng: &mut dyn RandomSource) -> u32 {
        if is_boss {
            return 1;
        }
        rng.int_inclusive(self.config.min_monsters, self.config.max_monsters)
    }
}

impl Generator<Monster> for EncounterGenerator {
    fn generate(&self, context: &GenerationContext, rng: &mut dyn RandomSource) -> GameResult<Monster> {
        let templates = EncounterTier::for_level(context.level, context.is_boss).templates(context.level);
        if templates.is_empty() {
            return Err(GameError::GenerationFailed(format!(
                "no monster templates for level {}",
                context.level
            )));
        }
        let template = templates[rng.index(templates.len())];
        let monster = template.instantiate(context.level, rng);
        let monster = if context.is_boss { monster.elite() } else { monster };
        self.validate(&monster, context)?;
        Ok(monster)
    }

    fn validate(&self, content: &Monster, _context: &GenerationContext) -> GameResult<()> {
        if content.health == 0 {
            return Err(GameError::GenerationFailed(format!(
                "{} generated with no health",
                content.name
            )));
        }
        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "EncounterGenerator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::ScriptedRandom;

    #[test]
    fn test_tier_gating() {
        assert_eq!(EncounterTier::for_level(1, false).templates(1).len(), 5);
        assert_eq!(EncounterTier::for_level(4, false).templates(4).len(), 8);
    }

    #[test]
    fn test_elite_table_threshold() {
        let at_threshold = EncounterTier::Boss.templates(4);
        assert_eq!(at_threshold[0].name, "Molten Giant");
        let above = EncounterTier::Boss.templates(5);
        assert_eq!(above[0].name, "Ancient Golem");
        assert_eq!(EncounterTier::Boss.templates(1)[0].name, "Molten Giant");
    }

    #[test]
    fn test_instantiate_scales_with_level() {
        let mut rng = ScriptedRandom::new(vec![0.0]);
        let monster = ADVANCED_MONSTERS[2].instantiate(5, &mut rng);
        assert_eq!(monster.name, "Mist Reaver");
        assert_eq!(monster.health, 50);
        assert_eq!(monster.attack, 10);
        assert_eq!(monster.dice, DiceType::D12);
        assert_eq!(monster.specials[0].damage, 10);
        assert_eq!(monster.specials[0].trigger_chance, 25);
    }

    #[test]
    fn test_boss_count_is_one() {
        let generator = EncounterGenerator::default();
        let mut rng = ScriptedRandom::new(vec![]);
        assert_eq!(generator.monster_count(true, &mut rng), 1);
        assert_eq!(rng.consumed(), 0);
        assert_eq!(generator.monster_count(false, &mut rng), 7);
    }

    #[test]
    fn test_generate_boss_is_elite() {
        let generator = EncounterGenerator::default();
        let mut rng = ScriptedRandom::new(vec![0.0, 0.0]);
        let boss = generator
            .generate(&GenerationContext::new(6, true), &mut rng)
            .unwrap();
        assert_eq!(boss.name, "Ancient Golem");
        assert_eq!(boss.health, 262);
        assert_eq!(boss.attack, 26);
        assert!(boss.is_elite());
    }

    #[test]
    fn test_generate_picks_by_index() {
        let generator = EncounterGenerator::default();
        let mut rng = ScriptedRandom::new(vec![ScriptedRandom::pick(4, 5), 0.0]);
        let monster = generator
            .generate(&GenerationContext::new(1, false), &mut rng)
            .unwrap();
        assert_eq!(monster.name, "Viper");
        assert_eq!(monster.health, 52);
        assert!(!monster.is_elite());
    }
}
