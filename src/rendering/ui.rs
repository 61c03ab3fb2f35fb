//! # User Interface Elements
//!
//! Text panels for stats, the battle, the message log, inventory, the
//! merchant's stock and the skill tree.

use crate::game::{GameSnapshot, Item, ItemKind, PointOfAction, RunStatus, SkillNodeState, TurnPhase};
use std::fmt::Write;

/// Number of log lines shown by default.
pub const DEFAULT_MESSAGE_LINES: usize = 5;

/// Text panel builder.
#[derive(Debug, Clone)]
pub struct UI {
    /// How many recent messages the message panel shows
    pub message_lines: usize,
}

impl Default for UI {
    fn default() -> Self {
        Self::new()
    }
}

impl UI {
    pub fn new() -> Self {
        Self {
            message_lines: DEFAULT_MESSAGE_LINES,
        }
    }

    /// One-line summary of the player and the run.
    ///
    /// # Examples
    ///
    /// ```
    /// use gloomcrawl::{GameState, UI};
    ///
    /// let state = GameState::with_seed(1).unwrap();
    /// let line = UI::new().status_line(&state.snapshot());
    /// assert!(line.starts_with("Level 1 | HP 100/100"));
    /// ```
    pub fn status_line(&self, snapshot: &GameSnapshot) -> String {
        let player = &snapshot.player;
        let mut line = format!(
            "Level {} | HP {}/{} | ATK {} | DEF {} | Credits {} | SP {} | Defeated {}",
            snapshot.level,
            player.health,
            player.starting_health,
            player.attack,
            player.defense,
            player.credits,
            player.skill_points,
            snapshot.total_defeated
        );
        match snapshot.status {
            RunStatus::Playing => {}
            RunStatus::Victory => line.push_str(" | VICTORY"),
            RunStatus::Defeated => line.push_str(" | DEFEATED"),
        }
        if snapshot.merchant_open {
            line.push_str(" | Merchant open");
        }
        line
    }

    /// The battle panel, if a battle is active.
    pub fn battle_panel(&self, snapshot: &GameSnapshot) -> Option<String> {
        let battle = snapshot.battle.as_ref()?;
        let monster = &battle.monster;
        let turn = match battle.phase {
            TurnPhase::AwaitingPlayer => "your turn".to_string(),
            TurnPhase::PlayerRolling { remaining_ms } => format!("rolling ({remaining_ms}ms)"),
            TurnPhase::EnemyWindup { remaining_ms } => format!("{} is preparing ({remaining_ms}ms)", monster.name),
            TurnPhase::EnemyRolling { remaining_ms } => format!("{} is rolling ({remaining_ms}ms)", monster.name),
        };
        let mut panel = format!(
            "== {} == HP {}/{} | ATK {} | {:?}\n",
            monster.name, monster.health, monster.starting_health, monster.attack, monster.dice
        );
        for special in &monster.specials {
            let _ = writeln!(
                panel,
                "   {} ({}% for {})",
                special.name, special.trigger_chance, special.damage
            );
        }
        let _ = writeln!(panel, "   Turn: {turn}");
        Some(panel)
    }

    /// The most recent messages, newest first.
    pub fn messages_panel(&self, snapshot: &GameSnapshot) -> String {
        let mut panel = String::new();
        for message in snapshot.messages.iter().take(self.message_lines) {
            let _ = writeln!(panel, "> {message}");
        }
        panel
    }

    /// Numbered inventory listing.
    pub fn inventory_panel(&self, snapshot: &GameSnapshot) -> String {
        if snapshot.player.inventory.is_empty() {
            return "Your inventory is empty.\n".to_string();
        }
        let mut panel = String::from("Inventory:\n");
        for (index, item) in snapshot.player.inventory.iter().enumerate() {
            let _ = writeln!(panel, "  {}. {}", index + 1, describe_item(item));
        }
        panel
    }

    /// Numbered merchant stock with prices.
    pub fn shop_panel(&self, snapshot: &GameSnapshot) -> String {
        let Some(merchant) = &snapshot.merchant else {
            return "There is no merchant on this level.\n".to_string();
        };
        if merchant.inventory.is_empty() {
            return "The merchant is sold out.\n".to_string();
        }
        let mut panel = format!("Merchant (you have {} credits):\n", snapshot.player.credits);
        for (index, item) in merchant.inventory.iter().enumerate() {
            let _ = writeln!(
                panel,
                "  {}. {} - {} credits",
                index + 1,
                describe_item(item),
                item.price.unwrap_or_default()
            );
        }
        panel
    }

    /// Skill nodes with their ids and states.
    pub fn skills_panel(&self, snapshot: &GameSnapshot) -> String {
        let mut panel = format!("Skill points: {}\n", snapshot.player.skill_points);
        for skill in &snapshot.skills {
            let marker = match skill.state {
                SkillNodeState::Chosen => 'x',
                SkillNodeState::Available => ' ',
                SkillNodeState::Locked => '-',
            };
            let _ = writeln!(panel, "  [{marker}] {:<6} {}", skill.id, skill.name);
        }
        panel
    }
}

/// Short description such as `Bandage (heals 20)`.
pub fn describe_item(item: &Item) -> String {
    let effect = match (item.kind, item.poa) {
        (ItemKind::Heal, _) => format!("heals {}", item.effect),
        (ItemKind::Attack, PointOfAction::Active) => format!("deals {}", item.effect),
        (ItemKind::Attack, PointOfAction::Passive) => format!("+{} attack", item.effect),
        (ItemKind::Defense, PointOfAction::Active) => format!("blocks {}", item.effect),
        (ItemKind::Defense, PointOfAction::Passive) => format!("+{} defense", item.effect),
    };
    format!("{} ({effect})", item.name)
}
