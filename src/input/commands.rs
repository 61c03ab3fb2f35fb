//! # Command Definitions
//!
//! Serializable engine commands, dispatched by [`GameState::execute`].
//!
//! [`GameState::execute`]: crate::GameState::execute

use crate::game::{Direction, ItemId};
use serde::{Deserialize, Serialize};

/// One command entry point of the engine.
///
/// # Examples
///
/// ```
/// use gloomcrawl::{Command, Direction};
///
/// let command: Command = serde_json::from_str(r#"{"command":"move","direction":"left"}"#).unwrap();
/// assert_eq!(command, Command::Move { direction: Direction::Left });
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// Turn, or step if already facing that way.
    Move { direction: Direction },
    /// Bare d20 attack against the active monster.
    Attack,
    /// Use an active inventory item.
    UseItem { id: ItemId },
    /// Buy from the merchant.
    Purchase { id: ItemId },
    /// Spend a skill point on a node.
    ChooseSkill { id: String },
    /// Advance one frame.
    Tick,
    /// Advance the clock by the given number of milliseconds.
    Wait { ms: u64 },
}

impl Command {
    /// Whether the command only advances time.
    pub fn is_time_step(&self) -> bool {
        matches!(self, Command::Tick | Command::Wait { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_command_json_shapes() {
        let id = Uuid::nil();
        let json = serde_json::to_string(&Command::UseItem { id }).unwrap();
        assert_eq!(
            json,
            r#"{"command":"use_item","id":"00000000-0000-0000-0000-000000000000"}"#
        );
        let attack: Command = serde_json::from_str(r#"{"command":"attack"}"#).unwrap();
        assert_eq!(attack, Command::Attack);
        let skill: Command = serde_json::from_str(r#"{"command":"choose_skill","id":"p1-1"}"#).unwrap();
        assert_eq!(skill, Command::ChooseSkill { id: "p1-1".to_string() });
    }

    #[test]
    fn test_time_steps() {
        assert!(Command::Tick.is_time_step());
        assert!(Command::Wait { ms: 100 }.is_time_step());
        assert!(!Command::Attack.is_time_step());
    }
}
