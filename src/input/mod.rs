//! # Input Module
//!
//! Input handling and command parsing for the text driver.
//!
//! Lines of text are first parsed into [`PlayerInput`], which may refer to
//! items by inventory position or name. [`InputHandler::input_to_command`]
//! then resolves those references against the current [`GameState`] to
//! produce an engine [`Command`].

pub mod commands;

pub use commands::*;

use crate::game::{Direction, GameState, Item, ItemId};
use crate::{GameError, GameResult};
use std::str::FromStr;
use uuid::Uuid;

/// A reference to an item as typed by a player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemRef {
    /// 1-based position in the listing.
    Index(usize),
    Id(ItemId),
    /// Case-insensitive item name; the first match wins.
    Name(String),
}

impl FromStr for ItemRef {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(GameError::InvalidCommand("missing item".to_string()));
        }
        if let Ok(index) = s.parse::<usize>() {
            return Ok(ItemRef::Index(index));
        }
        if let Ok(id) = Uuid::parse_str(s) {
            return Ok(ItemRef::Id(id));
        }
        Ok(ItemRef::Name(s.to_string()))
    }
}

impl ItemRef {
    /// Finds the referenced item in a listing.
    pub fn resolve(&self, items: &[Item]) -> Option<ItemId> {
        match self {
            ItemRef::Index(index) => index
                .checked_sub(1)
                .and_then(|i| items.get(i))
                .map(|item| item.id),
            ItemRef::Id(id) => items.iter().find(|item| item.id == *id).map(|item| item.id),
            ItemRef::Name(name) => items
                .iter()
                .find(|item| item.name.eq_ignore_ascii_case(name))
                .map(|item| item.id),
        }
    }
}

/// Player input types recognised by the text driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerInput {
    Move(Direction),
    Attack,
    Use(ItemRef),
    Buy(ItemRef),
    ChooseSkill(String),
    Tick,
    Wait(u64),
    /// Redraw the map
    Look,
    ShowInventory,
    ShowShop,
    ShowSkills,
    /// Print the snapshot as JSON
    Dump,
    Help,
    Quit,
}

/// Input handler for processing player commands.
#[derive(Debug, Clone)]
pub struct InputHandler {
    /// Whether single letters (w/a/s/d) count as moves
    pub wasd_enabled: bool,
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl InputHandler {
    /// Creates a new input handler.
    ///
    /// # Examples
    ///
    /// ```
    /// use gloomcrawl::{Direction, InputHandler, PlayerInput};
    ///
    /// let input_handler = InputHandler::new();
    /// assert_eq!(input_handler.parse_line("w").unwrap(), PlayerInput::Move(Direction::Up));
    /// assert_eq!(input_handler.parse_line("attack").unwrap(), PlayerInput::Attack);
    /// ```
    pub fn new() -> Self {
        Self { wasd_enabled: true }
    }

    /// Parses one line of text.
    pub fn parse_line(&self, line: &str) -> GameResult<PlayerInput> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };
        let verb = verb.to_ascii_lowercase();

        let input = match verb.as_str() {
            "" => return Err(GameError::InvalidCommand("empty command".to_string())),
            "w" | "a" | "s" | "d" if !self.wasd_enabled => {
                return Err(GameError::InvalidCommand(format!("unknown command '{verb}'")))
            }
            "up" | "down" | "left" | "right" | "north" | "south" | "east" | "west" | "w" | "a"
            | "s" | "d" => PlayerInput::Move(verb.parse()?),
            "move" | "go" => PlayerInput::Move(rest.parse()?),
            "attack" | "f" => PlayerInput::Attack,
            "use" | "u" => PlayerInput::Use(rest.parse()?),
            "buy" | "b" => PlayerInput::Buy(rest.parse()?),
            "skill" | "choose" => {
                if rest.is_empty() {
                    return Err(GameError::InvalidCommand("missing skill id".to_string()));
                }
                PlayerInput::ChooseSkill(rest.to_string())
            }
            "tick" | "t" => PlayerInput::Tick,
            "wait" => PlayerInput::Wait(rest.parse().map_err(|_| {
                GameError::InvalidCommand(format!("'{rest}' is not a number of milliseconds"))
            })?),
            "look" | "l" => PlayerInput::Look,
            "inventory" | "i" => PlayerInput::ShowInventory,
            "shop" => PlayerInput::ShowShop,
            "skills" => PlayerInput::ShowSkills,
            "json" => PlayerInput::Dump,
            "help" | "?" => PlayerInput::Help,
            "quit" | "q" | "exit" => PlayerInput::Quit,
            other => return Err(GameError::InvalidCommand(format!("unknown command '{other}'"))),
        };
        Ok(input)
    }

    /// Converts player input to an engine command.
    ///
    /// Inputs that only display information yield `None`.
    pub fn input_to_command(&self, input: PlayerInput, game_state: &GameState) -> GameResult<Option<Command>> {
        let command = match input {
            PlayerInput::Move(direction) => Command::Move { direction },
            PlayerInput::Attack => Command::Attack,
            PlayerInput::Use(item) => Command::UseItem {
                id: item
                    .resolve(&game_state.player.inventory)
                    .ok_or_else(|| GameError::InvalidCommand(format!("no such item: {item:?}")))?,
            },
            PlayerInput::Buy(item) => {
                let stock = game_state
                    .merchant
                    .as_ref()
                    .map(|merchant| merchant.inventory.as_slice())
                    .unwrap_or_default();
                Command::Purchase {
                    id: item
                        .resolve(stock)
                        .ok_or_else(|| GameError::InvalidCommand(format!("merchant has no {item:?}")))?,
                }
            }
            PlayerInput::ChooseSkill(id) => Command::ChooseSkill { id },
            PlayerInput::Tick => Command::Tick,
            PlayerInput::Wait(ms) => Command::Wait { ms },
            _ => return Ok(None),
        };
        Ok(Some(command))
    }
}

/// Help text for the text driver.
pub const HELP: &str = "\
Commands:
  up/down/left/right (or w/a/s/d)  turn, then step
  attack | f                       roll a d20 against the current monster
  use <n|name>                     use an inventory item
  buy <n|name>                     buy from the merchant
  skill <id>                       spend a skill point (p1-1, p2-1, p3-1, ...)
  tick | wait <ms>                 let time pass
  look | inventory | shop | skills | json
  help | quit";
