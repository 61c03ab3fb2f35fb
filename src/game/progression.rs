//! # Progression Module
//!
//! The skill tree: a root node plus three linear chains that spend skill
//! points on permanent stat upgrades.

use crate::game::{GameState, Player, StatEffect};
use crate::GameResult;
use serde::{Deserialize, Serialize};

/// Id of the root node, chosen from the start.
pub const ROOT_NODE: &str = "center";

/// One node of the skill tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillNode {
    pub id: String,
    pub name: String,
    /// The single prerequisite; `None` only for the root.
    pub requires: Option<String>,
    pub effect: Option<StatEffect>,
    pub chosen: bool,
}

impl SkillNode {
    fn new(id: &str, requires: &str, effect: StatEffect) -> Self {
        Self {
            id: id.to_string(),
            name: effect.to_string(),
            requires: Some(requires.to_string()),
            effect: Some(effect),
            chosen: false,
        }
    }

    fn root() -> Self {
        Self {
            id: ROOT_NODE.to_string(),
            name: String::new(),
            requires: None,
            effect: None,
            chosen: true,
        }
    }
}

/// Display state of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillNodeState {
    Locked,
    Available,
    Chosen,
}

/// Why a node could not be chosen.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SkillRejection {
    #[error("There is no skill called \"{0}\".")]
    UnknownNode(String),
    #[error("\"{0}\" has already been chosen.")]
    AlreadyChosen(String),
    #[error("\"{0}\" is still locked.")]
    Locked(String),
    #[error("You have no skill points to spend.")]
    NoSkillPoints,
}

/// The prerequisite graph of skill nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillTree {
    nodes: Vec<SkillNode>,
}

impl SkillTree {
    /// Creates the standard tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use gloomcrawl::{SkillNodeState, SkillTree};
    ///
    /// let tree = SkillTree::new();
    /// assert_eq!(tree.state("center"), Some(SkillNodeState::Chosen));
    /// assert_eq!(tree.state("p1-1"), Some(SkillNodeState::Available));
    /// assert_eq!(tree.state("p1-2"), Some(SkillNodeState::Locked));
    /// ```
    pub fn new() -> Self {
        Self {
            nodes: vec![
                SkillNode::root(),
                SkillNode::new("p1-1", ROOT_NODE, StatEffect::AddAttack(1)),
                SkillNode::new("p1-2", "p1-1", StatEffect::AddAttack(2)),
                SkillNode::new("p1-3", "p1-2", StatEffect::AddAttack(2)),
                SkillNode::new("p2-1", ROOT_NODE, StatEffect::AddDefense(1)),
                SkillNode::new("p2-2", "p2-1", StatEffect::AddDefense(2)),
                SkillNode::new("p2-3", "p2-2", StatEffect::AddDefense(2)),
                SkillNode::new("p3-1", ROOT_NODE, StatEffect::AddMaxHealth(5)),
                SkillNode::new("p3-2", "p3-1", StatEffect::AddMaxHealth(10)),
                SkillNode::new("p3-3", "p3-2", StatEffect::AddMaxHealth(15)),
            ],
        }
    }

    pub fn nodes(&self) -> &[SkillNode] {
        &self.nodes
    }

    pub fn node(&self, id: &str) -> Option<&SkillNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    fn is_chosen(&self, id: &str) -> bool {
        self.node(id).is_some_and(|node| node.chosen)
    }

    pub fn state(&self, id: &str) -> Option<SkillNodeState> {
        let node = self.node(id)?;
        Some(if node.chosen {
            SkillNodeState::Chosen
        } else if node.requires.as_deref().map_or(true, |req| self.is_chosen(req)) {
            SkillNodeState::Available
        } else {
            SkillNodeState::Locked
        })
    }

    /// Chooses a node, spending one of the player's skill points and applying
    /// the node's effect.
    ///
    /// The node must exist, not be chosen yet and have its prerequisite
    /// chosen; those checks come before the skill point check. Nothing is
    /// mutated on rejection.
    pub fn choose(&mut self, id: &str, player: &mut Player) -> Result<&SkillNode, SkillRejection> {
        match self.state(id) {
            None => return Err(SkillRejection::UnknownNode(id.to_string())),
            Some(SkillNodeState::Chosen) => return Err(SkillRejection::AlreadyChosen(id.to_string())),
            Some(SkillNodeState::Locked) => return Err(SkillRejection::Locked(id.to_string())),
            Some(SkillNodeState::Available) => {}
        }
        if player.skill_points == 0 {
            return Err(SkillRejection::NoSkillPoints);
        }

        let node = self
            .nodes
            .iter_mut()
            .find(|node| node.id == id)
            .ok_or_else(|| SkillRejection::UnknownNode(id.to_string()))?;
        player.skill_points -= 1;
        node.chosen = true;
        if let Some(effect) = node.effect {
            player.apply_effect(effect);
        }
        Ok(node)
    }
}

impl Default for SkillTree {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    /// Chooses a skill node. Returns `Ok(false)` if the choice was refused.
    pub fn choose_skill_node(&mut self, id: &str) -> GameResult<bool> {
        if !self.ensure_playing() {
            return Ok(false);
        }
        match self.skill_tree.choose(id, &mut self.player) {
            Ok(node) => {
                let message = format!("You chose \"{}\"!", node.name);
                self.log.push(message);
                Ok(true)
            }
            Err(rejection) => {
                self.log.push(rejection.to_string());
                Ok(false)
            }
        }
    }
}
