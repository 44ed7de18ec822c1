//! # Host Collaborator Contract
//!
//! Everything the rules read or mutate belongs to the game server hosting them:
//! the connected player list, inventories, the scoreboard, per-player dynamic
//! properties and tags, chat, the action bar and sound playback. This module
//! describes that surface as the [`Host`] trait so the rules in [`crate::rules`]
//! never depend on a concrete server.
//!
//! All calls are synchronous and complete within the invoking tick. The rules
//! take a fresh [`PlayerSnapshot`] list at the start of every poll and never
//! hold host references across ticks.
//!
//! [`sim::SimulatedWorld`] is the in-process implementation used by the CLI
//! replay command and by the test-suite.

pub mod sim;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Stable identity of a player as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// World position of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Location {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance between two positions.
    pub fn distance(&self, other: &Location) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// A single occupied inventory slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    /// Namespaced type identifier, e.g. `minecraft:bone`.
    pub type_id: String,
    /// Custom display name set with an anvil or name tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_name: Option<String>,
    #[serde(default = "default_amount")]
    pub amount: u8,
}

fn default_amount() -> u8 {
    1
}

impl ItemStack {
    pub fn new(type_id: &str) -> Self {
        Self {
            type_id: type_id.to_string(),
            custom_name: None,
            amount: 1,
        }
    }

    pub fn named(type_id: &str, custom_name: &str) -> Self {
        Self {
            custom_name: Some(custom_name.to_string()),
            ..Self::new(type_id)
        }
    }
}

/// Standard player container size: 9 hotbar slots followed by 27 main slots.
pub const PLAYER_INVENTORY_SIZE: usize = 36;

/// Fixed-size container of item-or-empty slots.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Inventory {
    slots: Vec<Option<ItemStack>>,
}

impl Inventory {
    pub fn with_size(size: usize) -> Self {
        Self {
            slots: vec![None; size],
        }
    }

    /// Empty standard player inventory.
    pub fn player() -> Self {
        Self::with_size(PLAYER_INVENTORY_SIZE)
    }

    pub fn size(&self) -> usize {
        self.slots.len()
    }

    /// Item in `slot`; `None` for an empty or out-of-range slot.
    pub fn get(&self, slot: usize) -> Option<&ItemStack> {
        self.slots.get(slot).and_then(|s| s.as_ref())
    }

    /// Place an item into `slot`, returning the previous occupant.
    /// Out-of-range slots are ignored.
    pub fn set(&mut self, slot: usize, item: Option<ItemStack>) -> Option<ItemStack> {
        match self.slots.get_mut(slot) {
            Some(entry) => std::mem::replace(entry, item),
            None => None,
        }
    }

    /// Occupied slots in index order.
    pub fn items(&self) -> impl Iterator<Item = &ItemStack> {
        self.slots.iter().flatten()
    }

    pub fn contains_type(&self, type_id: &str) -> bool {
        self.items().any(|item| item.type_id == type_id)
    }
}

/// Transient view of one connected player, taken at the start of a poll.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub name: String,
    pub location: Location,
    /// Currently selected hotbar slot, when the host reports one.
    pub selected_slot: Option<usize>,
    /// `None` when the entity has no inventory capability.
    pub inventory: Option<Inventory>,
}

impl PlayerSnapshot {
    /// Item held in the selected hotbar slot.
    pub fn held_item(&self) -> Option<&ItemStack> {
        let slot = self.selected_slot?;
        self.inventory.as_ref()?.get(slot)
    }
}

/// Value stored in a host dynamic property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl PropertyValue {
    /// Truthiness as the host scripting layer evaluates it.
    pub fn is_truthy(&self) -> bool {
        match self {
            PropertyValue::Bool(b) => *b,
            PropertyValue::Int(n) => *n != 0,
            PropertyValue::Text(s) => !s.is_empty(),
        }
    }
}

/// Named sound with playback parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundCue {
    pub name: String,
    pub volume: f32,
    pub pitch: f32,
}

/// Failures reported by host calls.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("scoreboard objective not found: {0}")]
    UnknownObjective(String),

    /// Reading a score for a participant that has never been set.
    #[error("no score for {player} in objective {objective}")]
    NoScore { objective: String, player: PlayerId },

    #[error("player not connected: {0}")]
    UnknownPlayer(PlayerId),

    #[error("host storage error: {0}")]
    Storage(String),
}

/// Synchronous game-server surface consumed by the rules.
pub trait Host {
    /// Connected players in host-defined order. The order may change between calls.
    fn players(&self) -> Vec<PlayerSnapshot>;

    fn has_objective(&self, objective: &str) -> bool;

    fn add_objective(&mut self, objective: &str, display_name: &str) -> Result<(), HostError>;

    /// Current score; [`HostError::NoScore`] when the participant has never been scored.
    fn score(&self, objective: &str, player: &PlayerId) -> Result<i64, HostError>;

    fn set_score(&mut self, objective: &str, player: &PlayerId, value: i64)
        -> Result<(), HostError>;

    /// Add `delta` to the score (an unset score counts as zero) and return the new value.
    fn add_score(&mut self, objective: &str, player: &PlayerId, delta: i64)
        -> Result<i64, HostError>;

    fn dynamic_property(
        &self,
        player: &PlayerId,
        key: &str,
    ) -> Result<Option<PropertyValue>, HostError>;

    fn set_dynamic_property(
        &mut self,
        player: &PlayerId,
        key: &str,
        value: PropertyValue,
    ) -> Result<(), HostError>;

    fn has_tag(&self, player: &PlayerId, tag: &str) -> Result<bool, HostError>;

    fn add_tag(&mut self, player: &PlayerId, tag: &str) -> Result<(), HostError>;

    fn send_message(&mut self, player: &PlayerId, text: &str);

    fn broadcast(&mut self, text: &str);

    /// Overwrite the transient action bar overlay of one player.
    fn set_action_bar(&mut self, player: &PlayerId, text: &str);

    fn play_sound(&mut self, player: &PlayerId, cue: &SoundCue, at: Location);
}
