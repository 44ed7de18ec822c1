//! In-process [`Host`] used for offline replays and tests.
//!
//! Live state (who is connected, where they stand, what they carry) lives in
//! memory. Scores, dynamic properties and tags are written through to a
//! [`WorldStore`] so they survive a restart the way the real server keeps
//! them. Every outward side effect is recorded as a [`HostEvent`].

use std::path::Path;

use anyhow::{anyhow, Result};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::{
    Host, HostError, Inventory, ItemStack, Location, PlayerId, PlayerSnapshot, PropertyValue,
    SoundCue, PLAYER_INVENTORY_SIZE,
};
use crate::storage::WorldStore;

/// Side effect emitted through the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HostEvent {
    Message { to: PlayerId, text: String },
    Broadcast { text: String },
    ActionBar { to: PlayerId, text: String },
    Sound { to: PlayerId, name: String, volume: f32, pitch: f32, at: Location },
}

#[derive(Debug, Clone)]
struct SimPlayer {
    id: PlayerId,
    name: String,
    location: Location,
    selected_slot: Option<usize>,
    inventory: Option<Inventory>,
}

/// Simulated server world.
pub struct SimulatedWorld {
    store: WorldStore,
    players: Vec<SimPlayer>,
    outbox: Vec<HostEvent>,
    shuffle_players: bool,
}

impl SimulatedWorld {
    pub fn new(store: WorldStore) -> Self {
        Self {
            store,
            players: Vec::new(),
            outbox: Vec::new(),
            shuffle_players: false,
        }
    }

    /// Build a world from a parsed [`WorldFile`].
    pub fn from_world_file(store: WorldStore, file: WorldFile) -> Result<Self> {
        let mut world = Self::new(store);
        for entry in file.players {
            let id = entry
                .id
                .map(PlayerId::new)
                .unwrap_or_else(|| PlayerId::new(uuid::Uuid::new_v4().to_string()));
            let inventory = if entry.no_inventory {
                None
            } else {
                let size = entry.inventory_size.unwrap_or(PLAYER_INVENTORY_SIZE);
                let mut inv = Inventory::with_size(size);
                for slot in entry.inventory {
                    if slot.slot >= inv.size() {
                        return Err(anyhow!(
                            "player {} has item in slot {} but inventory size is {}",
                            entry.name,
                            slot.slot,
                            inv.size()
                        ));
                    }
                    inv.set(slot.slot, Some(slot.item));
                }
                Some(inv)
            };
            let [x, y, z] = entry.location;
            world.join_with(id, &entry.name, Location::new(x, y, z), inventory);
            if let Some(player) = world.players.last_mut() {
                player.selected_slot = entry.selected_slot;
            }
        }
        Ok(world)
    }

    /// Read and parse a JSON world file from disk.
    pub async fn load_world_file<P: AsRef<Path>>(path: P) -> Result<WorldFile> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read world file {}: {}", path.display(), e))?;
        serde_json::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse world file {}: {}", path.display(), e))
    }

    /// Enumerate players in a fresh random order on every call.
    pub fn set_shuffle_players(&mut self, shuffle: bool) {
        self.shuffle_players = shuffle;
    }

    /// Connect a player with an empty standard inventory.
    pub fn join(&mut self, id: &str, name: &str, location: Location) -> PlayerId {
        let id = PlayerId::from(id);
        self.join_with(id.clone(), name, location, Some(Inventory::player()));
        id
    }

    /// Connect a player with an explicit (possibly absent) inventory.
    pub fn join_with(
        &mut self,
        id: PlayerId,
        name: &str,
        location: Location,
        inventory: Option<Inventory>,
    ) {
        self.players.retain(|p| p.id != id);
        self.players.push(SimPlayer {
            id,
            name: name.to_string(),
            location,
            selected_slot: Some(0),
            inventory,
        });
    }

    pub fn leave(&mut self, id: &PlayerId) {
        self.players.retain(|p| &p.id != id);
    }

    fn player_mut(&mut self, id: &PlayerId) -> Result<&mut SimPlayer, HostError> {
        self.players
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| HostError::UnknownPlayer(id.clone()))
    }

    pub fn teleport(&mut self, id: &PlayerId, location: Location) -> Result<(), HostError> {
        self.player_mut(id)?.location = location;
        Ok(())
    }

    pub fn select_slot(&mut self, id: &PlayerId, slot: Option<usize>) -> Result<(), HostError> {
        self.player_mut(id)?.selected_slot = slot;
        Ok(())
    }

    /// Put an item into a slot of the player's inventory.
    pub fn give(&mut self, id: &PlayerId, slot: usize, item: ItemStack) -> Result<(), HostError> {
        if let Some(inv) = self.player_mut(id)?.inventory.as_mut() {
            inv.set(slot, Some(item));
        }
        Ok(())
    }

    pub fn clear_slot(&mut self, id: &PlayerId, slot: usize) -> Result<(), HostError> {
        if let Some(inv) = self.player_mut(id)?.inventory.as_mut() {
            inv.set(slot, None);
        }
        Ok(())
    }

    pub fn store(&self) -> &WorldStore {
        &self.store
    }

    /// Give the store back, e.g. to reopen the world after a simulated restart.
    pub fn into_store(self) -> WorldStore {
        self.store
    }

    pub fn outbox(&self) -> &[HostEvent] {
        &self.outbox
    }

    pub fn drain_outbox(&mut self) -> Vec<HostEvent> {
        std::mem::take(&mut self.outbox)
    }

    /// Chat lines delivered to one player, oldest first.
    pub fn messages_for(&self, id: &PlayerId) -> Vec<&str> {
        self.outbox
            .iter()
            .filter_map(|event| match event {
                HostEvent::Message { to, text } if to == id => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Most recent action bar text shown to one player.
    pub fn action_bar(&self, id: &PlayerId) -> Option<&str> {
        self.outbox.iter().rev().find_map(|event| match event {
            HostEvent::ActionBar { to, text } if to == id => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn sounds_for(&self, id: &PlayerId) -> usize {
        self.outbox
            .iter()
            .filter(|event| matches!(event, HostEvent::Sound { to, .. } if to == id))
            .count()
    }
}

impl Host for SimulatedWorld {
    fn players(&self) -> Vec<PlayerSnapshot> {
        let mut snapshots: Vec<PlayerSnapshot> = self
            .players
            .iter()
            .map(|p| PlayerSnapshot {
                id: p.id.clone(),
                name: p.name.clone(),
                location: p.location,
                selected_slot: p.selected_slot,
                inventory: p.inventory.clone(),
            })
            .collect();
        if self.shuffle_players {
            snapshots.shuffle(&mut rand::thread_rng());
        }
        snapshots
    }

    fn has_objective(&self, objective: &str) -> bool {
        self.store.has_objective(objective).unwrap_or(false)
    }

    fn add_objective(&mut self, objective: &str, display_name: &str) -> Result<(), HostError> {
        self.store.add_objective(objective, display_name)?;
        Ok(())
    }

    fn score(&self, objective: &str, player: &PlayerId) -> Result<i64, HostError> {
        if !self.store.has_objective(objective)? {
            return Err(HostError::UnknownObjective(objective.to_string()));
        }
        self.store
            .score(objective, player)?
            .ok_or_else(|| HostError::NoScore {
                objective: objective.to_string(),
                player: player.clone(),
            })
    }

    fn set_score(
        &mut self,
        objective: &str,
        player: &PlayerId,
        value: i64,
    ) -> Result<(), HostError> {
        if !self.store.has_objective(objective)? {
            return Err(HostError::UnknownObjective(objective.to_string()));
        }
        self.store.set_score(objective, player, value)?;
        Ok(())
    }

    fn add_score(
        &mut self,
        objective: &str,
        player: &PlayerId,
        delta: i64,
    ) -> Result<i64, HostError> {
        if !self.store.has_objective(objective)? {
            return Err(HostError::UnknownObjective(objective.to_string()));
        }
        Ok(self.store.add_score(objective, player, delta)?)
    }

    fn dynamic_property(
        &self,
        player: &PlayerId,
        key: &str,
    ) -> Result<Option<PropertyValue>, HostError> {
        Ok(self.store.property(player, key)?)
    }

    fn set_dynamic_property(
        &mut self,
        player: &PlayerId,
        key: &str,
        value: PropertyValue,
    ) -> Result<(), HostError> {
        self.store.set_property(player, key, &value)?;
        Ok(())
    }

    fn has_tag(&self, player: &PlayerId, tag: &str) -> Result<bool, HostError> {
        Ok(self.store.has_tag(player, tag)?)
    }

    fn add_tag(&mut self, player: &PlayerId, tag: &str) -> Result<(), HostError> {
        self.store.add_tag(player, tag)?;
        Ok(())
    }

    fn send_message(&mut self, player: &PlayerId, text: &str) {
        self.outbox.push(HostEvent::Message {
            to: player.clone(),
            text: text.to_string(),
        });
    }

    fn broadcast(&mut self, text: &str) {
        self.outbox.push(HostEvent::Broadcast {
            text: text.to_string(),
        });
    }

    fn set_action_bar(&mut self, player: &PlayerId, text: &str) {
        self.outbox.push(HostEvent::ActionBar {
            to: player.clone(),
            text: text.to_string(),
        });
    }

    fn play_sound(&mut self, player: &PlayerId, cue: &SoundCue, at: Location) {
        self.outbox.push(HostEvent::Sound {
            to: player.clone(),
            name: cue.name.clone(),
            volume: cue.volume,
            pitch: cue.pitch,
            at,
        });
    }
}

/// JSON snapshot of a world used by `craftledger simulate`.
///
/// ```json
/// { "players": [
///   { "name": "Steve", "location": [0, 64, 0], "selected_slot": 0,
///     "inventory": [
///       { "slot": 0, "item": { "type_id": "minecraft:stick", "custom_name": "send30G" } }
///     ] }
/// ] }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldFile {
    #[serde(default)]
    pub players: Vec<PlayerSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSpec {
    /// Stable id; a random uuid is assigned when omitted.
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub location: [f64; 3],
    #[serde(default)]
    pub selected_slot: Option<usize>,
    #[serde(default)]
    pub inventory_size: Option<usize>,
    /// Model an entity without inventory capability.
    #[serde(default)]
    pub no_inventory: bool,
    #[serde(default)]
    pub inventory: Vec<SlotSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotSpec {
    pub slot: usize,
    pub item: ItemStack,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> SimulatedWorld {
        SimulatedWorld::new(WorldStore::temporary().unwrap())
    }

    #[test]
    fn score_on_unknown_objective_is_an_error() {
        let mut w = world();
        let id = w.join("p1", "Alex", Location::default());
        assert!(matches!(
            w.score("money", &id),
            Err(HostError::UnknownObjective(_))
        ));
        w.add_objective("money", "Money").unwrap();
        assert!(matches!(w.score("money", &id), Err(HostError::NoScore { .. })));
        w.set_score("money", &id, 7).unwrap();
        assert_eq!(w.score("money", &id).unwrap(), 7);
    }

    #[test]
    fn world_file_assigns_missing_ids() {
        let json = r#"{ "players": [
            { "name": "Steve", "location": [1, 64, 1], "selected_slot": 0,
              "inventory": [
                { "slot": 0, "item": { "type_id": "minecraft:stick", "custom_name": "send30G" } }
              ] },
            { "id": "fixed", "name": "Alex", "no_inventory": true }
        ] }"#;
        let file: WorldFile = serde_json::from_str(json).unwrap();
        let w = SimulatedWorld::from_world_file(WorldStore::temporary().unwrap(), file).unwrap();
        let players = w.players();
        assert_eq!(players.len(), 2);
        assert!(!players[0].id.as_str().is_empty());
        assert_eq!(
            players[0].held_item().and_then(|i| i.custom_name.as_deref()),
            Some("send30G")
        );
        assert_eq!(players[1].id.as_str(), "fixed");
        assert!(players[1].inventory.is_none());
    }

    #[test]
    fn world_file_rejects_out_of_range_slot() {
        let json = r#"{ "players": [
            { "name": "Steve", "inventory_size": 4,
              "inventory": [ { "slot": 9, "item": { "type_id": "minecraft:dirt" } } ] }
        ] }"#;
        let file: WorldFile = serde_json::from_str(json).unwrap();
        assert!(SimulatedWorld::from_world_file(WorldStore::temporary().unwrap(), file).is_err());
    }
}
