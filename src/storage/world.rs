use std::path::Path;

use sled::IVec;

use crate::host::{PlayerId, PropertyValue};
use crate::rules::errors::RulesError;

const TREE_OBJECTIVES: &str = "objectives";
const TREE_SCORES: &str = "scores";
const TREE_PROPERTIES: &str = "properties";
const TREE_TAGS: &str = "tags";

/// Sled-backed persistence for everything the host keeps across sessions:
/// scoreboard objectives and scores, per-player dynamic properties and tags.
pub struct WorldStore {
    _db: sled::Db,
    objectives: sled::Tree,
    scores: sled::Tree,
    properties: sled::Tree,
    tags: sled::Tree,
}

impl WorldStore {
    /// Open (or create) the store rooted at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, RulesError> {
        let path_ref = path.as_ref();
        std::fs::create_dir_all(path_ref)?;
        let db = sled::open(path_ref)?;
        Self::from_db(db)
    }

    /// Throwaway store that is deleted when dropped.
    pub fn temporary() -> Result<Self, RulesError> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    fn from_db(db: sled::Db) -> Result<Self, RulesError> {
        let objectives = db.open_tree(TREE_OBJECTIVES)?;
        let scores = db.open_tree(TREE_SCORES)?;
        let properties = db.open_tree(TREE_PROPERTIES)?;
        let tags = db.open_tree(TREE_TAGS)?;
        Ok(Self {
            _db: db,
            objectives,
            scores,
            properties,
            tags,
        })
    }

    // Components are joined with a NUL byte so ids containing ':' stay unambiguous.
    fn compound_key(first: &str, second: &str) -> Vec<u8> {
        let mut key = Vec::with_capacity(first.len() + second.len() + 1);
        key.extend_from_slice(first.as_bytes());
        key.push(0);
        key.extend_from_slice(second.as_bytes());
        key
    }

    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, RulesError> {
        Ok(bincode::serialize(value)?)
    }

    fn deserialize<T: serde::de::DeserializeOwned>(bytes: IVec) -> Result<T, RulesError> {
        Ok(bincode::deserialize::<T>(&bytes)?)
    }

    pub fn has_objective(&self, objective: &str) -> Result<bool, RulesError> {
        Ok(self.objectives.contains_key(objective.as_bytes())?)
    }

    /// Register an objective; returns false when it already existed.
    pub fn add_objective(&self, objective: &str, display_name: &str) -> Result<bool, RulesError> {
        if self.has_objective(objective)? {
            return Ok(false);
        }
        self.objectives
            .insert(objective.as_bytes(), display_name.as_bytes())?;
        self.objectives.flush()?;
        Ok(true)
    }

    /// Display name of a registered objective.
    pub fn objective_display_name(&self, objective: &str) -> Result<Option<String>, RulesError> {
        match self.objectives.get(objective.as_bytes())? {
            Some(bytes) => Ok(Some(std::str::from_utf8(&bytes)?.to_string())),
            None => Ok(None),
        }
    }

    /// Stored score, `None` when the participant was never scored.
    pub fn score(&self, objective: &str, player: &PlayerId) -> Result<Option<i64>, RulesError> {
        let key = Self::compound_key(objective, player.as_str());
        match self.scores.get(key)? {
            Some(bytes) => Ok(Some(Self::deserialize(bytes)?)),
            None => Ok(None),
        }
    }

    pub fn set_score(
        &self,
        objective: &str,
        player: &PlayerId,
        value: i64,
    ) -> Result<(), RulesError> {
        let key = Self::compound_key(objective, player.as_str());
        self.scores.insert(key, Self::serialize(&value)?)?;
        self.scores.flush()?;
        Ok(())
    }

    /// Add `delta` to a score (unset counts as zero) and return the new value.
    pub fn add_score(
        &self,
        objective: &str,
        player: &PlayerId,
        delta: i64,
    ) -> Result<i64, RulesError> {
        let current = self.score(objective, player)?.unwrap_or(0);
        let updated = current.saturating_add(delta);
        self.set_score(objective, player, updated)?;
        Ok(updated)
    }

    pub fn property(
        &self,
        player: &PlayerId,
        key: &str,
    ) -> Result<Option<PropertyValue>, RulesError> {
        let key = Self::compound_key(player.as_str(), key);
        match self.properties.get(key)? {
            Some(bytes) => Ok(Some(Self::deserialize(bytes)?)),
            None => Ok(None),
        }
    }

    pub fn set_property(
        &self,
        player: &PlayerId,
        key: &str,
        value: &PropertyValue,
    ) -> Result<(), RulesError> {
        let key = Self::compound_key(player.as_str(), key);
        self.properties.insert(key, Self::serialize(value)?)?;
        self.properties.flush()?;
        Ok(())
    }

    pub fn has_tag(&self, player: &PlayerId, tag: &str) -> Result<bool, RulesError> {
        Ok(self
            .tags
            .contains_key(Self::compound_key(player.as_str(), tag))?)
    }

    pub fn add_tag(&self, player: &PlayerId, tag: &str) -> Result<(), RulesError> {
        self.tags
            .insert(Self::compound_key(player.as_str(), tag), &[] as &[u8])?;
        self.tags.flush()?;
        Ok(())
    }

    /// All tags held by a player, sorted.
    pub fn tags_for(&self, player: &PlayerId) -> Result<Vec<String>, RulesError> {
        let mut prefix = player.as_str().as_bytes().to_vec();
        prefix.push(0);
        let mut out = Vec::new();
        for entry in self.tags.scan_prefix(&prefix) {
            let (key, _) = entry?;
            let tag = std::str::from_utf8(&key[prefix.len()..])?;
            out.push(tag.to_string());
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn unset_score_reads_as_none() {
        let store = WorldStore::temporary().unwrap();
        let alex = PlayerId::from("alex");
        assert_eq!(store.score("money", &alex).unwrap(), None);
        assert_eq!(store.add_score("money", &alex, -15).unwrap(), -15);
        assert_eq!(store.score("money", &alex).unwrap(), Some(-15));
    }

    #[test]
    fn tags_are_scoped_per_player() {
        let store = WorldStore::temporary().unwrap();
        let a = PlayerId::from("a");
        let ab = PlayerId::from("ab");
        store.add_tag(&a, "achievement_items_50").unwrap();
        store.add_tag(&ab, "vip").unwrap();
        assert_eq!(store.tags_for(&a).unwrap(), vec!["achievement_items_50"]);
        assert!(!store.has_tag(&ab, "achievement_items_50").unwrap());
    }

    #[test]
    fn state_survives_reopen() {
        let dir = tempdir().unwrap();
        let steve = PlayerId::from("steve");
        {
            let store = WorldStore::open(dir.path()).unwrap();
            assert!(store.add_objective("money", "Money").unwrap());
            store.set_score("money", &steve, 120).unwrap();
            store
                .set_property(&steve, "achievement_stone_inventory", &PropertyValue::Bool(true))
                .unwrap();
        }
        let store = WorldStore::open(dir.path()).unwrap();
        assert!(!store.add_objective("money", "Money").unwrap());
        assert_eq!(store.objective_display_name("money").unwrap().as_deref(), Some("Money"));
        assert_eq!(store.score("money", &steve).unwrap(), Some(120));
        assert_eq!(
            store.property(&steve, "achievement_stone_inventory").unwrap(),
            Some(PropertyValue::Bool(true))
        );
    }
}
