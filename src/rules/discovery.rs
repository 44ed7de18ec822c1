//! First-of-type item rewards and the item-variety milestones built on them.
//!
//! [`ObtainedItems`] remembers, per player, every item type already paid for.
//! It is process memory only: a restart forgets it and the same types pay out
//! again. Milestone completion is recorded with persisted host tags, so those
//! never repeat.

use std::collections::{BTreeSet, HashMap};

use log::{info, warn};

use crate::config::Milestone;
use crate::host::{Host, PlayerId};
use crate::logutil::item_label;
use crate::metrics;
use crate::rules::ledger::Ledger;

/// Item types already rewarded, keyed by player. Only grows.
#[derive(Debug, Default)]
pub struct ObtainedItems {
    by_player: HashMap<PlayerId, BTreeSet<String>>,
}

impl ObtainedItems {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, player: &PlayerId) -> Option<&BTreeSet<String>> {
        self.by_player.get(player)
    }

    /// Distinct types recorded for a player.
    pub fn count(&self, player: &PlayerId) -> usize {
        self.by_player.get(player).map_or(0, BTreeSet::len)
    }

    pub fn contains(&self, player: &PlayerId, type_id: &str) -> bool {
        self.by_player
            .get(player)
            .is_some_and(|set| set.contains(type_id))
    }

    /// Record a type; returns true if it was new for this player.
    pub fn record(&mut self, player: &PlayerId, type_id: &str) -> bool {
        self.by_player
            .entry(player.clone())
            .or_default()
            .insert(type_id.to_string())
    }

    /// Number of players observed so far.
    pub fn players(&self) -> usize {
        self.by_player.len()
    }

    fn ensure_player(&mut self, player: &PlayerId) {
        self.by_player.entry(player.clone()).or_default();
    }
}

/// Tag marking a reached milestone.
pub fn milestone_tag(count: usize) -> String {
    format!("achievement_items_{}", count)
}

/// Pay `reward` for every item type a player holds for the first time.
/// Returns each newly rewarded `(player, type_id)` pair.
pub fn reward_new_items(
    host: &mut dyn Host,
    ledger: &Ledger,
    obtained: &mut ObtainedItems,
    reward: i64,
) -> Vec<(PlayerId, String)> {
    let mut granted = Vec::new();

    for player in host.players() {
        let Some(inventory) = player.inventory.as_ref() else {
            continue;
        };
        obtained.ensure_player(&player.id);

        for item in inventory.items() {
            if obtained.contains(&player.id, &item.type_id) {
                continue;
            }
            if let Err(e) = ledger.add(host, &player, reward) {
                warn!("First-item reward for {} failed: {}", player.name, e);
                continue;
            }
            host.send_message(
                &player.id,
                &format!(
                    "§a[New] §f{} obtained for the first time! (+{})",
                    item_label(&item.type_id),
                    ledger.format_amount(reward)
                ),
            );
            obtained.record(&player.id, &item.type_id);
            metrics::inc_first_item_rewards();
            granted.push((player.id.clone(), item.type_id.clone()));
        }
    }

    granted
}

/// Grant every milestone a player's variety count has reached but not yet been
/// tagged for. Several milestones can be granted in one poll.
/// Returns each newly granted `(player, milestone count)`.
pub fn check_milestones(
    host: &mut dyn Host,
    ledger: &Ledger,
    obtained: &ObtainedItems,
    milestones: &[Milestone],
) -> Vec<(PlayerId, usize)> {
    let mut granted = Vec::new();

    for player in host.players() {
        let count = obtained.count(&player.id);
        if count == 0 {
            continue;
        }

        for milestone in milestones.iter().filter(|m| count >= m.count) {
            let tag = milestone_tag(milestone.count);
            match host.has_tag(&player.id, &tag) {
                Ok(true) => continue,
                Ok(false) => {}
                Err(e) => {
                    warn!("Tag lookup {} for {} failed: {}", tag, player.name, e);
                    continue;
                }
            }
            if let Err(e) = ledger.add(host, &player, milestone.reward) {
                warn!("Milestone reward for {} failed: {}", player.name, e);
                continue;
            }
            if let Err(e) = host.add_tag(&player.id, &tag) {
                warn!("Could not tag {} with {}: {}", player.name, tag, e);
                if let Err(revert) =
                    host.add_score(ledger.objective(), &player.id, -milestone.reward)
                {
                    warn!("Could not revert milestone reward to {}: {}", player.name, revert);
                }
                continue;
            }
            host.send_message(
                &player.id,
                &format!(
                    "§b[Achievement] §f{} item types collected! (+{})",
                    milestone.count,
                    ledger.format_amount(milestone.reward)
                ),
            );
            metrics::record_achievement(&tag);
            info!("{} reached item milestone {}", player.name, milestone.count);
            granted.push((player.id.clone(), milestone.count));
        }
    }

    granted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_reports_novelty() {
        let mut obtained = ObtainedItems::new();
        let p = PlayerId::from("p1");
        assert!(obtained.record(&p, "minecraft:dirt"));
        assert!(!obtained.record(&p, "minecraft:dirt"));
        assert!(obtained.record(&p, "minecraft:stone"));
        assert_eq!(obtained.count(&p), 2);
        assert_eq!(obtained.count(&PlayerId::from("p2")), 0);
    }

    #[test]
    fn milestone_tags_are_stable() {
        assert_eq!(milestone_tag(50), "achievement_items_50");
    }
}
