//! One-time inventory achievements
//!
//! Every achievement is an [`AchievementRule`]: a [`Requirement`] evaluated
//! against a player's inventory, a flag key, a reward and a polling interval.
//! [`evaluate_rule`] drives all of them the same way: skip flagged players,
//! check the requirement, then pay, set the persisted flag and notify.
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::host::{Host, Inventory, PlayerId, PlayerSnapshot, PropertyValue};
use crate::metrics;
use crate::rules::errors::RulesError;
use crate::rules::ledger::Ledger;

/// Item drops that prove a monster was defeated.
pub const MONSTER_DROPS: [&str; 10] = [
    "minecraft:rotten_flesh",
    "minecraft:bone",
    "minecraft:arrow",
    "minecraft:gunpowder",
    "minecraft:string",
    "minecraft:spider_eye",
    "minecraft:phantom_membrane",
    "minecraft:totem_of_undying",
    "minecraft:prismarine_shard",
    "minecraft:prismarine_crystals",
];

/// First and last slot of the main inventory (the hotbar is 0..=8).
pub const MAIN_INVENTORY_FIRST_SLOT: usize = 9;
pub const MAIN_INVENTORY_LAST_SLOT: usize = 35;

/// Completion predicate over one inventory snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Requirement {
    /// At least one listed type is present.
    AnyOf { items: Vec<String> },
    /// Every listed type is present at the same time.
    AllOf { items: Vec<String> },
    /// Every slot in `first..=last` is occupied by an allowed type.
    SlotRange {
        first: usize,
        last: usize,
        allowed: Vec<String>,
    },
}

impl Requirement {
    pub fn is_met(&self, inventory: &Inventory) -> bool {
        match self {
            Requirement::AnyOf { items } => inventory
                .items()
                .any(|stack| items.iter().any(|id| *id == stack.type_id)),
            Requirement::AllOf { items } => {
                items.iter().all(|id| inventory.contains_type(id))
            }
            Requirement::SlotRange {
                first,
                last,
                allowed,
            } => (*first..=*last).all(|slot| match inventory.get(slot) {
                Some(stack) => allowed.iter().any(|id| *id == stack.type_id),
                None => false,
            }),
        }
    }

    /// Reject requirements that can never (or trivially) be satisfied.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Requirement::AnyOf { items } | Requirement::AllOf { items } if items.is_empty() => {
                Err("item list must not be empty".to_string())
            }
            Requirement::SlotRange { first, last, .. } if first > last => {
                Err(format!("slot range {}..={} is empty", first, last))
            }
            Requirement::SlotRange { allowed, .. } if allowed.is_empty() => {
                Err("allowed list must not be empty".to_string())
            }
            _ => Ok(()),
        }
    }
}

/// A one-time reward gated by a persisted per-player flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementRule {
    /// Dynamic property key that marks completion.
    pub id: String,
    pub title: String,
    /// Formatting code for the title line.
    #[serde(default = "default_color")]
    pub color: String,
    pub reward: i64,
    pub interval_ticks: u64,
    pub requirement: Requirement,
}

fn default_color() -> String {
    "§6".to_string()
}

/// What happened when one rule was checked for one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOutcome {
    AlreadyComplete,
    NoInventory,
    NotMet,
    Unlocked,
}

fn items(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

/// The built-in achievements.
pub fn default_catalogue() -> Vec<AchievementRule> {
    vec![
        AchievementRule {
            id: "achievement_monster_hunter".to_string(),
            title: "Monster Hunter".to_string(),
            color: "§6".to_string(),
            reward: 300,
            interval_ticks: 80,
            requirement: Requirement::AnyOf {
                items: items(&MONSTER_DROPS),
            },
        },
        AchievementRule {
            id: "achievement_real_monster_hunter".to_string(),
            title: "Real Monster Hunter".to_string(),
            color: "§d".to_string(),
            reward: 500,
            interval_ticks: 100,
            requirement: Requirement::AllOf {
                items: items(&MONSTER_DROPS),
            },
        },
        AchievementRule {
            id: "achievement_stone_inventory".to_string(),
            title: "Stone Inventory".to_string(),
            color: "§6".to_string(),
            reward: 300,
            interval_ticks: 100,
            requirement: Requirement::SlotRange {
                first: MAIN_INVENTORY_FIRST_SLOT,
                last: MAIN_INVENTORY_LAST_SLOT,
                allowed: items(&["minecraft:cobblestone", "minecraft:cobbled_deepslate"]),
            },
        },
        AchievementRule {
            id: "achievement_ancient_stone_inventory".to_string(),
            title: "Ancient Stone Inventory".to_string(),
            color: "§d".to_string(),
            reward: 500,
            interval_ticks: 100,
            requirement: Requirement::SlotRange {
                first: MAIN_INVENTORY_FIRST_SLOT,
                last: MAIN_INVENTORY_LAST_SLOT,
                allowed: items(&["minecraft:cobbled_deepslate"]),
            },
        },
    ]
}

/// Whether a player already holds the completion flag of `rule`.
pub fn is_complete(
    host: &dyn Host,
    player: &PlayerId,
    rule: &AchievementRule,
) -> Result<bool, RulesError> {
    Ok(host
        .dynamic_property(player, &rule.id)?
        .is_some_and(|value| value.is_truthy()))
}

/// Check one rule for one player and unlock it when the requirement holds.
pub fn evaluate_player(
    host: &mut dyn Host,
    ledger: &Ledger,
    rule: &AchievementRule,
    player: &PlayerSnapshot,
) -> Result<RuleOutcome, RulesError> {
    if is_complete(host, &player.id, rule)? {
        return Ok(RuleOutcome::AlreadyComplete);
    }
    let Some(inventory) = player.inventory.as_ref() else {
        return Ok(RuleOutcome::NoInventory);
    };
    if !rule.requirement.is_met(inventory) {
        return Ok(RuleOutcome::NotMet);
    }

    // Pay first so a failed credit leaves the rule open for the next poll.
    ledger.add(host, player, rule.reward)?;
    if let Err(e) = host.set_dynamic_property(&player.id, &rule.id, PropertyValue::Bool(true)) {
        if let Err(revert) = host.add_score(ledger.objective(), &player.id, -rule.reward) {
            warn!("Could not revert reward to {}: {}", player.name, revert);
        }
        return Err(e.into());
    }
    host.send_message(
        &player.id,
        &format!("{}[Achievement Unlocked] §f{}", rule.color, rule.title),
    );
    host.send_message(
        &player.id,
        &format!("§aReward: +{}", ledger.format_amount(rule.reward)),
    );
    metrics::record_achievement(&rule.id);
    info!("{} unlocked '{}'", player.name, rule.title);
    Ok(RuleOutcome::Unlocked)
}

/// Run one rule over every connected player. Returns the players who unlocked it.
pub fn evaluate_rule(
    host: &mut dyn Host,
    ledger: &Ledger,
    rule: &AchievementRule,
) -> Vec<PlayerId> {
    let mut unlocked = Vec::new();
    for player in host.players() {
        match evaluate_player(host, ledger, rule, &player) {
            Ok(RuleOutcome::Unlocked) => unlocked.push(player.id.clone()),
            Ok(_) => {}
            Err(e) => warn!("Achievement {} for {} skipped: {}", rule.id, player.name, e),
        }
    }
    unlocked
}
