/// One-time inventory achievements and their persisted flags
mod common;

use craftledger::config::Config;
use craftledger::host::sim::SimulatedWorld;
use craftledger::host::{Host, ItemStack, Location, PlayerId, PropertyValue};
use craftledger::rules::{
    default_catalogue, evaluate_player, evaluate_rule, is_complete, AchievementRule, Ledger,
    RuleOutcome, MONSTER_DROPS,
};
use craftledger::storage::WorldStore;

use common::{balance, fill_slots, ready_world, snapshot};

fn rule(id: &str) -> AchievementRule {
    default_catalogue()
        .into_iter()
        .find(|r| r.id == id)
        .expect("catalogue entry")
}

fn outcome(
    world: &mut SimulatedWorld,
    ledger: &Ledger,
    rule: &AchievementRule,
    id: &PlayerId,
) -> RuleOutcome {
    let snap = snapshot(world, id);
    evaluate_player(world, ledger, rule, &snap).unwrap()
}

#[test]
fn monster_hunter_needs_any_single_drop() {
    let (mut world, ledger) = ready_world();
    let hunter = rule("achievement_monster_hunter");
    let id = world.join("p1", "Alex", Location::default());

    assert_eq!(outcome(&mut world, &ledger, &hunter, &id), RuleOutcome::NotMet);

    world.give(&id, 30, ItemStack::new("minecraft:gunpowder")).unwrap();
    assert_eq!(outcome(&mut world, &ledger, &hunter, &id), RuleOutcome::Unlocked);
    assert_eq!(balance(&world, &id), 300);
    assert_eq!(
        world.messages_for(&id),
        vec!["§6[Achievement Unlocked] §fMonster Hunter", "§aReward: +300G"]
    );

    assert_eq!(outcome(&mut world, &ledger, &hunter, &id), RuleOutcome::AlreadyComplete);
    assert_eq!(balance(&world, &id), 300);
}

#[test]
fn monster_hunter_flag_is_persisted() {
    let (mut world, ledger) = ready_world();
    let hunter = rule("achievement_monster_hunter");
    let id = world.join("p1", "Alex", Location::default());
    world.give(&id, 0, ItemStack::new("minecraft:bone")).unwrap();
    evaluate_rule(&mut world, &ledger, &hunter);

    assert_eq!(
        world.dynamic_property(&id, "achievement_monster_hunter").unwrap(),
        Some(PropertyValue::Bool(true))
    );
    assert!(is_complete(&world, &id, &hunter).unwrap());
}

#[test]
fn real_monster_hunter_requires_all_drops_at_once() {
    let (mut world, ledger) = ready_world();
    let real = rule("achievement_real_monster_hunter");
    let id = world.join("p1", "Alex", Location::default());

    for (slot, drop) in MONSTER_DROPS.iter().enumerate().take(9) {
        world.give(&id, slot, ItemStack::new(drop)).unwrap();
    }
    for _ in 0..3 {
        assert!(evaluate_rule(&mut world, &ledger, &real).is_empty());
    }

    // Holding the tenth after dropping another is still only nine at once
    world.clear_slot(&id, 0).unwrap();
    world.give(&id, 9, ItemStack::new(MONSTER_DROPS[9])).unwrap();
    assert!(evaluate_rule(&mut world, &ledger, &real).is_empty());
    assert_eq!(balance(&world, &id), 0);

    world.give(&id, 0, ItemStack::new(MONSTER_DROPS[0])).unwrap();
    assert_eq!(evaluate_rule(&mut world, &ledger, &real), vec![id.clone()]);
    assert_eq!(balance(&world, &id), 500);

    assert!(evaluate_rule(&mut world, &ledger, &real).is_empty());
    assert_eq!(balance(&world, &id), 500);
}

#[test]
fn stone_inventory_rejects_single_gap() {
    let (mut world, ledger) = ready_world();
    let stone = rule("achievement_stone_inventory");
    let id = world.join("p1", "Alex", Location::default());

    fill_slots(&mut world, &id, 9, 35, "minecraft:cobblestone");
    world.clear_slot(&id, 17).unwrap();
    assert_eq!(outcome(&mut world, &ledger, &stone, &id), RuleOutcome::NotMet);

    world.give(&id, 17, ItemStack::new("minecraft:andesite")).unwrap();
    assert_eq!(outcome(&mut world, &ledger, &stone, &id), RuleOutcome::NotMet);

    world.give(&id, 17, ItemStack::new("minecraft:cobbled_deepslate")).unwrap();
    assert_eq!(outcome(&mut world, &ledger, &stone, &id), RuleOutcome::Unlocked);
    assert_eq!(balance(&world, &id), 300);
}

#[test]
fn ancient_stone_accepts_only_deepslate() {
    let (mut world, ledger) = ready_world();
    let ancient = rule("achievement_ancient_stone_inventory");
    let stone = rule("achievement_stone_inventory");
    let id = world.join("p1", "Alex", Location::default());

    fill_slots(&mut world, &id, 9, 35, "minecraft:cobbled_deepslate");
    world.give(&id, 35, ItemStack::new("minecraft:cobblestone")).unwrap();
    assert_eq!(outcome(&mut world, &ledger, &ancient, &id), RuleOutcome::NotMet);

    world.give(&id, 35, ItemStack::new("minecraft:cobbled_deepslate")).unwrap();
    assert_eq!(outcome(&mut world, &ledger, &ancient, &id), RuleOutcome::Unlocked);
    // A full deepslate inventory also satisfies the plain stone achievement
    assert_eq!(outcome(&mut world, &ledger, &stone, &id), RuleOutcome::Unlocked);
    assert_eq!(balance(&world, &id), 800);
}

#[test]
fn players_without_inventory_are_skipped() {
    let (mut world, ledger) = ready_world();
    let hunter = rule("achievement_monster_hunter");
    let ghost = PlayerId::from("ghost");
    world.join_with(ghost.clone(), "Ghost", Location::default(), None);
    assert_eq!(outcome(&mut world, &ledger, &hunter, &ghost), RuleOutcome::NoInventory);
    assert!(world.outbox().is_empty());
}

#[test]
fn existing_flag_blocks_reward() {
    let (mut world, ledger) = ready_world();
    let hunter = rule("achievement_monster_hunter");
    let id = world.join("p1", "Alex", Location::default());
    world
        .set_dynamic_property(&id, "achievement_monster_hunter", PropertyValue::Int(1))
        .unwrap();
    world.give(&id, 0, ItemStack::new("minecraft:arrow")).unwrap();
    assert_eq!(outcome(&mut world, &ledger, &hunter, &id), RuleOutcome::AlreadyComplete);

    world
        .set_dynamic_property(&id, "achievement_monster_hunter", PropertyValue::Bool(false))
        .unwrap();
    assert_eq!(outcome(&mut world, &ledger, &hunter, &id), RuleOutcome::Unlocked);
}

#[test]
fn failed_payout_leaves_achievement_open() {
    let mut world = SimulatedWorld::new(WorldStore::temporary().unwrap());
    let ledger = Ledger::new(&Config::default().ledger);
    let hunter = rule("achievement_monster_hunter");
    let id = world.join("p1", "Alex", Location::default());
    world.give(&id, 0, ItemStack::new("minecraft:bone")).unwrap();

    // No money objective yet, so the credit cannot land
    let snap = snapshot(&world, &id);
    assert!(evaluate_player(&mut world, &ledger, &hunter, &snap).is_err());
    assert!(!is_complete(&world, &id, &hunter).unwrap());
    assert!(world.messages_for(&id).is_empty());

    ledger.ensure_objective(&mut world).unwrap();
    assert_eq!(outcome(&mut world, &ledger, &hunter, &id), RuleOutcome::Unlocked);
    assert_eq!(balance(&world, &id), 300);
    assert!(is_complete(&world, &id, &hunter).unwrap());
}
