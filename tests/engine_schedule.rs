/// Full engine runs: cadences, startup and restart persistence
mod common;

use craftledger::config::Config;
use craftledger::host::sim::SimulatedWorld;
use craftledger::host::{Host, ItemStack, Location, PlayerId};
use craftledger::rules::{Job, RuleEngine, TransferOutcome};
use craftledger::storage::WorldStore;
use tempfile::tempdir;

use common::{balance, fill_slots};

fn world_at(store: WorldStore) -> (SimulatedWorld, PlayerId) {
    let mut world = SimulatedWorld::new(store);
    let id = world.join("steve-1", "Steve", Location::new(0.0, 64.0, 0.0));
    (world, id)
}

#[test]
fn startup_announces_and_creates_objective() {
    let config = Config::default();
    let mut engine = RuleEngine::new(&config);
    let (mut world, _) = world_at(WorldStore::temporary().unwrap());

    let reports = engine.run_ticks(&mut world, 19);
    assert!(reports.is_empty());
    assert!(!world.has_objective("money"));

    engine.tick(&mut world);
    assert!(world.has_objective("money"));
    let broadcasts: Vec<_> = world
        .outbox()
        .iter()
        .filter(|e| matches!(e, craftledger::host::sim::HostEvent::Broadcast { .. }))
        .collect();
    assert_eq!(broadcasts.len(), 2);
}

#[test]
fn monster_hunter_waits_for_its_cadence() {
    let config = Config::default();
    let mut engine = RuleEngine::new(&config);
    let (mut world, id) = world_at(WorldStore::temporary().unwrap());
    world.give(&id, 0, ItemStack::new("minecraft:string")).unwrap();

    let reports = engine.run_ticks(&mut world, 79);
    assert!(reports.iter().all(|r| r.achievements.is_empty()));
    // first-of-type reward fired at ticks 20, 40, 60 but only once
    assert_eq!(balance(&world, &id), 25);

    let report = engine.tick(&mut world);
    assert_eq!(report.tick, 80);
    assert!(report.jobs.contains(&Job::Achievement(0)));
    assert_eq!(
        report.achievements,
        vec![("achievement_monster_hunter".to_string(), id.clone())]
    );
    assert_eq!(balance(&world, &id), 325);

    let later = engine.run_ticks(&mut world, 400);
    assert!(later
        .iter()
        .all(|r| r.achievements.iter().all(|(a, _)| a != "achievement_monster_hunter")));
}

#[test]
fn transfer_runs_every_second() {
    let config = Config::default();
    let mut engine = RuleEngine::new(&config);
    let (mut world, giver) = world_at(WorldStore::temporary().unwrap());
    let receiver = world.join("alex-2", "Alex", Location::new(1.0, 64.0, 0.0));
    world
        .give(&giver, 0, ItemStack::named("minecraft:stick", "send10G"))
        .unwrap();

    // Objective exists from tick 20; seed the giver afterwards
    engine.run_ticks(&mut world, 20);
    world.set_score("money", &giver, 100).unwrap();
    world.set_score("money", &receiver, 0).unwrap();

    let reports = engine.run_ticks(&mut world, 40);
    let completed: usize = reports
        .iter()
        .map(|r| {
            r.transfers
                .iter()
                .filter(|t| matches!(t, TransferOutcome::Completed { .. }))
                .count()
        })
        .sum();
    assert_eq!(completed, 2);
    // The stick's first-of-type reward at tick 20 was overwritten by the seeding
    assert_eq!(balance(&world, &giver), 80);
    assert_eq!(balance(&world, &receiver), 20);
}

#[test]
fn restart_keeps_flags_but_forgets_discoveries() {
    let dir = tempdir().unwrap();
    let config = Config::default();
    let id;
    {
        let store = WorldStore::open(dir.path()).unwrap();
        let (mut world, pid) = world_at(store);
        id = pid;
        fill_slots(&mut world, &id, 9, 35, "minecraft:cobblestone");
        let mut engine = RuleEngine::new(&config);
        engine.run_ticks(&mut world, 100);
        // one new type (+25) and the stone achievement (+300)
        assert_eq!(balance(&world, &id), 325);
    }

    let store = WorldStore::open(dir.path()).unwrap();
    let (mut world, _) = world_at(store);
    fill_slots(&mut world, &id, 9, 35, "minecraft:cobblestone");
    let mut engine = RuleEngine::new(&config);
    let reports = engine.run_ticks(&mut world, 100);

    assert!(reports.iter().all(|r| r.achievements.is_empty()));
    // the in-memory discovery registry starts empty again
    assert_eq!(balance(&world, &id), 350);
}

#[test]
fn shuffled_enumeration_keeps_rewards_idempotent() {
    let config = Config::default();
    let mut engine = RuleEngine::new(&config);
    let mut world = SimulatedWorld::new(WorldStore::temporary().unwrap());
    world.set_shuffle_players(true);
    let ids: Vec<PlayerId> = (0..5)
        .map(|n| {
            let location = Location::new(n as f64 * 10.0, 64.0, 0.0);
            world.join(&format!("p{n}"), &format!("Player{n}"), location)
        })
        .collect();
    for id in &ids {
        world.give(id, 0, ItemStack::new("minecraft:bone")).unwrap();
        world.give(id, 1, ItemStack::new("minecraft:dirt")).unwrap();
    }

    engine.run_ticks(&mut world, 200);

    for id in &ids {
        assert_eq!(balance(&world, id), 2 * 25 + 300);
    }
}

#[test]
fn late_startup_does_not_forfeit_achievements() {
    let mut config = Config::default();
    config.schedule.startup_delay_ticks = 100;
    config.validate().unwrap();
    let mut engine = RuleEngine::new(&config);
    let (mut world, id) = world_at(WorldStore::temporary().unwrap());
    world.give(&id, 0, ItemStack::new("minecraft:bone")).unwrap();

    // Monster Hunter first polls at tick 80, before the objective exists
    let early = engine.run_ticks(&mut world, 99);
    assert!(early.iter().all(|r| r.achievements.is_empty()));
    assert!(!world.has_objective("money"));

    let reports = engine.run_ticks(&mut world, 301);
    let unlocked: Vec<u64> = reports
        .iter()
        .filter(|r| r.achievements.iter().any(|(a, _)| a == "achievement_monster_hunter"))
        .map(|r| r.tick)
        .collect();
    assert_eq!(unlocked, vec![160]);
    assert_eq!(
        world.dynamic_property(&id, "achievement_monster_hunter").unwrap(),
        Some(craftledger::host::PropertyValue::Bool(true))
    );
    // first-of-type bone (+25) and Monster Hunter (+300)
    assert_eq!(balance(&world, &id), 325);
    assert!(world
        .messages_for(&id)
        .contains(&"§6[Achievement Unlocked] §fMonster Hunter"));
}
