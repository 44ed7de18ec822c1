//! Test utilities & fixtures.
//! Builds simulated worlds with the money objective in place and helpers to
//! stock inventories.

use craftledger::config::Config;
use craftledger::host::sim::SimulatedWorld;
use craftledger::host::{Host, ItemStack, PlayerId, PlayerSnapshot};
use craftledger::rules::Ledger;
use craftledger::storage::WorldStore;

/// Fresh world on a throwaway store with the ledger objective created.
#[allow(dead_code)]
pub fn ready_world() -> (SimulatedWorld, Ledger) {
    let config = Config::default();
    let ledger = Ledger::new(&config.ledger);
    let mut world = SimulatedWorld::new(WorldStore::temporary().expect("temporary store"));
    ledger.ensure_objective(&mut world).expect("objective");
    world.drain_outbox();
    (world, ledger)
}

/// Current snapshot of one player.
#[allow(dead_code)]
pub fn snapshot(world: &SimulatedWorld, id: &PlayerId) -> PlayerSnapshot {
    world
        .players()
        .into_iter()
        .find(|p| &p.id == id)
        .expect("player connected")
}

#[allow(dead_code)]
pub fn balance(world: &SimulatedWorld, id: &PlayerId) -> i64 {
    world.score("money", id).unwrap_or(0)
}

/// Fill slots `first..=last` with one item type.
#[allow(dead_code)]
pub fn fill_slots(
    world: &mut SimulatedWorld,
    id: &PlayerId,
    first: usize,
    last: usize,
    type_id: &str,
) {
    for slot in first..=last {
        world.give(id, slot, ItemStack::new(type_id)).expect("give");
    }
}
