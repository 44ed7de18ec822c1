//! # craftledger - Currency and Achievement Rules for Hosted Block-Game Servers
//!
//! craftledger layers a small economy on top of a game server's scripting
//! surface. The server owns all real state (players, inventories, scoreboard,
//! persisted properties and tags); the rules poll it on fixed tick cadences.
//!
//! ## Features
//!
//! - **Ledger**: per-player balance in a scoreboard objective, with a sound cue on every change.
//! - **Balance Overlay**: the current balance on each player's action bar every second.
//! - **Transfers**: hold a stick renamed `send30G` next to another player to pay them.
//! - **Discovery Rewards**: a one-time payout for each item type a player first carries.
//! - **Milestones**: extra payouts at 50, 100, 250, ... distinct item types.
//! - **Achievements**: Monster Hunter, Real Monster Hunter, Stone Inventory and
//!   Ancient Stone Inventory, each paid exactly once per player.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use craftledger::config::Config;
//! use craftledger::host::sim::SimulatedWorld;
//! use craftledger::host::Location;
//! use craftledger::rules::RuleEngine;
//! use craftledger::storage::WorldStore;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     let mut world = SimulatedWorld::new(WorldStore::temporary()?);
//!     world.join("p1", "Steve", Location::new(0.0, 64.0, 0.0));
//!
//!     let mut engine = RuleEngine::new(&config);
//!     for report in engine.run_ticks(&mut world, 200) {
//!         println!("tick {}: {:?}", report.tick, report.jobs);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`host`] - the game-server contract and a simulated implementation
//! - [`rules`] - ledger, transfers, discovery, achievements, scheduler and engine
//! - [`storage`] - sled-backed persistence of scores, properties and tags
//! - [`config`] - TOML configuration and validation
//! - [`metrics`] - process-local counters
//! - [`logutil`] - escaping of player-provided strings

pub mod config;
pub mod host;
pub mod logutil;
pub mod metrics;
pub mod rules;
pub mod storage;
