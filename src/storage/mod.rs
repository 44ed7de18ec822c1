//! Persisted world state.
//!
//! The host keeps scoreboard scores, dynamic properties and tags across
//! sessions; [`WorldStore`] is the sled-backed implementation of that state
//! used by [`crate::host::sim::SimulatedWorld`].

mod world;

pub use world::WorldStore;
