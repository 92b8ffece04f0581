//! Contraption Core -- the simulation engine for player-built contraptions.
//!
//! A contraption is a world-placed structure governed by an immutable
//! [`spec::ContraptionSpec`]: it is built by matching required item stacks,
//! runs named production recipes, exchanges discrete item stacks for a
//! bounded continuous resource, and grows or decays that resource over time.
//!
//! # Key Types
//!
//! - [`registry::ContraptionRegistry`] -- spatial index of live instances;
//!   owns creation, lookup, range queries, and destruction.
//! - [`spec::ContraptionSpec`] -- immutable, shared definition of a
//!   contraption type, assembled from validated configuration.
//! - [`contraption::Contraption`] -- a live instance bound to a world
//!   location, holding its resource stores behind a per-instance lock.
//! - [`gadget`] -- the five composable behaviors: match, production,
//!   conversion, grow, and min/max bounds.
//! - [`itemset::ItemSet`] -- matcher/realizer over discrete item stacks.
//! - [`resource::Resource`] -- a named, clamped, continuous quantity.
//! - [`world::World`] -- the seam to the host game world; the engine never
//!   touches world storage directly.
//!
//! # Concurrency
//!
//! The registry is shared between a single-threaded event path and a
//! background tick worker (see the `contraption-engine` crate). The spatial
//! index sits behind its own lock; every instance serializes its resource
//! state behind a per-instance mutex. `destroy` deregisters from the index
//! before any teardown runs, so a racing tick either completes against the
//! still-registered instance or observes it as absent.

pub mod contraption;
#[cfg(feature = "data-loader")]
pub mod data_loader;
pub mod gadget;
pub mod item;
pub mod itemset;
pub mod registry;
pub mod resource;
pub mod spec;
pub mod world;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

/// Simulation time unit. Production durations are measured in ticks.
pub type Ticks = u64;
