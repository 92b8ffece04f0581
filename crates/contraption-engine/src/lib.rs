//! Contraption Engine -- the background tick worker.
//!
//! Drives periodic re-evaluation (growth/decay and passive conversion) of
//! every live contraption, concurrently with the host's event path. The
//! worker snapshots the registry's live instances each sweep and takes only
//! per-instance locks; a racing destroy either lands before the snapshot
//! (the instance is absent) or the in-flight application completes and the
//! instance is skipped from then on.

pub mod scheduler;

pub use scheduler::{SchedulerConfig, TickScheduler};
