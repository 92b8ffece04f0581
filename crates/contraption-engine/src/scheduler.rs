//! The periodic tick worker.
//!
//! The worker thread owns its loop exclusively; the handle talks to it only
//! through a shutdown channel. The first sweep runs immediately on start --
//! growth begins the moment a contraption is armed, not one period later.

use contraption_core::registry::ContraptionRegistry;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};
use log::{debug, warn};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Scheduler tuning.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Time between sweep starts. A sweep that overruns the period is
    /// followed immediately by the next one.
    pub period: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(1),
        }
    }
}

/// Handle to the background tick worker. Dropping the handle shuts the
/// worker down and joins it.
pub struct TickScheduler {
    shutdown_tx: Sender<()>,
    handle: Option<JoinHandle<u64>>,
}

impl TickScheduler {
    /// Spawn the worker. The first sweep runs before the first wait.
    pub fn start(registry: Arc<ContraptionRegistry>, config: SchedulerConfig) -> Self {
        let (shutdown_tx, shutdown_rx) = bounded::<()>(1);
        let period = config.period;
        let handle = std::thread::spawn(move || run_loop(registry, period, shutdown_rx));
        debug!("tick scheduler started (period {period:?})");
        Self {
            shutdown_tx,
            handle: Some(handle),
        }
    }

    /// Stop the worker and wait for it. An in-flight sweep finishes first.
    /// Returns the number of sweeps the worker ran.
    pub fn shutdown(mut self) -> u64 {
        self.stop()
    }

    fn stop(&mut self) -> u64 {
        let _ = self.shutdown_tx.send(());
        match self.handle.take() {
            Some(handle) => match handle.join() {
                Ok(sweeps) => {
                    debug!("tick scheduler stopped after {sweeps} sweeps");
                    sweeps
                }
                Err(_) => {
                    warn!("tick worker panicked");
                    0
                }
            },
            None => 0,
        }
    }
}

impl Drop for TickScheduler {
    fn drop(&mut self) {
        if self.handle.is_some() {
            let _ = self.stop();
        }
    }
}

fn run_loop(registry: Arc<ContraptionRegistry>, period: Duration, shutdown: Receiver<()>) -> u64 {
    let mut sweeps = 0u64;
    loop {
        let started = Instant::now();
        sweeps += 1;

        // Snapshot, then tick each instance under its own lock only.
        for instance in registry.live() {
            instance.tick(registry.world().as_ref(), registry.catalog());
        }

        let elapsed = started.elapsed();
        if elapsed > period {
            debug!("tick sweep overran its period ({elapsed:?} > {period:?})");
        }
        match shutdown.recv_timeout(period.saturating_sub(elapsed)) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }
    }
    sweeps
}

#[cfg(test)]
mod tests {
    use super::*;
    use contraption_core::registry::ContraptionRegistry;
    use contraption_core::spec::REPAIR_RESOURCE;
    use contraption_core::test_utils::{Fixture, factory_spec, passive_conversion_spec, pos};

    fn armed_registry(fx: &Fixture) -> (Arc<ContraptionRegistry>, contraption_core::world::GridPos)
    {
        let location = pos(0, 64, 0);
        let world = Arc::new(fx.world_with_chest(location, &[(fx.mat_a, 10)]));
        let mut registry = ContraptionRegistry::new(world, Arc::clone(&fx.catalog));
        registry.register_spec(factory_spec(fx)).unwrap();
        let registry = Arc::new(registry);
        registry.create(location).unwrap();
        (registry, location)
    }

    #[test]
    fn first_sweep_runs_immediately() {
        let fx = Fixture::new();
        let (registry, location) = armed_registry(&fx);

        // Period far longer than the test: any decay must come from the
        // immediate first sweep.
        let scheduler = TickScheduler::start(
            Arc::clone(&registry),
            SchedulerConfig {
                period: Duration::from_secs(3600),
            },
        );
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let value = registry
                .get(location)
                .unwrap()
                .resource(REPAIR_RESOURCE)
                .unwrap();
            if value <= 99.0 {
                break;
            }
            assert!(Instant::now() < deadline, "first sweep never ran");
            std::thread::sleep(Duration::from_millis(1));
        }
        let sweeps = scheduler.shutdown();
        assert!(sweeps >= 1);
    }

    #[test]
    fn decay_accumulates_across_periods() {
        let fx = Fixture::new();
        let (registry, location) = armed_registry(&fx);

        let scheduler = TickScheduler::start(
            Arc::clone(&registry),
            SchedulerConfig {
                period: Duration::from_millis(2),
            },
        );
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let value = registry
                .get(location)
                .unwrap()
                .resource(REPAIR_RESOURCE)
                .unwrap();
            if value <= 95.0 {
                break;
            }
            assert!(Instant::now() < deadline, "decay never accumulated");
            std::thread::sleep(Duration::from_millis(2));
        }
        scheduler.shutdown();
    }

    #[test]
    fn destroyed_instance_stops_decaying() {
        let fx = Fixture::new();
        let (registry, location) = armed_registry(&fx);
        let instance = registry.get(location).unwrap();

        let scheduler = TickScheduler::start(
            Arc::clone(&registry),
            SchedulerConfig {
                period: Duration::from_millis(1),
            },
        );
        std::thread::sleep(Duration::from_millis(10));
        assert!(registry.destroy(location));

        // Any in-flight sweep may still land; settle, then observe.
        std::thread::sleep(Duration::from_millis(5));
        let settled = instance.resource(REPAIR_RESOURCE).unwrap();
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(instance.resource(REPAIR_RESOURCE).unwrap(), settled);
        scheduler.shutdown();
    }

    #[test]
    fn passive_conversion_drains_resource_into_items() {
        let fx = Fixture::new();
        let location = pos(0, 64, 0);
        let world = Arc::new(fx.world_with_chest(location, &[(fx.mat_a, 1)]));
        let mut registry = ContraptionRegistry::new(world, Arc::clone(&fx.catalog));
        registry.register_spec(passive_conversion_spec(&fx)).unwrap();
        let registry = Arc::new(registry);
        registry.create(location).unwrap();

        let scheduler = TickScheduler::start(
            Arc::clone(&registry),
            SchedulerConfig {
                period: Duration::from_millis(2),
            },
        );
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let produced = {
                let inv = registry.world().lock_inventory(location).unwrap();
                inv.quantity(fx.mat_b, None)
            };
            if produced >= 10 {
                break;
            }
            assert!(Instant::now() < deadline, "passive conversion never ran");
            std::thread::sleep(Duration::from_millis(2));
        }
        scheduler.shutdown();

        // Whatever was drained stayed within bounds.
        let value = registry
            .get(location)
            .unwrap()
            .resource(REPAIR_RESOURCE)
            .unwrap();
        assert!((0.0..=50.0).contains(&value));
    }

    #[test]
    fn shutdown_reports_sweep_count() {
        let fx = Fixture::new();
        let (registry, _) = armed_registry(&fx);
        let scheduler = TickScheduler::start(
            registry,
            SchedulerConfig {
                period: Duration::from_millis(1),
            },
        );
        std::thread::sleep(Duration::from_millis(10));
        assert!(scheduler.shutdown() >= 1);
    }
}
