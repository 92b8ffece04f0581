//! The tick worker racing the host event path on real threads.

use contraption_core::registry::ContraptionRegistry;
use contraption_core::spec::REPAIR_RESOURCE;
use contraption_core::test_utils::{Fixture, TestWorld, factory_spec, passive_conversion_spec, pos};
use contraption_core::world::GridPos;
use contraption_engine::{SchedulerConfig, TickScheduler};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn churn_registry(fx: &Fixture, sites: &[GridPos]) -> Arc<ContraptionRegistry> {
    let mut world = TestWorld::new();
    for &site in sites {
        world.set_block(site, fx.chest);
        // Enough material for many rebuild cycles at 10 per build.
        world.place_inventory(site, fx.chest_inventory(&[(fx.mat_a, 1500)]));
    }
    let mut registry = ContraptionRegistry::new(Arc::new(world), Arc::clone(&fx.catalog));
    registry.register_spec(factory_spec(fx)).unwrap();
    registry.register_spec(passive_conversion_spec(fx)).unwrap();
    Arc::new(registry)
}

#[test]
fn create_destroy_churn_under_ticking() {
    let fx = Fixture::new();
    let churn_site = pos(0, 64, 0);
    let steady_site = pos(3, 64, 3);
    let registry = churn_registry(&fx, &[churn_site, steady_site]);

    registry.create(steady_site).unwrap();
    let scheduler = TickScheduler::start(
        Arc::clone(&registry),
        SchedulerConfig {
            period: Duration::from_millis(1),
        },
    );

    for _ in 0..50 {
        let instance = registry.create(churn_site).unwrap();
        // Let a few sweeps land on it.
        std::thread::sleep(Duration::from_millis(2));
        assert!(registry.destroy(churn_site));
        assert!(registry.get(churn_site).is_none());

        // A retired instance keeps a valid, in-bounds resource map.
        let value = instance.resource(REPAIR_RESOURCE).unwrap();
        assert!((0.0..=100.0).contains(&value), "out of bounds: {value}");
    }

    let sweeps = scheduler.shutdown();
    assert!(sweeps >= 1);

    // The survivor was never touched by the churn.
    let steady = registry.get(steady_site).unwrap();
    assert!((0.0..=100.0).contains(&steady.resource(REPAIR_RESOURCE).unwrap()));
}

#[test]
fn resources_stay_in_bounds_under_sampling() {
    let fx = Fixture::new();
    let sites: Vec<GridPos> = (0..4).map(|i| pos(i * 2, 64, 0)).collect();
    let registry = churn_registry(&fx, &sites);
    for &site in &sites {
        registry.create(site).unwrap();
    }

    let scheduler = TickScheduler::start(
        Arc::clone(&registry),
        SchedulerConfig {
            period: Duration::from_millis(1),
        },
    );

    let deadline = Instant::now() + Duration::from_millis(100);
    while Instant::now() < deadline {
        for instance in registry.live() {
            let value = instance.resource(REPAIR_RESOURCE).unwrap();
            assert!(
                (0.0..=100.0).contains(&value),
                "out of bounds at {:?}: {value}",
                instance.location()
            );
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    scheduler.shutdown();
    assert_eq!(registry.len(), sites.len());
}

#[test]
fn repair_races_decay_without_corruption() {
    let fx = Fixture::new();
    let site = pos(0, 64, 0);
    let mut world = TestWorld::new();
    world.set_block(site, fx.chest);
    world.place_inventory(site, fx.chest_inventory(&[(fx.mat_a, 10), (fx.mat_b, 500)]));
    let mut registry = ContraptionRegistry::new(Arc::new(world), Arc::clone(&fx.catalog));
    registry.register_spec(factory_spec(&fx)).unwrap();
    let registry = Arc::new(registry);
    let instance = registry.create(site).unwrap();

    let scheduler = TickScheduler::start(
        Arc::clone(&registry),
        SchedulerConfig {
            period: Duration::from_millis(1),
        },
    );

    // Repairs from this thread interleave with decay sweeps; the repair
    // resource must stay clamped throughout.
    for _ in 0..100 {
        instance.repair(5.0, registry.world().as_ref());
        let value = instance.resource(REPAIR_RESOURCE).unwrap();
        assert!((0.0..=100.0).contains(&value), "out of bounds: {value}");
    }
    scheduler.shutdown();
}
