//! Live contraption instances.

use crate::item::MaterialCatalog;
use crate::itemset::InventoryFull;
use crate::resource::Resource;
use crate::spec::{ContraptionSpec, REPAIR_RESOURCE};
use crate::world::{Effect, GridPos, Response, ResponsePayload, World};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::SystemTime;

/// A live, located instance of a contraption type.
///
/// Resource state sits behind a per-instance mutex: the user-driven event
/// path and the background tick worker serialize on it, never on anything
/// registry-wide. The retire flag transitions exactly once; a tick that
/// observes it under the state lock applies nothing.
#[derive(Debug)]
pub struct Contraption {
    location: GridPos,
    spec: Arc<ContraptionSpec>,
    resources: Mutex<HashMap<String, Resource>>,
    retired: AtomicBool,
    created_at: SystemTime,
}

impl Contraption {
    pub(crate) fn new(location: GridPos, spec: Arc<ContraptionSpec>) -> Self {
        let resources = spec.seed_resources();
        Self {
            location,
            spec,
            resources: Mutex::new(resources),
            retired: AtomicBool::new(false),
            created_at: SystemTime::now(),
        }
    }

    pub fn location(&self) -> GridPos {
        self.location
    }

    pub fn spec(&self) -> &Arc<ContraptionSpec> {
        &self.spec
    }

    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }

    pub fn is_retired(&self) -> bool {
        self.retired.load(Ordering::Acquire)
    }

    /// Current value of a named resource store.
    pub fn resource(&self, name: &str) -> Option<f64> {
        self.lock_resources().get(name).map(Resource::get)
    }

    /// Trigger behavior: attempt each production gadget in declared order
    /// against the backing inventory and report the first success. With no
    /// runnable recipe the response is a neutral no-op.
    pub fn trigger(&self, world: &dyn World, catalog: &MaterialCatalog) -> Response {
        if self.is_retired() {
            return Response::fail("this contraption no longer exists");
        }
        let Some(mut inventory) = world.lock_inventory(self.location) else {
            return Response::fail("the contraption's inventory is missing");
        };
        for gadget in self.spec.production() {
            match gadget.produce(&mut inventory, catalog) {
                Ok(true) => {
                    drop(inventory);
                    world.play_effect(self.location, Effect::Production);
                    return Response::ok_with(
                        format!("{} produced {}", self.spec.display_name(), gadget.name()),
                        ResponsePayload::Produced {
                            recipe: gadget.name().to_string(),
                        },
                    );
                }
                Ok(false) => continue,
                Err(InventoryFull) => {
                    return Response::fail(format!(
                        "{}: no room for the {} outputs",
                        self.spec.display_name(),
                        gadget.name()
                    ));
                }
            }
        }
        Response::fail("nothing to produce")
    }

    /// Repair: convert item sets from the backing inventory into the repair
    /// resource. `amount` is rounded up to whole sets by the conversion
    /// gadget.
    pub fn repair(&self, amount: f64, world: &dyn World) -> Response {
        let mut resources = self.lock_resources();
        if self.is_retired() {
            return Response::fail("this contraption no longer exists");
        }
        let Some(mut inventory) = world.lock_inventory(self.location) else {
            return Response::fail("the contraption's inventory is missing");
        };
        let Some(repair) = resources.get_mut(REPAIR_RESOURCE) else {
            return Response::fail("this contraption has no repair store");
        };
        let before = repair.get();
        if self
            .spec
            .conversion()
            .convert_to_resource(amount, &mut inventory, repair)
        {
            let applied = repair.get() - before;
            drop(inventory);
            drop(resources);
            world.play_effect(self.location, Effect::Repair);
            Response::ok_with(
                format!("repaired {} by {applied}", self.spec.display_name()),
                ResponsePayload::Repaired { applied },
            )
        } else {
            Response::fail("not enough repair materials")
        }
    }

    /// One background period: apply growth/decay and, when the spec asks
    /// for it, drain the repair resource into item stacks. Skipped entirely
    /// once the instance is retired.
    pub fn tick(&self, world: &dyn World, catalog: &MaterialCatalog) {
        let mut resources = self.lock_resources();
        if self.is_retired() {
            return;
        }
        let Some(repair) = resources.get_mut(REPAIR_RESOURCE) else {
            return;
        };
        self.spec.grow().apply(repair);
        if self.spec.passive_conversion() {
            if let Some(mut inventory) = world.lock_inventory(self.location) {
                // Drains whatever whole sets the store affords, so values
                // that are not exact multiples of the rate still make
                // progress. InventoryFull means the chest is jammed; the
                // resource keeps accruing and a later period retries.
                let _ = self
                    .spec
                    .conversion()
                    .drain_into_item_stacks(repair, &mut inventory, catalog);
            }
        }
    }

    /// Mark the instance destroyed. Idempotent; returns true only for the
    /// first (effective) call.
    pub(crate) fn retire(&self) -> bool {
        !self.retired.swap(true, Ordering::AcqRel)
    }

    /// Lock order: resource state first, inventory second. `trigger` takes
    /// only the inventory lock and so never participates in the ordering.
    fn lock_resources(&self) -> MutexGuard<'_, HashMap<String, Resource>> {
        match self.resources.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
