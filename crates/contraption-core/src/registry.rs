//! The contraption registry: spec table plus spatial index of live
//! instances.
//!
//! Specs are registered once at startup (in order; creation ties resolve by
//! registration order) and frozen behind shared references. The location
//! index sits behind its own lock with snapshot semantics: an instance is
//! either fully present or fully absent, never half-registered. Per
//! instance, `absent -> live -> destroyed` is a one-way street; re-creation
//! at the same location produces a new instance.

use crate::contraption::Contraption;
use crate::item::MaterialCatalog;
use crate::spec::ContraptionSpec;
use crate::world::{ActorId, Effect, GridPos, Response, ResponsePayload, World, WorldEvent};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Why `create` refused to build a contraption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CreateError {
    /// No spec builds from the block at this location.
    #[error("incorrect block")]
    WrongBlock,
    /// At least one spec matched the block, but none found its required
    /// items in the inventory.
    #[error("block is correct, but the required items are missing")]
    WrongContents,
    /// A live instance already occupies the location.
    #[error("a contraption already exists here")]
    Occupied,
}

/// Startup-time spec registration failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpecError {
    #[error("duplicate spec id: {0}")]
    DuplicateId(String),
}

/// Owns the spec table and every live instance, and mediates between world
/// events and spec matching. Constructed once at startup and passed by
/// reference to every collaborator; there is no ambient global.
pub struct ContraptionRegistry {
    world: Arc<dyn World>,
    catalog: Arc<MaterialCatalog>,
    specs: Vec<Arc<ContraptionSpec>>,
    spec_ids: HashMap<String, usize>,
    index: RwLock<HashMap<GridPos, Arc<Contraption>>>,
}

impl ContraptionRegistry {
    pub fn new(world: Arc<dyn World>, catalog: Arc<MaterialCatalog>) -> Self {
        Self {
            world,
            catalog,
            specs: Vec::new(),
            spec_ids: HashMap::new(),
            index: RwLock::new(HashMap::new()),
        }
    }

    pub fn world(&self) -> &Arc<dyn World> {
        &self.world
    }

    pub fn catalog(&self) -> &MaterialCatalog {
        &self.catalog
    }

    /// Register a spec. Registration order decides creation ties.
    pub fn register_spec(&mut self, spec: ContraptionSpec) -> Result<(), SpecError> {
        if self.spec_ids.contains_key(spec.id()) {
            return Err(SpecError::DuplicateId(spec.id().to_string()));
        }
        self.spec_ids
            .insert(spec.id().to_string(), self.specs.len());
        self.specs.push(Arc::new(spec));
        Ok(())
    }

    pub fn spec(&self, id: &str) -> Option<&Arc<ContraptionSpec>> {
        self.spec_ids.get(id).map(|&i| &self.specs[i])
    }

    pub fn spec_count(&self) -> usize {
        self.specs.len()
    }

    /// Attempt to create a contraption at `pos`. The first registered spec
    /// whose block matches AND whose match gadget consumes its required
    /// items wins.
    pub fn create(&self, pos: GridPos) -> Result<Arc<Contraption>, CreateError> {
        if self.read_index().contains_key(&pos) {
            return Err(CreateError::Occupied);
        }
        let Some(block) = self.world.block_at(pos) else {
            return Err(CreateError::WrongBlock);
        };

        let mut matched_block = false;
        for spec in &self.specs {
            if spec.block() != block {
                continue;
            }
            matched_block = true;
            let Some(mut inventory) = self.world.lock_inventory(pos) else {
                continue;
            };
            if spec.match_gadget().matches(&inventory)
                && spec.match_gadget().consume(&mut inventory)
            {
                drop(inventory);
                let instance = Arc::new(Contraption::new(pos, Arc::clone(spec)));
                self.write_index().insert(pos, Arc::clone(&instance));
                self.world.play_effect(pos, Effect::Creation);
                return Ok(instance);
            }
        }

        Err(if matched_block {
            CreateError::WrongContents
        } else {
            CreateError::WrongBlock
        })
    }

    /// The live instance at `pos`, if any.
    pub fn get(&self, pos: GridPos) -> Option<Arc<Contraption>> {
        self.read_index().get(&pos).cloned()
    }

    /// All live instances within the inclusive square of `radius` around
    /// `center` on the x/z plane, ignoring the vertical axis.
    pub fn query(&self, center: GridPos, radius: u32) -> Vec<Arc<Contraption>> {
        self.read_index()
            .values()
            .filter(|c| c.location().in_square(center, radius))
            .cloned()
            .collect()
    }

    /// Snapshot of every live instance, for the background tick worker.
    pub fn live(&self) -> Vec<Arc<Contraption>> {
        self.read_index().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.read_index().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_index().is_empty()
    }

    /// Destroy the instance at `pos`. The instance is removed from the
    /// index (unreachable to any future lookup) strictly before teardown
    /// runs, so a racing background tick either completes against the
    /// still-registered instance or observes it as absent. Returns false,
    /// with no side effect, when no instance exists.
    pub fn destroy(&self, pos: GridPos) -> bool {
        let removed = self.write_index().remove(&pos);
        match removed {
            Some(instance) => {
                instance.retire();
                self.world.play_effect(pos, Effect::Destruction);
                true
            }
            None => false,
        }
    }

    /// Block-break convenience: destroy if present, no-op otherwise.
    pub fn on_block_removed(&self, pos: GridPos) {
        let _ = self.destroy(pos);
    }

    /// Interaction entry point: trigger an existing instance, otherwise try
    /// to create one on the actor's behalf. The response is delivered back
    /// to `actor` by the host's event glue; creation records the actor in
    /// the payload.
    pub fn on_interact(&self, pos: GridPos, actor: ActorId) -> Response {
        if let Some(instance) = self.get(pos) {
            return instance.trigger(self.world.as_ref(), &self.catalog);
        }
        match self.create(pos) {
            Ok(instance) => Response::ok_with(
                format!("created a {}", instance.spec().display_name()),
                ResponsePayload::Created {
                    spec_id: instance.spec().id().to_string(),
                    location: pos,
                    actor,
                },
            ),
            Err(reason) => Response::fail(reason.to_string()),
        }
    }

    /// Inbound event dispatch. Interactions yield a response for the actor;
    /// block breaks do not.
    pub fn handle_event(&self, event: WorldEvent) -> Option<Response> {
        match event {
            WorldEvent::BlockBroken(pos) => {
                self.on_block_removed(pos);
                None
            }
            WorldEvent::Interact { pos, actor } => Some(self.on_interact(pos, actor)),
        }
    }

    fn read_index(&self) -> RwLockReadGuard<'_, HashMap<GridPos, Arc<Contraption>>> {
        match self.index.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_index(&self) -> RwLockWriteGuard<'_, HashMap<GridPos, Arc<Contraption>>> {
        match self.index.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
