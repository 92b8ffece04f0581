//! Shared test helpers.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so the same
//! fixtures serve unit tests, property tests, and the integration-test
//! crate.

use crate::gadget::{ConversionGadget, GrowGadget, MatchGadget, MinMaxGadget, ProductionGadget};
use crate::item::{Inventory, MaterialCatalog, MaterialId};
use crate::itemset::{ItemSet, SetEntry};
use crate::spec::ContraptionSpec;
use crate::world::{Effect, GridPos, World};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

pub fn pos(x: i32, y: i32, z: i32) -> GridPos {
    GridPos::new(x, y, z)
}

/// In-memory world: a block map, one lockable inventory per position, and a
/// recording of played effects. Configure it before sharing it.
#[derive(Default)]
pub struct TestWorld {
    blocks: HashMap<GridPos, MaterialId>,
    inventories: HashMap<GridPos, Mutex<Inventory>>,
    effects: Mutex<Vec<(GridPos, Effect)>>,
}

impl TestWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_block(&mut self, pos: GridPos, material: MaterialId) {
        self.blocks.insert(pos, material);
    }

    pub fn place_inventory(&mut self, pos: GridPos, inventory: Inventory) {
        self.inventories.insert(pos, Mutex::new(inventory));
    }

    pub fn effects(&self) -> Vec<(GridPos, Effect)> {
        match self.effects.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl World for TestWorld {
    fn block_at(&self, pos: GridPos) -> Option<MaterialId> {
        self.blocks.get(&pos).copied()
    }

    fn lock_inventory(&self, pos: GridPos) -> Option<MutexGuard<'_, Inventory>> {
        self.inventories.get(&pos).map(|m| match m.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        })
    }

    fn play_effect(&self, pos: GridPos, effect: Effect) {
        if let Ok(mut effects) = self.effects.lock() {
            effects.push((pos, effect));
        }
    }
}

/// Standard material set shared by the tests: a chest block, a building
/// material, a repair/recipe input, and a recipe output.
pub struct Fixture {
    pub catalog: Arc<MaterialCatalog>,
    pub chest: MaterialId,
    pub mat_a: MaterialId,
    pub mat_b: MaterialId,
    pub cake: MaterialId,
}

impl Fixture {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let mut catalog = MaterialCatalog::new();
        let chest = catalog.register("chest", 1);
        let mat_a = catalog.register("material_a", 64);
        let mat_b = catalog.register("material_b", 64);
        let cake = catalog.register("cake", 8);
        Self {
            catalog: Arc::new(catalog),
            chest,
            mat_a,
            mat_b,
            cake,
        }
    }

    /// A 27-slot chest inventory pre-filled with the given stacks.
    pub fn chest_inventory(&self, contents: &[(MaterialId, u32)]) -> Inventory {
        let mut inventory = Inventory::new(27);
        for &(material, quantity) in contents {
            let overflow = inventory.add(material, quantity, None, self.catalog.max_stack(material));
            assert_eq!(overflow, 0, "fixture inventory overflowed");
        }
        inventory
    }

    /// A world holding a single chest at `location` with the given contents.
    pub fn world_with_chest(
        &self,
        location: GridPos,
        contents: &[(MaterialId, u32)],
    ) -> TestWorld {
        let mut world = TestWorld::new();
        world.set_block(location, self.chest);
        world.place_inventory(location, self.chest_inventory(contents));
        world
    }
}

/// The canonical test spec: a bakery built from 10x material_a on a chest,
/// with one recipe (2x material_b -> 1x cake), repair sets of 1x material_b
/// at 5.0 units per set, decay of 1.0 per period, and repair bounded to
/// [0, 100].
pub fn factory_spec(fx: &Fixture) -> ContraptionSpec {
    ContraptionSpec::new(
        "bakery",
        "Bakery",
        fx.chest,
        MatchGadget::new(ItemSet::new(vec![SetEntry::new(fx.mat_a, 10)])),
        vec![ProductionGadget::new(
            "bake_cake",
            ItemSet::new(vec![SetEntry::new(fx.mat_b, 2)]),
            ItemSet::new(vec![SetEntry::new(fx.cake, 1)]),
            40,
        )],
        ConversionGadget::new(ItemSet::new(vec![SetEntry::new(fx.mat_b, 1)]), 5.0),
        GrowGadget::new(-1.0),
        MinMaxGadget::new(0.0, 100.0),
        false,
    )
}

/// Like [`factory_spec`] but draining the repair store into material_b
/// stacks each period.
pub fn passive_conversion_spec(fx: &Fixture) -> ContraptionSpec {
    ContraptionSpec::new(
        "generator",
        "Generator",
        fx.chest,
        MatchGadget::new(ItemSet::new(vec![SetEntry::new(fx.mat_a, 1)])),
        vec![],
        ConversionGadget::new(ItemSet::new(vec![SetEntry::new(fx.mat_b, 1)]), 5.0),
        GrowGadget::new(2.5),
        MinMaxGadget::new(0.0, 50.0),
        true,
    )
}
