//! The five gadget kinds.
//!
//! A gadget is one independently testable behavior strategy attached to a
//! contraption spec. Each is a plain struct selected explicitly by the spec
//! assembler from validated configuration -- a closed set, no trait objects
//! and no runtime probing.

use crate::Ticks;
use crate::item::{Inventory, MaterialCatalog};
use crate::itemset::{InventoryFull, ItemSet};
use crate::resource::Resource;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// MatchGadget
// ---------------------------------------------------------------------------

/// The item requirement for building (or repairing) a contraption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchGadget {
    required: ItemSet,
}

impl MatchGadget {
    pub fn new(required: ItemSet) -> Self {
        Self { required }
    }

    pub fn required(&self) -> &ItemSet {
        &self.required
    }

    /// Does the inventory hold at least one whole required set?
    pub fn matches(&self, inventory: &Inventory) -> bool {
        self.required.available(inventory) >= 1.0
    }

    /// Consume exactly one required set, or nothing.
    pub fn consume(&self, inventory: &mut Inventory) -> bool {
        self.required.consume(inventory, 1)
    }
}

// ---------------------------------------------------------------------------
// ProductionGadget
// ---------------------------------------------------------------------------

/// A named recipe: one input set in, one output set out. Invoked by the
/// owning contraption's trigger, never autonomously scheduled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionGadget {
    name: String,
    inputs: ItemSet,
    outputs: ItemSet,
    /// Processing-time constant in ticks, carried for hosts that animate or
    /// rate-limit production.
    duration: Ticks,
}

impl ProductionGadget {
    pub fn new(name: &str, inputs: ItemSet, outputs: ItemSet, duration: Ticks) -> Self {
        Self {
            name: name.to_string(),
            inputs,
            outputs,
            duration,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> &ItemSet {
        &self.inputs
    }

    pub fn outputs(&self) -> &ItemSet {
        &self.outputs
    }

    pub fn duration(&self) -> Ticks {
        self.duration
    }

    /// Consume one input multiple and produce one output multiple.
    /// `Ok(false)` when inputs are missing (no side effect); `InventoryFull`
    /// when the outputs cannot be placed (inputs are not eaten either).
    pub fn produce(
        &self,
        inventory: &mut Inventory,
        catalog: &MaterialCatalog,
    ) -> Result<bool, InventoryFull> {
        if self.inputs.available(inventory) < 1.0 {
            return Ok(false);
        }
        let mut staged = inventory.clone();
        if !self.inputs.consume(&mut staged, 1) {
            return Ok(false);
        }
        self.outputs.produce(&mut staged, catalog, 1)?;
        *inventory = staged;
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// ConversionGadget
// ---------------------------------------------------------------------------

/// Bidirectional exchange between an item set and a resource at a fixed
/// rate of `conversion` resource units per whole set. Both directions round
/// the requested amount up to whole sets and are all-or-nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionGadget {
    set: ItemSet,
    conversion: f64,
}

impl ConversionGadget {
    pub fn new(set: ItemSet, conversion: f64) -> Self {
        Self { set, conversion }
    }

    pub fn set(&self) -> &ItemSet {
        &self.set
    }

    pub fn conversion(&self) -> f64 {
        self.conversion
    }

    /// Whole sets needed to cover `amount` resource units.
    pub fn sets_for(&self, amount: f64) -> u32 {
        if amount <= 0.0 || self.conversion <= 0.0 {
            return 0;
        }
        (amount / self.conversion).ceil() as u32
    }

    /// Can the inventory supply at least `amount` resource units?
    pub fn can_convert_to_resource(&self, amount: f64, inventory: &Inventory) -> bool {
        self.set.available(inventory) * self.conversion >= amount
    }

    /// Consume ceiling-rounded whole sets and credit the resource. Returns
    /// false (no mutation anywhere) when the inventory cannot supply them.
    pub fn convert_to_resource(
        &self,
        amount: f64,
        inventory: &mut Inventory,
        resource: &mut Resource,
    ) -> bool {
        let sets = self.sets_for(amount);
        if !self.set.consume(inventory, sets) {
            return false;
        }
        resource.change(sets as f64 * self.conversion);
        true
    }

    /// Drain the resource into ceiling-rounded whole sets of items. The
    /// resource must be able to supply the full drained amount above its
    /// minimum; otherwise returns `Ok(false)` with no mutation. Item
    /// placement failure propagates as [`InventoryFull`], also without
    /// mutating the resource.
    pub fn convert_to_item_stacks(
        &self,
        resource: &mut Resource,
        inventory: &mut Inventory,
        catalog: &MaterialCatalog,
        amount: f64,
    ) -> Result<bool, InventoryFull> {
        self.drain_sets(self.sets_for(amount), resource, inventory, catalog)
    }

    /// Drain the largest whole number of sets the resource can afford above
    /// its minimum. `Ok(false)` when not even one set is covered. Unlike
    /// [`convert_to_item_stacks`](Self::convert_to_item_stacks) this never
    /// rounds up, so it makes progress on values that are not exact
    /// multiples of the conversion rate.
    pub fn drain_into_item_stacks(
        &self,
        resource: &mut Resource,
        inventory: &mut Inventory,
        catalog: &MaterialCatalog,
    ) -> Result<bool, InventoryFull> {
        if self.conversion <= 0.0 {
            return Ok(false);
        }
        let affordable = ((resource.get() - resource.min()) / self.conversion).floor();
        if affordable < 1.0 {
            return Ok(false);
        }
        self.drain_sets(affordable as u32, resource, inventory, catalog)
    }

    fn drain_sets(
        &self,
        sets: u32,
        resource: &mut Resource,
        inventory: &mut Inventory,
        catalog: &MaterialCatalog,
    ) -> Result<bool, InventoryFull> {
        if sets == 0 {
            return Ok(false);
        }
        let drained = sets as f64 * self.conversion;
        if resource.get() - drained < resource.min() {
            return Ok(false);
        }
        self.set.produce(inventory, catalog, sets)?;
        resource.change(-drained);
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// GrowGadget
// ---------------------------------------------------------------------------

/// A signed rate applied to a resource once per scheduling period. Negative
/// rates model decay (breakdown).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowGadget {
    rate: f64,
}

impl GrowGadget {
    pub fn new(rate: f64) -> Self {
        Self { rate }
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Apply one period's worth of growth. Returns the applied delta.
    pub fn apply(&self, resource: &mut Resource) -> f64 {
        resource.change(self.rate)
    }
}

// ---------------------------------------------------------------------------
// MinMaxGadget
// ---------------------------------------------------------------------------

/// The bound pair a spec imposes on a resource. Kept apart from the
/// resource's own clamp so specs can reconfigure bounds without redefining
/// the resource.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinMaxGadget {
    min: f64,
    max: f64,
}

impl MinMaxGadget {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Refresh the resource's bounds; the store re-clamps its value.
    pub fn bind(&self, resource: &mut Resource) {
        resource.set_bounds(self.min, self.max);
    }
}
