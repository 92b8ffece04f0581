//! Immutable contraption type definitions.

use crate::gadget::{ConversionGadget, GrowGadget, MatchGadget, MinMaxGadget, ProductionGadget};
use crate::item::MaterialId;
use crate::resource::Resource;
use std::collections::HashMap;

/// Name of the durability resource every contraption carries.
pub const REPAIR_RESOURCE: &str = "repair";

/// Default ceiling for the repair resource when a spec leaves `max_repair`
/// unset. One unit per game tick for 30 days at 20 ticks/second.
pub const DEFAULT_MAX_REPAIR: f64 = 51_840_000.0;

/// Default resource units granted per repair set when a spec leaves
/// `repair_amount` unset: three and a third repair-lifetimes per set.
pub const DEFAULT_REPAIR_CONVERSION: f64 = DEFAULT_MAX_REPAIR * 10.0 / 3.0;

/// Default decay applied to the repair resource per scheduling period.
pub const DEFAULT_BREAKDOWN_RATE: f64 = -1.0;

/// An immutable, named bundle of gadgets plus placement constraints.
/// Assembled once from configuration and shared (via `Arc`) by every live
/// instance of the type.
#[derive(Debug, Clone)]
pub struct ContraptionSpec {
    id: String,
    display_name: String,
    block: MaterialId,
    match_gadget: MatchGadget,
    production: Vec<ProductionGadget>,
    conversion: ConversionGadget,
    grow: GrowGadget,
    min_max: MinMaxGadget,
    passive_conversion: bool,
}

impl ContraptionSpec {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: &str,
        display_name: &str,
        block: MaterialId,
        match_gadget: MatchGadget,
        production: Vec<ProductionGadget>,
        conversion: ConversionGadget,
        grow: GrowGadget,
        min_max: MinMaxGadget,
        passive_conversion: bool,
    ) -> Self {
        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
            block,
            match_gadget,
            production,
            conversion,
            grow,
            min_max,
            passive_conversion,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Block material an instance of this type must stand on.
    pub fn block(&self) -> MaterialId {
        self.block
    }

    pub fn match_gadget(&self) -> &MatchGadget {
        &self.match_gadget
    }

    /// Recipes in declared order; the trigger path selects the first that
    /// succeeds.
    pub fn production(&self) -> &[ProductionGadget] {
        &self.production
    }

    pub fn conversion(&self) -> &ConversionGadget {
        &self.conversion
    }

    pub fn grow(&self) -> &GrowGadget {
        &self.grow
    }

    pub fn min_max(&self) -> &MinMaxGadget {
        &self.min_max
    }

    /// Whether the background path drains the repair resource into item
    /// stacks each period.
    pub fn passive_conversion(&self) -> bool {
        self.passive_conversion
    }

    /// Resource stores a fresh instance starts with. The repair resource is
    /// seeded at its maximum bound: a newly built contraption is fully
    /// repaired.
    pub fn seed_resources(&self) -> HashMap<String, Resource> {
        let mut resources = HashMap::new();
        let repair = Resource::new(
            REPAIR_RESOURCE,
            self.min_max.max(),
            self.min_max.min(),
            self.min_max.max(),
        );
        resources.insert(REPAIR_RESOURCE.to_string(), repair);
        resources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::itemset::{ItemSet, SetEntry};

    fn spec() -> ContraptionSpec {
        let building = ItemSet::new(vec![SetEntry::new(MaterialId(1), 10)]);
        let repair_set = ItemSet::new(vec![SetEntry::new(MaterialId(2), 1)]);
        ContraptionSpec::new(
            "bakery",
            "Bakery",
            MaterialId(0),
            MatchGadget::new(building),
            vec![],
            ConversionGadget::new(repair_set, 5.0),
            GrowGadget::new(DEFAULT_BREAKDOWN_RATE),
            MinMaxGadget::new(0.0, 100.0),
            false,
        )
    }

    #[test]
    fn seed_starts_repair_at_max() {
        let resources = spec().seed_resources();
        let repair = &resources[REPAIR_RESOURCE];
        assert_eq!(repair.get(), 100.0);
        assert_eq!(repair.min(), 0.0);
        assert_eq!(repair.max(), 100.0);
    }

    #[test]
    fn accessors_expose_declared_fields() {
        let s = spec();
        assert_eq!(s.id(), "bakery");
        assert_eq!(s.display_name(), "Bakery");
        assert_eq!(s.block(), MaterialId(0));
        assert!(s.production().is_empty());
        assert!(!s.passive_conversion());
        assert_eq!(s.grow().rate(), DEFAULT_BREAKDOWN_RATE);
    }
}
