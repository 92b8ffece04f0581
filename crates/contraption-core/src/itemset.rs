//! ItemSet matcher/realizer.
//!
//! An [`ItemSet`] is a quantified bundle of materials used as the unit of
//! matching, consumption, and production. Operations work in whole-number
//! "multiples" of the set. [`realize`] materializes a continuous quantity
//! into concrete stacks bounded by a material's max stack size.

use crate::item::{Inventory, ItemMeta, ItemStack, MaterialCatalog, MaterialId};
use serde::{Deserialize, Serialize};

/// One requirement line of an [`ItemSet`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetEntry {
    pub material: MaterialId,
    pub quantity: u32,
    #[serde(default)]
    pub meta: Option<ItemMeta>,
}

impl SetEntry {
    pub fn new(material: MaterialId, quantity: u32) -> Self {
        Self {
            material,
            quantity,
            meta: None,
        }
    }
}

/// Could not place every produced stack into the target inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("inventory cannot hold the produced stacks")]
pub struct InventoryFull;

/// An ordered bundle of (material, quantity, optional metadata) entries.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ItemSet {
    entries: Vec<SetEntry>,
}

impl ItemSet {
    pub fn new(entries: Vec<SetEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[SetEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// How many whole multiples of this set the inventory holds: the minimum
    /// over requirements of `floor(held / required)`. Entries naming the
    /// same material + metadata aggregate into one requirement. A set with
    /// no positive requirement has infinite availability.
    pub fn available(&self, inventory: &Inventory) -> f64 {
        let mut multiples = f64::INFINITY;
        for (material, meta, required) in self.aggregated() {
            let held = inventory.quantity(material, meta);
            multiples = multiples.min((held / required) as f64);
        }
        multiples
    }

    /// Requirements aggregated by (material, metadata), zero quantities
    /// dropped. Entry count is small; a quadratic pass keeps order stable.
    fn aggregated(&self) -> Vec<(MaterialId, Option<&ItemMeta>, u32)> {
        let mut totals: Vec<(MaterialId, Option<&ItemMeta>, u32)> = Vec::new();
        for entry in self.entries.iter().filter(|e| e.quantity > 0) {
            let key = (entry.material, entry.meta.as_ref());
            match totals.iter_mut().find(|(m, meta, _)| (*m, *meta) == key) {
                Some((_, _, total)) => *total = total.saturating_add(entry.quantity),
                None => totals.push((entry.material, entry.meta.as_ref(), entry.quantity)),
            }
        }
        totals
    }

    /// Remove `multiples` whole sets, or nothing. Returns false (no side
    /// effect) when fewer than `multiples` sets are available.
    pub fn consume(&self, inventory: &mut Inventory, multiples: u32) -> bool {
        if self.available(inventory) < multiples as f64 {
            return false;
        }
        for entry in &self.entries {
            let want = entry.quantity.saturating_mul(multiples);
            let removed = inventory.remove(entry.material, want, entry.meta.as_ref());
            debug_assert_eq!(removed, want);
        }
        true
    }

    /// Add `multiples` whole sets, splitting each material across stacks no
    /// larger than its max stack size. All-or-nothing: on [`InventoryFull`]
    /// the inventory is unchanged.
    pub fn produce(
        &self,
        inventory: &mut Inventory,
        catalog: &MaterialCatalog,
        multiples: u32,
    ) -> Result<(), InventoryFull> {
        let mut staged = inventory.clone();
        for entry in &self.entries {
            let quantity = entry.quantity.saturating_mul(multiples);
            let overflow = staged.add(
                entry.material,
                quantity,
                entry.meta.as_ref(),
                catalog.max_stack(entry.material),
            );
            if overflow > 0 {
                return Err(InventoryFull);
            }
        }
        *inventory = staged;
        Ok(())
    }
}

/// Lazy, finite, restartable (via `Clone`) sequence of concrete stacks
/// realizing a continuous quantity of one material. A quantity `q` becomes
/// `ceil(q / max_stack)` stacks of at most `max_stack` each; a fractional
/// tail is floored away.
#[derive(Debug, Clone)]
pub struct Realize {
    material: MaterialId,
    meta: Option<ItemMeta>,
    remaining: f64,
    max_stack: u32,
}

/// Materialize `quantity` of a material into stacks of at most `max_stack`.
pub fn realize(
    quantity: f64,
    material: MaterialId,
    meta: Option<ItemMeta>,
    max_stack: u32,
) -> Realize {
    Realize {
        material,
        meta,
        remaining: quantity.max(0.0),
        max_stack: max_stack.max(1),
    }
}

impl Iterator for Realize {
    type Item = ItemStack;

    fn next(&mut self) -> Option<ItemStack> {
        if self.remaining < 1.0 {
            return None;
        }
        let quantity = if self.remaining < self.max_stack as f64 {
            let q = self.remaining.floor() as u32;
            self.remaining = 0.0;
            q
        } else {
            self.remaining -= self.max_stack as f64;
            self.max_stack
        };
        Some(ItemStack {
            material: self.material,
            quantity,
            meta: self.meta.clone(),
        })
    }
}
