use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Identifies a material registered in the [`MaterialCatalog`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct MaterialId(pub u32);

/// Stack size used for materials that never declared one.
pub const DEFAULT_MAX_STACK: u32 = 64;

/// A material definition: display name and the largest stack it forms.
#[derive(Debug, Clone)]
pub struct MaterialDef {
    pub name: String,
    pub max_stack: u32,
}

/// Name-interning table for materials. Registered once at startup, then
/// shared read-only; registration order is preserved.
#[derive(Debug, Default)]
pub struct MaterialCatalog {
    materials: Vec<MaterialDef>,
    name_to_id: HashMap<String, MaterialId>,
}

impl MaterialCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a material. Re-registering a name returns the existing id
    /// without altering its definition.
    pub fn register(&mut self, name: &str, max_stack: u32) -> MaterialId {
        if let Some(&id) = self.name_to_id.get(name) {
            return id;
        }
        let id = MaterialId(self.materials.len() as u32);
        self.materials.push(MaterialDef {
            name: name.to_string(),
            max_stack: max_stack.max(1),
        });
        self.name_to_id.insert(name.to_string(), id);
        id
    }

    pub fn id(&self, name: &str) -> Option<MaterialId> {
        self.name_to_id.get(name).copied()
    }

    pub fn get(&self, id: MaterialId) -> Option<&MaterialDef> {
        self.materials.get(id.0 as usize)
    }

    /// Max stack size for a material, falling back to [`DEFAULT_MAX_STACK`]
    /// for ids the catalog does not know.
    pub fn max_stack(&self, id: MaterialId) -> u32 {
        self.get(id).map(|m| m.max_stack).unwrap_or(DEFAULT_MAX_STACK)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

/// Display metadata carried by a stack. Two stacks only merge when their
/// metadata is identical.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemMeta {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub lore: Option<String>,
}

/// A stack of identical items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub material: MaterialId,
    pub quantity: u32,
    #[serde(default)]
    pub meta: Option<ItemMeta>,
}

impl ItemStack {
    pub fn new(material: MaterialId, quantity: u32) -> Self {
        Self {
            material,
            quantity,
            meta: None,
        }
    }

    pub fn with_meta(material: MaterialId, quantity: u32, meta: ItemMeta) -> Self {
        Self {
            material,
            quantity,
            meta: Some(meta),
        }
    }

    fn matches(&self, material: MaterialId, meta: Option<&ItemMeta>) -> bool {
        self.material == material && self.meta.as_ref() == meta
    }
}

/// A slot-bounded container of item stacks, mirroring a world inventory
/// (e.g. a chest). Capacity bounds the number of stacks, not the total
/// quantity; per-stack size is bounded by the material's max stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    stacks: Vec<ItemStack>,
    slots: usize,
}

impl Inventory {
    pub fn new(slots: usize) -> Self {
        Self {
            stacks: Vec::new(),
            slots,
        }
    }

    pub fn stacks(&self) -> &[ItemStack] {
        &self.stacks
    }

    pub fn slots(&self) -> usize {
        self.slots
    }

    /// Total quantity of a material with exactly the given metadata.
    pub fn quantity(&self, material: MaterialId, meta: Option<&ItemMeta>) -> u32 {
        self.stacks
            .iter()
            .filter(|s| s.matches(material, meta))
            .map(|s| s.quantity)
            .sum()
    }

    /// Total items across all stacks.
    pub fn total(&self) -> u32 {
        self.stacks.iter().map(|s| s.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }

    /// Add items, topping up existing stacks first and opening new slots of
    /// at most `max_stack` each. Returns the quantity that did not fit.
    #[must_use = "overflow count indicates items that did not fit"]
    pub fn add(
        &mut self,
        material: MaterialId,
        quantity: u32,
        meta: Option<&ItemMeta>,
        max_stack: u32,
    ) -> u32 {
        let max_stack = max_stack.max(1);
        let mut remaining = quantity;

        for stack in self
            .stacks
            .iter_mut()
            .filter(|s| s.matches(material, meta))
        {
            if remaining == 0 {
                break;
            }
            let room = max_stack.saturating_sub(stack.quantity);
            let moved = remaining.min(room);
            stack.quantity += moved;
            remaining -= moved;
        }

        while remaining > 0 && self.stacks.len() < self.slots {
            let moved = remaining.min(max_stack);
            self.stacks.push(ItemStack {
                material,
                quantity: moved,
                meta: meta.cloned(),
            });
            remaining -= moved;
        }

        remaining
    }

    /// Remove items matching material + metadata. Returns the quantity
    /// actually removed; empty stacks are dropped.
    #[must_use = "returns the quantity actually removed, which may be less than requested"]
    pub fn remove(
        &mut self,
        material: MaterialId,
        quantity: u32,
        meta: Option<&ItemMeta>,
    ) -> u32 {
        let mut remaining = quantity;
        for stack in self
            .stacks
            .iter_mut()
            .filter(|s| s.matches(material, meta))
        {
            if remaining == 0 {
                break;
            }
            let taken = remaining.min(stack.quantity);
            stack.quantity -= taken;
            remaining -= taken;
        }
        self.stacks.retain(|s| s.quantity > 0);
        quantity - remaining
    }
}
