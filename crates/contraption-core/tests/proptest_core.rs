//! Property-based tests for the contraption core.
//!
//! Uses proptest to generate random bounds, delta sequences, and set
//! compositions, then verifies the structural invariants hold.

use contraption_core::item::{Inventory, MaterialCatalog, MaterialId};
use contraption_core::itemset::{ItemSet, SetEntry, realize};
use contraption_core::resource::Resource;
use proptest::prelude::*;

// ===========================================================================
// Generators
// ===========================================================================

/// Ordered (min, max) bound pair within a sane range.
fn arb_bounds() -> impl Strategy<Value = (f64, f64)> {
    (-1.0e6..1.0e6f64, -1.0e6..1.0e6f64).prop_map(|(a, b)| if a <= b { (a, b) } else { (b, a) })
}

/// A small multi-material item set with positive quantities.
fn arb_set() -> impl Strategy<Value = ItemSet> {
    proptest::collection::vec((0..4u32, 1..10u32), 1..4).prop_map(|entries| {
        ItemSet::new(
            entries
                .into_iter()
                .map(|(material, quantity)| SetEntry::new(MaterialId(material), quantity))
                .collect(),
        )
    })
}

fn catalog() -> MaterialCatalog {
    let mut c = MaterialCatalog::new();
    for name in ["m0", "m1", "m2", "m3"] {
        c.register(name, 64);
    }
    c
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// After any sequence of `change` calls, `min <= value <= max` holds.
    #[test]
    fn resource_never_escapes_bounds(
        (min, max) in arb_bounds(),
        initial in -1.0e6..1.0e6f64,
        deltas in proptest::collection::vec(-1.0e5..1.0e5f64, 0..64),
    ) {
        let mut resource = Resource::new("r", initial, min, max);
        prop_assert!(resource.get() >= min && resource.get() <= max);
        for delta in deltas {
            let applied = resource.change(delta);
            prop_assert!(applied.abs() <= delta.abs() + 1e-9);
            prop_assert!(resource.get() >= min && resource.get() <= max);
        }
    }

    /// `available` is monotonic non-increasing under `consume` of the same
    /// set, and restores exactly after an equal-and-opposite `produce`.
    #[test]
    fn availability_monotonic_and_restored(
        set in arb_set(),
        stock in proptest::collection::vec(0..200u32, 4),
        multiples in 1..4u32,
    ) {
        let catalog = catalog();
        let mut inventory = Inventory::new(64);
        for (i, &quantity) in stock.iter().enumerate() {
            let overflow = inventory.add(MaterialId(i as u32), quantity, None, 64);
            prop_assert_eq!(overflow, 0);
        }

        let before = set.available(&inventory);
        let consumed = set.consume(&mut inventory, multiples);
        let after = set.available(&inventory);
        prop_assert!(after <= before);

        if consumed {
            prop_assert!(before >= multiples as f64);
            set.produce(&mut inventory, &catalog, multiples).unwrap();
            prop_assert_eq!(set.available(&inventory), before);
        } else {
            // Failed consume has no side effect.
            prop_assert_eq!(after, before);
        }
    }

    /// Realization splits a quantity into stacks of at most `max_stack`,
    /// totalling `floor(quantity)`.
    #[test]
    fn realize_respects_stack_bounds(
        quantity in 0.0..5000.0f64,
        max_stack in 1..128u32,
    ) {
        let stacks: Vec<_> = realize(quantity, MaterialId(0), None, max_stack).collect();
        let total: u64 = stacks.iter().map(|s| s.quantity as u64).sum();
        prop_assert_eq!(total, quantity.floor() as u64);
        prop_assert!(stacks.iter().all(|s| s.quantity >= 1 && s.quantity <= max_stack));
        // Finite and no longer than ceil(q / max_stack).
        prop_assert!(stacks.len() as u64 <= (quantity / max_stack as f64).ceil() as u64);
    }
}
