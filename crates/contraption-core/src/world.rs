//! The seam to the host game world and its event surface.
//!
//! The engine never reads or writes world storage directly: block lookups,
//! inventory access, and feedback effects all pass through the [`World`]
//! trait. Hosts adapt their storage behind it; tests use
//! [`crate::test_utils::TestWorld`].

use crate::item::{Inventory, MaterialId};
use serde::{Deserialize, Serialize};
use std::sync::MutexGuard;

/// A block position. Spatial queries operate on the x/z plane and ignore y.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl GridPos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Inclusive square test on the x/z plane, ignoring the vertical axis.
    pub fn in_square(&self, center: GridPos, radius: u32) -> bool {
        let r = radius as i64;
        (self.x as i64 - center.x as i64).abs() <= r
            && (self.z as i64 - center.z as i64).abs() <= r
    }
}

/// Feedback effects delivered to the world (sound/visuals are host-defined).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Creation,
    Production,
    Repair,
    Destruction,
}

/// Identifies the actor that triggered an inbound event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(pub u64);

/// Inbound world events consumed by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldEvent {
    BlockBroken(GridPos),
    Interact { pos: GridPos, actor: ActorId },
}

/// Structured payload attached to a successful [`Response`].
#[derive(Debug, Clone, PartialEq)]
pub enum ResponsePayload {
    /// A contraption was built; `actor` is who built it, for hosts that
    /// track ownership.
    Created {
        spec_id: String,
        location: GridPos,
        actor: ActorId,
    },
    Produced {
        recipe: String,
    },
    Repaired {
        applied: f64,
    },
}

/// Outcome of an event-path operation, delivered back to the triggering
/// actor by the host's event glue.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub success: bool,
    pub message: String,
    pub payload: Option<ResponsePayload>,
}

impl Response {
    pub fn ok_with(message: impl Into<String>, payload: ResponsePayload) -> Self {
        Self {
            success: true,
            message: message.into(),
            payload: Some(payload),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            payload: None,
        }
    }
}

/// Host-world contract. Implementations must be shareable across the event
/// path and the background tick worker.
pub trait World: Send + Sync {
    /// Material of the block at `pos`, or `None` outside the world.
    fn block_at(&self, pos: GridPos) -> Option<MaterialId>;

    /// Exclusive access to the inventory backing `pos`, or `None` when the
    /// block has no inventory. The guard serializes event-path and
    /// tick-path mutations of the same inventory.
    fn lock_inventory(&self, pos: GridPos) -> Option<MutexGuard<'_, Inventory>>;

    /// Fire-and-forget feedback at a location.
    fn play_effect(&self, pos: GridPos, effect: Effect);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_test_ignores_vertical_axis() {
        let center = GridPos::new(0, 0, 0);
        assert!(GridPos::new(2, 99, -2).in_square(center, 2));
        assert!(!GridPos::new(3, 0, 0).in_square(center, 2));
        assert!(!GridPos::new(0, 0, -3).in_square(center, 2));
        assert!(GridPos::new(0, -40, 0).in_square(center, 0));
    }

    #[test]
    fn square_test_survives_extreme_coordinates() {
        let center = GridPos::new(i32::MAX, 0, i32::MIN);
        assert!(GridPos::new(i32::MAX - 1, 0, i32::MIN + 1).in_square(center, 1));
        assert!(!GridPos::new(i32::MIN, 0, i32::MIN).in_square(center, 1));
    }
}
