//! Fixed spawn poses across the lanes of the road segment.

use hx_core::{Location, SlotId, Transform};

/// Lateral offset of the first lane, metres.
pub const DEFAULT_LANE_ORIGIN_Y: f32 = 38.5;
/// Distance between adjacent lanes, metres.
pub const DEFAULT_LANE_SPACING: f32 = 3.35;
/// Longitudinal position shared by every slot.
pub const DEFAULT_SLOT_X: f32 = 340.0;
pub const DEFAULT_SLOT_Z: f32 = 0.5;
pub const DEFAULT_LANE_COUNT: usize = 5;

/// One spawn pose.  Occupancy is not tracked.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SpawnSlot {
    pub id:        SlotId,
    pub transform: Transform,
}

/// Ordered set of spawn slots, one per lane, parallel to the road axis.
#[derive(Clone, Debug, PartialEq)]
pub struct LaneLayout {
    slots: Vec<SpawnSlot>,
}

impl Default for LaneLayout {
    fn default() -> Self {
        Self::uniform(
            Location::new(DEFAULT_SLOT_X, DEFAULT_LANE_ORIGIN_Y, DEFAULT_SLOT_Z),
            DEFAULT_LANE_SPACING,
            DEFAULT_LANE_COUNT,
        )
    }
}

impl LaneLayout {
    /// `count` slots at `origin + (0, i * spacing, 0)`, facing `+x`.
    pub fn uniform(origin: Location, spacing: f32, count: usize) -> Self {
        let slots = (0..count)
            .map(|i| SpawnSlot {
                id:        SlotId(i as u8),
                transform: Transform::at(Location::new(
                    origin.x,
                    origin.y + i as f32 * spacing,
                    origin.z,
                )),
            })
            .collect();
        Self { slots }
    }

    pub fn slots(&self) -> &[SpawnSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
