//! World-space geometry in the simulator's ground-plane frame.
//!
//! Coordinates are metres, `f32`, in the backend's right-handed frame:
//! `x` runs along the reference road axis (longitudinal), `y` across it
//! (lateral), `z` up.  Rotations are degrees.

use std::fmt;

use crate::{HxError, HxResult};

// ── Location ──────────────────────────────────────────────────────────────────

/// A point in world space.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Location {
    #[inline]
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Distance ignoring height; the quantity spawn clearance and collision
    /// checks care about.
    pub fn planar_distance(self, other: Location) -> f32 {
        let (dx, dy) = (other.x - self.x, other.y - self.y);
        (dx * dx + dy * dy).sqrt()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

// ── Rotation ──────────────────────────────────────────────────────────────────

/// Orientation in degrees.  The default is facing `+x`.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rotation {
    pub pitch: f32,
    pub yaw:   f32,
    pub roll:  f32,
}

impl Rotation {
    /// Unit heading vector on the ground plane.
    pub fn forward(self) -> (f32, f32) {
        let yaw = self.yaw.to_radians();
        (yaw.cos(), yaw.sin())
    }
}

// ── Transform ─────────────────────────────────────────────────────────────────

/// A pose: location plus rotation.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transform {
    pub location: Location,
    pub rotation: Rotation,
}

impl Transform {
    #[inline]
    pub fn new(location: Location, rotation: Rotation) -> Self {
        Self { location, rotation }
    }

    /// A pose at `location` facing `+x`.
    #[inline]
    pub fn at(location: Location) -> Self {
        Self { location, rotation: Rotation::default() }
    }
}

// ── Region ────────────────────────────────────────────────────────────────────

/// Axis-aligned rectangle on the ground plane.
///
/// Membership is inclusive at every bound, so a point exactly on an edge is
/// inside.  Height is ignored.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Region {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl Region {
    /// Build a region, rejecting inverted bounds.
    pub fn new(min_x: f32, max_x: f32, min_y: f32, max_y: f32) -> HxResult<Self> {
        let region = Self { min_x, max_x, min_y, max_y };
        region.validate()?;
        Ok(region)
    }

    pub fn validate(&self) -> HxResult<()> {
        if !(self.min_x <= self.max_x) {
            return Err(HxError::InvertedRegion { axis: "x", min: self.min_x, max: self.max_x });
        }
        if !(self.min_y <= self.max_y) {
            return Err(HxError::InvertedRegion { axis: "y", min: self.min_y, max: self.max_y });
        }
        Ok(())
    }

    #[inline]
    pub fn contains(&self, location: Location) -> bool {
        location.x >= self.min_x
            && location.x <= self.max_x
            && location.y >= self.min_y
            && location.y <= self.max_y
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "x[{}, {}] y[{}, {}]",
            self.min_x, self.max_x, self.min_y, self.max_y
        )
    }
}
