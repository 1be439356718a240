//! Toroidal arena geometry
//!
//! The arena wraps on both axes: an entity leaving one edge re-enters at the
//! opposite one, and every distance is measured along the shorter of the
//! direct and wrapped separations.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Arena bounds, `[0, width) × [0, height)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
}

impl Arena {
    pub fn new(width: f32, height: f32) -> Self {
        debug_assert!(width > 0.0 && height > 0.0, "arena must have positive size");
        Self { width, height }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn center(&self) -> Vec2 {
        self.size() * 0.5
    }

    /// Wrap a position back into the arena
    #[inline]
    pub fn wrap(&self, pos: Vec2) -> Vec2 {
        Vec2::new(wrap_coord(pos.x, self.width), wrap_coord(pos.y, self.height))
    }

    /// Whether a position already lies inside the arena
    #[inline]
    pub fn contains(&self, pos: Vec2) -> bool {
        (0.0..self.width).contains(&pos.x) && (0.0..self.height).contains(&pos.y)
    }

    /// Shortest vector from `from` to `to` on the torus
    #[inline]
    pub fn delta(&self, from: Vec2, to: Vec2) -> Vec2 {
        Vec2::new(
            shortest_delta(from.x, to.x, self.width),
            shortest_delta(from.y, to.y, self.height),
        )
    }

    /// Wrapped distance between two points
    #[inline]
    pub fn distance(&self, a: Vec2, b: Vec2) -> f32 {
        self.delta(a, b).length()
    }

    /// Circle-circle overlap using wrapped distance
    ///
    /// Strict inequality: circles that exactly touch do not overlap.
    #[inline]
    pub fn circles_overlap(&self, a: Vec2, ar: f32, b: Vec2, br: f32) -> bool {
        let reach = ar + br;
        let d = self.delta(a, b);
        if d.x.abs() >= reach || d.y.abs() >= reach {
            return false;
        }
        d.length_squared() < reach * reach
    }
}

/// Wrap one coordinate into `[0, extent)`
#[inline]
pub fn wrap_coord(value: f32, extent: f32) -> f32 {
    let wrapped = value.rem_euclid(extent);
    // rem_euclid can round up to `extent` for tiny negative inputs
    if wrapped >= extent { 0.0 } else { wrapped }
}

/// Shortest signed separation on one wrapped axis
#[inline]
pub fn shortest_delta(from: f32, to: f32, extent: f32) -> f32 {
    let mut d = (to - from).rem_euclid(extent);
    if d > extent * 0.5 {
        d -= extent;
    }
    d
}
