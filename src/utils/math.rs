//! # Game Mathematics
//!
//! Hitbox geometry shared by the movement and combat systems.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Creates a new rectangle from its top-left corner and size.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Checks whether two rectangles overlap. Touching edges do not count.
    ///
    /// # Examples
    ///
    /// ```
    /// use gloomcrawl::Rect;
    ///
    /// let a = Rect::new(0.0, 0.0, 30.0, 30.0);
    /// assert!(a.overlaps(&Rect::new(20.0, 20.0, 15.0, 15.0)));
    /// assert!(!a.overlaps(&Rect::new(30.0, 0.0, 15.0, 15.0)));
    /// ```
    pub fn overlaps(&self, other: &Rect) -> bool {
        rectangles_overlap(
            self.x,
            self.y,
            self.width,
            self.height,
            other.x,
            other.y,
            other.width,
            other.height,
        )
    }
}

/// Strict overlap test between two rectangles given as position and size.
pub fn rectangles_overlap(
    ax: f64,
    ay: f64,
    aw: f64,
    ah: f64,
    bx: f64,
    by: f64,
    bw: f64,
    bh: f64,
) -> bool {
    ax < bx + bw && ax + aw > bx && ay < by + bh && ay + ah > by
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_contained() {
        let outer = Rect::new(0.0, 0.0, 30.0, 30.0);
        let inner = Rect::new(7.5, 7.5, 15.0, 15.0);
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 30.0, 30.0);
        assert!(!a.overlaps(&Rect::new(30.0, 10.0, 15.0, 15.0)));
        assert!(!a.overlaps(&Rect::new(10.0, -15.0, 15.0, 15.0)));
        assert!(a.overlaps(&Rect::new(29.5, 10.0, 15.0, 15.0)));
    }
}
