//! Two-dimensional vector math.
//!
//! [`Vector2`] doubles as both a point in world space and a displacement
//! between two points. It is a plain `Copy` value; every operation returns a
//! new vector.

use std::fmt;
use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

/// A 2D point or vector in world units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2 {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate (grows downward on screen).
    pub y: f32,
}

impl Vector2 {
    /// The zero vector.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Unit vector along the positive x-axis.
    pub const UNIT_X: Self = Self { x: 1.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean length, `sqrt(x² + y²)`.
    #[inline]
    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Distance between two points.
    #[inline]
    pub fn distance(self, other: Self) -> f32 {
        (self - other).length()
    }

    /// This vector scaled to unit length, or `None` when the length is zero
    /// (or not finite) and no direction can be derived.
    pub fn normalized(self) -> Option<Self> {
        let len = self.length();
        if len > 0.0 && len.is_finite() {
            Some(Self::new(self.x / len, self.y / len))
        } else {
            None
        }
    }
}

impl Add for Vector2 {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vector2 {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vector2 {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl From<(f32, f32)> for Vector2 {
    fn from((x, y): (f32, f32)) -> Self {
        Self::new(x, y)
    }
}

impl From<[f32; 2]> for Vector2 {
    fn from([x, y]: [f32; 2]) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Display for Vector2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_of_pythagorean_triple() {
        assert_eq!(Vector2::new(3.0, 4.0).length(), 5.0);
        assert_eq!(Vector2::ZERO.length(), 0.0);
    }

    #[test]
    fn add_and_sub_are_componentwise() {
        let a = Vector2::new(1.0, 2.0);
        let b = Vector2::new(10.0, -5.0);
        assert_eq!(a + b, Vector2::new(11.0, -3.0));
        assert_eq!(b - a, Vector2::new(9.0, -7.0));
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Vector2::new(0.0, 0.0);
        let b = Vector2::new(6.0, 8.0);
        assert_eq!(a.distance(b), 10.0);
        assert_eq!(b.distance(a), 10.0);
    }

    #[test]
    fn normalized_zero_is_none() {
        assert_eq!(Vector2::ZERO.normalized(), None);
        assert_eq!(Vector2::new(f32::NAN, 1.0).normalized(), None);
    }

    #[test]
    fn normalized_has_unit_length() {
        let n = Vector2::new(0.0, -72.5).normalized().unwrap();
        assert_eq!(n, Vector2::new(0.0, -1.0));
        let d = Vector2::new(3.0, 4.0).normalized().unwrap();
        assert!((d.length() - 1.0).abs() < 1e-6);
    }
}
