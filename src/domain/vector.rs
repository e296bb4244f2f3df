//! Plane geometry used to place dependency endpoints on the rim of node circles.

use serde::{Deserialize, Serialize};
use std::ops::Add;

/// A point or direction in the drawing plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
}

/// Absolute position and radius of a rendered node.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Circle {
    pub x: f64,
    pub y: f64,
    pub r: f64,
}

impl Circle {
    pub const fn new(x: f64, y: f64, r: f64) -> Self {
        Self { x, y, r }
    }

    pub const fn center(&self) -> Vector {
        Vector::new(self.x, self.y)
    }

    /// True if one circle lies completely inside the other one.
    pub fn one_is_completely_within_the_other(&self, other: &Circle) -> bool {
        let middle_diff = self.center().distance(other.center());
        middle_diff + self.r.min(other.r) < self.r.max(other.r)
    }
}

impl Vector {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn between(origin: Vector, target: Vector) -> Self {
        Self::new(target.x - origin.x, target.y - origin.y)
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(self, other: Vector) -> f64 {
        Vector::between(self, other).length()
    }

    /// Scales the vector to the given length. A null vector stays null.
    pub fn norm(self, scale: f64) -> Self {
        let length = match self.length() {
            l if l == 0.0 => 1.0,
            l => l,
        };
        Self::new(scale * self.x / length, scale * self.y / length)
    }

    pub fn revert_if(self, condition: bool) -> Self {
        if condition {
            Self::new(-self.x, -self.y)
        } else {
            self
        }
    }

    /// Replaces a null vector by the diagonal (1, 1).
    pub fn default_if_null(self) -> Self {
        if self.x == 0.0 && self.y == 0.0 {
            Self::new(1.0, 1.0)
        } else {
            self
        }
    }

    pub fn orthogonal(self) -> Self {
        Self::new(self.y, -self.x)
    }

    pub fn is_within_circle(self, center: Vector, radius: f64) -> bool {
        self.distance(center) <= radius
    }
}

impl Add for Vector {
    type Output = Vector;

    fn add(self, other: Vector) -> Vector {
        Vector::new(self.x + other.x, self.y + other.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_norm_scales_to_length() {
        let v = Vector::new(3.0, 4.0).norm(10.0);
        assert!((v.x - 6.0).abs() < 1e-9);
        assert!((v.y - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_norm_of_null_vector_stays_null() {
        assert_eq!(Vector::default().norm(5.0), Vector::default());
    }

    #[test]
    fn test_default_if_null() {
        assert_eq!(Vector::default().default_if_null(), Vector::new(1.0, 1.0));
        assert_eq!(Vector::new(0.0, 2.0).default_if_null(), Vector::new(0.0, 2.0));
    }

    #[test]
    fn test_orthogonal_and_revert() {
        assert_eq!(Vector::new(2.0, 3.0).orthogonal(), Vector::new(3.0, -2.0));
        assert_eq!(Vector::new(2.0, 3.0).revert_if(true), Vector::new(-2.0, -3.0));
        assert_eq!(Vector::new(2.0, 3.0).revert_if(false), Vector::new(2.0, 3.0));
    }

    #[test]
    fn test_nested_circles() {
        let outer = Circle::new(50.0, 50.0, 40.0);
        let inner = Circle::new(35.0, 40.0, 15.0);
        let apart = Circle::new(150.0, 50.0, 15.0);
        assert!(outer.one_is_completely_within_the_other(&inner));
        assert!(inner.one_is_completely_within_the_other(&outer));
        assert!(!outer.one_is_completely_within_the_other(&apart));
    }

    #[test]
    fn test_is_within_circle() {
        let point = Vector::new(3.0, 4.0);
        assert!(point.is_within_circle(Vector::default(), 5.0));
        assert!(!point.is_within_circle(Vector::default(), 4.9));
    }
}
