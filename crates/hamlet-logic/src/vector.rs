//! 2D vector math for positions, velocities and steering forces.

use serde::{Deserialize, Serialize};

/// 2D vector in world units (pixels of the original canvas).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing at `angle` radians.
    pub fn from_angle(angle: f32) -> Self {
        Self {
            x: angle.cos(),
            y: angle.sin(),
        }
    }

    pub fn length_squared(&self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    pub fn length(&self) -> f32 {
        self.length_squared().sqrt()
    }

    pub fn distance_squared(&self, other: &Self) -> f32 {
        (*self - *other).length_squared()
    }

    pub fn distance(&self, other: &Self) -> f32 {
        self.distance_squared(other).sqrt()
    }

    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0 {
            Self {
                x: self.x / len,
                y: self.y / len,
            }
        } else {
            Self::ZERO
        }
    }

    /// Scale down to `max` if longer, keeping direction.
    pub fn clamp_length(&self, max: f32) -> Self {
        let len_sq = self.length_squared();
        if len_sq > max * max && len_sq > 0.0 {
            *self * (max / len_sq.sqrt())
        } else {
            *self
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl std::ops::AddAssign for Vec2 {
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, scalar: f32) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }
}

/// Linear remap of `value` from `[in_lo, in_hi]` to `[out_lo, out_hi]` (unclamped).
pub fn map_range(value: f32, in_lo: f32, in_hi: f32, out_lo: f32, out_hi: f32) -> f32 {
    if (in_hi - in_lo).abs() < f32::EPSILON {
        return out_lo;
    }
    out_lo + (value - in_lo) * (out_hi - out_lo) / (in_hi - in_lo)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec2_operations() {
        let a = Vec2::new(1.0, 2.0);
        let b = Vec2::new(4.0, 6.0);

        let sum = a + b;
        assert_eq!(sum, Vec2::new(5.0, 8.0));
        assert_eq!(b - a, Vec2::new(3.0, 4.0));
        assert_eq!(a * 2.0, Vec2::new(2.0, 4.0));
        assert!((a.distance(&b) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_zero_is_zero() {
        assert_eq!(Vec2::ZERO.normalize(), Vec2::ZERO);
        let n = Vec2::new(3.0, 4.0).normalize();
        assert!((n.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_clamp_length() {
        let v = Vec2::new(3.0, 4.0).clamp_length(1.0);
        assert!((v.length() - 1.0).abs() < 1e-6);
        let short = Vec2::new(0.1, 0.0);
        assert_eq!(short.clamp_length(1.0), short);
    }

    #[test]
    fn test_map_range() {
        assert!((map_range(50.0, 0.0, 100.0, 0.5, 1.5) - 1.0).abs() < 1e-6);
        assert!((map_range(0.0, 0.0, 100.0, 0.5, 1.5) - 0.5).abs() < 1e-6);
        assert_eq!(map_range(3.0, 1.0, 1.0, 7.0, 9.0), 7.0);
    }
}
