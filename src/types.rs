use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing at `angle` radians.
    pub fn from_angle(angle: f32) -> Self {
        Self::new(angle.cos(), angle.sin())
    }

    pub fn length_sq(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    pub fn length(self) -> f32 {
        self.length_sq().sqrt()
    }

    pub fn distance(self, other: Vec2) -> f32 {
        (other - self).length()
    }

    pub fn normalize(self) -> Vec2 {
        let len = self.length();
        if len > 0.0 {
            Vec2::new(self.x / len, self.y / len)
        } else {
            Vec2::ZERO
        }
    }

    pub fn dot(self, other: Vec2) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Rotates the vector a quarter turn counter-clockwise.
    pub fn perp(self) -> Vec2 {
        Vec2::new(-self.y, self.x)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Vec2) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Mul<Vec2> for f32 {
    type Output = Vec2;

    fn mul(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self * rhs.x, self * rhs.y)
    }
}

impl Div<f32> for Vec2 {
    type Output = Vec2;

    fn div(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;

    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

pub type ParticleId = u64;
pub type FieldId = u64;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rrggbb` or `rrggbb`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
        Some(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Scales every channel by `factor` clamped into [0, 1].
    pub fn dimmed(self, factor: f32) -> Self {
        let f = factor.clamp(0.0, 1.0);
        let scale = |c: u8| (c as f32 * f).round() as u8;
        Self::rgb(scale(self.r), scale(self.g), scale(self.b))
    }
}

/// Axis-aligned simulation rectangle anchored at its top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// True when `pos` lies inside the rectangle grown by `margin` on every side.
    pub fn contains_with_margin(&self, pos: Vec2, margin: f32) -> bool {
        pos.x >= self.left() - margin
            && pos.x <= self.right() + margin
            && pos.y >= self.top() - margin
            && pos.y <= self.bottom() + margin
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new(0.0, 0.0, 800.0, 600.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod vec2_new {
        use super::*;

        #[test]
        fn creates_vector_with_given_coordinates() {
            let v = Vec2::new(3.0, 4.0);
            assert_eq!(v.x, 3.0);
            assert_eq!(v.y, 4.0);
        }

        #[test]
        fn zero_constant_is_origin() {
            assert_eq!(Vec2::ZERO.x, 0.0);
            assert_eq!(Vec2::ZERO.y, 0.0);
        }

        #[test]
        fn from_angle_is_unit_length() {
            let v = Vec2::from_angle(1.2);
            assert!((v.length() - 1.0).abs() < 1e-6);
        }
    }

    mod vec2_length {
        use super::*;

        #[test]
        fn calculates_length() {
            let v = Vec2::new(3.0, 4.0);
            assert_eq!(v.length_sq(), 25.0);
            assert_eq!(v.length(), 5.0);
        }

        #[test]
        fn distance_is_symmetric() {
            let a = Vec2::new(1.0, 1.0);
            let b = Vec2::new(4.0, 5.0);
            assert_eq!(a.distance(b), 5.0);
            assert_eq!(b.distance(a), 5.0);
        }
    }

    mod vec2_normalize {
        use super::*;

        #[test]
        fn normalizes_non_zero_vector() {
            let v = Vec2::new(3.0, 4.0).normalize();
            assert!((v.x - 0.6).abs() < 1e-6);
            assert!((v.y - 0.8).abs() < 1e-6);
        }

        #[test]
        fn zero_vector_normalizes_to_zero() {
            assert_eq!(Vec2::ZERO.normalize(), Vec2::ZERO);
        }
    }

    mod vec2_perp {
        use super::*;

        #[test]
        fn is_orthogonal_to_source() {
            let v = Vec2::new(2.0, 3.0);
            assert_eq!(v.dot(v.perp()), 0.0);
            assert_eq!(v.perp(), Vec2::new(-3.0, 2.0));
        }
    }

    mod vec2_ops {
        use super::*;

        #[test]
        fn arithmetic_operators() {
            let mut a = Vec2::new(1.0, 2.0);
            a += Vec2::new(3.0, 4.0);
            assert_eq!(a, Vec2::new(4.0, 6.0));
            a -= Vec2::new(1.0, 1.0);
            assert_eq!(a, Vec2::new(3.0, 5.0));
            assert_eq!(a * 2.0, Vec2::new(6.0, 10.0));
            assert_eq!(2.0 * a, Vec2::new(6.0, 10.0));
            assert_eq!(a / 2.0, Vec2::new(1.5, 2.5));
            assert_eq!(-a, Vec2::new(-3.0, -5.0));
        }
    }

    mod color {
        use super::*;

        #[test]
        fn parses_hex_with_and_without_hash() {
            assert_eq!(Color::from_hex("#ff8000"), Some(Color::rgb(255, 128, 0)));
            assert_eq!(Color::from_hex("00ff10"), Some(Color::rgb(0, 255, 16)));
        }

        #[test]
        fn rejects_malformed_hex() {
            assert_eq!(Color::from_hex("#fff"), None);
            assert_eq!(Color::from_hex("#gggggg"), None);
        }

        #[test]
        fn dimmed_scales_channels() {
            assert_eq!(Color::rgb(200, 100, 0).dimmed(0.5), Color::rgb(100, 50, 0));
            assert_eq!(Color::WHITE.dimmed(2.0), Color::WHITE);
        }
    }

    mod bounds {
        use super::*;

        #[test]
        fn center_of_default_bounds() {
            assert_eq!(Bounds::default().center(), Vec2::new(400.0, 300.0));
        }

        #[test]
        fn margin_expands_containment() {
            let bounds = Bounds::new(0.0, 0.0, 10.0, 10.0);
            let outside = Vec2::new(-3.0, 5.0);
            assert!(!bounds.contains_with_margin(outside, 2.0));
            assert!(bounds.contains_with_margin(outside, 4.0));
        }
    }
}
