//! World-space vector math shared by systems and adapters.
//!
//! Positions and displacements are kept as separate types so that command
//! payloads cannot confuse an absolute location with a velocity. All
//! helpers are plain functions over `f32` pairs; nothing here depends on a
//! rendering backend.

use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// Absolute position expressed in world units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    x: f32,
    y: f32,
}

impl WorldPoint {
    /// Origin of the world coordinate system.
    pub const ORIGIN: Self = Self::new(0.0, 0.0);

    /// Creates a new world position from explicit coordinates.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate in world units.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical coordinate in world units.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Euclidean distance to another position.
    #[must_use]
    pub fn distance(self, other: WorldPoint) -> f32 {
        (other - self).length()
    }

    /// Squared Euclidean distance to another position.
    ///
    /// Cheaper than [`WorldPoint::distance`] and sufficient whenever only
    /// relative ordering matters, such as range checks.
    #[must_use]
    pub fn distance_squared(self, other: WorldPoint) -> f32 {
        (other - self).length_squared()
    }

    /// Interpolates between a previous and current position.
    ///
    /// A factor of `0.0` yields `self`, `1.0` yields `current`. Factors are
    /// clamped so that render interpolation never extrapolates past either
    /// endpoint.
    #[must_use]
    pub fn lerp(self, current: WorldPoint, factor: f32) -> WorldPoint {
        let factor = factor.clamp(0.0, 1.0);
        WorldPoint::new(
            self.x + (current.x - self.x) * factor,
            self.y + (current.y - self.y) * factor,
        )
    }
}

/// Displacement or velocity expressed in world units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldVec {
    x: f32,
    y: f32,
}

impl WorldVec {
    /// Zero-length displacement.
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Creates a new displacement from explicit components.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal component.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical component.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Length of the displacement.
    #[must_use]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Squared length of the displacement.
    #[must_use]
    pub fn length_squared(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    /// Dot product with another displacement.
    #[must_use]
    pub fn dot(self, other: WorldVec) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Scales the displacement to unit length.
    ///
    /// A zero-length input stays zero instead of producing NaN components.
    #[must_use]
    pub fn normalize(self) -> WorldVec {
        let length = self.length();
        if length <= f32::EPSILON {
            return WorldVec::ZERO;
        }
        WorldVec::new(self.x / length, self.y / length)
    }
}

impl Sub for WorldPoint {
    type Output = WorldVec;

    fn sub(self, rhs: WorldPoint) -> WorldVec {
        WorldVec::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Add<WorldVec> for WorldPoint {
    type Output = WorldPoint;

    fn add(self, rhs: WorldVec) -> WorldPoint {
        WorldPoint::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign<WorldVec> for WorldPoint {
    fn add_assign(&mut self, rhs: WorldVec) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Add for WorldVec {
    type Output = WorldVec;

    fn add(self, rhs: WorldVec) -> WorldVec {
        WorldVec::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for WorldVec {
    type Output = WorldVec;

    fn sub(self, rhs: WorldVec) -> WorldVec {
        WorldVec::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for WorldVec {
    type Output = WorldVec;

    fn mul(self, rhs: f32) -> WorldVec {
        WorldVec::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f32> for WorldVec {
    type Output = WorldVec;

    fn div(self, rhs: f32) -> WorldVec {
        WorldVec::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for WorldVec {
    type Output = WorldVec;

    fn neg(self) -> WorldVec {
        WorldVec::new(-self.x, -self.y)
    }
}

/// Converts an angle in degrees into a unit direction vector.
///
/// Zero degrees points along the positive x axis; angles grow clockwise in
/// the screen coordinate system where y increases downward.
#[must_use]
pub fn angle_to_vector(angle_degrees: f32) -> WorldVec {
    let radians = angle_degrees.to_radians();
    WorldVec::new(radians.cos(), radians.sin())
}

/// Predicts where a projectile fired now will meet a moving target.
///
/// The target is assumed to travel with constant `target_velocity` while the
/// projectile flies in a straight line at `projectile_speed` from
/// `shooter`. Returns the aim point, or `None` when no interception is
/// possible: the projectile speed is non-positive, the target outruns the
/// projectile, or every solution lies in the past.
#[must_use]
pub fn predict_intercept(
    shooter: WorldPoint,
    target_position: WorldPoint,
    target_velocity: WorldVec,
    projectile_speed: f32,
) -> Option<WorldPoint> {
    if projectile_speed <= 0.0 {
        return None;
    }

    let to_target = target_position - shooter;

    // Solve |to_target + v*t| = s*t for the flight time t.
    let a = target_velocity.length_squared() - projectile_speed * projectile_speed;
    let b = 2.0 * to_target.dot(target_velocity);
    let c = to_target.length_squared();

    let time = if a.abs() <= f32::EPSILON {
        // Target and projectile speeds match; the equation degenerates to
        // b*t + c = 0, solvable only when the target closes the gap.
        if b >= 0.0 {
            if c <= f32::EPSILON {
                Some(0.0)
            } else {
                None
            }
        } else {
            Some(-c / b)
        }
    } else {
        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            None
        } else {
            let root = discriminant.sqrt();
            let t1 = (-b - root) / (2.0 * a);
            let t2 = (-b + root) / (2.0 * a);
            earliest_non_negative(t1, t2)
        }
    };

    time.map(|t| target_position + target_velocity * t)
}

fn earliest_non_negative(t1: f32, t2: f32) -> Option<f32> {
    let (low, high) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };
    if low >= 0.0 {
        Some(low)
    } else if high >= 0.0 {
        Some(high)
    } else {
        None
    }
}
