//! Pure steering logic: seek/arrive, wander, boundary avoidance.
//!
//! Forces are accumulated into an acceleration by the caller, then
//! [`integrate`] applies them once per tick:
//! 1. `velocity += acceleration`, limited to `max_speed`
//! 2. If the next position would leave the inner 12%-88% box, push toward
//!    the world center and recompute
//! 3. `position += velocity`; the caller resets acceleration

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::steering::*;
use crate::vector::{map_range, Vec2};

/// World extent, origin at (0, 0).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            width: 500.0,
            height: 500.0,
        }
    }
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Clamp a point into `[inset, 1 - inset]` of the extent on both axes.
    pub fn clamp_inset(&self, point: Vec2, inset: f32) -> Vec2 {
        Vec2::new(
            point.x.clamp(self.width * inset, self.width * (1.0 - inset)),
            point.y.clamp(self.height * inset, self.height * (1.0 - inset)),
        )
    }

    pub fn inside_inset(&self, point: Vec2, inset: f32) -> bool {
        point.x >= self.width * inset
            && point.x <= self.width * (1.0 - inset)
            && point.y >= self.height * inset
            && point.y <= self.height * (1.0 - inset)
    }

    /// Toroidal wrap into `[0, width) x [0, height)`.
    pub fn wrap(&self, point: Vec2) -> Vec2 {
        Vec2::new(point.x.rem_euclid(self.width), point.y.rem_euclid(self.height))
    }
}

/// Steering force toward `target`, slowing down inside the arrival radius.
pub fn seek(position: Vec2, velocity: Vec2, target: Vec2, max_speed: f32, max_force: f32) -> Vec2 {
    let offset = target - position;
    let distance = offset.length();
    if distance <= f32::EPSILON {
        // Already there: brake.
        return (Vec2::ZERO - velocity).clamp_length(max_force);
    }
    let speed = if distance < ARRIVAL_RADIUS {
        map_range(distance, 0.0, ARRIVAL_RADIUS, ARRIVAL_MIN_SPEED, max_speed)
    } else {
        max_speed
    };
    let desired = offset.normalize() * speed;
    (desired - velocity).clamp_length(max_force)
}

/// Random point `WANDER_DISTANCE` away, kept inside the 15%-85% box.
pub fn wander_target(position: Vec2, bounds: &Bounds, rng: &mut impl Rng) -> Vec2 {
    let angle = rng.gen_range(0.0..std::f32::consts::TAU);
    let point = position + Vec2::from_angle(angle) * WANDER_DISTANCE;
    bounds.clamp_inset(point, WANDER_INSET)
}

/// Point on a circle around `center`, parameterized by a tick counter.
pub fn orbit_point(center: Vec2, radius: f32, angular_speed: f32, tick: u64) -> Vec2 {
    // Keep the angle small so f32 precision does not degrade on long runs.
    let angle = ((tick as f64 * angular_speed as f64) % std::f64::consts::TAU) as f32;
    center + Vec2::from_angle(angle) * radius
}

/// Result of one integration step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Integrated {
    pub position: Vec2,
    pub velocity: Vec2,
}

/// Apply acceleration, clamp speed, avoid the world edge and move.
pub fn integrate(position: Vec2, velocity: Vec2, acceleration: Vec2, max_speed: f32, bounds: &Bounds) -> Integrated {
    let mut velocity = (velocity + acceleration).clamp_length(max_speed);
    let mut next = position + velocity;

    if !bounds.inside_inset(next, BOUNDARY_INSET) {
        let center_force = (bounds.center() - position).normalize() * BOUNDARY_FORCE;
        velocity = (velocity + center_force).clamp_length(max_speed);
        next = position + velocity;
    }

    if !next.is_finite() {
        return Integrated {
            position,
            velocity: Vec2::ZERO,
        };
    }

    Integrated {
        position: next,
        velocity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_seek_far_target_full_speed() {
        let force = seek(Vec2::ZERO, Vec2::ZERO, Vec2::new(500.0, 0.0), 1.5, 10.0);
        assert!((force.x - 1.5).abs() < 1e-5);
        assert!(force.y.abs() < 1e-6);
    }

    #[test]
    fn test_seek_slows_on_arrival() {
        // Distance 50 -> desired speed halfway between 0.5 and 1.5.
        let force = seek(Vec2::ZERO, Vec2::ZERO, Vec2::new(50.0, 0.0), 1.5, 10.0);
        assert!((force.x - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_seek_force_is_clamped() {
        let force = seek(Vec2::ZERO, Vec2::new(-1.5, 0.0), Vec2::new(500.0, 0.0), 1.5, 0.2);
        assert!((force.length() - 0.2).abs() < 1e-5);
    }

    #[test]
    fn test_seek_at_target_brakes() {
        let force = seek(Vec2::new(3.0, 3.0), Vec2::new(1.0, 0.0), Vec2::new(3.0, 3.0), 1.5, 0.2);
        assert!(force.x < 0.0);
    }

    #[test]
    fn test_wander_target_stays_inset() {
        let bounds = Bounds::new(500.0, 400.0);
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..200 {
            let t = wander_target(Vec2::new(10.0, 390.0), &bounds, &mut rng);
            assert!(t.x >= 75.0 && t.x <= 425.0);
            assert!(t.y >= 60.0 && t.y <= 340.0);
        }
    }

    #[test]
    fn test_integrate_limits_speed() {
        let bounds = Bounds::default();
        let out = integrate(bounds.center(), Vec2::new(1.0, 0.0), Vec2::new(5.0, 0.0), 1.5, &bounds);
        assert!((out.velocity.length() - 1.5).abs() < 1e-5);
        assert!((out.position.x - 251.5).abs() < 1e-4);
    }

    #[test]
    fn test_integrate_steers_back_from_edge() {
        let bounds = Bounds::default();
        // Heading out of the left edge at full speed.
        let out = integrate(Vec2::new(60.5, 250.0), Vec2::new(-1.5, 0.0), Vec2::ZERO, 1.5, &bounds);
        assert!(out.velocity.x > -1.5);
        assert!(out.position.x > 59.0);
    }

    #[test]
    fn test_orbit_point_radius() {
        let c = Vec2::new(100.0, 100.0);
        for tick in [0u64, 7, 1_000_000] {
            let p = orbit_point(c, 30.0, 0.05, tick);
            assert!((p.distance(&c) - 30.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_bounds_wrap() {
        let b = Bounds::new(100.0, 50.0);
        assert_eq!(b.wrap(Vec2::new(-5.0, 55.0)), Vec2::new(95.0, 5.0));
    }
}
