//! Common components used across agent types.

use std::collections::VecDeque;

use hamlet_logic::vector::Vec2;
use serde::{Deserialize, Serialize};

/// World-space position of an entity.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Position(pub Vec2);

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self(Vec2::new(x, y))
    }
}

/// Velocity/acceleration state for steered agents.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Motion {
    pub velocity: Vec2,
    /// Steering forces accumulated this tick; cleared after integration.
    pub acceleration: Vec2,
    pub max_speed: f32,
    pub max_force: f32,
}

impl Motion {
    pub fn new(max_speed: f32, max_force: f32) -> Self {
        Self {
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            max_speed,
            max_force,
        }
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    pub fn apply_force(&mut self, force: Vec2) {
        self.acceleration += force;
    }

    /// Zero velocity and any pending forces.
    pub fn halt(&mut self) {
        self.velocity = Vec2::ZERO;
        self.acceleration = Vec2::ZERO;
    }
}

/// Bounded movement history for trail rendering (oldest first).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Trail {
    points: VecDeque<Vec2>,
    capacity: usize,
}

impl Trail {
    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a point, dropping the oldest on overflow.
    pub fn push(&mut self, point: Vec2) {
        if self.capacity == 0 {
            return;
        }
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<Vec2> {
        self.points.back().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vec2> {
        self.points.iter()
    }
}

/// Fixed-interval scheduler: fires once every `interval` calls to [`Cadence::tick`].
///
/// Replaces `frame % n == 0` gating so each agent can run on its own phase.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cadence {
    pub interval: u32,
    /// Ticks left until the next firing.
    pub countdown: u32,
}

impl Cadence {
    /// Fires on the very first tick, then every `interval` ticks.
    pub fn new(interval: u32) -> Self {
        Self::with_phase(interval, 0)
    }

    /// Fires after `phase` ticks, then every `interval` ticks.
    pub fn with_phase(interval: u32, phase: u32) -> Self {
        let interval = interval.max(1);
        Self {
            interval,
            countdown: phase % interval,
        }
    }

    pub fn tick(&mut self) -> bool {
        if self.countdown == 0 {
            self.countdown = self.interval - 1;
            true
        } else {
            self.countdown -= 1;
            false
        }
    }
}

/// Spawn order, used to update agents in a fixed sequence.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Serial(pub u64);
