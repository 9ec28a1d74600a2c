//! Organism foraging: one grid step at a time over the 8-neighborhood.
//!
//! Each step weighs the neighbors by resource gain, discourages cells
//! visited recently, rewards keeping the previous heading, and never
//! enters ocean. One step in five is exploratory (uniform among open
//! neighbors). Degenerate weights always resolve to a safe default.

use std::collections::HashMap;

use rand::Rng;

use crate::constants::forage::*;

/// Grid offsets: N, NE, E, SE, S, SW, W, NW.
pub const DIRECTIONS: [(i64, i64); 8] = [
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
];

/// Index of the "stay in place" weight in [`step_weights`] output.
pub const STAY: usize = 8;

/// Outcome of one foraging decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Move one cell along `DIRECTIONS[i]`.
    Move(usize),
    Stay,
}

/// What the organism perceives in one neighboring cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Neighbor {
    Ocean,
    /// Visited within the last half of the memory window.
    Recent,
    /// Open land; `gain` = neighbor resource - current resource.
    Open { gain: f32 },
}

/// Inputs to one step decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForageContext {
    pub neighbors: [Neighbor; 8],
    pub current_resource: f32,
    pub last_direction: Option<usize>,
}

impl ForageContext {
    /// Directions that are neither ocean nor recently visited.
    pub fn open_directions(&self) -> Vec<usize> {
        self.neighbors
            .iter()
            .enumerate()
            .filter(|(_, n)| matches!(n, Neighbor::Open { .. }))
            .map(|(i, _)| i)
            .collect()
    }
}

/// Weights for the 8 directions plus staying (index [`STAY`]).
pub fn step_weights(ctx: &ForageContext) -> [f32; 9] {
    let mut weights = [0.0f32; 9];
    for (i, neighbor) in ctx.neighbors.iter().enumerate() {
        let mut weight = match *neighbor {
            Neighbor::Ocean => continue,
            Neighbor::Recent => RECENT_WEIGHT,
            Neighbor::Open { gain } if gain > 0.0 => 1.0 + gain * GAIN_WEIGHT,
            Neighbor::Open { gain } => 1.0 + gain * LOSS_WEIGHT,
        };
        if ctx.last_direction == Some(i) {
            weight *= MOMENTUM_FACTOR;
        }
        weights[i] = weight.max(MIN_WEIGHT);
    }
    let poor = if ctx.current_resource < POOR_RESOURCE {
        POOR_STAY_FACTOR
    } else {
        1.0
    };
    weights[STAY] = STAY_WEIGHT * poor;
    weights
}

/// Roulette-wheel pick: first index whose cumulative weight reaches
/// `roll * total`. `None` if the total is not a positive finite number.
pub fn weighted_index(weights: &[f32], roll: f32) -> Option<usize> {
    let total: f32 = weights.iter().filter(|w| w.is_finite() && **w > 0.0).sum();
    if !(total.is_finite() && total > 0.0) {
        return None;
    }
    let target = roll.clamp(0.0, 1.0) * total;
    let mut cumulative = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        if !(w.is_finite() && w > 0.0) {
            continue;
        }
        cumulative += w;
        if target <= cumulative {
            return Some(i);
        }
    }
    None
}

/// Choose the next step. Never returns a move into ocean.
pub fn choose_step(ctx: &ForageContext, rng: &mut impl Rng) -> Step {
    let open = ctx.open_directions();
    let Some(&first_open) = open.first() else {
        return Step::Stay;
    };

    if rng.gen_bool(EXPLORE_CHANCE) {
        return Step::Move(open[rng.gen_range(0..open.len())]);
    }

    let weights = step_weights(ctx);
    match weighted_index(&weights, rng.gen::<f32>()) {
        Some(STAY) => Step::Stay,
        Some(i) => Step::Move(i),
        None => Step::Move(first_open),
    }
}

/// Short-term memory of visited cells, keyed by grid index.
#[derive(Debug, Clone, Default)]
pub struct VisitMemory {
    visits: HashMap<(usize, usize), u32>,
    duration: u32,
}

impl VisitMemory {
    pub fn new(duration: u32) -> Self {
        Self {
            visits: HashMap::new(),
            duration,
        }
    }

    /// Mark `cell` as visited at `move_count` and forget expired cells.
    pub fn record(&mut self, cell: (usize, usize), move_count: u32) {
        self.visits.insert(cell, move_count);
        let duration = self.duration;
        self.visits
            .retain(|_, &mut visited| move_count.saturating_sub(visited) <= duration);
    }

    /// Visited within the last half of the memory window.
    pub fn is_recent(&self, cell: (usize, usize), move_count: u32) -> bool {
        self.visits
            .get(&cell)
            .is_some_and(|&visited| move_count.saturating_sub(visited) < self.duration / 2)
    }

    pub fn len(&self) -> usize {
        self.visits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visits.is_empty()
    }
}
