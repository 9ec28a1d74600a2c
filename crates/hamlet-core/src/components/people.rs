//! Agent components: Citizen, Organism, Needs, Behavior, Inventory.

use hamlet_logic::constants::needs::{MAX_ENERGY, MAX_FULLNESS};
use hamlet_logic::forage::VisitMemory;
use hamlet_logic::utility::Motivation;
use hamlet_logic::vector::Vec2;
use hecs::Entity;
use serde::{Deserialize, Serialize};

use super::Cadence;

/// Marker + per-citizen bookkeeping.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Citizen {
    /// Ticks lived.
    pub age: u64,
    /// Body diameter, used for food overlap.
    pub size: f32,
    /// Search radius for food, wood and building sites.
    pub perception: f32,
    pub decision: Cadence,
}

/// Needs that drive behavior.
///
/// Unlike most need models these count *up* toward satisfaction:
/// energy and fullness live in 0..=100, boredom in 0..=max_boredom.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Needs {
    pub energy: f32,
    pub fullness: f32,
    pub boredom: f32,
    pub max_boredom: f32,
}

impl Default for Needs {
    fn default() -> Self {
        Self {
            energy: 50.0,
            fullness: 50.0,
            boredom: 0.0,
            max_boredom: 100.0,
        }
    }
}

impl Needs {
    /// Clamp every need into its valid range.
    pub fn clamp(&mut self) {
        self.energy = clamp_finite(self.energy, 0.0, MAX_ENERGY);
        self.fullness = clamp_finite(self.fullness, 0.0, MAX_FULLNESS);
        self.boredom = clamp_finite(self.boredom, 0.0, self.max_boredom);
    }

    pub fn eat(&mut self, nutrition: f32) {
        self.fullness += nutrition;
        self.clamp();
    }

    pub fn is_within_bounds(&self) -> bool {
        (0.0..=MAX_ENERGY).contains(&self.energy)
            && (0.0..=MAX_FULLNESS).contains(&self.fullness)
            && (0.0..=self.max_boredom).contains(&self.boredom)
    }
}

/// `clamp` that maps NaN to the lower bound.
fn clamp_finite(value: f32, lo: f32, hi: f32) -> f32 {
    if value.is_nan() {
        lo
    } else {
        value.clamp(lo, hi)
    }
}

/// Carried goods.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Inventory {
    pub wood: f32,
    pub wood_capacity: f32,
}

impl Inventory {
    pub fn new(wood_capacity: f32) -> Self {
        Self {
            wood: 0.0,
            wood_capacity,
        }
    }

    pub fn is_full(&self) -> bool {
        self.wood >= self.wood_capacity
    }

    /// Add wood up to capacity and return the overflow.
    pub fn add_wood(&mut self, amount: f32) -> f32 {
        let room = (self.wood_capacity - self.wood).max(0.0);
        let taken = amount.max(0.0).min(room);
        self.wood += taken;
        amount.max(0.0) - taken
    }

    /// Remove up to `amount` wood and return what was taken.
    pub fn take_wood(&mut self, amount: f32) -> f32 {
        let taken = amount.max(0.0).min(self.wood);
        self.wood -= taken;
        taken
    }
}

/// What an agent is steering toward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Target {
    /// A free point (wander destination).
    Point(Vec2),
    /// A resource node or house entity.
    Node(Entity),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeathCause {
    Starvation,
    Boredom,
}

/// Terminal state: position frozen, only the animation timer runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Death {
    pub cause: DeathCause,
    /// Ticks since death, saturating at the animation length.
    pub ticks: u32,
}

/// Current behavior of a citizen. Variants are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Behavior {
    #[default]
    Idle,
    /// `forced` when triggered by exhaustion rather than chosen.
    Resting { forced: bool },
    /// Circling its own current position.
    Exercising,
    SeekingFood { target: Option<Target> },
    CollectingWood { target: Option<Target> },
    Constructing { target: Option<Target> },
    Dead(Death),
}

impl Behavior {
    /// Fresh behavior state for a motivation.
    pub fn for_motivation(motivation: Motivation) -> Self {
        match motivation {
            Motivation::Rest => Behavior::Resting { forced: false },
            Motivation::Exercise => Behavior::Exercising,
            Motivation::SeekFood => Behavior::SeekingFood { target: None },
            Motivation::CollectWood => Behavior::CollectingWood { target: None },
            Motivation::BuildHouse => Behavior::Constructing { target: None },
            Motivation::Idle => Behavior::Idle,
        }
    }

    /// Motivation this behavior serves; `None` once dead.
    pub fn motivation(&self) -> Option<Motivation> {
        match self {
            Behavior::Idle => Some(Motivation::Idle),
            Behavior::Resting { .. } => Some(Motivation::Rest),
            Behavior::Exercising => Some(Motivation::Exercise),
            Behavior::SeekingFood { .. } => Some(Motivation::SeekFood),
            Behavior::CollectingWood { .. } => Some(Motivation::CollectWood),
            Behavior::Constructing { .. } => Some(Motivation::BuildHouse),
            Behavior::Dead(_) => None,
        }
    }

    pub fn is_dead(&self) -> bool {
        matches!(self, Behavior::Dead(_))
    }

    pub fn is_resting(&self) -> bool {
        matches!(self, Behavior::Resting { .. })
    }

    pub fn is_forced_rest(&self) -> bool {
        matches!(self, Behavior::Resting { forced: true })
    }

    pub fn target(&self) -> Option<Target> {
        match self {
            Behavior::SeekingFood { target }
            | Behavior::CollectingWood { target }
            | Behavior::Constructing { target } => *target,
            _ => None,
        }
    }

    /// Replace the target of a targeting behavior; no-op for the others.
    pub fn set_target(&mut self, new: Option<Target>) {
        match self {
            Behavior::SeekingFood { target }
            | Behavior::CollectingWood { target }
            | Behavior::Constructing { target } => *target = new,
            _ => {}
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Behavior::Idle => "idle",
            Behavior::Resting { .. } => "resting",
            Behavior::Exercising => "exercising",
            Behavior::SeekingFood { .. } => "seeking food",
            Behavior::CollectingWood { .. } => "collecting wood",
            Behavior::Constructing { .. } => "constructing",
            Behavior::Dead(_) => "dead",
        }
    }
}

/// Grid-stepping forager from the terrain sketches.
#[derive(Debug, Clone)]
pub struct Organism {
    pub energy: f32,
    pub max_energy: f32,
    pub move_count: u32,
    pub last_direction: Option<usize>,
    pub memory: VisitMemory,
    pub movement: Cadence,
    pub death: Option<Death>,
}

impl Organism {
    pub fn is_dead(&self) -> bool {
        self.death.is_some()
    }
}
