//! Pure utility AI: motivation scoring with hysteresis-based selection.
//!
//! Each decision cycle every candidate behavior gets a score in roughly
//! 0..100 from the agent's needs and holdings. The incumbent behavior is
//! sticky: a challenger must beat the incumbent's score plus
//! [`HYSTERESIS_BONUS`] plus [`CHANGE_THRESHOLD`] to take over.

use serde::{Deserialize, Serialize};

use crate::constants::motivation::*;
use crate::constants::needs::{MAX_BOREDOM, MAX_ENERGY, MAX_FULLNESS};

/// Behaviors an agent can be motivated toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Motivation {
    Rest,
    Exercise,
    SeekFood,
    CollectWood,
    BuildHouse,
    Idle,
}

impl Motivation {
    /// Fixed evaluation order; earlier entries win exact ties.
    pub const ALL: [Motivation; 6] = [
        Motivation::Rest,
        Motivation::Exercise,
        Motivation::SeekFood,
        Motivation::CollectWood,
        Motivation::BuildHouse,
        Motivation::Idle,
    ];

    pub fn index(self) -> usize {
        match self {
            Motivation::Rest => 0,
            Motivation::Exercise => 1,
            Motivation::SeekFood => 2,
            Motivation::CollectWood => 3,
            Motivation::BuildHouse => 4,
            Motivation::Idle => 5,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Motivation::Rest => "rest",
            Motivation::Exercise => "exercise",
            Motivation::SeekFood => "seekFood",
            Motivation::CollectWood => "collectWood",
            Motivation::BuildHouse => "buildHouse",
            Motivation::Idle => "idle",
        }
    }
}

/// Everything scoring needs: plain data, no world access.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotivationInput {
    pub energy: f32,
    pub fullness: f32,
    pub boredom: f32,
    pub max_boredom: f32,
    pub rest_threshold: f32,
    pub wood: f32,
    pub wood_capacity: f32,
    pub owns_incomplete_house: bool,
    pub owns_complete_house: bool,
}

impl Default for MotivationInput {
    fn default() -> Self {
        Self {
            energy: MAX_ENERGY,
            fullness: MAX_FULLNESS,
            boredom: 0.0,
            max_boredom: MAX_BOREDOM,
            rest_threshold: crate::constants::needs::REST_THRESHOLD,
            wood: 0.0,
            wood_capacity: crate::constants::behavior::WOOD_CAPACITY,
            owns_incomplete_house: false,
            owns_complete_house: false,
        }
    }
}

/// Score per motivation, indexed by [`Motivation::index`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MotivationScores {
    values: [f32; 6],
}

impl MotivationScores {
    pub fn get(&self, motivation: Motivation) -> f32 {
        self.values[motivation.index()]
    }

    pub fn set(&mut self, motivation: Motivation, score: f32) {
        self.values[motivation.index()] = score;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Motivation, f32)> + '_ {
        Motivation::ALL.iter().map(move |&m| (m, self.get(m)))
    }

    /// Highest finite score in evaluation order (no hysteresis).
    pub fn best(&self) -> Motivation {
        let mut best = Motivation::Idle;
        let mut best_score = f32::NEG_INFINITY;
        for (m, s) in self.iter() {
            if s.is_finite() && s > best_score {
                best = m;
                best_score = s;
            }
        }
        best
    }
}

fn lerp(lo: f32, hi: f32, t: f32) -> f32 {
    lo + (hi - lo) * t.clamp(0.0, 1.0)
}

/// Rest: forced at 100 below the rest threshold, else grows as energy falls.
pub fn rest_score(input: &MotivationInput) -> f32 {
    if input.energy < input.rest_threshold {
        return REST_FORCED_SCORE;
    }
    lerp(0.0, REST_MAX_SCORE, (MAX_ENERGY - input.energy) / MAX_ENERGY)
}

/// Exercise: only with spare energy, ramps up over the upper half of boredom.
pub fn exercise_score(input: &MotivationInput) -> f32 {
    if input.energy < EXERCISE_MIN_ENERGY {
        return 0.0;
    }
    let max = input.max_boredom.max(f32::EPSILON);
    // Boredom expressed on a 0..100 scale regardless of the agent's maximum.
    let boredom = input.boredom / max * 100.0;
    lerp(0.0, EXERCISE_MAX_SCORE, (boredom - EXERCISE_BOREDOM_START) / (100.0 - EXERCISE_BOREDOM_START))
}

pub fn seek_food_score(input: &MotivationInput) -> f32 {
    if input.fullness >= MAX_FULLNESS {
        return 0.0;
    }
    let mut score = lerp(0.0, SEEK_FOOD_MAX_SCORE, (MAX_FULLNESS - input.fullness) / MAX_FULLNESS);
    if input.fullness < STARVING_FULLNESS {
        score += STARVING_BONUS;
    }
    score
}

pub fn collect_wood_score(input: &MotivationInput) -> f32 {
    if input.wood >= input.wood_capacity {
        return 0.0;
    }
    let capacity = input.wood_capacity.max(f32::EPSILON);
    let mut score = lerp(COLLECT_WOOD_MIN_SCORE, COLLECT_WOOD_MAX_SCORE, 1.0 - input.wood / capacity);
    if input.owns_incomplete_house {
        score += COLLECT_WOOD_HOUSE_BONUS;
    }
    if input.fullness < STARVING_FULLNESS || input.energy < TIRED_ENERGY {
        score -= COLLECT_WOOD_TIRED_PENALTY;
    }
    score.max(0.0)
}

pub fn build_house_score(input: &MotivationInput) -> f32 {
    if input.owns_complete_house || input.wood <= 0.0 {
        return 0.0;
    }
    let capacity = input.wood_capacity.max(f32::EPSILON);
    let mut score = BUILD_BASE_SCORE + lerp(0.0, BUILD_WOOD_BONUS, input.wood / capacity);
    if input.owns_incomplete_house {
        score += BUILD_IN_PROGRESS_BONUS;
    }
    score
}

/// Score every motivation for one decision cycle.
pub fn score_motivations(input: &MotivationInput) -> MotivationScores {
    let mut scores = MotivationScores::default();
    scores.set(Motivation::Rest, rest_score(input));
    scores.set(Motivation::Exercise, exercise_score(input));
    scores.set(Motivation::SeekFood, seek_food_score(input));
    scores.set(Motivation::CollectWood, collect_wood_score(input));
    scores.set(Motivation::BuildHouse, build_house_score(input));
    scores.set(Motivation::Idle, IDLE_SCORE);
    scores
}

/// Hysteresis parameters for [`select_motivation`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hysteresis {
    pub bonus: f32,
    pub change_threshold: f32,
}

impl Default for Hysteresis {
    fn default() -> Self {
        Self {
            bonus: HYSTERESIS_BONUS,
            change_threshold: CHANGE_THRESHOLD,
        }
    }
}

/// Pick the next motivation, favoring `current`.
///
/// A challenger replaces the incumbent only when it beats the incumbent's
/// boosted score by more than `change_threshold` and beats every earlier
/// challenger. With no incumbent (or a non-finite incumbent score), the
/// highest finite score wins, falling back to [`Motivation::Idle`].
pub fn select_motivation(scores: &MotivationScores, current: Option<Motivation>, hysteresis: &Hysteresis) -> Motivation {
    let current = match current {
        Some(m) if scores.get(m).is_finite() => m,
        _ => return scores.best(),
    };

    let incumbent_score = scores.get(current) + hysteresis.bonus;
    let bar = incumbent_score + hysteresis.change_threshold;
    let mut best = current;
    let mut best_score = incumbent_score;

    for (candidate, score) in scores.iter() {
        if candidate == current || !score.is_finite() {
            continue;
        }
        if score > bar && score > best_score {
            best = candidate;
            best_score = score;
        }
    }
    best
}
