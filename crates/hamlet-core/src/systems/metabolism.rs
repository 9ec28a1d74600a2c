//! Needs bookkeeping for citizens: energy, fullness, boredom, death.

use hamlet_logic::constants::needs::*;

use crate::components::{Behavior, DeathCause, Needs};
use crate::config::CitizenConfig;

/// Passive energy drain plus digestion of fullness into energy.
pub fn metabolize(needs: &mut Needs, params: &CitizenConfig) {
    needs.energy -= params.energy_decay_rate;
    if needs.fullness > 0.0 {
        let digested = DIGESTION_AMOUNT.min(needs.fullness);
        needs.fullness -= digested;
        needs.energy += digested * DIGESTION_EFFICIENCY;
    }
    needs.clamp();
}

/// Exhaustion forces a rest unless one is already forced.
pub fn needs_forced_rest(needs: &Needs, behavior: &Behavior, rest_threshold: f32) -> bool {
    needs.energy < rest_threshold && !behavior.is_forced_rest() && !behavior.is_dead()
}

/// Energy recovery while resting, with a small digestion bonus.
pub fn recover(needs: &mut Needs) {
    needs.energy += REST_RECOVERY_RATE;
    if needs.fullness > 0.0 {
        let digested = REST_DIGESTION_BONUS.min(needs.fullness);
        needs.fullness -= digested;
        needs.energy += digested * REST_DIGESTION_EFFICIENCY;
    }
    needs.clamp();
}

pub fn rest_finished(needs: &Needs, rest_threshold: f32) -> bool {
    needs.energy > rest_threshold * REST_EXIT_FACTOR
}

/// Standing still is boring; moving works it off in proportion to speed.
pub fn update_boredom(needs: &mut Needs, speed: f32, increase_rate: f32) {
    if speed < STILL_SPEED {
        needs.boredom += increase_rate;
    } else {
        needs.boredom -= speed * BOREDOM_MOVING_DECAY;
    }
    needs.clamp();
}

pub fn apply_movement_cost(needs: &mut Needs, speed: f32) {
    needs.energy -= speed * MOVEMENT_ENERGY_COST;
    needs.clamp();
}

/// Starvation is checked before boredom.
pub fn check_death(needs: &Needs) -> Option<DeathCause> {
    if needs.energy <= 0.0 {
        Some(DeathCause::Starvation)
    } else if needs.boredom >= needs.max_boredom {
        Some(DeathCause::Boredom)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn needs(energy: f32, fullness: f32, boredom: f32) -> Needs {
        Needs {
            energy,
            fullness,
            boredom,
            max_boredom: 100.0,
        }
    }

    #[test]
    fn test_metabolize_digests() {
        let mut n = needs(50.0, 50.0, 0.0);
        metabolize(&mut n, &CitizenConfig::default());
        assert!((n.energy - (50.0 - 0.01 + 0.016)).abs() < 1e-4);
        assert!((n.fullness - 49.98).abs() < 1e-4);
    }

    #[test]
    fn test_metabolize_empty_stomach() {
        let mut n = needs(0.005, 0.0, 0.0);
        metabolize(&mut n, &CitizenConfig::default());
        assert_eq!(n.energy, 0.0);
        assert_eq!(n.fullness, 0.0);
        assert_eq!(check_death(&n), Some(DeathCause::Starvation));
    }

    #[test]
    fn test_forced_rest_threshold() {
        let n = needs(5.0, 50.0, 0.0);
        assert!(needs_forced_rest(&n, &Behavior::Idle, 10.0));
        assert!(!needs_forced_rest(&n, &Behavior::Resting { forced: true }, 10.0));
        assert!(needs_forced_rest(&n, &Behavior::Resting { forced: false }, 10.0));
        assert!(!needs_forced_rest(&needs(12.0, 0.0, 0.0), &Behavior::Idle, 10.0));
    }

    #[test]
    fn test_recover_and_exit() {
        let mut n = needs(29.95, 10.0, 0.0);
        recover(&mut n);
        assert!((n.energy - (29.95 + 0.1 + 0.027)).abs() < 1e-4);
        assert!(rest_finished(&n, 10.0));
    }

    #[test]
    fn test_boredom() {
        let mut n = needs(50.0, 50.0, 10.0);
        update_boredom(&mut n, 0.0, 0.05);
        assert!((n.boredom - 10.05).abs() < 1e-5);
        update_boredom(&mut n, 1.0, 0.05);
        assert!((n.boredom - 9.95).abs() < 1e-4);

        let mut bored = needs(50.0, 50.0, 99.98);
        update_boredom(&mut bored, 0.0, 0.05);
        assert_eq!(bored.boredom, 100.0);
        assert_eq!(check_death(&bored), Some(DeathCause::Boredom));
    }
}
