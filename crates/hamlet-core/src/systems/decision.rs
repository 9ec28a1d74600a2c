//! Utility-AI glue: build the scoring input for a citizen from world state.

use hamlet_logic::utility::{
    score_motivations, select_motivation, Hysteresis, Motivation, MotivationInput, MotivationScores,
};
use hecs::{Entity, World};

use crate::components::{House, Inventory, Needs};
use crate::config::CitizenConfig;

/// Which houses an agent currently owns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HouseOwnership {
    pub incomplete: bool,
    pub complete: bool,
}

impl HouseOwnership {
    pub fn of(world: &World, agent: Entity) -> Self {
        let mut ownership = Self::default();
        for (_, house) in world.query::<&House>().iter() {
            if house.is_owned_by(agent) {
                if house.is_complete {
                    ownership.complete = true;
                } else {
                    ownership.incomplete = true;
                }
            }
        }
        ownership
    }

    pub fn owns_any(&self) -> bool {
        self.incomplete || self.complete
    }
}

pub fn motivation_input(
    needs: &Needs,
    inventory: &Inventory,
    ownership: HouseOwnership,
    params: &CitizenConfig,
) -> MotivationInput {
    MotivationInput {
        energy: needs.energy,
        fullness: needs.fullness,
        boredom: needs.boredom,
        max_boredom: needs.max_boredom,
        rest_threshold: params.rest_threshold,
        wood: inventory.wood,
        wood_capacity: inventory.wood_capacity,
        owns_incomplete_house: ownership.incomplete,
        owns_complete_house: ownership.complete,
    }
}

pub fn hysteresis(params: &CitizenConfig) -> Hysteresis {
    Hysteresis {
        bonus: params.hysteresis_bonus,
        change_threshold: params.change_threshold,
    }
}

/// Score every motivation and pick one, favoring `current`.
pub fn evaluate(
    input: &MotivationInput,
    current: Option<Motivation>,
    hysteresis: &Hysteresis,
) -> (MotivationScores, Motivation) {
    let scores = score_motivations(input);
    let choice = select_motivation(&scores, current, hysteresis);
    (scores, choice)
}
