//! Citizen and organism spawning.

use hamlet_logic::forage::VisitMemory;
use hamlet_logic::terrain::TerrainGrid;
use hamlet_logic::utility::MotivationScores;
use hamlet_logic::vector::Vec2;
use hecs::{Entity, World};
use rand::Rng;

use crate::components::*;
use crate::config::SimConfig;

/// Spawn a citizen with randomized starting needs.
///
/// Decision phases are staggered so citizens do not all re-plan on the
/// same tick.
pub fn spawn_citizen(
    world: &mut World,
    spot: Vec2,
    serial: Serial,
    config: &SimConfig,
    rng: &mut impl Rng,
) -> Entity {
    let params = &config.citizen;
    let interval = config.schedule.decision_interval.max(1);
    let citizen = Citizen {
        age: 0,
        size: params.size,
        perception: params.perception,
        decision: Cadence::with_phase(interval, rng.gen_range(0..interval)),
    };
    let needs = Needs {
        energy: rng.gen_range(40.0..80.0),
        fullness: rng.gen_range(30.0..70.0),
        boredom: rng.gen_range(0.0..20.0_f32).min(params.max_boredom),
        max_boredom: params.max_boredom,
    };

    world.spawn((
        citizen,
        serial,
        Position(spot),
        Motion::new(params.max_speed, params.max_force),
        needs,
        Behavior::Idle,
        Inventory::new(params.wood_capacity),
        MotivationScores::default(),
        Trail::new(params.history_length),
    ))
}

/// Spawn an organism snapped to the center of the cell containing `spot`.
pub fn spawn_organism(
    world: &mut World,
    spot: Vec2,
    serial: Serial,
    config: &SimConfig,
    terrain: &TerrainGrid,
) -> Entity {
    let params = &config.organism;
    let (col, row) = terrain.cell_index(spot.x, spot.y);
    let center = terrain.cell_center(col, row);
    let organism = Organism {
        energy: params.start_energy.min(params.max_energy),
        max_energy: params.max_energy,
        move_count: 0,
        last_direction: None,
        memory: VisitMemory::new(params.memory_duration),
        movement: Cadence::new(config.schedule.organism_move_interval),
        death: None,
    };
    let mut trail = Trail::new(params.history_length);
    trail.push(center);

    world.spawn((organism, serial, Position(center), trail))
}
