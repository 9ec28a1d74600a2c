//! Organism update: energy, berry harvesting and one grid step per cadence.

use hamlet_logic::constants::behavior::DEATH_ANIMATION_TICKS;
use hamlet_logic::constants::forage::{BERRY_BITE, BERRY_ENERGY};
use hamlet_logic::constants::resources::BERRY_HARVEST_DISTANCE;
use hamlet_logic::forage::{choose_step, ForageContext, Neighbor, Step, DIRECTIONS};
use hamlet_logic::terrain::TerrainGrid;
use hamlet_logic::vector::Vec2;
use hecs::{Entity, World};
use rand::Rng;

use super::SimContext;
use crate::components::{BerryBush, Death, DeathCause, Organism, Position, Serial, Trail};

/// Perceived resource value next to a bush holding `berries`.
pub fn berry_resource(berries: f32) -> f32 {
    0.8 + berries * 0.2
}

/// Update every organism once, in spawn order.
pub fn organism_system(world: &mut World, ctx: &SimContext, rng: &mut impl Rng) {
    let mut order: Vec<(Serial, Entity)> = world
        .query_mut::<(&Organism, &Serial)>()
        .into_iter()
        .map(|(entity, (_, serial))| (*serial, entity))
        .collect();
    order.sort_unstable();

    for (_, entity) in order {
        update_organism(world, entity, ctx, rng);
    }
}

fn update_organism(world: &mut World, entity: Entity, ctx: &SimContext, rng: &mut impl Rng) {
    let Ok(position) = world.get::<&Position>(entity).map(|p| p.0) else {
        return;
    };
    let Ok(mut organism) = world.get::<&Organism>(entity).map(|o| (*o).clone()) else {
        return;
    };
    let params = &ctx.config.organism;

    if let Some(death) = organism.death.as_mut() {
        death.ticks = (death.ticks + 1).min(DEATH_ANIMATION_TICKS);
        store(world, entity, organism, None);
        return;
    }

    organism.energy -= params.energy_loss_rate;
    if let Some(bush) = nearest_bush(world, position, BERRY_HARVEST_DISTANCE) {
        let harvested = world
            .get::<&mut BerryBush>(bush)
            .map(|mut b| b.harvest(BERRY_BITE))
            .unwrap_or(0.0);
        organism.energy += harvested * BERRY_ENERGY;
    }
    organism.energy = organism.energy.clamp(0.0, organism.max_energy);

    if organism.energy <= 0.0 {
        organism.death = Some(Death {
            cause: DeathCause::Starvation,
            ticks: 0,
        });
        log::info!("organism {:?} starved after {} moves", entity, organism.move_count);
        store(world, entity, organism, None);
        return;
    }

    let moved = if organism.movement.tick() {
        step(world, ctx, &mut organism, position, rng)
    } else {
        None
    };
    store(world, entity, organism, moved);
}

/// Take one foraging step. Returns the new position if the organism moved.
fn step(
    world: &World,
    ctx: &SimContext,
    organism: &mut Organism,
    position: Vec2,
    rng: &mut impl Rng,
) -> Option<Vec2> {
    let terrain = ctx.terrain;
    let here = terrain.cell_index(position.x, position.y);
    organism.memory.record(here, organism.move_count);

    let current_resource = perceived_resource(world, terrain, here);
    let mut neighbors = [Neighbor::Ocean; 8];
    let mut cells = [here; 8];
    for (i, (dx, dy)) in DIRECTIONS.iter().enumerate() {
        let cell = terrain.wrap(here.0 as i64 + dx, here.1 as i64 + dy);
        cells[i] = cell;
        neighbors[i] = if !terrain.cell(cell.0, cell.1).is_land {
            Neighbor::Ocean
        } else if organism.memory.is_recent(cell, organism.move_count) {
            Neighbor::Recent
        } else {
            Neighbor::Open {
                gain: perceived_resource(world, terrain, cell) - current_resource,
            }
        };
    }

    let context = ForageContext {
        neighbors,
        current_resource,
        last_direction: organism.last_direction,
    };
    organism.move_count += 1;
    match choose_step(&context, rng) {
        Step::Move(direction) => {
            organism.last_direction = Some(direction);
            let (col, row) = cells[direction];
            Some(ctx.terrain_bounds().wrap(terrain.cell_center(col, row)))
        }
        Step::Stay => None,
    }
}

/// Terrain density, raised near bushes that still carry berries.
fn perceived_resource(world: &World, terrain: &TerrainGrid, cell: (usize, usize)) -> f32 {
    let base = terrain.cell(cell.0, cell.1).resource_density;
    let center = terrain.cell_center(cell.0, cell.1);
    let reach_sq = BERRY_HARVEST_DISTANCE * BERRY_HARVEST_DISTANCE;
    world
        .query::<(&BerryBush, &Position)>()
        .iter()
        .filter(|(_, (bush, pos))| !bush.is_depleted() && pos.0.distance_squared(&center) < reach_sq)
        .map(|(_, (bush, _))| berry_resource(bush.berries))
        .fold(base, f32::max)
}

fn nearest_bush(world: &World, from: Vec2, radius: f32) -> Option<Entity> {
    let radius_sq = radius * radius;
    world
        .query::<(&BerryBush, &Position)>()
        .iter()
        .filter(|(_, (bush, _))| !bush.is_depleted())
        .map(|(entity, (_, pos))| (entity, pos.0.distance_squared(&from)))
        .filter(|&(_, d)| d < radius_sq)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(entity, _)| entity)
}

fn store(world: &mut World, entity: Entity, organism: Organism, moved: Option<Vec2>) {
    if let Ok((stored, position, trail)) =
        world.query_one_mut::<(&mut Organism, &mut Position, &mut Trail)>(entity)
    {
        *stored = organism;
        if let Some(next) = moved {
            position.0 = next;
            trail.push(next);
        }
    }
}
