//! Per-tick effects of each citizen behavior.
//!
//! Each behavior reads and writes the citizen's [`AgentFrame`] and may touch
//! resource nodes in the world. Targets are re-validated every tick; a target
//! that vanished, is depleted, or is claimed by someone else is dropped and
//! searched for again.

use hamlet_logic::constants::behavior::*;
use hamlet_logic::constants::steering::{IDLE_DAMPING, WANDER_ARRIVE_DISTANCE, WANDER_INSET};
use hamlet_logic::steering::{orbit_point, seek, wander_target};
use hamlet_logic::vector::Vec2;
use hecs::{Component, Entity, World};
use rand::Rng;

use super::citizen::AgentFrame;
use super::decision::HouseOwnership;
use super::SimContext;
use crate::components::{Behavior, Food, House, Position, Target, Wood};
use crate::generation::spawn_house;

/// Run the current behavior for one tick.
pub(crate) fn execute(world: &mut World, frame: &mut AgentFrame, ctx: &SimContext, rng: &mut impl Rng) {
    match frame.behavior {
        Behavior::Idle => idle(frame),
        Behavior::Resting { .. } => frame.motion.halt(),
        Behavior::Exercising => exercise(frame, ctx.tick),
        Behavior::SeekingFood { target } => seek_food(world, frame, target, ctx, rng),
        Behavior::CollectingWood { target } => collect_wood(world, frame, target, ctx, rng),
        Behavior::Constructing { target } => build_house(world, frame, target, ctx, rng),
        Behavior::Dead(_) => {}
    }
}

fn idle(frame: &mut AgentFrame) {
    frame.motion.velocity = frame.motion.velocity * IDLE_DAMPING;
}

/// Circle the citizen's current position.
fn exercise(frame: &mut AgentFrame, tick: u64) {
    let point = orbit_point(frame.position, EXERCISE_RADIUS, EXERCISE_ANGULAR_SPEED, tick);
    steer_toward(frame, point);
    frame.needs.boredom -= EXERCISE_BOREDOM_DECAY;
    frame.needs.energy -= EXERCISE_ENERGY_COST;
    frame.needs.clamp();
}

fn seek_food(
    world: &mut World,
    frame: &mut AgentFrame,
    target: Option<Target>,
    ctx: &SimContext,
    rng: &mut impl Rng,
) {
    let food = match target {
        Some(Target::Node(food)) if world.get::<&Food>(food).is_ok() => Some(food),
        _ => nearest::<Food>(world, frame.position, frame.citizen.perception, |_, _| true),
    };
    let Some(food) = food else {
        let point = wander(frame, target, ctx, rng);
        frame.behavior.set_target(Some(point));
        return;
    };
    let Some((spot, item)) = node::<Food>(world, food) else {
        frame.behavior.set_target(None);
        return;
    };

    if frame.position.distance(&spot) < (frame.citizen.size + item.size) / 2.0 {
        frame.needs.eat(item.nutrition);
        let _ = world.despawn(food);
        log::debug!("{:?} ate food worth {:.1}", frame.entity, item.nutrition);
        frame.behavior.set_target(None);
    } else {
        steer_toward(frame, spot);
        frame.behavior.set_target(Some(Target::Node(food)));
    }
}

fn collect_wood(
    world: &mut World,
    frame: &mut AgentFrame,
    target: Option<Target>,
    ctx: &SimContext,
    rng: &mut impl Rng,
) {
    let agent = frame.entity;
    if frame.inventory.is_full() {
        if let Some(Target::Node(pile)) = target {
            release_wood(world, pile, agent);
        }
        frame.behavior.set_target(None);
        idle(frame);
        return;
    }

    let pile = match target {
        Some(Target::Node(pile)) if hold_claim(world, pile, agent) => Some(pile),
        _ => claim_nearest_wood(world, frame.position, frame.citizen.perception, agent),
    };
    let Some(pile) = pile else {
        let point = wander(frame, target, ctx, rng);
        frame.behavior.set_target(Some(point));
        return;
    };
    let Ok(spot) = world.get::<&Position>(pile).map(|p| p.0) else {
        frame.behavior.set_target(None);
        return;
    };

    if frame.position.distance(&spot) > WOOD_COLLECT_DISTANCE {
        steer_toward(frame, spot);
        frame.behavior.set_target(Some(Target::Node(pile)));
        return;
    }

    frame.motion.halt();
    let harvested = world
        .get::<&mut Wood>(pile)
        .map(|mut wood| wood.update_collection(WOOD_COLLECT_RATE))
        .unwrap_or(0.0);
    if harvested > 0.0 {
        let overflow = frame.inventory.add_wood(harvested);
        if overflow > 0.0 {
            if let Ok(mut wood) = world.get::<&mut Wood>(pile) {
                wood.return_wood(overflow);
            }
        }
        log::debug!("{:?} harvested {:.1} wood", agent, harvested - overflow);
        frame.behavior.set_target(None);
    } else {
        frame.behavior.set_target(Some(Target::Node(pile)));
    }
}

fn build_house(
    world: &mut World,
    frame: &mut AgentFrame,
    target: Option<Target>,
    ctx: &SimContext,
    rng: &mut impl Rng,
) {
    let house = match target {
        Some(Target::Node(house)) if owns_unfinished(world, house, frame.entity) => Some(house),
        _ => find_building_site(world, frame, ctx, rng),
    };
    let Some(house) = house else {
        let point = wander(frame, target, ctx, rng);
        frame.behavior.set_target(Some(point));
        return;
    };
    let Ok(site) = world.get::<&Position>(house).map(|p| p.0) else {
        frame.behavior.set_target(None);
        return;
    };

    if frame.position.distance(&site) > BUILD_DISTANCE {
        steer_toward(frame, site);
        frame.behavior.set_target(Some(Target::Node(house)));
        return;
    }

    frame.motion.halt();
    let carried = frame.inventory.take_wood(BUILD_WOOD_PER_TICK);
    let (accepted, complete) = world
        .get::<&mut House>(house)
        .map(|mut h| (h.add_wood(carried), h.is_complete))
        .unwrap_or((0.0, false));
    frame.inventory.add_wood(carried - accepted);

    if complete {
        log::info!("{:?} completed house {:?} at ({:.0}, {:.0})", frame.entity, house, site.x, site.y);
    }
    if complete || frame.inventory.wood <= 0.0 {
        frame.behavior.set_target(None);
    } else {
        frame.behavior.set_target(Some(Target::Node(house)));
    }
}

/// Own unfinished house, else adopt a nearby ownerless site, else found
/// a new one when carrying enough wood and owning nothing.
fn find_building_site(
    world: &mut World,
    frame: &AgentFrame,
    ctx: &SimContext,
    rng: &mut impl Rng,
) -> Option<Entity> {
    let agent = frame.entity;
    let owned = world
        .query::<&House>()
        .iter()
        .find(|(_, house)| house.is_owned_by(agent) && !house.is_complete)
        .map(|(entity, _)| entity);
    if owned.is_some() {
        return owned;
    }

    if let Some(site) = nearest::<House>(world, frame.position, frame.citizen.perception, |_, house| {
        house.owner.is_none() && !house.is_complete
    }) {
        if let Ok(mut house) = world.get::<&mut House>(site) {
            house.set_owner(Some(agent));
        }
        return Some(site);
    }

    if frame.inventory.wood >= NEW_HOUSE_MIN_WOOD && !HouseOwnership::of(world, agent).owns_any() {
        let offset = Vec2::new(
            rng.gen_range(-NEW_HOUSE_OFFSET..=NEW_HOUSE_OFFSET),
            rng.gen_range(-NEW_HOUSE_OFFSET..=NEW_HOUSE_OFFSET),
        );
        let spot = ctx.bounds.clamp_inset(frame.position + offset, WANDER_INSET);
        let house = spawn_house(world, spot, Some(agent), ctx.config.resources.house_wood_required);
        log::info!("{:?} founded house {:?} at ({:.0}, {:.0})", agent, house, spot.x, spot.y);
        return Some(house);
    }

    None
}

fn owns_unfinished(world: &World, house: Entity, agent: Entity) -> bool {
    world
        .get::<&House>(house)
        .map(|h| h.is_owned_by(agent) && !h.is_complete)
        .unwrap_or(false)
}

/// Keep or take the claim on a pile that still has wood.
fn hold_claim(world: &World, pile: Entity, agent: Entity) -> bool {
    world
        .get::<&mut Wood>(pile)
        .map(|mut wood| !wood.is_depleted() && wood.try_claim(agent))
        .unwrap_or(false)
}

pub(crate) fn release_wood(world: &World, pile: Entity, agent: Entity) {
    if let Ok(mut wood) = world.get::<&mut Wood>(pile) {
        if wood.is_claimed_by(agent) {
            wood.cancel_collection();
        }
    }
}

/// Nearest pile in range whose claim `agent` can take.
fn claim_nearest_wood(world: &World, from: Vec2, radius: f32, agent: Entity) -> Option<Entity> {
    let mut candidates: Vec<(f32, Entity)> = world
        .query::<(&Wood, &Position)>()
        .iter()
        .filter(|(_, (wood, pos))| !wood.is_depleted() && pos.0.distance(&from) <= radius)
        .map(|(entity, (_, pos))| (pos.0.distance_squared(&from), entity))
        .collect();
    candidates.sort_by(|a, b| a.0.total_cmp(&b.0));
    candidates
        .into_iter()
        .map(|(_, entity)| entity)
        .find(|&pile| hold_claim(world, pile, agent))
}

/// Keep an unreached wander point, otherwise pick a new one, and steer to it.
fn wander(frame: &mut AgentFrame, current: Option<Target>, ctx: &SimContext, rng: &mut impl Rng) -> Target {
    let point = match current {
        Some(Target::Point(p)) if p.distance(&frame.position) > WANDER_ARRIVE_DISTANCE => p,
        _ => wander_target(frame.position, &ctx.bounds, rng),
    };
    steer_toward(frame, point);
    Target::Point(point)
}

fn steer_toward(frame: &mut AgentFrame, point: Vec2) {
    let force = seek(
        frame.position,
        frame.motion.velocity,
        point,
        frame.motion.max_speed,
        frame.motion.max_force,
    );
    frame.motion.apply_force(force);
}

/// Nearest entity with component `T` within `radius` that `accept` allows.
fn nearest<T: Component>(
    world: &World,
    from: Vec2,
    radius: f32,
    accept: impl Fn(Entity, &T) -> bool,
) -> Option<Entity> {
    let radius_sq = radius * radius;
    let mut best: Option<(Entity, f32)> = None;
    for (entity, (item, pos)) in world.query::<(&T, &Position)>().iter() {
        let d = pos.0.distance_squared(&from);
        if d > radius_sq || !accept(entity, item) {
            continue;
        }
        if best.map_or(true, |(_, best_d)| d < best_d) {
            best = Some((entity, d));
        }
    }
    best.map(|(entity, _)| entity)
}

fn node<T: Component + Copy>(world: &World, entity: Entity) -> Option<(Vec2, T)> {
    let spot = world.get::<&Position>(entity).ok()?.0;
    let item = *world.get::<&T>(entity).ok()?;
    Some((spot, item))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Cadence, Citizen, Inventory, Motion, Needs};
    use hamlet_logic::utility::MotivationScores;

    fn exercising_at(world: &mut World, position: Vec2) -> AgentFrame {
        AgentFrame {
            entity: world.spawn(()),
            citizen: Citizen {
                age: 0,
                size: 10.0,
                perception: 150.0,
                decision: Cadence::new(5),
            },
            position,
            motion: Motion::new(1.5, 0.2),
            needs: Needs {
                energy: 80.0,
                fullness: 80.0,
                boredom: 60.0,
                max_boredom: 100.0,
            },
            behavior: Behavior::Exercising,
            inventory: Inventory::new(10.0),
            scores: MotivationScores::default(),
        }
    }

    #[test]
    fn test_exercise_orbits_current_position() {
        let mut world = World::new();
        let tick = 17;
        let mut here = exercising_at(&mut world, Vec2::new(100.0, 100.0));
        let mut there = exercising_at(&mut world, Vec2::new(320.0, 260.0));

        exercise(&mut here, tick);
        exercise(&mut there, tick);

        let expected = seek(
            here.position,
            Vec2::ZERO,
            orbit_point(here.position, EXERCISE_RADIUS, EXERCISE_ANGULAR_SPEED, tick),
            1.5,
            0.2,
        );
        assert!((here.motion.acceleration - expected).length() < 1e-5);
        // Same pull wherever the citizen stands.
        assert!((here.motion.acceleration - there.motion.acceleration).length() < 1e-4);
    }

    #[test]
    fn test_exercise_works_off_boredom() {
        let mut world = World::new();
        let mut frame = exercising_at(&mut world, Vec2::new(200.0, 200.0));
        exercise(&mut frame, 1);
        assert!(frame.needs.boredom < 60.0);
        assert!(frame.needs.energy < 80.0);
    }
}
