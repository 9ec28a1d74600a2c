//! Death cleanup and removal of finished corpses.

use hamlet_logic::constants::behavior::DEATH_ANIMATION_TICKS;
use hecs::{Entity, World};

use crate::components::{Behavior, House, Organism, Wood};

/// Drop the claims a dying agent held: wood collection and ownership of
/// houses that are still unfinished.
pub fn release_claims(world: &mut World, agent: Entity) {
    clear_references(world, agent, false);
}

/// Clear wood claims and house ownership held by `agent`. Finished houses
/// keep their owner unless `finished_houses` is set.
fn clear_references(world: &mut World, agent: Entity, finished_houses: bool) {
    for (_, wood) in world.query_mut::<&mut Wood>() {
        if wood.is_claimed_by(agent) {
            wood.cancel_collection();
        }
    }
    for (_, house) in world.query_mut::<&mut House>() {
        if house.is_owned_by(agent) && (finished_houses || !house.is_complete) {
            house.set_owner(None);
        }
    }
}

/// Despawn agents whose death animation has finished.
///
/// Returns how many were removed.
pub fn reap_dead(world: &mut World) -> usize {
    let mut finished: Vec<Entity> = world
        .query_mut::<&Behavior>()
        .into_iter()
        .filter_map(|(entity, behavior)| match behavior {
            Behavior::Dead(death) if death.ticks >= DEATH_ANIMATION_TICKS => Some(entity),
            _ => None,
        })
        .collect();
    finished.extend(
        world
            .query_mut::<&Organism>()
            .into_iter()
            .filter(|(_, organism)| {
                organism
                    .death
                    .is_some_and(|death| death.ticks >= DEATH_ANIMATION_TICKS)
            })
            .map(|(entity, _)| entity),
    );

    for &entity in &finished {
        clear_references(world, entity, true);
        let _ = world.despawn(entity);
    }
    if !finished.is_empty() {
        log::debug!("reaped {} dead agents", finished.len());
    }
    finished.len()
}
