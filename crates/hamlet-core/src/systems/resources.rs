//! Resource upkeep: bush regrowth, removal of depleted nodes, replenishment.

use hecs::{Entity, World};
use rand::Rng;

use super::SimContext;
use crate::components::{BerryBush, Food, Wood};
use crate::generation::{find_berry_site, random_resource_point, spawn_berry_bush, spawn_food, spawn_wood};

/// Regrow bushes and despawn depleted wood piles and bushes.
pub fn resource_upkeep_system(world: &mut World) {
    for (_, bush) in world.query_mut::<&mut BerryBush>() {
        bush.update();
    }

    let mut depleted: Vec<Entity> = world
        .query_mut::<&Wood>()
        .into_iter()
        .filter(|(_, wood)| wood.is_depleted())
        .map(|(entity, _)| entity)
        .collect();
    depleted.extend(
        world
            .query_mut::<&BerryBush>()
            .into_iter()
            .filter(|(_, bush)| bush.is_depleted())
            .map(|(entity, _)| entity),
    );
    for entity in depleted {
        let _ = world.despawn(entity);
    }
}

/// Top food and wood back up to their targets and occasionally sprout a bush.
pub fn replenish_system(world: &mut World, ctx: &SimContext, rng: &mut impl Rng) {
    let resources = &ctx.config.resources;

    let food = world.query_mut::<&Food>().into_iter().count();
    for _ in food..resources.food_target {
        let spot = random_resource_point(ctx.terrain, &ctx.bounds, rng);
        spawn_food(world, spot, rng);
    }

    let wood = world.query_mut::<&Wood>().into_iter().count();
    for _ in wood..resources.wood_target {
        let spot = random_resource_point(ctx.terrain, &ctx.bounds, rng);
        spawn_wood(world, spot, rng);
    }

    let bushes = world.query_mut::<&BerryBush>().into_iter().count();
    if bushes < resources.max_berry_bushes && rng.gen_bool(resources.berry_spawn_chance) {
        if let Some(spot) = find_berry_site(world, ctx.terrain, &ctx.bounds, rng) {
            spawn_berry_bush(world, spot, resources.berry_regrow_rate);
        }
    }
}

/// Number of entities carrying component `T`.
pub fn count<T: hecs::Component>(world: &World) -> usize {
    world.query::<&T>().iter().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Position;
    use crate::config::SimConfig;
    use hamlet_logic::terrain::TerrainGrid;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_upkeep_removes_depleted() {
        let mut world = World::new();
        let mut empty = Wood::new(5.0);
        empty.amount = 0.0;
        world.spawn((empty, Position::new(1.0, 1.0)));
        world.spawn((Wood::new(5.0), Position::new(2.0, 2.0)));
        let mut bare = BerryBush::new(0.001);
        bare.berries = 0.0;
        world.spawn((bare, Position::new(3.0, 3.0)));

        resource_upkeep_system(&mut world);

        assert_eq!(count::<Wood>(&world), 1);
        assert_eq!(count::<BerryBush>(&world), 0);
    }

    #[test]
    fn test_replenish_to_targets() {
        let terrain = TerrainGrid::uniform_land(100, 100, 5.0, 0.5);
        let mut config = SimConfig::default();
        config.resources.food_target = 7;
        config.resources.wood_target = 4;
        config.resources.berry_spawn_chance = 1.0;
        let mut world = World::new();
        let mut rng = StdRng::seed_from_u64(3);

        replenish_system(&mut world, &SimContext::new(&terrain, &config, 0), &mut rng);
        replenish_system(&mut world, &SimContext::new(&terrain, &config, 1), &mut rng);

        assert_eq!(count::<Food>(&world), 7);
        assert_eq!(count::<Wood>(&world), 4);
        assert_eq!(count::<BerryBush>(&world), 2);
    }
}
