//! Resource placement: food, wood piles, berry bushes and houses.

use hamlet_logic::constants::resources::*;
use hamlet_logic::constants::steering::WANDER_INSET;
use hamlet_logic::constants::terrain::LAND_SEARCH_ATTEMPTS;
use hamlet_logic::steering::Bounds;
use hamlet_logic::terrain::TerrainGrid;
use hamlet_logic::vector::Vec2;
use hecs::{Entity, World};
use rand::Rng;

use crate::components::*;

/// Tries per bush before giving up for this tick.
const BERRY_SITE_ATTEMPTS: usize = 20;

/// Random land point inside the area citizens can reach.
///
/// Falls back to any land cell if the inner area is all ocean.
pub fn random_resource_point(terrain: &TerrainGrid, bounds: &Bounds, rng: &mut impl Rng) -> Vec2 {
    let lo = WANDER_INSET;
    let hi = 1.0 - WANDER_INSET;
    for _ in 0..LAND_SEARCH_ATTEMPTS {
        let point = Vec2::new(
            rng.gen_range(bounds.width * lo..bounds.width * hi),
            rng.gen_range(bounds.height * lo..bounds.height * hi),
        );
        if terrain.is_land_at(point.x, point.y) {
            return point;
        }
    }
    terrain.find_land_position(rng)
}

/// Land cell center at least `BERRY_MIN_SPACING` from every other bush.
pub fn find_berry_site(
    world: &World,
    terrain: &TerrainGrid,
    bounds: &Bounds,
    rng: &mut impl Rng,
) -> Option<Vec2> {
    let bushes: Vec<Vec2> = world
        .query::<(&BerryBush, &Position)>()
        .iter()
        .map(|(_, (_, pos))| pos.0)
        .collect();
    let (cols, rows) = (terrain.cols(), terrain.rows());

    for _ in 0..BERRY_SITE_ATTEMPTS {
        let col = rng.gen_range(0..cols);
        let row = rng.gen_range(0..rows);
        if !terrain.cell(col, row).is_land {
            continue;
        }
        let spot = terrain.cell_center(col, row);
        if spot.x > bounds.width || spot.y > bounds.height {
            continue;
        }
        if bushes.iter().all(|b| b.distance(&spot) >= BERRY_MIN_SPACING) {
            return Some(spot);
        }
    }
    None
}

pub fn spawn_food(world: &mut World, spot: Vec2, rng: &mut impl Rng) -> Entity {
    let food = Food::new(
        rng.gen_range(FOOD_MIN_NUTRITION..=FOOD_MAX_NUTRITION),
        rng.gen_range(FOOD_MIN_SIZE..=FOOD_MAX_SIZE),
    );
    world.spawn((food, Position(spot)))
}

pub fn spawn_wood(world: &mut World, spot: Vec2, rng: &mut impl Rng) -> Entity {
    let amount = rng.gen_range(WOOD_MIN_AMOUNT..=WOOD_MAX_AMOUNT);
    world.spawn((Wood::new(amount), Position(spot)))
}

pub fn spawn_berry_bush(world: &mut World, spot: Vec2, regrow_rate: f32) -> Entity {
    world.spawn((BerryBush::new(regrow_rate), Position(spot)))
}

pub fn spawn_house(world: &mut World, spot: Vec2, owner: Option<Entity>, wood_required: f32) -> Entity {
    let mut house = House::new(wood_required);
    house.set_owner(owner);
    world.spawn((house, Position(spot)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_resource_point_on_land_and_inset() {
        let terrain = TerrainGrid::uniform_land(100, 100, 5.0, 0.5);
        let bounds = Bounds::default();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            let p = random_resource_point(&terrain, &bounds, &mut rng);
            assert!(bounds.inside_inset(p, WANDER_INSET));
        }
    }

    #[test]
    fn test_berry_sites_keep_spacing() {
        let terrain = TerrainGrid::uniform_land(100, 100, 5.0, 0.5);
        let bounds = Bounds::default();
        let mut world = World::new();
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..40 {
            if let Some(spot) = find_berry_site(&world, &terrain, &bounds, &mut rng) {
                spawn_berry_bush(&mut world, spot, 0.001);
            }
        }
        let spots: Vec<Vec2> = world
            .query::<(&BerryBush, &Position)>()
            .iter()
            .map(|(_, (_, p))| p.0)
            .collect();
        assert!(spots.len() > 10);
        for (i, a) in spots.iter().enumerate() {
            for b in &spots[i + 1..] {
                assert!(a.distance(b) >= BERRY_MIN_SPACING);
            }
        }
    }

    #[test]
    fn test_spawned_values_in_range() {
        let mut world = World::new();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let f = spawn_food(&mut world, Vec2::ZERO, &mut rng);
            let w = spawn_wood(&mut world, Vec2::ZERO, &mut rng);
            let food = *world.get::<&Food>(f).unwrap();
            assert!((FOOD_MIN_NUTRITION..=FOOD_MAX_NUTRITION).contains(&food.nutrition));
            let wood = *world.get::<&Wood>(w).unwrap();
            assert!((WOOD_MIN_AMOUNT..=WOOD_MAX_AMOUNT).contains(&wood.amount));
            assert_eq!(wood.capacity, wood.amount);
        }
    }
}
