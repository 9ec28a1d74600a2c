//! Citizen update loop.
//!
//! Citizens are updated one at a time in spawn order. Each update copies the
//! citizen's components into an [`AgentFrame`], runs the steps below against
//! it (with the world free for resource lookups), then writes it back:
//! 1. Age
//! 2. Dead citizens only advance their death animation
//! 3. Metabolism, then starvation if energy ran out
//! 4. Forced rest on exhaustion, rest recovery, forced-rest exit
//! 5. Boredom
//! 6. Death check (starvation, then boredom)
//! 7. Decision on the citizen's cadence, then the current behavior's effect
//! 8. Movement unless resting
//! 9. Trail

use hamlet_logic::constants::behavior::DEATH_ANIMATION_TICKS;
use hamlet_logic::steering::integrate;
use hamlet_logic::utility::MotivationScores;
use hamlet_logic::vector::Vec2;
use hecs::{Entity, World};
use rand::Rng;

use super::behaviors::{execute, release_wood};
use super::decision::{evaluate, hysteresis, motivation_input, HouseOwnership};
use super::lifecycle::release_claims;
use super::metabolism::*;
use super::SimContext;
use crate::components::*;

/// Working copy of one citizen's components.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AgentFrame {
    pub entity: Entity,
    pub citizen: Citizen,
    pub position: Vec2,
    pub motion: Motion,
    pub needs: Needs,
    pub behavior: Behavior,
    pub inventory: Inventory,
    pub scores: MotivationScores,
}

impl AgentFrame {
    fn load(world: &mut World, entity: Entity) -> Option<Self> {
        let (citizen, position, motion, needs, behavior, inventory, scores) = world
            .query_one_mut::<(
                &Citizen,
                &Position,
                &Motion,
                &Needs,
                &Behavior,
                &Inventory,
                &MotivationScores,
            )>(entity)
            .ok()?;
        Some(Self {
            entity,
            citizen: *citizen,
            position: position.0,
            motion: *motion,
            needs: *needs,
            behavior: *behavior,
            inventory: *inventory,
            scores: *scores,
        })
    }

    fn store(&self, world: &mut World) {
        if let Ok((citizen, position, motion, needs, behavior, inventory, scores)) = world
            .query_one_mut::<(
                &mut Citizen,
                &mut Position,
                &mut Motion,
                &mut Needs,
                &mut Behavior,
                &mut Inventory,
                &mut MotivationScores,
            )>(self.entity)
        {
            *citizen = self.citizen;
            position.0 = self.position;
            *motion = self.motion;
            *needs = self.needs;
            *behavior = self.behavior;
            *inventory = self.inventory;
            *scores = self.scores;
        }
    }
}

/// Update every citizen once, in spawn order.
pub fn citizen_system(world: &mut World, ctx: &SimContext, rng: &mut impl Rng) {
    let mut order: Vec<(Serial, Entity)> = world
        .query_mut::<(&Citizen, &Serial)>()
        .into_iter()
        .map(|(entity, (_, serial))| (*serial, entity))
        .collect();
    order.sort_unstable();

    for (_, entity) in order {
        update_citizen(world, entity, ctx, rng);
    }
}

fn update_citizen(world: &mut World, entity: Entity, ctx: &SimContext, rng: &mut impl Rng) {
    let Some(mut frame) = AgentFrame::load(world, entity) else {
        return;
    };
    let params = &ctx.config.citizen;

    frame.citizen.age += 1;

    if let Behavior::Dead(mut death) = frame.behavior {
        death.ticks = (death.ticks + 1).min(DEATH_ANIMATION_TICKS);
        frame.behavior = Behavior::Dead(death);
        frame.motion.halt();
        frame.store(world);
        return;
    }

    metabolize(&mut frame.needs, params);
    // Judged before rest recovery can top energy back up.
    if frame.needs.energy <= 0.0 {
        die(world, &mut frame, DeathCause::Starvation);
        return;
    }

    if needs_forced_rest(&frame.needs, &frame.behavior, params.rest_threshold) {
        switch_behavior(world, &mut frame, Behavior::Resting { forced: true });
        frame.motion.halt();
    }
    if frame.behavior.is_resting() {
        recover(&mut frame.needs);
        if frame.behavior.is_forced_rest() && rest_finished(&frame.needs, params.rest_threshold) {
            switch_behavior(world, &mut frame, Behavior::Idle);
        }
    }

    update_boredom(&mut frame.needs, frame.motion.speed(), params.boredom_increase_rate);

    if let Some(cause) = check_death(&frame.needs) {
        die(world, &mut frame, cause);
        return;
    }

    if frame.citizen.decision.tick() && !frame.behavior.is_forced_rest() {
        decide(world, &mut frame, ctx);
    }
    execute(world, &mut frame, ctx, rng);

    if !frame.behavior.is_resting() {
        let moved = integrate(
            frame.position,
            frame.motion.velocity,
            frame.motion.acceleration,
            frame.motion.max_speed,
            &ctx.bounds,
        );
        frame.position = moved.position;
        frame.motion.velocity = moved.velocity;
        apply_movement_cost(&mut frame.needs, frame.motion.speed());
    }
    frame.motion.acceleration = Vec2::ZERO;
    frame.needs.clamp();

    frame.store(world);
    if let Ok(trail) = world.query_one_mut::<&mut Trail>(entity) {
        trail.push(frame.position);
    }
}

/// Mark the citizen dead and drop every claim it held.
fn die(world: &mut World, frame: &mut AgentFrame, cause: DeathCause) {
    frame.behavior = Behavior::Dead(Death { cause, ticks: 0 });
    frame.motion.halt();
    release_claims(world, frame.entity);
    log::info!(
        "citizen {:?} died of {:?} at age {} ({:.0}, {:.0})",
        frame.entity,
        cause,
        frame.citizen.age,
        frame.position.x,
        frame.position.y
    );
    frame.store(world);
}

fn decide(world: &World, frame: &mut AgentFrame, ctx: &SimContext) {
    let params = &ctx.config.citizen;
    let ownership = HouseOwnership::of(world, frame.entity);
    let input = motivation_input(&frame.needs, &frame.inventory, ownership, params);
    let current = frame.behavior.motivation();
    let (scores, choice) = evaluate(&input, current, &hysteresis(params));
    frame.scores = scores;
    if current != Some(choice) {
        let next = Behavior::for_motivation(choice);
        switch_behavior(world, frame, next);
    }
}

/// Replace the behavior, dropping any wood claim the old one held.
fn switch_behavior(world: &World, frame: &mut AgentFrame, next: Behavior) {
    if let Behavior::CollectingWood {
        target: Some(Target::Node(pile)),
    } = frame.behavior
    {
        release_wood(world, pile, frame.entity);
    }
    log::debug!(
        "citizen {:?}: {} -> {}",
        frame.entity,
        frame.behavior.label(),
        next.label()
    );
    frame.behavior = next;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use hamlet_logic::terrain::TerrainGrid;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn spawn_test_citizen(world: &mut World, serial: u64, position: Vec2, needs: Needs) -> Entity {
        let mut motion = Motion::new(1.5, 0.2);
        motion.velocity = Vec2::new(1.0, 0.0);
        world.spawn((
            Citizen {
                age: 0,
                size: 10.0,
                perception: 150.0,
                decision: Cadence::new(5),
            },
            Serial(serial),
            Position(position),
            motion,
            needs,
            Behavior::Idle,
            Inventory::new(10.0),
            MotivationScores::default(),
            Trail::new(50),
        ))
    }

    fn needs(energy: f32, fullness: f32, boredom: f32) -> Needs {
        Needs {
            energy,
            fullness,
            boredom,
            max_boredom: 100.0,
        }
    }

    #[test]
    fn test_exhausted_citizen_rests_next_tick() {
        let mut world = World::new();
        let terrain = TerrainGrid::uniform_land(100, 100, 5.0, 0.5);
        let config = SimConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let citizen = spawn_test_citizen(&mut world, 0, Vec2::new(250.0, 250.0), needs(5.0, 50.0, 0.0));

        citizen_system(&mut world, &SimContext::new(&terrain, &config, 1), &mut rng);

        let behavior = *world.get::<&Behavior>(citizen).unwrap();
        assert_eq!(behavior, Behavior::Resting { forced: true });
        assert_eq!(world.get::<&Motion>(citizen).unwrap().velocity, Vec2::ZERO);
        assert_eq!(world.get::<&Position>(citizen).unwrap().0, Vec2::new(250.0, 250.0));
    }

    #[test]
    fn test_forced_rest_runs_until_recovered() {
        let mut world = World::new();
        let terrain = TerrainGrid::uniform_land(100, 100, 5.0, 0.5);
        let config = SimConfig::default();
        let mut rng = StdRng::seed_from_u64(2);
        let citizen = spawn_test_citizen(&mut world, 0, Vec2::new(250.0, 250.0), needs(5.0, 80.0, 0.0));

        let mut ticks = 0;
        loop {
            ticks += 1;
            citizen_system(&mut world, &SimContext::new(&terrain, &config, ticks), &mut rng);
            let behavior = *world.get::<&Behavior>(citizen).unwrap();
            if !behavior.is_forced_rest() {
                assert!(!behavior.is_dead());
                break;
            }
            assert!(ticks < 1000, "never left forced rest");
        }
        assert!(world.get::<&Needs>(citizen).unwrap().energy > 29.0);
    }

    #[test]
    fn test_death_is_terminal() {
        let mut world = World::new();
        let terrain = TerrainGrid::uniform_land(100, 100, 5.0, 0.5);
        let config = SimConfig::default();
        let mut rng = StdRng::seed_from_u64(3);
        let citizen = spawn_test_citizen(&mut world, 0, Vec2::new(200.0, 220.0), needs(60.0, 50.0, 99.99));
        world.get::<&mut Motion>(citizen).unwrap().halt();

        citizen_system(&mut world, &SimContext::new(&terrain, &config, 1), &mut rng);
        let behavior = *world.get::<&Behavior>(citizen).unwrap();
        assert!(matches!(
            behavior,
            Behavior::Dead(Death {
                cause: DeathCause::Boredom,
                ..
            })
        ));

        let frozen = world.get::<&Position>(citizen).unwrap().0;
        for tick in 2..200 {
            citizen_system(&mut world, &SimContext::new(&terrain, &config, tick), &mut rng);
        }
        assert_eq!(world.get::<&Position>(citizen).unwrap().0, frozen);
        match *world.get::<&Behavior>(citizen).unwrap() {
            Behavior::Dead(death) => assert_eq!(death.ticks, DEATH_ANIMATION_TICKS),
            other => panic!("resurrected into {other:?}"),
        };
    }

    #[test]
    fn test_empty_citizen_starves_within_one_tick() {
        let mut world = World::new();
        let terrain = TerrainGrid::uniform_land(100, 100, 5.0, 0.5);
        let config = SimConfig::default();
        let mut rng = StdRng::seed_from_u64(6);
        let citizen = spawn_test_citizen(&mut world, 0, Vec2::new(250.0, 250.0), needs(0.0, 0.0, 0.0));

        citizen_system(&mut world, &SimContext::new(&terrain, &config, 1), &mut rng);

        let behavior = *world.get::<&Behavior>(citizen).unwrap();
        assert!(
            matches!(
                behavior,
                Behavior::Dead(Death {
                    cause: DeathCause::Starvation,
                    ..
                })
            ),
            "still {behavior:?}"
        );
        assert_eq!(world.get::<&Motion>(citizen).unwrap().velocity, Vec2::ZERO);
    }

    #[test]
    fn test_forced_rest_does_not_revive_starving_citizen() {
        let mut world = World::new();
        let terrain = TerrainGrid::uniform_land(100, 100, 5.0, 0.5);
        let config = SimConfig::default();
        let mut rng = StdRng::seed_from_u64(7);
        let citizen = spawn_test_citizen(&mut world, 0, Vec2::new(250.0, 250.0), needs(0.005, 0.0, 0.0));
        *world.get::<&mut Behavior>(citizen).unwrap() = Behavior::Resting { forced: true };

        citizen_system(&mut world, &SimContext::new(&terrain, &config, 1), &mut rng);

        let behavior = *world.get::<&Behavior>(citizen).unwrap();
        assert!(matches!(
            behavior,
            Behavior::Dead(Death {
                cause: DeathCause::Starvation,
                ..
            })
        ));
        assert_eq!(world.get::<&Needs>(citizen).unwrap().energy, 0.0);
    }

    #[test]
    fn test_hungry_citizen_eats_nearby_food() {
        let mut world = World::new();
        let terrain = TerrainGrid::uniform_land(100, 100, 5.0, 0.5);
        let config = SimConfig::default();
        let mut rng = StdRng::seed_from_u64(4);
        let citizen = spawn_test_citizen(&mut world, 0, Vec2::new(250.0, 250.0), needs(80.0, 5.0, 0.0));
        let food = world.spawn((Food::new(25.0, 8.0), Position::new(300.0, 250.0)));

        for tick in 1..400 {
            citizen_system(&mut world, &SimContext::new(&terrain, &config, tick), &mut rng);
            if !world.contains(food) {
                break;
            }
        }
        assert!(!world.contains(food), "food never eaten");
        assert!(world.get::<&Needs>(citizen).unwrap().fullness > 20.0);
    }

    #[test]
    fn test_collector_releases_claim_on_death() {
        let mut world = World::new();
        let terrain = TerrainGrid::uniform_land(100, 100, 5.0, 0.5);
        let config = SimConfig::default();
        let mut rng = StdRng::seed_from_u64(5);
        let citizen = spawn_test_citizen(&mut world, 0, Vec2::new(250.0, 250.0), needs(60.0, 50.0, 99.99));
        world.get::<&mut Motion>(citizen).unwrap().halt();
        let pile = world.spawn((Wood::new(10.0), Position::new(255.0, 250.0)));
        {
            let mut wood = world.get::<&mut Wood>(pile).unwrap();
            assert!(wood.try_claim(citizen));
        }
        *world.get::<&mut Behavior>(citizen).unwrap() = Behavior::CollectingWood {
            target: Some(Target::Node(pile)),
        };

        citizen_system(&mut world, &SimContext::new(&terrain, &config, 1), &mut rng);

        assert!(world.get::<&Behavior>(citizen).unwrap().is_dead());
        assert_eq!(world.get::<&Wood>(pile).unwrap().collector, None);
    }
}
