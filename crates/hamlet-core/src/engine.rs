//! Simulation engine - main entry point for running the village

use hamlet_logic::constants::terrain::{
    MAX_CELL_SIZE, MAX_OCEAN_THRESHOLD, MIN_CELL_SIZE, MIN_OCEAN_THRESHOLD,
};
use hamlet_logic::steering::Bounds;
use hamlet_logic::terrain::TerrainGrid;
use hamlet_logic::utility::MotivationScores;
use hamlet_logic::vector::Vec2;
use hecs::{Entity, World};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::components::*;
use crate::config::{ConfigError, SimConfig};
use crate::generation::*;
use crate::systems::*;

/// Discrete input from the outside (keyboard, UI, scripts).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorldCommand {
    /// Rebuild terrain and population with the current seed.
    Regenerate,
    /// Rebuild with a new seed.
    Reseed(u32),
    AdjustOceanThreshold(f32),
    AdjustCellSize(f32),
    SpawnCitizen { x: f32, y: f32 },
    /// Spawn an organism on a random land cell.
    SpawnOrganism,
}

/// Read-only snapshot of a citizen for renderers.
#[derive(Debug, Clone, PartialEq)]
pub struct CitizenView {
    pub entity: Entity,
    pub age: u64,
    pub position: Vec2,
    pub velocity: Vec2,
    pub behavior: Behavior,
    pub needs: Needs,
    pub inventory: Inventory,
    pub scores: MotivationScores,
    pub trail: Vec<Vec2>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrganismView {
    pub entity: Entity,
    pub position: Vec2,
    pub energy: f32,
    pub max_energy: f32,
    pub death: Option<Death>,
    pub trail: Vec<Vec2>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HouseView {
    pub entity: Entity,
    pub position: Vec2,
    pub house: House,
}

/// Main simulation aggregate: world, terrain, config, clock and RNG.
pub struct Simulation {
    world: World,
    terrain: TerrainGrid,
    config: SimConfig,
    tick: u64,
    rng: StdRng,
    next_serial: u64,
}

impl Simulation {
    /// Create a simulation with terrain but no agents or resources yet.
    ///
    /// Fails if `config` does not pass [`SimConfig::validate`].
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let terrain = build_terrain(&config);
        let rng = StdRng::seed_from_u64(config.seed as u64);
        Ok(Self {
            world: World::new(),
            terrain,
            config,
            tick: 0,
            rng,
            next_serial: 0,
        })
    }

    /// Rebuild terrain and populate it with agents and resources.
    pub fn generate(&mut self) {
        self.terrain = build_terrain(&self.config);
        self.world.clear();
        self.tick = 0;
        self.next_serial = 0;
        log::info!(
            "generated {}x{} terrain (seed {}, {:.0}% land)",
            self.terrain.cols(),
            self.terrain.rows(),
            self.config.seed,
            self.terrain.land_fraction() * 100.0
        );

        for _ in 0..self.config.resources.initial_berry_bushes {
            self.spawn_berry_bush();
        }
        for _ in 0..self.config.population.citizens {
            let spot = random_resource_point(&self.terrain, &self.config.world, &mut self.rng);
            self.spawn_citizen(spot.x, spot.y);
        }
        for _ in 0..self.config.population.organisms {
            let spot = self.terrain.find_land_position(&mut self.rng);
            self.spawn_organism(spot.x, spot.y);
        }
        for _ in 0..self.config.resources.food_target {
            self.generate_food();
        }
        for _ in 0..self.config.resources.wood_target {
            self.generate_wood();
        }
    }

    /// Advance the simulation by one tick.
    pub fn tick(&mut self) {
        self.tick += 1;
        let ctx = SimContext::new(&self.terrain, &self.config, self.tick);

        resource_upkeep_system(&mut self.world);
        citizen_system(&mut self.world, &ctx, &mut self.rng);
        organism_system(&mut self.world, &ctx, &mut self.rng);
        replenish_system(&mut self.world, &ctx, &mut self.rng);
    }

    pub fn run(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.tick();
        }
    }

    pub fn apply(&mut self, command: WorldCommand) {
        log::info!("applying {:?}", command);
        match command {
            WorldCommand::Regenerate => self.generate(),
            WorldCommand::Reseed(seed) => {
                self.config.seed = seed;
                self.rng = StdRng::seed_from_u64(seed as u64);
                self.generate();
            }
            WorldCommand::AdjustOceanThreshold(delta) => {
                let terrain = &mut self.config.terrain;
                terrain.ocean_threshold =
                    (terrain.ocean_threshold + delta).clamp(MIN_OCEAN_THRESHOLD, MAX_OCEAN_THRESHOLD);
                self.generate();
            }
            WorldCommand::AdjustCellSize(delta) => {
                let terrain = &mut self.config.terrain;
                terrain.cell_size = (terrain.cell_size + delta).clamp(MIN_CELL_SIZE, MAX_CELL_SIZE);
                self.generate();
            }
            WorldCommand::SpawnCitizen { x, y } => {
                self.spawn_citizen(x, y);
            }
            WorldCommand::SpawnOrganism => {
                let spot = self.terrain.find_land_position(&mut self.rng);
                self.spawn_organism(spot.x, spot.y);
            }
        }
    }

    pub fn spawn_citizen(&mut self, x: f32, y: f32) -> Entity {
        let serial = self.next_serial();
        let spot = self.config.world.clamp_inset(Vec2::new(x, y), 0.0);
        spawn_citizen(&mut self.world, spot, serial, &self.config, &mut self.rng)
    }

    pub fn spawn_organism(&mut self, x: f32, y: f32) -> Entity {
        let serial = self.next_serial();
        spawn_organism(&mut self.world, Vec2::new(x, y), serial, &self.config, &self.terrain)
    }

    pub fn create_house(&mut self, x: f32, y: f32, owner: Option<Entity>) -> Entity {
        spawn_house(
            &mut self.world,
            Vec2::new(x, y),
            owner,
            self.config.resources.house_wood_required,
        )
    }

    /// Place one food item on a random reachable land point.
    pub fn generate_food(&mut self) -> Entity {
        let spot = random_resource_point(&self.terrain, &self.config.world, &mut self.rng);
        spawn_food(&mut self.world, spot, &mut self.rng)
    }

    /// Place one wood pile on a random reachable land point.
    pub fn generate_wood(&mut self) -> Entity {
        let spot = random_resource_point(&self.terrain, &self.config.world, &mut self.rng);
        spawn_wood(&mut self.world, spot, &mut self.rng)
    }

    /// Place a bush on land away from other bushes, if a spot is found.
    pub fn spawn_berry_bush(&mut self) -> Option<Entity> {
        let spot = find_berry_site(&self.world, &self.terrain, &self.config.world, &mut self.rng)?;
        Some(spawn_berry_bush(
            &mut self.world,
            spot,
            self.config.resources.berry_regrow_rate,
        ))
    }

    /// Remove agents whose death animation has finished.
    pub fn reap_dead(&mut self) -> usize {
        reap_dead(&mut self.world)
    }

    fn next_serial(&mut self) -> Serial {
        let serial = Serial(self.next_serial);
        self.next_serial += 1;
        serial
    }

    // ── Views ──────────────────────────────────────────────────────────

    /// Citizens in spawn order.
    pub fn citizens(&self) -> Vec<CitizenView> {
        let mut views: Vec<(Serial, CitizenView)> = self
            .world
            .query::<(
                &Citizen,
                &Serial,
                &Position,
                &Motion,
                &Behavior,
                &Needs,
                &Inventory,
                &MotivationScores,
                &Trail,
            )>()
            .iter()
            .map(
                |(entity, (citizen, serial, pos, motion, behavior, needs, inventory, scores, trail))| {
                    let view = CitizenView {
                        entity,
                        age: citizen.age,
                        position: pos.0,
                        velocity: motion.velocity,
                        behavior: *behavior,
                        needs: *needs,
                        inventory: *inventory,
                        scores: *scores,
                        trail: trail.iter().copied().collect(),
                    };
                    (*serial, view)
                },
            )
            .collect();
        views.sort_by_key(|(serial, _)| *serial);
        views.into_iter().map(|(_, view)| view).collect()
    }

    pub fn organisms(&self) -> Vec<OrganismView> {
        let mut views: Vec<(Serial, OrganismView)> = self
            .world
            .query::<(&Organism, &Serial, &Position, &Trail)>()
            .iter()
            .map(|(entity, (organism, serial, pos, trail))| {
                let view = OrganismView {
                    entity,
                    position: pos.0,
                    energy: organism.energy,
                    max_energy: organism.max_energy,
                    death: organism.death,
                    trail: trail.iter().copied().collect(),
                };
                (*serial, view)
            })
            .collect();
        views.sort_by_key(|(serial, _)| *serial);
        views.into_iter().map(|(_, view)| view).collect()
    }

    pub fn houses(&self) -> Vec<HouseView> {
        self.world
            .query::<(&House, &Position)>()
            .iter()
            .map(|(entity, (house, pos))| HouseView {
                entity,
                position: pos.0,
                house: *house,
            })
            .collect()
    }

    pub fn food_items(&self) -> Vec<(Vec2, Food)> {
        self.world
            .query::<(&Food, &Position)>()
            .iter()
            .map(|(_, (food, pos))| (pos.0, *food))
            .collect()
    }

    pub fn wood_piles(&self) -> Vec<(Vec2, Wood)> {
        self.world
            .query::<(&Wood, &Position)>()
            .iter()
            .map(|(_, (wood, pos))| (pos.0, *wood))
            .collect()
    }

    pub fn berry_bushes(&self) -> Vec<(Vec2, BerryBush)> {
        self.world
            .query::<(&BerryBush, &Position)>()
            .iter()
            .map(|(_, (bush, pos))| (pos.0, *bush))
            .collect()
    }

    // ── Counts ─────────────────────────────────────────────────────────

    pub fn living_citizens(&self) -> usize {
        self.count_citizens(|b| !b.is_dead())
    }

    pub fn dead_citizens(&self) -> usize {
        self.count_citizens(Behavior::is_dead)
    }

    fn count_citizens(&self, pred: impl Fn(&Behavior) -> bool) -> usize {
        self.world
            .query::<(&Citizen, &Behavior)>()
            .iter()
            .filter(|(_, (_, behavior))| pred(*behavior))
            .count()
    }

    pub fn living_organisms(&self) -> usize {
        self.world
            .query::<&Organism>()
            .iter()
            .filter(|(_, organism)| !organism.is_dead())
            .count()
    }

    pub fn food_count(&self) -> usize {
        count::<Food>(&self.world)
    }

    pub fn wood_count(&self) -> usize {
        count::<Wood>(&self.world)
    }

    pub fn berry_bush_count(&self) -> usize {
        count::<BerryBush>(&self.world)
    }

    pub fn house_count(&self) -> usize {
        count::<House>(&self.world)
    }

    pub fn completed_houses(&self) -> usize {
        self.world
            .query::<&House>()
            .iter()
            .filter(|(_, house)| house.is_complete)
            .count()
    }

    // ── Accessors ──────────────────────────────────────────────────────

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn terrain(&self) -> &TerrainGrid {
        &self.terrain
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn bounds(&self) -> Bounds {
        self.config.world
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }
}

fn build_terrain(config: &SimConfig) -> TerrainGrid {
    let params = config.terrain_params();
    let (cols, rows) = params.grid_size(config.world.width, config.world.height);
    TerrainGrid::generate_with(&params, cols, rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config(seed: u32) -> SimConfig {
        let mut config = SimConfig {
            seed,
            ..Default::default()
        };
        config.population.citizens = 6;
        config
    }

    #[test]
    fn test_generate_populates_world() {
        let mut sim = Simulation::new(small_config(42)).unwrap();
        sim.generate();
        assert_eq!(sim.living_citizens(), 6);
        assert_eq!(sim.living_organisms(), 1);
        assert_eq!(sim.food_count(), 20);
        assert_eq!(sim.wood_count(), 15);
        assert!(sim.berry_bush_count() > 0);
        for citizen in sim.citizens() {
            assert!(citizen.needs.is_within_bounds());
        }
    }

    #[test]
    fn test_needs_stay_clamped_over_long_run() {
        let mut sim = Simulation::new(small_config(7)).unwrap();
        sim.generate();
        for _ in 0..40 {
            sim.run(50);
            for citizen in sim.citizens() {
                assert!(citizen.needs.is_within_bounds(), "{:?}", citizen.needs);
                assert!(citizen.inventory.wood <= citizen.inventory.wood_capacity);
                assert!(citizen.position.is_finite());
            }
            for house in sim.houses() {
                assert!(house.house.wood_stored <= house.house.wood_required);
            }
        }
        assert_eq!(sim.current_tick(), 2000);
    }

    #[test]
    fn test_same_config_same_run() {
        let mut a = Simulation::new(small_config(11)).unwrap();
        let mut b = Simulation::new(small_config(11)).unwrap();
        a.generate();
        b.generate();
        a.run(300);
        b.run(300);
        let pa: Vec<Vec2> = a.citizens().iter().map(|c| c.position).collect();
        let pb: Vec<Vec2> = b.citizens().iter().map(|c| c.position).collect();
        assert_eq!(pa, pb);
    }

    #[test]
    fn test_commands_clamp_terrain_params() {
        let mut sim = Simulation::new(small_config(3)).unwrap();
        sim.generate();

        sim.apply(WorldCommand::AdjustOceanThreshold(10.0));
        assert_eq!(sim.config().terrain.ocean_threshold, MAX_OCEAN_THRESHOLD);
        sim.apply(WorldCommand::AdjustOceanThreshold(-10.0));
        assert_eq!(sim.config().terrain.ocean_threshold, MIN_OCEAN_THRESHOLD);

        sim.apply(WorldCommand::AdjustCellSize(-100.0));
        assert_eq!(sim.config().terrain.cell_size, MIN_CELL_SIZE);
        assert_eq!(sim.terrain().cols(), 250);
        sim.apply(WorldCommand::AdjustCellSize(100.0));
        assert_eq!(sim.terrain().cell_size(), MAX_CELL_SIZE);

        sim.apply(WorldCommand::Reseed(99));
        assert_eq!(sim.terrain().seed(), 99);
        assert_eq!(sim.living_citizens(), 6);
    }

    #[test]
    fn test_spawn_commands() {
        let mut sim = Simulation::new(small_config(5)).unwrap();
        sim.generate();
        sim.apply(WorldCommand::SpawnCitizen { x: 120.0, y: 140.0 });
        sim.apply(WorldCommand::SpawnOrganism);
        assert_eq!(sim.living_citizens(), 7);
        assert_eq!(sim.living_organisms(), 2);
        let newest = sim.citizens().pop().unwrap();
        assert_eq!(newest.position, Vec2::new(120.0, 140.0));
    }

    #[test]
    fn test_reap_dead_clears_references() {
        let mut sim = Simulation::new(small_config(8)).unwrap();
        sim.generate();
        let victim = sim.citizens()[0].entity;
        let house = sim.create_house(200.0, 200.0, Some(victim));
        *sim.world_mut().get::<&mut Behavior>(victim).unwrap() = Behavior::Dead(Death {
            cause: DeathCause::Starvation,
            ticks: 0,
        });

        assert_eq!(sim.reap_dead(), 0);
        sim.run(70);
        assert_eq!(sim.dead_citizens(), 1);
        // Killed without cleanup, so only reaping clears the owner.
        assert_eq!(sim.reap_dead(), 1);
        assert_eq!(sim.dead_citizens(), 0);
        assert!(!sim.world().contains(victim));
        assert_eq!(sim.world().get::<&House>(house).unwrap().owner, None);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut flat = small_config(1);
        flat.world.width = 0.0;
        assert!(matches!(
            Simulation::new(flat),
            Err(ConfigError::Invalid {
                field: "world.width",
                ..
            })
        ));

        let mut chancy = small_config(1);
        chancy.resources.berry_spawn_chance = 1.5;
        assert!(matches!(
            Simulation::new(chancy),
            Err(ConfigError::Invalid {
                field: "resources.berry_spawn_chance",
                ..
            })
        ));

        assert!(Simulation::new(small_config(1)).is_ok());
    }

    #[test]
    fn test_house_built_to_completion() {
        let mut sim = Simulation::new(small_config(4)).unwrap();
        let house = sim.create_house(100.0, 100.0, None);
        let mut last = 0.0;
        for _ in 0..15 {
            let mut h = sim.world_mut().get::<&mut House>(house).unwrap();
            h.add_wood(1.0);
            assert!(h.construction_progress >= last);
            last = h.construction_progress;
        }
        assert_eq!(sim.completed_houses(), 1);
        assert_eq!(sim.houses()[0].house.construction_progress, 100.0);
    }
}
