//! Tuning constants: hand-tuned values shared by the engine and the harness.
//!
//! Grouped by concern as plain `const`s with no runtime dependency.
//! Anything a scenario may want to override also appears as a default in
//! the engine's `SimConfig`.

pub mod needs {
    pub const MAX_ENERGY: f32 = 100.0;
    pub const MAX_FULLNESS: f32 = 100.0;
    pub const MAX_BOREDOM: f32 = 100.0;

    /// Passive energy consumption per tick.
    pub const ENERGY_DECAY_RATE: f32 = 0.01;
    /// Fullness converted into energy per tick.
    pub const DIGESTION_AMOUNT: f32 = 0.02;
    pub const DIGESTION_EFFICIENCY: f32 = 0.8;

    pub const REST_THRESHOLD: f32 = 10.0;
    /// Forced rest ends once energy exceeds `REST_THRESHOLD * REST_EXIT_FACTOR`.
    pub const REST_EXIT_FACTOR: f32 = 3.0;
    pub const REST_RECOVERY_RATE: f32 = 0.1;
    pub const REST_DIGESTION_BONUS: f32 = 0.03;
    pub const REST_DIGESTION_EFFICIENCY: f32 = 0.9;

    pub const BOREDOM_INCREASE_RATE: f32 = 0.05;
    pub const BOREDOM_MOVING_DECAY: f32 = 0.1;
    /// Below this speed an agent counts as standing still.
    pub const STILL_SPEED: f32 = 0.1;

    /// Energy cost per unit of speed per tick.
    pub const MOVEMENT_ENERGY_COST: f32 = 0.02;
}

pub mod motivation {
    pub const REST_FORCED_SCORE: f32 = 100.0;
    pub const REST_MAX_SCORE: f32 = 80.0;

    pub const EXERCISE_MIN_ENERGY: f32 = 20.0;
    pub const EXERCISE_BOREDOM_START: f32 = 50.0;
    pub const EXERCISE_MAX_SCORE: f32 = 90.0;

    pub const SEEK_FOOD_MAX_SCORE: f32 = 85.0;
    pub const STARVING_FULLNESS: f32 = 20.0;
    pub const STARVING_BONUS: f32 = 10.0;

    pub const COLLECT_WOOD_MIN_SCORE: f32 = 10.0;
    pub const COLLECT_WOOD_MAX_SCORE: f32 = 65.0;
    pub const COLLECT_WOOD_HOUSE_BONUS: f32 = 20.0;
    pub const COLLECT_WOOD_TIRED_PENALTY: f32 = 30.0;
    pub const TIRED_ENERGY: f32 = 30.0;

    pub const BUILD_BASE_SCORE: f32 = 50.0;
    pub const BUILD_WOOD_BONUS: f32 = 30.0;
    pub const BUILD_IN_PROGRESS_BONUS: f32 = 25.0;

    pub const IDLE_SCORE: f32 = 10.0;

    pub const HYSTERESIS_BONUS: f32 = 15.0;
    pub const CHANGE_THRESHOLD: f32 = 10.0;
    /// Decisions are re-evaluated every this many ticks per agent.
    pub const DECISION_INTERVAL: u32 = 5;
}

pub mod steering {
    pub const MAX_SPEED: f32 = 1.5;
    pub const MAX_FORCE: f32 = 0.2;
    pub const ARRIVAL_RADIUS: f32 = 100.0;
    pub const ARRIVAL_MIN_SPEED: f32 = 0.5;

    pub const WANDER_DISTANCE: f32 = 100.0;
    /// Wander targets are clamped into `[inset, 1 - inset]` of world extent.
    pub const WANDER_INSET: f32 = 0.15;
    /// Positions beyond `[inset, 1 - inset]` trigger center steering.
    pub const BOUNDARY_INSET: f32 = 0.12;
    pub const BOUNDARY_FORCE: f32 = 0.3;
    /// Wander target counts as reached inside this distance.
    pub const WANDER_ARRIVE_DISTANCE: f32 = 5.0;

    pub const IDLE_DAMPING: f32 = 0.95;
}

pub mod behavior {
    pub const PERCEPTION: f32 = 150.0;
    pub const HISTORY_LENGTH: usize = 50;
    pub const CITIZEN_SIZE: f32 = 10.0;

    pub const EXERCISE_RADIUS: f32 = 30.0;
    /// Radians per tick.
    pub const EXERCISE_ANGULAR_SPEED: f32 = 0.05;
    pub const EXERCISE_BOREDOM_DECAY: f32 = 0.2;
    pub const EXERCISE_ENERGY_COST: f32 = 0.02;

    pub const WOOD_CAPACITY: f32 = 10.0;
    pub const WOOD_COLLECT_DISTANCE: f32 = 20.0;
    pub const WOOD_COLLECT_RATE: f32 = 2.0;

    pub const BUILD_DISTANCE: f32 = 40.0;
    pub const BUILD_WOOD_PER_TICK: f32 = 1.0;
    /// Wood a citizen must carry before founding a new house.
    pub const NEW_HOUSE_MIN_WOOD: f32 = 5.0;
    pub const NEW_HOUSE_OFFSET: f32 = 50.0;

    pub const DEATH_ANIMATION_TICKS: u32 = 60;
}

pub mod resources {
    pub const WOOD_MIN_AMOUNT: f32 = 5.0;
    pub const WOOD_MAX_AMOUNT: f32 = 15.0;
    /// Largest amount a single completed collection yields.
    pub const WOOD_HARVEST_CAP: f32 = 5.0;
    pub const COLLECTION_COMPLETE: f32 = 100.0;

    pub const HOUSE_WOOD_REQUIRED: f32 = 15.0;
    /// Stored wood at which a construction site becomes a building.
    pub const HOUSE_SITE_WOOD: f32 = 5.0;
    pub const HOUSE_SIZE: f32 = 40.0;

    pub const FOOD_MIN_NUTRITION: f32 = 10.0;
    pub const FOOD_MAX_NUTRITION: f32 = 30.0;
    pub const FOOD_MIN_SIZE: f32 = 6.0;
    pub const FOOD_MAX_SIZE: f32 = 12.0;

    pub const BERRY_SIZE: f32 = 8.0;
    pub const BERRY_REGROW_RATE: f32 = 0.001;
    pub const BERRY_HARVEST_DISTANCE: f32 = 15.0;
    pub const BERRY_MIN_SPACING: f32 = BERRY_SIZE * 3.0;
    pub const MAX_BERRY_BUSHES: usize = 200;
    pub const BERRY_SPAWN_CHANCE: f64 = 0.005;
}

pub mod terrain {
    pub const DEFAULT_CELL_SIZE: f32 = 5.0;
    pub const DEFAULT_OCEAN_THRESHOLD: f32 = 0.45;
    pub const NOISE_SCALE: f64 = 0.05;
    pub const RESOURCE_NOISE_SCALE: f64 = 0.1;

    pub const SMOOTHING_ITERATIONS: usize = 3;
    /// A cell flips when strictly more than this many of its 8 neighbors differ.
    pub const SMOOTHING_NEIGHBOR_LIMIT: usize = 5;

    pub const MIN_OCEAN_THRESHOLD: f32 = 0.2;
    pub const MAX_OCEAN_THRESHOLD: f32 = 0.8;
    pub const MIN_CELL_SIZE: f32 = 2.0;
    pub const MAX_CELL_SIZE: f32 = 40.0;
    pub const LAND_SEARCH_ATTEMPTS: usize = 50;
}

pub mod forage {
    /// Organisms step once every this many ticks.
    pub const MOVEMENT_INTERVAL: u32 = 30;
    pub const MEMORY_DURATION: u32 = 20;
    pub const HISTORY_LENGTH: usize = 10;
    pub const EXPLORE_CHANCE: f64 = 0.2;
    pub const RECENT_WEIGHT: f32 = 0.2;
    pub const GAIN_WEIGHT: f32 = 10.0;
    pub const LOSS_WEIGHT: f32 = 2.0;
    pub const MOMENTUM_FACTOR: f32 = 1.5;
    pub const MIN_WEIGHT: f32 = 0.1;
    pub const STAY_WEIGHT: f32 = 0.5;
    pub const POOR_RESOURCE: f32 = 0.4;
    pub const POOR_STAY_FACTOR: f32 = 0.2;

    pub const START_ENERGY: f32 = 5.0;
    pub const MAX_ENERGY: f32 = 10.0;
    pub const ENERGY_LOSS_RATE: f32 = 0.01;
    pub const BERRY_BITE: f32 = 0.01;
    pub const BERRY_ENERGY: f32 = 10.0;
}
