//! Hamlet Headless Simulation Harness
//!
//! Validates terrain, resource rules and agent invariants end to end.
//! Runs entirely in-process with no rendering or input devices.
//!
//! Usage:
//!   cargo run -p hamlet-simtest
//!   cargo run -p hamlet-simtest -- --verbose

use std::collections::HashMap;

use hamlet_core::prelude::*;
use hamlet_logic::constants::behavior::DEATH_ANIMATION_TICKS;
use hamlet_logic::terrain::{generate, TerrainGrid};
use hamlet_logic::utility::{score_motivations, select_motivation, Hysteresis, Motivation, MotivationInput};
use hamlet_logic::vector::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;

// ── Scenario (same JSON a front end would load) ────────────────────────
const VILLAGE_JSON: &str = include_str!("../../../data/village.json");

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== Hamlet Simulation Harness ===\n");

    let mut results = Vec::new();

    // 1. Scenario file
    let config = load_scenario(&mut results).unwrap_or_default();

    // 2. Terrain determinism & wrap
    results.extend(validate_terrain(&config, verbose));

    // 3. Resource entity rules
    results.extend(validate_resources(verbose));

    // 4. Forced rest
    results.extend(validate_forced_rest(&config, verbose));

    // 5. Long run: clamping, terminal death, house progress
    results.extend(validate_long_run(&config, verbose));

    // 6. Utility AI decision sweep
    results.extend(validate_utility_ai(verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn setup_failure(name: &str, error: ConfigError) -> TestResult {
    TestResult {
        name: name.into(),
        passed: false,
        detail: format!("invalid config: {}", error),
    }
}

// ── 1. Scenario ─────────────────────────────────────────────────────────

fn load_scenario(results: &mut Vec<TestResult>) -> Option<SimConfig> {
    println!("--- Scenario ---");

    let raw: serde_json::Value = match serde_json::from_str(VILLAGE_JSON) {
        Ok(v) => v,
        Err(e) => {
            results.push(TestResult {
                name: "scenario_parse".into(),
                passed: false,
                detail: format!("JSON parse error: {}", e),
            });
            return None;
        }
    };
    let sections = ["world", "terrain", "population", "resources", "citizen", "organism", "schedule"];
    let missing: Vec<&str> = sections
        .iter()
        .copied()
        .filter(|s| raw.get(s).is_none())
        .collect();
    results.push(TestResult {
        name: "scenario_sections".into(),
        passed: missing.is_empty(),
        detail: if missing.is_empty() {
            "all sections present".into()
        } else {
            format!("missing: {}", missing.join(", "))
        },
    });

    match SimConfig::from_json(VILLAGE_JSON) {
        Ok(config) => {
            results.push(TestResult {
                name: "scenario_valid".into(),
                passed: true,
                detail: format!(
                    "seed {}, {} citizens, {} organisms",
                    config.seed, config.population.citizens, config.population.organisms
                ),
            });
            Some(config)
        }
        Err(e) => {
            results.push(TestResult {
                name: "scenario_valid".into(),
                passed: false,
                detail: e.to_string(),
            });
            None
        }
    }
}

// ── 2. Terrain ──────────────────────────────────────────────────────────

fn validate_terrain(config: &SimConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Terrain ---");
    let mut results = Vec::new();

    // Seed 42, 10x10, threshold 0.45 twice -> identical
    let a = generate(42, 10, 10, 0.45);
    let b = generate(42, 10, 10, 0.45);
    results.push(TestResult {
        name: "terrain_seed_42_reproducible".into(),
        passed: a == b,
        detail: format!("land fraction {:.2}", a.land_fraction()),
    });

    // Full-size world from the scenario
    let params = config.terrain_params();
    let (cols, rows) = params.grid_size(config.world.width, config.world.height);
    let grid = TerrainGrid::generate_with(&params, cols, rows);
    let land = grid.land_fraction();
    results.push(TestResult {
        name: "terrain_has_land_and_ocean".into(),
        passed: land > 0.0 && land < 1.0,
        detail: format!("{}x{} grid, {:.1}% land", cols, rows, land * 100.0),
    });

    let dry_ocean = grid
        .cells()
        .iter()
        .filter(|c| !c.is_land && c.resource_density != 0.0)
        .count();
    let bad_density = grid
        .cells()
        .iter()
        .filter(|c| !(0.0..=1.0).contains(&c.resource_density))
        .count();
    results.push(TestResult {
        name: "terrain_density_range".into(),
        passed: dry_ocean == 0 && bad_density == 0,
        detail: format!("{} ocean cells with density, {} out of range", dry_ocean, bad_density),
    });

    // Toroidal wrap
    let width = grid.width();
    let height = grid.height();
    let mut wrap_failures = 0;
    for i in 0..500 {
        let x = i as f32 * 3.7 % width;
        let y = i as f32 * 2.3 % height;
        if grid.terrain_at(x, y) != grid.terrain_at(x + width, y)
            || grid.terrain_at(x, y) != grid.terrain_at(x, y - height)
        {
            wrap_failures += 1;
        }
    }
    results.push(TestResult {
        name: "terrain_toroidal_wrap".into(),
        passed: wrap_failures == 0,
        detail: format!("{} mismatches over 500 samples", wrap_failures),
    });

    if verbose {
        println!("  terrain: {}x{} cells of {}", cols, rows, params.cell_size);
    }

    results
}

// ── 3. Resources ────────────────────────────────────────────────────────

fn validate_resources(verbose: bool) -> Vec<TestResult> {
    println!("--- Resources ---");
    let mut results = Vec::new();
    let mut world = hecs::World::new();
    let alice = world.spawn(());
    let bob = world.spawn(());

    // Wood 5, one full collection -> 5, depleted
    let mut wood = Wood::new(5.0);
    wood.start_collection(alice);
    let got = wood.update_collection(100.0);
    results.push(TestResult {
        name: "wood_small_pile_harvest".into(),
        passed: got == 5.0 && wood.is_depleted() && wood.collector.is_none(),
        detail: format!("yield {}, remaining {}", got, wood.amount),
    });

    // Wood 15 -> capped chunks, exactly once per completion
    let mut wood = Wood::new(15.0);
    let mut yields = Vec::new();
    for _ in 0..3 {
        wood.try_claim(alice);
        let mut got = 0.0;
        for _ in 0..50 {
            got += wood.update_collection(2.0);
        }
        yields.push(got);
    }
    results.push(TestResult {
        name: "wood_capped_yield".into(),
        passed: yields == vec![5.0, 5.0, 5.0] && wood.is_depleted(),
        detail: format!("yields {:?}", yields),
    });

    // Exclusive claim
    let mut wood = Wood::new(10.0);
    let first = wood.try_claim(alice);
    let second = wood.try_claim(bob);
    results.push(TestResult {
        name: "wood_claim_exclusive".into(),
        passed: first && !second,
        detail: format!("alice {}, bob {}", first, second),
    });

    // House 15 + 15 -> complete
    let mut house = House::new(15.0);
    let accepted = house.add_wood(15.0);
    results.push(TestResult {
        name: "house_completion_exact".into(),
        passed: accepted == 15.0 && house.construction_progress == 100.0 && house.is_complete,
        detail: format!("progress {}", house.construction_progress),
    });
    let extra = house.add_wood(5.0);
    results.push(TestResult {
        name: "house_completion_permanent".into(),
        passed: extra == 0.0 && house.is_complete && house.wood_stored == 15.0,
        detail: format!("accepted {} after completion", extra),
    });

    // Berry regrowth never exceeds a full bush
    let mut bush = BerryBush::new(0.001);
    bush.harvest(0.5);
    for _ in 0..2000 {
        bush.update();
    }
    results.push(TestResult {
        name: "berry_regrow_capped".into(),
        passed: bush.berries == 1.0,
        detail: format!("berries {:.3}", bush.berries),
    });

    if verbose {
        println!("  resource rules checked");
    }

    results
}

// ── 4. Forced rest ──────────────────────────────────────────────────────

fn validate_forced_rest(config: &SimConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Forced Rest ---");
    let mut results = Vec::new();

    let mut scenario = config.clone();
    scenario.population.citizens = 0;
    scenario.population.organisms = 0;
    let mut sim = match Simulation::new(scenario) {
        Ok(sim) => sim,
        Err(e) => {
            results.push(setup_failure("forced_rest_setup", e));
            return results;
        }
    };
    sim.generate();

    let center = sim.bounds().center();
    let citizen = sim.spawn_citizen(center.x, center.y);
    let threshold = sim.config().citizen.rest_threshold;
    if let Ok((needs, motion)) = sim.world_mut().query_one_mut::<(&mut Needs, &mut Motion)>(citizen) {
        needs.energy = threshold / 2.0;
        motion.velocity = Vec2::new(1.0, 0.5);
    }
    sim.tick();

    let view = sim.citizens().into_iter().find(|c| c.entity == citizen);
    let (behavior, speed) = view
        .map(|v| (v.behavior, v.velocity.length()))
        .unwrap_or((Behavior::Idle, f32::NAN));
    results.push(TestResult {
        name: "forced_rest_next_tick".into(),
        passed: behavior == Behavior::Resting { forced: true } && speed == 0.0,
        detail: format!("energy {} → {} at speed {}", threshold / 2.0, behavior.label(), speed),
    });

    // Stays put until energy clears three times the threshold (less one tick of movement)
    let mut ticks = 0;
    while ticks < 2000 {
        sim.tick();
        ticks += 1;
        let still_resting = sim
            .world()
            .get::<&Behavior>(citizen)
            .map(|b| b.is_forced_rest())
            .unwrap_or(false);
        if !still_resting {
            break;
        }
    }
    let energy = sim.world().get::<&Needs>(citizen).map(|n| n.energy).unwrap_or(0.0);
    results.push(TestResult {
        name: "forced_rest_recovers".into(),
        passed: energy > threshold * 3.0 - 0.1,
        detail: format!("left forced rest after {} ticks at energy {:.1}", ticks, energy),
    });

    // An empty citizen starves on the spot, resting or not
    let starving = sim.spawn_citizen(center.x, center.y);
    if let Ok(needs) = sim.world_mut().query_one_mut::<&mut Needs>(starving) {
        needs.energy = 0.0;
        needs.fullness = 0.0;
    }
    sim.tick();
    let behavior = sim
        .world()
        .get::<&Behavior>(starving)
        .map(|b| *b)
        .unwrap_or(Behavior::Idle);
    results.push(TestResult {
        name: "starvation_within_one_tick".into(),
        passed: matches!(
            behavior,
            Behavior::Dead(Death {
                cause: DeathCause::Starvation,
                ..
            })
        ),
        detail: format!("energy 0 → {}", behavior.label()),
    });

    if verbose {
        println!("  forced rest scenario complete");
    }

    results
}

// ── 5. Long run ─────────────────────────────────────────────────────────

fn validate_long_run(config: &SimConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Long Run ---");
    let mut results = Vec::new();

    let mut sim = match Simulation::new(config.clone()) {
        Ok(sim) => sim,
        Err(e) => {
            results.push(setup_failure("long_run_setup", e));
            return results;
        }
    };
    sim.generate();

    let mut clamp_violations = 0;
    let mut resurrections = 0;
    let mut moved_corpses = 0;
    let mut regressions = 0;
    let mut dead_at: HashMap<hecs::Entity, Vec2> = HashMap::new();
    let mut progress: HashMap<hecs::Entity, (f32, bool)> = HashMap::new();
    let ticks = 5000;

    for _ in 0..ticks {
        sim.tick();

        for c in sim.citizens() {
            if !c.needs.is_within_bounds() || c.inventory.wood > c.inventory.wood_capacity {
                clamp_violations += 1;
            }
            match dead_at.get(&c.entity).copied() {
                Some(_) if !c.behavior.is_dead() => resurrections += 1,
                Some(pos) if pos != c.position => moved_corpses += 1,
                Some(_) => {}
                None if c.behavior.is_dead() => {
                    dead_at.insert(c.entity, c.position);
                }
                None => {}
            }
        }

        for h in sim.houses() {
            let now = (h.house.construction_progress, h.house.is_complete);
            if let Some(&(before, was_complete)) = progress.get(&h.entity) {
                if now.0 < before || (was_complete && !now.1) {
                    regressions += 1;
                }
            }
            progress.insert(h.entity, now);
        }
    }

    results.push(TestResult {
        name: "needs_clamped".into(),
        passed: clamp_violations == 0,
        detail: format!("{} violations over {} ticks", clamp_violations, ticks),
    });
    results.push(TestResult {
        name: "death_terminal".into(),
        passed: resurrections == 0 && moved_corpses == 0,
        detail: format!(
            "{} deaths, {} resurrections, {} moved corpses",
            dead_at.len(),
            resurrections,
            moved_corpses
        ),
    });
    results.push(TestResult {
        name: "house_progress_monotonic".into(),
        passed: regressions == 0,
        detail: format!(
            "{} houses ({} complete), {} regressions",
            sim.house_count(),
            sim.completed_houses(),
            regressions
        ),
    });
    results.push(TestResult {
        name: "resources_replenished".into(),
        passed: sim.food_count() == config.resources.food_target
            && sim.wood_count() == config.resources.wood_target,
        detail: format!("{} food, {} wood", sim.food_count(), sim.wood_count()),
    });

    // Corpses whose animation finished are removed along with references to them
    let dead_before = sim.dead_citizens();
    sim.run(DEATH_ANIMATION_TICKS as u64);
    let reaped = sim.reap_dead();
    let dangling = sim
        .houses()
        .iter()
        .filter(|h| h.house.owner.is_some_and(|o| !sim.world().contains(o)))
        .count();
    results.push(TestResult {
        name: "reap_clears_references".into(),
        passed: dangling == 0 && reaped >= dead_before,
        detail: format!("reaped {} agents, {} dangling owners", reaped, dangling),
    });

    if verbose {
        println!(
            "  after {} ticks: {} living, {} dead citizens",
            sim.current_tick(),
            sim.living_citizens(),
            sim.dead_citizens()
        );
    }

    results
}

// ── 6. Utility AI ───────────────────────────────────────────────────────

fn validate_utility_ai(verbose: bool) -> Vec<TestResult> {
    println!("--- Utility AI ---");
    let mut results = Vec::new();
    let hysteresis = Hysteresis::default();

    // Exhausted → rest, whatever the incumbent
    let exhausted = MotivationInput {
        energy: 5.0,
        ..Default::default()
    };
    let scores = score_motivations(&exhausted);
    let all_rest = Motivation::ALL
        .iter()
        .all(|&m| select_motivation(&scores, Some(m), &hysteresis) == Motivation::Rest);
    results.push(TestResult {
        name: "utility_exhausted_rests".into(),
        passed: all_rest,
        detail: format!("rest score {}", scores.get(Motivation::Rest)),
    });

    // Starving → food
    let starving = MotivationInput {
        energy: 70.0,
        fullness: 3.0,
        ..Default::default()
    };
    let pick = select_motivation(&score_motivations(&starving), Some(Motivation::Idle), &hysteresis);
    results.push(TestResult {
        name: "utility_starving_eats".into(),
        passed: pick == Motivation::SeekFood,
        detail: format!("fullness=3 → {}", pick.name()),
    });

    // Carrying wood with an unfinished house → build
    let builder = MotivationInput {
        energy: 80.0,
        fullness: 80.0,
        wood: 10.0,
        owns_incomplete_house: true,
        ..Default::default()
    };
    let pick = select_motivation(&score_motivations(&builder), Some(Motivation::Idle), &hysteresis);
    results.push(TestResult {
        name: "utility_builder_builds".into(),
        passed: pick == Motivation::BuildHouse,
        detail: format!("wood=10 → {}", pick.name()),
    });

    // NaN scores fall back deterministically
    let broken = MotivationInput {
        energy: f32::NAN,
        fullness: f32::NAN,
        boredom: f32::NAN,
        ..Default::default()
    };
    let scores = score_motivations(&broken);
    let first = select_motivation(&scores, None, &hysteresis);
    let second = select_motivation(&scores, None, &hysteresis);
    results.push(TestResult {
        name: "utility_nan_fallback".into(),
        passed: first == second,
        detail: format!("fallback → {}", first.name()),
    });

    // Sweep: scores finite and non-negative across the need space
    let mut rng = StdRng::seed_from_u64(2024);
    let mut bad = 0;
    let mut sweeps = 0;
    for energy in (0..=100).step_by(10) {
        for fullness in (0..=100).step_by(10) {
            for boredom in (0..=100).step_by(25) {
                let input = MotivationInput {
                    energy: energy as f32,
                    fullness: fullness as f32,
                    boredom: boredom as f32,
                    wood: rand::Rng::gen_range(&mut rng, 0.0..=10.0),
                    ..Default::default()
                };
                sweeps += 1;
                if score_motivations(&input).iter().any(|(_, s)| !s.is_finite() || s < 0.0) {
                    bad += 1;
                }
            }
        }
    }
    results.push(TestResult {
        name: "utility_sweep_scores_valid".into(),
        passed: bad == 0,
        detail: format!("{} of {} inputs produced invalid scores", bad, sweeps),
    });

    if verbose {
        println!("  {} utility inputs swept", sweeps);
    }

    results
}
