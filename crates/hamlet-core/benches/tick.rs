use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hamlet_core::prelude::*;

fn village(citizens: usize) -> Simulation {
    let mut config = SimConfig::default();
    config.population.citizens = citizens;
    let mut sim = Simulation::new(config).expect("default config is valid");
    sim.generate();
    sim
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");
    for citizens in [10, 50] {
        group.bench_function(format!("{citizens}_citizens"), |b| {
            let mut sim = village(citizens);
            b.iter(|| {
                sim.tick();
                black_box(sim.current_tick())
            });
        });
    }
    group.finish();
}

fn bench_generate(c: &mut Criterion) {
    c.bench_function("generate_default_world", |b| {
        b.iter(|| black_box(village(10)).living_citizens())
    });
}

criterion_group!(benches, bench_tick, bench_generate);
criterion_main!(benches);
