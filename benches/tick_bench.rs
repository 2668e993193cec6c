//! Benchmark for the daily economy tick

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};

use emberhold::core::config::EconomyConfig;
use emberhold::core::types::Vec2;
use emberhold::economy::EconomyEngine;
use emberhold::settlement::{Settlement, SettlementRegistry};

fn build_world(settlement_count: u32) -> (SettlementRegistry, EconomyEngine) {
    let mut registry = SettlementRegistry::new(12345, 1100);
    for i in 0..settlement_count {
        let population = 50 + i * 400;
        let x = (i % 8) as f32 * 12.0;
        let y = (i / 8) as f32 * 12.0;
        registry.insert(
            Settlement::new(format!("Settlement {i}"), population, Vec2::new(x, y))
                .with_founding_year(1000),
        );
    }
    (registry, EconomyEngine::new(EconomyConfig::default()))
}

fn bench_daily_tick(c: &mut Criterion) {
    c.bench_function("economy_tick_16_settlements", |b| {
        b.iter_batched(
            || build_world(16),
            |(mut registry, mut engine)| engine.run_tick(&mut registry),
            BatchSize::SmallInput,
        )
    });

    c.bench_function("economy_tick_64_settlements", |b| {
        b.iter_batched(
            || build_world(64),
            |(mut registry, mut engine)| engine.run_tick(&mut registry),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_daily_tick);
criterion_main!(benches);
