//! Economy simulation runner
//!
//! Drives the daily economy tick over a scenario file (or a built-in demo
//! world) and prints periodic settlement summaries.

use std::path::PathBuf;

use clap::Parser;

use emberhold::core::config::EconomyConfig;
use emberhold::core::types::Vec2;
use emberhold::economy::EconomyEngine;
use emberhold::scenario::Scenario;
use emberhold::settlement::{Settlement, SettlementRegistry};

#[derive(Parser, Debug)]
#[command(name = "run_economy", about = "Run the settlement economy simulation")]
struct Args {
    /// Scenario TOML file; omit to run the built-in demo world
    #[arg(short, long)]
    scenario: Option<PathBuf>,

    /// Number of days to simulate
    #[arg(short, long, default_value_t = 30)]
    days: u32,

    /// RNG seed for the built-in demo world
    #[arg(long, default_value_t = 12345)]
    seed: u64,

    /// Print settlement status every N days
    #[arg(long, default_value_t = 5)]
    report_every: u32,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    let (mut registry, mut engine) = match &args.scenario {
        Some(path) => match Scenario::from_path(path) {
            Ok(scenario) => scenario.build(),
            Err(error) => {
                tracing::error!(%error, "failed to load scenario");
                std::process::exit(1);
            }
        },
        None => demo_world(args.seed),
    };

    if let Err(error) = engine.config().validate() {
        tracing::error!(%error, "invalid economy configuration");
        std::process::exit(1);
    }

    tracing::info!(
        settlements = registry.len(),
        days = args.days,
        "starting simulation"
    );

    let report_every = args.report_every.max(1);
    for _ in 0..args.days {
        let report = engine.run_tick(&mut registry);

        if report.day % report_every == 0 {
            println!("--- Day {} ---", report.day);
            for settlement in registry.iter() {
                let status = settlement.status();
                if status.is_active {
                    println!(
                        "{}: pop={} tier={} stability={:.1} integrity={:.1} trade={:.1}",
                        status.name,
                        status.population,
                        status.tier,
                        status.stability_score,
                        status.integrity,
                        status.trade_volume_current,
                    );
                } else {
                    let reason = status
                        .collapse_reason
                        .map(|r| r.as_str())
                        .unwrap_or("unknown");
                    println!("{}: COLLAPSED ({reason})", status.name);
                }
            }
        }
    }

    if let Some(summary) = engine.economy_summary() {
        println!("\n=== Economy Summary ===");
        println!("Days simulated: {}", summary.current_day);
        println!("Avg population: {:.0}", summary.avg_total_population);
        println!("Avg trade volume: {:.1}", summary.avg_trade_volume);
        println!("Evolutions (last week): {}", summary.total_evolutions);
        println!("Collapses (last week): {}", summary.total_collapses);
    }
    println!(
        "Caravans dispatched: {}, still in transit: {}",
        engine.caravans().len(),
        engine.active_caravans().count()
    );

    println!("\n=== Final Resources ===");
    for settlement in registry.iter() {
        if !settlement.is_active {
            continue;
        }
        println!("{}:", settlement.name);
        for (kind, summary) in settlement.resource_summary() {
            if summary.stockpile > 0.0 || summary.net_production != 0.0 {
                println!(
                    "  {kind}: stock={:.1} net={:+.1}",
                    summary.stockpile, summary.net_production
                );
            }
        }
    }
}

/// Built-in four-settlement demo world
fn demo_world(seed: u64) -> (SettlementRegistry, EconomyEngine) {
    let mut registry = SettlementRegistry::new(seed, 1100);

    registry.insert(
        Settlement::new("Riverside Hamlet", 45, Vec2::new(10.0, 20.0)).with_founding_year(1000),
    );

    let mut millbrook =
        Settlement::new("Millbrook Village", 350, Vec2::new(15.0, 18.0)).with_founding_year(980);
    millbrook.set_reputation("merchant_guild", 80.0);
    millbrook.set_governing_faction("merchant_guild", Some("merchant republic"), 1100);
    registry.insert(millbrook);

    let mut ironhold =
        Settlement::new("Ironhold Town", 1200, Vec2::new(12.0, 25.0)).with_founding_year(960);
    ironhold.set_reputation("miners_union", 60.0);
    ironhold.set_governing_faction("miners_union", Some("guild confederation"), 1100);
    registry.insert(ironhold);

    registry.insert(
        Settlement::new("Goldspire City", 5500, Vec2::new(20.0, 30.0)).with_founding_year(920),
    );

    let engine = EconomyEngine::new(EconomyConfig::default());
    (registry, engine)
}
