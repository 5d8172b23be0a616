//! Colony planner entry point.
//!
//! Loads a world snapshot (or generates one from a seed), runs one planning
//! tick over every controlled zone, prints a per-zone summary, and
//! optionally writes the issued orders as JSON.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use colony_core::{
    default_config_toml, default_objectives, generate_world, Controller, OrderLog, PlannerConfig,
    SnapshotWorld, WorldGenParams,
};
use colony_world::WorldSnapshot;

/// Command line arguments for the planner
#[derive(Parser, Debug)]
#[command(name = "colony")]
#[command(about = "Runs one planning tick of the colony controller")]
struct Args {
    /// World snapshot to plan against (JSON); generated from --seed if absent
    #[arg(long)]
    world: Option<PathBuf>,

    /// Random seed for the generated world
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Zones in the generated world
    #[arg(long, default_value_t = 2)]
    zones: usize,

    /// Owned agents per zone in the generated world
    #[arg(long, default_value_t = 6)]
    agents_per_zone: usize,

    /// Planner configuration (TOML); defaults apply if absent
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write issued orders to this file (JSON)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Write the world being planned against to this file (JSON)
    #[arg(long)]
    dump_world: Option<PathBuf>,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default_config: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let args = Args::parse();

    if args.print_default_config {
        print!("{}", default_config_toml());
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => PlannerConfig::from_file(path)?,
        None => PlannerConfig::default(),
    };
    info!(
        strategy = ?config.arbiter.strategy,
        capacity = config.assignment.per_target_capacity,
        max_rounds = config.controller.max_rounds,
        "configuration loaded"
    );

    let world = match &args.world {
        Some(path) => WorldSnapshot::from_json(&fs::read_to_string(path)?)?,
        None => {
            let params = WorldGenParams {
                zones: args.zones,
                agents_per_zone: args.agents_per_zone,
                ..Default::default()
            };
            generate_world(&mut SmallRng::seed_from_u64(args.seed), &params)
        }
    };

    if let Some(path) = &args.dump_world {
        fs::write(path, world.to_json()?)?;
        info!(path = %path.display(), "wrote world snapshot");
    }

    let controller = Controller::new(config)?;
    let objectives = default_objectives(&world, &controller.config().controller);
    let view = SnapshotWorld::new(&world);
    let mut orders = OrderLog::new();

    println!("Colony Planner");
    println!("==============");
    println!("Tick: {}", world.tick);
    println!("Zones: {}", objectives.len());
    println!();

    let results = controller.run_tick(&view, &objectives, &mut orders);
    let mut failed = 0;
    for (zone, outcome) in &results {
        match outcome {
            Ok(report) => {
                println!(
                    "  {}: {} round(s), {} plan(s) accepted, importance {:.2}, {} order(s), unresolved deficit {}",
                    zone,
                    report.rounds.len(),
                    report.accepted.len(),
                    report.accepted_importance(),
                    report.orders_issued,
                    report.unresolved_deficit(),
                );
            }
            Err(err) => {
                failed += 1;
                println!("  {}: FAILED: {}", zone, err);
            }
        }
    }
    println!();
    println!("Total orders: {}", orders.len());

    if let Some(path) = &args.output {
        fs::write(path, orders.to_json()?)?;
        info!(path = %path.display(), orders = orders.len(), "wrote orders");
    }

    if failed > 0 {
        return Err(format!("{} zone(s) failed to plan", failed).into());
    }
    Ok(())
}
