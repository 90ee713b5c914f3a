//! Headless Gauntlet Runner
//!
//! Runs AI vs AI gauntlets and outputs outcome statistics as JSON for
//! balance work and regression tracking.

use std::path::PathBuf;

use clap::Parser;

use hollow_court::content::demo::demo_scenario;
use hollow_court::content::load_scenario;
use hollow_court::run::{run_batch, stats, BatchConfig, ScenarioRunner};

/// Headless Gauntlet Runner - AI vs AI scenario batches
#[derive(Parser, Debug)]
#[command(name = "gauntlet_runner")]
#[command(about = "Run AI vs AI gauntlets and output outcome statistics")]
struct Args {
    /// Scenario file (TOML or JSON); runs the built-in demo gauntlet if omitted
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Number of independent runs in the batch
    #[arg(long, default_value_t = 100)]
    runs: u32,

    /// Base random seed for deterministic batches
    #[arg(long)]
    seed: Option<u64>,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Print each run's per-room outcomes to stderr (runs sequentially)
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);

    let scenario = match &args.scenario {
        Some(path) => match load_scenario(path) {
            Ok(scenario) => scenario,
            Err(error) => {
                eprintln!("failed to load scenario: {}", error);
                std::process::exit(1);
            }
        },
        None => demo_scenario(),
    };

    let config = BatchConfig {
        runs: args.runs,
        base_seed: seed,
    };

    let summary = if args.verbose {
        let reports: Vec<_> = (0..args.runs)
            .map(|index| {
                let report = ScenarioRunner::new(
                    scenario.clone(),
                    seed.wrapping_add(u64::from(index)),
                )
                .run();
                for (room, outcome) in report.outcomes.iter().enumerate() {
                    eprintln!(
                        "run {:>4} room {}: {} ({})",
                        index, room, outcome.condition, outcome.description
                    );
                }
                report
            })
            .collect();
        stats::summarize(&config, &reports)
    } else {
        run_batch(&scenario, &config)
    };

    match args.format.as_str() {
        "text" => {
            println!("scenario: {}", scenario.name);
            println!("runs: {} (seed {})", summary.runs, summary.base_seed);
            println!(
                "dungeon wins: {}  visitor wins: {}  stalemates: {}",
                summary.dungeon_wins, summary.visitor_wins, summary.stalemates
            );
            println!(
                "mean rooms cleared: {:.2}  mean rounds: {:.1}",
                summary.mean_rooms_cleared, summary.mean_rounds
            );
            let mut conditions: Vec<_> = summary.final_conditions.iter().collect();
            conditions.sort_by_key(|(condition, _)| format!("{}", condition));
            for (condition, count) in conditions {
                println!("  {}: {}", condition, count);
            }
        }
        _ => println!(
            "{}",
            serde_json::to_string_pretty(&summary).expect("summary serializes")
        ),
    }
}
