//! Automated playtester - narrates one AI vs AI run of the demo gauntlet
//!
//! A headless pass over the event stream, printing what a renderer would
//! show. Useful for eyeballing pacing and negotiation behavior.

use clap::Parser;

use hollow_court::ai::profile::{AiProfile, ProfileContribution};
use hollow_court::content::demo::demo_scenario;
use hollow_court::content::scenario::VisitorBodyTemplate;
use hollow_court::engine::scheduler::{ControlMode, EncounterEngine};
use hollow_court::engine::state::{DungeonState, VisitorState};
use hollow_court::engine::victory::WinCondition;
use hollow_court::engine::{EncounterContext, StepEventKind};

#[derive(Parser, Debug)]
#[command(name = "playtest")]
#[command(about = "Narrate one AI vs AI run of the demo gauntlet")]
struct Args {
    /// Random seed for a reproducible narration
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let scenario = demo_scenario();
    println!("=== {} (seed {}) ===", scenario.name, args.seed);

    let dungeon = DungeonState::from_template(&scenario.dungeon);
    let visitor = VisitorState::from_template(&scenario.visitor);
    let mut ctx = EncounterContext::new(dungeon, visitor, args.seed);

    for def in &scenario.encounters {
        let dungeon_profile =
            AiProfile::from_contributions(&[&scenario.dungeon.profile, &def.dungeon_fragment]);
        let mut parts: Vec<&ProfileContribution> =
            vec![&scenario.visitor.profile, &def.visitor_fragment];
        if let VisitorBodyTemplate::Party { members, .. } = &scenario.visitor.body {
            parts.extend(members.iter().map(|m| &m.profile));
        }
        let visitor_profile = AiProfile::from_contributions(&parts);

        let mut engine = EncounterEngine::from_context(
            def.clone(),
            ctx,
            [dungeon_profile, visitor_profile],
            [ControlMode::Ai, ControlMode::Ai],
        );

        println!("\n--- {} ---", def.name);
        for _ in 0..100_000 {
            let event = engine.next_step();
            match &event.kind {
                StepEventKind::RoundStart { round } => println!("round {}", round),
                StepEventKind::CardPlayed { side, card, held } => {
                    if *held {
                        println!("  {} holds {}", side, card);
                    } else {
                        println!("  {} plays {}", side, card);
                    }
                }
                StepEventKind::CardSkipped { side, card, reason } => {
                    println!("  {} skips {} ({})", side, card, reason);
                }
                _ => {}
            }
            for line in &event.log {
                println!("    {}", line);
            }
            if matches!(event.kind, StepEventKind::EncounterEnd { .. }) {
                break;
            }
        }

        let outcome = engine.outcome().cloned().expect("room reached an outcome");
        println!(
            "outcome: {} ({}), winner: {}",
            outcome.condition,
            outcome.description,
            outcome
                .winner
                .map(|side| side.to_string())
                .unwrap_or_else(|| "nobody".into())
        );

        ctx = engine.into_context();
        let advance = matches!(
            outcome.condition,
            WinCondition::Survive | WinCondition::Overcome | WinCondition::Dominate
        );
        if !advance {
            println!("\nthe run ends in {}", def.name);
            return;
        }
        ctx.carry_into_next_room();
    }
    println!("\nthe visitor clears the gauntlet");
}
