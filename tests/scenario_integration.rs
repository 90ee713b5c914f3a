//! Scenario orchestration integration tests

use hollow_court::ai::profile::{AiProfile, ProfileContribution};
use hollow_court::content::card::{Card, CardEffect, CardKind, EnergyKind};
use hollow_court::content::demo::demo_scenario;
use hollow_court::content::encounter::{AutoEffect, Cadence, EncounterConfig, EncounterDef};
use hollow_court::content::scenario::{DungeonTemplate, VisitorBodyTemplate, VisitorTemplate};
use hollow_court::core::types::{Meter, Side};
use hollow_court::engine::condition::{Condition, ConditionKind};
use hollow_court::engine::scheduler::{ControlMode, EncounterEngine};
use hollow_court::engine::state::{DungeonState, VisitorState};
use hollow_court::engine::victory::WinCondition;
use hollow_court::engine::EncounterContext;
use hollow_court::run::{run_batch, BatchConfig, ScenarioRunner};

fn energy(name: &str) -> Card {
    Card {
        name: name.into(),
        kind: CardKind::Social,
        cost: 0.0,
        keywords: Vec::new(),
        effect: CardEffect::Energy {
            energy: EnergyKind::Standard,
            amount: 1.0,
            predicate: None,
        },
        trigger: None,
    }
}

fn draining_room(name: &str, drain: f32) -> EncounterDef {
    EncounterDef {
        name: name.into(),
        initiative: Side::Dungeon,
        auto_effects: vec![AutoEffect {
            cadence: Cadence::Every,
            meter: Meter::Nerve,
            amount: drain,
            note: "cold air seeps through".into(),
        }],
        dungeon_deck: vec![energy("Gather")],
        visitor_deck: vec![energy("Breathe")],
        config: EncounterConfig {
            max_rounds: Some(1),
            inert_rounds: 99,
            ..EncounterConfig::default()
        },
        dungeon_fragment: ProfileContribution::default(),
        visitor_fragment: ProfileContribution::default(),
    }
}

#[test]
fn demo_gauntlet_reaches_an_outcome() {
    let report = ScenarioRunner::new(demo_scenario(), 11).run();
    assert!(!report.outcomes.is_empty());
    assert!(report.rounds_total > 0);
    assert!(report.rooms_cleared <= 2);
    // run-level winner consistent with the room trail
    if report.rooms_cleared == 2 {
        assert_eq!(report.winner, Some(Side::Visitor));
    } else {
        assert_eq!(report.winner, report.outcomes.last().unwrap().winner);
    }
}

#[test]
fn same_seed_reproduces_the_run() {
    let a = ScenarioRunner::new(demo_scenario(), 1234).run();
    let b = ScenarioRunner::new(demo_scenario(), 1234).run();
    assert_eq!(a.outcomes, b.outcomes);
    assert_eq!(a.rooms_cleared, b.rooms_cleared);
    assert_eq!(a.rounds_total, b.rounds_total);
}

#[test]
fn different_seeds_are_independent_runs() {
    // not asserting different outcomes (they may coincide), just that the
    // runner accepts distinct streams without shared state
    let a = ScenarioRunner::new(demo_scenario(), 1).run();
    let b = ScenarioRunner::new(demo_scenario(), 2).run();
    assert_eq!(a.scenario, b.scenario);
    assert_ne!(a.run_id, b.run_id);
}

#[test]
fn meters_carry_across_rooms_cumulatively() {
    // two one-round rooms, each draining 2 nerve: the second room starts
    // from the first room's worn state, so nerve ends at 12 - 2 - 2
    let mut ctx = {
        let dungeon = DungeonState::from_template(&DungeonTemplate {
            structure: 10.0,
            veil: 10.0,
            presence: 10.0,
            base_energy: 3.0,
            profile: ProfileContribution::default(),
        });
        let visitor = VisitorState::from_template(&VisitorTemplate {
            resolve: 12.0,
            nerve: 12.0,
            base_energy: 3.0,
            body: VisitorBodyTemplate::Solitary { vitality: 8.0 },
            profile: ProfileContribution::default(),
        });
        EncounterContext::new(dungeon, visitor, 5)
    };

    // a per-encounter buff and a persistent toll, to watch the carry filter
    ctx.add_condition(Condition::new(ConditionKind::Fortify, Side::Visitor, 1.0, 9));
    ctx.add_condition(Condition::persistent(
        ConditionKind::DependencyDebt {
            creditor: Side::Dungeon,
        },
        Side::Visitor,
        3.0,
        99,
    ));

    for (index, def) in [draining_room("First", 2.0), draining_room("Second", 2.0)]
        .into_iter()
        .enumerate()
    {
        let mut engine = EncounterEngine::from_context(
            def,
            ctx,
            [AiProfile::default(), AiProfile::default()],
            [ControlMode::Ai, ControlMode::Ai],
        );
        while !engine.is_finished() {
            engine.next_step();
        }
        assert_eq!(
            engine.outcome().unwrap().condition,
            WinCondition::Survive,
            "room {} should time out",
            index
        );
        ctx = engine.into_context();
        ctx.carry_into_next_room();
    }

    assert_eq!(ctx.visitor.nerve.value, 8.0);
    // per-encounter fortify dropped, persistent debt retained
    assert_eq!(ctx.conditions.len(), 1);
    assert!(matches!(
        ctx.conditions[0].kind,
        ConditionKind::DependencyDebt { .. }
    ));
}

#[test]
fn batch_summary_is_seed_stable() {
    let scenario = demo_scenario();
    let config = BatchConfig {
        runs: 3,
        base_seed: 2024,
    };
    let a = run_batch(&scenario, &config);
    let b = run_batch(&scenario, &config);
    assert_eq!(a.dungeon_wins, b.dungeon_wins);
    assert_eq!(a.visitor_wins, b.visitor_wins);
    assert_eq!(a.mean_rooms_cleared, b.mean_rooms_cleared);
}
