//! Turn scheduler
//!
//! The encounter engine is a synchronous state machine advanced one event
//! at a time: encounter start, round start, auto-effects, queue collection
//! per side (AI or external input), per-card resolution, round end. Energy
//! plays resolve before non-Energy plays within a queue; unaffordable
//! cards are skipped and logged, never errors.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::ai::policy;
use crate::ai::profile::AiProfile;
use crate::content::card::{Card, CardCategory, CardEffect};
use crate::content::encounter::EncounterDef;
use crate::core::error::{CourtError, Result};
use crate::core::types::Side;
use crate::engine::context::EncounterContext;
use crate::engine::events::{PlayAction, QueuedPlay, StepEvent, StepEventKind};
use crate::engine::resolver;
use crate::engine::snapshot::Snapshot;
use crate::engine::state::VisitorBody;
use crate::engine::traps::TrapEvent;
use crate::engine::victory::{self, Outcome};

/// Who drives a side's card selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlMode {
    Ai,
    External,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum EnginePhase {
    Start,
    RoundStart,
    AutoEffects,
    Collect { side: Side },
    Resolve,
    RoundEnd,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct PendingPlay {
    side: Side,
    card: usize,
    action: PlayAction,
}

/// One encounter, advanced by discrete `next_step()` calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterEngine {
    def: EncounterDef,
    ctx: EncounterContext,
    phase: EnginePhase,
    control: [ControlMode; 2],
    profiles: [AiProfile; 2],
    pools: [Vec<Card>; 2],
    hands: [Vec<usize>; 2],
    queues: [Option<Vec<QueuedPlay>>; 2],
    resolution: VecDeque<PendingPlay>,
    outcome: Option<Outcome>,
    /// Meter fingerprint at round start, for stagnation detection
    baseline: Vec<u32>,
    stagnant_rounds: u32,
}

impl EncounterEngine {
    pub fn from_context(
        def: EncounterDef,
        ctx: EncounterContext,
        profiles: [AiProfile; 2],
        control: [ControlMode; 2],
    ) -> Self {
        Self {
            def,
            ctx,
            phase: EnginePhase::Start,
            control,
            profiles,
            pools: [Vec::new(), Vec::new()],
            hands: [Vec::new(), Vec::new()],
            queues: [None, None],
            resolution: VecDeque::new(),
            outcome: None,
            baseline: Vec::new(),
            stagnant_rounds: 0,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, EnginePhase::Finished)
    }

    pub fn is_awaiting_input(&self) -> Option<Side> {
        match self.phase {
            EnginePhase::Collect { side }
                if self.control[side.index()] == ControlMode::External
                    && self.queues[side.index()].is_none() =>
            {
                Some(side)
            }
            _ => None,
        }
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    pub fn context(&self) -> &EncounterContext {
        &self.ctx
    }

    pub fn into_context(self) -> EncounterContext {
        self.ctx
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.ctx)
    }

    pub fn pool(&self, side: Side) -> &[Card] {
        &self.pools[side.index()]
    }

    /// The dealt hand for an externally controlled side, as pool indices
    pub fn hand(&self, side: Side) -> &[usize] {
        &self.hands[side.index()]
    }

    pub fn save_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn load_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Submit an ordered card queue for an externally controlled side.
    /// Accepted only while the engine is awaiting that side's input.
    pub fn submit_queue(&mut self, side: Side, plays: Vec<QueuedPlay>) -> Result<()> {
        if self.is_awaiting_input() != Some(side) {
            return Err(CourtError::NotAwaitingInput(side));
        }
        let hand = &self.hands[side.index()];
        for (position, play) in plays.iter().enumerate() {
            if !hand.contains(&play.card) {
                return Err(CourtError::QueueRejected(format!(
                    "card #{} is not in the dealt hand",
                    play.card
                )));
            }
            if plays[..position].iter().any(|p| p.card == play.card) {
                return Err(CourtError::QueueRejected(format!(
                    "card #{} submitted twice",
                    play.card
                )));
            }
        }
        self.queues[side.index()] = Some(plays);
        Ok(())
    }

    /// Advance to the next event. Safe to call after the encounter ends;
    /// it keeps reporting the terminal event.
    pub fn next_step(&mut self) -> StepEvent {
        loop {
            match self.phase {
                EnginePhase::Start => {
                    self.phase = EnginePhase::RoundStart;
                    let name = self.def.name.clone();
                    self.ctx.push_log(format!("{} takes notice", name));
                    return self.event(StepEventKind::EncounterStart { name });
                }
                EnginePhase::RoundStart => {
                    self.ctx.round += 1;
                    self.ctx.dungeon.energy.refill();
                    self.ctx.visitor.energy.refill();
                    self.rebuild_pools();
                    self.deal_hands();
                    self.queues = [None, None];
                    self.resolution.clear();
                    self.baseline = self.ctx.fingerprint();
                    self.phase = EnginePhase::AutoEffects;
                    let round = self.ctx.round;
                    return self.event(StepEventKind::RoundStart { round });
                }
                EnginePhase::AutoEffects => {
                    let due: Vec<_> = self
                        .def
                        .auto_effects
                        .iter()
                        .filter(|e| e.cadence.fires_on(self.ctx.round))
                        .cloned()
                        .collect();
                    self.phase = EnginePhase::Collect {
                        side: self.def.initiative,
                    };
                    if due.is_empty() {
                        continue;
                    }
                    for effect in &due {
                        self.ctx.push_log(format!(
                            "{} ({} -{:.1})",
                            effect.note, effect.meter, effect.amount
                        ));
                        self.ctx.apply_meter(effect.meter, -effect.amount);
                    }
                    self.check_terminal();
                    if self.outcome.is_some() {
                        self.phase = EnginePhase::Finished;
                    }
                    return self.event(StepEventKind::AutoEffects);
                }
                EnginePhase::Collect { side } => {
                    if self.queues[side.index()].is_none() {
                        match self.control[side.index()] {
                            ControlMode::Ai => {
                                let profile = self.profiles[side.index()].clone();
                                let pool = std::mem::take(&mut self.pools[side.index()]);
                                let queue = policy::choose_queue(
                                    &mut self.ctx,
                                    side,
                                    &profile,
                                    &pool,
                                    self.def.config.bond_threshold,
                                );
                                self.pools[side.index()] = pool;
                                self.queues[side.index()] = Some(queue);
                            }
                            ControlMode::External => {
                                let hand = self.describe_hand(side);
                                self.ctx.push_log(format!("the {} considers: {}", side, hand));
                                return self.event(StepEventKind::AwaitingInput { side });
                            }
                        }
                    }
                    let other = side.opponent();
                    if self.queues[other.index()].is_none() {
                        self.phase = EnginePhase::Collect { side: other };
                    } else {
                        self.build_resolution();
                        self.phase = EnginePhase::Resolve;
                    }
                }
                EnginePhase::Resolve => match self.resolution.pop_front() {
                    Some(play) => {
                        let kind = self.resolve_play(play);
                        return self.event(kind);
                    }
                    None => self.phase = EnginePhase::RoundEnd,
                },
                EnginePhase::RoundEnd => {
                    self.ctx.tick_conditions();
                    self.check_terminal();
                    let round = self.ctx.round;
                    if self.outcome.is_none() {
                        if let Some(cap) = self.def.config.max_rounds {
                            if round >= cap {
                                self.set_outcome(victory::survive_outcome());
                            }
                        }
                    }
                    if self.outcome.is_none() {
                        if self.ctx.fingerprint() == self.baseline {
                            self.stagnant_rounds += 1;
                        } else {
                            self.stagnant_rounds = 0;
                        }
                        if self.stagnant_rounds >= self.def.config.inert_rounds {
                            self.set_outcome(victory::inert_outcome());
                        }
                    }
                    self.ctx.rotate_kinds();
                    self.phase = if self.outcome.is_some() {
                        EnginePhase::Finished
                    } else {
                        EnginePhase::RoundStart
                    };
                    return self.event(StepEventKind::RoundEnd { round });
                }
                EnginePhase::Finished => {
                    let outcome = self
                        .outcome
                        .clone()
                        .unwrap_or_else(victory::inert_outcome);
                    return self.event(StepEventKind::EncounterEnd { outcome });
                }
            }
        }
    }

    fn event(&mut self, kind: StepEventKind) -> StepEvent {
        StepEvent {
            kind,
            round: self.ctx.round,
            log: self.ctx.drain_log(),
            snapshot: Snapshot::capture(&self.ctx),
        }
    }

    fn set_outcome(&mut self, outcome: Outcome) {
        self.ctx.push_log(outcome.description.clone());
        self.outcome = Some(outcome);
    }

    fn check_terminal(&mut self) {
        if self.outcome.is_some() {
            return;
        }
        if let Some(outcome) = victory::evaluate(&self.ctx, &self.def.config) {
            self.set_outcome(outcome);
        }
    }

    fn rebuild_pools(&mut self) {
        self.pools[Side::Dungeon.index()] = self.def.dungeon_deck.clone();
        let mut visitor = self.def.visitor_deck.clone();
        if let VisitorBody::Party { members, .. } = &self.ctx.visitor.body {
            for member in members.iter().filter(|m| !m.knocked_out) {
                visitor.extend(member.cards.iter().cloned());
            }
        }
        self.pools[Side::Visitor.index()] = visitor;
    }

    fn deal_hands(&mut self) {
        for side in [Side::Dungeon, Side::Visitor] {
            let index = side.index();
            self.hands[index].clear();
            if self.control[index] != ControlMode::External {
                continue;
            }
            let pool_len = self.pools[index].len();
            let hand_size = self.def.config.hand_size.min(pool_len);
            let mut indices: Vec<usize> = (0..pool_len).collect();
            for i in 0..hand_size {
                let j = i + self.ctx.rng.pick(pool_len - i);
                indices.swap(i, j);
            }
            indices.truncate(hand_size);
            self.hands[index] = indices;
        }
    }

    fn describe_hand(&self, side: Side) -> String {
        self.hands[side.index()]
            .iter()
            .filter_map(|&i| self.pools[side.index()].get(i))
            .map(|c| format!("{} ({:.0})", c.name, c.cost))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Interleave both queues into one resolution order: initiative side
    /// first, and Energy plays ahead of the rest within each queue
    fn build_resolution(&mut self) {
        let first = self.def.initiative;
        for side in [first, first.opponent()] {
            let queue = self.queues[side.index()].take().unwrap_or_default();
            let (energy, rest): (Vec<QueuedPlay>, Vec<QueuedPlay>) =
                queue.into_iter().partition(|play| {
                    self.pools[side.index()]
                        .get(play.card)
                        .map(|c| c.category() == CardCategory::Energy)
                        .unwrap_or(false)
                });
            for play in energy.into_iter().chain(rest) {
                self.resolution.push_back(PendingPlay {
                    side,
                    card: play.card,
                    action: play.action,
                });
            }
        }
    }

    fn resolve_play(&mut self, play: PendingPlay) -> StepEventKind {
        let side = play.side;
        let card = match self.pools[side.index()].get(play.card).cloned() {
            Some(card) => card,
            None => {
                tracing::warn!(%side, index = play.card, "queued card does not exist");
                return StepEventKind::CardSkipped {
                    side,
                    card: format!("#{}", play.card),
                    reason: "no such card".into(),
                };
            }
        };

        if !policy::is_playable(&self.ctx, side, &card) {
            self.ctx
                .push_log(format!("{} is not yet playable", card.name));
            return StepEventKind::CardSkipped {
                side,
                card: card.name,
                reason: "trust too low for a covenant".into(),
            };
        }

        let cost = self.ctx.effective_cost(side, &card);
        if !self.ctx.energy(side).can_afford(cost) {
            tracing::warn!(%side, card = %card.name, cost, "skipping unaffordable card");
            self.ctx.push_log(format!(
                "the {} cannot afford {} ({:.1} short)",
                side,
                card.name,
                cost - self.ctx.energy(side).available
            ));
            return StepEventKind::CardSkipped {
                side,
                card: card.name,
                reason: "not enough energy".into(),
            };
        }
        self.ctx.take_attune_discount(side, card.kind);
        self.ctx.energy_mut(side).spend(cost);

        let responder = self.profiles[side.opponent().index()].clone();
        let cooperates = policy::decide_cooperation(
            &self.ctx,
            side.opponent(),
            &responder,
            self.def.config.bond_threshold,
        );
        let report = resolver::resolve_card(&mut self.ctx, side, &card, &responder, cooperates);

        let mut sprung = self.ctx.traps.spring(&TrapEvent::Played {
            side,
            category: card.category(),
        });
        if let Some(recipient) = report.offer_accepted_by {
            sprung.extend(
                self.ctx
                    .traps
                    .spring(&TrapEvent::OfferAccepted { recipient }),
            );
        }
        for trap in &sprung {
            self.ctx.apply_trap(trap);
        }

        self.check_terminal();
        if self.outcome.is_some() {
            self.phase = EnginePhase::Finished;
            self.resolution.clear();
        }

        let held = matches!(card.effect, CardEffect::React { .. });
        StepEventKind::CardPlayed {
            side,
            card: card.name,
            held,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::profile::ProfileContribution;
    use crate::content::card::CardKind;
    use crate::content::encounter::EncounterConfig;
    use crate::content::scenario::{DungeonTemplate, VisitorBodyTemplate, VisitorTemplate};
    use crate::core::types::Meter;
    use crate::engine::state::{DungeonState, VisitorState};
    use crate::engine::victory::WinCondition;

    fn card(name: &str, cost: f32, effect: CardEffect) -> Card {
        Card {
            name: name.into(),
            kind: CardKind::Physical,
            cost,
            keywords: Vec::new(),
            effect,
            trigger: None,
        }
    }

    fn strike(name: &str, cost: f32, power: f32, target: Meter) -> Card {
        card(name, cost, CardEffect::Strike { power, target })
    }

    fn small_def(dungeon_deck: Vec<Card>, visitor_deck: Vec<Card>) -> EncounterDef {
        EncounterDef {
            name: "Test Chamber".into(),
            initiative: Side::Dungeon,
            auto_effects: Vec::new(),
            dungeon_deck,
            visitor_deck,
            config: EncounterConfig {
                max_rounds: Some(8),
                ..EncounterConfig::default()
            },
            dungeon_fragment: ProfileContribution::default(),
            visitor_fragment: ProfileContribution::default(),
        }
    }

    fn fresh_context(seed: u64) -> EncounterContext {
        let dungeon = DungeonState::from_template(&DungeonTemplate {
            structure: 20.0,
            veil: 20.0,
            presence: 20.0,
            base_energy: 3.0,
            profile: ProfileContribution::default(),
        });
        let visitor = VisitorState::from_template(&VisitorTemplate {
            resolve: 10.0,
            nerve: 10.0,
            base_energy: 3.0,
            body: VisitorBodyTemplate::Solitary { vitality: 3.0 },
            profile: ProfileContribution::default(),
        });
        EncounterContext::new(dungeon, visitor, seed)
    }

    fn ai_engine(def: EncounterDef, seed: u64) -> EncounterEngine {
        EncounterEngine::from_context(
            def,
            fresh_context(seed),
            [AiProfile::default(), AiProfile::default()],
            [ControlMode::Ai, ControlMode::Ai],
        )
    }

    fn run_out(engine: &mut EncounterEngine) -> Vec<StepEvent> {
        let mut events = Vec::new();
        for _ in 0..10_000 {
            let event = engine.next_step();
            let done = matches!(event.kind, StepEventKind::EncounterEnd { .. });
            events.push(event);
            if done {
                break;
            }
        }
        events
    }

    #[test]
    fn test_lethal_strike_kills_on_first_resolution() {
        // Room 1 of the reference fixtures: a 3-damage strike against a
        // visitor with vitality 3 ends in Kill
        let def = small_def(
            vec![strike("Crushing Jaw", 2.0, 3.0, Meter::Vitality)],
            Vec::new(),
        );
        let mut engine = ai_engine(def, 42);
        let events = run_out(&mut engine);
        let outcome = engine.outcome().expect("terminal outcome");
        assert_eq!(outcome.condition, WinCondition::Kill);
        assert_eq!(outcome.winner, Some(Side::Dungeon));
        assert!(events
            .iter()
            .any(|e| matches!(&e.kind, StepEventKind::CardPlayed { card, .. } if card == "Crushing Jaw")));
    }

    #[test]
    fn test_max_rounds_yields_survive() {
        // no deck can touch a meter: the round cap decides it
        let def = small_def(
            vec![card(
                "Gather",
                0.0,
                CardEffect::Energy {
                    energy: crate::content::card::EnergyKind::Standard,
                    amount: 1.0,
                    predicate: None,
                },
            )],
            vec![card(
                "Breathe",
                0.0,
                CardEffect::Energy {
                    energy: crate::content::card::EnergyKind::Standard,
                    amount: 1.0,
                    predicate: None,
                },
            )],
        );
        let mut config = EncounterConfig::default();
        config.max_rounds = Some(8);
        config.inert_rounds = 99; // keep stagnation out of this one
        let def = EncounterDef { config, ..def };

        let mut engine = ai_engine(def, 7);
        run_out(&mut engine);
        let outcome = engine.outcome().expect("terminal outcome");
        assert_eq!(outcome.condition, WinCondition::Survive);
        assert_eq!(outcome.winner, Some(Side::Visitor));
    }

    #[test]
    fn test_unaffordable_card_is_skipped_not_fatal() {
        let def = small_def(
            vec![strike("Mountain Fall", 99.0, 5.0, Meter::Vitality)],
            Vec::new(),
        );
        let mut engine = ai_engine(def, 3);
        // step past encounter_start and round_start, then force the
        // expensive card into the dungeon queue
        engine.next_step();
        engine.next_step();
        engine.queues[Side::Dungeon.index()] = Some(vec![QueuedPlay::queue(0)]);
        let events = run_out(&mut engine);
        assert!(events.iter().any(|e| matches!(
            &e.kind,
            StepEventKind::CardSkipped { reason, .. } if reason == "not enough energy"
        )));
    }

    #[test]
    fn test_energy_plays_resolve_before_strikes() {
        // strike costs 4, base energy is 3: it only lands because the
        // energy card queued *after* it resolves first
        let def = small_def(
            vec![
                strike("Heavy Blow", 4.0, 2.0, Meter::Vitality),
                card(
                    "Gather",
                    0.0,
                    CardEffect::Energy {
                        energy: crate::content::card::EnergyKind::Standard,
                        amount: 2.0,
                        predicate: None,
                    },
                ),
            ],
            Vec::new(),
        );
        let mut engine = ai_engine(def, 9);
        engine.next_step();
        engine.next_step();
        engine.queues[Side::Dungeon.index()] =
            Some(vec![QueuedPlay::queue(0), QueuedPlay::queue(1)]);
        engine.queues[Side::Visitor.index()] = Some(Vec::new());
        // collect the first round only
        let mut played: Vec<String> = Vec::new();
        loop {
            let event = engine.next_step();
            match event.kind {
                StepEventKind::CardPlayed { card, .. } => played.push(card),
                StepEventKind::RoundEnd { .. } | StepEventKind::EncounterEnd { .. } => break,
                _ => {}
            }
        }
        assert_eq!(played, vec!["Gather", "Heavy Blow"]);
    }

    #[test]
    fn test_awaiting_input_pauses_until_submission() {
        let def = small_def(
            vec![strike("Claw", 1.0, 1.0, Meter::Vitality)],
            vec![strike("Sword", 1.0, 1.0, Meter::Structure)],
        );
        let mut engine = EncounterEngine::from_context(
            def,
            fresh_context(4),
            [AiProfile::default(), AiProfile::default()],
            [ControlMode::Ai, ControlMode::External],
        );
        // step until the engine asks for visitor input
        let mut saw_awaiting = false;
        for _ in 0..10 {
            let event = engine.next_step();
            if matches!(event.kind, StepEventKind::AwaitingInput { side } if side == Side::Visitor)
            {
                saw_awaiting = true;
                break;
            }
        }
        assert!(saw_awaiting);
        assert_eq!(engine.is_awaiting_input(), Some(Side::Visitor));

        // repeated stepping keeps asking, state unchanged
        let again = engine.next_step();
        assert!(matches!(
            again.kind,
            StepEventKind::AwaitingInput { side } if side == Side::Visitor
        ));

        let hand = engine.hand(Side::Visitor).to_vec();
        assert!(!hand.is_empty());
        engine
            .submit_queue(Side::Visitor, vec![QueuedPlay::queue(hand[0])])
            .expect("valid submission");
        assert_eq!(engine.is_awaiting_input(), None);
    }

    #[test]
    fn test_submission_outside_window_is_rejected() {
        let def = small_def(vec![strike("Claw", 1.0, 1.0, Meter::Vitality)], Vec::new());
        let mut engine = ai_engine(def, 4);
        let result = engine.submit_queue(Side::Visitor, Vec::new());
        assert!(result.is_err());
        let _ = engine.next_step();
    }

    #[test]
    fn test_save_restore_reproduces_steps() {
        let def = small_def(
            vec![
                strike("Claw", 1.0, 1.0, Meter::Vitality),
                card(
                    "Gather",
                    0.0,
                    CardEffect::Energy {
                        energy: crate::content::card::EnergyKind::Standard,
                        amount: 1.0,
                        predicate: None,
                    },
                ),
            ],
            vec![strike("Sword", 1.0, 1.0, Meter::Structure)],
        );
        let mut engine = ai_engine(def, 123);
        for _ in 0..5 {
            engine.next_step();
        }
        let saved = engine.save_json().expect("save");
        let mut restored = EncounterEngine::load_json(&saved).expect("load");

        for _ in 0..50 {
            let a = engine.next_step();
            let b = restored.next_step();
            assert_eq!(a, b);
            if matches!(a.kind, StepEventKind::EncounterEnd { .. }) {
                break;
            }
        }
    }

    #[test]
    fn test_terminal_event_is_idempotent() {
        let def = small_def(
            vec![strike("Crushing Jaw", 2.0, 3.0, Meter::Vitality)],
            Vec::new(),
        );
        let mut engine = ai_engine(def, 42);
        run_out(&mut engine);
        let first = engine.next_step();
        let second = engine.next_step();
        assert_eq!(first.kind, second.kind);
        assert!(matches!(first.kind, StepEventKind::EncounterEnd { .. }));
    }
}
