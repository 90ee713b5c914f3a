//! Card-scoring decision policy
//!
//! Scores every legal card in the candidate pool as
//! `base_weight[category] x context multiplier` and picks an affordable
//! queue greedily by score. Both sides run the same machinery with
//! different profiles; randomness only breaks ties, so a seeded run is
//! reproducible.

use ordered_float::OrderedFloat;

use crate::ai::profile::AiProfile;
use crate::content::card::{Card, CardCategory, CardEffect, Keyword};
use crate::core::types::Side;
use crate::engine::context::EncounterContext;
use crate::engine::events::{PlayAction, QueuedPlay};

/// Preferred strike targets multiply the score by this much
const PREFERRED_TARGET_BOOST: f32 = 1.25;
/// Playable covenant offers get a strong push toward the Bond route
const COVENANT_BOOST: f32 = 2.0;

/// A covenant offer is only playable once the offerer's trust clears its bar
pub fn is_playable(ctx: &EncounterContext, side: Side, card: &Card) -> bool {
    match &card.effect {
        CardEffect::Offer { offer } if offer.covenant => offer
            .covenant_requirement
            .map(|r| ctx.held_trust(side) >= r.min_trust)
            .unwrap_or(false),
        _ => true,
    }
}

/// Has this profile's deceptive turn been triggered?
pub fn in_betrayal_mode(
    ctx: &EncounterContext,
    side: Side,
    profile: &AiProfile,
    bond_threshold: f32,
) -> bool {
    profile
        .betrayal_trigger(bond_threshold)
        .map(|trigger| ctx.held_trust(side) >= trigger)
        .unwrap_or(false)
}

/// Cooperate/defect decision for Test cards and offer dispositions:
/// cooperate once held trust plus round pressure clears the profile bar.
/// A triggered deceptive profile always defects.
pub fn decide_cooperation(
    ctx: &EncounterContext,
    responder: Side,
    profile: &AiProfile,
    bond_threshold: f32,
) -> bool {
    if in_betrayal_mode(ctx, responder, profile, bond_threshold) {
        return false;
    }
    let pressure = ctx.held_trust(responder) + 0.25 * ctx.round as f32;
    pressure >= profile.cooperation_threshold()
}

fn combo_multiplier(
    ctx: &EncounterContext,
    side: Side,
    card: &Card,
    selected: &[usize],
    pool: &[Card],
) -> f32 {
    let completes_combo = match card.category() {
        // a strike right after a queued empower
        CardCategory::Strike => {
            selected
                .iter()
                .any(|&i| pool[i].category() == CardCategory::Empower)
                || (card.has_keyword(Keyword::Resonate) && ctx.resonates(side, card.kind))
        }
        // an offer walking into our own armed offer trap
        CardCategory::Offer => ctx.traps.armed_by(side) > 0,
        // an empower with a strike still unqueued is half a combo
        CardCategory::Empower => pool.iter().enumerate().any(|(i, c)| {
            !selected.contains(&i) && c.category() == CardCategory::Strike
        }),
        _ => false,
    };
    if completes_combo {
        1.0
    } else {
        0.0
    }
}

/// Score one candidate card in the current selection context
pub fn score_card(
    ctx: &EncounterContext,
    side: Side,
    profile: &AiProfile,
    card: &Card,
    selected: &[usize],
    pool: &[Card],
    betrayal: bool,
) -> f32 {
    let category = card.category();
    let mut weight = profile.weight(category);

    if betrayal {
        // a turned profile wants damage, not friendship
        weight = match category {
            CardCategory::Strike => weight * (1.0 + 2.0 * profile.betrayal_affinity),
            CardCategory::Offer | CardCategory::Test => weight * 0.1,
            _ => weight,
        };
    } else if matches!(category, CardCategory::Offer | CardCategory::Test) {
        weight *= 1.0 + profile.bond_affinity;
    }

    let mut multiplier = 1.0;
    if let CardEffect::Strike { target, .. } = &card.effect {
        if profile.preferred_targets.contains(target) {
            multiplier *= PREFERRED_TARGET_BOOST;
        }
    }
    multiplier *= 1.0 + profile.combo_awareness * combo_multiplier(ctx, side, card, selected, pool);

    if category == CardCategory::Energy
        && ctx.energy(side).available < ctx.energy(side).base * 0.5
    {
        multiplier *= 1.0 + profile.energy_eagerness;
    }

    if let CardEffect::Offer { offer } = &card.effect {
        if offer.covenant {
            multiplier *= COVENANT_BOOST;
        }
    }

    weight * multiplier
}

/// Greedy queue selection: repeatedly take the highest-scoring affordable
/// card until energy runs out or nothing scores above zero. Queued Energy
/// plays extend the budget since they resolve first. Falls back to the
/// cheapest Energy card when nothing else qualifies.
pub fn choose_queue(
    ctx: &mut EncounterContext,
    side: Side,
    profile: &AiProfile,
    pool: &[Card],
    bond_threshold: f32,
) -> Vec<QueuedPlay> {
    let betrayal = in_betrayal_mode(ctx, side, profile, bond_threshold);
    let mut budget = ctx.energy(side).available;
    let mut selected: Vec<usize> = Vec::new();

    loop {
        let mut best_score = 0.0_f32;
        let mut best: Vec<usize> = Vec::new();
        for (index, card) in pool.iter().enumerate() {
            if selected.contains(&index) || !is_playable(ctx, side, card) {
                continue;
            }
            let cost = ctx.effective_cost(side, card);
            if cost > budget + 1e-6 {
                continue;
            }
            let score = score_card(ctx, side, profile, card, &selected, pool, betrayal);
            if score <= 0.0 {
                continue;
            }
            match OrderedFloat(score).cmp(&OrderedFloat(best_score)) {
                std::cmp::Ordering::Greater => {
                    best_score = score;
                    best = vec![index];
                }
                std::cmp::Ordering::Equal => best.push(index),
                std::cmp::Ordering::Less => {}
            }
        }
        if best.is_empty() {
            break;
        }
        let choice = if best.len() == 1 {
            best[0]
        } else {
            best[ctx.rng.pick(best.len())]
        };
        budget -= ctx.effective_cost(side, &pool[choice]);
        if let CardEffect::Energy { amount, .. } = &pool[choice].effect {
            budget += amount;
        }
        selected.push(choice);
    }

    if selected.is_empty() {
        // no legal action scored above zero: default to the cheapest
        // affordable Energy card, or pass
        let cheapest = pool
            .iter()
            .enumerate()
            .filter(|(_, c)| matches!(c.effect, CardEffect::Energy { .. }))
            .filter(|(_, c)| ctx.effective_cost(side, c) <= ctx.energy(side).available + 1e-6)
            .min_by_key(|(_, c)| OrderedFloat(c.cost));
        if let Some((index, _)) = cheapest {
            selected.push(index);
        }
    }

    selected
        .into_iter()
        .map(|index| {
            let action = match pool[index].effect {
                CardEffect::React { .. } => PlayAction::Hold,
                _ => PlayAction::Queue,
            };
            QueuedPlay {
                card: index,
                action,
            }
        })
        .collect()
}
