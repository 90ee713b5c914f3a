//! Built-in demonstration scenario
//!
//! A two-room gauntlet exercising the full card surface: negotiation and
//! traps in the first room, physical attrition in the second. The bins
//! and the stats tests run against this when no scenario file is given.

use crate::ai::profile::ProfileContribution;
use crate::content::card::{
    Card, CardEffect, CardKind, CounterFollowup, CovenantRequirement, EmpowerBoost, EnergyKind,
    Hindrance, Investment, Keyword, OfferBenefit, OfferCost, OfferSpec, ReactReward, ReshapeSpec,
    StatePredicate, TestSpec, TrapEffect, TrapTrigger,
};
use crate::content::encounter::{AutoEffect, Cadence, EncounterConfig, EncounterDef};
use crate::content::scenario::{
    DungeonTemplate, MemberTemplate, MoralePenalty, ScenarioDef, VisitorBodyTemplate,
    VisitorTemplate,
};
use crate::core::types::{Meter, Side};

fn card(name: &str, kind: CardKind, cost: f32, effect: CardEffect) -> Card {
    Card {
        name: name.into(),
        kind,
        cost,
        keywords: Vec::new(),
        effect,
        trigger: None,
    }
}

fn with_keywords(mut card: Card, keywords: Vec<Keyword>) -> Card {
    card.keywords = keywords;
    card
}

fn visitor_base_deck() -> Vec<Card> {
    vec![
        card(
            "Steady Breath",
            CardKind::Social,
            0.0,
            CardEffect::Energy {
                energy: EnergyKind::Standard,
                amount: 2.0,
                predicate: None,
            },
        ),
        card(
            "Lantern Sweep",
            CardKind::Physical,
            2.0,
            CardEffect::Strike {
                power: 2.0,
                target: Meter::Veil,
            },
        ),
        card(
            "Resolute Chant",
            CardKind::Social,
            1.0,
            CardEffect::Counter {
                chip: 1.0,
                followup: Some(CounterFollowup::SpreadFortify {
                    amount: 1.0,
                    duration: 1,
                }),
            },
        ),
        card(
            "Brace Together",
            CardKind::Social,
            1.0,
            CardEffect::Disrupt {
                hindrance: Hindrance::Guard {
                    member: 0,
                    reduction: 0.5,
                },
            },
        ),
        card(
            "Sidestep",
            CardKind::Physical,
            1.0,
            CardEffect::React {
                power: 3.0,
                reward: Some(ReactReward::Fortify {
                    amount: 1.0,
                    duration: 1,
                }),
            },
        ),
        card(
            "Pressing Question",
            CardKind::Social,
            1.0,
            CardEffect::Test {
                test: TestSpec {
                    mutual_trust: 1.0,
                    exposure_cost: 0.5,
                    crash_multiplier: 0.5,
                    defect_power_bonus: 1.5,
                },
            },
        ),
    ]
}

fn listening_gallery() -> EncounterDef {
    let dungeon_deck = vec![
        card(
            "Gathered Gloom",
            CardKind::Mystical,
            0.0,
            CardEffect::Energy {
                energy: EnergyKind::Standard,
                amount: 2.0,
                predicate: None,
            },
        ),
        card(
            "Whisper of Welcome",
            CardKind::Social,
            1.0,
            CardEffect::Offer {
                offer: OfferSpec {
                    benefit: OfferBenefit {
                        meter: Meter::Nerve,
                        amount: 1.5,
                    },
                    cost: OfferCost::Flat {
                        meter: Meter::Resolve,
                        amount: 1.0,
                    },
                    investment: Investment { trust: 1.0 },
                    covenant: false,
                    covenant_requirement: None,
                },
            },
        ),
        card(
            "Bargain of Roots",
            CardKind::Social,
            1.0,
            CardEffect::Offer {
                offer: OfferSpec {
                    benefit: OfferBenefit {
                        meter: Meter::Vitality,
                        amount: 2.0,
                    },
                    cost: OfferCost::Binding {
                        meter: Meter::Resolve,
                        amount: 0.5,
                        rounds: 3,
                    },
                    investment: Investment { trust: 1.5 },
                    covenant: false,
                    covenant_requirement: None,
                },
            },
        ),
        card(
            "Patience Test",
            CardKind::Social,
            1.0,
            CardEffect::Test {
                test: TestSpec {
                    mutual_trust: 1.0,
                    exposure_cost: 0.5,
                    crash_multiplier: 0.5,
                    defect_power_bonus: 2.0,
                },
            },
        ),
        with_keywords(
            card(
                "Creeping Dread",
                CardKind::Mystical,
                2.0,
                CardEffect::Strike {
                    power: 2.0,
                    target: Meter::Nerve,
                },
            ),
            vec![Keyword::Erode],
        ),
        card(
            "Veiled Snare",
            CardKind::Mystical,
            1.0,
            CardEffect::Trap {
                trigger: TrapTrigger::OfferAccepted,
                effect: TrapEffect::MeterDamage {
                    meter: Meter::Nerve,
                    amount: 1.5,
                },
            },
        ),
        card(
            "Covenant of the Deep Court",
            CardKind::Social,
            2.0,
            CardEffect::Offer {
                offer: OfferSpec {
                    benefit: OfferBenefit {
                        meter: Meter::Vitality,
                        amount: 1.0,
                    },
                    cost: OfferCost::Extraction,
                    investment: Investment { trust: 1.0 },
                    covenant: true,
                    covenant_requirement: Some(CovenantRequirement { min_trust: 8.0 }),
                },
            },
        ),
        card(
            "Gloom Mend",
            CardKind::Mystical,
            1.0,
            CardEffect::Reshape {
                shape: ReshapeSpec::Heal {
                    target: Meter::Veil,
                    amount: 2.0,
                },
            },
        ),
    ];

    let mut dungeon_fragment = ProfileContribution::default();
    dungeon_fragment.bond_affinity = 0.4;
    dungeon_fragment
        .weights
        .insert(crate::content::card::CardCategory::Offer, 0.5);
    dungeon_fragment
        .weights
        .insert(crate::content::card::CardCategory::Test, 0.3);

    EncounterDef {
        name: "The Listening Gallery".into(),
        initiative: Side::Dungeon,
        auto_effects: vec![AutoEffect {
            cadence: Cadence::Every,
            meter: Meter::Nerve,
            amount: 0.5,
            note: "the dark presses in".into(),
        }],
        dungeon_deck,
        visitor_deck: visitor_base_deck(),
        config: EncounterConfig {
            bond_threshold: 8.0,
            max_rounds: Some(10),
            ..EncounterConfig::default()
        },
        dungeon_fragment,
        visitor_fragment: ProfileContribution::default(),
    }
}

fn hungering_deep() -> EncounterDef {
    let dungeon_deck = vec![
        card(
            "Gathered Gloom",
            CardKind::Mystical,
            0.0,
            CardEffect::Energy {
                energy: EnergyKind::Standard,
                amount: 2.0,
                predicate: None,
            },
        ),
        card(
            "Stone Sap",
            CardKind::Environmental,
            0.0,
            CardEffect::Energy {
                energy: EnergyKind::Siphon,
                amount: 1.5,
                predicate: Some(StatePredicate::MeterBelow {
                    meter: Meter::Vitality,
                    value: 10.0,
                }),
            },
        ),
        with_keywords(
            card(
                "Grinding Walls",
                CardKind::Environmental,
                2.0,
                CardEffect::Strike {
                    power: 3.0,
                    target: Meter::Vitality,
                },
            ),
            vec![Keyword::Overwhelm],
        ),
        card(
            "Collapse Warning",
            CardKind::Environmental,
            1.0,
            CardEffect::Disrupt {
                hindrance: Hindrance::Disadvantage,
            },
        ),
        card(
            "Looming Mass",
            CardKind::Environmental,
            1.0,
            CardEffect::Empower {
                boost: EmpowerBoost::PowerBonus { amount: 1.5 },
            },
        ),
        card(
            "Shore Up",
            CardKind::Environmental,
            1.0,
            CardEffect::Reshape {
                shape: ReshapeSpec::Fortify {
                    amount: 1.0,
                    duration: 2,
                },
            },
        ),
    ];

    let mut visitor_deck = visitor_base_deck();
    visitor_deck.push(with_keywords(
        card(
            "Pick the Seam",
            CardKind::Physical,
            2.0,
            CardEffect::Strike {
                power: 2.5,
                target: Meter::Structure,
            },
        ),
        vec![Keyword::Drain],
    ));
    visitor_deck.push(card(
        "Field Dressing",
        CardKind::Physical,
        1.0,
        CardEffect::Reshape {
            shape: ReshapeSpec::HealWeakest { amount: 2.0 },
        },
    ));

    let mut dungeon_fragment = ProfileContribution::default();
    dungeon_fragment
        .weights
        .insert(crate::content::card::CardCategory::Strike, 0.6);

    EncounterDef {
        name: "The Hungering Deep".into(),
        initiative: Side::Dungeon,
        auto_effects: vec![AutoEffect {
            cadence: Cadence::Other,
            meter: Meter::Resolve,
            amount: 0.5,
            note: "the descent wears on them".into(),
        }],
        dungeon_deck,
        visitor_deck,
        config: EncounterConfig {
            max_rounds: Some(12),
            ..EncounterConfig::default()
        },
        dungeon_fragment,
        visitor_fragment: ProfileContribution::default(),
    }
}

/// The stock two-room gauntlet: a listening gallery that bargains, then a
/// hungering deep that grinds
pub fn demo_scenario() -> ScenarioDef {
    let mut visitor_profile = ProfileContribution::default();
    visitor_profile.cooperation_sensitivity = 0.2;
    visitor_profile
        .weights
        .insert(crate::content::card::CardCategory::Counter, 0.2);

    let mut dungeon_profile = ProfileContribution::default();
    dungeon_profile.bond_affinity = 0.2;

    ScenarioDef {
        name: "First Descent".into(),
        encounters: vec![listening_gallery(), hungering_deep()],
        dungeon: DungeonTemplate {
            structure: 14.0,
            veil: 12.0,
            presence: 10.0,
            base_energy: 3.0,
            profile: dungeon_profile,
        },
        visitor: VisitorTemplate {
            resolve: 12.0,
            nerve: 12.0,
            base_energy: 3.0,
            body: VisitorBodyTemplate::Party {
                members: vec![
                    MemberTemplate {
                        name: "Briar Warden".into(),
                        vitality: 7.0,
                        cards: vec![with_keywords(
                            card(
                                "Thorn Lash",
                                CardKind::Physical,
                                2.0,
                                CardEffect::Strike {
                                    power: 2.5,
                                    target: Meter::Structure,
                                },
                            ),
                            vec![Keyword::Overwhelm],
                        )],
                        profile: ProfileContribution::default(),
                    },
                    MemberTemplate {
                        name: "Gray Chronicler".into(),
                        vitality: 5.0,
                        cards: vec![with_keywords(
                            card(
                                "Sharp Recall",
                                CardKind::Mystical,
                                2.0,
                                CardEffect::Strike {
                                    power: 2.0,
                                    target: Meter::Presence,
                                },
                            ),
                            vec![Keyword::Resonate],
                        )],
                        profile: ProfileContribution::default(),
                    },
                ],
                knockout_morale: vec![
                    MoralePenalty {
                        resolve: 2.0,
                        nerve: 2.0,
                    },
                    MoralePenalty {
                        resolve: 3.0,
                        nerve: 4.0,
                    },
                ],
            },
            profile: visitor_profile,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_scenario_validates() {
        demo_scenario().validate().expect("demo content is sound");
    }

    #[test]
    fn test_demo_covers_every_category() {
        use crate::ai::profile::ALL_CATEGORIES;
        let scenario = demo_scenario();
        let mut categories: Vec<crate::content::card::CardCategory> = Vec::new();
        for encounter in &scenario.encounters {
            for card in encounter.dungeon_deck.iter().chain(&encounter.visitor_deck) {
                if !categories.contains(&card.category()) {
                    categories.push(card.category());
                }
            }
        }
        if let VisitorBodyTemplate::Party { members, .. } = &scenario.visitor.body {
            for member in members {
                for card in &member.cards {
                    if !categories.contains(&card.category()) {
                        categories.push(card.category());
                    }
                }
            }
        }
        for category in ALL_CATEGORIES {
            assert!(categories.contains(&category), "missing {:?}", category);
        }
    }
}
