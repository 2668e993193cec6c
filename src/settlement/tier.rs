//! Settlement tier classification and transitions
//!
//! Five ordered size classes, each described by an immutable profile in a
//! static lookup table. Transitions move exactly one step per tick: an
//! upgrade when every requirement is met, otherwise a downgrade when the
//! settlement has fallen below its tier's floor conditions.

use serde::{Deserialize, Serialize};

use crate::settlement::Settlement;

/// Ordered settlement size classes
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum SettlementTier {
    Hamlet,
    Village,
    Town,
    SmallCity,
    LargeCity,
}

/// Requirements for advancing out of a tier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpgradeRequirements {
    pub population: u32,
    pub integrity: f64,
    /// Rolling trade volume average that must be sustained
    pub trade_volume: f64,
    /// Threat level must be at or below this
    pub max_threat: u8,
}

/// Immutable per-tier thresholds and rates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierProfile {
    pub name: &'static str,
    pub min_population: u32,
    /// None for the open-ended top tier
    pub max_population: Option<u32>,
    pub base_integrity_decay: f64,
    pub trade_multiplier: f64,
    /// Per-capita growth scaling; smaller settlements grow faster
    pub growth_modifier: f64,
    /// Flat stability contribution; larger settlements are more stable
    pub stability_bonus: f64,
    /// None for the terminal top tier
    pub upgrade: Option<UpgradeRequirements>,
}

static TIER_TABLE: [TierProfile; 5] = [
    TierProfile {
        name: "Hamlet",
        min_population: 10,
        max_population: Some(99),
        base_integrity_decay: 0.1,
        trade_multiplier: 0.5,
        growth_modifier: 1.2,
        stability_bonus: 0.0,
        upgrade: Some(UpgradeRequirements {
            population: 80,
            integrity: 70.0,
            trade_volume: 50.0,
            max_threat: 3,
        }),
    },
    TierProfile {
        name: "Village",
        min_population: 100,
        max_population: Some(499),
        base_integrity_decay: 0.08,
        trade_multiplier: 0.7,
        growth_modifier: 1.0,
        stability_bonus: 5.0,
        upgrade: Some(UpgradeRequirements {
            population: 400,
            integrity: 75.0,
            trade_volume: 100.0,
            max_threat: 4,
        }),
    },
    TierProfile {
        name: "Town",
        min_population: 500,
        max_population: Some(1999),
        base_integrity_decay: 0.06,
        trade_multiplier: 1.0,
        growth_modifier: 0.8,
        stability_bonus: 10.0,
        upgrade: Some(UpgradeRequirements {
            population: 1600,
            integrity: 80.0,
            trade_volume: 200.0,
            max_threat: 5,
        }),
    },
    TierProfile {
        name: "Small City",
        min_population: 2000,
        max_population: Some(9999),
        base_integrity_decay: 0.05,
        trade_multiplier: 1.3,
        growth_modifier: 0.6,
        stability_bonus: 15.0,
        upgrade: Some(UpgradeRequirements {
            population: 8000,
            integrity: 85.0,
            trade_volume: 500.0,
            max_threat: 6,
        }),
    },
    TierProfile {
        name: "Large City",
        min_population: 10000,
        max_population: None,
        base_integrity_decay: 0.04,
        trade_multiplier: 1.5,
        growth_modifier: 0.4,
        stability_bonus: 20.0,
        upgrade: None,
    },
];

impl SettlementTier {
    pub const ALL: [SettlementTier; 5] = [
        SettlementTier::Hamlet,
        SettlementTier::Village,
        SettlementTier::Town,
        SettlementTier::SmallCity,
        SettlementTier::LargeCity,
    ];

    pub fn profile(&self) -> &'static TierProfile {
        &TIER_TABLE[*self as usize]
    }

    pub fn name(&self) -> &'static str {
        self.profile().name
    }

    /// The next tier up, if any
    pub fn next(&self) -> Option<SettlementTier> {
        let index = *self as usize;
        SettlementTier::ALL.get(index + 1).copied()
    }

    /// The next tier down, if any
    pub fn previous(&self) -> Option<SettlementTier> {
        let index = *self as usize;
        index.checked_sub(1).map(|i| SettlementTier::ALL[i])
    }

    /// Classify a population into its tier band
    pub fn for_population(population: u32) -> SettlementTier {
        for tier in SettlementTier::ALL {
            let profile = tier.profile();
            let above_min = population >= profile.min_population;
            let below_max = profile.max_population.map_or(true, |max| population <= max);
            if above_min && below_max {
                return tier;
            }
        }
        // Below every band floor; smallest class still applies
        SettlementTier::Hamlet
    }

    /// Midpoint of the population band; None for the open-ended top tier
    pub fn optimal_population(&self) -> Option<f64> {
        let profile = self.profile();
        profile
            .max_population
            .map(|max| (profile.min_population as f64 + max as f64) / 2.0)
    }
}

impl std::fmt::Display for SettlementTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A tier change that occurred this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierTransition {
    Upgraded {
        from: SettlementTier,
        to: SettlementTier,
    },
    Downgraded {
        from: SettlementTier,
        to: SettlementTier,
    },
}

/// Evaluate and apply at most one tier step for this tick
///
/// Upgrade is checked first; a downgrade is only considered when no upgrade
/// occurred. The caller is responsible for recomputing stability after a
/// transition.
pub fn evaluate_transition(
    settlement: &mut Settlement,
    trade_average_window: usize,
) -> Option<TierTransition> {
    let from = settlement.tier;

    if let Some(requirements) = from.profile().upgrade {
        if meets_upgrade_requirements(settlement, &requirements, trade_average_window) {
            let to = from.next().expect("tier with requirements has a successor");
            settlement.tier = to;
            return Some(TierTransition::Upgraded { from, to });
        }
    }

    if should_downgrade(settlement) {
        if let Some(to) = from.previous() {
            settlement.tier = to;
            return Some(TierTransition::Downgraded { from, to });
        }
    }

    None
}

fn meets_upgrade_requirements(
    settlement: &Settlement,
    requirements: &UpgradeRequirements,
    trade_average_window: usize,
) -> bool {
    settlement.population >= requirements.population
        && settlement.integrity >= requirements.integrity
        && settlement.threat_level <= requirements.max_threat
        && settlement.metrics.trade_volume_average(trade_average_window)
            >= requirements.trade_volume
}

fn should_downgrade(settlement: &Settlement) -> bool {
    let profile = settlement.tier.profile();

    // 30% buffer below the band floor before the tier is lost
    if (settlement.population as f64) < profile.min_population as f64 * 0.7 {
        return true;
    }

    if settlement.integrity < 30.0 {
        return true;
    }

    settlement.threat_level >= 8
}
