//! Settlement layer - the stateful settlement entity and its subsystems
//!
//! A settlement carries population, a tier classification, bounded integrity
//! and stability scores, per-resource accounts, and rolling metric
//! histories. It is mutated once per day by the economy engine and by the
//! trade/caravan collaborators acting through the ledger API.

pub mod collapse;
pub mod metrics;
pub mod registry;
pub mod resources;
pub mod stability;
pub mod tier;

pub use collapse::{evaluate_collapse, CollapseReason};
pub use metrics::{SettlementMetrics, HISTORY_CAP};
pub use registry::{RegistrySnapshot, SettlementRegistry};
pub use resources::{production_multiplier, ResourceAccount, ResourceKind};
pub use tier::{evaluate_transition, SettlementTier, TierProfile, TierTransition};

use std::collections::BTreeMap;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::{Vec2, Year};

/// A settlement with population, resources, trade, and lifecycle state
///
/// Bounded scores are clamped after every mutation; stockpiles never go
/// negative. Population and tier may disagree transiently: tier changes lag
/// population by design and are resolved by the tier state machine once per
/// tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub name: String,
    pub location: Vec2,
    pub population: u32,
    pub tier: SettlementTier,
    /// Infrastructure/cohesion health, 0-100
    pub integrity: f64,
    /// External pressure, 0-10
    pub threat_level: u8,
    /// Derived composite score, 0-100
    pub stability_score: f64,
    pub is_active: bool,
    pub collapse_reason: Option<CollapseReason>,
    pub founding_year: Year,
    pub governing_faction_id: Option<String>,
    /// Political structure label, e.g. "merchant republic"
    pub governance_type: Option<String>,
    /// Faction/player id -> reputation in [-100, 100]
    pub reputation: AHashMap<String, f64>,
    /// Names of settlements traded with, in first-contact order
    pub trade_partners: Vec<String>,
    /// One account per resource kind, iterated in declared kind order
    pub resources: BTreeMap<ResourceKind, ResourceAccount>,
    pub metrics: SettlementMetrics,
}

impl Settlement {
    /// Create a settlement, classifying its tier from the population and
    /// seeding every resource account with five days of production
    pub fn new(name: impl Into<String>, population: u32, location: Vec2) -> Self {
        let tier = SettlementTier::for_population(population);
        let mut settlement = Self {
            name: name.into(),
            location,
            population,
            tier,
            integrity: 85.0,
            threat_level: 1,
            stability_score: 50.0,
            is_active: true,
            collapse_reason: None,
            founding_year: 1000,
            governing_faction_id: None,
            governance_type: None,
            reputation: AHashMap::new(),
            trade_partners: Vec::new(),
            resources: BTreeMap::new(),
            metrics: SettlementMetrics::new(),
        };
        settlement.seed_resources();
        settlement
    }

    /// Override the auto-classified tier, re-seeding production rates for
    /// the new tier's trade multiplier
    pub fn with_tier(mut self, tier: SettlementTier) -> Self {
        self.tier = tier;
        self.seed_resources();
        self
    }

    pub fn with_founding_year(mut self, year: Year) -> Self {
        self.founding_year = year;
        self
    }

    pub fn with_governing_faction(
        mut self,
        faction_id: impl Into<String>,
        governance_type: Option<&str>,
    ) -> Self {
        self.governing_faction_id = Some(faction_id.into());
        self.governance_type = governance_type.map(str::to_string);
        self
    }

    fn seed_resources(&mut self) {
        let tier_multiplier = self.tier.profile().trade_multiplier;
        let population_factor = self.population as f64 / 100.0;

        for kind in ResourceKind::ALL {
            let production =
                (population_factor * tier_multiplier * kind.production_weight()).max(0.1);
            let consumption = population_factor * kind.consumption_weight();
            self.resources.insert(
                kind,
                ResourceAccount::new(production, consumption, production * 5.0),
            );
        }
    }

    /// Total trade flow this tick across every resource account
    pub fn current_trade_volume(&self) -> f64 {
        self.resources.values().map(|a| a.trade_volume()).sum()
    }

    /// Record a trade transaction against this settlement's ledger
    ///
    /// Imports credit the stockpile in full; exports debit it with a silent
    /// floor at zero while still recording the requested volume. Returns the
    /// amount actually moved so callers can detect truncated exports. A
    /// partner name registers a trade relationship on first contact.
    pub fn add_trade_transaction(
        &mut self,
        kind: ResourceKind,
        amount: f64,
        is_import: bool,
        partner: Option<&str>,
    ) -> f64 {
        let Some(account) = self.resources.get_mut(&kind) else {
            return 0.0;
        };

        let moved = if is_import {
            account.record_import(amount)
        } else {
            account.record_export(amount)
        };

        if let Some(partner) = partner {
            if !self.trade_partners.iter().any(|p| p == partner) {
                self.trade_partners.push(partner.to_string());
            }
        }

        moved
    }

    /// Set the threat level, clamped to the valid 0-10 range
    pub fn set_threat_level(&mut self, threat_level: i32) {
        self.threat_level = threat_level.clamp(0, 10) as u8;
        tracing::debug!(
            settlement = %self.name,
            threat = self.threat_level,
            "threat level set"
        );
    }

    /// Set reputation for a faction or player, clamped to [-100, 100]
    pub fn set_reputation(&mut self, id: impl Into<String>, value: f64) {
        self.reputation.insert(id.into(), value.clamp(-100.0, 100.0));
    }

    /// Shift reputation for a faction or player, clamped to [-100, 100]
    pub fn modify_reputation(&mut self, id: &str, change: f64) {
        let current = self.reputation.get(id).copied().unwrap_or(0.0);
        self.reputation
            .insert(id.to_string(), (current + change).clamp(-100.0, 100.0));
    }

    /// Reputation for a faction or player, 0.0 when unrecorded
    pub fn get_reputation(&self, id: &str) -> f64 {
        self.reputation.get(id).copied().unwrap_or(0.0)
    }

    /// Install a governing faction and refresh stability under the new
    /// governance
    pub fn set_governing_faction(
        &mut self,
        faction_id: impl Into<String>,
        governance_type: Option<&str>,
        current_year: Year,
    ) {
        self.governing_faction_id = Some(faction_id.into());
        if governance_type.is_some() {
            self.governance_type = governance_type.map(str::to_string);
        }
        self.recalculate_stability(current_year);
        tracing::info!(
            settlement = %self.name,
            faction = self.governing_faction_id.as_deref().unwrap_or(""),
            "governing faction installed"
        );
    }

    /// Recompute and store the stability score
    pub fn recalculate_stability(&mut self, current_year: Year) -> f64 {
        self.stability_score = stability::compute(self, current_year);
        self.stability_score
    }

    /// Per-resource production, consumption, and flow snapshot
    pub fn resource_summary(&self) -> BTreeMap<ResourceKind, ResourceSummary> {
        self.resources
            .iter()
            .map(|(&kind, account)| {
                (
                    kind,
                    ResourceSummary {
                        production: account.production_base * account.production_modifier,
                        consumption: account.consumption_base,
                        stockpile: account.stockpile,
                        net_production: account.net_production(),
                        recent_imports: account.import_volume,
                        recent_exports: account.export_volume,
                    },
                )
            })
            .collect()
    }

    /// Snapshot of the headline indicators
    pub fn status(&self) -> SettlementStatus {
        SettlementStatus {
            name: self.name.clone(),
            tier: self.tier,
            population: self.population,
            integrity: self.integrity,
            threat_level: self.threat_level,
            stability_score: self.stability_score,
            is_active: self.is_active,
            collapse_reason: self.collapse_reason,
            trade_volume_current: self.current_trade_volume(),
            trade_volume_average: self.metrics.trade_volume_average(10),
            population_trend: self.metrics.population_trend(),
            trade_partner_count: self.trade_partners.len(),
            governing_faction_id: self.governing_faction_id.clone(),
            founding_year: self.founding_year,
        }
    }
}

/// One resource account's effective rates and current flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSummary {
    pub production: f64,
    pub consumption: f64,
    pub stockpile: f64,
    pub net_production: f64,
    pub recent_imports: f64,
    pub recent_exports: f64,
}

/// Headline settlement indicators for reporting and display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementStatus {
    pub name: String,
    pub tier: SettlementTier,
    pub population: u32,
    pub integrity: f64,
    pub threat_level: u8,
    pub stability_score: f64,
    pub is_active: bool,
    pub collapse_reason: Option<CollapseReason>,
    pub trade_volume_current: f64,
    pub trade_volume_average: f64,
    pub population_trend: f64,
    pub trade_partner_count: usize,
    pub governing_faction_id: Option<String>,
    pub founding_year: Year,
}
