//! Daily economy tick orchestration
//!
//! One engine call simulates one day across every active settlement in
//! three strict phases. Phase A runs each settlement's own cycle in
//! registry order; Phase B runs pairwise trade once every settlement has
//! finished Phase A; Phase C applies external collaborator effects
//! (faction modifiers, caravan resolution and dispatch).

use rand_chacha::ChaCha8Rng;

use rand::Rng;

use crate::caravan::{self, Caravan, CaravanStatus};
use crate::core::config::EconomyConfig;
use crate::core::error::{EmberError, Result};
use crate::core::types::{Day, Year};
use crate::economy::effects::{apply_effect, FactionPolicy, KeywordFactionPolicy};
use crate::economy::events::{
    EconomyEvent, EconomySummary, SettlementReport, TickReport, TickSummary,
};
use crate::economy::trade;
use crate::settlement::{
    evaluate_collapse, evaluate_transition, production_multiplier, ResourceKind, Settlement,
    SettlementRegistry, TierTransition,
};

/// Days of tick summaries retained in the rolling engine log
const SUMMARY_LOG_CAP: usize = 30;

/// Window used by the aggregate economy summary
const SUMMARY_WINDOW: usize = 7;

/// Drives the daily economic cycle across all settlements
pub struct EconomyEngine {
    config: EconomyConfig,
    current_day: Day,
    season_modifier: f64,
    faction_policy: Box<dyn FactionPolicy>,
    caravans: Vec<Caravan>,
    daily_summaries: Vec<TickSummary>,
}

impl EconomyEngine {
    pub fn new(config: EconomyConfig) -> Self {
        Self {
            config,
            current_day: 0,
            season_modifier: 1.0,
            faction_policy: Box::new(KeywordFactionPolicy),
            caravans: Vec::new(),
            daily_summaries: Vec::new(),
        }
    }

    /// Replace the faction-effect collaborator
    pub fn with_faction_policy(mut self, policy: Box<dyn FactionPolicy>) -> Self {
        self.faction_policy = policy;
        self
    }

    pub fn with_season_modifier(mut self, season_modifier: f64) -> Self {
        self.set_season_modifier(season_modifier);
        self
    }

    /// Set the seasonal production/growth modifier, clamped to [0.5, 1.5]
    pub fn set_season_modifier(&mut self, season_modifier: f64) {
        self.season_modifier = season_modifier.clamp(0.5, 1.5);
    }

    pub fn season_modifier(&self) -> f64 {
        self.season_modifier
    }

    pub fn config(&self) -> &EconomyConfig {
        &self.config
    }

    /// The most recently simulated day (0 before the first tick)
    pub fn current_day(&self) -> Day {
        self.current_day
    }

    /// Every caravan dispatched so far, including resolved ones
    pub fn caravans(&self) -> &[Caravan] {
        &self.caravans
    }

    /// Caravans still on the road
    pub fn active_caravans(&self) -> impl Iterator<Item = &Caravan> {
        self.caravans
            .iter()
            .filter(|c| c.status == CaravanStatus::InTransit)
    }

    /// Simulate one day across all settlements
    pub fn run_tick(&mut self, registry: &mut SettlementRegistry) -> TickReport {
        self.current_day += 1;
        let day = self.current_day;
        tracing::info!(day, "economy tick start");

        let mut report = TickReport::new(day);

        // Phase A: per-settlement cycles, registry order
        {
            let SettlementRegistry {
                settlements,
                rng,
                current_year,
            } = &mut *registry;

            for settlement in settlements.iter_mut() {
                if !settlement.is_active {
                    continue;
                }
                match run_daily_cycle(
                    settlement,
                    rng,
                    &self.config,
                    self.season_modifier,
                    *current_year,
                ) {
                    Ok(outcome) => {
                        report.absorb(
                            &settlement.name,
                            settlement.population,
                            outcome.trade_volume,
                            outcome.events,
                        );
                    }
                    Err(error) => {
                        // One settlement's failure never aborts the tick
                        tracing::error!(
                            settlement = %settlement.name,
                            %error,
                            "daily cycle failed; skipping settlement"
                        );
                    }
                }
            }
        }

        // Phase B: pairwise trade, only after every settlement finished A
        trade::process_inter_settlement_trade(registry, &self.config);

        // Phase C: external collaborator effects
        self.apply_faction_effects(registry);
        let caravan_events = self.process_caravans(registry, day);
        for (settlement, event) in caravan_events {
            report.reports.push(SettlementReport {
                settlement,
                events: vec![event],
            });
        }

        self.daily_summaries.push(report.summary());
        if self.daily_summaries.len() > SUMMARY_LOG_CAP {
            self.daily_summaries.remove(0);
        }

        tracing::info!(
            day,
            settlements = report.settlements_processed,
            population = report.total_population,
            collapsed = report.settlements_collapsed,
            "economy tick complete"
        );

        report
    }

    /// Simulate several consecutive days
    pub fn run_days(&mut self, registry: &mut SettlementRegistry, days: u32) -> Vec<TickReport> {
        (0..days).map(|_| self.run_tick(registry)).collect()
    }

    /// Run one settlement's own cycle for several days, without advancing
    /// the world day
    ///
    /// A catch-up utility for a single settlement; the batch stops
    /// immediately if the settlement collapses partway through.
    pub fn run_settlement_days(
        &mut self,
        registry: &mut SettlementRegistry,
        name: &str,
        days: u32,
    ) -> Result<Vec<EconomyEvent>> {
        let index = registry.index_of(name)?;
        let SettlementRegistry {
            settlements,
            rng,
            current_year,
        } = &mut *registry;
        let settlement = &mut settlements[index];

        let mut events = Vec::new();
        for _ in 0..days {
            if !settlement.is_active {
                break;
            }
            let outcome = run_daily_cycle(
                settlement,
                rng,
                &self.config,
                self.season_modifier,
                *current_year,
            )?;
            let collapsed = outcome
                .events
                .iter()
                .any(|e| matches!(e, EconomyEvent::SettlementCollapse { .. }));
            events.extend(outcome.events);
            if collapsed {
                break;
            }
        }
        Ok(events)
    }

    /// Aggregate view over the last few recorded days
    pub fn economy_summary(&self) -> Option<EconomySummary> {
        if self.daily_summaries.is_empty() {
            return None;
        }
        let start = self.daily_summaries.len().saturating_sub(SUMMARY_WINDOW);
        let recent = &self.daily_summaries[start..];
        let count = recent.len() as f64;

        Some(EconomySummary {
            current_day: self.current_day,
            days_recorded: self.daily_summaries.len(),
            avg_settlements_processed: recent
                .iter()
                .map(|s| f64::from(s.settlements_processed))
                .sum::<f64>()
                / count,
            avg_total_population: recent
                .iter()
                .map(|s| s.total_population as f64)
                .sum::<f64>()
                / count,
            avg_trade_volume: recent.iter().map(|s| s.total_trade_volume).sum::<f64>() / count,
            total_evolutions: recent.iter().map(|s| s.settlements_evolved).sum(),
            total_collapses: recent.iter().map(|s| s.settlements_collapsed).sum(),
        })
    }

    fn apply_faction_effects(&self, registry: &mut SettlementRegistry) {
        for settlement in registry.settlements.iter_mut() {
            if !settlement.is_active {
                continue;
            }
            let Some(faction_id) = settlement.governing_faction_id.clone() else {
                continue;
            };
            for effect in self.faction_policy.effects_for(&faction_id) {
                apply_effect(settlement, &effect);
            }
        }
    }

    /// Resolve arrivals, then dispatch new caravans for today's deficits
    fn process_caravans(
        &mut self,
        registry: &mut SettlementRegistry,
        day: Day,
    ) -> Vec<(String, EconomyEvent)> {
        let mut attributed = Vec::new();

        for event in caravan::resolve_caravans(&mut self.caravans, registry, day) {
            let settlement = match &event {
                EconomyEvent::CaravanDelivered { destination, .. } => destination.clone(),
                EconomyEvent::CaravanLost { origin, .. } => origin.clone(),
                _ => continue,
            };
            attributed.push((settlement, event));
        }

        let new_caravans = caravan::generate_caravans(registry, day);
        for c in &new_caravans {
            attributed.push((
                c.origin.clone(),
                EconomyEvent::CaravanDispatched {
                    id: c.id,
                    origin: c.origin.clone(),
                    destination: c.destination.clone(),
                },
            ));
        }
        self.caravans.extend(new_caravans);

        attributed
    }
}

impl Default for EconomyEngine {
    fn default() -> Self {
        Self::new(EconomyConfig::default())
    }
}

struct CycleOutcome {
    trade_volume: f64,
    events: Vec<EconomyEvent>,
}

/// One settlement's full Phase A cycle for one day
fn run_daily_cycle(
    settlement: &mut Settlement,
    rng: &mut ChaCha8Rng,
    config: &EconomyConfig,
    season_modifier: f64,
    current_year: Year,
) -> Result<CycleOutcome> {
    let mut events = Vec::new();

    // 1. Record today's trade flow into the rolling histories
    let trade_volume = settlement.current_trade_volume();
    settlement.metrics.record(
        settlement.population,
        settlement.integrity,
        trade_volume,
        settlement.threat_level,
    );

    // 2. Population
    let old_population = settlement.population;
    let delta = adjust_population(settlement, rng, config, season_modifier)?;
    if delta != 0 {
        events.push(EconomyEvent::PopulationChange {
            old: old_population,
            new: settlement.population,
            delta,
        });
    }

    // 3. Stability
    let old_stability = settlement.stability_score;
    settlement.recalculate_stability(current_year);
    if (settlement.stability_score - old_stability).abs() > 1.0 {
        events.push(EconomyEvent::StabilityChange {
            old: old_stability,
            new: settlement.stability_score,
            delta: settlement.stability_score - old_stability,
        });
    }

    // 4. Integrity
    let old_integrity = settlement.integrity;
    adjust_integrity(settlement, rng, config, trade_volume);
    if (settlement.integrity - old_integrity).abs() > 1.0 {
        events.push(EconomyEvent::IntegrityChange {
            old: old_integrity,
            new: settlement.integrity,
            delta: settlement.integrity - old_integrity,
        });
    }

    // 5. Daily production and consumption for every account
    run_resource_cycle(settlement, rng, config, season_modifier);

    // 6. Tier transitions; stability reflects the new tier immediately
    match evaluate_transition(settlement, config.trade_average_window) {
        Some(TierTransition::Upgraded { from, to }) => {
            settlement.recalculate_stability(current_year);
            tracing::info!(settlement = %settlement.name, %from, %to, "tier upgrade");
            events.push(EconomyEvent::TierUpgrade { from, to });
        }
        Some(TierTransition::Downgraded { from, to }) => {
            settlement.recalculate_stability(current_year);
            tracing::warn!(settlement = %settlement.name, %from, %to, "tier downgrade");
            events.push(EconomyEvent::TierDowngrade { from, to });
        }
        None => {}
    }

    // 7. Collapse reads the stability computed this tick
    if let Some(reason) = evaluate_collapse(settlement) {
        tracing::warn!(settlement = %settlement.name, %reason, "settlement collapsed");
        events.push(EconomyEvent::SettlementCollapse { reason });
    }

    Ok(CycleOutcome {
        trade_volume,
        events,
    })
}

/// Daily population delta from the multiplicative growth model
///
/// Returns the applied change. Poor combined conditions can never yield
/// growth: below the threshold a non-negative delta becomes -1 or 0.
fn adjust_population(
    settlement: &mut Settlement,
    rng: &mut ChaCha8Rng,
    config: &EconomyConfig,
    season_modifier: f64,
) -> Result<i64> {
    let staple = settlement
        .resources
        .get(&ResourceKind::STAPLE)
        .ok_or_else(|| EmberError::UnknownResource(ResourceKind::STAPLE.as_str().to_string()))?;

    let food_ratio = staple.stockpile / staple.consumption_base.max(1.0);
    let food_modifier = (food_ratio / 2.0).clamp(0.3, 1.5);
    let stability_modifier = 0.5 + settlement.stability_score / 100.0;
    let tier_modifier = settlement.tier.profile().growth_modifier;

    let combined = stability_modifier * tier_modifier * food_modifier * season_modifier;
    let growth_rate = config.base_daily_growth_rate * combined * rng.gen_range(0.8..=1.2);

    let mut delta = (settlement.population as f64 * growth_rate) as i64;
    if combined < config.poor_conditions_threshold && delta >= 0 {
        delta = if rng.gen_bool(0.5) { -1 } else { 0 };
    }

    let old = settlement.population;
    settlement.population = (i64::from(old) + delta).max(1) as u32;
    Ok(i64::from(settlement.population) - i64::from(old))
}

/// Daily integrity adjustment: tier decay, trade upkeep, random
/// fluctuation, and population stress, clamped to [0, 100]
fn adjust_integrity(
    settlement: &mut Settlement,
    rng: &mut ChaCha8Rng,
    config: &EconomyConfig,
    trade_volume: f64,
) {
    let profile = settlement.tier.profile();
    let decay = profile.base_integrity_decay * config.daily_decay_fraction;
    let trade_bonus =
        (trade_volume / config.trade_integrity_divisor).min(config.trade_integrity_bonus_cap);
    let fluctuation =
        rng.gen_range(-config.integrity_fluctuation..=config.integrity_fluctuation);

    // The open-ended top tier has no defined optimum, hence no stress
    let stress = settlement.tier.optimal_population().map_or(0.0, |optimal| {
        (settlement.population as f64 - optimal).abs() / optimal * config.population_stress_rate
    });

    let net_change = -decay + trade_bonus + fluctuation - stress;
    settlement.integrity = (settlement.integrity + net_change).clamp(0.0, 100.0);
}

/// Run production and consumption for every resource account
///
/// Each account resets its per-tick trade counters before production is
/// applied; the trade phases later in the tick repopulate them.
fn run_resource_cycle(
    settlement: &mut Settlement,
    rng: &mut ChaCha8Rng,
    config: &EconomyConfig,
    season_modifier: f64,
) {
    let multiplier = production_multiplier(settlement.integrity, config);
    for account in settlement.resources.values_mut() {
        let variance = rng.gen_range(
            1.0 - config.production_variance..=1.0 + config.production_variance,
        );
        account.apply_daily_cycle(variance, multiplier, season_modifier);
    }
}
