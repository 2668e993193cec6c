//! Structured per-tick event records
//!
//! The engine emits typed events for external logging and dashboards.
//! Emission is a side channel: nothing in the tick depends on whether
//! anyone consumes these records.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::types::Day;
use crate::settlement::{CollapseReason, SettlementTier};

/// One notable state change during a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EconomyEvent {
    PopulationChange {
        old: u32,
        new: u32,
        delta: i64,
    },
    IntegrityChange {
        old: f64,
        new: f64,
        delta: f64,
    },
    StabilityChange {
        old: f64,
        new: f64,
        delta: f64,
    },
    TierUpgrade {
        from: SettlementTier,
        to: SettlementTier,
    },
    TierDowngrade {
        from: SettlementTier,
        to: SettlementTier,
    },
    SettlementCollapse {
        reason: CollapseReason,
    },
    CaravanDispatched {
        id: Uuid,
        origin: String,
        destination: String,
    },
    CaravanDelivered {
        id: Uuid,
        destination: String,
    },
    CaravanLost {
        id: Uuid,
        origin: String,
    },
}

/// Events attributed to one settlement for one tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementReport {
    pub settlement: String,
    pub events: Vec<EconomyEvent>,
}

/// Full record of one simulated day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickReport {
    pub day: Day,
    pub settlements_processed: u32,
    pub total_population: u64,
    pub total_trade_volume: f64,
    pub settlements_evolved: u32,
    pub settlements_collapsed: u32,
    pub reports: Vec<SettlementReport>,
}

impl TickReport {
    pub fn new(day: Day) -> Self {
        Self {
            day,
            settlements_processed: 0,
            total_population: 0,
            total_trade_volume: 0.0,
            settlements_evolved: 0,
            settlements_collapsed: 0,
            reports: Vec::new(),
        }
    }

    /// Fold one settlement's events into the day totals
    pub fn absorb(&mut self, settlement: &str, population: u32, trade_volume: f64, events: Vec<EconomyEvent>) {
        self.settlements_processed += 1;
        self.total_population += u64::from(population);
        self.total_trade_volume += trade_volume;
        self.settlements_evolved += events
            .iter()
            .filter(|e| matches!(e, EconomyEvent::TierUpgrade { .. }))
            .count() as u32;
        self.settlements_collapsed += events
            .iter()
            .filter(|e| matches!(e, EconomyEvent::SettlementCollapse { .. }))
            .count() as u32;

        if !events.is_empty() {
            self.reports.push(SettlementReport {
                settlement: settlement.to_string(),
                events,
            });
        }
    }

    /// Summary row retained in the engine's rolling day log
    pub fn summary(&self) -> TickSummary {
        TickSummary {
            day: self.day,
            settlements_processed: self.settlements_processed,
            total_population: self.total_population,
            total_trade_volume: self.total_trade_volume,
            settlements_evolved: self.settlements_evolved,
            settlements_collapsed: self.settlements_collapsed,
        }
    }
}

/// Compact per-day counters kept in the engine's rolling log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickSummary {
    pub day: Day,
    pub settlements_processed: u32,
    pub total_population: u64,
    pub total_trade_volume: f64,
    pub settlements_evolved: u32,
    pub settlements_collapsed: u32,
}

/// Aggregate view over the most recent simulated days
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EconomySummary {
    pub current_day: Day,
    pub days_recorded: usize,
    pub avg_settlements_processed: f64,
    pub avg_total_population: f64,
    pub avg_trade_volume: f64,
    pub total_evolutions: u32,
    pub total_collapses: u32,
}
