//! Caravan transport between settlements
//!
//! Caravans move resources from suppliers with deep surpluses toward
//! settlements running supply deficits. Generation and resolution both act
//! on settlement state exclusively through the resource ledger's
//! transaction API.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::types::Day;
use crate::economy::events::EconomyEvent;
use crate::settlement::{ResourceKind, SettlementRegistry};

/// Maximum distance scanned for a supplier
pub const SEARCH_RADIUS: f32 = 50.0;

/// Smallest cargo worth dispatching a caravan for
pub const MIN_VIABLE_CARGO: f64 = 5.0;

/// Days of supply a deficit settlement tries to order at once
pub const DEFICIT_SUPPLY_DAYS: f64 = 10.0;

/// Days of own consumption a supplier keeps in reserve
pub const SUPPLIER_BUFFER_DAYS: f64 = 20.0;

/// Surplus beyond the reserve required before a supplier ships anything
pub const SUPPLIER_MIN_SURPLUS: f64 = 10.0;

/// Largest fraction of a supplier's stockpile loaded onto one caravan
pub const MAX_CARGO_FRACTION: f64 = 0.3;

/// Deficit-to-consumption ratio below which a shortfall is ignored
pub const DEFICIT_RATIO_THRESHOLD: f64 = 0.1;

/// Cargo value at which the risk score saturates
pub const RISK_CARGO_DIVISOR: f64 = 1000.0;

/// Interception probability per unit of risk score
pub const INTERCEPT_CHANCE_FACTOR: f64 = 0.1;

/// Distance covered per travel day
pub const TRAVEL_SPEED: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaravanStatus {
    InTransit,
    Delivered,
    Intercepted,
}

/// A shipment of resources in transit between two settlements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Caravan {
    pub id: Uuid,
    pub origin: String,
    pub destination: String,
    pub manifest: BTreeMap<ResourceKind, f64>,
    pub departure_day: Day,
    pub travel_duration: u32,
    pub status: CaravanStatus,
    /// Loss likelihood in [0, 1], scaled from total cargo value
    pub risk_score: f64,
}

impl Caravan {
    pub fn new(
        origin: impl Into<String>,
        destination: impl Into<String>,
        manifest: BTreeMap<ResourceKind, f64>,
        departure_day: Day,
        travel_duration: u32,
    ) -> Self {
        let total_cargo: f64 = manifest.values().sum();
        Self {
            id: Uuid::new_v4(),
            origin: origin.into(),
            destination: destination.into(),
            manifest,
            departure_day,
            travel_duration,
            status: CaravanStatus::InTransit,
            risk_score: (total_cargo / RISK_CARGO_DIVISOR).min(1.0),
        }
    }

    pub fn arrival_day(&self) -> Day {
        self.departure_day + self.travel_duration
    }
}

/// Dispatch caravans toward settlements running supply deficits
///
/// For every active settlement and resource kind, a shortfall of daily
/// supply (production plus imports) against consumption selects the best
/// reachable supplier by surplus-over-distance priority. Departure debits
/// the supplier through the export transaction.
pub fn generate_caravans(registry: &mut SettlementRegistry, current_day: Day) -> Vec<Caravan> {
    let mut caravans = Vec::new();
    let count = registry.len();

    for dest_index in 0..count {
        if !registry.settlements[dest_index].is_active {
            continue;
        }

        for kind in ResourceKind::ALL {
            let (need, dest_name, dest_location) = {
                let dest = &registry.settlements[dest_index];
                let Some(account) = dest.resources.get(&kind) else {
                    continue;
                };

                let supply = account.production_base + account.import_volume;
                let deficit = account.consumption_base - supply;
                if deficit <= 0.0
                    || deficit / account.consumption_base.max(1.0) <= DEFICIT_RATIO_THRESHOLD
                {
                    continue;
                }

                (
                    deficit * DEFICIT_SUPPLY_DAYS,
                    dest.name.clone(),
                    dest.location,
                )
            };

            // Best supplier by surplus-over-distance priority
            let mut best: Option<(usize, f32)> = None;
            let mut best_priority = 0.0;
            for supplier_index in 0..count {
                if supplier_index == dest_index {
                    continue;
                }
                let supplier = &registry.settlements[supplier_index];
                if !supplier.is_active {
                    continue;
                }
                let Some(account) = supplier.resources.get(&kind) else {
                    continue;
                };

                let available =
                    account.stockpile - account.consumption_base * SUPPLIER_BUFFER_DAYS;
                if available <= SUPPLIER_MIN_SURPLUS {
                    continue;
                }

                let distance = dest_location.distance(&supplier.location);
                if distance > SEARCH_RADIUS {
                    continue;
                }

                let priority = available / f64::from(distance.max(1.0));
                if priority > best_priority {
                    best_priority = priority;
                    best = Some((supplier_index, distance));
                }
            }

            let Some((supplier_index, distance)) = best else {
                continue;
            };

            let supplier = &mut registry.settlements[supplier_index];
            let stockpile = supplier
                .resources
                .get(&kind)
                .map(|a| a.stockpile)
                .unwrap_or(0.0);
            let cargo = need.min(stockpile * MAX_CARGO_FRACTION);
            if cargo < MIN_VIABLE_CARGO {
                continue;
            }

            let travel_duration = ((distance / TRAVEL_SPEED) as u32).max(1);
            supplier.add_trade_transaction(kind, cargo, false, None);

            let origin = supplier.name.clone();
            let caravan = Caravan::new(
                origin,
                dest_name,
                BTreeMap::from([(kind, cargo)]),
                current_day,
                travel_duration,
            );
            tracing::info!(
                caravan = %caravan.id,
                origin = %caravan.origin,
                destination = %caravan.destination,
                resource = %kind,
                cargo,
                "caravan dispatched"
            );
            caravans.push(caravan);
        }
    }

    caravans
}

/// Resolve caravans whose arrival day has come
///
/// Each arrival rolls against its risk score; survivors credit the
/// destination through the import transaction for every manifest entry. An
/// unknown destination leaves the caravan in transit and is logged, never
/// fatal.
pub fn resolve_caravans(
    caravans: &mut [Caravan],
    registry: &mut SettlementRegistry,
    current_day: Day,
) -> Vec<EconomyEvent> {
    let mut events = Vec::new();

    for caravan in caravans.iter_mut() {
        if caravan.status != CaravanStatus::InTransit || current_day < caravan.arrival_day() {
            continue;
        }

        let intercept_chance = (caravan.risk_score * INTERCEPT_CHANCE_FACTOR).clamp(0.0, 1.0);
        if registry.rng.gen_bool(intercept_chance) {
            caravan.status = CaravanStatus::Intercepted;
            tracing::warn!(caravan = %caravan.id, "caravan intercepted");
            events.push(EconomyEvent::CaravanLost {
                id: caravan.id,
                origin: caravan.origin.clone(),
            });
            continue;
        }

        let Some(destination) = registry.get_mut(&caravan.destination) else {
            tracing::warn!(
                caravan = %caravan.id,
                destination = %caravan.destination,
                "caravan destination not found; delivery skipped"
            );
            continue;
        };

        for (&kind, &quantity) in &caravan.manifest {
            destination.add_trade_transaction(kind, quantity, true, None);
        }
        caravan.status = CaravanStatus::Delivered;
        tracing::info!(
            caravan = %caravan.id,
            destination = %caravan.destination,
            "caravan delivered"
        );
        events.push(EconomyEvent::CaravanDelivered {
            id: caravan.id,
            destination: caravan.destination.clone(),
        });
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Vec2;
    use crate::settlement::Settlement;

    #[test]
    fn test_risk_score_scales_with_cargo() {
        let light = Caravan::new(
            "A",
            "B",
            BTreeMap::from([(ResourceKind::Tools, 50.0)]),
            1,
            3,
        );
        assert_eq!(light.risk_score, 0.05);

        let heavy = Caravan::new(
            "A",
            "B",
            BTreeMap::from([(ResourceKind::Food, 5000.0)]),
            1,
            3,
        );
        assert_eq!(heavy.risk_score, 1.0);
    }

    #[test]
    fn test_arrival_day() {
        let caravan = Caravan::new("A", "B", BTreeMap::new(), 4, 7);
        assert_eq!(caravan.arrival_day(), 11);
    }

    #[test]
    fn test_generation_skips_distant_suppliers() {
        let mut registry = SettlementRegistry::new(42, 1100);

        let mut needy = Settlement::new("Needy", 300, Vec2::new(0.0, 0.0));
        {
            let tools = needy.resources.get_mut(&ResourceKind::Tools).unwrap();
            tools.consumption_base = 30.0;
            tools.production_base = 5.0;
        }
        registry.insert(needy);

        let mut remote = Settlement::new("Remote", 800, Vec2::new(100.0, 100.0));
        {
            let tools = remote.resources.get_mut(&ResourceKind::Tools).unwrap();
            tools.stockpile = 500.0;
        }
        registry.insert(remote);

        let caravans = generate_caravans(&mut registry, 1);
        assert!(caravans
            .iter()
            .all(|c| !(c.origin == "Remote" && c.manifest.contains_key(&ResourceKind::Tools))));
    }

    #[test]
    fn test_delivery_credits_destination_through_ledger() {
        let mut registry = SettlementRegistry::new(42, 1100);
        registry.insert(Settlement::new("Dest", 300, Vec2::new(0.0, 0.0)));

        let mut caravan = Caravan::new(
            "Origin",
            "Dest",
            BTreeMap::from([(ResourceKind::Tools, 40.0)]),
            1,
            2,
        );
        caravan.risk_score = 0.0; // force a safe journey

        let before = registry.get("Dest").unwrap().resources[&ResourceKind::Tools].stockpile;
        let mut fleet = vec![caravan];

        // Not yet arrived
        let events = resolve_caravans(&mut fleet, &mut registry, 2);
        assert!(events.is_empty());
        assert_eq!(fleet[0].status, CaravanStatus::InTransit);

        let events = resolve_caravans(&mut fleet, &mut registry, 3);
        assert_eq!(events.len(), 1);
        assert_eq!(fleet[0].status, CaravanStatus::Delivered);

        let account = &registry.get("Dest").unwrap().resources[&ResourceKind::Tools];
        assert_eq!(account.stockpile, before + 40.0);
        assert_eq!(account.import_volume, 40.0);
    }

    #[test]
    fn test_certain_risk_intercepts_caravan() {
        let mut registry = SettlementRegistry::new(42, 1100);
        registry.insert(Settlement::new("Dest", 300, Vec2::new(0.0, 0.0)));

        let mut caravan = Caravan::new(
            "Origin",
            "Dest",
            BTreeMap::from([(ResourceKind::Tools, 40.0)]),
            1,
            1,
        );
        caravan.risk_score = 10.0; // intercept chance clamps to 1.0

        let before = registry.get("Dest").unwrap().resources[&ResourceKind::Tools].stockpile;
        let mut fleet = vec![caravan];
        let events = resolve_caravans(&mut fleet, &mut registry, 5);

        assert_eq!(fleet[0].status, CaravanStatus::Intercepted);
        assert_eq!(
            events,
            vec![EconomyEvent::CaravanLost {
                id: fleet[0].id,
                origin: "Origin".to_string(),
            }]
        );
        assert_eq!(
            registry.get("Dest").unwrap().resources[&ResourceKind::Tools].stockpile,
            before
        );
    }

    #[test]
    fn test_unknown_destination_skips_delivery() {
        let mut registry = SettlementRegistry::new(42, 1100);
        let mut caravan = Caravan::new(
            "Origin",
            "Ghostville",
            BTreeMap::from([(ResourceKind::Food, 20.0)]),
            1,
            1,
        );
        caravan.risk_score = 0.0;

        let mut fleet = vec![caravan];
        let events = resolve_caravans(&mut fleet, &mut registry, 10);
        assert!(events.is_empty());
        assert_eq!(fleet[0].status, CaravanStatus::InTransit);
    }
}
