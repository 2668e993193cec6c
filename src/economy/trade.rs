//! Inter-settlement trade matching (Phase B of the daily tick)
//!
//! For every unordered pair of active settlements, each resource's surplus
//! is measured against a buffer of several days' consumption. When one side
//! holds a surplus and the other runs a deficit, part of the surplus moves
//! through both ledgers' transaction API, registering the trade partners.

use crate::core::config::EconomyConfig;
use crate::settlement::{ResourceKind, Settlement, SettlementRegistry};

/// Run pairwise trade across all active settlements
///
/// Pairs are visited in registry order for determinism. Returns the total
/// volume moved this phase.
pub fn process_inter_settlement_trade(
    registry: &mut SettlementRegistry,
    config: &EconomyConfig,
) -> f64 {
    let mut total_volume = 0.0;
    let count = registry.len();

    for a in 0..count {
        for b in (a + 1)..count {
            if !registry.settlements[a].is_active || !registry.settlements[b].is_active {
                continue;
            }
            let (left, right) = registry.pair_mut(a, b);
            total_volume += trade_between(left, right, config);
        }
    }

    total_volume
}

/// Exchange surplus for deficit between two settlements
///
/// Returns the volume moved across all resource kinds.
pub fn trade_between(a: &mut Settlement, b: &mut Settlement, config: &EconomyConfig) -> f64 {
    let mut volume = 0.0;

    for kind in ResourceKind::ALL {
        let Some(surplus_a) = surplus(a, kind, config) else {
            continue;
        };
        let Some(surplus_b) = surplus(b, kind, config) else {
            continue;
        };

        if surplus_a > config.trade_surplus_threshold && surplus_b < config.trade_deficit_threshold
        {
            volume += transfer(a, b, kind, surplus_a, surplus_b, config);
        } else if surplus_b > config.trade_surplus_threshold
            && surplus_a < config.trade_deficit_threshold
        {
            volume += transfer(b, a, kind, surplus_b, surplus_a, config);
        }
    }

    if volume > 0.0 {
        tracing::debug!(
            from = %a.name,
            to = %b.name,
            volume,
            "bilateral trade executed"
        );
    }

    volume
}

/// Stock above (or below, when negative) the consumption buffer
fn surplus(settlement: &Settlement, kind: ResourceKind, config: &EconomyConfig) -> Option<f64> {
    let account = settlement.resources.get(&kind)?;
    Some(account.stockpile - account.consumption_base * config.trade_buffer_days)
}

fn transfer(
    exporter: &mut Settlement,
    importer: &mut Settlement,
    kind: ResourceKind,
    exporter_surplus: f64,
    importer_surplus: f64,
    config: &EconomyConfig,
) -> f64 {
    let amount = (exporter_surplus * config.trade_surplus_rate)
        .min(importer_surplus.abs() * config.trade_deficit_rate);

    let importer_name = importer.name.clone();
    let exporter_name = exporter.name.clone();
    exporter.add_trade_transaction(kind, amount, false, Some(&importer_name));
    importer.add_trade_transaction(kind, amount, true, Some(&exporter_name));

    amount
}
