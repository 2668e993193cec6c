//! Faction economic effects collaborator boundary
//!
//! The engine never interprets a governing faction identifier itself; a
//! [`FactionPolicy`] maps the identifier to typed effects which the engine
//! then applies. The default policy reproduces the long-standing keyword
//! matching on the identifier string.

use crate::settlement::Settlement;

/// A typed economic effect granted by a governing faction
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FactionEffect {
    /// Raise every resource account's production modifier to at least
    /// `floor` (never lowers an existing modifier)
    TradeBoost { floor: f64 },
    /// Flat daily integrity restoration, clamped at 100
    IntegrityUpkeep { amount: f64 },
}

/// Maps a governing faction identifier to the effects it grants
pub trait FactionPolicy {
    fn effects_for(&self, faction_id: &str) -> Vec<FactionEffect>;
}

/// Default policy: substring matching on the faction identifier
///
/// Identifiers containing "merchant" boost trade efficiency; identifiers
/// containing "military" maintain integrity. Matching on substrings rather
/// than an explicit faction-category tag is questionable but deliberate
/// here; a tag-based policy can replace this one without engine changes.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordFactionPolicy;

impl FactionPolicy for KeywordFactionPolicy {
    fn effects_for(&self, faction_id: &str) -> Vec<FactionEffect> {
        let lowered = faction_id.to_lowercase();
        let mut effects = Vec::new();

        if lowered.contains("merchant") {
            effects.push(FactionEffect::TradeBoost { floor: 1.1 });
        }
        if lowered.contains("military") {
            effects.push(FactionEffect::IntegrityUpkeep { amount: 0.1 });
        }

        effects
    }
}

/// Apply one effect to a settlement's economic state
pub fn apply_effect(settlement: &mut Settlement, effect: &FactionEffect) {
    match effect {
        FactionEffect::TradeBoost { floor } => {
            for account in settlement.resources.values_mut() {
                account.production_modifier = account.production_modifier.max(*floor);
            }
        }
        FactionEffect::IntegrityUpkeep { amount } => {
            settlement.integrity = (settlement.integrity + amount).min(100.0);
        }
    }
}
