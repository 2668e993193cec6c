//! Composite stability scoring
//!
//! Stability is a weighted sum of independently capped terms, clamped to
//! [0, 100]. Each term saturates on its own so no single factor can swamp
//! the score.

use crate::core::types::Year;
use crate::settlement::Settlement;

/// Stability points gained per year of settlement age
pub const AGE_RATE: f64 = 0.5;

/// Cap on the age contribution (reached at 60+ years)
pub const AGE_CAP: f64 = 30.0;

/// Cap on the integrity contribution
pub const INTEGRITY_CAP: f64 = 25.0;

/// Cap on the governing-faction reputation contribution
pub const GOVERNANCE_CAP: f64 = 20.0;

/// Governance contribution when no faction governs or no reputation is
/// recorded; absence of governance reads as moderately stable
pub const UNGOVERNED_DEFAULT: f64 = 10.0;

/// Cap on the trade-relationship bonus (one point per distinct partner)
pub const TRADE_PARTNER_CAP: f64 = 5.0;

/// Stability lost per threat level
pub const THREAT_PENALTY_RATE: f64 = 2.0;

/// Compute the stability score for a settlement
///
/// Pure with respect to the settlement; callers store the result via
/// [`Settlement::recalculate_stability`].
pub fn compute(settlement: &Settlement, current_year: Year) -> f64 {
    // Older settlements gain passive stability
    let age = (current_year - settlement.founding_year).max(0) as f64;
    let age_term = (age * AGE_RATE).min(AGE_CAP);

    let integrity_term = (settlement.integrity / 100.0) * INTEGRITY_CAP;

    // Reputation of the governing faction, mapped from [-100, 100] onto
    // [0, cap]; ungoverned settlements get a flat moderate default
    let governance_term = match settlement
        .governing_faction_id
        .as_deref()
        .and_then(|id| settlement.reputation.get(id))
    {
        Some(&reputation) => ((reputation + 100.0) / 200.0).max(0.0) * GOVERNANCE_CAP,
        None => UNGOVERNED_DEFAULT,
    };

    let tier_term = settlement.tier.profile().stability_bonus;

    // Distance from the tier's optimal population, symmetric and floored at
    // zero. The open-ended top tier treats the ratio as zero.
    let population_ratio = settlement
        .tier
        .optimal_population()
        .map_or(0.0, |optimal| settlement.population as f64 / optimal);
    let population_term = (10.0 - (1.0 - population_ratio).abs() * 5.0).max(0.0);

    let trade_term = (settlement.trade_partners.len() as f64).min(TRADE_PARTNER_CAP);

    let threat_penalty = settlement.threat_level as f64 * THREAT_PENALTY_RATE;

    let total = age_term
        + integrity_term
        + governance_term
        + tier_term
        + population_term
        + trade_term
        - threat_penalty;

    total.clamp(0.0, 100.0)
}
