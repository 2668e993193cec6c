//! Terminal collapse evaluation
//!
//! Predicates run in a fixed priority order and the first match is recorded
//! as the sole collapse reason. The ordering is a deterministic tie-break,
//! not a severity ranking. Collapse is a normal lifecycle transition: the
//! settlement is deactivated and retained, never deleted.

use serde::{Deserialize, Serialize};

use crate::settlement::resources::ResourceKind;
use crate::settlement::Settlement;

/// Why a settlement shut down, in evaluation priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollapseReason {
    PopulationCollapse,
    IntegrityFailure,
    Starvation,
    StabilityCollapse,
    OverwhelmingThreat,
}

impl CollapseReason {
    pub const fn as_str(&self) -> &'static str {
        match self {
            CollapseReason::PopulationCollapse => "population_collapse",
            CollapseReason::IntegrityFailure => "integrity_failure",
            CollapseReason::Starvation => "starvation",
            CollapseReason::StabilityCollapse => "stability_collapse",
            CollapseReason::OverwhelmingThreat => "overwhelming_threat",
        }
    }
}

impl std::fmt::Display for CollapseReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check collapse predicates and deactivate the settlement on the first hit
///
/// Inactive settlements are never re-evaluated. Returns the recorded reason
/// when a collapse occurred this call.
pub fn evaluate_collapse(settlement: &mut Settlement) -> Option<CollapseReason> {
    if !settlement.is_active {
        return None;
    }

    let reason = first_matching_reason(settlement)?;
    settlement.is_active = false;
    settlement.collapse_reason = Some(reason);
    Some(reason)
}

fn first_matching_reason(settlement: &Settlement) -> Option<CollapseReason> {
    if settlement.population <= 5 {
        return Some(CollapseReason::PopulationCollapse);
    }

    if settlement.integrity <= 5.0 {
        return Some(CollapseReason::IntegrityFailure);
    }

    if let Some(staple) = settlement.resources.get(&ResourceKind::STAPLE) {
        if staple.stockpile <= 0.0 && staple.net_production() <= 0.0 {
            return Some(CollapseReason::Starvation);
        }
    }

    if settlement.stability_score <= 10.0 {
        return Some(CollapseReason::StabilityCollapse);
    }

    if settlement.threat_level >= 9 {
        return Some(CollapseReason::OverwhelmingThreat);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Vec2;

    fn healthy() -> Settlement {
        Settlement::new("Testford", 45, Vec2::new(0.0, 0.0))
    }

    #[test]
    fn test_healthy_settlement_does_not_collapse() {
        let mut settlement = healthy();
        settlement.stability_score = 50.0;
        assert_eq!(evaluate_collapse(&mut settlement), None);
        assert!(settlement.is_active);
        assert_eq!(settlement.collapse_reason, None);
    }

    #[test]
    fn test_population_collapse_outranks_later_predicates() {
        // Population, stability, and threat predicates are all true; only
        // the first in priority order is recorded
        let mut settlement = healthy();
        settlement.population = 4;
        settlement.stability_score = 5.0;
        settlement.threat_level = 9;

        assert_eq!(
            evaluate_collapse(&mut settlement),
            Some(CollapseReason::PopulationCollapse)
        );
        assert!(!settlement.is_active);
        assert_eq!(
            settlement.collapse_reason,
            Some(CollapseReason::PopulationCollapse)
        );
    }

    #[test]
    fn test_stability_collapse_outranks_threat() {
        let mut settlement = healthy();
        settlement.stability_score = 5.0;
        settlement.threat_level = 9;

        assert_eq!(
            evaluate_collapse(&mut settlement),
            Some(CollapseReason::StabilityCollapse)
        );
    }

    #[test]
    fn test_starvation_requires_empty_stockpile_and_no_net_production() {
        let mut settlement = healthy();
        settlement.stability_score = 50.0;
        {
            let staple = settlement
                .resources
                .get_mut(&ResourceKind::STAPLE)
                .unwrap();
            staple.stockpile = 0.0;
            staple.production_base = 1.0;
            staple.consumption_base = 2.0;
        }
        assert_eq!(
            evaluate_collapse(&mut settlement),
            Some(CollapseReason::Starvation)
        );

        // Positive net production averts starvation even with an empty store
        let mut fed = healthy();
        fed.stability_score = 50.0;
        {
            let staple = fed.resources.get_mut(&ResourceKind::STAPLE).unwrap();
            staple.stockpile = 0.0;
            staple.production_base = 5.0;
            staple.consumption_base = 2.0;
        }
        assert_eq!(evaluate_collapse(&mut fed), None);
    }

    #[test]
    fn test_integrity_failure() {
        let mut settlement = healthy();
        settlement.stability_score = 50.0;
        settlement.integrity = 5.0;
        assert_eq!(
            evaluate_collapse(&mut settlement),
            Some(CollapseReason::IntegrityFailure)
        );
    }

    #[test]
    fn test_overwhelming_threat_is_lowest_priority() {
        let mut settlement = healthy();
        settlement.stability_score = 50.0;
        settlement.threat_level = 9;
        assert_eq!(
            evaluate_collapse(&mut settlement),
            Some(CollapseReason::OverwhelmingThreat)
        );
    }

    #[test]
    fn test_inactive_settlement_is_skipped() {
        let mut settlement = healthy();
        settlement.population = 1;
        settlement.is_active = false;
        assert_eq!(evaluate_collapse(&mut settlement), None);
        assert_eq!(settlement.collapse_reason, None);
    }

    #[test]
    fn test_reason_tags_are_stable() {
        assert_eq!(
            CollapseReason::PopulationCollapse.as_str(),
            "population_collapse"
        );
        assert_eq!(CollapseReason::Starvation.as_str(), "starvation");
        assert_eq!(
            CollapseReason::OverwhelmingThreat.as_str(),
            "overwhelming_threat"
        );
    }
}
