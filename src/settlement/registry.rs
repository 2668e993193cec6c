//! SettlementRegistry - the owning container for world economic state
//!
//! Holds every settlement (active and collapsed), the deterministic RNG all
//! stochastic draws go through, and the game calendar year used by the
//! stability scorer. Settlements are mutated only by the economy engine and
//! the trade/caravan collaborators it invokes during a tick.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::error::{EmberError, Result};
use crate::core::types::Year;
use crate::settlement::Settlement;

pub struct SettlementRegistry {
    /// All settlements in registration order; collapsed ones are retained
    pub settlements: Vec<Settlement>,
    /// Deterministic RNG for every stochastic draw in the simulation
    pub rng: ChaCha8Rng,
    /// Current game calendar year, read by the stability scorer
    pub current_year: Year,
}

impl SettlementRegistry {
    pub fn new(seed: u64, current_year: Year) -> Self {
        Self {
            settlements: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            current_year,
        }
    }

    /// Register a settlement, computing its initial stability score
    pub fn insert(&mut self, mut settlement: Settlement) {
        settlement.recalculate_stability(self.current_year);
        tracing::info!(
            settlement = %settlement.name,
            tier = %settlement.tier,
            population = settlement.population,
            "settlement registered"
        );
        self.settlements.push(settlement);
    }

    pub fn get(&self, name: &str) -> Option<&Settlement> {
        self.settlements.iter().find(|s| s.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Settlement> {
        self.settlements.iter_mut().find(|s| s.name == name)
    }

    /// Index of a settlement by name, as an error on miss
    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.settlements
            .iter()
            .position(|s| s.name == name)
            .ok_or_else(|| EmberError::UnknownSettlement(name.to_string()))
    }

    /// Disjoint mutable borrows of two settlements by index
    ///
    /// Used by the pairwise trade phase, which mutates both sides of a
    /// transaction together. Panics if the indices are equal.
    pub fn pair_mut(&mut self, a: usize, b: usize) -> (&mut Settlement, &mut Settlement) {
        assert_ne!(a, b, "pair_mut requires distinct settlements");
        if a < b {
            let (left, right) = self.settlements.split_at_mut(b);
            (&mut left[a], &mut right[0])
        } else {
            let (left, right) = self.settlements.split_at_mut(a);
            (&mut right[0], &mut left[b])
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Settlement> {
        self.settlements.iter()
    }

    pub fn iter_active(&self) -> impl Iterator<Item = &Settlement> {
        self.settlements.iter().filter(|s| s.is_active)
    }

    pub fn active_count(&self) -> usize {
        self.iter_active().count()
    }

    pub fn len(&self) -> usize {
        self.settlements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settlements.is_empty()
    }

    /// Serializable snapshot of all settlement state
    ///
    /// The RNG itself is not captured; restoring a snapshot into a registry
    /// seeded identically reproduces the pre-snapshot trajectory.
    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            current_year: self.current_year,
            settlements: self.settlements.clone(),
        }
    }

    /// Restore settlement state from a snapshot, keeping this registry's RNG
    pub fn restore(&mut self, snapshot: RegistrySnapshot) {
        self.current_year = snapshot.current_year;
        self.settlements = snapshot.settlements;
    }
}

/// Persisted registry state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub current_year: Year,
    pub settlements: Vec<Settlement>,
}

impl RegistrySnapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
