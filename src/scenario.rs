//! Load world scenarios from TOML files
//!
//! A scenario bootstraps a settlement registry and an economy engine:
//! engine settings (seed, season, calendar year) plus one entry per
//! settlement with its starting population, location, and governance.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::core::config::EconomyConfig;
use crate::core::error::{EmberError, Result};
use crate::core::types::{Vec2, Year};
use crate::economy::EconomyEngine;
use crate::settlement::{Settlement, SettlementRegistry};

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub world: WorldSettings,
    #[serde(default)]
    pub settlements: Vec<SettlementEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorldSettings {
    pub seed: u64,
    #[serde(default = "default_season_modifier")]
    pub season_modifier: f64,
    #[serde(default = "default_current_year")]
    pub current_year: Year,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SettlementEntry {
    pub name: String,
    pub population: u32,
    pub location: [f32; 2],
    #[serde(default = "default_founding_year")]
    pub founding_year: Year,
    pub governing_faction: Option<String>,
    pub governance_type: Option<String>,
    pub reputation: Option<f64>,
    pub threat_level: Option<i32>,
}

fn default_season_modifier() -> f64 {
    1.0
}

fn default_current_year() -> Year {
    1100
}

fn default_founding_year() -> Year {
    1000
}

impl Scenario {
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let scenario: Scenario = toml::from_str(content)?;
        scenario.validate()?;
        Ok(scenario)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for entry in &self.settlements {
            if !seen.insert(entry.name.as_str()) {
                return Err(EmberError::InvalidScenario(format!(
                    "duplicate settlement name '{}'",
                    entry.name
                )));
            }
        }
        Ok(())
    }

    /// Build a runnable registry and engine from this scenario
    pub fn build(&self) -> (SettlementRegistry, EconomyEngine) {
        let mut registry = SettlementRegistry::new(self.world.seed, self.world.current_year);

        for entry in &self.settlements {
            let mut settlement = Settlement::new(
                entry.name.clone(),
                entry.population,
                Vec2::new(entry.location[0], entry.location[1]),
            )
            .with_founding_year(entry.founding_year);

            if let Some(threat) = entry.threat_level {
                settlement.set_threat_level(threat);
            }
            if let Some(reputation) = entry.reputation {
                if let Some(faction) = &entry.governing_faction {
                    settlement.set_reputation(faction.clone(), reputation);
                }
            }
            if let Some(faction) = &entry.governing_faction {
                settlement = settlement
                    .with_governing_faction(faction.clone(), entry.governance_type.as_deref());
            }

            registry.insert(settlement);
        }

        let engine = EconomyEngine::new(EconomyConfig::default())
            .with_season_modifier(self.world.season_modifier);

        (registry, engine)
    }
}
