//! Bounded rolling metric histories
//!
//! One snapshot per settlement per tick across four series, capped at
//! [`HISTORY_CAP`] entries with oldest-first eviction.

use serde::{Deserialize, Serialize};

/// Maximum retained snapshots per series
pub const HISTORY_CAP: usize = 30;

/// Rolling per-tick samples of key settlement indicators
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettlementMetrics {
    pub population_history: Vec<u32>,
    pub integrity_history: Vec<f64>,
    pub trade_volume_history: Vec<f64>,
    pub threat_history: Vec<u8>,
}

impl SettlementMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one tick's snapshot across all series, evicting the oldest
    /// entries once the cap is exceeded
    pub fn record(&mut self, population: u32, integrity: f64, trade_volume: f64, threat: u8) {
        self.population_history.push(population);
        self.integrity_history.push(integrity);
        self.trade_volume_history.push(trade_volume);
        self.threat_history.push(threat);

        if self.population_history.len() > HISTORY_CAP {
            self.population_history.remove(0);
            self.integrity_history.remove(0);
            self.trade_volume_history.remove(0);
            self.threat_history.remove(0);
        }
    }

    /// Rolling mean of the most recent `periods` trade volume samples
    pub fn trade_volume_average(&self, periods: usize) -> f64 {
        if self.trade_volume_history.is_empty() {
            return 0.0;
        }
        let start = self.trade_volume_history.len().saturating_sub(periods);
        let recent = &self.trade_volume_history[start..];
        recent.iter().sum::<f64>() / recent.len() as f64
    }

    /// Population growth trend in [-1.0, 1.0], comparing the last five
    /// samples against the rest of the window
    pub fn population_trend(&self) -> f64 {
        if self.population_history.len() < 2 {
            return 0.0;
        }

        let len = self.population_history.len();
        let split = len.saturating_sub(5);
        let recent_count = len - split;
        let recent: f64 =
            self.population_history[split..].iter().map(|&p| p as f64).sum::<f64>()
                / recent_count as f64;
        let older: f64 = self.population_history[..split].iter().map(|&p| p as f64).sum::<f64>()
            / (split.max(1)) as f64;

        ((recent - older) / older.max(1.0)).clamp(-1.0, 1.0)
    }
}
