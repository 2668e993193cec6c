//! Economy tuning constants with documented interactions
//!
//! All magic numbers for the daily economic cycle are collected here with
//! explanations of their purpose and how they interact with each other.

/// Configuration for the daily economy tick
///
/// These values have been tuned to produce stable multi-settlement economies
/// over long runs. Changing them will affect growth pacing and collapse rates.
#[derive(Debug, Clone)]
pub struct EconomyConfig {
    // === PRODUCTION ===
    /// Daily production variance half-width
    ///
    /// Each resource's daily output is scaled by a factor sampled uniformly
    /// from [1 - variance, 1 + variance]. At 0.05, output swings +/-5% per day.
    pub production_variance: f64,

    /// Minimum production bonus fraction at integrity just above 0
    ///
    /// Together with `integrity_bonus_max` this defines the linear bonus
    /// ramp: multiplier = 1.0 + min + (integrity / 100) * (max - min).
    pub integrity_bonus_min: f64,

    /// Maximum production bonus fraction at integrity 100
    pub integrity_bonus_max: f64,

    /// Production multiplier when integrity has bottomed out at 0
    ///
    /// A penalty, not a shutdown: settlements keep a reduced output rather
    /// than starving instantly when integrity fails.
    pub zero_integrity_multiplier: f64,

    // === POPULATION ===
    /// Base daily population growth rate before modifiers (0.001 = 0.1%/day)
    pub base_daily_growth_rate: f64,

    /// Combined-modifier floor below which growth is vetoed
    ///
    /// When the product of stability, tier, food, and season modifiers falls
    /// below this value, a non-negative computed delta is replaced by a
    /// random choice of -1 or 0. Poor conditions never permit growth.
    pub poor_conditions_threshold: f64,

    // === INTEGRITY ===
    /// Fraction of the tier's base decay applied per day
    pub daily_decay_fraction: f64,

    /// Cap on the daily integrity bonus earned from trade volume
    pub trade_integrity_bonus_cap: f64,

    /// Trade volume required per point of integrity bonus
    ///
    /// bonus = min(cap, volume / divisor). At 1000.0 with a 0.05 cap, a
    /// settlement needs 50 units of daily trade to hit the full bonus.
    pub trade_integrity_divisor: f64,

    /// Half-width of the random daily integrity fluctuation
    pub integrity_fluctuation: f64,

    /// Integrity penalty rate per unit of relative distance from the tier's
    /// optimal population
    pub population_stress_rate: f64,

    // === INTER-SETTLEMENT TRADE ===
    /// Days of consumption kept as a buffer before stock counts as surplus
    pub trade_buffer_days: f64,

    /// Surplus above which a settlement is willing to export
    pub trade_surplus_threshold: f64,

    /// Deficit below which a settlement seeks imports (negative surplus)
    pub trade_deficit_threshold: f64,

    /// Fraction of the exporter's surplus moved per transaction
    pub trade_surplus_rate: f64,

    /// Fraction of the importer's deficit covered per transaction
    pub trade_deficit_rate: f64,

    /// Window (in ticks) for the rolling trade volume average used by
    /// tier upgrade checks
    pub trade_average_window: usize,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            // Production
            production_variance: 0.05,
            integrity_bonus_min: 0.10,
            integrity_bonus_max: 0.30,
            zero_integrity_multiplier: 0.8,

            // Population
            base_daily_growth_rate: 0.001,
            poor_conditions_threshold: 0.7,

            // Integrity
            daily_decay_fraction: 0.1,
            trade_integrity_bonus_cap: 0.05,
            trade_integrity_divisor: 1000.0,
            integrity_fluctuation: 0.1,
            population_stress_rate: 0.05,

            // Trade
            trade_buffer_days: 5.0,
            trade_surplus_threshold: 10.0,
            trade_deficit_threshold: -5.0,
            trade_surplus_rate: 0.1,
            trade_deficit_rate: 0.5,
            trade_average_window: 10,
        }
    }
}

impl EconomyConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.production_variance < 0.0 || self.production_variance >= 1.0 {
            return Err(format!(
                "production_variance ({}) must be in [0, 1)",
                self.production_variance
            ));
        }

        if self.integrity_bonus_min >= self.integrity_bonus_max {
            return Err(format!(
                "integrity_bonus_min ({}) should be < integrity_bonus_max ({})",
                self.integrity_bonus_min, self.integrity_bonus_max
            ));
        }

        if self.base_daily_growth_rate <= 0.0 {
            return Err("base_daily_growth_rate must be positive".into());
        }

        if self.trade_surplus_threshold <= 0.0 || self.trade_deficit_threshold >= 0.0 {
            return Err(format!(
                "trade thresholds ({}, {}) must bracket zero",
                self.trade_surplus_threshold, self.trade_deficit_threshold
            ));
        }

        if self.trade_average_window == 0 {
            return Err("trade_average_window must be at least 1".into());
        }

        Ok(())
    }
}
