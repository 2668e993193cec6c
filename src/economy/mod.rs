//! Economy layer - the daily tick engine and its collaborators

pub mod effects;
pub mod events;
pub mod tick;
pub mod trade;

pub use effects::{apply_effect, FactionEffect, FactionPolicy, KeywordFactionPolicy};
pub use events::{EconomyEvent, EconomySummary, SettlementReport, TickReport, TickSummary};
pub use tick::EconomyEngine;
pub use trade::{process_inter_settlement_trade, trade_between};
