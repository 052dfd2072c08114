//! Position-sizing and trade P/L journal engine.
//!
//! The engine derives a consistent set of risk, sizing, and profitability
//! fields from each trade row's raw inputs, folds the collection into
//! portfolio KPIs, and persists rows and risk settings in SQLite.

pub mod db;
pub mod engine;
pub mod error;
pub mod export;
pub mod journal;
pub mod models;

pub use db::Database;
pub use engine::{aggregate, derive, derive_at, tenure_between, PortfolioSummary};
pub use error::JournalError;
pub use journal::{FieldEdit, Journal};
pub use models::{
    CandlePattern, Confirmation, Outcome, RiskSettings, RiskSettingsUpdate, RoiSnapshot,
    TradeBudgets, TradeRow, TradeRowInput,
};
