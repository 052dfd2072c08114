use serde::{Deserialize, Serialize};

use crate::engine::aggregate::PortfolioSummary;
use crate::engine::round2;

/// Account-level risk configuration: total capital, risk tolerance per trade
/// as a percentage, and the target number of concurrent positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskSettings {
    pub capital: f64,
    pub risk_percent: f64,
    pub diversification: i64,
}

impl RiskSettings {
    pub fn new(capital: f64, risk_percent: f64, diversification: i64) -> Self {
        RiskSettings {
            capital,
            risk_percent,
            diversification,
        }
    }

    /// Negative or non-finite values are treated as 0 before any budget math.
    pub fn sanitized(&self) -> Self {
        let clean = |v: f64| if v.is_finite() && v > 0.0 { v } else { 0.0 };
        RiskSettings {
            capital: clean(self.capital),
            risk_percent: clean(self.risk_percent),
            diversification: self.diversification.max(0),
        }
    }
}

impl Default for RiskSettings {
    fn default() -> Self {
        RiskSettings::new(0.0, 0.0, 0)
    }
}

/// Partial settings update; only the provided fields change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RiskSettingsUpdate {
    pub capital: Option<f64>,
    pub risk_percent: Option<f64>,
    pub diversification: Option<i64>,
}

/// Per-trade budgets derived from the risk settings; consumed by the row
/// derivation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeBudgets {
    pub risk_per_trade: f64,
    pub total_risk: f64,
    pub investment_per_trade: f64,
}

impl TradeBudgets {
    /// risk_per_trade = capital * risk% / 100; total_risk scales it by the
    /// diversification count; investment_per_trade splits capital evenly.
    /// A diversification of 0 yields an investment budget of 0, which caps
    /// every share count at 0 until the settings are configured.
    pub fn derive(settings: &RiskSettings) -> Self {
        let settings = settings.sanitized();
        let risk_per_trade = settings.capital * settings.risk_percent / 100.0;
        let total_risk = risk_per_trade * settings.diversification as f64;
        let investment_per_trade = if settings.diversification != 0 {
            settings.capital / settings.diversification as f64
        } else {
            0.0
        };
        TradeBudgets {
            risk_per_trade,
            total_risk,
            investment_per_trade,
        }
    }
}

impl Default for TradeBudgets {
    fn default() -> Self {
        TradeBudgets::derive(&RiskSettings::default())
    }
}

/// Snapshot of the settings form as persisted alongside the risk settings:
/// the derived budgets plus the portfolio KPIs at save time. Percent fields
/// are rounded to two decimals before storage.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RoiSnapshot {
    pub total_capital: f64,
    pub risk: f64,
    pub total_risk: f64,
    pub diversification: i64,
    pub ipt: f64,
    pub rpt: f64,
    pub invested: f64,
    pub monthly_pl: f64,
    pub tax_pl: f64,
    pub donation_pl: f64,
    pub monthly_gain: f64,
    pub monthly_percent_gain: f64,
    pub total_gain: f64,
    pub total_percent_gain: f64,
}

impl RoiSnapshot {
    pub fn build(settings: &RiskSettings, summary: &PortfolioSummary) -> Self {
        let budgets = TradeBudgets::derive(settings);
        RoiSnapshot {
            total_capital: settings.capital,
            risk: settings.risk_percent,
            total_risk: budgets.total_risk,
            diversification: settings.diversification,
            ipt: budgets.investment_per_trade,
            rpt: budgets.risk_per_trade,
            invested: summary.invested_sum,
            monthly_pl: summary.monthly_pl_total,
            tax_pl: summary.tax_pl,
            donation_pl: summary.donation,
            monthly_gain: summary.monthly_gain,
            monthly_percent_gain: round2(summary.monthly_gain_percent),
            total_gain: summary.monthly_gain,
            total_percent_gain: round2(summary.monthly_gain_percent),
        }
    }
}
