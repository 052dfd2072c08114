use serde::{Deserialize, Serialize};

use crate::models::{Outcome, TradeRow};

/// 20% tax, charged on gains only.
pub const TAX_RATE: f64 = 0.20;
/// 4% donation, taken from gains only.
pub const DONATION_RATE: f64 = 0.04;

/// Dashboard KPIs folded from the full row collection. Ephemeral: recomputed
/// on every row or settings change, never persisted directly (the settings
/// form snapshots it). Sums carry full precision; rounding happens at
/// display/snapshot time.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PortfolioSummary {
    /// Capital committed to open positions (rows without an outcome).
    pub invested_sum: f64,
    /// Realized P/L over closed rows.
    pub monthly_pl_total: f64,
    pub tax_pl: f64,
    pub donation: f64,
    pub monthly_gain: f64,
    pub monthly_gain_percent: f64,
    /// Sign-split booked sums for the profit/loss chart.
    pub booked_positive: f64,
    pub booked_negative: f64,
}

/// Fold the row collection into dashboard KPIs.
///
/// Open and closed rows contribute exclusively: a row's `invested` counts
/// toward at-risk capital only while no outcome is chosen, and its P/L
/// counts only once one is. The realized total is recomputed from raw
/// fields, which by construction matches each row's stored `booked`.
pub fn aggregate(rows: &[TradeRow], capital: f64) -> PortfolioSummary {
    let invested_sum: f64 = rows
        .iter()
        .filter(|row| row.is_open())
        .map(|row| row.invested)
        .sum();

    let monthly_pl_total: f64 = rows
        .iter()
        .filter_map(|row| {
            let pl = row.pl?;
            let cmp = row.cmp.unwrap_or(0.0);
            let slp = row.slp.unwrap_or(0.0);
            let tgtp = row.tgtp.unwrap_or(0.0);
            let sb = row.sb.unwrap_or(0) as f64;
            let sl = cmp - slp;
            let tgt = tgtp - cmp;
            let invested = cmp * sb;
            Some(match pl {
                Outcome::Profit => (cmp + tgt) * sb - invested,
                Outcome::Loss => (cmp - sl) * sb - invested,
            })
        })
        .sum();

    let tax_pl = if monthly_pl_total > 0.0 {
        monthly_pl_total * TAX_RATE
    } else {
        0.0
    };
    let donation = if monthly_pl_total > 0.0 {
        monthly_pl_total * DONATION_RATE
    } else {
        0.0
    };
    let monthly_gain = monthly_pl_total - tax_pl - donation;
    let monthly_gain_percent = if capital > 0.0 {
        monthly_gain / capital * 100.0
    } else {
        0.0
    };

    let booked_positive: f64 = rows
        .iter()
        .filter_map(|row| row.booked)
        .filter(|b| *b > 0.0)
        .sum();
    let booked_negative: f64 = rows
        .iter()
        .filter_map(|row| row.booked)
        .filter(|b| *b < 0.0)
        .map(f64::abs)
        .sum();

    PortfolioSummary {
        invested_sum,
        monthly_pl_total,
        tax_pl,
        donation,
        monthly_gain,
        monthly_gain_percent,
        booked_positive,
        booked_negative,
    }
}
