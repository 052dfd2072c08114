use std::io::Write;

use crate::error::JournalError;
use crate::models::TradeRow;

const HEADER: &[&str] = &[
    "id", "stock", "cmp", "slp", "tgtp", "sb", "rsi", "candle", "volume", "pl", "entry_date",
    "exit_date", "remarks", "sl", "tgt", "stb_sl", "stb_ipt", "stb", "invested", "booked", "rr",
    "percent_pl", "tenure",
];

/// Write the journal as CSV, one record per row, blank cells for absent
/// fields, dates in canonical `YYYY-MM-DD` form.
pub fn export_trades_csv<W: Write>(rows: &[TradeRow], writer: W) -> Result<(), JournalError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADER)?;

    for row in rows {
        let opt_num = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();
        let opt_int = |v: Option<i64>| v.map(|v| v.to_string()).unwrap_or_default();
        wtr.write_record(&[
            opt_int(row.id),
            row.stock.clone(),
            opt_num(row.cmp),
            opt_num(row.slp),
            opt_num(row.tgtp),
            opt_int(row.sb),
            row.rsi.map(|t| t.to_string()).unwrap_or_default(),
            row.candle.map(|t| t.to_string()).unwrap_or_default(),
            row.volume.map(|t| t.to_string()).unwrap_or_default(),
            row.pl.map(|t| t.to_string()).unwrap_or_default(),
            row.entry_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            row.exit_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            row.remarks.clone(),
            format!("{:.2}", row.sl),
            format!("{:.2}", row.tgt),
            row.stb_sl.to_string(),
            row.stb_ipt.to_string(),
            row.stb.to_string(),
            format!("{:.2}", row.invested),
            row.booked.map(|v| format!("{v:.2}")).unwrap_or_default(),
            row.rr.map(|v| format!("{v:.2}")).unwrap_or_default(),
            row.percent_pl.map(|v| format!("{v:.2}")).unwrap_or_default(),
            opt_int(row.tenure),
        ])?;
    }

    wtr.flush().map_err(|e| JournalError::Csv(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::derive_at;
    use crate::models::{Outcome, RiskSettings, TradeBudgets};
    use chrono::NaiveDate;

    #[test]
    fn test_export_shape_and_values() {
        let budgets = TradeBudgets::derive(&RiskSettings::new(100_000.0, 1.0, 20));
        let now = NaiveDate::from_ymd_opt(2025, 6, 2)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let mut row = TradeRow::blank();
        row.stock = "INFY".into();
        row.cmp = Some(100.0);
        row.slp = Some(97.0);
        row.tgtp = Some(109.0);
        row.sb = Some(50);
        row.pl = Some(Outcome::Profit);
        let derived = derive_at(&row, &budgets, now);

        let mut buf = Vec::new();
        export_trades_csv(&[derived, TradeRow::blank()], &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3); // header + two rows
        assert!(lines[0].starts_with("id,stock,cmp"));
        assert!(lines[1].contains("INFY"));
        assert!(lines[1].contains("Profit"));
        assert!(lines[1].contains("450.00"));
        assert!(lines[1].contains("2025-06-02"));
    }

    #[test]
    fn test_blank_row_exports_empty_cells() {
        let mut buf = Vec::new();
        export_trades_csv(&[TradeRow::blank()], &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let record = text.lines().nth(1).unwrap();
        // Raw fields blank, derived numerics zeroed.
        assert!(record.starts_with(",,,,"));
        assert!(record.contains("0.00"));
    }
}
