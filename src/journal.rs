//! State container for the trade entry collection. Rows are never mutated in
//! place: every edit produces a freshly derived replacement row, and the
//! portfolio summary is refolded after each change.

use chrono::NaiveDate;

use crate::db::Database;
use crate::engine::{aggregate, derive, PortfolioSummary};
use crate::error::JournalError;
use crate::models::{
    CandlePattern, Confirmation, Outcome, RiskSettings, TradeBudgets, TradeRow,
};

/// A single-field edit to a trade row. `None` clears the field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldEdit {
    Stock(String),
    Cmp(Option<f64>),
    Slp(Option<f64>),
    Tgtp(Option<f64>),
    Sb(Option<i64>),
    Rsi(Option<Confirmation>),
    Candle(Option<CandlePattern>),
    Volume(Option<Confirmation>),
    Outcome(Option<Outcome>),
    EntryDate(Option<NaiveDate>),
    ExitDate(Option<NaiveDate>),
    Remarks(String),
}

pub struct Journal {
    settings: RiskSettings,
    budgets: TradeBudgets,
    entries: Vec<TradeRow>,
    summary: PortfolioSummary,
}

impl Journal {
    pub fn new(settings: RiskSettings) -> Self {
        let budgets = TradeBudgets::derive(&settings);
        Journal {
            settings,
            budgets,
            entries: Vec::new(),
            summary: PortfolioSummary::default(),
        }
    }

    /// Replace the collection with persisted rows, re-deriving each one so
    /// stale derived fields (and open-position tenure) are refreshed.
    pub fn load(&mut self, rows: Vec<TradeRow>) {
        self.entries = rows
            .iter()
            .map(|row| derive::derive(row, &self.budgets))
            .collect();
        self.refresh_summary();
    }

    /// Prepend a blank row (derived, so budgets-only fields are populated).
    pub fn add_row(&mut self) -> &TradeRow {
        let row = derive::derive(&TradeRow::blank(), &self.budgets);
        self.entries.insert(0, row);
        self.refresh_summary();
        &self.entries[0]
    }

    /// Prepend a row seeded from a screener pick: symbol plus CMP floored to
    /// an integer price.
    pub fn add_from_screener(&mut self, symbol: &str, price: f64) -> &TradeRow {
        let mut row = TradeRow::blank();
        row.stock = symbol.to_string();
        row.cmp = Some(price.floor());
        let row = derive::derive(&row, &self.budgets);
        self.entries.insert(0, row);
        self.refresh_summary();
        &self.entries[0]
    }

    /// Apply one field edit to the row at `index` and replace it with the
    /// re-derived result.
    ///
    /// A quantity above the row's current share cap is rejected: SB resets
    /// to 0, every other field is left as it was, and the caller gets a
    /// `QuantityExceedsCap` to surface.
    pub fn apply(&mut self, index: usize, edit: FieldEdit) -> Result<&TradeRow, JournalError> {
        let row = self
            .entries
            .get(index)
            .ok_or(JournalError::RowIndex(index))?;
        let mut next = row.clone();

        if let FieldEdit::Sb(Some(requested)) = edit {
            if requested > row.stb {
                let cap = row.stb;
                next.sb = Some(0);
                self.entries[index] = derive::derive(&next, &self.budgets);
                self.refresh_summary();
                return Err(JournalError::QuantityExceedsCap { requested, cap });
            }
        }

        match edit {
            FieldEdit::Stock(v) => next.stock = v,
            FieldEdit::Cmp(v) => next.cmp = v,
            FieldEdit::Slp(v) => next.slp = v,
            FieldEdit::Tgtp(v) => next.tgtp = v,
            FieldEdit::Sb(v) => next.sb = v,
            FieldEdit::Rsi(v) => next.rsi = v,
            FieldEdit::Candle(v) => next.candle = v,
            FieldEdit::Volume(v) => next.volume = v,
            FieldEdit::Outcome(v) => next.pl = v,
            FieldEdit::EntryDate(v) => next.entry_date = v,
            FieldEdit::ExitDate(v) => next.exit_date = v,
            FieldEdit::Remarks(v) => next.remarks = v,
        }

        self.entries[index] = derive::derive(&next, &self.budgets);
        self.refresh_summary();
        Ok(&self.entries[index])
    }

    /// Remove a row locally without touching persistence.
    pub fn remove(&mut self, index: usize) -> Result<TradeRow, JournalError> {
        if index >= self.entries.len() {
            return Err(JournalError::RowIndex(index));
        }
        let removed = self.entries.remove(index);
        self.refresh_summary();
        Ok(removed)
    }

    /// Swap in new risk settings: budgets are invalidated and every row is
    /// re-derived against them.
    pub fn update_settings(&mut self, settings: RiskSettings) {
        self.settings = settings;
        self.budgets = TradeBudgets::derive(&settings);
        self.entries = self
            .entries
            .iter()
            .map(|row| derive::derive(row, &self.budgets))
            .collect();
        self.refresh_summary();
    }

    /// Persist the row at `index`: update when it already has an id, create
    /// otherwise (merging the fresh id back in). A failed save propagates
    /// the error and leaves the local row exactly as it was.
    pub fn save_row(&mut self, db: &Database, index: usize) -> Result<&TradeRow, JournalError> {
        let row = self
            .entries
            .get(index)
            .ok_or(JournalError::RowIndex(index))?;
        match row.id {
            Some(id) => {
                db.update_trade(id, row)?;
                log::info!("Updated trade {id} ({})", row.stock);
            }
            None => {
                let id = db.insert_trade(row)?;
                log::info!("Created trade {id} ({})", row.stock);
                self.entries[index].id = Some(id);
            }
        }
        Ok(&self.entries[index])
    }

    /// Delete the row at `index`, removing it from the database first when
    /// it has been persisted. A failed remote delete aborts the local
    /// removal.
    pub fn delete_row(&mut self, db: &Database, index: usize) -> Result<TradeRow, JournalError> {
        let row = self
            .entries
            .get(index)
            .ok_or(JournalError::RowIndex(index))?;
        if let Some(id) = row.id {
            db.delete_trade(id)?;
            log::info!("Deleted trade {id} ({})", row.stock);
        }
        let removed = self.entries.remove(index);
        self.refresh_summary();
        Ok(removed)
    }

    pub fn entries(&self) -> &[TradeRow] {
        &self.entries
    }

    pub fn row(&self, index: usize) -> Option<&TradeRow> {
        self.entries.get(index)
    }

    pub fn settings(&self) -> &RiskSettings {
        &self.settings
    }

    pub fn budgets(&self) -> &TradeBudgets {
        &self.budgets
    }

    pub fn summary(&self) -> &PortfolioSummary {
        &self.summary
    }

    fn refresh_summary(&mut self) {
        self.summary = aggregate::aggregate(&self.entries, self.settings.capital);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn journal() -> Journal {
        // risk_per_trade = 1000, investment_per_trade = 5000
        Journal::new(RiskSettings::new(100_000.0, 1.0, 20))
    }

    #[test]
    fn test_add_from_screener_floors_price_and_derives() {
        let mut j = journal();
        let row = j.add_from_screener("INFY", 1520.75);
        assert_eq!(row.stock, "INFY");
        assert_eq!(row.cmp, Some(1520.0));
        // SLP/TGTP seeded from CMP.
        assert_eq!(row.slp, Some((1520.0f64 * 0.97).floor()));
        assert_eq!(row.tgtp, Some((1520.0f64 * 1.09).floor()));
    }

    #[test]
    fn test_edit_recomputes_row_and_summary() {
        let mut j = journal();
        j.add_row();
        j.apply(0, FieldEdit::Cmp(Some(100.0))).unwrap();
        j.apply(0, FieldEdit::Slp(Some(97.0))).unwrap();
        j.apply(0, FieldEdit::Tgtp(Some(109.0))).unwrap();
        j.apply(0, FieldEdit::Sb(Some(50))).unwrap();
        assert_eq!(j.row(0).unwrap().invested, 5000.0);
        assert_eq!(j.summary().invested_sum, 5000.0);

        j.apply(0, FieldEdit::Outcome(Some(Outcome::Profit))).unwrap();
        assert_eq!(j.row(0).unwrap().booked, Some(450.0));
        // Closed row leaves the at-risk sum and enters the P/L total.
        assert_eq!(j.summary().invested_sum, 0.0);
        assert_eq!(j.summary().monthly_pl_total, 450.0);
    }

    #[test]
    fn test_over_cap_quantity_resets_to_zero() {
        let mut j = journal();
        j.add_row();
        j.apply(0, FieldEdit::Cmp(Some(100.0))).unwrap();
        j.apply(0, FieldEdit::Slp(Some(95.0))).unwrap();
        let before = j.row(0).unwrap().clone();
        assert_eq!(before.stb, 50);

        let err = j.apply(0, FieldEdit::Sb(Some(51))).unwrap_err();
        match err {
            JournalError::QuantityExceedsCap { requested, cap } => {
                assert_eq!(requested, 51);
                assert_eq!(cap, 50);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        let after = j.row(0).unwrap();
        assert_eq!(after.sb, Some(0));
        // Raw fields other than SB are untouched.
        assert_eq!(after.cmp, before.cmp);
        assert_eq!(after.slp, before.slp);
        assert_eq!(after.tgtp, before.tgtp);
        assert_eq!(after.entry_date, before.entry_date);
    }

    #[test]
    fn test_quantity_at_cap_is_accepted() {
        let mut j = journal();
        j.add_row();
        j.apply(0, FieldEdit::Cmp(Some(100.0))).unwrap();
        j.apply(0, FieldEdit::Slp(Some(95.0))).unwrap();
        let row = j.apply(0, FieldEdit::Sb(Some(50))).unwrap();
        assert_eq!(row.sb, Some(50));
    }

    #[test]
    fn test_settings_update_rederives_all_rows() {
        let mut j = journal();
        j.add_from_screener("TCS", 100.0);
        assert_eq!(j.row(0).unwrap().stb_ipt, 50);

        // Halving diversification doubles the per-trade investment budget.
        j.update_settings(RiskSettings::new(100_000.0, 1.0, 10));
        assert_eq!(j.row(0).unwrap().stb_ipt, 100);
    }

    #[test]
    fn test_remove_out_of_range() {
        let mut j = journal();
        assert!(matches!(j.remove(0), Err(JournalError::RowIndex(0))));
    }

    #[test]
    fn test_save_row_merges_id_then_updates() {
        let db = Database::open_in_memory().unwrap();
        let mut j = journal();
        j.add_from_screener("INFY", 100.0);
        assert_eq!(j.row(0).unwrap().id, None);

        j.save_row(&db, 0).unwrap();
        let id = j.row(0).unwrap().id.expect("id merged after create");

        j.apply(0, FieldEdit::Remarks("swing setup".into())).unwrap();
        j.save_row(&db, 0).unwrap();
        // Second save updates in place rather than creating a new row.
        assert_eq!(j.row(0).unwrap().id, Some(id));
        assert_eq!(db.list_trades().unwrap().len(), 1);
        assert_eq!(db.get_trade(id).unwrap().remarks, "swing setup");
    }

    #[test]
    fn test_failed_remote_delete_aborts_local_removal() {
        let db = Database::open_in_memory().unwrap();
        let mut j = journal();
        j.add_from_screener("INFY", 100.0);
        // Pretend the row was persisted under an id the store doesn't have.
        j.load(vec![{
            let mut row = j.row(0).unwrap().clone();
            row.id = Some(4242);
            row
        }]);

        assert!(j.delete_row(&db, 0).is_err());
        // The local row survives a failed remote delete.
        assert_eq!(j.entries().len(), 1);
    }

    #[test]
    fn test_delete_row_unpersisted_is_local_only() {
        let db = Database::open_in_memory().unwrap();
        let mut j = journal();
        j.add_row();
        j.delete_row(&db, 0).unwrap();
        assert!(j.entries().is_empty());
    }

    #[test]
    fn test_load_rederives_persisted_rows() {
        let mut j = journal();
        let mut stale = TradeRow::blank();
        stale.id = Some(7);
        stale.cmp = Some(100.0);
        stale.slp = Some(95.0);
        stale.sb = Some(10);
        // Derived fields left at blank defaults, as if loaded from storage.
        j.load(vec![stale]);
        let row = j.row(0).unwrap();
        assert_eq!(row.id, Some(7));
        assert_eq!(row.sl, 5.0);
        assert_eq!(row.stb, 50);
        assert_eq!(row.invested, 1000.0);
    }
}
