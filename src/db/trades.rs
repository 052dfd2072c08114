use chrono::{NaiveDate, Utc};
use rusqlite::params;

use crate::db::Database;
use crate::error::JournalError;
use crate::models::TradeRow;

const TRADE_COLUMNS: &str = "id, stock, cmp, slp, tgtp, sb, rsi, candle, volume, pl, \
     entry_date, exit_date, remarks, sl, tgt, stb_sl, stb_ipt, stb, invested, \
     booked, rr, percent_pl, tenure";

/// Tags and dates are stored as text; values that no longer parse read back
/// as absent.
fn parse_tag<T: std::str::FromStr>(s: Option<String>) -> Option<T> {
    s.and_then(|s| s.parse().ok())
}

fn parse_date(s: Option<String>) -> Option<NaiveDate> {
    s.and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok())
}

/// Map a database row to a TradeRow.
fn map_row_to_trade(row: &rusqlite::Row) -> rusqlite::Result<TradeRow> {
    Ok(TradeRow {
        id: row.get(0)?,
        stock: row.get(1)?,
        cmp: row.get(2)?,
        slp: row.get(3)?,
        tgtp: row.get(4)?,
        sb: row.get(5)?,
        rsi: parse_tag(row.get(6)?),
        candle: parse_tag(row.get(7)?),
        volume: parse_tag(row.get(8)?),
        pl: parse_tag(row.get(9)?),
        entry_date: parse_date(row.get(10)?),
        exit_date: parse_date(row.get(11)?),
        remarks: row.get(12)?,
        sl: row.get(13)?,
        tgt: row.get(14)?,
        stb_sl: row.get(15)?,
        stb_ipt: row.get(16)?,
        stb: row.get(17)?,
        invested: row.get(18)?,
        booked: row.get(19)?,
        rr: row.get(20)?,
        percent_pl: row.get(21)?,
        tenure: row.get(22)?,
    })
}

fn date_text(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format("%Y-%m-%d").to_string())
}

impl Database {
    /// Insert a new row and return its assigned id.
    pub fn insert_trade(&self, trade: &TradeRow) -> Result<i64, JournalError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| JournalError::Database(e.to_string()))?;
        let now = Utc::now().timestamp();

        conn.execute(
            "INSERT INTO trades (
                stock, cmp, slp, tgtp, sb, rsi, candle, volume, pl,
                entry_date, exit_date, remarks, sl, tgt, stb_sl, stb_ipt, stb,
                invested, booked, rr, percent_pl, tenure, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                trade.stock,
                trade.cmp,
                trade.slp,
                trade.tgtp,
                trade.sb,
                trade.rsi.map(|t| t.as_str()),
                trade.candle.map(|t| t.as_str()),
                trade.volume.map(|t| t.as_str()),
                trade.pl.map(|t| t.as_str()),
                date_text(trade.entry_date),
                date_text(trade.exit_date),
                trade.remarks,
                trade.sl,
                trade.tgt,
                trade.stb_sl,
                trade.stb_ipt,
                trade.stb,
                trade.invested,
                trade.booked,
                trade.rr,
                trade.percent_pl,
                trade.tenure,
                now,
                now
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Replace every column of an existing row.
    pub fn update_trade(&self, id: i64, trade: &TradeRow) -> Result<(), JournalError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| JournalError::Database(e.to_string()))?;
        let now = Utc::now().timestamp();

        let changed = conn.execute(
            "UPDATE trades SET
                stock = ?, cmp = ?, slp = ?, tgtp = ?, sb = ?, rsi = ?,
                candle = ?, volume = ?, pl = ?, entry_date = ?, exit_date = ?,
                remarks = ?, sl = ?, tgt = ?, stb_sl = ?, stb_ipt = ?, stb = ?,
                invested = ?, booked = ?, rr = ?, percent_pl = ?, tenure = ?,
                updated_at = ?
             WHERE id = ?",
            params![
                trade.stock,
                trade.cmp,
                trade.slp,
                trade.tgtp,
                trade.sb,
                trade.rsi.map(|t| t.as_str()),
                trade.candle.map(|t| t.as_str()),
                trade.volume.map(|t| t.as_str()),
                trade.pl.map(|t| t.as_str()),
                date_text(trade.entry_date),
                date_text(trade.exit_date),
                trade.remarks,
                trade.sl,
                trade.tgt,
                trade.stb_sl,
                trade.stb_ipt,
                trade.stb,
                trade.invested,
                trade.booked,
                trade.rr,
                trade.percent_pl,
                trade.tenure,
                now,
                id
            ],
        )?;

        if changed == 0 {
            return Err(JournalError::Database(format!("No trade with id {id}")));
        }
        Ok(())
    }

    pub fn get_trade(&self, id: i64) -> Result<TradeRow, JournalError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| JournalError::Database(e.to_string()))?;
        let trade = conn.query_row(
            &format!("SELECT {TRADE_COLUMNS} FROM trades WHERE id = ?"),
            [id],
            map_row_to_trade,
        )?;
        Ok(trade)
    }

    /// All rows, newest first.
    pub fn list_trades(&self) -> Result<Vec<TradeRow>, JournalError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| JournalError::Database(e.to_string()))?;
        let mut stmt =
            conn.prepare(&format!("SELECT {TRADE_COLUMNS} FROM trades ORDER BY id DESC"))?;
        let rows = stmt.query_map([], map_row_to_trade)?;
        let trades: Result<Vec<TradeRow>, _> = rows.collect();
        Ok(trades?)
    }

    pub fn delete_trade(&self, id: i64) -> Result<(), JournalError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| JournalError::Database(e.to_string()))?;
        let changed = conn.execute("DELETE FROM trades WHERE id = ?", [id])?;
        if changed == 0 {
            return Err(JournalError::Database(format!("No trade with id {id}")));
        }
        Ok(())
    }

    pub fn delete_all_trades(&self) -> Result<usize, JournalError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| JournalError::Database(e.to_string()))?;
        let count = conn.execute("DELETE FROM trades", [])?;
        Ok(count)
    }
}
