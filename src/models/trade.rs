use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::engine::dates;
use crate::error::JournalError;

/// Yes/No confirmation tag used for the RSI and volume columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confirmation {
    Yes,
    No,
}

impl Confirmation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confirmation::Yes => "Yes",
            Confirmation::No => "No",
        }
    }
}

impl FromStr for Confirmation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Yes" => Ok(Confirmation::Yes),
            "No" => Ok(Confirmation::No),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for Confirmation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Candle pattern dropdown values from the trade entry table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CandlePattern {
    Mazibozu,
    Bullish,
    Hammer,
    Engulf,
    Pin,
    Tweezer,
    Doji,
    Bearish,
}

impl CandlePattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            CandlePattern::Mazibozu => "Mazibozu",
            CandlePattern::Bullish => "Bullish",
            CandlePattern::Hammer => "Hammer",
            CandlePattern::Engulf => "Engulf",
            CandlePattern::Pin => "Pin",
            CandlePattern::Tweezer => "Tweezer",
            CandlePattern::Doji => "Doji",
            CandlePattern::Bearish => "Bearish",
        }
    }
}

impl FromStr for CandlePattern {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Mazibozu" => Ok(CandlePattern::Mazibozu),
            "Bullish" => Ok(CandlePattern::Bullish),
            "Hammer" => Ok(CandlePattern::Hammer),
            "Engulf" => Ok(CandlePattern::Engulf),
            "Pin" => Ok(CandlePattern::Pin),
            "Tweezer" => Ok(CandlePattern::Tweezer),
            "Doji" => Ok(CandlePattern::Doji),
            "Bearish" => Ok(CandlePattern::Bearish),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for CandlePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Realized outcome of a trade. Unset means the position is still open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Profit,
    Loss,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Profit => "Profit",
            Outcome::Loss => "Loss",
        }
    }
}

impl FromStr for Outcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Profit" => Ok(Outcome::Profit),
            "Loss" => Ok(Outcome::Loss),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One tracked trade idea. Raw fields are user-authoritative; derived fields
/// are recomputed by the engine on every edit and never entered by hand
/// (SLP/TGTP/SB/dates act as auto-fill seeds the first time around).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRow {
    /// Database id; absent until the row has been persisted.
    pub id: Option<i64>,
    pub stock: String,
    pub cmp: Option<f64>,
    pub slp: Option<f64>,
    pub tgtp: Option<f64>,
    pub sb: Option<i64>,
    pub rsi: Option<Confirmation>,
    pub candle: Option<CandlePattern>,
    pub volume: Option<Confirmation>,
    pub pl: Option<Outcome>,
    pub entry_date: Option<NaiveDate>,
    pub exit_date: Option<NaiveDate>,
    pub remarks: String,

    // Derived fields
    pub sl: f64,
    pub tgt: f64,
    pub stb_sl: i64,
    pub stb_ipt: i64,
    pub stb: i64,
    pub invested: f64,
    pub booked: Option<f64>,
    pub rr: Option<f64>,
    pub percent_pl: Option<f64>,
    pub tenure: Option<i64>,
}

impl TradeRow {
    /// A fresh row with every field blank, ready for the derivation pipeline.
    pub fn blank() -> Self {
        TradeRow {
            id: None,
            stock: String::new(),
            cmp: None,
            slp: None,
            tgtp: None,
            sb: None,
            rsi: None,
            candle: None,
            volume: None,
            pl: None,
            entry_date: None,
            exit_date: None,
            remarks: String::new(),
            sl: 0.0,
            tgt: 0.0,
            stb_sl: 0,
            stb_ipt: 0,
            stb: 0,
            invested: 0.0,
            booked: None,
            rr: None,
            percent_pl: None,
            tenure: None,
        }
    }

    /// Whether the position is still open (no Profit/Loss outcome chosen).
    pub fn is_open(&self) -> bool {
        self.pl.is_none()
    }
}

impl Default for TradeRow {
    fn default() -> Self {
        TradeRow::blank()
    }
}

/// Free-form strings as they arrive from a form submission. Converting to a
/// `TradeRow` applies the coercion rules: blank numeric fields become absent,
/// garbage numeric input silently coerces to 0 (but still counts as present,
/// so it suppresses auto-seeding), and unknown categorical tags are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TradeRowInput {
    pub stock: String,
    pub cmp: String,
    pub slp: String,
    pub tgtp: String,
    pub sb: String,
    pub rsi: String,
    pub candle: String,
    pub volume: String,
    pub pl: String,
    pub entry_date: String,
    pub exit_date: String,
    pub remarks: String,
}

impl TradeRowInput {
    pub fn into_row(self) -> Result<TradeRow, JournalError> {
        let mut row = TradeRow::blank();
        row.stock = self.stock.trim().to_string();
        row.cmp = coerce_price(&self.cmp);
        row.slp = coerce_price(&self.slp);
        row.tgtp = coerce_price(&self.tgtp);
        row.sb = coerce_quantity(&self.sb);
        row.rsi = parse_tag("rsi", &self.rsi)?;
        row.candle = parse_tag("candle", &self.candle)?;
        row.volume = parse_tag("volume", &self.volume)?;
        row.pl = parse_tag("pl", &self.pl)?;
        row.entry_date = dates::parse_date(&self.entry_date);
        row.exit_date = dates::parse_date(&self.exit_date);
        row.remarks = self.remarks;
        Ok(row)
    }
}

/// Blank input is absent; anything else is a number, with unparsable text
/// coerced to 0 rather than raised as an error.
fn coerce_price(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.parse::<f64>().unwrap_or(0.0))
}

fn coerce_quantity(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(
        trimmed
            .parse::<i64>()
            .unwrap_or_else(|_| trimmed.parse::<f64>().map(|v| v as i64).unwrap_or(0)),
    )
}

fn parse_tag<T: FromStr<Err = String>>(
    field: &'static str,
    raw: &str,
) -> Result<Option<T>, JournalError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<T>()
        .map(Some)
        .map_err(|value| JournalError::InvalidTag { field, value })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input_with(f: impl FnOnce(&mut TradeRowInput)) -> TradeRowInput {
        let mut input = TradeRowInput::default();
        f(&mut input);
        input
    }

    #[test]
    fn test_blank_numeric_fields_are_absent() {
        let row = input_with(|i| i.stock = "INFY".into()).into_row().unwrap();
        assert_eq!(row.cmp, None);
        assert_eq!(row.slp, None);
        assert_eq!(row.sb, None);
    }

    #[test]
    fn test_garbage_numeric_input_coerces_to_zero_but_stays_present() {
        let row = input_with(|i| {
            i.cmp = "100".into();
            i.slp = "abc".into();
        })
        .into_row()
        .unwrap();
        // Present-but-zero: the stop loss was "entered", so auto-seeding
        // must not overwrite it later.
        assert_eq!(row.slp, Some(0.0));
    }

    #[test]
    fn test_valid_tags_parse() {
        let row = input_with(|i| {
            i.rsi = "Yes".into();
            i.candle = "Hammer".into();
            i.pl = "Profit".into();
        })
        .into_row()
        .unwrap();
        assert_eq!(row.rsi, Some(Confirmation::Yes));
        assert_eq!(row.candle, Some(CandlePattern::Hammer));
        assert_eq!(row.pl, Some(Outcome::Profit));
    }

    #[test]
    fn test_unknown_tag_is_rejected() {
        let err = input_with(|i| i.candle = "Shooting Star".into())
            .into_row()
            .unwrap_err();
        match err {
            JournalError::InvalidTag { field, value } => {
                assert_eq!(field, "candle");
                assert_eq!(value, "Shooting Star");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_fractional_quantity_truncates() {
        let row = input_with(|i| i.sb = "12.9".into()).into_row().unwrap();
        assert_eq!(row.sb, Some(12));
    }

    #[test]
    fn test_dates_parse_through_normalizer() {
        let row = input_with(|i| {
            i.entry_date = "2025-06-01".into();
            i.exit_date = "2025-06-15T09:30:00".into();
        })
        .into_row()
        .unwrap();
        assert_eq!(row.entry_date, NaiveDate::from_ymd_opt(2025, 6, 1));
        assert_eq!(row.exit_date, NaiveDate::from_ymd_opt(2025, 6, 15));
    }
}
