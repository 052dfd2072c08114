//! The row derivation pipeline. Order matters: SLP/TGTP seeding feeds the
//! SL/TGT distances, which feed the share budgets, which feed the SB seed,
//! which in turn drives the entry-date seed.

use chrono::{Local, NaiveDateTime};

use crate::engine::{round2, tenure};
use crate::models::{Outcome, TradeBudgets, TradeRow};

/// Stop-loss seed: 3% below CMP, floored to an integer price.
const SLP_SEED_FACTOR: f64 = 0.97;
/// Target seed: 9% above CMP, floored to an integer price.
const TGTP_SEED_FACTOR: f64 = 1.09;

/// Recompute every derived field of a row against the given budgets, using
/// the current wall clock for date seeding and open-position tenure.
pub fn derive(row: &TradeRow, budgets: &TradeBudgets) -> TradeRow {
    derive_at(row, budgets, Local::now().naive_local())
}

/// Same as [`derive`] with an injected "now", so results are deterministic.
/// Pure: the input row is never mutated, all divide-by-zero paths fall back
/// to a zero/absent sentinel, and re-deriving an already-derived row with
/// unchanged raw fields is a no-op.
pub fn derive_at(row: &TradeRow, budgets: &TradeBudgets, now: NaiveDateTime) -> TradeRow {
    let mut out = row.clone();
    let today = now.date();

    // 1. Coerce: an absent field counts as 0 for the arithmetic below.
    let cmp = row.cmp.unwrap_or(0.0);
    let mut slp = row.slp.unwrap_or(0.0);
    let mut tgtp = row.tgtp.unwrap_or(0.0);

    // 2. Seed SLP/TGTP when CMP is set but they are still blank. An explicit
    //    value, even 0, is never overwritten.
    if cmp > 0.0 {
        if row.slp.is_none() {
            slp = (cmp * SLP_SEED_FACTOR).floor();
            out.slp = Some(slp);
        }
        if row.tgtp.is_none() {
            tgtp = (cmp * TGTP_SEED_FACTOR).floor();
            out.tgtp = Some(tgtp);
        }
    }

    // 3. Price distances, signed and unclamped.
    let sl = cmp - slp;
    let tgt = tgtp - cmp;

    // 4./5. Share caps under the risk and investment budgets; the binding
    //       cap is the smaller of the two when both are positive.
    let stb_sl = if sl != 0.0 {
        (budgets.risk_per_trade / sl).floor() as i64
    } else {
        0
    };
    let stb_ipt = if cmp != 0.0 {
        (budgets.investment_per_trade / cmp).floor() as i64
    } else {
        0
    };
    let stb = if stb_sl > 0 && stb_ipt > 0 {
        stb_sl.min(stb_ipt)
    } else if stb_sl > 0 {
        stb_sl
    } else if stb_ipt > 0 {
        stb_ipt
    } else {
        0
    };

    // 6. Seed SB from the cap while SB is blank.
    if row.sb.is_none() && stb > 0 {
        out.sb = Some(stb);
    }
    let sb = out.sb.unwrap_or(0);

    // 7./8. Date seeding, once: entry when shares first appear, exit when an
    //       outcome is first chosen. Never overwritten afterwards.
    if sb > 0 && row.entry_date.is_none() {
        out.entry_date = Some(today);
    }
    if row.pl.is_some() && row.exit_date.is_none() {
        out.exit_date = Some(today);
    }

    // 9. Committed capital, outcome or not.
    let invested = cmp * sb as f64;

    // 10. Realized P/L only once an outcome is chosen.
    let booked = match row.pl {
        Some(Outcome::Profit) => Some(round2((cmp + tgt) * sb as f64 - invested)),
        Some(Outcome::Loss) => Some(round2((cmp - sl) * sb as f64 - invested)),
        None => None,
    };

    // 11. Risk multiple, Profit outcomes only.
    let rr = match (row.pl, booked) {
        (Some(Outcome::Profit), Some(booked)) if sl != 0.0 && sb != 0 => {
            Some(round2(booked / sb as f64 / sl))
        }
        _ => None,
    };

    // 12. Percent P/L on the invested base.
    let percent_pl = match booked {
        Some(booked) if invested != 0.0 => Some(round2(booked / invested * 100.0)),
        _ => None,
    };

    out.sl = round2(sl);
    out.tgt = round2(tgt);
    out.stb_sl = stb_sl;
    out.stb_ipt = stb_ipt;
    out.stb = stb;
    out.invested = invested;
    out.booked = booked;
    out.rr = rr;
    out.percent_pl = percent_pl;
    out.tenure = tenure::tenure_between(out.entry_date, out.exit_date, now);
    out
}
