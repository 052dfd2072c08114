use chrono::{NaiveDate, NaiveDateTime};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Days a position has been (or was) held.
///
/// With no entry date there is no tenure. With only an entry date the count
/// is open-ended against `now` and must be recomputed at read time, rounding
/// any partial day up. With both dates it is the fixed calendar-day
/// difference, so a same-day entry/exit yields 0.
pub fn tenure_between(
    entry: Option<NaiveDate>,
    exit: Option<NaiveDate>,
    now: NaiveDateTime,
) -> Option<i64> {
    let entry = entry?;
    let start = entry.and_hms_opt(0, 0, 0).unwrap();
    let end = match exit {
        Some(exit) => exit.and_hms_opt(0, 0, 0).unwrap(),
        None => now,
    };
    let seconds = (end - start).num_seconds();
    Some((seconds as f64 / SECONDS_PER_DAY).ceil() as i64)
}
