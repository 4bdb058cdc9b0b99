//! Calendar stepping and bounded search over timestamp sequences
//!
//! Period aggregation walks backward through a series one calendar year or
//! N months at a time. The steppers here never fail on leap-year or
//! short-month inputs; they clamp to the nearest valid day instead.

use crate::core::{Error, Result};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

/// Step back one calendar year, keeping the month and day
///
/// Stepping over a leap day counts it as one day of a 366-day year, so
/// repeatedly stepping back from a fixed day never drifts. A Feb-29 input
/// whose target year is not a leap year clamps to Feb-28. The time of day
/// carries over unchanged.
pub fn step_back_one_year(datetime: NaiveDateTime) -> NaiveDateTime {
    let target_year = datetime.year() - 1;
    let date = NaiveDate::from_ymd_opt(target_year, datetime.month(), datetime.day())
        // Previous year lacks this date; assume a leap day and take the
        // day before within the same month.
        .or_else(|| NaiveDate::from_ymd_opt(target_year, datetime.month(), datetime.day() - 1))
        .unwrap_or_else(|| datetime.date() - Duration::days(365));
    date.and_time(datetime.time())
}

/// Step back `month_ct` numerical months, keeping the day of month
///
/// Stepping over a 28-day month counts the same as stepping over a 31-day
/// month. When the target month has fewer days than the source day, the
/// day clamps to the last valid day of the target month; one month back
/// from 31-March is 28-February (29 in leap years). The time of day
/// carries over unchanged.
pub fn step_back_months(datetime: NaiveDateTime, month_ct: u32) -> NaiveDateTime {
    let mut target_year = datetime.year();
    let mut target_month = datetime.month() as i32 - month_ct as i32;
    while target_month < 1 {
        target_month += 12;
        target_year -= 1;
    }

    let mut target_day = datetime.day();
    let date = loop {
        if let Some(date) = NaiveDate::from_ymd_opt(target_year, target_month as u32, target_day) {
            break date;
        }
        // Target month does not have this day; walk down to its last day.
        target_day -= 1;
    };
    date.and_time(datetime.time())
}

/// Find the latest entry in `timestamps` that falls strictly before `cut`
///
/// Bisection over `[start_idx, block_idx)`; `timestamps` must be monotone
/// non-decreasing within that range. Comparison walks year, month, and day
/// before falling back to the sub-day delta, matching how calendar-period
/// boundaries are defined on whole days.
///
/// If `cut` precedes every timestamp in range, the closest permitted index
/// (`start_idx`) is returned; this degenerate lower bound is a documented
/// outcome, not an error.
pub fn find_latest_before(
    timestamps: &[NaiveDateTime],
    cut: NaiveDateTime,
    start_idx: usize,
    block_idx: usize,
) -> Result<usize> {
    if block_idx > timestamps.len() {
        return Err(Error::InvalidInput(format!(
            "search block end {} exceeds timestamp count {}",
            block_idx,
            timestamps.len()
        )));
    }
    if start_idx >= block_idx {
        return Err(Error::InvalidInput(format!(
            "empty search range [{}, {})",
            start_idx, block_idx
        )));
    }

    let cut_year = cut.year();
    let cut_month = cut.month();
    let cut_day = cut.day();

    // First candidate is the last index in range, because the caller needs
    // to know whether even that one falls before the cut.
    let mut before_idx = start_idx;
    let mut after_or_on_idx = block_idx - 1;
    let mut test_idx = after_or_on_idx;
    loop {
        let t_test = timestamps[test_idx];

        let test_year = t_test.year();
        if test_year < cut_year {
            before_idx = test_idx;
        } else if test_year > cut_year {
            after_or_on_idx = test_idx;
        } else {
            let test_month = t_test.month();
            if test_month < cut_month {
                before_idx = test_idx;
            } else if test_month > cut_month {
                after_or_on_idx = test_idx;
            } else {
                let test_day = t_test.day();
                if test_day < cut_day {
                    before_idx = test_idx;
                } else if test_day > cut_day {
                    after_or_on_idx = test_idx;
                } else {
                    // Same calendar day; decide on the time of day.
                    if cut.signed_duration_since(t_test) > Duration::zero() {
                        before_idx = test_idx;
                    } else {
                        after_or_on_idx = test_idx;
                    }
                }
            }
        }

        if after_or_on_idx - before_idx <= 1 {
            break;
        }
        test_idx = (before_idx + after_or_on_idx) / 2;
    }

    Ok(before_idx)
}
