//! Numerical integration of sampled values over time
//!
//! Composite Simpson's rule over possibly non-uniform sample spacing. The
//! estimate is fourth-order in the spacing: compared to one-hour samples,
//! fifteen-minute samples cut the error by a factor of about 256.
//!
//! Only differences between time entries matter; shifting every time by a
//! constant leaves the result unchanged. Times must be monotone increasing
//! with no repeated entries.

use crate::core::{Error, Result};

/// Integrate `values` against `times` using composite Simpson's rule
///
/// Simpson's rule consumes intervals in pairs. With an even sample count
/// one interval is left over; the result is then the average of closing
/// the first or the last interval with a trapezoid, Simpson's rule
/// covering the rest. Exactly two points integrate as a single trapezoid.
///
/// NaN entries in `values`, or fewer than 2 points, are invalid input:
/// callers clean their data first.
pub fn simpsons(values: &[f64], times: &[f64]) -> Result<f64> {
    check_values(values)?;
    if times.len() != values.len() {
        return Err(Error::InvalidInput(format!(
            "time count {} does not match value count {}",
            times.len(),
            values.len()
        )));
    }
    Ok(integrate_checked(values, times))
}

/// Equispaced variant of [`simpsons`]: samples lie `interval` apart
pub fn simpsons_equispaced(values: &[f64], interval: f64) -> Result<f64> {
    check_values(values)?;
    if !(interval > 0.0) {
        return Err(Error::InvalidInput(format!(
            "interval must be positive, got {}",
            interval
        )));
    }
    let times: Vec<f64> = (0..values.len()).map(|idx| idx as f64 * interval).collect();
    Ok(integrate_checked(values, &times))
}

fn check_values(values: &[f64]) -> Result<()> {
    if values.len() < 2 {
        return Err(Error::InvalidInput(format!(
            "integration needs at least 2 points, got {}",
            values.len()
        )));
    }
    if values.iter().any(|value| value.is_nan()) {
        return Err(Error::InvalidInput(
            "NaN value in integration block".to_string(),
        ));
    }
    Ok(())
}

fn integrate_checked(values: &[f64], times: &[f64]) -> f64 {
    let val_ct = values.len();
    if val_ct == 2 {
        return trapezoid(values, times, 0);
    }

    let interval_ct = val_ct - 1;
    if interval_ct % 2 == 0 {
        basic_simpson(values, times, 0, val_ct)
    } else {
        // Odd interval count: average the two trapezoid closures.
        let close_first = trapezoid(values, times, 0) + basic_simpson(values, times, 1, val_ct);
        let close_last =
            basic_simpson(values, times, 0, val_ct - 1) + trapezoid(values, times, val_ct - 2);
        0.5 * (close_first + close_last)
    }
}

/// Composite Simpson over `[start_idx, block_idx)`; the sub-block must
/// contain an even number of intervals.
fn basic_simpson(values: &[f64], times: &[f64], start_idx: usize, block_idx: usize) -> f64 {
    let mut total = 0.0;
    let mut idx = start_idx;
    while idx + 2 < block_idx {
        let h0 = times[idx + 1] - times[idx];
        let h1 = times[idx + 2] - times[idx + 1];
        let hsum = h0 + h1;
        total += hsum / 6.0
            * (values[idx] * (2.0 - h1 / h0)
                + values[idx + 1] * hsum * hsum / (h0 * h1)
                + values[idx + 2] * (2.0 - h0 / h1));
        idx += 2;
    }
    total
}

fn trapezoid(values: &[f64], times: &[f64], idx: usize) -> f64 {
    0.5 * (values[idx] + values[idx + 1]) * (times[idx + 1] - times[idx])
}
