//! Selector-based cleaning of sample series
//!
//! A [`Selector`] accepts or rejects elements of a fixed-length sequence.
//! Applying a selector never reorders elements, it only removes the
//! rejected ones, so one selector built from a value vector can filter any
//! parallel vector of the same length (timestamps, temperatures).

use crate::core::{Error, Result, Series};

/// Boolean mask marking which elements of a sequence are retained
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    mask: Vec<bool>,
}

impl Selector {
    /// Build a selector that rejects NaN and infinite entries
    pub fn finite(values: &[f64]) -> Self {
        Self {
            mask: values.iter().map(|value| value.is_finite()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.mask.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mask.is_empty()
    }

    /// Number of entries this selector rejects
    pub fn reject_count(&self) -> usize {
        self.mask.iter().filter(|&&keep| !keep).count()
    }

    /// Narrow to the elements accepted by both selectors
    pub fn and(&self, other: &Selector) -> Result<Selector> {
        if self.mask.len() != other.mask.len() {
            return Err(Error::InvalidInput(format!(
                "selector length {} does not match {}",
                self.mask.len(),
                other.mask.len()
            )));
        }
        Ok(Selector {
            mask: self
                .mask
                .iter()
                .zip(&other.mask)
                .map(|(&a, &b)| a && b)
                .collect(),
        })
    }

    /// Pull out just the accepted elements of `values`, preserving order
    pub fn apply<T: Clone>(&self, values: &[T]) -> Result<Vec<T>> {
        if values.len() != self.mask.len() {
            return Err(Error::InvalidInput(format!(
                "selector length {} does not match value count {}",
                self.mask.len(),
                values.len()
            )));
        }
        Ok(values
            .iter()
            .zip(&self.mask)
            .filter(|(_, &keep)| keep)
            .map(|(value, _)| value.clone())
            .collect())
    }
}

/// Remove samples whose value is NaN or infinite
///
/// A series with no invalid samples comes back unchanged. An empty series
/// is invalid input.
pub fn clean(series: &Series) -> Result<Series> {
    if series.is_empty() {
        return Err(Error::InvalidInput("series is empty".to_string()));
    }
    let selector = Selector::finite(series.values());
    if selector.reject_count() == 0 {
        return Ok(series.clone());
    }
    let timestamps = selector.apply(series.timestamps())?;
    let values = selector.apply(series.values())?;
    Series::new(timestamps, values)
}

/// Replace short runs of invalid entries by linear interpolation
///
/// Runs of up to `run_ct_max` consecutive non-finite entries are filled on
/// a line between the bracketing good entries; spacing is by index unless
/// `times` supplies sample times. Runs touching either array boundary are
/// filled by replicating the nearest good entry. Longer runs, and an array
/// with no good entries at all, are left untouched.
///
/// Always returns a new vector; the input is never mutated.
pub fn interpolate_bad_entries(
    values: &[f64],
    run_ct_max: usize,
    times: Option<&[f64]>,
) -> Result<Vec<f64>> {
    let val_ct = values.len();
    if let Some(times) = times {
        if times.len() != val_ct {
            return Err(Error::InvalidInput(format!(
                "time count {} does not match value count {}",
                times.len(),
                val_ct
            )));
        }
    }

    let mut cleaned = values.to_vec();
    let mut check_idx = 0;
    loop {
        // Skip ahead to the next bad entry.
        while check_idx < val_ct && cleaned[check_idx].is_finite() {
            check_idx += 1;
        }
        if check_idx >= val_ct {
            break;
        }

        // Measure the run of consecutive bad entries starting here.
        let first_bad_idx = check_idx;
        while check_idx < val_ct && !cleaned[check_idx].is_finite() {
            check_idx += 1;
        }
        let run_ct = check_idx - first_bad_idx;

        if run_ct <= run_ct_max {
            if first_bad_idx == 0 && check_idx < val_ct {
                let fill = cleaned[check_idx];
                cleaned[first_bad_idx..check_idx].fill(fill);
            } else if first_bad_idx > 0 && check_idx >= val_ct {
                let fill = cleaned[first_bad_idx - 1];
                cleaned[first_bad_idx..check_idx].fill(fill);
            } else if first_bad_idx > 0 && check_idx < val_ct {
                let good_idx_left = first_bad_idx - 1;
                match times {
                    None => replace_linear_equispaced(&mut cleaned, good_idx_left, check_idx),
                    Some(times) => {
                        replace_linear_times(&mut cleaned, good_idx_left, check_idx, times)
                    }
                }
            }
            // Remaining case is an entirely bad array; nothing to fill from.
        }

        check_idx += 1;
    }

    Ok(cleaned)
}

/// Fill short gaps in a series, leaving timestamps untouched
///
/// With `use_times` set, interpolation weights use elapsed hours between
/// timestamps; otherwise samples are treated as evenly spaced.
pub fn fill_gaps(series: &Series, run_ct_max: usize, use_times: bool) -> Result<Series> {
    if series.is_empty() {
        return Err(Error::InvalidInput("series is empty".to_string()));
    }
    let filled = if use_times {
        let first = series.timestamps()[0];
        let hours: Vec<f64> = series
            .timestamps()
            .iter()
            .map(|t| t.signed_duration_since(first).num_seconds() as f64 / 3600.0)
            .collect();
        interpolate_bad_entries(series.values(), run_ct_max, Some(&hours))?
    } else {
        interpolate_bad_entries(series.values(), run_ct_max, None)?
    };
    Series::new(series.timestamps().to_vec(), filled)
}

/// Fill `values[good_left+1..good_right]` on a line between the good
/// entries at `good_left` and `good_right`, assuming even index spacing.
fn replace_linear_equispaced(values: &mut [f64], good_left: usize, good_right: usize) {
    let start = values[good_left];
    let step = (values[good_right] - start) / (good_right - good_left) as f64;
    for idx in good_left + 1..good_right {
        values[idx] = start + step * (idx - good_left) as f64;
    }
}

/// Fill `values[good_left+1..good_right]` on a line between the good
/// entries at `good_left` and `good_right`, spaced according to `times`.
fn replace_linear_times(values: &mut [f64], good_left: usize, good_right: usize, times: &[f64]) {
    let start_val = values[good_left];
    let start_time = times[good_left];
    let slope = (values[good_right] - start_val) / (times[good_right] - start_time);
    for idx in good_left + 1..good_right {
        values[idx] = start_val + slope * (times[idx] - start_time);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn ts(hour: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 6, 1)
            .unwrap()
            .and_hms_opt(hour, min, 0)
            .unwrap()
    }

    #[test]
    fn test_clean_is_identity_for_valid_series() {
        let series = Series::new(vec![ts(0, 0), ts(1, 0), ts(2, 0)], vec![1.0, 2.0, 3.0]).unwrap();
        let cleaned = clean(&series).unwrap();
        assert_eq!(cleaned.timestamps(), series.timestamps());
        assert_eq!(cleaned.values(), series.values());
    }

    #[test]
    fn test_clean_drops_nan_and_infinite() {
        let series = Series::new(
            vec![ts(0, 0), ts(1, 0), ts(2, 0), ts(3, 0)],
            vec![1.0, f64::NAN, f64::INFINITY, 4.0],
        )
        .unwrap();
        let cleaned = clean(&series).unwrap();
        assert_eq!(cleaned.values(), &[1.0, 4.0]);
        assert_eq!(cleaned.timestamps(), &[ts(0, 0), ts(3, 0)]);
    }

    #[test]
    fn test_clean_rejects_empty_series() {
        let series = Series::new(vec![], vec![]).unwrap();
        assert!(clean(&series).is_err());
    }

    #[test]
    fn test_selector_and_narrows() {
        let a = Selector::finite(&[1.0, f64::NAN, 3.0, 4.0]);
        let b = Selector::finite(&[1.0, 2.0, f64::NAN, 4.0]);
        let narrow = a.and(&b).unwrap();
        assert_eq!(narrow.reject_count(), 2);
        assert_eq!(narrow.apply(&[10, 20, 30, 40]).unwrap(), vec![10, 40]);
    }

    #[test]
    fn test_selector_length_mismatch() {
        let selector = Selector::finite(&[1.0, 2.0]);
        assert!(selector.apply(&[1.0]).is_err());
    }

    #[test]
    fn test_interpolate_single_gap_is_midpoint() {
        let filled = interpolate_bad_entries(&[1.0, f64::NAN, 3.0], 1, None).unwrap();
        assert_eq!(filled, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_interpolate_time_weighted_gap() {
        // Gap sits a quarter of the way through the bracketing interval.
        let times = [0.0, 1.0, 4.0];
        let filled = interpolate_bad_entries(&[0.0, f64::NAN, 8.0], 1, Some(&times)).unwrap();
        assert_eq!(filled, vec![0.0, 2.0, 8.0]);
    }

    #[test]
    fn test_interpolate_leaves_long_runs() {
        let values = [1.0, f64::NAN, f64::NAN, f64::NAN, 5.0];
        let filled = interpolate_bad_entries(&values, 2, None).unwrap();
        assert!(filled[1].is_nan());
        assert!(filled[2].is_nan());
        assert!(filled[3].is_nan());
    }

    #[test]
    fn test_interpolate_fills_run_within_limit() {
        let values = [1.0, f64::NAN, f64::NAN, 4.0];
        let filled = interpolate_bad_entries(&values, 2, None).unwrap();
        assert_eq!(filled, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_interpolate_replicates_at_boundaries() {
        let filled = interpolate_bad_entries(&[f64::NAN, 2.0, f64::NAN], 1, None).unwrap();
        assert_eq!(filled, vec![2.0, 2.0, 2.0]);
    }

    #[test]
    fn test_interpolate_all_bad_left_untouched() {
        let filled = interpolate_bad_entries(&[f64::NAN, f64::NAN], 5, None).unwrap();
        assert!(filled[0].is_nan());
        assert!(filled[1].is_nan());
    }

    #[test]
    fn test_fill_gaps_time_weighted() {
        // Sample spacing 15 then 45 minutes; linear in time, not in index.
        let series = Series::new(
            vec![ts(0, 0), ts(0, 15), ts(1, 0)],
            vec![0.0, f64::NAN, 4.0],
        )
        .unwrap();
        let filled = fill_gaps(&series, 1, true).unwrap();
        assert!((filled.values()[1] - 1.0).abs() < 1e-12);
    }
}
