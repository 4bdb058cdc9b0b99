//! NaN-masked statistics over load grids
//!
//! All statistics treat NaN cells as missing and exclude them from the
//! computation. Degenerate inputs follow a NaN-propagation policy: a lane
//! with no finite entries, or a ratio with a zero denominator (an all-equal
//! column, a zero 95th percentile), yields NaN rather than an error, and
//! NaN flows through any downstream average.

use crate::core::{Error, Grid, Result};
use serde::{Deserialize, Serialize};

/// Direction along which grid statistics are computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    /// One statistic per row
    Row,
    /// One statistic per column
    Column,
}

/// Per-row or per-column summary statistics of a grid
///
/// `peak95` is the 95th percentile of the data, not the maximum, and
/// `base5` the 5th percentile, not the minimum. Interpolation between
/// order statistics means the reported peak and base may not exist in the
/// data, especially for small lanes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsResult {
    pub mean: Vec<f64>,
    pub stdev: Vec<f64>,
    pub max: Vec<f64>,
    pub min: Vec<f64>,
    /// 95th percentile, reported as the peak load
    pub peak95: Vec<f64>,
    /// 5th percentile, reported as the base load
    pub base5: Vec<f64>,
    /// base5 / peak95; NaN when peak95 is zero
    pub bpratio: Vec<f64>,
    /// peak95 - base5
    pub range95_5: Vec<f64>,
}

/// Compute summary statistics for each row or column of a grid
pub fn grid_stats(grid: &Grid, axis: Axis) -> StatsResult {
    let lane_ct = match axis {
        Axis::Row => grid.rows(),
        Axis::Column => grid.cols(),
    };

    let mut result = StatsResult {
        mean: Vec::with_capacity(lane_ct),
        stdev: Vec::with_capacity(lane_ct),
        max: Vec::with_capacity(lane_ct),
        min: Vec::with_capacity(lane_ct),
        peak95: Vec::with_capacity(lane_ct),
        base5: Vec::with_capacity(lane_ct),
        bpratio: Vec::with_capacity(lane_ct),
        range95_5: Vec::with_capacity(lane_ct),
    };

    for lane_idx in 0..lane_ct {
        let lane = match axis {
            Axis::Row => grid.row(lane_idx).to_vec(),
            Axis::Column => grid.column(lane_idx),
        };
        let mut finite: Vec<f64> = lane.iter().copied().filter(|v| v.is_finite()).collect();
        finite.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let mean = mean_of(&finite);
        let peak95 = percentile_sorted(&finite, 95.0);
        let base5 = percentile_sorted(&finite, 5.0);

        result.mean.push(mean);
        result.stdev.push(stdev_population(&finite, mean));
        result.max.push(finite.last().copied().unwrap_or(f64::NAN));
        result.min.push(finite.first().copied().unwrap_or(f64::NAN));
        result.peak95.push(peak95);
        result.base5.push(base5);
        result.bpratio.push(if peak95 == 0.0 {
            f64::NAN
        } else {
            base5 / peak95
        });
        result.range95_5.push(peak95 - base5);
    }

    result
}

/// Average load variability of a grid
///
/// For each column, the sample standard deviation divided by the column
/// mean; the ratios are then averaged across columns. Fold loads one day
/// per row and one time-of-day slot per column to estimate how repeatable
/// a building's daily profile is.
pub fn variability(grid: &Grid) -> f64 {
    let col_ct = grid.cols();
    let mut ratio_sum = 0.0;
    for col in 0..col_ct {
        let lane = grid.column(col);
        let finite: Vec<f64> = lane.iter().copied().filter(|v| v.is_finite()).collect();
        let mean = mean_of(&finite);
        let stdev = stdev_sample(&finite, mean);
        ratio_sum += stdev / mean;
    }
    ratio_sum / col_ct as f64
}

/// Spearman rank correlation coefficient between two value arrays
///
/// Every pair where either entry is NaN is excluded before ranking: a
/// missing temperature observation should not penalize a good demand
/// measurement. Equal values receive their mean rank. If no valid pairs
/// remain, the coefficient is 0.
pub fn spearman_rank(x_values: &[f64], y_values: &[f64]) -> Result<f64> {
    check_paired(x_values, y_values)?;

    let (xs, ys) = valid_pairs(x_values, y_values);
    if xs.is_empty() {
        return Ok(0.0);
    }

    let x_ranks = rank_with_ties(&xs);
    let y_ranks = rank_with_ties(&ys);
    Ok(correlate(&x_ranks, &y_ranks))
}

/// Pearson correlation coefficient between two value arrays
///
/// NaN pairs are excluded as in [`spearman_rank`]. All-equal input makes
/// the denominator zero and yields NaN.
pub fn pearson(x_values: &[f64], y_values: &[f64]) -> Result<f64> {
    check_paired(x_values, y_values)?;

    let (xs, ys) = valid_pairs(x_values, y_values);
    if xs.is_empty() {
        return Ok(0.0);
    }
    Ok(correlate(&xs, &ys))
}

fn check_paired(x_values: &[f64], y_values: &[f64]) -> Result<()> {
    if x_values.len() != y_values.len() {
        return Err(Error::InvalidInput(format!(
            "value counts {} and {} do not match",
            x_values.len(),
            y_values.len()
        )));
    }
    if x_values.len() < 2 {
        return Err(Error::InvalidInput(format!(
            "correlation needs at least 2 pairs, got {}",
            x_values.len()
        )));
    }
    Ok(())
}

fn valid_pairs(x_values: &[f64], y_values: &[f64]) -> (Vec<f64>, Vec<f64>) {
    x_values
        .iter()
        .zip(y_values)
        .filter(|(x, y)| !x.is_nan() && !y.is_nan())
        .map(|(&x, &y)| (x, y))
        .unzip()
}

/// Ranks for Spearman correlation: smallest value gets rank 1, ties get
/// their mean rank. `values` must be NaN-free.
fn rank_with_ties(values: &[f64]) -> Vec<f64> {
    let val_ct = values.len();
    let mut order: Vec<usize> = (0..val_ct).collect();
    order.sort_by(|&a, &b| {
        values[a]
            .partial_cmp(&values[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut ranks = vec![0.0; val_ct];
    let mut run_start = 0;
    while run_start < val_ct {
        let mut run_stop = run_start + 1;
        while run_stop < val_ct && values[order[run_stop]] == values[order[run_start]] {
            run_stop += 1;
        }
        // Natural ranks run_start+1 ..= run_stop; every tie gets the mean.
        let mean_rank = 0.5 * (run_start + run_stop + 1) as f64;
        for sorted_idx in run_start..run_stop {
            ranks[order[sorted_idx]] = mean_rank;
        }
        run_start = run_stop;
    }
    ranks
}

fn correlate(xs: &[f64], ys: &[f64]) -> f64 {
    let x_mean = mean_of(xs);
    let y_mean = mean_of(ys);
    let mut xy = 0.0;
    let mut xx = 0.0;
    let mut yy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - x_mean;
        let dy = y - y_mean;
        xy += dx * dy;
        xx += dx * dx;
        yy += dy * dy;
    }
    xy / (xx * yy).sqrt()
}

fn mean_of(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn stdev_population(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

fn stdev_sample(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Percentile with linear interpolation between order statistics.
/// `sorted` must be ascending and NaN-free.
fn percentile_sorted(sorted: &[f64], percent: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let rank = percent / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let fraction = rank - lower as f64;
    if lower + 1 >= sorted.len() {
        return sorted[sorted.len() - 1];
    }
    sorted[lower] + fraction * (sorted[lower + 1] - sorted[lower])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nearly_same(x: f64, y: f64) -> bool {
        let diff = (x - y).abs();
        diff <= 1e-12 || diff <= 1e-6 * x.abs()
    }

    #[test]
    fn test_grid_stats_masks_nan_per_row() {
        let grid = Grid::from_rows(vec![
            vec![1.0, f64::NAN, 3.0],
            vec![4.0, 5.0, f64::NAN],
        ])
        .unwrap();
        let stats = grid_stats(&grid, Axis::Row);
        // Hand-computed masked averages.
        assert!(nearly_same(stats.mean[0], 2.0));
        assert!(nearly_same(stats.mean[1], 4.5));
        assert!(nearly_same(stats.stdev[0], 1.0));
        assert!(nearly_same(stats.stdev[1], 0.5));
        assert_eq!(stats.max[0], 3.0);
        assert_eq!(stats.min[1], 4.0);
    }

    #[test]
    fn test_grid_stats_column_axis() {
        let grid = Grid::from_rows(vec![vec![1.0, 10.0], vec![3.0, 30.0]]).unwrap();
        let stats = grid_stats(&grid, Axis::Column);
        assert!(nearly_same(stats.mean[0], 2.0));
        assert!(nearly_same(stats.mean[1], 20.0));
    }

    #[test]
    fn test_grid_stats_percentiles_interpolate() {
        let row: Vec<f64> = (1..=24).map(|v| v as f64).collect();
        let grid = Grid::from_rows(vec![row]).unwrap();
        let stats = grid_stats(&grid, Axis::Row);
        // rank = 0.95 * 23 = 21.85 -> 22 + 0.85
        assert!(nearly_same(stats.peak95[0], 22.85));
        // rank = 0.05 * 23 = 1.15 -> 2 + 0.15
        assert!(nearly_same(stats.base5[0], 2.15));
        assert!(nearly_same(stats.range95_5[0], 20.7));
        assert!(nearly_same(stats.bpratio[0], 2.15 / 22.85));
    }

    #[test]
    fn test_grid_stats_zero_peak_gives_nan_ratio() {
        let grid = Grid::from_rows(vec![vec![0.0, 0.0, 0.0]]).unwrap();
        let stats = grid_stats(&grid, Axis::Row);
        assert!(stats.bpratio[0].is_nan());
        assert_eq!(stats.range95_5[0], 0.0);
    }

    #[test]
    fn test_grid_stats_all_nan_lane() {
        let grid = Grid::from_rows(vec![vec![f64::NAN, f64::NAN]]).unwrap();
        let stats = grid_stats(&grid, Axis::Row);
        assert!(stats.mean[0].is_nan());
        assert!(stats.max[0].is_nan());
        assert!(stats.peak95[0].is_nan());
    }

    #[test]
    fn test_variability_hand_computed() {
        // Column 0: mean 2, sample stdev sqrt(2) -> ratio 0.70711.
        // Column 1: mean 2, sample stdev 0 -> ratio 0.
        let grid = Grid::from_rows(vec![vec![1.0, 2.0], vec![3.0, 2.0]]).unwrap();
        let value = variability(&grid);
        assert!(nearly_same(value, 0.5 * (2.0_f64.sqrt() / 2.0)));
    }

    #[test]
    fn test_spearman_perfect_inverse() {
        let coeff = spearman_rank(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]).unwrap();
        assert!(nearly_same(coeff, -1.0));
    }

    #[test]
    fn test_spearman_perfect_monotone_nonlinear() {
        // Rank correlation sees through the exponential.
        let x: [f64; 5] = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y: Vec<f64> = x.iter().map(|v| v.exp()).collect();
        let coeff = spearman_rank(&x, &y).unwrap();
        assert!(nearly_same(coeff, 1.0));
    }

    #[test]
    fn test_spearman_all_nan_returns_zero() {
        let coeff = spearman_rank(&[f64::NAN, f64::NAN], &[1.0, 2.0]).unwrap();
        assert_eq!(coeff, 0.0);
    }

    #[test]
    fn test_spearman_excludes_nan_pairs() {
        // The NaN pair carries the only disagreement; without it the
        // remaining pairs correlate perfectly.
        let x = [1.0, 2.0, f64::NAN, 4.0];
        let y = [10.0, 20.0, 5.0, 40.0];
        let coeff = spearman_rank(&x, &y).unwrap();
        assert!(nearly_same(coeff, 1.0));
    }

    #[test]
    fn test_spearman_ties_get_mean_rank() {
        let ranks = rank_with_ties(&[10.0, 20.0, 20.0, 30.0]);
        assert_eq!(ranks, vec![1.0, 2.5, 2.5, 4.0]);
    }

    #[test]
    fn test_spearman_length_mismatch() {
        assert!(spearman_rank(&[1.0, 2.0], &[1.0]).is_err());
        assert!(spearman_rank(&[1.0], &[1.0]).is_err());
    }

    #[test]
    fn test_pearson_linear_is_one() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [3.0, 5.0, 7.0, 9.0];
        assert!(nearly_same(pearson(&x, &y).unwrap(), 1.0));
    }

    #[test]
    fn test_pearson_all_equal_is_nan() {
        let coeff = pearson(&[2.0, 2.0, 2.0], &[1.0, 2.0, 3.0]).unwrap();
        assert!(coeff.is_nan());
    }
}
