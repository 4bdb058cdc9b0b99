//! Figure data for building load analysis
//!
//! These functions compute the numeric content of the standard analysis
//! figures and summaries; rendering (axes, colors, file output) belongs to
//! the caller. A request that cannot be satisfied from the available data
//! returns `None` or an empty payload rather than an error, so report
//! generation can skip that figure and move on.

pub mod ticklabels;

use crate::aggregate::PeriodAggregator;
use crate::core::{BuildingMetadata, Error, Grid, Result, Series};
use crate::stats::{self, Axis};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const SECONDS_PER_DAY: i64 = 86_400;

/// Daily summary statistics over a day-folded load grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    /// Unit of the underlying loads
    pub load_units: String,
    /// Unit of the floor-area-normalized intensities
    pub load_intensity_units: String,
    /// Highest load intensity across all days, W/sf
    pub overall_max_load_intensity: f64,
    /// Lowest load intensity across all days, W/sf
    pub overall_min_load_intensity: f64,
    /// Mean of the per-day 95th-percentile loads
    pub ave_daily_peak_load: f64,
    /// Mean of the per-day 5th-percentile loads
    pub ave_daily_base_load: f64,
    /// Mean of the per-day peak-to-base ranges
    pub ave_daily_load_range: f64,
    /// Mean of the per-day base-to-peak ratios
    pub ave_daily_bp_ratio: f64,
    /// Average repeatability of the daily profile
    pub load_variability: f64,
}

/// Summarize a day-folded load grid for reporting
///
/// `loads_by_day` holds one day per row. Loads must be measured in kW and
/// the floor area must be positive; anything else is invalid input.
pub fn daily_summary(loads_by_day: &Grid, metadata: &BuildingMetadata) -> Result<DailySummary> {
    if metadata.load_units != "kW" {
        return Err(Error::InvalidInput(format!(
            "power-derived summaries require kW loads, got {:?}",
            metadata.load_units
        )));
    }
    if !(metadata.floor_area_sf > 0.0) {
        return Err(Error::InvalidInput(format!(
            "floor area must be positive, got {}",
            metadata.floor_area_sf
        )));
    }

    let summary = stats::grid_stats(loads_by_day, Axis::Row);
    let load_variability = stats::variability(loads_by_day);

    // kW loads, intensities in W per square foot.
    let per_sf = 1e3 / metadata.floor_area_sf;
    Ok(DailySummary {
        load_units: metadata.load_units.clone(),
        load_intensity_units: "W/sf".to_string(),
        overall_max_load_intensity: nan_max(&summary.max) * per_sf,
        overall_min_load_intensity: nan_min(&summary.min) * per_sf,
        ave_daily_peak_load: nan_mean(&summary.peak95),
        ave_daily_base_load: nan_mean(&summary.base5),
        ave_daily_load_range: nan_mean(&summary.range95_5),
        ave_daily_bp_ratio: nan_mean(&summary.bpratio),
        load_variability,
    })
}

/// Content of a load duration curve: loads sorted descending against the
/// percent of time spent at or above each load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadDurationData {
    pub loads: Vec<f64>,
    pub percent_time: Vec<f64>,
}

/// Sort loads for a load duration curve, dropping invalid entries
///
/// Returns `None` when no finite loads remain.
pub fn load_duration_data(loads: &[f64]) -> Option<LoadDurationData> {
    let mut sorted: Vec<f64> = loads.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));

    let val_ct = sorted.len();
    let percent_time = if val_ct == 1 {
        vec![0.0]
    } else {
        (0..val_ct)
            .map(|idx| 100.0 * idx as f64 / (val_ct - 1) as f64)
            .collect()
    };
    Some(LoadDurationData {
        loads: sorted,
        percent_time,
    })
}

/// Content of a heatmap: a day-by-time-of-day grid with its axis labels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapData {
    /// One day per row, one time-of-day slot per column; NaN where no
    /// sample landed
    pub grid: Grid,
    /// Row labels, one calendar day each
    pub dates: Vec<NaiveDate>,
    /// Column coordinates in hours of the day
    pub hours: Vec<f64>,
}

/// Fold a series into a day-by-time-of-day grid for a heatmap
///
/// The slot width is the smallest positive timestamp spacing in the
/// series and must divide a day evenly. Every calendar day in the span
/// gets a row; cells no sample lands in stay NaN. Returns `None` when the
/// series cannot be folded (fewer than 2 samples, or an uneven slot width).
pub fn heatmap_data(series: &Series) -> Option<HeatmapData> {
    if series.len() < 2 {
        return None;
    }
    let timestamps = series.timestamps();

    let step_secs = timestamps
        .windows(2)
        .map(|pair| pair[1].signed_duration_since(pair[0]).num_seconds())
        .filter(|&secs| secs > 0)
        .min()?;
    if SECONDS_PER_DAY % step_secs != 0 {
        log::warn!(
            "sample spacing of {} s does not divide a day; heatmap skipped",
            step_secs
        );
        return None;
    }
    let slot_ct = (SECONDS_PER_DAY / step_secs) as usize;

    let first_date = timestamps[0].date();
    let last_date = timestamps[timestamps.len() - 1].date();
    let day_ct = last_date.signed_duration_since(first_date).num_days() as usize + 1;

    let mut cells = vec![f64::NAN; day_ct * slot_ct];
    for (timestamp, &value) in timestamps.iter().zip(series.values()) {
        let row = timestamp
            .date()
            .signed_duration_since(first_date)
            .num_days() as usize;
        let col = (timestamp.num_seconds_from_midnight() as i64 / step_secs) as usize;
        cells[row * slot_ct + col] = value;
    }

    let grid = Grid::new(day_ct, slot_ct, cells).ok()?;
    let dates = (0..day_ct)
        .map(|offset| first_date + Duration::days(offset as i64))
        .collect();
    let hours = (0..slot_ct)
        .map(|slot| slot as f64 * step_secs as f64 / 3600.0)
        .collect();
    Some(HeatmapData { grid, dates, hours })
}

/// Content of an energy signature: loads against outside air temperature,
/// with the rank-correlation weather sensitivity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergySignatureData {
    pub temperatures: Vec<f64>,
    pub loads: Vec<f64>,
    /// Spearman rank correlation between load and temperature
    pub weather_sensitivity: f64,
}

/// Pair loads with outside air temperatures for an energy signature
pub fn energy_signature_data(oats: &[f64], loads: &[f64]) -> Result<EnergySignatureData> {
    let weather_sensitivity = stats::spearman_rank(loads, oats)?;
    Ok(EnergySignatureData {
        temperatures: oats.to_vec(),
        loads: loads.to_vec(),
        weather_sensitivity,
    })
}

/// Content of a time-series load profile plot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesData {
    pub timestamps: Vec<NaiveDateTime>,
    pub values: Vec<f64>,
}

/// Pair times with loads for a load profile plot
pub fn time_series_data(series: &Series) -> TimeSeriesData {
    TimeSeriesData {
        timestamps: series.timestamps().to_vec(),
        values: series.values().to_vec(),
    }
}

/// Content of a longitudinal benchmarking chart: annual energy totals with
/// period labels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongitudinalBenchmarkData {
    /// Annual electricity totals, kW·h, oldest first
    pub annual_electricity_kwh: Vec<f64>,
    /// One `mm/yyyy-mm/yyyy` label per year
    pub tick_labels: Vec<String>,
    /// Annual gas totals when a gas channel is supplied
    pub annual_gas: Option<Vec<f64>>,
}

/// Assemble annual totals for longitudinal benchmarking
///
/// Needs at least two full years of electricity data; returns `Ok(None)`
/// otherwise so the caller can skip the chart.
pub fn longitudinal_benchmark_data(
    aggregator: &PeriodAggregator,
    electricity: &Series,
    gas: Option<&Series>,
) -> Result<Option<LongitudinalBenchmarkData>> {
    let yearly = aggregator.annual_energy(electricity)?;
    if yearly.len() <= 1 {
        return Ok(None);
    }

    let starts: Vec<NaiveDateTime> = yearly.iter().map(|p| p.start).collect();
    let ends: Vec<NaiveDateTime> = yearly.iter().map(|p| p.end).collect();
    let tick_labels = ticklabels::ticklabel_start_end_ym(&starts, &ends)?;

    let annual_gas = match gas {
        Some(gas_series) => Some(
            aggregator
                .annual_energy(gas_series)?
                .into_iter()
                .map(|p| p.energy_kwh)
                .collect(),
        ),
        None => None,
    };

    Ok(Some(LongitudinalBenchmarkData {
        annual_electricity_kwh: yearly.into_iter().map(|p| p.energy_kwh).collect(),
        tick_labels,
        annual_gas,
    }))
}

/// Target bucket width for [`resample`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Granularity {
    Min10,
    Min15,
    Min30,
    Min60,
    Day,
    /// Weeks starting on Monday
    Week,
    /// Calendar months
    Month,
}

/// Re-bucket a series at a coarser granularity
///
/// Pure function: buckets run from the one containing the first sample to
/// the one containing the last, each labeled with its start. A bucket's
/// value is the sum of the finite samples that fall in it; buckets with no
/// finite samples hold NaN. Recomputation is cheap, so callers resample on
/// demand instead of caching.
pub fn resample(series: &Series, granularity: Granularity) -> Result<Series> {
    if series.is_empty() {
        return Err(Error::InvalidInput("series is empty".to_string()));
    }

    // Buckets that never receive a finite sample stay out of the map and
    // come back as NaN below.
    let mut sums: BTreeMap<NaiveDateTime, f64> = BTreeMap::new();
    for (timestamp, &value) in series.timestamps().iter().zip(series.values()) {
        if value.is_finite() {
            *sums.entry(bucket_start(*timestamp, granularity)).or_insert(0.0) += value;
        }
    }

    let first_bucket = bucket_start(series.timestamps()[0], granularity);
    let last_bucket = bucket_start(series.timestamps()[series.len() - 1], granularity);

    let mut timestamps = Vec::new();
    let mut values = Vec::new();
    let mut bucket = first_bucket;
    while bucket <= last_bucket {
        timestamps.push(bucket);
        values.push(sums.get(&bucket).copied().unwrap_or(f64::NAN));
        bucket = next_bucket(bucket, granularity);
    }
    Series::new(timestamps, values)
}

fn bucket_start(timestamp: NaiveDateTime, granularity: Granularity) -> NaiveDateTime {
    let date = timestamp.date();
    match granularity {
        Granularity::Min10 => minute_bucket(timestamp, 10),
        Granularity::Min15 => minute_bucket(timestamp, 15),
        Granularity::Min30 => minute_bucket(timestamp, 30),
        Granularity::Min60 => minute_bucket(timestamp, 60),
        Granularity::Day => date.and_time(NaiveTime::MIN),
        Granularity::Week => {
            let monday = date - Duration::days(date.weekday().num_days_from_monday() as i64);
            monday.and_time(NaiveTime::MIN)
        }
        Granularity::Month => first_of_month(date.year(), date.month()).and_time(NaiveTime::MIN),
    }
}

fn next_bucket(bucket: NaiveDateTime, granularity: Granularity) -> NaiveDateTime {
    match granularity {
        Granularity::Min10 => bucket + Duration::minutes(10),
        Granularity::Min15 => bucket + Duration::minutes(15),
        Granularity::Min30 => bucket + Duration::minutes(30),
        Granularity::Min60 => bucket + Duration::minutes(60),
        Granularity::Day => bucket + Duration::days(1),
        Granularity::Week => bucket + Duration::days(7),
        Granularity::Month => {
            let (year, month) = if bucket.month() == 12 {
                (bucket.year() + 1, 1)
            } else {
                (bucket.year(), bucket.month() + 1)
            };
            first_of_month(year, month).and_time(NaiveTime::MIN)
        }
    }
}

fn minute_bucket(timestamp: NaiveDateTime, minutes: i64) -> NaiveDateTime {
    let step = minutes * 60;
    let secs = timestamp.num_seconds_from_midnight() as i64 / step * step;
    timestamp.date().and_time(NaiveTime::MIN) + Duration::seconds(secs)
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    // Day 1 exists in every month.
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or_default()
}

fn nan_mean(values: &[f64]) -> f64 {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return f64::NAN;
    }
    finite.iter().sum::<f64>() / finite.len() as f64
}

fn nan_max(values: &[f64]) -> f64 {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(f64::NAN, f64::max)
}

fn nan_min(values: &[f64]) -> f64 {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(f64::NAN, f64::min)
}
