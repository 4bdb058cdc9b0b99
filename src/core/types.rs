//! Common types used across the analysis engine

use crate::core::{Error, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A single power reading from one measurement channel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Time of the reading (building-local wall clock)
    pub timestamp: NaiveDateTime,
    /// Power in kW; NaN or infinite for a sensor dropout
    pub value: f64,
}

/// An ordered series of samples belonging to one measurement channel
///
/// Timestamps are non-decreasing and always paired one-to-one with values;
/// both invariants are checked at construction. A constructed series is
/// read-only: every analysis operation returns new data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Series {
    timestamps: Vec<NaiveDateTime>,
    values: Vec<f64>,
}

impl Series {
    /// Build a series from parallel timestamp and value vectors
    pub fn new(timestamps: Vec<NaiveDateTime>, values: Vec<f64>) -> Result<Self> {
        if timestamps.len() != values.len() {
            return Err(Error::InvalidInput(format!(
                "timestamp count {} does not match value count {}",
                timestamps.len(),
                values.len()
            )));
        }
        if timestamps.windows(2).any(|pair| pair[1] < pair[0]) {
            return Err(Error::InvalidInput(
                "timestamps must be non-decreasing".to_string(),
            ));
        }
        Ok(Self { timestamps, values })
    }

    /// Build a series from samples, preserving their order
    pub fn from_samples(samples: impl IntoIterator<Item = Sample>) -> Result<Self> {
        let (timestamps, values) = samples
            .into_iter()
            .map(|sample| (sample.timestamp, sample.value))
            .unzip();
        Self::new(timestamps, values)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Most recent timestamp, if any samples exist
    pub fn last_timestamp(&self) -> Option<NaiveDateTime> {
        self.timestamps.last().copied()
    }

    /// Consume the series, returning its timestamp and value vectors
    pub fn into_parts(self) -> (Vec<NaiveDateTime>, Vec<f64>) {
        (self.timestamps, self.values)
    }
}

/// Length of a calendar-aligned aggregation period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeriodLength {
    /// A rolling 365-day (366 across a leap day) year
    OneYear,
    /// A window of N numerical months
    Months(u32),
}

/// A calendar-aligned span with its aggregated energy
///
/// `start` and `end` are midnight boundaries; `end` is exclusive and lies
/// exactly one period length after `start`. Aggregation emits periods
/// oldest-first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Period {
    /// First instant of the period
    pub start: NaiveDateTime,
    /// First instant after the period
    pub end: NaiveDateTime,
    /// Integrated energy over the period in kW·h
    pub energy_kwh: f64,
}

/// A rectangular grid of values, e.g. one day per row and one
/// time-of-day slot per column, with NaN marking missing cells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    data: Vec<f64>,
    rows: usize,
    cols: usize,
}

impl Grid {
    /// Build a grid from row-major data
    pub fn new(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        if rows * cols != data.len() {
            return Err(Error::InvalidInput(format!(
                "grid of {}x{} needs {} cells, got {}",
                rows,
                cols,
                rows * cols,
                data.len()
            )));
        }
        Ok(Self { data, rows, cols })
    }

    /// Build a grid from equal-length rows
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let row_ct = rows.len();
        let col_ct = rows.first().map(Vec::len).unwrap_or(0);
        if rows.iter().any(|row| row.len() != col_ct) {
            return Err(Error::InvalidInput(
                "grid rows must all have the same length".to_string(),
            ));
        }
        Ok(Self {
            data: rows.into_iter().flatten().collect(),
            rows: row_ct,
            cols: col_ct,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    /// One row as a slice
    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// One column, copied out
    pub fn column(&self, col: usize) -> Vec<f64> {
        (0..self.rows).map(|row| self.get(row, col)).collect()
    }

    /// Row-major cell data
    pub fn data(&self) -> &[f64] {
        &self.data
    }
}

/// Measurement metadata for one building channel
///
/// Validated at the point of use: power-derived summaries require
/// `load_units == "kW"` and a positive floor area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingMetadata {
    /// Measurement unit of the load channel
    pub load_units: String,
    /// Conditioned floor area in square feet
    pub floor_area_sf: f64,
}
