//! Core module - configuration, errors, and the shared data model

mod config;
mod error;
mod types;

pub use config::{AggregationConfig, CleaningConfig, Config, ReportConfig};
pub use error::{Error, Result};
pub use types::{BuildingMetadata, Grid, Period, PeriodLength, Sample, Series};
