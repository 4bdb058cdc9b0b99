//! Calendar-aligned energy aggregation
//!
//! Integrating power over a calendar period needs one sample from outside
//! the period: a reading stamped at midnight closes the interval that ends
//! there, so the first reading of the next day has to enter the integral
//! for the current day. When samples do not land exactly on a period
//! boundary, the integral of the covering block is trimmed by the linearly
//! interpolated energy that falls outside the boundary.

use crate::calendar;
use crate::cleaning;
use crate::core::{AggregationConfig, Error, Period, PeriodLength, Result, Series};
use crate::integrate;
use chrono::{NaiveDateTime, NaiveTime};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Walks a series backward from its most recent whole-day boundary,
/// summarizing energy one calendar period at a time
pub struct PeriodAggregator {
    /// Days of missing lead-in data tolerated before the walk stops
    lead_in_tolerance_days: f64,
}

impl PeriodAggregator {
    /// Create an aggregator with the given configuration
    pub fn new(config: &AggregationConfig) -> Self {
        Self {
            lead_in_tolerance_days: config.lead_in_tolerance_days,
        }
    }

    /// Total energy for as many rolling 365-day years as have data
    pub fn annual_energy(&self, series: &Series) -> Result<Vec<Period>> {
        self.aggregate(series, PeriodLength::OneYear)
    }

    /// Total energy for as many whole N-month windows as have data
    pub fn monthly_energy(&self, series: &Series, month_ct: u32) -> Result<Vec<Period>> {
        self.aggregate(series, PeriodLength::Months(month_ct))
    }

    /// Aggregate energy over calendar-aligned periods, oldest first
    ///
    /// Periods are anchored at the series's final whole-day boundary and
    /// walk backward; the "years" are 365-day periods, not calendar years.
    /// A series that never covers a full period yields an empty list —
    /// the normal insufficient-data outcome, not an error.
    pub fn aggregate(&self, series: &Series, length: PeriodLength) -> Result<Vec<Period>> {
        if let PeriodLength::Months(0) = length {
            return Err(Error::InvalidInput(
                "month count must be at least 1".to_string(),
            ));
        }

        let mut periods = Vec::new();
        if series.is_empty() {
            return Ok(periods);
        }
        let cleaned = cleaning::clean(series)?;
        let timestamps = cleaned.timestamps();
        let values = cleaned.values();

        if cleaned.len() < 2 {
            return Ok(periods);
        }

        // The final timestamp starts the next, open period: either it marks
        // midnight of the day before, or the day it falls on is incomplete.
        let mut next_start_idx = cleaned.len() - 1;
        let mut next_starts_on = midnight_of(timestamps[next_start_idx]);
        next_start_idx =
            calendar::find_latest_before(timestamps, next_starts_on, 0, next_start_idx + 1)? + 1;

        loop {
            // next_starts_on holds the first date of the period after the
            // period of interest; next_start_idx marks the first entry that
            // can belong to that later period.
            let curr_starts_on = match length {
                PeriodLength::OneYear => calendar::step_back_one_year(next_starts_on),
                PeriodLength::Months(month_ct) => {
                    calendar::step_back_months(next_starts_on, month_ct)
                }
            };
            let prev_end_idx =
                calendar::find_latest_before(timestamps, curr_starts_on, 0, next_start_idx)?;

            // Check that data spans the full period, or close to it.
            if prev_end_idx == 0 {
                let missing_days = timestamps[0]
                    .signed_duration_since(curr_starts_on)
                    .num_seconds() as f64
                    / SECONDS_PER_DAY;
                if missing_days > self.lead_in_tolerance_days {
                    log::debug!(
                        "period walk stopped: {:.1} days of lead-in data missing before {}",
                        missing_days,
                        curr_starts_on
                    );
                    break;
                }
            }

            // prev_end_idx marks the entry spanning the transition into this
            // period; the entry at next_start_idx spans the transition out,
            // so the block runs through next_start_idx inclusive.
            let mut energy =
                integrate_block(values, timestamps, prev_end_idx, next_start_idx + 1)?;

            // Trim the excess integrated before the period start. The excess
            // is the fraction (excess_seconds / bin_seconds) of the boundary
            // bin's energy; the bin length cancels out of the product.
            let sec_excess = curr_starts_on
                .signed_duration_since(timestamps[prev_end_idx])
                .num_seconds();
            if sec_excess > 0 {
                energy -= 0.5
                    * (values[prev_end_idx] + values[prev_end_idx + 1])
                    * sec_excess as f64
                    / 3600.0;
            }

            // Trim the excess integrated past the period end.
            let sec_excess = timestamps[next_start_idx]
                .signed_duration_since(next_starts_on)
                .num_seconds();
            if sec_excess > 0 {
                energy -= 0.5
                    * (values[next_start_idx - 1] + values[next_start_idx])
                    * sec_excess as f64
                    / 3600.0;
            }

            periods.push(Period {
                start: curr_starts_on,
                end: next_starts_on,
                energy_kwh: energy,
            });

            if prev_end_idx == 0 {
                break;
            }
            next_starts_on = curr_starts_on;
            next_start_idx = prev_end_idx + 1;
        }

        // The walk ran newest-first; callers want chronological order.
        periods.reverse();
        Ok(periods)
    }
}

/// Integrate the block `[start_idx, block_idx)` of a power series into
/// kW·h, against elapsed hours since the block's first timestamp
fn integrate_block(
    values: &[f64],
    timestamps: &[NaiveDateTime],
    start_idx: usize,
    block_idx: usize,
) -> Result<f64> {
    let first = timestamps[start_idx];
    let hours: Vec<f64> = timestamps[start_idx..block_idx]
        .iter()
        .map(|t| t.signed_duration_since(first).num_seconds() as f64 / 3600.0)
        .collect();
    integrate::simpsons(&values[start_idx..block_idx], &hours)
}

fn midnight_of(datetime: NaiveDateTime) -> NaiveDateTime {
    datetime.date().and_time(NaiveTime::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn aggregator() -> PeriodAggregator {
        PeriodAggregator::new(&AggregationConfig::default())
    }

    fn dt(year: i32, month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_time(NaiveTime::MIN)
    }

    /// Hourly constant-power series spanning `[start, end]` inclusive.
    fn hourly_series(start: NaiveDateTime, end: NaiveDateTime, power_kw: f64) -> Series {
        let mut timestamps = Vec::new();
        let mut t = start;
        while t <= end {
            timestamps.push(t);
            t += Duration::hours(1);
        }
        let values = vec![power_kw; timestamps.len()];
        Series::new(timestamps, values).unwrap()
    }

    #[test]
    fn test_one_full_year_of_constant_load() {
        // Non-leap span: exactly 8760 hours of 1 kW.
        let series = hourly_series(dt(2021, 3, 1), dt(2022, 3, 1), 1.0);
        let periods = aggregator().annual_energy(&series).unwrap();
        assert_eq!(periods.len(), 1);
        let period = periods[0].clone();
        assert_eq!(period.start, dt(2021, 3, 1));
        assert_eq!(period.end, dt(2022, 3, 1));
        assert_eq!(calendar::step_back_one_year(period.end), period.start);
        assert!((period.energy_kwh - 8760.0).abs() < 0.5);
    }

    #[test]
    fn test_boundary_excess_is_trimmed() {
        // Lead-in data before the period start must not inflate the total.
        let series = hourly_series(dt(2021, 2, 20), dt(2022, 3, 1), 1.0);
        let periods = aggregator().annual_energy(&series).unwrap();
        assert_eq!(periods.len(), 1);
        assert_eq!(periods[0].start, dt(2021, 3, 1));
        assert!((periods[0].energy_kwh - 8760.0).abs() < 0.5);
    }

    #[test]
    fn test_two_years_emitted_oldest_first() {
        let series = hourly_series(dt(2019, 3, 1), dt(2021, 3, 1), 2.0);
        let periods = aggregator().annual_energy(&series).unwrap();
        assert_eq!(periods.len(), 2);
        assert!(periods[0].start < periods[1].start);
        assert_eq!(periods[0].end, periods[1].start);
        // The older span covers the 2020 leap day: 8784 hours.
        assert!((periods[0].energy_kwh - 2.0 * 8784.0).abs() < 1.0);
        assert!((periods[1].energy_kwh - 2.0 * 8760.0).abs() < 1.0);
    }

    #[test]
    fn test_insufficient_data_returns_empty() {
        let series = hourly_series(dt(2021, 6, 1), dt(2021, 9, 1), 1.0);
        let periods = aggregator().annual_energy(&series).unwrap();
        assert!(periods.is_empty());
    }

    #[test]
    fn test_short_lead_in_gap_is_tolerated() {
        // Two days short of a full year: within the three-day tolerance.
        let series = hourly_series(dt(2021, 3, 3), dt(2022, 3, 1), 1.0);
        let periods = aggregator().annual_energy(&series).unwrap();
        assert_eq!(periods.len(), 1);
        assert_eq!(periods[0].start, dt(2021, 3, 1));
    }

    #[test]
    fn test_long_lead_in_gap_aborts() {
        let series = hourly_series(dt(2021, 3, 10), dt(2022, 3, 1), 1.0);
        let periods = aggregator().annual_energy(&series).unwrap();
        assert!(periods.is_empty());
    }

    #[test]
    fn test_monthly_energy_single_month() {
        // January 2021: 31 days of 1 kW = 744 kWh.
        let series = hourly_series(dt(2021, 1, 1), dt(2021, 2, 1), 1.0);
        let periods = aggregator().monthly_energy(&series, 1).unwrap();
        assert_eq!(periods.len(), 1);
        assert_eq!(periods[0].start, dt(2021, 1, 1));
        assert_eq!(periods[0].end, dt(2021, 2, 1));
        assert!((periods[0].energy_kwh - 744.0).abs() < 0.5);
    }

    #[test]
    fn test_monthly_walk_clamps_through_short_months() {
        // Data ends on Mar-31; one month back clamps to Feb-28.
        let series = hourly_series(dt(2023, 2, 20), dt(2023, 3, 31), 1.0);
        let periods = aggregator().monthly_energy(&series, 1).unwrap();
        assert_eq!(periods.len(), 1);
        assert_eq!(periods[0].start, dt(2023, 2, 28));
        assert_eq!(periods[0].end, dt(2023, 3, 31));
    }

    #[test]
    fn test_zero_month_count_is_invalid() {
        let series = hourly_series(dt(2021, 1, 1), dt(2021, 2, 1), 1.0);
        assert!(matches!(
            aggregator().aggregate(&series, PeriodLength::Months(0)),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_nan_samples_are_discarded_before_integration() {
        // A run of NaN gets integrated as a weighted average of the good
        // loads on either side, held over the gap.
        let mut timestamps = Vec::new();
        let mut t = dt(2021, 1, 1);
        while t <= dt(2021, 2, 1) {
            timestamps.push(t);
            t += Duration::hours(1);
        }
        let mut values = vec![1.0; timestamps.len()];
        for value in values.iter_mut().skip(100).take(5) {
            *value = f64::NAN;
        }
        let series = Series::new(timestamps, values).unwrap();
        let periods = aggregator().monthly_energy(&series, 1).unwrap();
        assert_eq!(periods.len(), 1);
        assert!((periods[0].energy_kwh - 744.0).abs() < 0.5);
    }

    #[test]
    fn test_mid_day_tail_is_excluded() {
        // Data ending mid-day anchors on that day's midnight, so the
        // trailing hours contribute nothing.
        let series = hourly_series(dt(2021, 1, 1), dt(2021, 2, 1) + Duration::hours(14), 1.0);
        let periods = aggregator().monthly_energy(&series, 1).unwrap();
        assert_eq!(periods.len(), 1);
        assert_eq!(periods[0].end, dt(2021, 2, 1));
        assert!((periods[0].energy_kwh - 744.0).abs() < 0.5);
    }

    #[test]
    fn test_fewer_than_two_valid_samples() {
        let series = Series::new(vec![dt(2021, 1, 1)], vec![1.0]).unwrap();
        assert!(aggregator().annual_energy(&series).unwrap().is_empty());

        let series = Series::new(
            vec![dt(2021, 1, 1), dt(2021, 6, 1), dt(2022, 1, 1)],
            vec![1.0, f64::NAN, f64::NAN],
        )
        .unwrap();
        assert!(aggregator().annual_energy(&series).unwrap().is_empty());
    }
}
