//! Tick labels with beginning and end dates

use crate::core::{Error, Result};
use chrono::NaiveDateTime;

/// Format datetimes as `yyyy-mm-dd` labels
pub fn ticklabel_ymd(datetimes: &[NaiveDateTime]) -> Vec<String> {
    datetimes
        .iter()
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .collect()
}

/// Format datetimes as `yyyy-mm` labels
pub fn ticklabel_ym(datetimes: &[NaiveDateTime]) -> Vec<String> {
    datetimes
        .iter()
        .map(|dt| dt.format("%Y-%m").to_string())
        .collect()
}

/// Format datetimes as `mm/yyyy` labels
pub fn ticklabel_my_slash(datetimes: &[NaiveDateTime]) -> Vec<String> {
    datetimes
        .iter()
        .map(|dt| dt.format("%m/%Y").to_string())
        .collect()
}

/// Format paired start/end dates as `mm/yyyy-mm/yyyy` labels
pub fn ticklabel_start_end_ym(
    start_dates: &[NaiveDateTime],
    end_dates: &[NaiveDateTime],
) -> Result<Vec<String>> {
    if start_dates.len() != end_dates.len() {
        return Err(Error::InvalidInput(format!(
            "start date count {} does not match end date count {}",
            start_dates.len(),
            end_dates.len()
        )));
    }
    if start_dates
        .iter()
        .zip(end_dates)
        .any(|(start, end)| start >= end)
    {
        return Err(Error::InvalidInput(
            "start dates must precede end dates".to_string(),
        ));
    }

    let starts = ticklabel_my_slash(start_dates);
    let ends = ticklabel_my_slash(end_dates);
    Ok(starts
        .into_iter()
        .zip(ends)
        .map(|(start, end)| format!("{}-{}", start, end))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn dt(year: i32, month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_time(NaiveTime::MIN)
    }

    #[test]
    fn test_formats() {
        let dates = [dt(2013, 7, 14)];
        assert_eq!(ticklabel_ymd(&dates), vec!["2013-07-14"]);
        assert_eq!(ticklabel_ym(&dates), vec!["2013-07"]);
        assert_eq!(ticklabel_my_slash(&dates), vec!["07/2013"]);
    }

    #[test]
    fn test_start_end_labels() {
        let starts = [dt(2012, 7, 14), dt(2013, 7, 14)];
        let ends = [dt(2013, 7, 14), dt(2014, 7, 14)];
        let labels = ticklabel_start_end_ym(&starts, &ends).unwrap();
        assert_eq!(labels, vec!["07/2012-07/2013", "07/2013-07/2014"]);
    }

    #[test]
    fn test_start_end_rejects_bad_pairs() {
        assert!(ticklabel_start_end_ym(&[dt(2013, 1, 1)], &[]).is_err());
        assert!(ticklabel_start_end_ym(&[dt(2013, 1, 1)], &[dt(2012, 1, 1)]).is_err());
    }
}
