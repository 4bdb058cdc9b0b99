//! LoadShape Analyzer - Demo CLI
//!
//! Runs the full analysis pipeline over a synthetic building load:
//! cleaning, annual and monthly energy aggregation, daily summary
//! statistics, and load-duration data.

use anyhow::Result;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};

use loadshape_analyzer_lib::aggregate::PeriodAggregator;
use loadshape_analyzer_lib::cleaning;
use loadshape_analyzer_lib::core::{BuildingMetadata, Config, Series};
use loadshape_analyzer_lib::plotdata;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("==============================================");
    println!("   LoadShape Analyzer - Demo CLI");
    println!("==============================================\n");

    let config = Config::default();
    let metadata = BuildingMetadata {
        load_units: "kW".to_string(),
        floor_area_sf: 52_000.0,
    };

    // 1. Synthesize a building load channel
    println!("[1/5] Synthesizing hourly load data...");
    let series = synthetic_load(
        NaiveDate::from_ymd_opt(2022, 4, 1).expect("valid date"),
        NaiveDate::from_ymd_opt(2023, 10, 1).expect("valid date"),
    )?;
    println!("      Samples: {}", series.len());
    println!(
        "      Span:    {} .. {}\n",
        series.timestamps()[0],
        series.last_timestamp().expect("non-empty series")
    );

    // 2. Fill short sensor gaps, then drop whatever stays invalid
    println!("[2/5] Cleaning...");
    let bad_before = series.values().iter().filter(|v| !v.is_finite()).count();
    let filled = cleaning::fill_gaps(
        &series,
        config.cleaning.max_fill_run,
        config.cleaning.time_weighted_fill,
    )?;
    let cleaned = cleaning::clean(&filled)?;
    println!(
        "      Filled {} gap samples, dropped {}, {} remain\n",
        bad_before - (filled.len() - cleaned.len()),
        filled.len() - cleaned.len(),
        cleaned.len()
    );

    // 3. Aggregate energy
    println!("[3/5] Aggregating energy...");
    let aggregator = PeriodAggregator::new(&config.aggregation);

    let annual = aggregator.annual_energy(&cleaned)?;
    if annual.is_empty() {
        println!("      Annual:  not enough data for a full year");
    }
    for period in &annual {
        println!(
            "      Annual:  {} .. {}  {:>10.1} kWh",
            period.start.date(),
            period.end.date(),
            period.energy_kwh
        );
    }

    let monthly = aggregator.monthly_energy(&cleaned, 1)?;
    println!("      Months:  {} whole months", monthly.len());
    for period in monthly.iter().rev().take(3).rev() {
        println!(
            "               {} .. {}  {:>10.1} kWh",
            period.start.date(),
            period.end.date(),
            period.energy_kwh
        );
    }
    println!();

    // 4. Daily summary statistics
    println!("[4/5] Computing daily summary...");
    let heatmap = plotdata::heatmap_data(&cleaned).expect("hourly data folds into days");
    let summary = plotdata::daily_summary(&heatmap.grid, &metadata)?;
    println!(
        "      Peak load (avg daily p95):  {:>8.2} {}",
        summary.ave_daily_peak_load, summary.load_units
    );
    println!(
        "      Base load (avg daily p5):   {:>8.2} {}",
        summary.ave_daily_base_load, summary.load_units
    );
    println!(
        "      Max intensity:              {:>8.2} {}",
        summary.overall_max_load_intensity, config.report.load_intensity_units
    );
    println!(
        "      Load variability:           {:>8.2}",
        summary.load_variability
    );
    println!();

    // 5. Load duration curve data
    println!("[5/5] Building load duration curve...");
    match plotdata::load_duration_data(cleaned.values()) {
        Some(curve) => {
            let quarter = curve.loads.len() / 4;
            println!("      Top load:      {:>8.2} kW", curve.loads[0]);
            println!("      25% exceeded:  {:>8.2} kW", curve.loads[quarter]);
            println!(
                "      Bottom load:   {:>8.2} kW",
                curve.loads[curve.loads.len() - 1]
            );
        }
        None => println!("      No finite loads to sort"),
    }
    println!();

    println!("=== Summary (JSON) ===\n");
    println!("{}", serde_json::to_string_pretty(&summary)?);

    println!("\n==============================================");
    println!("   Analysis pipeline complete");
    println!("==============================================");

    Ok(())
}

/// Hourly synthetic office-building load: a sinusoidal daily shape over a
/// weekday baseline, with a few dropouts to exercise cleaning.
fn synthetic_load(start: NaiveDate, end: NaiveDate) -> Result<Series> {
    let mut timestamps: Vec<NaiveDateTime> = Vec::new();
    let mut values = Vec::new();

    let mut t = start.and_time(NaiveTime::MIN);
    let stop = end.and_time(NaiveTime::MIN);
    let mut idx = 0u64;
    while t <= stop {
        let hour = idx % 24;
        let weekday = t.date().weekday().number_from_monday();
        let base = if weekday <= 5 { 180.0 } else { 120.0 };
        let daily =
            60.0 * (std::f64::consts::PI * (hour as f64 - 6.0) / 12.0).sin().max(0.0);
        // Drop roughly one sample per week to simulate sensor gaps.
        let value = if idx % 167 == 0 { f64::NAN } else { base + daily };

        timestamps.push(t);
        values.push(value);
        t += Duration::hours(1);
        idx += 1;
    }

    Ok(Series::new(timestamps, values)?)
}
