use std::fs;
use std::path::PathBuf;

use approx::assert_abs_diff_eq;
use tempfile::TempDir;

use crate::config::AnalysisConfig;
use crate::errors::AnalysisError;
use crate::loader;
use crate::pipeline;
use crate::tests::fixtures::{csv_line, CSV_HEADER};
use crate::timeseries::ResampleFrequency;

fn write_csv(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("write fixture csv");
    path
}

#[test]
fn loader_reads_rows_and_parses_timestamps() {
    let dir = TempDir::new().unwrap();
    let content = format!(
        "{CSV_HEADER}\n{}\n{}\n",
        csv_line("2021-08-09 06:00", 120.0, 95.0, 10.0, 0),
        csv_line("2021-08-09 06:01", 130.0, 96.0, 12.0, 0),
    );
    let path = write_csv(&dir, "togo.csv", &content);

    let table = loader::load_table(&path, "Togo").unwrap();

    assert_eq!(table.len(), 2);
    assert_eq!(table.column("GHI").unwrap(), &[120.0, 130.0]);
    assert!(table.timestamps[0] < table.timestamps[1]);
    assert_eq!(table.cleaning, vec![false, false]);
}

#[test]
fn loader_rejects_missing_required_column() {
    let dir = TempDir::new().unwrap();
    let header = CSV_HEADER.replace("WD,", "");
    let path = write_csv(&dir, "bad.csv", &format!("{header}\n"));

    let err = loader::load_table(&path, "Bad").unwrap_err();
    assert!(matches!(err, AnalysisError::Schema { column } if column == "WD"));
}

#[test]
fn loader_accepts_missing_comments_column() {
    let dir = TempDir::new().unwrap();
    let header = CSV_HEADER.replace(",Comments", "");
    let line = csv_line("2021-08-09 06:00", 10.0, 5.0, 0.0, 0);
    let line = line.trim_end_matches(',');
    let path = write_csv(&dir, "ok.csv", &format!("{header}\n{line}\n"));

    let table = loader::load_table(&path, "Ok").unwrap();
    assert_eq!(table.len(), 1);
}

#[test]
fn loader_rejects_malformed_timestamp() {
    let dir = TempDir::new().unwrap();
    let content = format!(
        "{CSV_HEADER}\n{}\n",
        csv_line("09/08/2021 06:00", 10.0, 5.0, 0.0, 0)
    );
    let path = write_csv(&dir, "bad_ts.csv", &content);

    let err = loader::load_table(&path, "Bad").unwrap_err();
    match err {
        AnalysisError::Parse { row, column, .. } => {
            assert_eq!(row, 2);
            assert_eq!(column, "Timestamp");
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn loader_rejects_non_increasing_timestamps() {
    let dir = TempDir::new().unwrap();
    let line = csv_line("2021-08-09 06:00", 10.0, 5.0, 0.0, 0);
    let path = write_csv(&dir, "dup.csv", &format!("{CSV_HEADER}\n{line}\n{line}\n"));

    let err = loader::load_table(&path, "Dup").unwrap_err();
    match err {
        AnalysisError::Parse { row, message, .. } => {
            assert_eq!(row, 3);
            assert!(message.contains("strictly increasing"));
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn loader_rejects_non_numeric_measurement() {
    let dir = TempDir::new().unwrap();
    let line = csv_line("2021-08-09 06:00", 10.0, 5.0, 0.0, 0).replace("998.0", "n/a");
    let path = write_csv(&dir, "bad_num.csv", &format!("{CSV_HEADER}\n{line}\n"));

    let err = loader::load_table(&path, "Bad").unwrap_err();
    assert!(matches!(err, AnalysisError::Parse { column, .. } if column == "BP"));
}

#[test]
fn loader_records_empty_fields_as_missing() {
    let dir = TempDir::new().unwrap();
    let line = csv_line("2021-08-09 06:00", 10.0, 5.0, 0.0, 0).replace("28.0", "");
    let path = write_csv(&dir, "gap.csv", &format!("{CSV_HEADER}\n{line}\n"));

    let table = loader::load_table(&path, "Gap").unwrap();
    assert!(table.column("Tamb").unwrap()[0].is_nan());
}

/// Ten days of synthetic readings, four per day, with one cleaning event on
/// day six and a clear post-cleaning shift in the module readings.
fn synthetic_location(dir: &TempDir) -> PathBuf {
    let mut content = String::from(CSV_HEADER);
    content.push('\n');
    for day in 1..=10 {
        for reading in 0..4 {
            let timestamp = format!("2021-08-{day:02} {:02}:00", 8 + reading * 2);
            let ghi = if day == 1 && reading == 0 {
                -3.0
            } else {
                300.0 + 20.0 * reading as f64 + day as f64
            };
            let mod_a = if day <= 5 {
                80.0 + reading as f64
            } else {
                110.0 + reading as f64
            };
            let wd = (day * 30 % 360) as f64;
            let cleaning = u8::from(day == 6 && reading == 0);
            content.push_str(&csv_line(&timestamp, ghi, mod_a, wd, cleaning));
            content.push('\n');
        }
    }
    write_csv(dir, "benin_site.csv", &content)
}

#[test]
fn run_location_produces_a_full_report() {
    let dir = TempDir::new().unwrap();
    let path = synthetic_location(&dir);
    let config = AnalysisConfig {
        seasonal_period: 3,
        resample_frequency: ResampleFrequency::Daily,
        ..AnalysisConfig::default()
    };

    let report = pipeline::run_location(&path, &config).unwrap();

    assert_eq!(report.location, "Benin Site");
    assert_eq!(report.rows, 40);
    assert_eq!(report.cleaning.clipped["GHI"], 1);
    assert!(report.summary["GHI"].mean > 0.0);
    assert_eq!(report.quality.rows, 40);
    assert_eq!(report.resampled.index.len(), 10);

    let decomp = &report.decomposition["ModA"];
    assert_eq!(decomp.trend.len(), 10);
    assert_eq!(decomp.period, 3);

    assert_eq!(report.cleaning_impact.len(), 2);
    let impact = &report.cleaning_impact[0];
    assert_eq!(impact.pre.count + impact.post.count, 40);
    assert!(impact.post.mean > impact.pre.mean);
    assert!(impact.test.p_value < 0.01);

    assert_eq!(report.correlation.columns.len(), 16);
    // ModB tracks ModA by construction, so the pair leads the ranking.
    assert_eq!(report.top_pairs[0].first, "ModA");
    assert_eq!(report.top_pairs[0].second, "ModB");
    assert_abs_diff_eq!(report.top_pairs[0].r, 1.0, epsilon = 1e-9);

    let wind_total: usize = report.wind.iter().map(|s| s.count).sum();
    assert_eq!(wind_total, 40);
}

#[test]
fn short_series_aborts_with_insufficient_data() {
    let dir = TempDir::new().unwrap();
    let mut content = String::from(CSV_HEADER);
    content.push('\n');
    for day in 1..=3 {
        let line = csv_line(
            &format!("2021-08-{day:02} 08:00"),
            100.0,
            50.0,
            0.0,
            u8::from(day == 2),
        );
        content.push_str(&line);
        content.push('\n');
    }
    let path = write_csv(&dir, "short.csv", &content);

    let config = AnalysisConfig {
        seasonal_period: 3,
        ..AnalysisConfig::default()
    };
    let err = pipeline::run_location(&path, &config).unwrap_err();
    assert!(matches!(
        err,
        AnalysisError::InsufficientData { needed: 6, got: 3 }
    ));
}

#[test]
fn compare_locations_reads_summary_means() {
    let dir = TempDir::new().unwrap();
    let path = synthetic_location(&dir);
    let config = AnalysisConfig {
        seasonal_period: 3,
        ..AnalysisConfig::default()
    };
    let report = pipeline::run_location(&path, &config).unwrap();

    let comparison = pipeline::compare_locations(std::slice::from_ref(&report));
    assert_eq!(comparison.len(), 1);
    assert_eq!(comparison[0].location, "Benin Site");
    assert_abs_diff_eq!(comparison[0].ghi, report.summary["GHI"].mean);
}
