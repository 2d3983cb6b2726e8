use std::fs::{self, File};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use rayon::prelude::*;
use tracing::{error, info};

use solar_eda::config::{AnalysisConfig, OutlierMethod};
use solar_eda::pipeline::{self, LocationReport};
use solar_eda::stats::TestKind;
use solar_eda::timeseries::ResampleFrequency;

#[derive(Parser, Debug)]
#[command(name = "solar_eda")]
#[command(about = "Exploratory analysis over solar-sensor CSV exports", long_about = None)]
struct Args {
    /// Location CSV files (one per site)
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Directory for per-location JSON reports
    #[arg(long, default_value = "reports")]
    out_dir: PathBuf,

    /// Outlier flagging rule
    #[arg(long, value_enum, default_value = "iqr")]
    outlier_method: OutlierMethod,

    /// IQR fence multiplier
    #[arg(long, env = "EDA_IQR_MULTIPLIER", default_value_t = 1.5)]
    iqr_multiplier: f64,

    /// Z-score cutoff when --outlier-method z-score
    #[arg(long, env = "EDA_ZSCORE_THRESHOLD", default_value_t = 3.0)]
    zscore_threshold: f64,

    /// Two-sample test for the cleaning-impact comparison
    #[arg(long, value_enum, default_value = "welch")]
    test_kind: TestKind,

    /// Resampling frequency for the overview series
    #[arg(long, value_enum, default_value = "monthly")]
    resample: ResampleFrequency,

    /// Seasonal period, in daily samples, for the module decomposition
    #[arg(long, env = "EDA_SEASONAL_PERIOD", default_value_t = 30)]
    seasonal_period: usize,

    /// Number of wind-rose sectors
    #[arg(long, env = "EDA_WIND_SECTORS", default_value_t = 16)]
    wind_sectors: usize,

    /// How many top correlated pairs to report
    #[arg(long, default_value_t = 5)]
    top_pairs: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("solar_eda=info".parse()?),
        )
        .init();

    let args = Args::parse();
    let config = AnalysisConfig {
        outlier_method: args.outlier_method,
        iqr_multiplier: args.iqr_multiplier,
        zscore_threshold: args.zscore_threshold,
        test_kind: args.test_kind,
        resample_frequency: args.resample,
        seasonal_period: args.seasonal_period,
        wind_sectors: args.wind_sectors,
        top_pairs: args.top_pairs,
    };

    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating output directory {}", args.out_dir.display()))?;

    let total_start = Instant::now();

    // Locations share no state; run their pipelines in parallel.
    let outcomes: Vec<_> = args
        .files
        .par_iter()
        .map(|path| (path, pipeline::run_location(path, &config)))
        .collect();

    let mut reports: Vec<LocationReport> = Vec::new();
    let mut failures = 0usize;
    for (path, outcome) in outcomes {
        match outcome {
            Ok(report) => {
                let out_path = args.out_dir.join(format!(
                    "{}_report.json",
                    path.file_stem().unwrap_or_default().to_string_lossy()
                ));
                let file = File::create(&out_path)
                    .with_context(|| format!("creating {}", out_path.display()))?;
                serde_json::to_writer_pretty(file, &report)?;
                info!(
                    location = report.location.as_str(),
                    report = %out_path.display(),
                    "report written"
                );
                reports.push(report);
            }
            Err(e) => {
                failures += 1;
                error!(file = %path.display(), "analysis failed: {e}");
            }
        }
    }

    if reports.is_empty() {
        bail!("all {failures} location(s) failed");
    }

    let comparison = pipeline::compare_locations(&reports);
    for site in &comparison {
        info!(
            "{}: mean GHI {:.1}, DNI {:.1}, DHI {:.1} W/m^2",
            site.location, site.ghi, site.dni, site.dhi
        );
    }
    let comparison_path = args.out_dir.join("comparison.json");
    serde_json::to_writer_pretty(File::create(&comparison_path)?, &comparison)?;

    info!(
        "processed {} location(s), {} failure(s) in {:.2} seconds",
        reports.len(),
        failures,
        total_start.elapsed().as_secs_f32()
    );
    Ok(())
}
