use anyhow::Result;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::stats::TestKind;
use crate::timeseries::ResampleFrequency;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutlierMethod {
    Iqr,
    ZScore,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub outlier_method: OutlierMethod,
    pub iqr_multiplier: f64,
    pub zscore_threshold: f64,
    pub test_kind: TestKind,
    pub resample_frequency: ResampleFrequency,
    /// Samples per seasonal cycle for the decomposition of the resampled
    /// module series; at least two full cycles of data are required.
    pub seasonal_period: usize,
    pub wind_sectors: usize,
    pub top_pairs: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            outlier_method: OutlierMethod::Iqr,
            iqr_multiplier: 1.5,
            zscore_threshold: 3.0,
            test_kind: TestKind::Welch,
            resample_frequency: ResampleFrequency::Daily,
            seasonal_period: 30,
            wind_sectors: 16,
            top_pairs: 5,
        }
    }
}

impl AnalysisConfig {
    #[allow(dead_code)]
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(k) = std::env::var("EDA_IQR_MULTIPLIER") {
            config.iqr_multiplier = k.parse()?;
        }

        if let Ok(z) = std::env::var("EDA_ZSCORE_THRESHOLD") {
            config.zscore_threshold = z.parse()?;
        }

        if let Ok(period) = std::env::var("EDA_SEASONAL_PERIOD") {
            config.seasonal_period = period.parse()?;
        }

        if let Ok(sectors) = std::env::var("EDA_WIND_SECTORS") {
            config.wind_sectors = sectors.parse()?;
        }

        Ok(config)
    }
}
