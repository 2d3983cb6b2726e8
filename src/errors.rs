use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("required column '{column}' is missing from the input header")]
    Schema { column: String },

    #[error("row {row}: failed to parse {column} value '{value}': {message}")]
    Parse {
        row: usize,
        column: String,
        value: String,
        message: String,
    },

    #[error("decomposition needs at least {needed} samples, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("{group} group needs at least 2 observations, got {got}")]
    InsufficientSample { group: &'static str, got: usize },

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
