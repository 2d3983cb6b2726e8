pub mod cleaning;
pub mod cleaning_impact;
pub mod config;
pub mod correlation;
pub mod errors;
pub mod loader;
pub mod pipeline;
pub mod quality;
pub mod stats;
pub mod summary;
pub mod table;
pub mod timeseries;
pub mod wind;

#[cfg(test)]
mod tests;
