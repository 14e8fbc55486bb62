//! Price data sources: a CSV on disk or a seeded synthetic series.

pub mod loader;
pub mod sample;

use std::fmt;
use std::path::PathBuf;

pub use loader::{load_price_series, read_price_series};
pub use sample::{generate_sample, SampleSpec};

use crate::domain::PriceSeries;
use crate::error::PipelineError;

/// Where a session's price series comes from. Fixed for the session.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    Csv(PathBuf),
    Demo(SampleSpec),
}

impl DataSource {
    pub fn load(&self) -> Result<PriceSeries, PipelineError> {
        match self {
            DataSource::Csv(path) => load_price_series(path),
            DataSource::Demo(spec) => generate_sample(spec),
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Csv(path) => write!(f, "{}", path.display()),
            DataSource::Demo(spec) => write!(f, "demo (seed {}, {} days)", spec.seed, spec.days),
        }
    }
}
