//! Seasonal ARIMA fitting and forecasting.
//!
//! The pipeline only talks to the narrow [`SarimaBackend`] trait, so the
//! estimator can be swapped (or mocked in tests) without touching the
//! dashboard code.

pub mod forecaster;
pub mod sarima;

pub use forecaster::*;
pub use sarima::*;

use crate::domain::{FitDiagnostics, ModelConfig, PriceSeries};
use crate::error::PipelineError;

pub trait SarimaBackend {
    /// Opaque fitted state, owned by the pass that produced it.
    type Model;

    /// Fit `config` against the whole series.
    ///
    /// Must return `FitDivergence` (and no other error kind) when the
    /// configuration cannot be estimated.
    fn fit(&self, series: &PriceSeries, config: &ModelConfig) -> Result<Self::Model, PipelineError>;

    /// `horizon` point forecasts continuing the fitted series.
    fn forecast(&self, model: &Self::Model, horizon: usize) -> Result<Vec<f64>, PipelineError>;

    fn diagnostics(&self, _model: &Self::Model) -> Option<FitDiagnostics> {
        None
    }
}
