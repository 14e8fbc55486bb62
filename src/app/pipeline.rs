//! Shared forecast pipeline used by both the TUI and the headless command.
//!
//! One pass runs: load (memoized) -> fit -> forecast. The front-ends only
//! deal with presentation (widgets vs printed text).

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::data::DataSource;
use crate::domain::{FitDiagnostics, Forecast, ModelConfig, PriceSeries};
use crate::error::PipelineError;
use crate::model::{forecast_series, SarimaBackend};

/// Per-session state: the fixed data source and its memoized series.
#[derive(Debug)]
pub struct Session {
    source: DataSource,
    series: Option<Arc<PriceSeries>>,
    loads: usize,
}

impl Session {
    pub fn new(source: DataSource) -> Self {
        Self {
            source,
            series: None,
            loads: 0,
        }
    }

    pub fn source(&self) -> &DataSource {
        &self.source
    }

    /// The session's price series, loading it on first use.
    ///
    /// Failed loads are not memoized, so the next call retries the source.
    pub fn series(&mut self) -> Result<Arc<PriceSeries>, PipelineError> {
        if let Some(series) = &self.series {
            return Ok(Arc::clone(series));
        }
        let started = Instant::now();
        let series = Arc::new(self.source.load()?);
        self.loads += 1;
        info!(
            source = %self.source,
            rows = series.len(),
            first = %series.first_date(),
            last = %series.last_date(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "price series loaded"
        );
        self.series = Some(Arc::clone(&series));
        Ok(series)
    }

    pub fn cached(&self) -> Option<&Arc<PriceSeries>> {
        self.series.as_ref()
    }

    /// Drop the memoized series; the next [`Session::series`] call reloads.
    pub fn clear_cache(&mut self) {
        if self.series.take().is_some() {
            debug!(source = %self.source, "price series cache cleared");
        }
    }

    /// Number of times the source has actually been read.
    pub fn load_count(&self) -> usize {
        self.loads
    }
}

/// Outputs of one successful fit + forecast.
#[derive(Debug, Clone)]
pub struct ForecastRun {
    pub config: ModelConfig,
    pub horizon: usize,
    pub diagnostics: Option<FitDiagnostics>,
    pub forecast: Forecast,
}

/// Everything a pass produced.
///
/// The series is present whenever the source loaded; `run` carries the fit
/// or forecast error so callers can still show the historical chart.
#[derive(Debug, Clone)]
pub struct PassOutput {
    pub series: Arc<PriceSeries>,
    pub run: Result<ForecastRun, PipelineError>,
}

/// Fit `config` to `series` and forecast `horizon` business days.
pub fn fit_and_forecast<B: SarimaBackend>(
    backend: &B,
    series: &PriceSeries,
    config: &ModelConfig,
    horizon: usize,
) -> Result<ForecastRun, PipelineError> {
    let started = Instant::now();
    let model = backend.fit(series, config)?;
    let diagnostics = backend.diagnostics(&model);
    let forecast = forecast_series(backend, series, Some(&model), horizon)?;

    info!(
        config = %config.display(),
        horizon,
        n_obs = series.len(),
        aic = diagnostics.as_ref().map(|d| d.aic),
        converged = diagnostics.as_ref().map(|d| d.converged),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "forecast pass complete"
    );

    Ok(ForecastRun {
        config: *config,
        horizon,
        diagnostics,
        forecast,
    })
}

/// Run one full pass against the session.
///
/// The outer error is a source failure (fatal to the session); fit and
/// forecast failures come back inside [`PassOutput::run`].
pub fn run_pass<B: SarimaBackend>(
    session: &mut Session,
    backend: &B,
    config: &ModelConfig,
    horizon: usize,
) -> Result<PassOutput, PipelineError> {
    let series = session.series()?;
    let run = fit_and_forecast(backend, &series, config, horizon);
    if let Err(err) = &run {
        info!(config = %config.display(), horizon, error = %err, "forecast pass failed");
    }
    Ok(PassOutput { series, run })
}
