//! Shared domain types.
//!
//! `PriceSeries` is the only type with a construction-time invariant; every
//! other type is a plain value carrier between the pipeline stages.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::calendar;
use crate::error::PipelineError;

/// Daily closing prices on a gap-free business-day index.
///
/// Invariants (checked by [`PriceSeries::new`]):
/// - at least one observation
/// - every date is a business day and each date is the next business day
///   after its predecessor
/// - every close is finite
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    dates: Vec<NaiveDate>,
    closes: Vec<f64>,
}

impl PriceSeries {
    pub fn new(dates: Vec<NaiveDate>, closes: Vec<f64>) -> Result<Self, PipelineError> {
        if dates.len() != closes.len() {
            return Err(PipelineError::DataLoad(format!(
                "{} dates but {} closing prices",
                dates.len(),
                closes.len()
            )));
        }
        if dates.is_empty() {
            return Err(PipelineError::EmptyData(
                "series has zero rows".to_string(),
            ));
        }
        if let Some(d) = dates.iter().find(|d| !calendar::is_business_day(**d)) {
            return Err(PipelineError::DataLoad(format!("{d} is not a business day")));
        }
        for pair in dates.windows(2) {
            if calendar::next_business_day(pair[0]) != pair[1] {
                return Err(PipelineError::DataLoad(format!(
                    "index gap between {} and {}",
                    pair[0], pair[1]
                )));
            }
        }
        if let Some(idx) = closes.iter().position(|c| !c.is_finite()) {
            return Err(PipelineError::DataLoad(format!(
                "non-finite close on {}",
                dates[idx]
            )));
        }
        Ok(Self { dates, closes })
    }

    /// Build a series of consecutive business days ending on `last`.
    pub fn ending_on(last: NaiveDate, closes: Vec<f64>) -> Result<Self, PipelineError> {
        let dates = calendar::business_days_ending(last, closes.len());
        Self::new(dates, closes)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn closes(&self) -> &[f64] {
        &self.closes
    }

    pub fn first_date(&self) -> NaiveDate {
        self.dates[0]
    }

    pub fn last_date(&self) -> NaiveDate {
        self.dates[self.dates.len() - 1]
    }

    pub fn last_close(&self) -> f64 {
        self.closes[self.closes.len() - 1]
    }

    /// Min/max close, for chart bounds.
    pub fn close_range(&self) -> (f64, f64) {
        self.closes
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &c| (lo.min(c), hi.max(c)))
    }
}

/// One predicted business day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// Point forecast contiguous with the history it was fitted on.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Forecast {
    pub points: Vec<ForecastPoint>,
}

impl Forecast {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }
}

/// Read-only summary of a fitted model for display and logging.
#[derive(Debug, Clone, PartialEq)]
pub struct FitDiagnostics {
    /// `(name, value)` per estimated parameter, e.g. `("ar.L1", 0.42)`.
    pub coefficients: Vec<(String, f64)>,
    /// Innovation variance estimate (CSS / effective observations).
    pub sigma2: f64,
    pub css: f64,
    pub aic: f64,
    /// Observations that entered the objective after differencing and lags.
    pub n_effective: usize,
    pub iterations: usize,
    pub converged: bool,
}
