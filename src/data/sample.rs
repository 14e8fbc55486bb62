//! Synthetic closing-price series for running without a CSV.

use std::f64::consts::TAU;

use chrono::{Datelike, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{calendar, PriceSeries};
use crate::error::PipelineError;

/// Shape of the generated series.
///
/// Prices follow a geometric random walk with a small weekday pattern on top,
/// so period-5 seasonal terms have something to find.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSpec {
    pub seed: u64,
    /// Number of business days.
    pub days: usize,
    pub end_date: NaiveDate,
    pub start_price: f64,
    /// Daily log drift.
    pub drift: f64,
    /// Daily log volatility.
    pub volatility: f64,
    /// Relative size of the weekday pattern.
    pub weekly_amplitude: f64,
}

impl Default for SampleSpec {
    fn default() -> Self {
        Self {
            seed: 42,
            days: 750,
            end_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap_or_default(),
            start_price: 150.0,
            drift: 0.0003,
            volatility: 0.015,
            weekly_amplitude: 0.004,
        }
    }
}

pub fn generate_sample(spec: &SampleSpec) -> Result<PriceSeries, PipelineError> {
    if spec.days == 0 {
        return Err(PipelineError::EmptyData("sample day count must be > 0".to_string()));
    }
    if !(spec.start_price.is_finite() && spec.start_price > 0.0) {
        return Err(PipelineError::DataLoad(
            "sample start price must be positive".to_string(),
        ));
    }
    if !(spec.volatility.is_finite() && spec.volatility >= 0.0 && spec.drift.is_finite()) {
        return Err(PipelineError::DataLoad(
            "invalid sample drift/volatility".to_string(),
        ));
    }

    let mut rng = StdRng::seed_from_u64(spec.seed);
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| PipelineError::DataLoad(format!("noise distribution error: {e}")))?;

    let dates = calendar::business_days_ending(spec.end_date, spec.days);
    let sigma = spec.volatility;
    let mut log_price = spec.start_price.ln();
    let mut closes = Vec::with_capacity(dates.len());

    for (i, date) in dates.iter().enumerate() {
        if i > 0 {
            // Ito correction keeps the expected price on the drift path.
            let z: f64 = normal.sample(&mut rng);
            log_price += spec.drift - 0.5 * sigma * sigma + sigma * z;
        }
        let weekday = f64::from(date.weekday().num_days_from_monday());
        let pattern = 1.0 + spec.weekly_amplitude * (TAU * weekday / 5.0).sin();
        // Round to cents like a quoted close.
        closes.push((log_price.exp() * pattern * 100.0).round() / 100.0);
    }

    PriceSeries::new(dates, closes)
}
