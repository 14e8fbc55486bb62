//! End-to-end pipeline scenarios: CSV on disk -> session -> fit -> forecast.

use std::cell::Cell;
use std::io::Write;

use approx::assert_relative_eq;
use chrono::NaiveDate;
use sarima_dash::app::pipeline::{fit_and_forecast, run_pass, Session};
use sarima_dash::data::{DataSource, SampleSpec};
use sarima_dash::domain::{calendar, ModelConfig, PriceSeries};
use sarima_dash::error::{AppError, PipelineError};
use sarima_dash::model::{CssBackend, SarimaBackend};
use tempfile::NamedTempFile;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn csv_file(body: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(body.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn white_noise() -> ModelConfig {
    ModelConfig {
        p: 0,
        d: 0,
        q: 0,
        seasonal_p: 0,
        seasonal_d: 0,
        seasonal_q: 0,
        period: 5,
    }
}

/// Counts fits and forecasts a fixed value.
struct Counting {
    fits: Cell<usize>,
}

impl SarimaBackend for Counting {
    type Model = f64;

    fn fit(&self, series: &PriceSeries, _: &ModelConfig) -> Result<f64, PipelineError> {
        self.fits.set(self.fits.get() + 1);
        Ok(series.last_close())
    }

    fn forecast(&self, model: &f64, horizon: usize) -> Result<Vec<f64>, PipelineError> {
        Ok(vec![*model; horizon])
    }
}

#[test]
fn constant_series_forecasts_constant_on_next_business_days() {
    let dates = calendar::business_days_ending(ymd(2024, 3, 15), 100);
    let mut body = String::from("Date,Close\n");
    for d in &dates {
        body.push_str(&format!("{d},150.0\n"));
    }
    let file = csv_file(&body);

    let mut session = Session::new(DataSource::Csv(file.path().to_path_buf()));
    let out = run_pass(&mut session, &CssBackend::default(), &white_noise(), 5).unwrap();
    assert_eq!(out.series.len(), 100);

    let run = out.run.unwrap();
    let got: Vec<NaiveDate> = run.forecast.points.iter().map(|p| p.date).collect();
    assert_eq!(
        got,
        vec![ymd(2024, 3, 18), ymd(2024, 3, 19), ymd(2024, 3, 20), ymd(2024, 3, 21), ymd(2024, 3, 22)]
    );
    for p in &run.forecast.points {
        assert_relative_eq!(p.price, 150.0, epsilon = 1e-6);
    }
}

#[test]
fn empty_file_is_empty_data() {
    let file = csv_file("");
    let mut session = Session::new(DataSource::Csv(file.path().to_path_buf()));
    let err = run_pass(&mut session, &CssBackend::default(), &white_noise(), 5).unwrap_err();
    assert!(matches!(err, PipelineError::EmptyData(_)));
    assert_eq!(AppError::from(err).exit_code(), 3);
}

#[test]
fn zero_horizon_is_a_forecast_error() {
    let series = PriceSeries::ending_on(ymd(2024, 3, 15), vec![150.0; 100]).unwrap();
    let err = fit_and_forecast(&CssBackend::default(), &series, &white_noise(), 0).unwrap_err();
    assert!(matches!(err, PipelineError::Forecast(_)));
}

#[test]
fn unsorted_csv_with_gaps_is_normalized() {
    // Friday missing, a Saturday row, rows out of order, one empty close.
    let file = csv_file(
        "Open,Close,Date\n\
         1,12.5,2024-03-19\n\
         1,10.0,2024-03-13\n\
         1,11.0,2024-03-14\n\
         1,99.0,2024-03-16\n\
         1,,2024-03-18\n",
    );
    let mut session = Session::new(DataSource::Csv(file.path().to_path_buf()));
    let series = session.series().unwrap();
    assert_eq!(
        series.dates(),
        &[ymd(2024, 3, 13), ymd(2024, 3, 14), ymd(2024, 3, 15), ymd(2024, 3, 18), ymd(2024, 3, 19)]
    );
    assert_eq!(series.closes(), &[10.0, 11.0, 11.0, 11.0, 12.5]);
}

#[test]
fn session_memoizes_the_load_across_passes() {
    let backend = Counting { fits: Cell::new(0) };
    let mut session = Session::new(DataSource::Demo(SampleSpec {
        days: 30,
        ..SampleSpec::default()
    }));

    for horizon in [1, 5, 30] {
        let out = run_pass(&mut session, &backend, &ModelConfig::default(), horizon).unwrap();
        assert_eq!(out.run.unwrap().forecast.len(), horizon);
    }
    assert_eq!(backend.fits.get(), 3);
    assert_eq!(session.load_count(), 1);

    session.clear_cache();
    run_pass(&mut session, &backend, &ModelConfig::default(), 1).unwrap();
    assert_eq!(session.load_count(), 2);
}

#[test]
fn default_backend_is_deterministic() {
    let series = sarima_dash::data::generate_sample(&SampleSpec {
        days: 250,
        ..SampleSpec::default()
    })
    .unwrap();
    let backend = CssBackend::default();
    let config = ModelConfig::default();

    let a = fit_and_forecast(&backend, &series, &config, 30).unwrap();
    let b = fit_and_forecast(&backend, &series, &config, 30).unwrap();
    let bits = |run: &sarima_dash::app::pipeline::ForecastRun| {
        run.forecast.prices().iter().map(|v| v.to_bits()).collect::<Vec<_>>()
    };
    assert_eq!(bits(&a), bits(&b));
    assert_eq!(a.diagnostics, b.diagnostics);
}

#[test]
fn fit_errors_do_not_drop_the_series() {
    let mut session = Session::new(DataSource::Demo(SampleSpec {
        days: 10,
        ..SampleSpec::default()
    }));
    let out = run_pass(&mut session, &CssBackend::default(), &ModelConfig::default(), 5).unwrap();
    assert_eq!(out.series.len(), 10);
    let err = out.run.unwrap_err();
    assert!(matches!(err, PipelineError::FitDivergence(_)));
    assert_eq!(err.exit_code(), 4);
}
