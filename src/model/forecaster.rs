//! Dated point forecasts from a fitted model.

use crate::domain::{calendar, Forecast, ForecastPoint, PriceSeries};
use crate::error::PipelineError;
use crate::model::SarimaBackend;

/// Forecast `horizon` business days past the end of `series`.
///
/// `model` is `None` when fitting did not complete in this pass; that is a
/// forecast error, as is a zero horizon or a non-finite prediction.
pub fn forecast_series<B: SarimaBackend>(
    backend: &B,
    series: &PriceSeries,
    model: Option<&B::Model>,
    horizon: usize,
) -> Result<Forecast, PipelineError> {
    if horizon == 0 {
        return Err(PipelineError::Forecast(
            "horizon must be at least 1 business day".to_string(),
        ));
    }
    let model = model.ok_or_else(|| {
        PipelineError::Forecast("no fitted model is available".to_string())
    })?;

    let values = backend.forecast(model, horizon)?;
    if values.len() != horizon {
        return Err(PipelineError::Forecast(format!(
            "backend returned {} values for a {horizon}-day horizon",
            values.len()
        )));
    }
    if let Some(step) = values.iter().position(|v| !v.is_finite()) {
        return Err(PipelineError::Forecast(format!(
            "prediction for step {} is not finite",
            step + 1
        )));
    }

    let dates = calendar::business_days_after(series.last_date(), horizon);
    Ok(Forecast {
        points: dates
            .into_iter()
            .zip(values)
            .map(|(date, price)| ForecastPoint { date, price })
            .collect(),
    })
}
