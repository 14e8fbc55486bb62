//! Export the forecast table to CSV for spreadsheets or downstream scripts.

use std::path::Path;

use crate::domain::Forecast;
use crate::error::AppError;

/// Write `date,price` rows, one per forecast business day.
pub fn write_forecast_csv(path: &Path, forecast: &Forecast) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| {
        AppError::export(format!("Failed to create export CSV '{}': {e}", path.display()))
    })?;
    for point in &forecast.points {
        writer
            .serialize(point)
            .map_err(|e| AppError::export(format!("Failed to write export CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::export(format!("Failed to flush export CSV: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{calendar, ForecastPoint};
    use crate::error::PipelineError;
    use chrono::NaiveDate;

    #[test]
    fn writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forecast.csv");
        let dates = calendar::business_days_after(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(), 2);
        let forecast = Forecast {
            points: dates
                .into_iter()
                .map(|date| ForecastPoint { date, price: 150.5 })
                .collect(),
        };

        write_forecast_csv(&path, &forecast).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "date,price\n2024-03-18,150.5\n2024-03-19,150.5\n");
    }

    #[test]
    fn unwritable_path_has_its_own_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("forecast.csv");
        let err = write_forecast_csv(&path, &Forecast::default()).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_EXPORT);
        assert_ne!(err.exit_code(), PipelineError::DataLoad(String::new()).exit_code());
    }
}
