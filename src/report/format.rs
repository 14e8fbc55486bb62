//! Formatted terminal output for the headless command.
//!
//! Formatting lives here so the pipeline stays presentation-free and output
//! changes stay localized.

use crate::app::pipeline::ForecastRun;
use crate::data::DataSource;
use crate::domain::{FitDiagnostics, Forecast, PriceSeries};

pub const SUCCESS_MESSAGE: &str = "SARIMA forecast generated successfully";

/// Dataset, configuration, and fit diagnostics.
pub fn format_run_summary(source: &DataSource, series: &PriceSeries, run: &ForecastRun) -> String {
    let mut out = String::new();
    let (lo, hi) = series.close_range();

    out.push_str("=== sarima - Stock Price Forecast ===\n");
    out.push_str(&format!("Source: {source}\n"));
    out.push_str(&format!(
        "History: n={} | {} .. {} | close=[{lo:.2}, {hi:.2}] | last={:.2}\n",
        series.len(),
        series.first_date(),
        series.last_date(),
        series.last_close(),
    ));
    out.push_str(&format!(
        "Model: {} | horizon={} business days\n",
        run.config.display(),
        run.horizon
    ));

    if let Some(diag) = &run.diagnostics {
        out.push_str("\nFit diagnostics:\n");
        out.push_str(&format_diagnostics(diag));
    }
    out.push('\n');
    out
}

pub fn format_diagnostics(diag: &FitDiagnostics) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "- sigma2={:.6} AIC={:.3} n={} iterations={}\n",
        diag.sigma2, diag.aic, diag.n_effective, diag.iterations,
    ));
    if diag.coefficients.is_empty() {
        out.push_str("- coefficients: none\n");
    } else {
        let parts: Vec<String> = diag
            .coefficients
            .iter()
            .map(|(name, v)| format!("{name}={v:.6}"))
            .collect();
        out.push_str(&format!("- coefficients: {}\n", parts.join(", ")));
    }
    out
}

/// Two-column forecast table: date and predicted price.
pub fn format_forecast_table(forecast: &Forecast) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<12} {:>16}\n", "Date", "Predicted Price"));
    out.push_str(&format!("{:-<12} {:-<16}\n", "", ""));
    for p in &forecast.points {
        out.push_str(&format!("{:<12} {:>16.4}\n", p.date.to_string(), p.price));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{calendar, ForecastPoint, ModelConfig};
    use chrono::NaiveDate;

    fn forecast() -> Forecast {
        let dates = calendar::business_days_after(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(), 2);
        Forecast {
            points: dates
                .into_iter()
                .zip([150.0, 151.25])
                .map(|(date, price)| ForecastPoint { date, price })
                .collect(),
        }
    }

    #[test]
    fn table_lists_dates_and_prices() {
        let table = format_forecast_table(&forecast());
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Date"));
        assert!(lines[0].ends_with("Predicted Price"));
        assert!(lines[2].starts_with("2024-03-18"));
        assert!(lines[2].ends_with("150.0000"));
        assert!(lines[3].starts_with("2024-03-19"));
        assert!(lines[3].ends_with("151.2500"));
    }

    #[test]
    fn summary_mentions_model_and_diagnostics() {
        let series =
            PriceSeries::ending_on(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(), vec![1.0, 2.0, 3.0])
                .unwrap();
        let run = ForecastRun {
            config: ModelConfig::default(),
            horizon: 2,
            diagnostics: Some(FitDiagnostics {
                coefficients: vec![("ar.L1".to_string(), 0.5)],
                sigma2: 1.0,
                css: 10.0,
                aic: 12.0,
                n_effective: 10,
                iterations: 1000,
                converged: false,
            }),
            forecast: forecast(),
        };
        let out = format_run_summary(&DataSource::Csv("prices.csv".into()), &series, &run);
        assert!(out.contains("Source: prices.csv"));
        assert!(out.contains("SARIMA(5,1,0)(1,1,1,5)"));
        assert!(out.contains("ar.L1=0.500000"));
        assert!(out.contains("last=3.00"));
    }

    #[test]
    fn iteration_cap_stays_out_of_the_summary() {
        let diag = FitDiagnostics {
            coefficients: Vec::new(),
            sigma2: 17.5,
            css: 100.0,
            aic: 13560.0,
            n_effective: 2373,
            iterations: 1000,
            converged: false,
        };
        let out = format_diagnostics(&diag);
        assert!(out.contains("iterations=1000"));
        assert!(!out.contains("iteration cap"));
        assert!(!out.to_lowercase().contains("converge"));
    }
}
