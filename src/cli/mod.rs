//! Command-line parsing for the SARIMA forecasting dashboard.
//!
//! Argument parsing and command dispatch stay separate from the modeling code;
//! this module only turns flags into domain values.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::data::{DataSource, SampleSpec};
use crate::domain::{Controls, ModelConfig, DEFAULT_HORIZON};
use crate::model::FitSettings;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "sarima", version, about = "Seasonal ARIMA stock price forecasting dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive dashboard (default).
    Tui(RunArgs),
    /// Fit once and print the summary, an ASCII plot, and the forecast table.
    Forecast(ForecastArgs),
}

/// Where the price series comes from.
#[derive(Debug, Args, Clone)]
pub struct DataArgs {
    /// Price CSV with `Date` and `Close` columns.
    #[arg(short = 'f', long, env = "SARIMA_DATA", default_value = "P625 DATASET.csv")]
    pub data: PathBuf,

    /// Use a seeded synthetic series instead of the CSV.
    #[arg(long)]
    pub demo: bool,

    /// Seed for `--demo` data.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Business days of `--demo` data.
    #[arg(long, default_value_t = 750, value_parser = clap::value_parser!(u32).range(1..=20_000))]
    pub demo_days: u32,
}

impl DataArgs {
    pub fn source(&self) -> DataSource {
        if self.demo {
            DataSource::Demo(SampleSpec {
                seed: self.seed,
                days: self.demo_days as usize,
                ..SampleSpec::default()
            })
        } else {
            DataSource::Csv(self.data.clone())
        }
    }
}

/// Seasonal ARIMA order `(p,d,q)(P,D,Q,m)`.
///
/// Ranges mirror the dashboard controls; clap rejects anything outside them.
#[derive(Debug, Args, Clone)]
pub struct OrderArgs {
    /// Non-seasonal AR order.
    #[arg(short = 'p', default_value_t = 5, value_parser = clap::value_parser!(u8).range(0..=5))]
    pub p: u8,

    /// Non-seasonal differencing order.
    #[arg(short = 'd', default_value_t = 1, value_parser = clap::value_parser!(u8).range(0..=2))]
    pub d: u8,

    /// Non-seasonal MA order.
    #[arg(short = 'q', default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=5))]
    pub q: u8,

    /// Seasonal AR order.
    #[arg(short = 'P', default_value_t = 1, value_parser = clap::value_parser!(u8).range(0..=2))]
    pub seasonal_p: u8,

    /// Seasonal differencing order.
    #[arg(short = 'D', default_value_t = 1, value_parser = clap::value_parser!(u8).range(0..=2))]
    pub seasonal_d: u8,

    /// Seasonal MA order.
    #[arg(short = 'Q', default_value_t = 1, value_parser = clap::value_parser!(u8).range(0..=2))]
    pub seasonal_q: u8,

    /// Seasonal period in business days.
    #[arg(short = 'm', long = "period", default_value_t = 5, value_parser = clap::value_parser!(u8).range(5..=30))]
    pub period: u8,
}

impl OrderArgs {
    pub fn config(&self) -> ModelConfig {
        ModelConfig {
            p: usize::from(self.p),
            d: usize::from(self.d),
            q: usize::from(self.q),
            seasonal_p: usize::from(self.seasonal_p),
            seasonal_d: usize::from(self.seasonal_d),
            seasonal_q: usize::from(self.seasonal_q),
            period: usize::from(self.period),
        }
    }
}

/// Options shared by the dashboard and the headless command.
#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub order: OrderArgs,

    /// Forecast horizon in business days.
    #[arg(long, default_value_t = DEFAULT_HORIZON as u8, value_parser = clap::value_parser!(u8).range(1..=60))]
    pub horizon: u8,

    /// Optimizer iteration cap per fit.
    #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_iter: u32,

    /// Log file (the terminal is reserved for the dashboard).
    #[arg(long, env = "SARIMA_LOG", default_value = "sarima.log")]
    pub log_file: PathBuf,
}

impl RunArgs {
    pub fn controls(&self) -> Controls {
        Controls {
            config: self.order.config(),
            horizon: usize::from(self.horizon),
        }
    }

    pub fn fit_settings(&self) -> FitSettings {
        FitSettings {
            max_iter: self.max_iter as usize,
            ..FitSettings::default()
        }
    }
}

/// Headless forecast options.
#[derive(Debug, Args, Clone)]
pub struct ForecastArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Also write the forecast table to a CSV file.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(args)
    }

    #[test]
    fn defaults_match_dashboard_controls() {
        let cli = parse(&["sarima", "tui", "--demo"]).unwrap();
        let Command::Tui(args) = cli.command else {
            panic!("expected tui");
        };
        assert_eq!(args.controls(), Controls::default());
        assert_eq!(args.fit_settings().max_iter, 1000);
        assert!(matches!(args.data.source(), DataSource::Demo(_)));
    }

    #[test]
    fn order_flags_build_config() {
        let cli = parse(&[
            "sarima", "forecast", "-p", "2", "-d", "0", "-q", "1", "-P", "0", "-D", "0", "-Q", "2",
            "-m", "10", "--horizon", "7", "--data", "prices.csv",
        ])
        .unwrap();
        let Command::Forecast(args) = cli.command else {
            panic!("expected forecast");
        };
        let controls = args.run.controls();
        assert_eq!(controls.config.display(), "SARIMA(2,0,1)(0,0,2,10)");
        assert_eq!(controls.horizon, 7);
        assert_eq!(args.run.data.source(), DataSource::Csv(PathBuf::from("prices.csv")));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        assert!(parse(&["sarima", "forecast", "-p", "6"]).is_err());
        assert!(parse(&["sarima", "forecast", "-D", "3"]).is_err());
        assert!(parse(&["sarima", "forecast", "-m", "4"]).is_err());
        assert!(parse(&["sarima", "forecast", "-m", "31"]).is_err());
        assert!(parse(&["sarima", "forecast", "--horizon", "0"]).is_err());
        assert!(parse(&["sarima", "forecast", "--horizon", "61"]).is_err());
    }
}
