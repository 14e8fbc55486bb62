//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - installs file logging
//! - runs the dashboard or a single headless forecast pass

use clap::Parser;
use tracing::{error, info};

use crate::cli::{Command, ForecastArgs, RunArgs};
use crate::error::AppError;
use crate::model::CssBackend;
use crate::report::SUCCESS_MESSAGE;

pub mod logging;
pub mod pipeline;

use pipeline::Session;

/// Entry point for the `sarima` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env is fine; flags and the process environment still apply.
    let _ = dotenvy::dotenv();

    // We want `sarima` and `sarima -p 2` to behave like `sarima tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Tui(args) => handle_tui(args),
        Command::Forecast(args) => handle_forecast(args),
    }
}

fn handle_tui(args: RunArgs) -> Result<(), AppError> {
    logging::init(&args.log_file)?;
    info!(source = %args.data.source(), "starting dashboard");
    crate::tui::run(&args)
}

fn handle_forecast(args: ForecastArgs) -> Result<(), AppError> {
    logging::init(&args.run.log_file)?;

    let controls = args.run.controls();
    let backend = CssBackend::new(args.run.fit_settings());
    let mut session = Session::new(args.run.data.source());

    let result = pipeline::run_pass(&mut session, &backend, &controls.config, controls.horizon)
        .and_then(|out| out.run.map(|run| (out.series, run)));
    let (series, run) = match result {
        Ok(ok) => ok,
        Err(err) => {
            error!(error = %err, "headless forecast failed");
            return Err(err.into());
        }
    };

    println!("{}", crate::report::format_run_summary(session.source(), &series, &run));

    if !args.no_plot {
        let plot = crate::plot::render_overlay(&series, Some(&run.forecast), args.width, args.height);
        println!("{plot}");
    }

    println!("{}", crate::report::format_forecast_table(&run.forecast));

    if let Some(path) = &args.export {
        crate::report::write_forecast_csv(path, &run.forecast)?;
        println!("Forecast written to {}", path.display());
    }

    println!("{SUCCESS_MESSAGE}");
    Ok(())
}

/// Rewrite argv so `sarima` defaults to `sarima tui`.
///
/// Rules:
/// - `sarima`                      -> `sarima tui`
/// - `sarima -p 2 ...`             -> `sarima tui -p 2 ...`
/// - `sarima --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "tui" | "forecast");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
