//! Reporting: formatted summaries, forecast tables, and CSV export.

pub mod export;
mod format;

pub use export::write_forecast_csv;
pub use format::*;
