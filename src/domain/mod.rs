//! Domain model: price series, forecasts, model configuration, calendar.

pub mod calendar;
pub mod params;
pub mod types;

pub use params::*;
pub use types::*;
