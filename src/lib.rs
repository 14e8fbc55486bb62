//! `sarima-dash` library crate.
//!
//! The binary (`sarima`) is a thin wrapper around this library so that:
//!
//! - the load -> fit -> forecast pipeline is testable without a terminal
//! - the dashboard and the headless command share one code path

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod math;
pub mod model;
pub mod plot;
pub mod report;
pub mod tui;
