//! Numerical utilities: least squares, lag polynomials, simplex search.

pub mod ols;
pub mod optimize;
pub mod poly;

pub use ols::*;
pub use optimize::*;
