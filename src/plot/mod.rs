//! Text-mode charts for the headless command.

pub mod ascii;

pub use ascii::render_overlay;
