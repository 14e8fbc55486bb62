//! Plotters-powered price chart widget for Ratatui.
//!
//! Plotters draws the axes and line series; titles, legend and date ticks are
//! drawn by the surrounding Ratatui layout. Output goes into the Ratatui
//! buffer through `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// Colour of the historical close line.
pub const HISTORY_COLOR: Color = Color::Cyan;
/// Colour of the forecast line.
pub const FORECAST_COLOR: Color = Color::Red;

/// A render-only chart description.
///
/// All series and bounds are computed outside the render call; `render()`
/// only draws.
pub struct PriceChart<'a> {
    /// `(business-day index, close)` for the history.
    pub history: &'a [(f64, f64)],
    /// `(business-day index, price)` for the forecast, starting at the last
    /// historical point so the two lines join. Empty for the plain chart.
    pub forecast: &'a [(f64, f64)],
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub y_label: &'a str,
    pub fmt_y: fn(f64) -> String,
}

impl<'a> Widget for PriceChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to build a chart in a tiny area.
        if area.width < 20 || area.height < 6 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let x0 = self.x_bounds[0];
        let x1 = self.x_bounds[1];
        let y0 = self.y_bounds[0];
        let y1 = self.y_bounds[1];

        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            // Dates are drawn by the caller; Plotters only sees the index.
            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .y_desc(self.y_label)
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|_| String::new())
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            let history_color = RGBColor(0, 255, 255); // cyan
            let forecast_color = RGBColor(255, 0, 0); // red

            chart.draw_series(LineSeries::new(self.history.iter().copied(), &history_color))?;
            if !self.forecast.is_empty() {
                chart.draw_series(LineSeries::new(self.forecast.iter().copied(), &forecast_color))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}
