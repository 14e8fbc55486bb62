//! ASCII plotting for headless output.
//!
//! A fixed-size character grid: quick to eyeball in a terminal and
//! deterministic, so tests can assert on exact cells.
//!
//! Plot elements:
//! - historical closes: `·` line
//! - forecast: `*` line, continuing from the last close

use crate::domain::{Forecast, PriceSeries};

const HISTORY: char = '·';
const FORECAST: char = '*';

/// Render history and an optional forecast on a shared business-day axis.
pub fn render_overlay(
    history: &PriceSeries,
    forecast: Option<&Forecast>,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let n_hist = history.len();
    let future: Vec<f64> = forecast.map(Forecast::prices).unwrap_or_default();
    let x_max = (n_hist + future.len()).saturating_sub(1).max(1) as f64;

    let (y_min, y_max) = y_range(history.closes().iter().chain(&future)).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];
    let cell = |i: usize, y: f64| {
        (
            map_x(i as f64, x_max, width),
            map_y(y, y_min, y_max, height),
        )
    };

    // Forecast first: the line drawer never overwrites, so it keeps the
    // cell where both series meet.
    if !future.is_empty() {
        let mut prev = cell(n_hist - 1, history.last_close());
        for (k, &y) in future.iter().enumerate() {
            let next = cell(n_hist + k, y);
            draw_line(&mut grid, prev, next, FORECAST);
            prev = next;
        }
    }

    let mut prev = None;
    for (i, &y) in history.closes().iter().enumerate() {
        let next = cell(i, y);
        match prev {
            Some(p) => draw_line(&mut grid, p, next, HISTORY),
            None => draw_line(&mut grid, next, next, HISTORY),
        }
        prev = Some(next);
    }

    let end = forecast
        .and_then(Forecast::last_date)
        .unwrap_or_else(|| history.last_date());
    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {} .. {end} | price=[{y_min:.2}, {y_max:.2}] | {HISTORY} history  {FORECAST} forecast\n",
        history.first_date()
    ));
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }
    out
}

fn y_range<'a>(values: impl Iterator<Item = &'a f64>) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &y in values {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }
    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else if min_y.is_finite() {
        // Flat series: centre it.
        Some((min_y - 1.0, max_y + 1.0))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_max: f64, width: usize) -> usize {
    let u = (x / x_max).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham); only fills blank cells.
fn draw_line(grid: &mut [Vec<char>], from: (usize, usize), to: (usize, usize), ch: char) {
    let (mut x0, mut y0) = (from.0 as isize, from.1 as isize);
    let (x1, y1) = (to.0 as isize, to.1 as isize);

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
