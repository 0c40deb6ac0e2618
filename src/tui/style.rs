//! Color constants and auto-scaling helpers for the dashboard.

use ratatui::style::Color;

/// Observed load line color.
pub const HISTORY_COLOR: Color = Color::Cyan;
/// Point forecast line color.
pub const FORECAST_COLOR: Color = Color::Yellow;
/// Confidence bound line color.
pub const BOUND_COLOR: Color = Color::DarkGray;
/// Peak callout color below the threshold.
pub const PEAK_OK: Color = Color::Green;
/// Peak callout color above the threshold.
pub const PEAK_HIGH: Color = Color::Red;
/// Header bar foreground.
pub const HEADER_FG: Color = Color::White;
/// Header bar background.
pub const HEADER_BG: Color = Color::DarkGray;
/// Footer help text color.
pub const FOOTER_FG: Color = Color::DarkGray;
/// Status message color.
pub const STATUS_FG: Color = Color::Magenta;

/// Returns the peak callout color.
pub fn peak_color(exceeds: bool) -> Color {
    if exceeds { PEAK_HIGH } else { PEAK_OK }
}

/// Computes Y-axis bounds across every chart series with 10% padding.
pub fn auto_bounds_y(series: &[&[(f64, f64)]]) -> [f64; 2] {
    let all = series.iter().flat_map(|s| s.iter()).map(|&(_, y)| y);
    let min = all.clone().fold(f64::INFINITY, f64::min);
    let max = all.fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return [-1.0, 1.0];
    }
    let range = (max - min).max(0.1);
    let pad = range * 0.1;
    [min - pad, max + pad]
}
