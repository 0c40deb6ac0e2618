//! Dashboard layout and widget rendering.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, Paragraph, Row, Table};

use super::runtime::App;
use super::style;
use crate::forecast::ForecastPoint;

/// Clock layout for axis labels and table rows.
const SHORT_TIME: &str = "%H:%M";

/// Renders the full dashboard frame.
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),  // header
            Constraint::Min(10),    // chart
            Constraint::Length(12), // peak + table
            Constraint::Length(1),  // footer
        ])
        .split(frame.area());

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[2]);

    render_header(frame, app, chunks[0]);
    render_chart(frame, app, chunks[1]);
    render_peak(frame, app, bottom[0]);
    render_table(frame, app, bottom[1]);
    render_footer(frame, app, chunks[3]);
}

/// Header bar: history size, horizon, confidence level.
fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let dataset = app.dataset();
    let header = Line::from(vec![
        Span::styled(
            " OCCUPANCY FORECAST ",
            Style::default()
                .fg(style::HEADER_FG)
                .bg(style::HEADER_BG)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            " │ {} samples @ {} min │ horizon {} min │ {:.0}% CI │ fits {} ",
            dataset.len(),
            dataset.interval().num_minutes(),
            app.horizon_minutes,
            app.settings().confidence_level * 100.0,
            app.refits,
        )),
    ]);
    frame.render_widget(Paragraph::new(header), area);
}

/// Observed load with forecast and confidence bounds appended.
fn render_chart(frame: &mut Frame, app: &App, area: Rect) {
    let load = app.dataset().load();
    let history: Vec<(f64, f64)> = load
        .iter()
        .enumerate()
        .map(|(i, s)| (i as f64, s.electricity_kw))
        .collect();

    let offset = load.len() as f64;
    let points = app.forecast.as_ref().map_or(&[][..], |r| &r.points[..]);
    let project = |f: fn(&ForecastPoint) -> f64| -> Vec<(f64, f64)> {
        points
            .iter()
            .enumerate()
            .map(|(k, p)| (offset + k as f64, f(p)))
            .collect()
    };
    let forecast = project(|p| p.forecast);
    let lower = project(|p| p.lower);
    let upper = project(|p| p.upper);

    let y_bounds = style::auto_bounds_y(&[&history[..], &forecast[..], &lower[..], &upper[..]]);
    let x_hi = (offset + points.len() as f64 - 1.0).max(1.0);

    let first_label = load.first().map(|s| s.timestamp.format(SHORT_TIME).to_string());
    let last_label = points
        .last()
        .map(|p| p.timestamp)
        .or_else(|| load.last().map(|s| s.timestamp))
        .map(|t| t.format(SHORT_TIME).to_string());

    let datasets = vec![
        Dataset::default()
            .name("Load")
            .marker(symbols::Marker::Braille)
            .style(Style::default().fg(style::HISTORY_COLOR))
            .data(&history),
        Dataset::default()
            .name("Forecast")
            .marker(symbols::Marker::Braille)
            .style(Style::default().fg(style::FORECAST_COLOR))
            .data(&forecast),
        Dataset::default()
            .name("Lower CI")
            .marker(symbols::Marker::Dot)
            .style(Style::default().fg(style::BOUND_COLOR))
            .data(&lower),
        Dataset::default()
            .name("Upper CI")
            .marker(symbols::Marker::Dot)
            .style(Style::default().fg(style::BOUND_COLOR))
            .data(&upper),
    ];

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .title(" Electricity Load (kW) ")
                .borders(Borders::ALL),
        )
        .x_axis(
            Axis::default()
                .title("time")
                .bounds([0.0, x_hi])
                .labels(vec![first_label.unwrap_or_default(), last_label.unwrap_or_default()]),
        )
        .y_axis(
            Axis::default()
                .title("kW")
                .bounds(y_bounds)
                .labels(vec![format!("{:.1}", y_bounds[0]), format!("{:.1}", y_bounds[1])]),
        );

    frame.render_widget(chart, area);
}

/// Predicted peak with threshold warning.
fn render_peak(frame: &mut Frame, app: &App, area: Rect) {
    let lines = match app.advisory {
        Some(ref a) => {
            let color = style::peak_color(a.exceeds);
            let mut lines = vec![
                Line::from(format!("  next {} minutes", a.horizon_minutes)),
                Line::from(Span::styled(
                    format!("  {:.2} kW at {}", a.peak_kw, a.at.format(SHORT_TIME)),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                )),
                Line::from(format!("  threshold {:.2} kW", a.threshold_kw)),
            ];
            if let Some(warning) = a.warning() {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    format!("  {warning}"),
                    Style::default().fg(style::PEAK_HIGH),
                )));
            }
            lines
        }
        None => vec![Line::from("  No forecast available")],
    };

    let block = Block::default().title(" Predicted Peak ").borders(Borders::ALL);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Forecast table, one row per step.
fn render_table(frame: &mut Frame, app: &App, area: Rect) {
    let rows: Vec<Row> = app
        .forecast
        .iter()
        .flat_map(|r| r.points.iter())
        .map(|p| {
            Row::new(vec![
                p.timestamp.format(SHORT_TIME).to_string(),
                format!("{:.2}", p.forecast),
                format!("{:.2}", p.lower),
                format!("{:.2}", p.upper),
            ])
        })
        .collect();

    let header = Row::new(vec!["Time", "Forecast (kW)", "Lower CI", "Upper CI"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let widths = [
        Constraint::Length(6),
        Constraint::Length(14),
        Constraint::Length(10),
        Constraint::Length(10),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().title(" Forecast ").borders(Borders::ALL));
    frame.render_widget(table, area);
}

/// Footer with keybinding hints and the latest status message.
fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::styled(
        " q:Quit  +/-:Horizon  e:Export  r:Refit ",
        Style::default().fg(style::FOOTER_FG),
    )];
    if let Some(ref status) = app.status {
        spans.push(Span::styled(
            format!("│ {status}"),
            Style::default().fg(style::STATUS_FG),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
