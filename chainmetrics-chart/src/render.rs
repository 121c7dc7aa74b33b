//! Figure renderer - draws a `Figure` as a ratatui chart.
//!
//! Displays:
//! - Primary series on the chart's own y-axis
//! - Secondary (twin) series rescaled into the primary plot range
//! - Secondary tick labels in a right-hand gutter
//! - Legend for axes that enable it

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, LegendPosition, Widget},
};

use crate::figure::{x_to_time, Axes, Figure, Stroke};
use crate::theme::Theme;

/// Label sizes at or above this are drawn bold.
const BOLD_LABEL_SIZE: f32 = 14.0;

/// Chart widget for a figure
pub struct FigureView<'a> {
    figure: &'a Figure,
    theme: &'a Theme,
}

impl<'a> FigureView<'a> {
    pub fn new(figure: &'a Figure, theme: &'a Theme) -> Self {
        Self { figure, theme }
    }

    fn label_style(&self, size: f32) -> Style {
        let style = Style::default().fg(self.theme.text);
        if size >= BOLD_LABEL_SIZE {
            style.add_modifier(Modifier::BOLD)
        } else {
            style
        }
    }

    fn tick_style(&self, size: f32) -> Style {
        let style = Style::default().fg(self.theme.axis);
        if size >= BOLD_LABEL_SIZE {
            style.add_modifier(Modifier::BOLD)
        } else {
            style
        }
    }
}

/// A series ready to hand to ratatui, points already in primary plot space.
struct PlotLine {
    name: Option<String>,
    color: ratatui::style::Color,
    points: Vec<(f64, f64)>,
}

impl<'a> Widget for FigureView<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let size = self.figure.size;
        let area = Rect {
            width: area.width.min(size.width),
            height: area.height.min(size.height),
            ..area
        };
        let primary = &self.figure.primary;
        let secondary = self.figure.secondary.as_ref();

        let x_bounds = padded_x(self.figure.x_range());
        let y_bounds = primary_bounds(primary);
        let twin_bounds = secondary.and_then(|axes| axes.y_data_range().map(pad_range));

        let mut palette_index = 0;
        let mut lines = Vec::new();
        collect_lines(primary, self.theme, &mut palette_index, &mut lines, |y| {
            primary.y_scale.forward(y)
        });
        if let (Some(axes), Some((lo, hi))) = (secondary, twin_bounds) {
            collect_lines(axes, self.theme, &mut palette_index, &mut lines, |y| {
                let v = axes.y_scale.forward(y)?;
                Some(y_bounds.0 + (v - lo) / (hi - lo) * (y_bounds.1 - y_bounds.0))
            });
        }

        let datasets: Vec<Dataset> = lines
            .iter()
            .map(|line| {
                let dataset = Dataset::default()
                    .marker(symbols::Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(line.color))
                    .data(&line.points);
                match &line.name {
                    Some(name) => dataset.name(name.clone()),
                    None => dataset,
                }
            })
            .collect();

        // Right-hand gutter for the twin's ticks and title
        let twin_labels: Vec<String> = match (secondary, twin_bounds) {
            (Some(axes), Some((lo, hi))) => tick_values(lo, hi)
                .into_iter()
                .map(|v| format_tick(axes.y_scale.inverse(v)))
                .collect(),
            _ => Vec::new(),
        };
        let twin_title = secondary.and_then(|axes| axes.y_label.as_deref());
        let gutter = if secondary.is_some() {
            twin_labels
                .iter()
                .map(String::len)
                .chain(twin_title.map(str::len))
                .max()
                .map_or(0, |w| w as u16 + 1)
        } else {
            0
        };
        let chart_area = Rect {
            width: area.width.saturating_sub(gutter),
            ..area
        };

        let x_labels: Vec<Span> = tick_values(x_bounds.0, x_bounds.1)
            .into_iter()
            .map(|x| {
                let text = x_to_time(x)
                    .map(|t| t.format("%Y-%m-%d").to_string())
                    .unwrap_or_default();
                Span::styled(text, self.tick_style(primary.tick_label_size))
            })
            .collect();
        let y_labels: Vec<Span> = tick_values(y_bounds.0, y_bounds.1)
            .into_iter()
            .map(|v| {
                Span::styled(
                    format_tick(primary.y_scale.inverse(v)),
                    self.tick_style(primary.tick_label_size),
                )
            })
            .collect();

        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.axis))
            .style(Style::default().bg(self.theme.background));
        if let Some(title) = &self.figure.title {
            block = block.title(format!(" {title} "));
        }

        let mut x_axis = Axis::default()
            .style(Style::default().fg(self.theme.axis))
            .bounds([x_bounds.0, x_bounds.1])
            .labels(x_labels);
        if let Some(label) = &primary.x_label {
            x_axis = x_axis.title(Span::styled(label.clone(), self.label_style(primary.label_size)));
        }
        let mut y_axis = Axis::default()
            .style(Style::default().fg(self.theme.axis))
            .bounds([y_bounds.0, y_bounds.1])
            .labels(y_labels);
        if let Some(label) = &primary.y_label {
            y_axis = y_axis.title(Span::styled(label.clone(), self.label_style(primary.label_size)));
        }

        let legend = primary.legend || secondary.is_some_and(|axes| axes.legend);
        let chart = Chart::new(datasets)
            .block(block.clone())
            .x_axis(x_axis)
            .y_axis(y_axis)
            .legend_position(legend.then_some(LegendPosition::TopRight));
        chart.render(chart_area, buf);

        if gutter == 0 {
            return;
        }
        let Some(axes) = secondary else { return };

        // Chart has no second y-axis. Approximate the plot rows as the block
        // inner area minus the title row and the bottom axis rows.
        let inner = block.inner(chart_area);
        let gutter_x = chart_area.right();
        let plot_top = inner.y + 1;
        let plot_bottom = inner.bottom().saturating_sub(3);
        if plot_bottom <= plot_top || gutter_x >= area.right() {
            return;
        }

        if let Some(title) = twin_title {
            buf.set_string(gutter_x, inner.y, title, self.label_style(axes.label_size));
        }
        let rows = twin_labels.len().saturating_sub(1).max(1) as f64;
        for (i, label) in twin_labels.iter().enumerate() {
            let frac = i as f64 / rows;
            let y = plot_bottom - (frac * f64::from(plot_bottom - plot_top)).round() as u16;
            buf.set_string(gutter_x, y, label, self.tick_style(axes.tick_label_size));
        }
    }
}

/// Draw `figure` into an off-screen buffer of the figure's size.
pub fn render_to_buffer(figure: &Figure) -> Buffer {
    let area = Rect::new(0, 0, figure.size.width, figure.size.height);
    let mut buf = Buffer::empty(area);
    FigureView::new(figure, &Theme::default()).render(area, &mut buf);
    buf
}

fn collect_lines(
    axes: &Axes,
    theme: &Theme,
    palette_index: &mut usize,
    out: &mut Vec<PlotLine>,
    map_y: impl Fn(f64) -> Option<f64>,
) {
    for series in &axes.series {
        let color = match series.stroke {
            Stroke::Auto => {
                let color = theme.series_color(*palette_index);
                *palette_index += 1;
                color
            }
            Stroke::Price => theme.price,
            Stroke::Reference => theme.reference,
            Stroke::Fixed(color) => color,
        };
        let points = series
            .points
            .iter()
            .filter(|(x, _)| x.is_finite())
            .filter_map(|&(x, y)| map_y(y).map(|y| (x, y)))
            .collect();
        out.push(PlotLine {
            name: series.label.clone().filter(|_| axes.legend),
            color,
            points,
        });
    }
}

fn primary_bounds(axes: &Axes) -> (f64, f64) {
    let limits = axes.y_limits.and_then(|(lo, hi)| {
        let lo = axes.y_scale.forward(lo)?;
        let hi = axes.y_scale.forward(hi)?;
        (lo < hi).then_some((lo, hi))
    });
    limits.unwrap_or_else(|| axes.y_data_range().map_or((0.0, 1.0), pad_range))
}

/// Widen by 5% on each side, or by one unit when flat.
fn pad_range((lo, hi): (f64, f64)) -> (f64, f64) {
    let span = hi - lo;
    let pad = if span > 0.0 { span * 0.05 } else { 1.0 };
    (lo - pad, hi + pad)
}

fn padded_x(range: Option<(f64, f64)>) -> (f64, f64) {
    const HALF_DAY: f64 = 43_200.0;
    match range {
        Some((lo, hi)) if hi > lo => (lo, hi),
        Some((lo, _)) => (lo - HALF_DAY, lo + HALF_DAY),
        None => (0.0, 1.0),
    }
}

fn tick_values(lo: f64, hi: f64) -> Vec<f64> {
    vec![lo, (lo + hi) / 2.0, hi]
}

fn format_tick(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude >= 1_000_000.0 {
        format!("{value:.2e}")
    } else if magnitude >= 1_000.0 {
        format!("{value:.0}")
    } else if magnitude >= 1.0 {
        format!("{value:.2}")
    } else {
        format!("{value:.3}")
    }
}
