//! Backend-neutral figure model: a primary axes, an optional twin axes sharing
//! the x-range, and the line series drawn on each.

use chrono::{DateTime, NaiveDateTime};
use ratatui::style::Color;

/// Figure dimensions in terminal cells, plus the nominal label size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FigureSize {
    pub width: u16,
    pub height: u16,
    pub font_size: f32,
}

impl Default for FigureSize {
    fn default() -> Self {
        Self {
            width: 120,
            height: 36,
            font_size: 40.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scale {
    #[default]
    Linear,
    /// Base-10 logarithmic; non-positive values are not drawn.
    Log,
}

impl Scale {
    /// Map a data value into plot space, `None` when it cannot be drawn.
    pub fn forward(self, value: f64) -> Option<f64> {
        match self {
            Scale::Linear => value.is_finite().then_some(value),
            Scale::Log => (value.is_finite() && value > 0.0).then(|| value.log10()),
        }
    }

    /// Map a plot-space value back to data space.
    pub fn inverse(self, value: f64) -> f64 {
        match self {
            Scale::Linear => value,
            Scale::Log => 10f64.powf(value),
        }
    }
}

/// How a series picks its color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stroke {
    /// Next palette color.
    #[default]
    Auto,
    /// The theme's fixed price color.
    Price,
    /// The theme's guide-line color.
    Reference,
    Fixed(Color),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Series {
    pub label: Option<String>,
    pub points: Vec<(f64, f64)>,
    pub stroke: Stroke,
}

impl Series {
    pub fn label(&mut self, label: impl Into<String>) -> &mut Self {
        self.label = Some(label.into());
        self
    }

    pub fn stroke(&mut self, stroke: Stroke) -> &mut Self {
        self.stroke = stroke;
        self
    }
}

/// One set of axes and its series.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Axes {
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub label_size: f32,
    pub tick_label_size: f32,
    pub y_scale: Scale,
    pub y_limits: Option<(f64, f64)>,
    pub legend: bool,
    pub series: Vec<Series>,
}

impl Axes {
    /// Add a line through `points` (x, y).
    pub fn plot(&mut self, points: Vec<(f64, f64)>) -> &mut Series {
        let index = self.series.len();
        self.series.push(Series {
            points,
            ..Series::default()
        });
        &mut self.series[index]
    }

    /// Add a line of `values` against calendar `times`, pairing positionally.
    pub fn plot_times(&mut self, times: &[NaiveDateTime], values: &[f64]) -> &mut Series {
        let points = times
            .iter()
            .zip(values)
            .map(|(t, &v)| (time_to_x(t), v))
            .collect();
        self.plot(points)
    }

    pub fn set_x_label(&mut self, label: impl Into<String>, size: f32) -> &mut Self {
        self.x_label = Some(label.into());
        self.label_size = size;
        self
    }

    pub fn set_y_label(&mut self, label: impl Into<String>, size: f32) -> &mut Self {
        self.y_label = Some(label.into());
        self.label_size = size;
        self
    }

    pub fn set_tick_label_size(&mut self, size: f32) -> &mut Self {
        self.tick_label_size = size;
        self
    }

    pub fn set_y_scale(&mut self, scale: Scale) -> &mut Self {
        self.y_scale = scale;
        self
    }

    pub fn set_y_limits(&mut self, low: f64, high: f64) -> &mut Self {
        self.y_limits = Some((low, high));
        self
    }

    pub fn show_legend(&mut self) -> &mut Self {
        self.legend = true;
        self
    }

    /// Min and max x over all series.
    pub fn x_range(&self) -> Option<(f64, f64)> {
        range(
            self.series
                .iter()
                .flat_map(|s| s.points.iter().map(|&(x, _)| x))
                .filter(|x| x.is_finite()),
        )
    }

    /// Min and max y over all series, in plot space.
    pub fn y_data_range(&self) -> Option<(f64, f64)> {
        let scale = self.y_scale;
        range(
            self.series
                .iter()
                .flat_map(|s| s.points.iter().filter_map(move |&(_, y)| scale.forward(y))),
        )
    }
}

/// A figure: primary axes plus an optional twin sharing the x-range.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Figure {
    pub size: FigureSize,
    pub title: Option<String>,
    pub primary: Axes,
    pub secondary: Option<Axes>,
}

impl Figure {
    pub fn new(size: FigureSize) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    /// The twin axes, created on first use.
    pub fn twin(&mut self) -> &mut Axes {
        self.secondary.get_or_insert_with(Axes::default)
    }

    /// Shared x-range across both axes.
    pub fn x_range(&self) -> Option<(f64, f64)> {
        let primary = self.primary.x_range();
        let secondary = self.secondary.as_ref().and_then(Axes::x_range);
        match (primary, secondary) {
            (Some((a, b)), Some((c, d))) => Some((a.min(c), b.max(d))),
            (one, other) => one.or(other),
        }
    }
}

/// Seconds since the epoch, reading the calendar time as UTC.
pub fn time_to_x(time: &NaiveDateTime) -> f64 {
    time.and_utc().timestamp() as f64
}

pub fn x_to_time(x: f64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp(x as i64, 0).map(|dt| dt.naive_utc())
}

fn range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}
