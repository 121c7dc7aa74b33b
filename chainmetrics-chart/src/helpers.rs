//! Canvas helpers for the usual metric charts.
//!
//! `prepare_canvas` gives a primary axes plus a twin sharing its x-range.
//! `with_price_overlay` puts a log-scaled price line on the twin so callers
//! can draw a metric on the primary axes against it.

use chainmetrics_core::MetricTable;
use chrono::NaiveDateTime;
use tracing::debug;

use crate::error::ChartError;
use crate::figure::{time_to_x, Figure, FigureSize, Scale, Stroke};
use crate::terminal::show;

pub const TIME_LABEL: &str = "time";
pub const PRICE_LABEL: &str = "price";

/// Columns read by the impermanent-loss chart.
pub const TO_X_COLUMN: &str = "to x";
pub const TO_Y_COLUMN: &str = "to y";
pub const TO_EVEN_COLUMN: &str = "to 50/50";

/// Empty figure with a twin axes; the primary x-axis is labeled "time".
pub fn prepare_canvas(size: FigureSize) -> Figure {
    let mut figure = Figure::new(size);
    figure
        .primary
        .set_x_label(TIME_LABEL, size.font_size)
        .set_tick_label_size(size.font_size);
    figure.twin().set_tick_label_size(size.font_size);
    figure
}

/// Canvas with `prices` drawn on the twin axes, log-scaled.
pub fn with_price_overlay(times: &[NaiveDateTime], prices: &[f64], size: FigureSize) -> Figure {
    let mut figure = prepare_canvas(size);
    let twin = figure.twin();
    twin.plot_times(times, prices).stroke(Stroke::Price);
    twin.set_y_label(PRICE_LABEL, size.font_size)
        .set_y_scale(Scale::Log);
    figure
}

/// Impermanent-loss chart for a table with `to x`, `to y` and `to 50/50`
/// columns: the three ratios, a zero line, and a flat line at 1.
pub fn impermanent_loss_figure(
    table: &MetricTable,
    label_x: &str,
    label_y: &str,
    size: FigureSize,
) -> Result<Figure, ChartError> {
    let column = |name: &str| {
        table
            .scalar(name)
            .ok_or_else(|| ChartError::MissingColumn(name.to_string()))
    };
    let to_x = column(TO_X_COLUMN)?;
    let to_y = column(TO_Y_COLUMN)?;
    let to_even = column(TO_EVEN_COLUMN)?;

    let times = table.times();
    let (first, last) = match (times.first(), times.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return Err(ChartError::EmptyTable),
    };

    let (low, high) = to_x
        .iter()
        .chain(to_y)
        .chain(to_even)
        .copied()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    let mut figure = Figure::new(size);
    let axes = &mut figure.primary;
    axes.set_x_label(TIME_LABEL, size.font_size)
        .set_y_label(PRICE_LABEL, size.font_size)
        .set_tick_label_size(size.font_size);
    if low <= high {
        axes.set_y_limits(low - 0.1, high + 0.1);
    }

    axes.plot_times(times, &vec![0.0; times.len()])
        .stroke(Stroke::Reference);
    axes.plot_times(times, to_x).label(format!("to {label_x}"));
    axes.plot_times(times, to_y).label(format!("to {label_y}"));
    axes.plot_times(times, to_even).label("to 50/50");
    axes.plot(vec![(time_to_x(&first), 1.0), (time_to_x(&last), 1.0)]);
    axes.show_legend();

    debug!(rows = table.len(), %label_x, %label_y, "impermanent loss figure");
    Ok(figure)
}

/// Build the impermanent-loss chart and show it in the terminal.
pub fn plot_impermanent_loss(
    table: &MetricTable,
    label_x: &str,
    label_y: &str,
    size: FigureSize,
) -> Result<(), ChartError> {
    let figure = impermanent_loss_figure(table, label_x, label_y, size)?;
    show(&figure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainmetrics_core::{ColumnData, TimeBasis, TIME_COLUMN};

    const DAY: i64 = 86_400;
    const START: i64 = 1_704_067_200;

    fn times(n: usize) -> Vec<NaiveDateTime> {
        (0..n)
            .map(|i| TimeBasis::utc().to_calendar(START + i as i64 * DAY).unwrap())
            .collect()
    }

    fn loss_table() -> MetricTable {
        MetricTable::new(TIME_COLUMN, times(3))
            .with_column(TO_X_COLUMN, ColumnData::Scalar(vec![1.0, 1.2, 1.5]))
            .unwrap()
            .with_column(TO_Y_COLUMN, ColumnData::Scalar(vec![1.0, 0.9, 0.4]))
            .unwrap()
            .with_column(TO_EVEN_COLUMN, ColumnData::Scalar(vec![1.0, 1.05, 0.95]))
            .unwrap()
    }

    #[test]
    fn canvas_labels_time_and_sizes_twin_ticks() {
        let figure = prepare_canvas(FigureSize::default());
        assert_eq!(figure.primary.x_label.as_deref(), Some("time"));
        let twin = figure.secondary.as_ref().unwrap();
        assert_eq!(twin.tick_label_size, 40.0);
        assert!(twin.series.is_empty());
    }

    #[test]
    fn price_overlay_is_log_scaled_on_the_twin() {
        let prices = [100.0, 1000.0, 10000.0];
        let figure = with_price_overlay(&times(3), &prices, FigureSize::default());

        let twin = figure.secondary.as_ref().unwrap();
        assert_eq!(twin.y_scale, Scale::Log);
        assert_eq!(twin.y_label.as_deref(), Some("price"));
        assert_eq!(twin.series.len(), 1);
        assert_eq!(twin.series[0].stroke, Stroke::Price);
        assert_eq!(twin.series[0].points.len(), 3);
        assert!(figure.primary.series.is_empty());
    }

    #[test]
    fn impermanent_loss_limits_pad_observed_range() {
        let figure = impermanent_loss_figure(&loss_table(), "ETH", "USDC", FigureSize::default())
            .unwrap();
        let (low, high) = figure.primary.y_limits.unwrap();
        assert!((low - 0.3).abs() < 1e-9);
        assert!((high - 1.6).abs() < 1e-9);
        assert!(figure.primary.legend);
        assert_eq!(figure.primary.y_label.as_deref(), Some("price"));
        assert!(figure.secondary.is_none());
    }

    #[test]
    fn impermanent_loss_draws_ratios_and_both_guides() {
        let figure = impermanent_loss_figure(&loss_table(), "ETH", "USDC", FigureSize::default())
            .unwrap();
        let series = &figure.primary.series;
        assert_eq!(series.len(), 5);

        assert_eq!(series[0].stroke, Stroke::Reference);
        assert!(series[0].points.iter().all(|&(_, y)| y == 0.0));

        let labels: Vec<_> = series.iter().filter_map(|s| s.label.as_deref()).collect();
        assert_eq!(labels, vec!["to ETH", "to USDC", "to 50/50"]);

        let flat = &series[4];
        assert_eq!(flat.points.len(), 2);
        assert!(flat.points.iter().all(|&(_, y)| y == 1.0));
        assert_eq!(flat.points[0].0, series[1].points[0].0);
        assert_eq!(flat.points[1].0, series[1].points[2].0);
    }

    #[test]
    fn impermanent_loss_requires_all_columns() {
        let table = MetricTable::new(TIME_COLUMN, times(1))
            .with_column(TO_X_COLUMN, ColumnData::Scalar(vec![1.0]))
            .unwrap();
        let err = impermanent_loss_figure(&table, "a", "b", FigureSize::default()).unwrap_err();
        assert!(matches!(err, ChartError::MissingColumn(ref c) if c == "to y"));
    }

    #[test]
    fn impermanent_loss_rejects_empty_table() {
        let table = MetricTable::new(TIME_COLUMN, Vec::new())
            .with_column(TO_X_COLUMN, ColumnData::Scalar(vec![]))
            .unwrap()
            .with_column(TO_Y_COLUMN, ColumnData::Scalar(vec![]))
            .unwrap()
            .with_column(TO_EVEN_COLUMN, ColumnData::Scalar(vec![]))
            .unwrap();
        let err = impermanent_loss_figure(&table, "a", "b", FigureSize::default()).unwrap_err();
        assert!(matches!(err, ChartError::EmptyTable));
    }
}
