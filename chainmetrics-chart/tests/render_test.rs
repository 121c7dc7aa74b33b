//! Charts built from fetched tables, rendered off-screen.

use chainmetrics_chart::{
    impermanent_loss_figure, render_to_buffer, with_price_overlay, FigureSize, Scale,
};
use chainmetrics_core::{
    ColumnData, Metric, MetricTable, MetricsClient, RawPoint, StaticSource, TimeBasis,
    TIME_COLUMN,
};
use ratatui::buffer::Buffer;

const DAY: i64 = 86_400;
/// 2024-01-01 00:00:00 UTC, a Monday.
const MONDAY: i64 = 1_704_067_200;

fn series(values: impl Iterator<Item = f64>) -> Vec<RawPoint> {
    values
        .enumerate()
        .map(|(i, v)| RawPoint::scalar(MONDAY + i as i64 * DAY, v))
        .collect()
}

fn buffer_text(buf: &Buffer) -> String {
    let mut content = String::new();
    for y in 0..buf.area.height {
        for x in 0..buf.area.width {
            content.push_str(buf.cell((x, y)).unwrap().symbol());
        }
        content.push('\n');
    }
    content
}

#[test]
fn metric_against_price_overlay() {
    let source = StaticSource::new()
        .with_route(
            Metric::ClosingPrice.path(),
            series((1..=28).map(|i| 40_000.0 + f64::from(i) * 250.0)),
        )
        .with_route(
            Metric::NewAddresses.path(),
            series((1..=28).map(|i| 400_000.0 + f64::from(i % 7) * 1_000.0)),
        );
    let client = MetricsClient::new(&source, "k").with_time_basis(TimeBasis::utc());
    let table = client.new_addresses_and_price("btc", "week").unwrap();
    assert_eq!(table.len(), 4);

    let size = FigureSize::default();
    let mut figure = with_price_overlay(table.times(), table.scalar("price").unwrap(), size);
    figure
        .primary
        .set_y_label("new addresses", size.font_size)
        .show_legend()
        .plot_times(table.times(), table.scalar("number of new addresses").unwrap())
        .label("number of new addresses");

    let twin = figure.secondary.as_ref().unwrap();
    assert_eq!(twin.y_scale, Scale::Log);
    assert_eq!(twin.series[0].points.len(), 4);

    let content = buffer_text(&render_to_buffer(&figure));
    assert!(content.contains("time"), "{content}");
    assert!(content.contains("price"), "{content}");
    assert!(content.contains("new addresses"), "{content}");
    assert!(content.contains("2024-01-"), "{content}");
}

#[test]
fn impermanent_loss_legend_names_both_assets() {
    let times = (0..10)
        .map(|i| TimeBasis::utc().to_calendar(MONDAY + i * DAY).unwrap())
        .collect();
    let ratio = |scale: f64| ColumnData::Scalar((0..10).map(|i| 1.0 + scale * f64::from(i)).collect());
    let table = MetricTable::new(TIME_COLUMN, times)
        .with_column("to x", ratio(0.05))
        .unwrap()
        .with_column("to y", ratio(-0.04))
        .unwrap()
        .with_column("to 50/50", ratio(0.005))
        .unwrap();

    let figure = impermanent_loss_figure(&table, "ETH", "USDC", FigureSize::default()).unwrap();
    let content = buffer_text(&render_to_buffer(&figure));

    assert!(content.contains("to ETH"), "{content}");
    assert!(content.contains("to USDC"), "{content}");
    assert!(content.contains("to 50/50"), "{content}");
    assert!(content.contains("price"), "{content}");
}
