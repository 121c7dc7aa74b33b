//! Raw point lists to metric tables at daily or weekly resolution.
//!
//! Two flavours:
//! - plain: weekly keeps the Sunday rows as they are.
//! - accumulating: for counts the API reports per day, weekly rows carry the
//!   sum over the seven days ending on that Sunday instead.

use crate::error::MetricsError;
use crate::resolution::{Resolution, TimeBasis, WEEK_END};
use crate::source::{RawPoint, RawValue};
use crate::table::{ColumnData, MetricTable};
use chrono::Datelike;
use tracing::debug;

/// Days summed into one weekly row of an accumulating metric.
pub const WEEK_WINDOW: usize = 7;

/// Build a table from `points` without accumulation.
///
/// `columns` is the time column name followed by the value column names.
/// With one value column the value lands there as-is (a tuple value gives a
/// tuple column); with several, every value is spread across them by position.
pub fn reshape_plain(
    points: &[RawPoint],
    columns: &[&str],
    resolution: Resolution,
    basis: TimeBasis,
) -> Result<MetricTable, MetricsError> {
    let daily = daily_table(points, columns, basis)?;
    Ok(match resolution {
        Resolution::Daily => daily,
        Resolution::Weekly => keep_week_ends(&daily),
    })
}

/// Build a table from `points`, turning weekly rows into trailing 7-day sums.
///
/// Daily resolution is identical to [`reshape_plain`]. The last value column
/// must be scalar.
pub fn reshape_accumulating(
    points: &[RawPoint],
    columns: &[&str],
    resolution: Resolution,
    basis: TimeBasis,
) -> Result<MetricTable, MetricsError> {
    let mut daily = daily_table(points, columns, basis)?;
    if resolution == Resolution::Daily {
        return Ok(daily);
    }

    // daily_table guarantees at least one value column
    let target = columns[columns.len() - 1];
    let sums = {
        let values = daily.scalar(target).ok_or_else(|| {
            MetricsError::Shape(format!("accumulating column '{target}' must hold single values"))
        })?;
        trailing_week_sums(values)
    };
    daily.replace_column(target, ColumnData::Scalar(sums))?;

    Ok(keep_week_ends(&daily))
}

/// Sum of each value and up to six values before it.
///
/// The first six entries sum everything from the start of the series, so a
/// short series never reaches back past index 0. Missing (NaN) days are
/// skipped; a window of missing days only sums to zero.
pub fn trailing_week_sums(values: &[f64]) -> Vec<f64> {
    (0..values.len())
        .map(|i| {
            let start = i.saturating_sub(WEEK_WINDOW - 1);
            values[start..=i].iter().filter(|v| !v.is_nan()).sum()
        })
        .collect()
}

fn daily_table(
    points: &[RawPoint],
    columns: &[&str],
    basis: TimeBasis,
) -> Result<MetricTable, MetricsError> {
    let (time_name, value_names) = columns.split_first().ok_or_else(|| {
        MetricsError::InvalidArgument("column names must start with the time column".into())
    })?;
    if value_names.is_empty() {
        return Err(MetricsError::InvalidArgument(
            "at least one value column name is required".into(),
        ));
    }

    let times = points
        .iter()
        .map(|p| basis.to_calendar(p.timestamp))
        .collect::<Result<Vec<_>, _>>()?;
    let mut table = MetricTable::new(*time_name, times);

    if let [name] = value_names {
        let all_scalar = points
            .iter()
            .all(|p| matches!(p.value, RawValue::Scalar(_)));
        let data = if all_scalar {
            ColumnData::Scalar(points.iter().map(|p| p.value.fields()[0]).collect())
        } else {
            ColumnData::Tuple(points.iter().map(|p| p.value.fields().to_vec()).collect())
        };
        table.push_column(*name, data)?;
    } else {
        let width = value_names.len();
        if let Some((row, p)) = points
            .iter()
            .enumerate()
            .find(|(_, p)| !is_missing(&p.value) && p.value.arity() != width)
        {
            return Err(MetricsError::Shape(format!(
                "point {row} has {} fields but {width} value columns were named",
                p.value.arity()
            )));
        }
        for (pos, name) in value_names.iter().enumerate() {
            let values = points
                .iter()
                .map(|p| {
                    if is_missing(&p.value) {
                        f64::NAN
                    } else {
                        p.value.fields()[pos]
                    }
                })
                .collect();
            table.push_column(*name, ColumnData::Scalar(values))?;
        }
    }

    debug!(rows = table.len(), columns = ?table.column_names(), "daily table built");
    Ok(table)
}

/// A null point: decoded as a single NaN whatever the metric's arity.
fn is_missing(value: &RawValue) -> bool {
    matches!(value, RawValue::Scalar(v) if v.is_nan())
}

fn keep_week_ends(daily: &MetricTable) -> MetricTable {
    let weekly = daily.filter_by_time(|t| t.weekday() == WEEK_END);
    debug!(daily = daily.len(), weekly = weekly.len(), "kept week-ending rows");
    weekly
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    const DAY: i64 = 86_400;
    /// 2024-01-01 00:00:00 UTC, a Monday.
    const MONDAY: i64 = 1_704_067_200;

    fn daily_points(values: &[f64]) -> Vec<RawPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| RawPoint::scalar(MONDAY + i as i64 * DAY, v))
            .collect()
    }

    #[test]
    fn daily_is_one_row_per_point_in_order() {
        let points = daily_points(&[1.0, 2.0, 3.0]);
        let table =
            reshape_plain(&points, &["time", "price"], Resolution::Daily, TimeBasis::utc())
                .unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.column_names(), vec!["time", "price"]);
        assert_eq!(table.scalar("price").unwrap(), &[1.0, 2.0, 3.0]);
        assert!(table.times().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn weekly_keeps_only_sundays() {
        let values: Vec<f64> = (0..21).map(f64::from).collect();
        let points = daily_points(&values);
        let table =
            reshape_plain(&points, &["time", "price"], Resolution::Weekly, TimeBasis::utc())
                .unwrap();

        assert_eq!(table.len(), 3);
        assert!(table.times().iter().all(|t| t.weekday() == Weekday::Sun));
        assert_eq!(table.scalar("price").unwrap(), &[6.0, 13.0, 20.0]);
    }

    #[test]
    fn accumulating_daily_is_untouched() {
        let points = daily_points(&[5.0, 6.0, 7.0]);
        let table = reshape_accumulating(
            &points,
            &["time", "number of transactions"],
            Resolution::Daily,
            TimeBasis::utc(),
        )
        .unwrap();
        assert_eq!(table.scalar("number of transactions").unwrap(), &[5.0, 6.0, 7.0]);
    }

    #[test]
    fn first_sunday_sums_whole_week_from_start() {
        let points = daily_points(&[10.0, 15.0, 9.0, 12.0, 20.0, 11.0, 30.0]);
        let table = reshape_accumulating(
            &points,
            &["time", "number of new addresses"],
            Resolution::Weekly,
            TimeBasis::utc(),
        )
        .unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.times()[0].weekday(), Weekday::Sun);
        assert_eq!(table.scalar("number of new addresses").unwrap(), &[107.0]);
    }

    #[test]
    fn later_sundays_sum_trailing_seven_days() {
        let values: Vec<f64> = (1..=14).map(f64::from).collect();
        let points = daily_points(&values);
        let table = reshape_accumulating(
            &points,
            &["time", "count"],
            Resolution::Weekly,
            TimeBasis::utc(),
        )
        .unwrap();

        // index 6 -> 1..=7, index 13 -> 8..=14
        assert_eq!(table.scalar("count").unwrap(), &[28.0, 77.0]);
    }

    #[test]
    fn short_window_at_series_start() {
        assert_eq!(trailing_week_sums(&[1.0, 2.0, 3.0]), vec![1.0, 3.0, 6.0]);
        assert!(trailing_week_sums(&[]).is_empty());
    }

    #[test]
    fn missing_days_are_skipped_in_the_window() {
        let sums = trailing_week_sums(&[1.0, f64::NAN, 2.0, 3.0]);
        assert_eq!(sums, vec![1.0, 1.0, 3.0, 6.0]);
        assert_eq!(trailing_week_sums(&[f64::NAN]), vec![0.0]);
    }

    #[test]
    fn weekly_sum_over_a_null_day_stays_numeric() {
        let points = daily_points(&[1.0, f64::NAN, 1.0, 1.0, 1.0, 1.0, 1.0]);
        let table = reshape_accumulating(
            &points,
            &["time", "count"],
            Resolution::Weekly,
            TimeBasis::utc(),
        )
        .unwrap();
        assert_eq!(table.scalar("count").unwrap(), &[6.0]);
    }

    #[test]
    fn null_point_spreads_nan_across_named_columns() {
        let points = vec![
            RawPoint::scalar(MONDAY, f64::NAN),
            RawPoint::tuple(MONDAY + DAY, vec![1.0, 2.0]),
        ];
        let table = reshape_plain(
            &points,
            &["time", "pi 1", "pi 2"],
            Resolution::Daily,
            TimeBasis::utc(),
        )
        .unwrap();
        assert!(table.scalar("pi 1").unwrap()[0].is_nan());
        assert!(table.scalar("pi 2").unwrap()[0].is_nan());
        assert_eq!(table.scalar("pi 2").unwrap()[1], 2.0);
    }

    #[test]
    fn window_slides_after_six() {
        let sums = trailing_week_sums(&[1.0; 10]);
        assert_eq!(sums, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 7.0, 7.0, 7.0]);
    }

    #[test]
    fn pair_values_make_a_tuple_column() {
        let points = vec![RawPoint::tuple(MONDAY, vec![100.0, 0.7])];
        let table =
            reshape_plain(&points, &["time", "aux"], Resolution::Daily, TimeBasis::utc())
                .unwrap();
        assert_eq!(
            table.column("aux"),
            Some(&ColumnData::Tuple(vec![vec![100.0, 0.7]]))
        );
    }

    #[test]
    fn several_value_names_spread_tuples() {
        let points = vec![RawPoint::tuple(MONDAY, vec![1.0, 2.0])];
        let table = reshape_plain(
            &points,
            &["time", "pi 1", "pi 2"],
            Resolution::Daily,
            TimeBasis::utc(),
        )
        .unwrap();
        assert_eq!(table.scalar("pi 2").unwrap(), &[2.0]);
    }

    #[test]
    fn arity_mismatch_is_a_shape_error() {
        let points = vec![RawPoint::scalar(MONDAY, 1.0)];
        let err = reshape_plain(
            &points,
            &["time", "a", "b"],
            Resolution::Daily,
            TimeBasis::utc(),
        )
        .unwrap_err();
        assert!(matches!(err, MetricsError::Shape(_)));
    }

    #[test]
    fn accumulating_tuples_are_rejected() {
        let points = vec![RawPoint::tuple(MONDAY, vec![1.0, 2.0])];
        let err = reshape_accumulating(
            &points,
            &["time", "aux"],
            Resolution::Weekly,
            TimeBasis::utc(),
        )
        .unwrap_err();
        assert!(matches!(err, MetricsError::Shape(_)));
    }

    #[test]
    fn missing_value_columns_are_invalid() {
        let points = daily_points(&[1.0]);
        assert!(matches!(
            reshape_plain(&points, &["time"], Resolution::Daily, TimeBasis::utc()),
            Err(MetricsError::InvalidArgument(_))
        ));
        assert!(matches!(
            reshape_plain(&points, &[], Resolution::Daily, TimeBasis::utc()),
            Err(MetricsError::InvalidArgument(_))
        ));
    }

    #[test]
    fn empty_response_gives_empty_table() {
        let table =
            reshape_plain(&[], &["time", "price"], Resolution::Weekly, TimeBasis::utc()).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.column_names(), vec!["time", "price"]);
    }
}
