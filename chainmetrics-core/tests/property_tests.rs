//! Property tests for reshaping invariants.
//!
//! Uses proptest to verify:
//! 1. Daily tables mirror the input one row per point, in order
//! 2. Weekly tables keep exactly the Sunday rows
//! 3. Weekly accumulation equals the trailing (short at the start) 7-day sum
//! 4. Joins only keep times present on both sides

use chainmetrics_core::reshape::{reshape_accumulating, reshape_plain, trailing_week_sums};
use chainmetrics_core::{ColumnData, MetricTable, RawPoint, Resolution, TimeBasis, TIME_COLUMN};
use chrono::{Datelike, Weekday};
use proptest::prelude::*;

const DAY: i64 = 86_400;
/// 2023-01-01 00:00:00 UTC.
const EPOCH_2023: i64 = 1_672_531_200;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_start() -> impl Strategy<Value = i64> {
    (0..3650_i64).prop_map(|d| EPOCH_2023 + d * DAY)
}

fn arb_counts() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec((0..10_000_u32).prop_map(f64::from), 0..60)
}

fn daily_points(start: i64, values: &[f64]) -> Vec<RawPoint> {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| RawPoint::scalar(start + i as i64 * DAY, v))
        .collect()
}

// ── 1. Daily passthrough ─────────────────────────────────────────────

proptest! {
    #[test]
    fn daily_keeps_every_point(start in arb_start(), values in arb_counts()) {
        let points = daily_points(start, &values);
        let table = reshape_plain(&points, &["time", "v"], Resolution::Daily, TimeBasis::utc()).unwrap();

        prop_assert_eq!(table.len(), values.len());
        prop_assert_eq!(table.scalar("v").unwrap(), values.as_slice());
        for (t, p) in table.times().iter().zip(&points) {
            prop_assert_eq!(t.and_utc().timestamp(), p.timestamp);
        }
    }
}

// ── 2. Weekly filter ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn weekly_keeps_exactly_the_sundays(start in arb_start(), values in arb_counts()) {
        let points = daily_points(start, &values);
        let daily = reshape_plain(&points, &["time", "v"], Resolution::Daily, TimeBasis::utc()).unwrap();
        let weekly = reshape_plain(&points, &["time", "v"], Resolution::Weekly, TimeBasis::utc()).unwrap();

        let sundays = daily.times().iter().filter(|t| t.weekday() == Weekday::Sun).count();
        prop_assert_eq!(weekly.len(), sundays);
        prop_assert!(weekly.times().iter().all(|t| t.weekday() == Weekday::Sun));
    }
}

// ── 3. Accumulation ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn weekly_accumulation_is_trailing_sum(start in arb_start(), values in arb_counts()) {
        let points = daily_points(start, &values);
        let daily = reshape_plain(&points, &["time", "v"], Resolution::Daily, TimeBasis::utc()).unwrap();
        let weekly = reshape_accumulating(&points, &["time", "v"], Resolution::Weekly, TimeBasis::utc()).unwrap();

        let sunday_indices: Vec<usize> = daily
            .times()
            .iter()
            .enumerate()
            .filter(|(_, t)| t.weekday() == Weekday::Sun)
            .map(|(i, _)| i)
            .collect();
        prop_assert_eq!(weekly.len(), sunday_indices.len());

        let sums = weekly.scalar("v").unwrap();
        for (row, &i) in sunday_indices.iter().enumerate() {
            let start = if i >= 6 { i - 6 } else { 0 };
            let expected: f64 = values[start..=i].iter().sum();
            prop_assert_eq!(sums[row], expected);
        }
    }

    #[test]
    fn trailing_sums_never_exceed_total(values in arb_counts()) {
        let total: f64 = values.iter().sum();
        let sums = trailing_week_sums(&values);
        prop_assert_eq!(sums.len(), values.len());
        prop_assert!(sums.iter().all(|&s| s <= total));
    }
}

// ── 4. Join ──────────────────────────────────────────────────────────

fn table_from_offsets(offsets: &[i64]) -> MetricTable {
    let times = offsets
        .iter()
        .map(|&o| TimeBasis::utc().to_calendar(EPOCH_2023 + o * DAY).unwrap())
        .collect();
    let values = offsets.iter().map(|&o| o as f64).collect();
    MetricTable::new(TIME_COLUMN, times)
        .with_column("v", ColumnData::Scalar(values))
        .unwrap()
}

fn arb_offsets() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::btree_set(0..40_i64, 0..30).prop_map(|s| s.into_iter().collect())
}

proptest! {
    #[test]
    fn join_rows_are_in_both_inputs(left in arb_offsets(), right in arb_offsets()) {
        let left = table_from_offsets(&left);
        let right = table_from_offsets(&right);
        let joined = left.inner_join(&right);

        prop_assert!(joined.len() <= left.len().min(right.len()));
        for t in joined.times() {
            prop_assert!(left.times().contains(t));
            prop_assert!(right.times().contains(t));
        }
        prop_assert_eq!(joined.scalar("v_x").unwrap(), joined.scalar("v_y").unwrap());
    }
}
