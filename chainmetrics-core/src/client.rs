//! Metrics client: one call per supported metric, each returning a fresh table.
//!
//! The client owns an injected [`MetricSource`] and never talks HTTP itself.
//! Periods are validated before the source is touched, so a bad period never
//! costs a request.

use crate::error::MetricsError;
use crate::metric::{Composite, Metric, Shape};
use crate::reshape::{reshape_accumulating, reshape_plain};
use crate::resolution::{IntoResolution, Resolution, TimeBasis};
use crate::source::MetricSource;
use crate::table::MetricTable;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.glassnode.com/";
pub const DEFAULT_COIN: &str = "btc";

/// Transient column holding tuple values before they are split.
const AUX_COLUMN: &str = "aux";

pub struct MetricsClient<S> {
    source: S,
    api_key: String,
    base_url: String,
    time_basis: TimeBasis,
}

impl<S: MetricSource> MetricsClient<S> {
    pub fn new(source: S, api_key: impl Into<String>) -> Self {
        Self {
            source,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            time_basis: TimeBasis::default(),
        }
    }

    /// Point the client at another API origin. A trailing slash is added when
    /// missing.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        self.base_url = base_url;
        self
    }

    pub fn with_time_basis(mut self, basis: TimeBasis) -> Self {
        self.time_basis = basis;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn time_basis(&self) -> TimeBasis {
        self.time_basis
    }

    /// Full endpoint URL for a metric.
    pub fn metric_url(&self, metric: Metric) -> String {
        format!("{}{}", self.base_url, metric.path())
    }

    /// Fetch any catalogue metric.
    pub fn fetch_metric(
        &self,
        metric: Metric,
        coin: &str,
        period: impl IntoResolution,
    ) -> Result<MetricTable, MetricsError> {
        let resolution = period.into_resolution()?;
        self.fetch_resolved(metric, coin, resolution)
    }

    /// Fetch both operands of a composite, left first, and inner-join them on
    /// time.
    pub fn fetch_composite(
        &self,
        composite: Composite,
        coin: &str,
        period: impl IntoResolution,
    ) -> Result<MetricTable, MetricsError> {
        let resolution = period.into_resolution()?;
        let (left, right) = composite.parts();
        let left = self.fetch_resolved(left, coin, resolution)?;
        let right = self.fetch_resolved(right, coin, resolution)?;
        let joined = left.inner_join(&right);
        debug!(
            composite = %composite,
            left = left.len(),
            right = right.len(),
            joined = joined.len(),
            "joined on time"
        );
        Ok(joined)
    }

    fn fetch_resolved(
        &self,
        metric: Metric,
        coin: &str,
        resolution: Resolution,
    ) -> Result<MetricTable, MetricsError> {
        debug!(
            metric = %metric,
            coin,
            period = %resolution,
            source = self.source.name(),
            "fetching metric"
        );
        let points = self.source.fetch(
            &self.metric_url(metric),
            &[("a", coin), ("api_key", self.api_key.as_str())],
        )?;

        let columns = metric.columns();
        match metric.shape() {
            Shape::Plain => reshape_plain(&points, columns, resolution, self.time_basis),
            Shape::Accumulating => {
                reshape_accumulating(&points, columns, resolution, self.time_basis)
            }
            Shape::Paired => {
                let mut table = reshape_plain(
                    &points,
                    &[columns[0], AUX_COLUMN],
                    resolution,
                    self.time_basis,
                )?;
                table.split_tuple_column(AUX_COLUMN, &columns[1..])?;
                Ok(table)
            }
        }
    }

    /// Daily or weekly closing price: `time`, `price`.
    pub fn closing_price(
        &self,
        coin: &str,
        period: impl IntoResolution,
    ) -> Result<MetricTable, MetricsError> {
        self.fetch_metric(Metric::ClosingPrice, coin, period)
    }

    /// `time`, `market cap`.
    pub fn market_cap(
        &self,
        coin: &str,
        period: impl IntoResolution,
    ) -> Result<MetricTable, MetricsError> {
        self.fetch_metric(Metric::MarketCap, coin, period)
    }

    /// `time`, `realized price`.
    pub fn realized_price(
        &self,
        coin: &str,
        period: impl IntoResolution,
    ) -> Result<MetricTable, MetricsError> {
        self.fetch_metric(Metric::RealizedPrice, coin, period)
    }

    /// `time`, `realized cap`.
    pub fn realized_cap(
        &self,
        coin: &str,
        period: impl IntoResolution,
    ) -> Result<MetricTable, MetricsError> {
        self.fetch_metric(Metric::RealizedCap, coin, period)
    }

    /// New non-zero addresses; weekly rows are per-week totals.
    pub fn new_addresses(
        &self,
        coin: &str,
        period: impl IntoResolution,
    ) -> Result<MetricTable, MetricsError> {
        self.fetch_metric(Metric::NewAddresses, coin, period)
    }

    /// Transaction count; weekly rows are per-week totals.
    pub fn number_of_transactions(
        &self,
        coin: &str,
        period: impl IntoResolution,
    ) -> Result<MetricTable, MetricsError> {
        self.fetch_metric(Metric::NumberOfTransactions, coin, period)
    }

    /// `time`, `price`, `score`.
    pub fn accumulation_trend_score_and_price(
        &self,
        coin: &str,
        period: impl IntoResolution,
    ) -> Result<MetricTable, MetricsError> {
        self.fetch_metric(Metric::AccumulationTrendScore, coin, period)
    }

    /// `time`, `pi 1`, `pi 2`.
    pub fn pi_cycle_top(
        &self,
        coin: &str,
        period: impl IntoResolution,
    ) -> Result<MetricTable, MetricsError> {
        self.fetch_metric(Metric::PiCycleTop, coin, period)
    }

    /// Percentage of supply last moved more than a year ago.
    pub fn supply_last_active_over_one_year_ago(
        &self,
        coin: &str,
        period: impl IntoResolution,
    ) -> Result<MetricTable, MetricsError> {
        self.fetch_metric(Metric::SupplyActiveOverOneYear, coin, period)
    }

    pub fn price_realized_price(
        &self,
        coin: &str,
        period: impl IntoResolution,
    ) -> Result<MetricTable, MetricsError> {
        self.fetch_composite(Composite::PriceRealizedPrice, coin, period)
    }

    pub fn new_addresses_and_price(
        &self,
        coin: &str,
        period: impl IntoResolution,
    ) -> Result<MetricTable, MetricsError> {
        self.fetch_composite(Composite::NewAddressesAndPrice, coin, period)
    }

    pub fn supply_last_active_over_one_year_ago_and_price(
        &self,
        coin: &str,
        period: impl IntoResolution,
    ) -> Result<MetricTable, MetricsError> {
        self.fetch_composite(Composite::SupplyActiveOverOneYearAndPrice, coin, period)
    }

    pub fn pi_cycle_top_and_price(
        &self,
        coin: &str,
        period: impl IntoResolution,
    ) -> Result<MetricTable, MetricsError> {
        self.fetch_composite(Composite::PiCycleTopAndPrice, coin, period)
    }
}
