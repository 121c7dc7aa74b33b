//! chainmetrics core: on-chain and market metrics as tables.
//!
//! - Metric catalogue: endpoint path, output columns and reshape rule per metric
//! - Fetch sources: the `MetricSource` seam, a blocking HTTP source, canned fixtures
//! - Reshaping: daily/weekly tables, trailing 7-day sums for count metrics
//! - `MetricTable`: ordered rows, pair splitting, inner join on time, Polars export
//! - `MetricsClient`: one operation per metric plus the joined composites
//! - TOML settings

pub mod client;
pub mod config;
pub mod error;
pub mod metric;
pub mod reshape;
pub mod resolution;
pub mod source;
pub mod table;

pub use client::{MetricsClient, DEFAULT_BASE_URL, DEFAULT_COIN};
pub use config::Settings;
pub use error::{ConfigError, MetricsError};
pub use metric::{Composite, Metric, Shape};
pub use resolution::{IntoResolution, Resolution, TimeBasis, WEEK_END};
pub use source::{FetchError, HttpConfig, HttpSource, MetricSource, RawPoint, RawValue, StaticSource};
pub use table::{ColumnData, MetricTable, TableColumn, TIME_COLUMN};
