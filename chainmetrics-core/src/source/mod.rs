//! Where raw metric points come from.

pub mod fixture;
pub mod http;
pub mod provider;

pub use fixture::{RecordedRequest, StaticSource};
pub use http::{redacted_url, HttpConfig, HttpSource};
pub use provider::{FetchError, MetricSource, RawPoint, RawValue};
