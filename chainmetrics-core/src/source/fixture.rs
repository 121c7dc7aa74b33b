//! Canned responses for offline use and tests.
//!
//! `StaticSource` answers any URL ending in a registered metric path with the
//! stored points and keeps a log of every request it served, so callers can
//! assert on what would have gone over the wire.

use super::provider::{FetchError, MetricSource, RawPoint};
use std::collections::BTreeMap;
use std::sync::Mutex;

/// A request observed by [`StaticSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub url: String,
    pub params: Vec<(String, String)>,
}

/// In-memory [`MetricSource`] keyed by metric sub-path.
#[derive(Debug, Default)]
pub struct StaticSource {
    routes: BTreeMap<String, Vec<RawPoint>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the points served for URLs ending in `path`.
    pub fn with_route(mut self, path: impl Into<String>, points: Vec<RawPoint>) -> Self {
        self.routes.insert(path.into(), points);
        self
    }

    /// Every request served so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().map(|log| log.len()).unwrap_or(0)
    }
}

impl MetricSource for StaticSource {
    fn name(&self) -> &str {
        "static"
    }

    fn fetch(&self, url: &str, params: &[(&str, &str)]) -> Result<Vec<RawPoint>, FetchError> {
        if let Ok(mut log) = self.requests.lock() {
            log.push(RecordedRequest {
                url: url.to_string(),
                params: params
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            });
        }

        self.routes
            .iter()
            .find(|(path, _)| url.ends_with(path.as_str()))
            .map(|(_, points)| points.clone())
            .ok_or_else(|| FetchError::Status {
                status: 404,
                url: url.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serves_registered_route_and_records_request() {
        let source = StaticSource::new()
            .with_route("v1/metrics/market/price_usd_close", vec![RawPoint::scalar(0, 1.0)]);

        let points = source
            .fetch(
                "https://api.example/v1/metrics/market/price_usd_close",
                &[("a", "btc")],
            )
            .unwrap();

        assert_eq!(points.len(), 1);
        assert_eq!(source.request_count(), 1);
        assert_eq!(
            source.requests()[0].params,
            vec![("a".to_string(), "btc".to_string())]
        );
    }

    #[test]
    fn unknown_route_is_a_404() {
        let source = StaticSource::new();
        match source.fetch("https://api.example/v1/nope", &[]) {
            Err(FetchError::Status { status, .. }) => assert_eq!(status, 404),
            other => panic!("expected 404, got {other:?}"),
        }
    }
}
