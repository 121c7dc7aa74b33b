//! Fetch-source trait, raw response points and transport errors.
//!
//! The MetricSource trait abstracts over where metric responses come from (the
//! live HTTP API, canned fixtures) so the metrics client can be exercised
//! without a network.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// One raw time-series point as returned by the analytics API.
///
/// Wire form is `{"t": <unix seconds>, "v": <value>}`; some endpoints send the
/// value under `"o"` instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPoint {
    #[serde(rename = "t")]
    pub timestamp: i64,
    #[serde(rename = "v", alias = "o")]
    pub value: RawValue,
}

impl RawPoint {
    pub fn scalar(timestamp: i64, value: f64) -> Self {
        Self {
            timestamp,
            value: RawValue::Scalar(value),
        }
    }

    pub fn tuple(timestamp: i64, values: Vec<f64>) -> Self {
        Self {
            timestamp,
            value: RawValue::Tuple(values),
        }
    }
}

/// The value half of a point: a single number or a fixed-arity tuple.
///
/// Object-valued points (`{"price": .., "score": ..}`) are read as tuples in
/// document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireValue", untagged)]
pub enum RawValue {
    Scalar(f64),
    Tuple(Vec<f64>),
}

impl RawValue {
    /// Number of numeric fields carried by this value.
    pub fn arity(&self) -> usize {
        match self {
            RawValue::Scalar(_) => 1,
            RawValue::Tuple(values) => values.len(),
        }
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            RawValue::Scalar(v) => Some(*v),
            RawValue::Tuple(_) => None,
        }
    }

    /// Positional view of the fields.
    pub fn fields(&self) -> &[f64] {
        match self {
            RawValue::Scalar(v) => std::slice::from_ref(v),
            RawValue::Tuple(values) => values,
        }
    }
}

/// Everything the API has been seen to put in a value slot.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireValue {
    Null,
    Number(f64),
    Array(Vec<Option<f64>>),
    Object(serde_json::Map<String, serde_json::Value>),
}

impl TryFrom<WireValue> for RawValue {
    type Error = String;

    fn try_from(wire: WireValue) -> Result<Self, Self::Error> {
        match wire {
            WireValue::Null => Ok(RawValue::Scalar(f64::NAN)),
            WireValue::Number(v) => Ok(RawValue::Scalar(v)),
            WireValue::Array(values) => Ok(RawValue::Tuple(
                values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect(),
            )),
            WireValue::Object(fields) => fields
                .into_iter()
                .map(|(key, value)| match value {
                    serde_json::Value::Null => Ok(f64::NAN),
                    other => other
                        .as_f64()
                        .ok_or_else(|| format!("field '{key}' is not numeric: {other}")),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(RawValue::Tuple),
        }
    }
}

/// Transport-level failures reported by a [`MetricSource`].
///
/// URLs carried here never contain the API key.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("network unreachable: {0}")]
    Network(String),

    #[error("response format changed: {0}")]
    Decode(String),

    #[error("http client error: {0}")]
    Client(String),
}

/// The narrow fetch capability the metrics client is built on.
///
/// Implementations own timeouts and retries; the caller sees either the full
/// ordered point list or an error.
pub trait MetricSource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// GET `url` with the given query parameters and decode the JSON array.
    fn fetch(&self, url: &str, params: &[(&str, &str)]) -> Result<Vec<RawPoint>, FetchError>;
}

impl<S: MetricSource + ?Sized> MetricSource for &S {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fetch(&self, url: &str, params: &[(&str, &str)]) -> Result<Vec<RawPoint>, FetchError> {
        (**self).fetch(url, params)
    }
}

impl<S: MetricSource + ?Sized> MetricSource for Arc<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fetch(&self, url: &str, params: &[(&str, &str)]) -> Result<Vec<RawPoint>, FetchError> {
        (**self).fetch(url, params)
    }
}

impl<S: MetricSource + ?Sized> MetricSource for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fetch(&self, url: &str, params: &[(&str, &str)]) -> Result<Vec<RawPoint>, FetchError> {
        (**self).fetch(url, params)
    }
}
