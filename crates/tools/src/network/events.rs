//! Typed `Network.*` events consumed by the correlator.
//!
//! Decoding is lenient: only `requestId` is mandatory, everything else
//! degrades to `None`/empty so a partial event still updates what it can.

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use super::entry::Headers;

pub const REQUEST_WILL_BE_SENT: &str = "Network.requestWillBeSent";
pub const RESPONSE_RECEIVED: &str = "Network.responseReceived";
pub const LOADING_FAILED: &str = "Network.loadingFailed";
pub const LOADING_FINISHED: &str = "Network.loadingFinished";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestPayload {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub headers: Map<String, Value>,
    #[serde(default)]
    pub post_data: Option<String>,
}

/// Network.requestWillBeSent
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestWillBeSent {
    pub request_id: String,
    #[serde(default)]
    pub request: RequestPayload,
    #[serde(default, rename = "type")]
    pub resource_type: Option<String>,
    /// Monotonic seconds.
    #[serde(default)]
    pub timestamp: Option<f64>,
    /// Epoch seconds.
    #[serde(default)]
    pub wall_time: Option<f64>,
    #[serde(default)]
    pub initiator: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePayload {
    #[serde(default)]
    pub status: Option<i64>,
    #[serde(default)]
    pub status_text: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    /// Absent and empty are different: only a present map replaces headers.
    #[serde(default)]
    pub headers: Option<Map<String, Value>>,
    /// Epoch milliseconds.
    #[serde(default)]
    pub response_time: Option<f64>,
}

/// Network.responseReceived
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseReceived {
    pub request_id: String,
    #[serde(default)]
    pub response: ResponsePayload,
}

/// Network.loadingFailed
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadingFailed {
    pub request_id: String,
    #[serde(default)]
    pub error_text: Option<String>,
    #[serde(default)]
    pub timestamp: Option<f64>,
}

/// Network.loadingFinished
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadingFinished {
    pub request_id: String,
    #[serde(default)]
    pub encoded_data_length: Option<f64>,
    #[serde(default)]
    pub timestamp: Option<f64>,
}

/// The closed set of events the correlator understands.
#[derive(Debug, Clone)]
pub enum NetworkEvent {
    Request(RequestWillBeSent),
    Response(ResponseReceived),
    Failed(LoadingFailed),
    Finished(LoadingFinished),
}

impl NetworkEvent {
    /// Decode raw event params. Unknown methods and malformed params yield `None`.
    pub fn from_cdp(method: &str, params: Value) -> Option<Self> {
        let decoded = match method {
            REQUEST_WILL_BE_SENT => serde_json::from_value(params).map(Self::Request),
            RESPONSE_RECEIVED => serde_json::from_value(params).map(Self::Response),
            LOADING_FAILED => serde_json::from_value(params).map(Self::Failed),
            LOADING_FINISHED => serde_json::from_value(params).map(Self::Finished),
            _ => return None,
        };
        match decoded {
            Ok(event) => Some(event),
            Err(e) => {
                debug!(method, "Dropping undecodable network event: {}", e);
                None
            }
        }
    }
}

/// Flatten a CDP header object into display strings, keeping wire order.
pub fn header_map(headers: &Map<String, Value>) -> Headers {
    headers
        .iter()
        .map(|(k, v)| {
            let value = match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (k.clone(), value)
        })
        .collect()
}
