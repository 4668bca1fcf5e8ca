//! One correlated request/response exchange.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;

use crate::truncate_chars;

/// A single JavaScript call frame from a request initiator stack.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallFrame {
    pub function_name: String,
    pub url: String,
    /// 0-based, as reported by CDP.
    pub line_number: Option<i64>,
    /// 0-based, as reported by CDP.
    pub column_number: Option<i64>,
}

/// HTTP headers in the order the browser reported them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    /// First value for `name`, matched case-insensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for Headers {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for Headers {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Status code recorded for requests that failed before any response arrived.
pub const FAILED_STATUS: i64 = 0;

#[derive(Debug, Clone, Serialize)]
pub struct NetworkLogEntry {
    pub request_id: String,
    pub url: String,
    pub method: String,
    pub resource_type: String,
    /// Wall-clock seconds at dispatch.
    pub start_time: f64,
    /// Monotonic timestamp of the dispatch event, used to place later
    /// monotonic timestamps on the wall clock.
    #[serde(skip)]
    pub request_timestamp: Option<f64>,
    pub end_time: Option<f64>,
    pub status: Option<i64>,
    pub status_text: Option<String>,
    pub mime_type: Option<String>,
    pub error_text: Option<String>,
    pub initiator_type: Option<String>,
    pub request_headers: Headers,
    pub response_headers: Headers,
    pub request_body_preview: Option<String>,
    pub encoded_data_length: Option<f64>,
    pub stack_trace: Vec<CallFrame>,
}

impl NetworkLogEntry {
    pub fn new(request_id: impl Into<String>, url: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            url: url.into(),
            method: method.into(),
            resource_type: "Unknown".to_string(),
            start_time: 0.0,
            request_timestamp: None,
            end_time: None,
            status: None,
            status_text: None,
            mime_type: None,
            error_text: None,
            initiator_type: None,
            request_headers: Headers::default(),
            response_headers: Headers::default(),
            request_body_preview: None,
            encoded_data_length: None,
            stack_trace: Vec::new(),
        }
    }

    pub fn duration_ms(&self) -> Option<f64> {
        let end = self.end_time?;
        Some(((end - self.start_time) * 1000.0).max(0.0))
    }

    pub fn has_stack(&self) -> bool {
        !self.stack_trace.is_empty()
    }

    /// HTTP error status or a transport-level failure.
    pub fn is_error(&self) -> bool {
        self.error_text.is_some() || self.status.is_some_and(|s| s >= 400)
    }

    /// Case-insensitive resource type filter. `All` matches everything.
    pub fn matches_type(&self, filter: &str) -> bool {
        filter.eq_ignore_ascii_case("all") || self.resource_type.eq_ignore_ascii_case(filter)
    }

    pub fn url_contains(&self, pattern_lower: &str) -> bool {
        self.url.to_lowercase().contains(pattern_lower)
    }

    /// Map a monotonic CDP timestamp onto this entry's wall clock.
    pub fn wall_clock(&self, monotonic: f64) -> f64 {
        match self.request_timestamp {
            Some(origin) => self.start_time + (monotonic - origin),
            None => monotonic,
        }
    }

    fn status_label(&self) -> String {
        match (self.status, &self.error_text) {
            (Some(status), _) if status != FAILED_STATUS => status.to_string(),
            (_, Some(error)) => format!("FAILED({})", error),
            _ => "PENDING".to_string(),
        }
    }

    /// `[METHOD] <status|FAILED(reason)|PENDING> URL (type) durationms`
    pub fn summary(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for NetworkLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {} ({})",
            self.method,
            self.status_label(),
            self.url,
            self.resource_type
        )?;
        if let Some(duration) = self.duration_ms() {
            write!(f, " {:.0}ms", duration)?;
        }
        Ok(())
    }
}

/// Request body preview capped at `limit` characters.
pub fn body_preview(post_data: &str, limit: usize) -> String {
    let (head, omitted) = truncate_chars(post_data, limit);
    if omitted == 0 {
        head.to_string()
    } else {
        format!("{}... (truncated {} chars)", head, omitted)
    }
}
