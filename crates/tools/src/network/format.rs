//! Human/LLM-readable renderings of log entries.

use super::entry::{Headers, NetworkLogEntry};
use crate::truncate_chars;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailOptions {
    pub include_headers: bool,
    pub include_request_body: bool,
    pub include_response_body: bool,
    /// Character budget for the response body section.
    pub body_length: usize,
}

impl Default for DetailOptions {
    fn default() -> Self {
        Self {
            include_headers: true,
            include_request_body: true,
            include_response_body: false,
            body_length: 4000,
        }
    }
}

pub const BODY_NOT_AVAILABLE: &str = "<not available>";

fn header_block(title: &str, headers: &Headers) -> String {
    let lines: Vec<String> = headers
        .iter()
        .map(|(k, v)| format!("    {}: {}", k, v))
        .collect();
    format!("{}:\n{}", title, lines.join("\n"))
}

/// Multi-line detail block. `response_body` is only consulted when
/// `options.include_response_body` is set; `None` or empty renders as unavailable.
pub fn format_entry_details(
    entry: &NetworkLogEntry,
    options: &DetailOptions,
    response_body: Option<&str>,
) -> String {
    let mut lines = vec![
        format!("Request: [{}] {}", entry.method, entry.url),
        format!("Type: {}", entry.resource_type),
    ];

    if let Some(status) = entry.status {
        match entry.status_text.as_deref().filter(|t| !t.is_empty()) {
            Some(text) => lines.push(format!("Status: {} ({})", status, text)),
            None => lines.push(format!("Status: {}", status)),
        }
    }
    if let Some(error) = entry.error_text.as_deref().filter(|e| !e.is_empty()) {
        lines.push(format!("Error: {}", error));
    }
    if let Some(mime) = entry.mime_type.as_deref().filter(|m| !m.is_empty()) {
        lines.push(format!("MIME: {}", mime));
    }
    if let Some(duration) = entry.duration_ms() {
        lines.push(format!("Duration: {:.0} ms", duration));
    }
    if let Some(size) = entry.encoded_data_length {
        lines.push(format!("Size: {:.0} bytes", size));
    }
    if let Some(initiator) = entry.initiator_type.as_deref().filter(|i| !i.is_empty()) {
        lines.push(format!("Initiator: {}", initiator));
    }

    if options.include_headers && !entry.request_headers.is_empty() {
        lines.push(header_block("Request Headers", &entry.request_headers));
    }
    if options.include_request_body {
        if let Some(preview) = entry.request_body_preview.as_deref().filter(|p| !p.is_empty()) {
            lines.push(format!("Request Body (preview):\n{}", preview));
        }
    }
    if options.include_headers && !entry.response_headers.is_empty() {
        lines.push(header_block("Response Headers", &entry.response_headers));
    }

    if options.include_response_body {
        match response_body.filter(|b| !b.is_empty()) {
            Some(body) => {
                let (head, omitted) = truncate_chars(body, options.body_length);
                if omitted > 0 {
                    lines.push(format!(
                        "Response Body:\n{}\n... (truncated {} chars)",
                        head, omitted
                    ));
                } else {
                    lines.push(format!("Response Body:\n{}", body));
                }
            }
            None => lines.push(format!("Response Body: {}", BODY_NOT_AVAILABLE)),
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completed() -> NetworkLogEntry {
        let mut e = NetworkLogEntry::new("7", "https://api.example.com/v1/items", "POST");
        e.resource_type = "Fetch".to_string();
        e.start_time = 10.0;
        e.end_time = Some(10.120);
        e.status = Some(201);
        e.status_text = Some("Created".to_string());
        e.mime_type = Some("application/json".to_string());
        e.encoded_data_length = Some(512.0);
        e.initiator_type = Some("script".to_string());
        e.request_headers.insert("content-type", "application/json");
        e.response_headers.insert("x-request-id", "abc");
        e.response_headers.insert("cache-control", "no-store");
        e.request_body_preview = Some("{\"name\":\"n\"}".to_string());
        e
    }

    #[test]
    fn test_details_full_block() {
        let text = format_entry_details(&completed(), &DetailOptions::default(), None);
        let expected = [
            "Request: [POST] https://api.example.com/v1/items",
            "Type: Fetch",
            "Status: 201 (Created)",
            "MIME: application/json",
            "Duration: 120 ms",
            "Size: 512 bytes",
            "Initiator: script",
            "Request Headers:\n    content-type: application/json",
            "Request Body (preview):\n{\"name\":\"n\"}",
            "Response Headers:\n    x-request-id: abc\n    cache-control: no-store",
        ]
        .join("\n");
        assert_eq!(text, expected);
    }

    #[test]
    fn test_details_without_headers_or_body() {
        let options = DetailOptions {
            include_headers: false,
            include_request_body: false,
            ..DetailOptions::default()
        };
        let text = format_entry_details(&completed(), &options, None);
        assert!(!text.contains("Headers"));
        assert!(!text.contains("Request Body"));
        assert!(!text.contains("Response Body"));
    }

    #[test]
    fn test_details_failed_request() {
        let mut e = NetworkLogEntry::new("9", "https://api.example.com/x", "GET");
        e.status = Some(0);
        e.error_text = Some("net::ERR_FAILED".to_string());
        let text = format_entry_details(&e, &DetailOptions::default(), None);
        assert!(text.contains("Status: 0"));
        assert!(text.contains("Error: net::ERR_FAILED"));
        assert!(!text.contains("Duration"));
    }

    #[test]
    fn test_response_body_truncated() {
        let options = DetailOptions {
            include_response_body: true,
            body_length: 500,
            ..DetailOptions::default()
        };
        let body = "b".repeat(650);
        let text = format_entry_details(&completed(), &options, Some(&body));
        assert!(text.ends_with("\n... (truncated 150 chars)"));

        let text = format_entry_details(&completed(), &options, Some(""));
        assert!(text.ends_with("Response Body: <not available>"));
    }
}
