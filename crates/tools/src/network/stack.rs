//! Initiator call stacks.
//!
//! CDP reports the code that triggered a request as a `Runtime.StackTrace`
//! whose `parent` links continue across async boundaries. The chain is
//! flattened innermost-first into one frame list.

use serde_json::Value;

use super::entry::{CallFrame, NetworkLogEntry};

/// Flatten `initiator.stack` (or `initiator.stackTrace`) and all its parents.
/// Anything that is not an object yields no frames.
pub fn extract_initiator_frames(initiator: Option<&Value>) -> Vec<CallFrame> {
    let Some(initiator) = initiator.and_then(Value::as_object) else {
        return Vec::new();
    };

    let mut frames = Vec::new();
    let mut stack = initiator
        .get("stack")
        .filter(|s| !s.is_null())
        .or_else(|| initiator.get("stackTrace"));

    while let Some(current) = stack.and_then(Value::as_object) {
        if let Some(call_frames) = current.get("callFrames").and_then(Value::as_array) {
            frames.extend(call_frames.iter().filter_map(call_frame));
        }
        stack = current.get("parent");
    }
    frames
}

fn call_frame(raw: &Value) -> Option<CallFrame> {
    let raw = raw.as_object()?;
    let text = |key: &str| {
        raw.get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    let number = |key: &str| raw.get(key).and_then(Value::as_f64).map(|n| n as i64);
    Some(CallFrame {
        function_name: text("functionName"),
        url: text("url"),
        line_number: number("lineNumber"),
        column_number: number("columnNumber"),
    })
}

/// Up to `frame_limit` lines of `#i function @ url:line:column`, 1-based positions.
/// Empty when the entry captured no stack.
pub fn format_stack_trace(entry: &NetworkLogEntry, frame_limit: usize) -> String {
    entry
        .stack_trace
        .iter()
        .take(frame_limit)
        .enumerate()
        .map(|(idx, frame)| {
            let function_name = if frame.function_name.is_empty() {
                "(anonymous)"
            } else {
                &frame.function_name
            };
            let url = if frame.url.is_empty() { "<unknown>" } else { &frame.url };
            format!(
                "#{} {} @ {}:{}:{}",
                idx,
                function_name,
                url,
                one_based(frame.line_number),
                one_based(frame.column_number)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn one_based(position: Option<i64>) -> String {
    position.map_or_else(|| "?".to_string(), |p| (p + 1).to_string())
}
