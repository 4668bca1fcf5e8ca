//! Network traffic watchdog.
//!
//! Attaches to targets once, correlates the four `Network.*` lifecycle events
//! into [`NetworkLogEntry`] records and answers queries over the bounded
//! per-target history. Observation is best-effort: every failure here is
//! logged and absorbed, never surfaced to the browsing flow.

use base64::Engine;
use netwatch_core::{NetworkConfig, Result};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::entry::{body_preview, NetworkLogEntry, FAILED_STATUS};
use super::events::{
    header_map, LoadingFailed, LoadingFinished, NetworkEvent, RequestWillBeSent, ResponseReceived,
    LOADING_FAILED, LOADING_FINISHED, REQUEST_WILL_BE_SENT, RESPONSE_RECEIVED,
};
use super::format::{format_entry_details, DetailOptions};
use super::stack::extract_initiator_frames;
use super::store::HistoryStore;
use crate::browser::{short_id, BrowserHost};

/// Returned instead of a body when base64 decoding itself fails.
pub const UNDECODABLE_BODY: &str = "<base64-encoded response body could not be decoded>";

#[derive(Default)]
struct WatchState {
    history: HistoryStore,
    monitored: HashSet<String>,
    /// Targets with an attach in flight; guards against duplicate subscriptions.
    attaching: HashSet<String>,
}

#[derive(Clone)]
pub struct NetworkWatchdog {
    host: Arc<dyn BrowserHost>,
    config: Arc<NetworkConfig>,
    state: Arc<Mutex<WatchState>>,
}

impl NetworkWatchdog {
    pub fn new(host: Arc<dyn BrowserHost>, config: NetworkConfig) -> Self {
        let state = WatchState {
            history: HistoryStore::new(config.max_entries_per_target),
            ..WatchState::default()
        };
        Self {
            host,
            config: Arc::new(config),
            state: Arc::new(Mutex::new(state)),
        }
    }

    fn state(&self) -> MutexGuard<'_, WatchState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ─── Attachment ───────────────────────────────────────────────────

    /// A new tab/target appeared.
    pub async fn on_target_created(&self, target_id: &str) {
        if !target_id.is_empty() {
            self.attach_to_target(target_id).await;
        }
    }

    /// The caller is about to read browser state: make sure whatever target is
    /// focused is being observed, even if its creation was missed.
    pub async fn on_state_request(&self) -> Option<String> {
        let focused = self.host.focused_target().await?;
        self.attach_to_target(&focused.target_id).await;
        Some(focused.target_id)
    }

    /// Start observing a target. Idempotent; failures are logged and the
    /// target stays unmonitored so a later call can retry.
    pub async fn attach_to_target(&self, target_id: &str) {
        {
            let mut state = self.state();
            if state.monitored.contains(target_id) || !state.attaching.insert(target_id.to_string()) {
                return;
            }
        }

        let outcome = self.try_attach(target_id).await;

        let mut state = self.state();
        state.attaching.remove(target_id);
        match outcome {
            Ok(()) => {
                state.monitored.insert(target_id.to_string());
                debug!(target_id = %short_id(target_id), "Network watchdog attached");
            }
            Err(e) => {
                warn!(target_id = %short_id(target_id), "Network watchdog failed to attach: {}", e);
            }
        }
    }

    async fn try_attach(&self, target_id: &str) -> Result<()> {
        let session = self.host.get_or_create_session(target_id, false).await?;

        self.state().history.bucket(target_id);

        // Subscribe before enabling so nothing emitted right after enable is missed.
        let requests = session.subscribe(REQUEST_WILL_BE_SENT).await;
        let responses = session.subscribe(RESPONSE_RECEIVED).await;
        let failures = session.subscribe(LOADING_FAILED).await;
        let finishes = session.subscribe(LOADING_FINISHED).await;

        session.send("Network.enable", json!({})).await?;

        self.spawn_event_pump(target_id.to_string(), requests, responses, failures, finishes);
        Ok(())
    }

    fn spawn_event_pump(
        &self,
        target_id: String,
        mut requests: mpsc::Receiver<Value>,
        mut responses: mpsc::Receiver<Value>,
        mut failures: mpsc::Receiver<Value>,
        mut finishes: mpsc::Receiver<Value>,
    ) {
        let watchdog = self.clone();
        tokio::spawn(async move {
            loop {
                // Biased in lifecycle order: a queued request is always
                // recorded before the events that refer to it.
                let (method, params) = tokio::select! {
                    biased;
                    Some(p) = requests.recv() => (REQUEST_WILL_BE_SENT, p),
                    Some(p) = responses.recv() => (RESPONSE_RECEIVED, p),
                    Some(p) = failures.recv() => (LOADING_FAILED, p),
                    Some(p) = finishes.recv() => (LOADING_FINISHED, p),
                    else => break,
                };
                if let Some(event) = NetworkEvent::from_cdp(method, params) {
                    watchdog.apply(&target_id, event);
                }
            }
            debug!(target_id = %short_id(&target_id), "Network event streams closed");
        });
    }

    // ─── Correlation ──────────────────────────────────────────────────

    /// Fold one event into the target's history.
    pub fn apply(&self, target_id: &str, event: NetworkEvent) {
        match event {
            NetworkEvent::Request(e) => self.on_request(target_id, e),
            NetworkEvent::Response(e) => self.on_response(target_id, e),
            NetworkEvent::Failed(e) => self.on_failure(target_id, e),
            NetworkEvent::Finished(e) => self.on_loading_finished(target_id, e),
        }
    }

    fn on_request(&self, target_id: &str, event: RequestWillBeSent) {
        let resource_type = event.resource_type.unwrap_or_else(|| "Unknown".to_string());
        if self.config.ignored_resource_types.contains(&resource_type) {
            return;
        }

        let request = event.request;
        let method = request.method.unwrap_or_else(|| "GET".to_string());
        let mut entry = NetworkLogEntry::new(event.request_id, request.url, method);
        entry.resource_type = resource_type;
        entry.start_time = event.wall_time.or(event.timestamp).unwrap_or(0.0);
        entry.request_timestamp = event.timestamp;
        entry.request_headers = header_map(&request.headers);
        entry.request_body_preview = request
            .post_data
            .as_deref()
            .map(|body| body_preview(body, self.config.request_body_preview_chars));
        entry.initiator_type = event
            .initiator
            .as_ref()
            .and_then(|i| i.get("type"))
            .and_then(Value::as_str)
            .map(str::to_string);
        entry.stack_trace = extract_initiator_frames(event.initiator.as_ref());

        self.state().history.bucket(target_id).push(entry);
    }

    fn on_response(&self, target_id: &str, event: ResponseReceived) {
        self.with_entry(target_id, &event.request_id, |entry| {
            let response = event.response;
            if response.status.is_some() {
                entry.status = response.status;
            }
            if response.status_text.is_some() {
                entry.status_text = response.status_text;
            }
            if response.mime_type.is_some() {
                entry.mime_type = response.mime_type;
            }
            if let Some(headers) = response.headers {
                entry.response_headers = header_map(&headers);
            }
            if let Some(ms) = response.response_time.filter(|t| *t > 0.0) {
                entry.end_time = Some(ms / 1000.0);
            }
        });
    }

    fn on_failure(&self, target_id: &str, event: LoadingFailed) {
        self.with_entry(target_id, &event.request_id, |entry| {
            match event.error_text {
                Some(text) => entry.error_text = Some(text),
                None if entry.error_text.is_none() => {
                    entry.error_text = Some("Unknown error".to_string())
                }
                None => {}
            }
            if entry.status.is_none() {
                entry.status = Some(FAILED_STATUS);
            }
            if entry.end_time.is_none() {
                entry.end_time = event.timestamp.map(|ts| entry.wall_clock(ts));
            }
        });
    }

    fn on_loading_finished(&self, target_id: &str, event: LoadingFinished) {
        self.with_entry(target_id, &event.request_id, |entry| {
            if event.encoded_data_length.is_some() {
                entry.encoded_data_length = event.encoded_data_length;
            }
            // Last writer wins: a finish always replaces an earlier end time.
            if let Some(ts) = event.timestamp {
                entry.end_time = Some(entry.wall_clock(ts));
            }
        });
    }

    /// Run `update` on the live entry for `request_id`; evicted or filtered
    /// requests are silently ignored.
    fn with_entry(&self, target_id: &str, request_id: &str, update: impl FnOnce(&mut NetworkLogEntry)) {
        let mut state = self.state();
        if let Some(entry) = state
            .history
            .get_mut(target_id)
            .and_then(|log| log.find_mut(request_id))
        {
            update(entry);
        }
    }

    // ─── Queries ──────────────────────────────────────────────────────

    pub fn is_monitored(&self, target_id: &str) -> bool {
        self.state().monitored.contains(target_id)
    }

    pub fn monitored_targets(&self) -> Vec<String> {
        let mut targets: Vec<String> = self.state().monitored.iter().cloned().collect();
        targets.sort();
        targets
    }

    /// Snapshot of the target's history in arrival order.
    pub fn get_traffic_log(&self, target_id: &str) -> Vec<NetworkLogEntry> {
        self.state()
            .history
            .get(target_id)
            .map(|log| log.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Most recent entry whose URL contains `url_pattern` (case-insensitive).
    pub fn find_entry(&self, target_id: &str, url_pattern: &str) -> Option<NetworkLogEntry> {
        let pattern = url_pattern.to_lowercase();
        let state = self.state();
        let found = state
            .history
            .get(target_id)?
            .iter()
            .rev()
            .find(|e| e.url_contains(&pattern))
            .cloned();
        found
    }

    /// Fetch and decode a response body. Any failure yields `None`.
    pub async fn get_response_body(&self, target_id: &str, request_id: &str) -> Option<String> {
        match self.fetch_response_body(target_id, request_id).await {
            Ok(body) => body,
            Err(e) => {
                debug!(target_id = %short_id(target_id), request_id, "Failed to get response body: {}", e);
                None
            }
        }
    }

    async fn fetch_response_body(&self, target_id: &str, request_id: &str) -> Result<Option<String>> {
        let session = self.host.get_or_create_session(target_id, false).await?;
        let result = session
            .send("Network.getResponseBody", json!({"requestId": request_id}))
            .await?;
        Ok(decode_response_body(&result))
    }

    /// Detail block for `entry`, fetching the response body when requested.
    pub async fn format_entry_details(
        &self,
        target_id: &str,
        entry: &NetworkLogEntry,
        options: &DetailOptions,
    ) -> String {
        let body = if options.include_response_body {
            self.get_response_body(target_id, &entry.request_id).await
        } else {
            None
        };
        format_entry_details(entry, options, body.as_deref())
    }
}

/// Decode a `Network.getResponseBody` result. Base64 payloads are decoded as
/// lossy UTF-8.
pub fn decode_response_body(result: &Value) -> Option<String> {
    let body = result.get("body")?.as_str()?;
    if result.get("base64Encoded").and_then(Value::as_bool) != Some(true) {
        return Some(body.to_string());
    }
    match base64::engine::general_purpose::STANDARD.decode(body) {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(_) => Some(UNDECODABLE_BODY.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::testing::{FakeHost, FakeSession};
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    const TARGET: &str = "TARGET-0001";

    fn watchdog(host: &Arc<FakeHost>) -> NetworkWatchdog {
        NetworkWatchdog::new(host.clone(), NetworkConfig::default())
    }

    fn event(method: &str, params: Value) -> NetworkEvent {
        NetworkEvent::from_cdp(method, params).unwrap()
    }

    fn request(id: &str, url: &str, kind: &str) -> NetworkEvent {
        event(
            REQUEST_WILL_BE_SENT,
            json!({
                "requestId": id,
                "request": {"url": url, "method": "GET", "headers": {"Accept": "*/*"}},
                "type": kind,
                "timestamp": 50.0,
                "wallTime": 1_700_000_000.0,
                "initiator": {"type": "script"}
            }),
        )
    }

    fn response(id: &str, status: i64) -> NetworkEvent {
        event(
            RESPONSE_RECEIVED,
            json!({"requestId": id, "response": {"status": status, "statusText": "OK", "mimeType": "application/json", "headers": {"content-type": "application/json"}}}),
        )
    }

    fn failed(id: &str, error: &str, ts: f64) -> NetworkEvent {
        event(LOADING_FAILED, json!({"requestId": id, "errorText": error, "timestamp": ts}))
    }

    fn finished(id: &str, len: f64, ts: f64) -> NetworkEvent {
        event(LOADING_FINISHED, json!({"requestId": id, "encodedDataLength": len, "timestamp": ts}))
    }

    async fn wait_for<F: Fn() -> bool>(check: F) {
        for _ in 0..200 {
            if check() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not reached");
    }

    #[test]
    fn test_end_to_end_successful_exchange() {
        let host = FakeHost::new();
        let wd = watchdog(&host);
        let url = "https://api.example.com/v1/search";
        wd.apply(TARGET, request("r1", url, "XHR"));
        wd.apply(TARGET, response("r1", 200));
        wd.apply(TARGET, finished("r1", 1024.0, 50.25));

        let log = wd.get_traffic_log(TARGET);
        assert_eq!(log.len(), 1);
        let entry = &log[0];
        assert_eq!(entry.status, Some(200));
        assert_eq!(entry.encoded_data_length, Some(1024.0));
        assert_eq!(entry.duration_ms(), Some(250.0));
        assert_eq!(entry.response_headers.get("content-type"), Some("application/json"));
        assert_eq!(entry.initiator_type.as_deref(), Some("script"));
        assert_eq!(entry.summary(), format!("[GET] 200 {} (XHR) 250ms", url));
    }

    #[test]
    fn test_response_headers_keep_browser_order() {
        let host = FakeHost::new();
        let wd = watchdog(&host);
        wd.apply(TARGET, request("r1", "https://api.example.com/v1/items", "XHR"));
        wd.apply(
            TARGET,
            event(
                RESPONSE_RECEIVED,
                json!({"requestId": "r1", "response": {"status": 200, "headers": {
                    "x-trace": "t1", "content-type": "text/plain", "age": "0"
                }}}),
            ),
        );

        let entry = wd.find_entry(TARGET, "items").unwrap();
        let names: Vec<&str> = entry.response_headers.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["x-trace", "content-type", "age"]);
    }

    #[test]
    fn test_failure_before_response() {
        let host = FakeHost::new();
        let wd = watchdog(&host);
        wd.apply(TARGET, request("r1", "https://api.example.com/v1/search", "Fetch"));
        wd.apply(TARGET, failed("r1", "net::ERR_CONNECTION_RESET", 50.1));

        let entry = &wd.get_traffic_log(TARGET)[0];
        assert_eq!(entry.status, Some(0));
        assert_eq!(entry.error_text.as_deref(), Some("net::ERR_CONNECTION_RESET"));
        assert!(entry.duration_ms().is_some());
        assert!(entry.summary().contains("FAILED(net::ERR_CONNECTION_RESET)"));
    }

    #[test]
    fn test_response_and_failure_commute_on_status() {
        let host = FakeHost::new();
        let wd = watchdog(&host);

        wd.apply(TARGET, request("a", "https://x.test/a", "XHR"));
        wd.apply(TARGET, response("a", 502));
        wd.apply(TARGET, failed("a", "net::ERR_ABORTED", 51.0));

        wd.apply(TARGET, request("b", "https://x.test/b", "XHR"));
        wd.apply(TARGET, failed("b", "net::ERR_ABORTED", 51.0));
        wd.apply(TARGET, response("b", 502));

        wd.apply(TARGET, request("c", "https://x.test/c", "XHR"));
        wd.apply(TARGET, failed("c", "net::ERR_ABORTED", 51.0));

        let log = wd.get_traffic_log(TARGET);
        assert_eq!(log[0].status, Some(502));
        // A late response still supplies a real status.
        assert_eq!(log[1].status, Some(502));
        assert_eq!(log[2].status, Some(0));
        assert!(log.iter().all(|e| e.error_text.is_some()));
    }

    #[test]
    fn test_loading_finished_overwrites_end_time() {
        // Known race: a finish delivered after a failure replaces the failure's
        // end time even though the failure may be the more accurate one.
        let host = FakeHost::new();
        let wd = watchdog(&host);
        wd.apply(TARGET, request("r1", "https://x.test/slow", "XHR"));
        wd.apply(TARGET, failed("r1", "net::ERR_FAILED", 50.1));
        wd.apply(TARGET, finished("r1", 10.0, 52.0));

        let entry = &wd.get_traffic_log(TARGET)[0];
        assert_eq!(entry.duration_ms(), Some(2000.0));
        assert_eq!(entry.status, Some(0));
    }

    #[test]
    fn test_response_time_is_epoch_millis() {
        let host = FakeHost::new();
        let wd = watchdog(&host);
        wd.apply(TARGET, request("r1", "https://x.test/a", "XHR"));
        wd.apply(
            TARGET,
            event(
                RESPONSE_RECEIVED,
                json!({"requestId": "r1", "response": {"status": 200, "responseTime": 1_700_000_000_300.0}}),
            ),
        );
        let entry = &wd.get_traffic_log(TARGET)[0];
        let duration = entry.duration_ms().unwrap();
        assert!((duration - 300.0).abs() < 1.0);
        // Headers absent from the event leave the map untouched.
        assert!(entry.response_headers.is_empty());
    }

    #[test]
    fn test_ignored_types_and_unknown_ids() {
        let host = FakeHost::new();
        let wd = watchdog(&host);
        wd.apply(TARGET, request("img", "https://x.test/logo.png", "Image"));
        wd.apply(TARGET, request("css", "https://x.test/site.css", "Stylesheet"));
        wd.apply(TARGET, response("img", 200));
        wd.apply(TARGET, finished("ghost", 1.0, 1.0));
        wd.apply("OTHER", response("nobody", 200));
        assert!(wd.get_traffic_log(TARGET).is_empty());
        assert!(wd.get_traffic_log("OTHER").is_empty());
    }

    #[test]
    fn test_capacity_eviction_205_requests() {
        let host = FakeHost::new();
        let wd = watchdog(&host);
        for n in 1..=205 {
            wd.apply(TARGET, request(&format!("r{}", n), &format!("https://x.test/{}", n), "XHR"));
        }
        let log = wd.get_traffic_log(TARGET);
        assert_eq!(log.len(), 200);
        assert_eq!(log.first().unwrap().request_id, "r6");
        assert_eq!(log.last().unwrap().request_id, "r205");

        // Events for evicted requests are dropped.
        wd.apply(TARGET, response("r1", 200));
        assert!(wd.get_traffic_log(TARGET).iter().all(|e| e.status.is_none()));
    }

    #[test]
    fn test_find_entry_prefers_most_recent() {
        let host = FakeHost::new();
        let wd = watchdog(&host);
        wd.apply(TARGET, request("old", "https://api.example.com/v1/SEARCH?q=1", "XHR"));
        wd.apply(TARGET, request("other", "https://api.example.com/v1/users", "XHR"));
        wd.apply(TARGET, request("new", "https://api.example.com/v1/search?q=2", "XHR"));

        assert_eq!(wd.find_entry(TARGET, "/v1/Search").unwrap().request_id, "new");
        assert!(wd.find_entry(TARGET, "/v2/").is_none());
        assert!(wd.find_entry("UNKNOWN", "/v1/").is_none());
    }

    #[test]
    fn test_request_body_preview_truncated() {
        let host = FakeHost::new();
        let wd = watchdog(&host);
        let body = "q".repeat(2100);
        wd.apply(
            TARGET,
            event(
                REQUEST_WILL_BE_SENT,
                json!({"requestId": "p", "request": {"url": "https://x.test/upload", "method": "POST", "postData": body}, "type": "Fetch"}),
            ),
        );
        let entry = &wd.get_traffic_log(TARGET)[0];
        assert!(entry
            .request_body_preview
            .as_deref()
            .unwrap()
            .ends_with("... (truncated 100 chars)"));
    }

    #[tokio::test]
    async fn test_attach_is_idempotent_and_pumps_events() {
        let host = FakeHost::new();
        let session: Arc<FakeSession> = host.add_target(TARGET, "page");
        let wd = watchdog(&host);

        wd.attach_to_target(TARGET).await;
        wd.attach_to_target(TARGET).await;

        assert!(wd.is_monitored(TARGET));
        assert_eq!(host.session_requests.load(Ordering::SeqCst), 1);
        assert_eq!(session.sent_methods(), vec!["Network.enable"]);
        assert_eq!(session.subscriber_count(REQUEST_WILL_BE_SENT), 1);

        session
            .emit(
                REQUEST_WILL_BE_SENT,
                json!({"requestId": "1", "request": {"url": "https://api.example.com/v1/search", "method": "GET"}, "type": "XHR", "timestamp": 1.0, "wallTime": 100.0}),
            )
            .await;
        session
            .emit(RESPONSE_RECEIVED, json!({"requestId": "1", "response": {"status": 200}}))
            .await;
        session
            .emit(LOADING_FINISHED, json!({"requestId": "1", "encodedDataLength": 1024, "timestamp": 1.5}))
            .await;

        wait_for(|| {
            wd.get_traffic_log(TARGET)
                .first()
                .is_some_and(|e| e.encoded_data_length.is_some())
        })
        .await;
        let entry = &wd.get_traffic_log(TARGET)[0];
        assert_eq!(entry.status, Some(200));
        assert_eq!(entry.duration_ms(), Some(500.0));
    }

    #[tokio::test]
    async fn test_attach_failure_is_absorbed_and_retryable() {
        let host = FakeHost::new();
        let session = host.add_target(TARGET, "page");
        session.fail("Network.enable", "Network domain unavailable");
        let wd = watchdog(&host);

        wd.attach_to_target(TARGET).await;
        assert!(!wd.is_monitored(TARGET));

        *host.fail_sessions.lock().unwrap() = true;
        wd.attach_to_target(TARGET).await;
        assert!(!wd.is_monitored(TARGET));

        *host.fail_sessions.lock().unwrap() = false;
        session.reply("Network.enable", json!({}));
        wd.attach_to_target(TARGET).await;
        assert!(wd.is_monitored(TARGET));
        assert_eq!(wd.monitored_targets(), vec![TARGET.to_string()]);
    }

    #[tokio::test]
    async fn test_state_request_attaches_focused_target() {
        let host = FakeHost::new();
        host.add_target(TARGET, "page");
        let wd = watchdog(&host);
        assert!(wd.on_state_request().await.is_none());

        host.focus(TARGET);
        assert_eq!(wd.on_state_request().await.as_deref(), Some(TARGET));
        assert!(wd.is_monitored(TARGET));
    }

    #[tokio::test]
    async fn test_response_body_decoding() {
        let host = FakeHost::new();
        let session = host.add_target(TARGET, "page");
        let wd = watchdog(&host);

        session.reply("Network.getResponseBody", json!({"body": "plain", "base64Encoded": false}));
        assert_eq!(wd.get_response_body(TARGET, "1").await.as_deref(), Some("plain"));

        session.reply("Network.getResponseBody", json!({"body": "eyJvayI6dHJ1ZX0=", "base64Encoded": true}));
        assert_eq!(wd.get_response_body(TARGET, "1").await.as_deref(), Some("{\"ok\":true}"));

        session.reply("Network.getResponseBody", json!({"body": "%%%", "base64Encoded": true}));
        assert_eq!(wd.get_response_body(TARGET, "1").await.as_deref(), Some(UNDECODABLE_BODY));

        session.fail("Network.getResponseBody", "No resource with given identifier found");
        assert!(wd.get_response_body(TARGET, "1").await.is_none());

        assert!(wd.get_response_body("MISSING", "1").await.is_none());
    }

    #[test]
    fn test_lossy_utf8_body() {
        // 0xFF is never valid UTF-8
        let result = json!({"body": "aGn/", "base64Encoded": true});
        let body = decode_response_body(&result).unwrap();
        assert!(body.starts_with("hi"));
        assert!(body.contains('\u{FFFD}'));
    }

    #[tokio::test]
    async fn test_details_include_fetched_body() {
        let host = FakeHost::new();
        let session = host.add_target(TARGET, "page");
        session.reply("Network.getResponseBody", json!({"body": "{\"items\":[]}"}));
        let wd = watchdog(&host);
        wd.apply(TARGET, request("r1", "https://api.example.com/v1/items", "XHR"));
        let entry = wd.find_entry(TARGET, "items").unwrap();

        let options = DetailOptions {
            include_response_body: true,
            ..DetailOptions::default()
        };
        let text = wd.format_entry_details(TARGET, &entry, &options).await;
        assert!(text.ends_with("Response Body:\n{\"items\":[]}"));
        assert!(text.contains("Request Headers:\n    Accept: */*"));
    }
}
