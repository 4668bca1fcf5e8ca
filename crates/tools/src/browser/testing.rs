//! In-memory stand-ins for a browser, used by unit tests across the crate.

use async_trait::async_trait;
use netwatch_core::{Error, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

use super::session::{BrowserHost, CdpSession, TargetInfo};

#[derive(Default)]
pub struct FakeSession {
    replies: Mutex<HashMap<String, std::result::Result<Value, String>>>,
    delays: Mutex<HashMap<String, Duration>>,
    listeners: Mutex<HashMap<String, Vec<mpsc::Sender<Value>>>>,
    pub sent: Mutex<Vec<(String, Value)>>,
}

impl FakeSession {
    pub fn reply(&self, method: &str, result: Value) {
        self.replies.lock().unwrap().insert(method.to_string(), Ok(result));
    }

    pub fn fail(&self, method: &str, message: &str) {
        self.replies
            .lock()
            .unwrap()
            .insert(method.to_string(), Err(message.to_string()));
    }

    pub fn delay(&self, method: &str, delay: Duration) {
        self.delays.lock().unwrap().insert(method.to_string(), delay);
    }

    /// Push an event to every subscriber of `method`.
    pub async fn emit(&self, method: &str, params: Value) {
        let senders = self
            .listeners
            .lock()
            .unwrap()
            .get(method)
            .cloned()
            .unwrap_or_default();
        for tx in senders {
            let _ = tx.send(params.clone()).await;
        }
    }

    pub fn sent_methods(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|(m, _)| m.clone()).collect()
    }

    pub fn subscriber_count(&self, method: &str) -> usize {
        self.listeners
            .lock()
            .unwrap()
            .get(method)
            .map_or(0, Vec::len)
    }
}

#[async_trait]
impl CdpSession for FakeSession {
    async fn send(&self, method: &str, params: Value) -> Result<Value> {
        self.sent.lock().unwrap().push((method.to_string(), params));
        let delay = self.delays.lock().unwrap().get(method).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let reply = self.replies.lock().unwrap().get(method).cloned();
        match reply {
            Some(Ok(value)) => Ok(value),
            Some(Err(message)) => Err(Error::Cdp(message)),
            None => Ok(Value::Object(Default::default())),
        }
    }

    async fn subscribe(&self, event: &str) -> mpsc::Receiver<Value> {
        let (tx, rx) = mpsc::channel(64);
        self.listeners
            .lock()
            .unwrap()
            .entry(event.to_string())
            .or_default()
            .push(tx);
        rx
    }
}

#[derive(Default)]
pub struct FakeHost {
    pub targets: Mutex<Vec<TargetInfo>>,
    pub focused: Mutex<Option<String>>,
    pub sessions: Mutex<HashMap<String, Arc<FakeSession>>>,
    pub session_requests: AtomicUsize,
    pub highlight_removals: AtomicUsize,
    pub fail_sessions: Mutex<bool>,
    pub fail_highlights: Mutex<bool>,
}

impl FakeHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_target(&self, target_id: &str, target_type: &str) -> Arc<FakeSession> {
        self.targets.lock().unwrap().push(TargetInfo {
            target_id: target_id.to_string(),
            target_type: target_type.to_string(),
            url: format!("https://example.com/{}", target_id),
            title: String::new(),
            web_socket_debugger_url: None,
        });
        let session = Arc::new(FakeSession::default());
        self.sessions
            .lock()
            .unwrap()
            .insert(target_id.to_string(), session.clone());
        session
    }

    pub fn focus(&self, target_id: &str) {
        *self.focused.lock().unwrap() = Some(target_id.to_string());
    }

    pub fn session(&self, target_id: &str) -> Arc<FakeSession> {
        self.sessions.lock().unwrap()[target_id].clone()
    }
}

#[async_trait]
impl BrowserHost for FakeHost {
    async fn get_or_create_session(&self, target_id: &str, focus: bool) -> Result<Arc<dyn CdpSession>> {
        self.session_requests.fetch_add(1, Ordering::SeqCst);
        if *self.fail_sessions.lock().unwrap() {
            return Err(Error::Session("browser went away".to_string()));
        }
        let session = self
            .sessions
            .lock()
            .unwrap()
            .get(target_id)
            .cloned()
            .ok_or_else(|| Error::Session(format!("unknown target {}", target_id)))?;
        if focus {
            self.focus(target_id);
        }
        Ok(session as Arc<dyn CdpSession>)
    }

    async fn focused_target(&self) -> Option<TargetInfo> {
        let focused = self.focused.lock().unwrap().clone()?;
        self.targets
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.target_id == focused)
            .cloned()
    }

    async fn targets(&self) -> Vec<TargetInfo> {
        self.targets.lock().unwrap().clone()
    }

    async fn remove_highlights(&self) -> Result<()> {
        self.highlight_removals.fetch_add(1, Ordering::SeqCst);
        if *self.fail_highlights.lock().unwrap() {
            return Err(Error::Cdp("overlay script failed".to_string()));
        }
        Ok(())
    }
}
