//! Chrome DevTools Protocol plumbing.
//!
//! - [`cdp`]: WebSocket JSON-RPC client for a single target
//! - [`session`]: the `CdpSession`/`BrowserHost` seams and the DevTools-backed host

pub mod cdp;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use cdp::CdpClient;
pub use session::{short_id, BrowserHost, CdpSession, DevToolsHost, TargetInfo};
