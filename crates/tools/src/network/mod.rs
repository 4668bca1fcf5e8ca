//! Passive network observation.
//!
//! [`NetworkWatchdog`] attaches to browser targets, folds the `Network.*`
//! lifecycle events of every request into one [`NetworkLogEntry`] and keeps
//! the most recent entries per target for later queries.

pub mod entry;
pub mod events;
pub mod format;
pub mod stack;
pub mod store;
pub mod watchdog;

pub use entry::{CallFrame, Headers, NetworkLogEntry};
pub use events::NetworkEvent;
pub use format::{format_entry_details, DetailOptions, BODY_NOT_AVAILABLE};
pub use stack::{extract_initiator_frames, format_stack_trace};
pub use store::{HistoryStore, TrafficLog};
pub use watchdog::{decode_response_body, NetworkWatchdog, UNDECODABLE_BODY};
