pub mod config;
pub mod error;
pub mod paths;

pub use config::{timeout_from_secs, CdpConfig, Config, NetworkConfig, ScreenshotConfig, MAX_TIMEOUT_SECS};
pub use error::{Error, Result};
pub use paths::Paths;
