use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Paths {
    pub base: PathBuf,
}

impl Paths {
    pub fn new() -> Self {
        let base = dirs::home_dir()
            .map(|h| h.join(".netwatch"))
            .unwrap_or_else(|| PathBuf::from(".netwatch"));
        Self { base }
    }

    pub fn with_base(base: PathBuf) -> Self {
        Self { base }
    }

    pub fn config_file(&self) -> PathBuf {
        self.base.join("config.json")
    }

    pub fn screenshots_dir(&self) -> PathBuf {
        self.base.join("screenshots")
    }

    /// Default output path for a screenshot taken at `stamp` (unix seconds).
    pub fn screenshot_file(&self, stamp: u64) -> PathBuf {
        self.screenshots_dir().join(format!("screenshot-{}.png", stamp))
    }
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}
