use std::num::NonZeroU32;
use std::path::PathBuf;

use serde::Deserialize;

/// Store settings shared by the writer and the searcher.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Directory holding one file per day. Created on first open.
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    /// How many most-recent days a lookup considers.
    #[serde(default = "default_window_days")]
    pub window_days: NonZeroU32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            window_days: default_window_days(),
        }
    }
}

/// `$HOME/WDC/logs`, or `./WDC/logs` when no home directory is known.
pub fn default_log_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("WDC")
        .join("logs")
}

pub const DEFAULT_WINDOW_DAYS: NonZeroU32 = match NonZeroU32::new(30) {
    Some(n) => n,
    None => unreachable!(),
};

fn default_window_days() -> NonZeroU32 {
    DEFAULT_WINDOW_DAYS
}
