use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use crate::error::{Result, TaskError};
use crate::storage::Mode;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Runtime configuration for the binary.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub mode: Mode,
    /// Demo mode storage file.
    pub db_path: PathBuf,
    /// Server mode base URL.
    pub api_url: Option<String>,
    pub timeout: Duration,
    /// Where logs go. `None` means stderr.
    pub log_file: Option<PathBuf>,
}

/// Values gathered from flags and environment before validation.
#[derive(Debug, Clone, Default)]
pub struct ConfigInput {
    pub server: bool,
    pub db_path: Option<PathBuf>,
    pub api_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Validates the gathered input and fills in defaults.
    ///
    /// Server mode requires an API URL.
    pub fn resolve(input: ConfigInput) -> Result<Config> {
        let api_url = input.api_url.filter(|u| !u.trim().is_empty());
        let mode = if input.server { Mode::Server } else { Mode::Demo };
        if mode == Mode::Server && api_url.is_none() {
            return Err(TaskError::Config("API_URL is not set".into()));
        }
        Ok(Config {
            mode,
            db_path: input.db_path.unwrap_or_else(default_db_path),
            api_url,
            timeout: Duration::from_secs(input.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
            log_file: input.log_file,
        })
    }

    /// Log file used by the TUI when none is configured: next to the store.
    pub fn tui_log_file(&self) -> PathBuf {
        self.log_file.clone().unwrap_or_else(|| {
            let mut p = self.db_path.clone();
            p.set_file_name("tasklane.log");
            p
        })
    }
}

/// Returns the default storage path.
///
/// `~/.local/share/tasklane/tasks.json` on Linux, `./tasks.json` when no
/// data directory is known.
pub fn default_db_path() -> PathBuf {
    let mut p = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    p.push("tasklane");
    if !p.exists() {
        let _ = fs::create_dir_all(&p);
    }
    p.push("tasks.json");
    p
}
