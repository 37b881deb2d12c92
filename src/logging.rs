use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber.
///
/// Logs go to `log_file` when given (the TUI owns the terminal), otherwise to
/// stderr. `RUST_LOG` overrides the default level.
pub fn init(log_file: Option<&Path>) -> std::io::Result<()> {
    match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter("info"))
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter("warn"))
                .with_target(false)
                .with_writer(std::io::stderr)
                .try_init();
        }
    }
    Ok(())
}

fn filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}
