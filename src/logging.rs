use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{fmt, EnvFilter};

const FILTER_ENV: &str = "CHURCHLEDGER_LOG";
const DEFAULT_FILTER: &str = "churchledger=info";

/// Log to a file; the terminal belongs to the TUI. Safe to call more than once.
pub(crate) fn init(log_file: &Path) {
    let filter =
        EnvFilter::try_from_env(FILTER_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let Ok(file) = OpenOptions::new().create(true).append(true).open(log_file) else {
        eprintln!("Could not open log file: {}", log_file.display());
        return;
    };

    let _ = fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false)
        .with_writer(Mutex::new(file))
        .try_init();
}
