use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the log filter, e.g. `moviequiz=debug`
pub const LOG_ENV: &str = "MOVIEQUIZ_LOG";

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Send logs to `path`. The terminal belongs to the UI, so nothing is
/// written to stdout or stderr.
pub fn init_file(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().append(true).create(true).open(path)?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .with(filter())
        .try_init()
        .map_err(io::Error::other)
}

/// Log to stderr, for the non-interactive commands
pub fn init_stderr() -> io::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter())
        .try_init()
        .map_err(io::Error::other)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_reports_error() {
        // whichever init ran first owns the global subscriber
        let _ = init_stderr();
        assert!(init_stderr().is_err());

        let dir = tempfile::tempdir().unwrap();
        assert!(init_file(&dir.path().join("quiz.log")).is_err());
    }
}
