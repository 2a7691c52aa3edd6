//! Session-scoped diagnostic logging.
//!
//! The terminal owns stdout, so diagnostics go to a file under the XDG state
//! directory. The subscriber is installed by [`Logging::init`] in `main` and
//! torn down when the returned guard drops with the session — there is no
//! module-level logger singleton to outlive it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Holds the appender flush guard for the lifetime of the session.
pub struct Logging {
    _guard: WorkerGuard,
    pub path: PathBuf,
}

impl Logging {
    /// Install the file subscriber. Filter via `PRDECK_LOG` (defaults to
    /// `info` for this crate, `warn` elsewhere).
    pub fn init() -> Result<Self> {
        let dir = log_dir().context("no home directory for log files")?;
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create log dir: {}", dir.display()))?;

        let appender = tracing_appender::rolling::daily(&dir, "prdeck.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);

        let filter = EnvFilter::try_from_env("PRDECK_LOG")
            .unwrap_or_else(|_| EnvFilter::new("warn,prdeck=info"));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_ansi(false)
            .init();

        Ok(Self {
            _guard: guard,
            path: dir,
        })
    }
}

fn log_dir() -> Option<PathBuf> {
    let base = if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        PathBuf::from(xdg)
    } else if let Ok(home) = std::env::var("HOME") {
        Path::new(&home).join(".local").join("state")
    } else {
        return None;
    };
    Some(base.join("prdeck"))
}
