//! Tracing subscriber setup
//!
//! The interactive view owns the terminal, so it logs to a file under the
//! data directory. Every other command logs to stderr.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::ENV_LOG;
use crate::types::{CotizadorError, Result};

const LOG_FILE_NAME: &str = "cotizador.log";

/// Where log lines go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File,
}

/// Install the global subscriber. `COTIZADOR_LOG` wins over `level`.
pub fn init(level: &str, target: LogTarget, data_dir: &Path) -> Result<()> {
    let env_filter = match EnvFilter::try_from_env(ENV_LOG) {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level).map_err(|e| {
            CotizadorError::Config(format!("invalid log level/filter '{}': {}", level, e))
        })?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact();

    let installed = match target {
        LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init(),
        LogTarget::File => {
            fs::create_dir_all(data_dir)?;
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(data_dir.join(LOG_FILE_NAME))?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
    };

    installed.map_err(|e| CotizadorError::Config(format!("telemetry error: {}", e)))
}
