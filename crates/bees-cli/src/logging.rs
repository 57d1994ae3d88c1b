//! Console + file logging setup.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::Context;
use clap::ValueEnum;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Log file written in the working directory unless disabled.
pub const LOG_FILE: &str = "bees.log";

/// Filter used when neither `RUST_LOG` nor `--log-level` is given.
pub const DEFAULT_FILTER: &str = "info,bees=debug";

/// Line format of the log file. The console always gets text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// Install the global subscriber. `RUST_LOG` wins over `level`.
pub fn init(level: &str, log_file: Option<&Path>, format: LogFormat) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .with_context(|| format!("invalid log level {level:?}"))?;

    let file = match log_file {
        Some(path) => Some(
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?,
        ),
        None => None,
    };

    subscriber(filter, file, format).try_init()?;

    tracing::debug!(log_file = ?log_file, ?format, "logging initialized");
    Ok(())
}

fn subscriber(
    filter: EnvFilter,
    file: Option<File>,
    format: LogFormat,
) -> impl tracing::Subscriber + Send + Sync + 'static {
    let (text_file, json_file) = match format {
        LogFormat::Text => (file, None),
        LogFormat::Json => (None, file),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(text_file.map(|f| fmt::layer().with_ansi(false).with_writer(Mutex::new(f))))
        .with(json_file.map(|f| fmt::layer().json().with_writer(Mutex::new(f))))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log_to(path: &Path, format: LogFormat) {
        let file = File::create(path).unwrap();
        let subscriber = subscriber(EnvFilter::new("info"), Some(file), format);
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(bees = 3, "the swarm assembled");
            tracing::debug!("filtered out");
        });
    }

    #[test]
    fn json_file_lines_parse() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LOG_FILE);
        log_to(&path, LogFormat::Json);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 1);
        let event: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(event["level"], "INFO");
        assert_eq!(event["fields"]["message"], "the swarm assembled");
        assert_eq!(event["fields"]["bees"], 3);
    }

    #[test]
    fn text_file_has_no_color_codes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LOG_FILE);
        log_to(&path, LogFormat::Text);

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("the swarm assembled"));
        assert!(content.contains("bees=3"));
        assert!(!content.contains('\u{1b}'));
        assert!(!content.contains("filtered out"));
    }
}
