use std::{env, fs::OpenOptions, path::PathBuf};

use color_eyre::{Result, eyre::Context};
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::{Config, LogsConfig};

/// Name of the environment variable that enables logging with the given filter
pub const LOG_ENV_VAR: &str = "GLOSSARY_LOG";

/// File name of the logs, under the data dir
const LOG_FILE_NAME: &str = "glossary-linker.log";

/// Resolves the log path and filter based on the config and environment variable.
/// If logging is disabled, returns `None` for the filter.
pub fn resolve_path_and_filter(config: &Config) -> (PathBuf, Option<String>) {
    let logs_path = config.data_dir.join(LOG_FILE_NAME);
    (logs_path, resolve_filter(&config.logs, env::var(LOG_ENV_VAR).ok()))
}

/// The env variable enables logging even when disabled on the config, and its filter wins
fn resolve_filter(logs: &LogsConfig, env_filter: Option<String>) -> Option<String> {
    match env_filter {
        Some(filter) if !filter.trim().is_empty() => Some(filter),
        _ if logs.enabled => Some(logs.filter.clone()),
        _ => None,
    }
}

/// Initializes the tracing subscriber to append logs to a file, returning its path if logging is enabled.
///
/// Runs may be launched concurrently by an editor, so the file is never truncated and each line carries its thread.
pub fn init(logs_path: PathBuf, filter: Option<String>) -> Result<Option<PathBuf>> {
    let Some(filter) = filter else {
        return Ok(None);
    };
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&logs_path)
        .wrap_err_with(|| format!("Couldn't open the log file: {}", logs_path.display()))?;
    let env_filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::WARN.into())
        .parse(&filter)
        .wrap_err_with(|| format!("Couldn't parse the log filter: {filter}"))?;
    let file_layer = fmt::layer()
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_filter(env_filter);
    tracing_subscriber::registry()
        .with(file_layer)
        .with(ErrorLayer::default())
        .init();
    Ok(Some(logs_path))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_resolve_filter() {
        let disabled = LogsConfig::default();
        let enabled = LogsConfig {
            enabled: true,
            filter: String::from("debug"),
        };

        assert_eq!(resolve_filter(&disabled, None), None);
        assert_eq!(resolve_filter(&disabled, Some(String::from(" "))), None);
        assert_eq!(resolve_filter(&disabled, Some(String::from("trace"))).as_deref(), Some("trace"));
        assert_eq!(resolve_filter(&enabled, None).as_deref(), Some("debug"));
        assert_eq!(resolve_filter(&enabled, Some(String::from("trace"))).as_deref(), Some("trace"));
    }
}
