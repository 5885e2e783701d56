//! Logging setup for applications embedding the validator
//!
//! The library only emits `tracing` events; nothing is printed unless the
//! host installs a subscriber. [`init_logging`] installs one configured from
//! a [`LoggingConfig`], writing to stderr in one of the [`LogFormat`]s.
//! Suite runs are wrapped in a [`timing::Timer`] span tagged with the
//! process [`session_id`].
//!
//! Copyright (c) 2026 GrantReady Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Result};
use is_terminal::IsTerminal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::{field, Span};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Session id shared by every event after logging is initialized
static SESSION_ID: OnceLock<String> = OnceLock::new();

/// Subscriber settings, usually read from the `logging` section of
/// [`Config`](crate::Config)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `grantready_schemas=debug`
    pub level: String,
    pub format: LogFormat,
    /// ANSI colors when stderr is a terminal
    pub console: bool,
    pub thread_ids: bool,
    /// Attach file and line to each event
    pub source_location: bool,
    /// Extra per-target directives, `target -> level`
    pub module_filter: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Single-line events
    Compact,
    /// Multi-line events with span context
    Full,
    /// Newline-delimited JSON objects
    Json,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
            console: true,
            thread_ids: false,
            source_location: false,
            module_filter: None,
        }
    }
}

impl LoggingConfig {
    /// Debug level with source locations for this crate's events
    pub fn debug() -> Self {
        Self {
            level: "warn".to_string(),
            source_location: true,
            module_filter: Some(HashMap::from([(
                env!("CARGO_CRATE_NAME").to_string(),
                "debug".to_string(),
            )])),
            ..Self::default()
        }
    }

    /// Apply overrides from the process environment
    pub fn merge_with_env(&mut self) {
        self.apply_env(std::env::vars());
    }

    /// Apply overrides from `RUST_LOG`, `GRANTREADY_LOG_FORMAT` and
    /// `GRANTREADY_LOG_CONSOLE` found in `vars`
    pub fn apply_env<I>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            match key.as_str() {
                "RUST_LOG" => self.level = value,
                "GRANTREADY_LOG_FORMAT" => match value.to_lowercase().as_str() {
                    "compact" => self.format = LogFormat::Compact,
                    "full" => self.format = LogFormat::Full,
                    "json" => self.format = LogFormat::Json,
                    _ => tracing::warn!(format = %value, "Ignoring unknown log format"),
                },
                "GRANTREADY_LOG_CONSOLE" => {
                    self.console = value.eq_ignore_ascii_case("true") || value == "1";
                }
                _ => {}
            }
        }
    }
}

/// Install the global `tracing` subscriber.
///
/// Fails if a global subscriber is already set.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let ansi = config.console && config.format != LogFormat::Json && std::io::stderr().is_terminal();
    let builder = tracing_subscriber::fmt()
        .with_env_filter(build_filter(config)?)
        .with_writer(std::io::stderr)
        .with_ansi(ansi)
        .with_thread_ids(config.thread_ids)
        .with_file(config.source_location)
        .with_line_number(config.source_location);

    let installed = match config.format {
        LogFormat::Compact => tracing::subscriber::set_global_default(builder.compact().finish()),
        LogFormat::Full => tracing::subscriber::set_global_default(builder.finish()),
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish()),
    };
    installed.map_err(|e| Error::logging(format!("Subscriber already installed: {}", e)))?;

    tracing::debug!(
        session_id = %session_id(),
        format = ?config.format,
        level = %config.level,
        "Logging initialized"
    );
    Ok(())
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    let mut filter = EnvFilter::try_new(&config.level)
        .map_err(|e| Error::logging(format!("Invalid log level '{}': {}", config.level, e)))?;

    for (target, level) in config.module_filter.iter().flatten() {
        let directive = format!("{}={}", target, level)
            .parse()
            .map_err(|e| Error::logging(format!("Invalid directive for {}: {}", target, e)))?;
        filter = filter.add_directive(directive);
    }

    Ok(filter)
}

/// Generate a unique run id
pub fn generate_run_id() -> String {
    format!("run_{}", Uuid::new_v4().simple())
}

/// Id for this process, created on first use
pub fn session_id() -> &'static str {
    SESSION_ID.get_or_init(generate_run_id)
}

/// Span carrying the session id, closed out by [`timing::Timer`]
pub fn operation_span(operation: &str, details: Option<&str>) -> Span {
    tracing::info_span!(
        "operation",
        operation = operation,
        session_id = session_id(),
        details = details.unwrap_or(""),
        duration_ms = field::Empty,
    )
}

pub mod timing {
    use std::time::{Duration, Instant};
    use tracing::Span;

    /// A timer that logs its duration when finished or dropped
    pub struct Timer {
        start: Instant,
        span: Span,
        operation: String,
        finished: bool,
    }

    impl Timer {
        pub fn new(operation: &str) -> Self {
            Self::start(operation, None)
        }

        pub fn with_details(operation: &str, details: &str) -> Self {
            Self::start(operation, Some(details))
        }

        fn start(operation: &str, details: Option<&str>) -> Self {
            Self {
                start: Instant::now(),
                span: super::operation_span(operation, details),
                operation: operation.to_string(),
                finished: false,
            }
        }

        /// The span operations can be entered under
        pub fn span(&self) -> &Span {
            &self.span
        }

        pub fn elapsed(&self) -> Duration {
            self.start.elapsed()
        }

        /// Record the duration on the span and log it at info
        pub fn finish(mut self) -> Duration {
            let duration = self.record();
            tracing::info!(
                operation = %self.operation,
                duration_ms = duration.as_millis() as u64,
                "Finished"
            );
            self.finished = true;
            duration
        }

        fn record(&self) -> Duration {
            let duration = self.start.elapsed();
            self.span.record("duration_ms", duration.as_millis() as u64);
            duration
        }
    }

    impl Drop for Timer {
        fn drop(&mut self) {
            if self.finished {
                return;
            }
            let duration = self.record();
            tracing::debug!(
                operation = %self.operation,
                duration_ms = duration.as_millis() as u64,
                "Dropped before finish"
            );
        }
    }
}
