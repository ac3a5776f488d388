//! Structured logging.
//!
//! Analysis code logs through `tracing`; this module only decides how those
//! events are rendered (plain or JSON) and which of them pass. Filtering uses
//! `RUST_LOG` directive syntax, so `info` and `warn,ringwatch_aml=debug` are
//! both valid settings.
//!
//! # Example
//!
//! ```rust,ignore
//! use ringwatch_core::logging::LogConfig;
//!
//! LogConfig::development().with_verbosity(1).init()?;
//! tracing::info!("ready");
//! ```

use crate::error::{Result, RingwatchError};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directive, e.g. `info` or `warn,ringwatch_aml=debug`
    pub filter: String,
    /// Emit one JSON object per event
    pub json: bool,
    /// Include caller location
    pub include_location: bool,
    /// Include thread IDs
    pub include_thread_ids: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
            include_location: false,
            include_thread_ids: false,
        }
    }
}

impl LogConfig {
    /// Development configuration
    pub fn development() -> Self {
        Self {
            filter: "debug".to_string(),
            include_location: true,
            ..Default::default()
        }
    }

    /// Production configuration
    pub fn production() -> Self {
        Self {
            json: true,
            include_thread_ids: true,
            ..Default::default()
        }
    }

    /// Replace the filter directive.
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Raise verbosity by `-v` count: one level gives `debug`, two or more
    /// give `trace`. Zero leaves the configured filter alone.
    #[must_use]
    pub fn with_verbosity(self, verbose: u8) -> Self {
        match verbose {
            0 => self,
            1 => self.with_filter("debug"),
            _ => self.with_filter("trace"),
        }
    }

    /// Parse the filter directive.
    pub fn env_filter(&self) -> Result<EnvFilter> {
        EnvFilter::try_new(&self.filter).map_err(|e| {
            RingwatchError::config(format!("invalid log filter '{}': {}", self.filter, e))
        })
    }

    /// Check that the filter directive parses.
    pub fn validate(&self) -> Result<()> {
        self.env_filter().map(|_| ())
    }

    /// Install the global subscriber, writing to stderr.
    ///
    /// `RUST_LOG` takes precedence over the configured filter. Calling this
    /// twice is harmless; the second subscriber is ignored.
    pub fn init(&self) -> Result<()> {
        use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

        let filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => self.env_filter()?,
        };

        let layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_thread_ids(self.include_thread_ids)
            .with_file(self.include_location)
            .with_line_number(self.include_location);
        let registry = tracing_subscriber::registry().with(filter);

        if self.json {
            registry.with(layer.json()).try_init().ok();
        } else {
            registry.with(layer).try_init().ok();
        }

        Ok(())
    }
}
