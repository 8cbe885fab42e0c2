//! Engine configuration, loaded from YAML.

use osp_walker::{SchedulerOptions, DEFAULT_QUEUE_WARN_LEN};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A field holds a value the engine cannot use.
    #[error("Invalid value for field '{field}': {reason}")]
    Invalid { field: String, reason: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ConfigError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Configuration result type
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Engine-wide settings applied to every run.
///
/// ```yaml
/// deadline_ms: 5000
/// trace_dispatch: false
/// queue_warn_len: 100000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Wall-clock budget per run in milliseconds. Unset means no limit.
    pub deadline_ms: Option<u64>,
    /// Log every ability body at trace level.
    pub trace_dispatch: bool,
    /// Queue length above which a run logs a warning.
    pub queue_warn_len: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            deadline_ms: None,
            trace_dispatch: false,
            queue_warn_len: DEFAULT_QUEUE_WARN_LEN,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.deadline_ms == Some(0) {
            return Err(ConfigError::invalid("deadline_ms", "must be greater than 0"));
        }
        if self.queue_warn_len == 0 {
            return Err(ConfigError::invalid("queue_warn_len", "must be greater than 0"));
        }
        Ok(())
    }

    /// Whole milliseconds, at least 1 and saturating at `u64::MAX`.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        let ms = u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX);
        self.deadline_ms = Some(ms.max(1));
        self
    }

    pub fn with_trace_dispatch(mut self, enabled: bool) -> Self {
        self.trace_dispatch = enabled;
        self
    }

    /// Scheduler options for a run starting now.
    ///
    /// A deadline too far out to represent as an `Instant` means no deadline.
    pub(crate) fn scheduler_options(&self) -> SchedulerOptions {
        SchedulerOptions {
            deadline: self
                .deadline_ms
                .and_then(|ms| Instant::now().checked_add(Duration::from_millis(ms))),
            cancel: None,
            trace_dispatch: self.trace_dispatch,
            queue_warn_len: self.queue_warn_len,
        }
    }
}
