//! Batcher options and their resolved form.

use crate::logging::{default_logger, Logger, SharedLogger};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_WORKERS: usize = 1;
pub const DEFAULT_BATCH_SIZE: usize = 10;
pub const DEFAULT_BATCH_TIMEOUT: Duration = Duration::from_secs(1);

/// Caller-facing options. Zero values (and a missing logger) mean "use the default".
///
/// Options deserialize from YAML or JSON; the logger never does.
///
/// ```yaml
/// workers: 4
/// batch_size: 100
/// batch_timeout_ms: 250
/// ```
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BatcherOptions {
    pub workers: usize,
    pub batch_size: usize,
    #[serde(rename = "batch_timeout_ms", with = "duration_ms")]
    pub batch_timeout: Duration,
    #[serde(skip)]
    pub logger: Option<SharedLogger>,
}

impl BatcherOptions {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_workers(mut self, n: usize) -> Self {
        self.workers = n;
        self
    }
    pub fn with_batch_size(mut self, s: usize) -> Self {
        self.batch_size = s;
        self
    }
    pub fn with_batch_timeout(mut self, t: Duration) -> Self {
        self.batch_timeout = t;
        self
    }
    pub fn with_logger(mut self, logger: impl Logger + 'static) -> Self {
        let logger: SharedLogger = Arc::new(logger);
        self.logger = Some(logger);
        self
    }
    pub fn with_shared_logger(mut self, logger: SharedLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn from_yaml_str(s: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(s)?)
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Applies defaults field by field.
    pub fn resolve(self) -> BatcherConfig {
        BatcherConfig {
            workers: non_zero_or(self.workers, DEFAULT_WORKERS),
            batch_size: non_zero_or(self.batch_size, DEFAULT_BATCH_SIZE),
            batch_timeout: if self.batch_timeout.is_zero() {
                DEFAULT_BATCH_TIMEOUT
            } else {
                self.batch_timeout
            },
            logger: self.logger.unwrap_or_else(default_logger),
        }
    }
}

fn non_zero_or(v: usize, default: usize) -> usize {
    if v == 0 {
        default
    } else {
        v
    }
}

impl fmt::Debug for BatcherOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatcherOptions")
            .field("workers", &self.workers)
            .field("batch_size", &self.batch_size)
            .field("batch_timeout", &self.batch_timeout)
            .field("logger", &self.logger.as_ref().map(|_| "<custom>"))
            .finish()
    }
}

/// Immutable configuration, resolved once at construction.
#[derive(Clone)]
pub struct BatcherConfig {
    pub workers: usize,
    pub batch_size: usize,
    pub batch_timeout: Duration,
    pub logger: SharedLogger,
}

impl Default for BatcherConfig {
    fn default() -> Self {
        BatcherOptions::default().resolve()
    }
}

impl fmt::Debug for BatcherConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatcherConfig")
            .field("workers", &self.workers)
            .field("batch_size", &self.batch_size)
            .field("batch_timeout", &self.batch_timeout)
            .finish_non_exhaustive()
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoopLogger;

    #[test]
    fn test_resolve_defaults() {
        let config = BatcherOptions::new().resolve();
        assert_eq!(config.workers, 1);
        assert_eq!(config.batch_size, 10);
        assert_eq!(config.batch_timeout, Duration::from_secs(1));
    }

    #[test]
    fn test_resolve_overrides_independently() {
        let config = BatcherOptions::new()
            .with_batch_size(4)
            .with_logger(NoopLogger)
            .resolve();
        assert_eq!(config.workers, DEFAULT_WORKERS);
        assert_eq!(config.batch_size, 4);
        assert_eq!(config.batch_timeout, DEFAULT_BATCH_TIMEOUT);

        let config = BatcherOptions::new()
            .with_workers(3)
            .with_batch_timeout(Duration::from_millis(10))
            .resolve();
        assert_eq!(config.workers, 3);
        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(config.batch_timeout, Duration::from_millis(10));
    }

    #[test]
    fn test_zero_values_fall_back() {
        let config = BatcherOptions::new()
            .with_workers(0)
            .with_batch_size(0)
            .with_batch_timeout(Duration::ZERO)
            .resolve();
        assert_eq!(config.workers, DEFAULT_WORKERS);
        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(config.batch_timeout, DEFAULT_BATCH_TIMEOUT);
    }

    #[test]
    fn test_from_yaml() {
        let opts = BatcherOptions::from_yaml_str("workers: 4\nbatch_timeout_ms: 250\n").unwrap();
        assert_eq!(opts.workers, 4);
        assert_eq!(opts.batch_size, 0);
        assert_eq!(opts.batch_timeout, Duration::from_millis(250));
        assert!(opts.logger.is_none());

        let config = opts.resolve();
        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
    }

    #[test]
    fn test_from_json() {
        let opts = BatcherOptions::from_json_str(r#"{"batch_size": 64}"#).unwrap();
        assert_eq!(opts.batch_size, 64);
        assert_eq!(opts.workers, 0);
        assert!(opts.batch_timeout.is_zero());
    }

    #[test]
    fn test_malformed_options_are_configuration_errors() {
        let err = BatcherOptions::from_json_str(r#"{"workers": "many"}"#).unwrap_err();
        assert!(matches!(err, crate::Error::Configuration { .. }));

        let err = BatcherOptions::from_yaml_str("batch_size: [1, 2]").unwrap_err();
        assert!(err.to_string().contains("invalid YAML options"));
    }

    #[test]
    fn test_options_serialize_without_logger() {
        let opts = BatcherOptions::new()
            .with_workers(2)
            .with_batch_timeout(Duration::from_millis(1500))
            .with_logger(NoopLogger);
        let v = serde_json::to_value(&opts).unwrap();
        assert_eq!(
            v,
            serde_json::json!({"workers": 2, "batch_size": 0, "batch_timeout_ms": 1500})
        );
    }
}
