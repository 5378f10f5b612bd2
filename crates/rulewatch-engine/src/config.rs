//! Runtime configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! TOML file, then `RULEWATCH__SECTION__KEY` environment variables.

use rulewatch_core::errors::{ExError, ExErrorKind};
use rulewatch_store::rules::{validate_batch_size, DEFAULT_BATCH_SIZE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable prefix; sections are separated by `__`
pub const ENV_PREFIX: &str = "RULEWATCH";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("rulewatch.db"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 60,
            user_agent: format!("rulewatch/{}", env!("CARGO_PKG_VERSION")),
            max_redirects: 10,
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub batch_size: usize,
    /// Sources captured at the same time
    pub concurrency: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            concurrency: 8,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleWatchConfig {
    pub database: DatabaseConfig,
    pub fetch: FetchConfig,
    pub capture: CaptureConfig,
}

fn config_error(err: impl std::fmt::Display) -> ExError {
    ExError::new(ExErrorKind::Config)
        .with_op("load_config")
        .with_message(err.to_string())
}

impl RuleWatchConfig {
    /// Load defaults, then `file` if given, then the process environment
    ///
    /// # Errors
    ///
    /// `Config` if the file is missing or malformed, a value has the wrong
    /// type, or validation fails.
    pub fn load(file: Option<&Path>) -> Result<Self, ExError> {
        Self::load_with_env(
            file,
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
    }

    /// Same as [`RuleWatchConfig::load`] with an explicit environment source
    ///
    /// # Errors
    ///
    /// See [`RuleWatchConfig::load`].
    pub fn load_with_env(
        file: Option<&Path>,
        env: config::Environment,
    ) -> Result<Self, ExError> {
        let mut builder = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default()).map_err(config_error)?);

        if let Some(path) = file {
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(true),
            );
        }

        let loaded: Self = builder
            .add_source(env)
            .build()
            .map_err(config_error)?
            .try_deserialize()
            .map_err(config_error)?;

        loaded.validate()?;
        Ok(loaded)
    }

    /// Reject values the capture pipeline cannot run with
    ///
    /// # Errors
    ///
    /// `Config` naming the offending key.
    pub fn validate(&self) -> Result<(), ExError> {
        if self.fetch.timeout_secs == 0 {
            return Err(config_error("fetch.timeout_secs must be greater than zero"));
        }
        if self.capture.concurrency == 0 {
            return Err(config_error("capture.concurrency must be greater than zero"));
        }
        validate_batch_size(self.capture.batch_size)
            .map_err(|e| config_error(format!("capture.batch_size: {}", e.message())))?;
        Ok(())
    }
}
