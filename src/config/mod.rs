//! Configuration management for the notification service.
//!
//! Provides hierarchical configuration loading and validation with:
//! - Default values as code base
//! - Configuration file support (`CONFIG_PATH`)
//! - Environment variable overrides (`NOTIFY__` prefix)
//! - Component-wise validation
mod producer;
mod service;
pub use producer::*;
pub use service::*;


use std::env;
use std::fmt::Debug;

use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::Result;

const ENV_PREFIX: &str = "NOTIFY";

/// Main configuration container
///
/// Merged from the following sources (later sources override earlier):
/// 1. Default values from code implementation
/// 2. Configuration file specified by `CONFIG_PATH`
/// 3. Environment variables (highest priority)
#[derive(Serialize, Deserialize, Clone, Default)]
pub struct NotifyConfig {
    /// Item store seeding
    #[serde(default)]
    pub service: ServiceConfig,
    /// Background producer cadence and labeling
    #[serde(default)]
    pub producer: ProducerConfig,
}

impl Debug for NotifyConfig {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("NotifyConfig")
            .field("seed_items", &self.service.seed_items.len())
            .field("producer", &self.producer)
            .finish()
    }
}

impl NotifyConfig {
    /// Loads configuration from hierarchical sources without validation.
    ///
    /// Callers MUST call [`validate`](Self::validate) before using the result.
    ///
    /// # Examples
    /// ```ignore
    /// std::env::set_var("CONFIG_PATH", "config/notify.toml");
    /// std::env::set_var("NOTIFY__PRODUCER__INTERVAL_IN_MS", "1000");
    /// let cfg = NotifyConfig::new()?.validate()?;
    /// ```
    pub fn new() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Ok(config_path) = env::var("CONFIG_PATH") {
            builder = builder.add_source(File::with_name(&config_path).required(true));
        }

        let config: Self = builder.add_source(env_source()).build()?.try_deserialize()?;
        Ok(config)
    }

    /// Applies additional overrides from file without validation.
    ///
    /// Merging order: current values, then `path`, then environment
    /// variables.
    pub fn with_override_config(
        &self,
        path: &str,
    ) -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(Config::try_from(self)?)
            .add_source(File::with_name(path))
            .add_source(env_source())
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Validates every section and returns the validated instance.
    pub fn validate(self) -> Result<Self> {
        self.service.validate()?;
        self.producer.validate()?;
        Ok(self)
    }
}

fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .ignore_empty(true)
        .try_parsing(true)
}
