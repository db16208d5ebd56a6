use std::time::Duration;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProducerConfig {
    /// Pause between two produced items (milliseconds)
    #[serde(default = "default_interval_in_ms")]
    pub interval_in_ms: u64,

    /// Prefix of produced item labels; the item id is appended
    #[serde(default = "default_label_prefix")]
    pub label_prefix: String,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            interval_in_ms: default_interval_in_ms(),
            label_prefix: default_label_prefix(),
        }
    }
}

impl ProducerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.interval_in_ms == 0 {
            return Err(Error::Config(ConfigError::Message(
                "producer.interval_in_ms must be greater than 0".into(),
            )));
        }

        if self.label_prefix.is_empty() {
            return Err(Error::Config(ConfigError::Message(
                "producer.label_prefix must not be empty".into(),
            )));
        }

        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_in_ms)
    }

    pub fn label_for(
        &self,
        id: u64,
    ) -> String {
        format!("{}{}", self.label_prefix, id)
    }
}

fn default_interval_in_ms() -> u64 {
    5000
}
fn default_label_prefix() -> String {
    "new book#".to_string()
}
