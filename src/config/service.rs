use std::collections::HashSet;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Item;
use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServiceConfig {
    /// Items placed into an empty store when the service starts
    #[serde(default = "default_seed_items")]
    pub seed_items: Vec<Item>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            seed_items: default_seed_items(),
        }
    }
}

impl ServiceConfig {
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for item in &self.seed_items {
            if !seen.insert(item.id) {
                return Err(Error::Config(ConfigError::Message(format!(
                    "service.seed_items contains duplicate id {}",
                    item.id
                ))));
            }
        }
        Ok(())
    }
}

fn default_seed_items() -> Vec<Item> {
    vec![Item::new(1, "Android"), Item::new(2, "Ios")]
}
