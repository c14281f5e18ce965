//! Session tuning knobs.

use std::path::Path;
use std::time::Duration;

use liftvox_parse::Vocabulary;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Delay before asking for the next set after a commit.
    #[serde(default = "default_reprompt_delay_ms")]
    pub reprompt_delay_ms: u64,

    /// Delay before re-asking after an utterance could not be parsed.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Consecutive parse failures tolerated for one target before voice
    /// input gives up. `None` retries forever.
    #[serde(default = "default_max_parse_retries")]
    pub max_parse_retries: Option<u32>,

    #[serde(default)]
    pub vocabulary: Vocabulary,
}

fn default_reprompt_delay_ms() -> u64 {
    1500
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_max_parse_retries() -> Option<u32> {
    Some(3)
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            reprompt_delay_ms: default_reprompt_delay_ms(),
            retry_delay_ms: default_retry_delay_ms(),
            max_parse_retries: default_max_parse_retries(),
            vocabulary: Vocabulary::default(),
        }
    }
}

impl SessionConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_json::from_str(&json)?;
        config.vocabulary.validate()?;
        Ok(config)
    }

    pub fn reprompt_delay(&self) -> Duration {
        Duration::from_millis(self.reprompt_delay_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// True once `failures` consecutive failures exceed the cap.
    pub fn retries_exhausted(&self, failures: u32) -> bool {
        self.max_parse_retries.is_some_and(|max| failures > max)
    }
}
