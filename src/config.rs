use serde::{Deserialize, Serialize};

use crate::error::Error;

pub const DEFAULT_HOOK_NAME: &str = "client-abort-write-guard";

/// Writer hooks run lowest ordinal first; the guard wants to be outermost.
pub const DEFAULT_PRIORITY: i32 = 1;

/// Registration settings for the guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GuardConfig {
    pub name: String,
    pub priority: i32,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_HOOK_NAME.to_string(),
            priority: DEFAULT_PRIORITY,
        }
    }
}

impl GuardConfig {
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.name.trim().is_empty() {
            return Err(Error::Config {
                reason: "hook name must not be empty".into(),
            });
        }
        Ok(())
    }
}
