use rms_sync::RetryPolicy;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// Client tuning. Every field has a default, so a TOML file only needs the
/// keys it changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Blobs kept in the shared cache.
    pub cache_capacity: usize,
    /// Backoff for transient transport failures.
    pub retry: RetryPolicy,
    /// Read-modify-write rounds before a transaction gives up.
    pub transact_attempts: u32,
    /// Ask the server to notify other devices on root writes.
    pub broadcast: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 1024,
            retry: RetryPolicy::default(),
            transact_attempts: 5,
            broadcast: true,
        }
    }
}

impl ClientConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> ClientResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| ClientError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ClientResult<()> {
        if self.cache_capacity == 0 {
            return Err(ClientError::Config("cache_capacity must be at least 1".into()));
        }
        if self.retry.max_attempts == 0 {
            return Err(ClientError::Config("retry.max_attempts must be at least 1".into()));
        }
        if self.retry.base_delay_ms > self.retry.max_delay_ms {
            return Err(ClientError::Config(
                "retry.base_delay_ms exceeds retry.max_delay_ms".into(),
            ));
        }
        if self.transact_attempts == 0 {
            return Err(ClientError::Config("transact_attempts must be at least 1".into()));
        }
        Ok(())
    }
}
