//! Driver configuration.

use std::time::Duration;

use serde::Deserialize;

const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(20);

/// Tunables for [`ExplorationDriver`](crate::ExplorationDriver).
///
/// Deserializes from e.g. `{ "generation_timeout_ms": 5000, "reuse_in_progress": true }`;
/// omitted fields keep their defaults.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Upper bound for every insight or feedback generation call.
    #[serde(rename = "generation_timeout_ms", with = "millis")]
    pub generation_timeout: Duration,
    /// Return an existing in-progress session from `start` instead of opening a second one.
    pub reuse_in_progress: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            generation_timeout: DEFAULT_GENERATION_TIMEOUT,
            reuse_in_progress: true,
        }
    }
}

impl DriverConfig {
    pub fn with_generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = timeout;
        self
    }

    pub fn with_reuse_in_progress(mut self, reuse: bool) -> Self {
        self.reuse_in_progress = reuse;
        self
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
