use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::schema::{SchemaVersion, REGION_NAME};

/// How a poll cycle decides the region is safe to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollPolicy {
    /// Wait on the producer's signal; skip the cycle on timeout.
    EventGated,
    /// Read on a fixed interval. Frames may occasionally be torn.
    #[default]
    BlindPoll,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "RawPollConfig")]
pub struct PollConfig {
    pub region: String,
    pub signal: Option<String>,
    pub policy: PollPolicy,
    pub wait_timeout_ms: u64,
    pub poll_interval_ms: u64,
    pub schema: SchemaVersion,
    pub shm_dir: PathBuf,
    pub max_cycles: Option<u64>,
}

/// On-disk shape; `policy` stays optional so a configured signal can pick it.
#[derive(Deserialize)]
struct RawPollConfig {
    #[serde(default = "default_region")]
    region: String,
    #[serde(default)]
    signal: Option<String>,
    #[serde(default)]
    policy: Option<PollPolicy>,
    #[serde(default = "default_wait_timeout_ms")]
    wait_timeout_ms: u64,
    #[serde(default = "default_poll_interval_ms")]
    poll_interval_ms: u64,
    #[serde(default)]
    schema: SchemaVersion,
    #[serde(default = "default_shm_dir")]
    shm_dir: PathBuf,
    #[serde(default)]
    max_cycles: Option<u64>,
}

impl From<RawPollConfig> for PollConfig {
    fn from(raw: RawPollConfig) -> Self {
        // Gate on the producer's event whenever one is named, unless told otherwise.
        let policy = raw.policy.unwrap_or(match raw.signal {
            Some(_) => PollPolicy::EventGated,
            None => PollPolicy::BlindPoll,
        });
        Self {
            region: raw.region,
            signal: raw.signal,
            policy,
            wait_timeout_ms: raw.wait_timeout_ms,
            poll_interval_ms: raw.poll_interval_ms,
            schema: raw.schema,
            shm_dir: raw.shm_dir,
            max_cycles: raw.max_cycles,
        }
    }
}

fn default_region() -> String {
    REGION_NAME.to_string()
}

fn default_wait_timeout_ms() -> u64 {
    1000
}

fn default_poll_interval_ms() -> u64 {
    16
}

fn default_shm_dir() -> PathBuf {
    PathBuf::from("/dev/shm")
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            signal: None,
            policy: PollPolicy::default(),
            wait_timeout_ms: default_wait_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            schema: SchemaVersion::default(),
            shm_dir: default_shm_dir(),
            max_cycles: None,
        }
    }
}

impl PollConfig {
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.region.trim().is_empty() {
            anyhow::bail!("region name is empty");
        }
        if !self.schema.is_decodable() {
            anyhow::bail!("schema {} has no known field layout", self.schema);
        }
        if self.policy == PollPolicy::EventGated && self.wait_timeout_ms == 0 {
            anyhow::bail!("event_gated policy needs a nonzero wait_timeout_ms");
        }
        Ok(())
    }
}

pub fn load_config_file(path: impl AsRef<Path>) -> anyhow::Result<PollConfig> {
    let path = path.as_ref();
    let raw =
        fs::read_to_string(path).with_context(|| format!("reading config: {}", path.display()))?;
    let val: Value =
        serde_yaml::from_str(&raw).with_context(|| format!("parsing yaml: {}", path.display()))?;
    let config: PollConfig = serde_yaml::from_value(val)
        .with_context(|| format!("decoding config: {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("validating config: {}", path.display()))?;
    Ok(config)
}
