use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::parser::ChannelId;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub data_dir: String,
    pub engine: EngineConfig,
    pub channels: ChannelsConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub replay: Option<ReplayConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_trigger_offsets")]
    pub trigger_offsets: Vec<u8>,
    #[serde(default = "default_verification_offset")]
    pub verification_offset: u32,
    #[serde(default = "default_report_batch_size")]
    pub report_batch_size: usize,
    #[serde(default = "default_false")]
    pub two_phase_edits: bool,
    #[serde(default = "default_processed_log_limit")]
    pub processed_log_limit: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelsConfig {
    /// Results feed the engine reads
    #[serde(default)]
    pub stats_channel: Option<ChannelId>,
    /// Where predictions and digests are published
    #[serde(default)]
    pub display_channel: Option<ChannelId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_state_file")]
    pub state_file: String,
    #[serde(default = "default_retention_days")]
    pub retention_days: i64,
    #[serde(default = "default_prune_interval_secs")]
    pub prune_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplayConfig {
    pub feed_path: String,
    #[serde(default = "default_outbox_file")]
    pub outbox_file: String,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config from {:?}", path.as_ref()))?;
        let config: Config = toml::from_str(&content)
            .context("Failed to parse config TOML")?;
        Ok(config)
    }

    pub fn state_path(&self) -> PathBuf {
        Path::new(&self.data_dir).join(&self.storage.state_file)
    }

    pub fn outbox_path(&self) -> Option<PathBuf> {
        self.replay
            .as_ref()
            .map(|r| Path::new(&self.data_dir).join(&r.outbox_file))
    }
}

fn default_trigger_offsets() -> Vec<u8> {
    vec![7, 8]
}

fn default_verification_offset() -> u32 {
    3
}

fn default_report_batch_size() -> usize {
    20
}

fn default_false() -> bool {
    false
}

fn default_processed_log_limit() -> usize {
    1000
}

fn default_state_file() -> String {
    "engine_state.json".to_string()
}

fn default_retention_days() -> i64 {
    30
}

fn default_prune_interval_secs() -> u64 {
    3600
}

fn default_outbox_file() -> String {
    "outbox.jsonl".to_string()
}
