//! Engine settings and the mutable state the engine owns

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

use crate::config::Config;
use crate::engine::record::{OutcomeEntry, PredictionRecord, ProcessedAnnouncement};
use crate::parser::ChannelId;

/// Fixed rules the engine runs with
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Last digits of a game number that arm a prediction
    pub trigger_offsets: BTreeSet<u8>,
    /// Distance from the triggering game to the game that settles it
    pub verification_offset: u32,
    /// Outcome-log length between two digests
    pub report_batch_size: usize,
    /// Wait for the finalizing edit before predicting off a provisional line
    pub two_phase_edits: bool,
    /// Only announcements from this channel are evaluated, when set
    pub stats_channel: Option<ChannelId>,
    /// Evaluated announcements kept for inspection; 0 keeps none
    pub processed_log_limit: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            trigger_offsets: [7, 8].into_iter().collect(),
            verification_offset: 3,
            report_batch_size: 20,
            two_phase_edits: false,
            stats_channel: None,
            processed_log_limit: 1000,
        }
    }
}

impl EngineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            trigger_offsets: config
                .engine
                .trigger_offsets
                .iter()
                .copied()
                .filter(|d| *d < 10)
                .collect(),
            verification_offset: config.engine.verification_offset,
            report_batch_size: config.engine.report_batch_size.max(1),
            two_phase_edits: config.engine.two_phase_edits,
            stats_channel: config.channels.stats_channel,
            processed_log_limit: config.engine.processed_log_limit,
        }
    }
}

/// Everything the engine remembers between announcements.
///
/// This is also the persisted shape: a store saves and restores it whole.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineState {
    /// Keyed by predicted game number; at most one record per key
    #[serde(default)]
    pub predictions: BTreeMap<u32, PredictionRecord>,
    #[serde(default)]
    pub seen_message_fingerprints: HashSet<String>,
    /// Append-only, terminal win/loss outcomes only
    #[serde(default)]
    pub outcome_log: Vec<OutcomeEntry>,
    /// Provisional lines awaiting their finalizing edit, by game number
    #[serde(default)]
    pub pending_edit_markers: BTreeMap<u32, String>,
    /// Most recent evaluated announcements, oldest first
    #[serde(default)]
    pub processed_log: VecDeque<ProcessedAnnouncement>,
}

impl EngineState {
    pub fn clear(&mut self) {
        self.predictions.clear();
        self.seen_message_fingerprints.clear();
        self.outcome_log.clear();
        self.pending_edit_markers.clear();
        self.processed_log.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
            && self.seen_message_fingerprints.is_empty()
            && self.outcome_log.is_empty()
            && self.pending_edit_markers.is_empty()
            && self.processed_log.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::record::PredictionStatus;
    use crate::parser::normalize_suits;

    #[test]
    fn test_default_settings() {
        let settings = EngineSettings::default();
        assert!(settings.trigger_offsets.contains(&7));
        assert!(settings.trigger_offsets.contains(&8));
        assert_eq!(settings.verification_offset, 3);
        assert_eq!(settings.report_batch_size, 20);
    }

    #[test]
    fn test_state_roundtrips_through_json() {
        let mut state = EngineState::default();
        state
            .predictions
            .insert(50, PredictionRecord::new(50, normalize_suits("♠"), 47));
        state.seen_message_fingerprints.insert("abc".to_string());
        state.outcome_log.push(OutcomeEntry {
            game_number: 40,
            status: PredictionStatus::Loss,
        });
        state.pending_edit_markers.insert(57, "#N57 ⏰".to_string());

        let json = serde_json::to_string(&state).unwrap();
        let back: EngineState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let state: EngineState = serde_json::from_str("{}").unwrap();
        assert!(state.is_empty());
    }
}
