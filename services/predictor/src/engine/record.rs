//! Prediction records and verdicts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::parser::{ChannelId, MessageId, SuitSet};

/// Lifecycle of a prediction. `Pending` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionStatus {
    Pending,
    Win,
    Loss,
    Duplicate,
}

impl PredictionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PredictionStatus::Pending)
    }
}

/// Where a prediction was published downstream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRef {
    pub channel: ChannelId,
    pub message_id: MessageId,
}

/// One evaluated announcement, kept in a bounded history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedAnnouncement {
    pub game_number: u32,
    pub channel: ChannelId,
    pub is_edit: bool,
    pub received_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub predicted_game_number: u32,
    pub predicted_suits: SuitSet,
    pub status: PredictionStatus,
    /// Game whose announcement armed this prediction
    pub source_game_number: u32,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub outgoing_message_ref: Option<MessageRef>,
}

impl PredictionRecord {
    pub fn new(
        predicted_game_number: u32,
        predicted_suits: SuitSet,
        source_game_number: u32,
    ) -> Self {
        Self {
            predicted_game_number,
            predicted_suits,
            status: PredictionStatus::Pending,
            source_game_number,
            created_at: Utc::now(),
            resolved_at: None,
            outgoing_message_ref: None,
        }
    }

    /// Move out of `Pending`. Returns false, leaving the record untouched,
    /// if the record is already terminal or `status` is `Pending`.
    pub fn resolve(&mut self, status: PredictionStatus) -> bool {
        if self.status.is_terminal() || !status.is_terminal() {
            return false;
        }
        self.status = status;
        self.resolved_at = Some(Utc::now());
        true
    }
}

/// Why a verification came out the way it did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictDetail {
    /// Predicted suits found in this revealed hand (0-based)
    Matched { group: usize },
    NoMatch,
    /// One of the revealed hands did not hold exactly two cards
    MalformedReveal { first: usize, second: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub predicted_game_number: u32,
    pub status: PredictionStatus,
    pub detail: VerdictDetail,
}

/// One terminal outcome, in the order it was decided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeEntry {
    pub game_number: u32,
    pub status: PredictionStatus,
}
