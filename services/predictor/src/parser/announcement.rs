//! Announcement records and their parsed form

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::parser::extract::{extract_game_number, extract_symbol_groups};

pub type ChannelId = i64;
pub type MessageId = i64;

/// Markers the results feed puts on a line that is still being played
const PROVISIONAL_MARKERS: &[&str] = &["⏰", "🕐"];
/// Markers the results feed puts on a line once the game is settled
const FINALIZED_MARKERS: &[&str] = &["🔰", "✅"];

/// One observed line from the results feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    pub text: String,
    pub channel: ChannelId,
    #[serde(default)]
    pub is_edit: bool,
}

impl Announcement {
    pub fn new(text: &str, channel: ChannelId) -> Self {
        Self {
            text: text.to_string(),
            channel,
            is_edit: false,
        }
    }

    pub fn edited(text: &str, channel: ChannelId) -> Self {
        Self {
            is_edit: true,
            ..Self::new(text, channel)
        }
    }
}

/// Where an announcement sits in the post-then-edit lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnouncementPhase {
    /// Game still running; the line will be edited later
    Provisional,
    /// Game settled
    Finalized,
    /// No lifecycle marker at all
    Plain,
}

/// Structured view of an announcement
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedAnnouncement {
    pub game_number: Option<u32>,
    /// Raw parenthesized groups, not yet suit-normalized
    pub symbol_groups: Vec<String>,
}

impl ParsedAnnouncement {
    pub fn first_group(&self) -> Option<&str> {
        self.symbol_groups.first().map(|g| g.as_str())
    }
}

pub fn parse_announcement(text: &str) -> ParsedAnnouncement {
    ParsedAnnouncement {
        game_number: extract_game_number(text),
        symbol_groups: extract_symbol_groups(text),
    }
}

/// Provisional wins if a line somehow carries both kinds of marker.
pub fn detect_phase(text: &str) -> AnnouncementPhase {
    if PROVISIONAL_MARKERS.iter().any(|m| text.contains(m)) {
        AnnouncementPhase::Provisional
    } else if FINALIZED_MARKERS.iter().any(|m| text.contains(m)) {
        AnnouncementPhase::Finalized
    } else {
        AnnouncementPhase::Plain
    }
}

/// SHA256 hex digest of the trimmed text
pub fn fingerprint(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.trim().as_bytes());
    format!("{:x}", hasher.finalize())
}
