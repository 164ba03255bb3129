use crate::parser::{ChannelId, MessageId};

/// Work the engine hands back to its transport after an announcement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineAction {
    /// Send a new prediction; report the resulting message with
    /// `record_published` so it can be edited later
    Publish {
        predicted_game_number: u32,
        text: String,
    },
    /// Rewrite a previously published prediction
    EditMessage {
        channel: ChannelId,
        message_id: MessageId,
        new_text: String,
    },
    PublishDigest {
        text: String,
    },
}
