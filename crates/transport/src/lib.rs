//! Playback-control messages exchanged between the editor and relay sessions.
//!
//! Every message travels as a single JSON object tagged by its `type` field:
//!
//! ```text
//! {"type":"play"}
//! {"type":"pause"}
//! {"type":"seek","time":12.5}
//! {"type":"update","time":12.5}
//! {"type":"auto","name":"camera/fov"}
//! ```
//!
//! `play`, `pause` and `seek` flow from the editor out to every session.
//! `update` and `auto` are what runtime clients send back.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Message {
    /// The user pressed play.
    Play,
    /// The user pressed pause.
    Pause,
    /// The user moved the playhead to an absolute timeline position.
    Seek { time: f64 },
    /// A runtime client asserts the current playback time.
    Update { time: f64 },
    /// A runtime client is driving the named channel.
    Auto { name: String },
}

#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("Failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Malformed message: {0}")]
    Malformed(#[source] serde_json::Error),
}

impl Message {
    pub fn seek(time: f64) -> Self {
        Message::Seek { time }
    }

    /// The value of the `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Play => "play",
            Message::Pause => "pause",
            Message::Seek { .. } => "seek",
            Message::Update { .. } => "update",
            Message::Auto { .. } => "auto",
        }
    }

    pub fn encode(&self) -> Result<String, WireError> {
        serde_json::to_string(self).map_err(WireError::Encode)
    }

    pub fn decode(text: &str) -> Result<Self, WireError> {
        serde_json::from_str(text).map_err(WireError::Malformed)
    }
}

/// Decode every message carried by one socket frame.
///
/// A frame normally holds a single JSON object, but peers may also batch
/// several objects separated by newlines. Each line is decoded on its own so
/// one bad line does not hide the others.
pub fn decode_frame(frame: &str) -> Vec<Result<Message, WireError>> {
    match Message::decode(frame) {
        Ok(message) => vec![Ok(message)],
        Err(err) if !frame.trim().contains('\n') => vec![Err(err)],
        Err(_) => frame
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(Message::decode)
            .collect(),
    }
}
