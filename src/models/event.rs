//! Wire events exchanged with listeners.
//!
//! Each WebSocket text message is one complete JSON event tagged by its
//! `command` field. Inbound events originate from listeners, outbound events
//! from the session coordinator.

use serde::{Deserialize, Serialize};

use crate::models::Song;

/// Events a listener may send.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum InboundEvent {
    /// Upvote a track.
    Plus { song: Song },
    /// Downvote a track.
    Minus { song: Song },
    /// Request playback advancement. A listener that just joined sends an
    /// empty track name to learn the current state.
    Next { song: Song },
}

/// Events the coordinator fans out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum OutboundEvent {
    /// A track's score changed.
    Update { song: Song },
    /// A track was announced as now playing. `time` is epoch milliseconds.
    Play { song: Song, time: i64 },
}

/// Command tags `InboundEvent` understands. Used to tell a malformed message
/// for a known command apart from an unknown command.
const KNOWN_COMMANDS: [&str; 3] = ["plus", "minus", "next"];

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Well-formed JSON naming a command we do not handle. Ignored by the
    /// read loop; the connection stays up.
    #[error("unknown command {0:?}")]
    UnknownCommand(String),

    /// Invalid JSON, or a known command with a broken payload. A protocol
    /// error that ends the listener's read loop.
    #[error("malformed message: {0}")]
    Malformed(#[source] serde_json::Error),
}

impl InboundEvent {
    /// Decodes one inbound message, classifying failures per the protocol
    /// error taxonomy.
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        match serde_json::from_str::<InboundEvent>(raw) {
            Ok(event) => Ok(event),
            Err(primary) => {
                #[derive(Deserialize)]
                struct Envelope {
                    command: String,
                }

                match serde_json::from_str::<Envelope>(raw) {
                    Ok(envelope) if !KNOWN_COMMANDS.contains(&envelope.command.as_str()) => {
                        Err(ParseError::UnknownCommand(envelope.command))
                    }
                    _ => Err(ParseError::Malformed(primary)),
                }
            }
        }
    }
}
