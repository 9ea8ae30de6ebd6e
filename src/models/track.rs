use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A playable item. Identity is the name alone; the score shown next to it
/// is derived from the vote store, not stored on the track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub name: String,
    #[serde(default)]
    pub score: i64,
}

impl Song {
    pub fn new(name: impl Into<String>, score: i64) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}

/// The single track currently announced as playing.
///
/// `score` is the vote count the track had at selection time, before its
/// entry in the vote store was reset for the next round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NowPlaying {
    pub name: String,
    pub score: i64,
    pub started_at: DateTime<Utc>,
}

impl NowPlaying {
    /// Selection timestamp as epoch milliseconds, the unit the wire protocol
    /// announces.
    pub fn started_at_ms(&self) -> i64 {
        self.started_at.timestamp_millis()
    }
}
