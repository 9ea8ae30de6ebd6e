//! Playback selection over the current vote scores.

use std::cmp::Ordering;

use crate::services::VoteStore;

/// Comparator deciding between tracks with equal scores. Returns `Less` when
/// the first track should win the tie.
pub type TieBreak = fn(&str, &str) -> Ordering;

/// Picks the next track to play: the maximal score among all known tracks,
/// ties resolved by an explicit comparator so the choice never depends on
/// map iteration order.
pub struct PlaybackSelector {
    tie_break: TieBreak,
}

impl Default for PlaybackSelector {
    /// Lexicographic tie-break: the smallest name wins.
    fn default() -> Self {
        Self { tie_break: str::cmp }
    }
}

impl PlaybackSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tie_break(tie_break: TieBreak) -> Self {
        Self { tie_break }
    }

    /// Returns the track with the strictly maximal score, or `None` when no
    /// tracks are known. The caller resets the chosen track's score.
    pub fn select_next(&self, scores: &VoteStore) -> Option<String> {
        let mut best: Option<(&str, i64)> = None;
        for (name, score) in scores.iter() {
            best = match best {
                None => Some((name, score)),
                Some((best_name, best_score)) => {
                    if score > best_score
                        || (score == best_score
                            && (self.tie_break)(name, best_name) == Ordering::Less)
                    {
                        Some((name, score))
                    } else {
                        Some((best_name, best_score))
                    }
                }
            };
        }
        best.map(|(name, _)| name.to_string())
    }
}
