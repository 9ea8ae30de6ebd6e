//! Per-track vote scores.
//!
//! The store itself is plain data; all mutation is serialized behind the
//! session coordinator's lock, which is what makes every adjustment atomic
//! relative to all others.

use std::collections::HashMap;

use crate::models::Song;

/// Mapping from track name to its signed score. Exactly one entry per
/// distinct track known to the session; scores go negative when downvotes
/// exceed upvotes.
#[derive(Debug, Default)]
pub struct VoteStore {
    scores: HashMap<String, i64>,
}

impl VoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensures a score-0 entry for every catalog track. Existing entries are
    /// left untouched.
    pub fn seed<I>(&mut self, tracks: I)
    where
        I: IntoIterator<Item = String>,
    {
        for track in tracks {
            self.scores.entry(track).or_insert(0);
        }
    }

    /// Applies a ±1 vote and returns the new score. Any track name a
    /// listener votes for becomes trackable: first-seen tracks are created
    /// at score 0 before the delta applies, never rejected.
    pub fn adjust(&mut self, track: &str, delta: i64) -> i64 {
        let score = self.scores.entry(track.to_string()).or_insert(0);
        *score += delta;
        *score
    }

    /// Sets a track's score back to 0 and returns the previous score. Used
    /// when a track is selected to play, so its count restarts for the next
    /// round.
    pub fn reset(&mut self, track: &str) -> i64 {
        self.scores.insert(track.to_string(), 0).unwrap_or(0)
    }

    /// Current score for a track, 0 if it has never been seen.
    pub fn score(&self, track: &str) -> i64 {
        self.scores.get(track).copied().unwrap_or(0)
    }

    /// Immutable copy of all (track, score) pairs, name-sorted so the state
    /// surface renders deterministically.
    pub fn snapshot(&self) -> Vec<Song> {
        let mut songs: Vec<Song> = self
            .scores
            .iter()
            .map(|(name, &score)| Song::new(name.clone(), score))
            .collect();
        songs.sort_by(|a, b| a.name.cmp(&b.name));
        songs
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.scores.iter().map(|(name, &score)| (name.as_str(), score))
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_vote_creates_entry_at_zero() {
        let mut store = VoteStore::new();
        assert_eq!(store.adjust("new.mp3", 1), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn score_is_sum_of_deltas() {
        let mut store = VoteStore::new();
        store.adjust("a.mp3", 1);
        store.adjust("a.mp3", 1);
        store.adjust("a.mp3", -1);
        assert_eq!(store.score("a.mp3"), 1);
    }

    #[test]
    fn downvotes_can_push_score_negative() {
        let mut store = VoteStore::new();
        store.adjust("a.mp3", -1);
        store.adjust("a.mp3", -1);
        assert_eq!(store.score("a.mp3"), -2);
    }

    #[test]
    fn reset_returns_previous_score() {
        let mut store = VoteStore::new();
        store.adjust("a.mp3", 1);
        store.adjust("a.mp3", 1);
        assert_eq!(store.reset("a.mp3"), 2);
        assert_eq!(store.score("a.mp3"), 0);
    }

    #[test]
    fn reset_of_unknown_track_creates_it() {
        let mut store = VoteStore::new();
        assert_eq!(store.reset("a.mp3"), 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn seed_does_not_clobber_existing_scores() {
        let mut store = VoteStore::new();
        store.adjust("a.mp3", 1);
        store.seed(vec!["a.mp3".to_string(), "b.mp3".to_string()]);
        assert_eq!(store.score("a.mp3"), 1);
        assert_eq!(store.score("b.mp3"), 0);
    }

    #[test]
    fn snapshot_is_name_sorted() {
        let mut store = VoteStore::new();
        store.seed(vec!["c".to_string(), "a".to_string(), "b".to_string()]);
        let snapshot = store.snapshot();
        let names: Vec<&str> = snapshot.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }
}
