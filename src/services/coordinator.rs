//! Session coordinator: the single source of truth for vote scores and the
//! currently announced track.
//!
//! Every inbound event is handled with the session lock held, from applying
//! the effect through triggering the broadcast, so each event's effect is
//! atomic and totally ordered relative to all others. Broadcasts only
//! enqueue (bounded, non-blocking), so nothing blocks inside the lock.

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::models::{InboundEvent, NowPlaying, OutboundEvent, Song};
use crate::services::{Broadcaster, ConnectionId, PlaybackSelector, VoteStore};

#[derive(Default)]
struct SessionState {
    votes: VoteStore,
    now_playing: Option<NowPlaying>,
}

pub struct SessionCoordinator {
    state: Mutex<SessionState>,
    selector: PlaybackSelector,
    broadcaster: Broadcaster,
}

impl SessionCoordinator {
    pub fn new(selector: PlaybackSelector, broadcaster: Broadcaster) -> Self {
        Self {
            state: Mutex::new(SessionState::default()),
            selector,
            broadcaster,
        }
    }

    /// Seeds a score-0 entry for every catalog track. Runs once at startup,
    /// before any listener can request playback.
    pub async fn seed(&self, tracks: Vec<String>) {
        let mut state = self.state.lock().await;
        state.votes.seed(tracks);
        info!(tracks = state.votes.len(), "vote store seeded from catalog");
    }

    /// Applies one inbound event from a listener connection.
    pub async fn handle_event(&self, connection: ConnectionId, event: InboundEvent) {
        let mut state = self.state.lock().await;
        match event {
            InboundEvent::Plus { song } => self.apply_vote(&mut state, &song.name, 1).await,
            InboundEvent::Minus { song } => self.apply_vote(&mut state, &song.name, -1).await,
            InboundEvent::Next { song } => {
                self.advance_or_resync(&mut state, connection, &song.name).await
            }
        }
    }

    async fn apply_vote(&self, state: &mut SessionState, track: &str, delta: i64) {
        let score = state.votes.adjust(track, delta);
        debug!(track, score, "vote applied");
        self.broadcaster
            .publish(&OutboundEvent::Update {
                song: Song::new(track, score),
            })
            .await;
    }

    async fn advance_or_resync(
        &self,
        state: &mut SessionState,
        connection: ConnectionId,
        requested: &str,
    ) {
        if let Some(playing) = &state.now_playing {
            if playing.name != requested {
                // The listener's view of the current track is stale (a fresh
                // join requests with an empty name). Re-announce to it alone
                // instead of advancing the whole session.
                debug!(
                    connection = %connection,
                    requested,
                    playing = %playing.name,
                    "out-of-sync advance request, re-announcing"
                );
                let event = OutboundEvent::Play {
                    song: Song::new(playing.name.clone(), state.votes.score(&playing.name)),
                    time: playing.started_at_ms(),
                };
                self.broadcaster.send_to(connection, &event).await;
                return;
            }
        }

        let Some(next) = self.selector.select_next(&state.votes) else {
            warn!("advance requested but no tracks are known");
            return;
        };

        let score = state.votes.reset(&next);
        let now_playing = NowPlaying {
            name: next.clone(),
            score,
            started_at: Utc::now(),
        };
        let event = OutboundEvent::Play {
            song: Song::new(next.clone(), score),
            time: now_playing.started_at_ms(),
        };
        info!(track = %next, score, "now playing");
        state.now_playing = Some(now_playing);
        self.broadcaster.publish(&event).await;
    }

    /// Copy of the current scores and announcement for the state surface.
    /// Never hands out a live reference into the session state.
    pub async fn snapshot(&self) -> (Vec<Song>, Option<NowPlaying>) {
        let state = self.state.lock().await;
        (state.votes.snapshot(), state.now_playing.clone())
    }

    pub async fn now_playing(&self) -> Option<NowPlaying> {
        self.state.lock().await.now_playing.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ConnectionRegistry;
    use serde_json::Value;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    fn coordinator_with_registry(capacity: usize) -> (Arc<SessionCoordinator>, Arc<ConnectionRegistry>) {
        let registry = Arc::new(ConnectionRegistry::new(capacity));
        let coordinator = Arc::new(SessionCoordinator::new(
            PlaybackSelector::new(),
            Broadcaster::new(registry.clone()),
        ));
        (coordinator, registry)
    }

    fn vote(name: &str) -> InboundEvent {
        InboundEvent::Plus {
            song: Song::new(name, 0),
        }
    }

    fn next(name: &str) -> InboundEvent {
        InboundEvent::Next {
            song: Song::new(name, 0),
        }
    }

    fn recv_json(rx: &mut mpsc::Receiver<String>) -> Value {
        serde_json::from_str(&rx.try_recv().expect("expected a queued event")).unwrap()
    }

    #[tokio::test]
    async fn vote_broadcasts_the_new_score() {
        let (coordinator, registry) = coordinator_with_registry(8);
        let (listener, mut rx) = registry.attach().await;

        coordinator.handle_event(listener, vote("a.mp3")).await;

        let event = recv_json(&mut rx);
        assert_eq!(event["command"], "update");
        assert_eq!(event["song"]["name"], "a.mp3");
        assert_eq!(event["song"]["score"], 1);
    }

    #[tokio::test]
    async fn advance_while_idle_plays_the_top_track() {
        let (coordinator, registry) = coordinator_with_registry(8);
        coordinator
            .seed(vec!["a.mp3".to_string(), "b.mp3".to_string()])
            .await;
        let (listener, mut rx) = registry.attach().await;

        coordinator.handle_event(listener, vote("b.mp3")).await;
        coordinator.handle_event(listener, next("")).await;

        let _update = recv_json(&mut rx);
        let play = recv_json(&mut rx);
        assert_eq!(play["command"], "play");
        assert_eq!(play["song"]["name"], "b.mp3");
        assert_eq!(play["song"]["score"], 1);

        let playing = coordinator.now_playing().await.unwrap();
        assert_eq!(playing.name, "b.mp3");
        assert_eq!(playing.score, 1);

        // The chosen track's votes restart for the next round.
        let (tracks, _) = coordinator.snapshot().await;
        let b = tracks.iter().find(|s| s.name == "b.mp3").unwrap();
        assert_eq!(b.score, 0);
    }

    #[tokio::test]
    async fn matching_advance_request_moves_to_the_next_track() {
        let (coordinator, registry) = coordinator_with_registry(8);
        coordinator
            .seed(vec!["a.mp3".to_string(), "b.mp3".to_string()])
            .await;
        let (listener, mut rx) = registry.attach().await;

        coordinator.handle_event(listener, next("")).await;
        let first = recv_json(&mut rx);
        assert_eq!(first["song"]["name"], "a.mp3");

        coordinator.handle_event(listener, vote("b.mp3")).await;
        let _update = recv_json(&mut rx);

        // Naming the current track advances playback.
        coordinator.handle_event(listener, next("a.mp3")).await;
        let second = recv_json(&mut rx);
        assert_eq!(second["command"], "play");
        assert_eq!(second["song"]["name"], "b.mp3");
    }

    #[tokio::test]
    async fn mismatched_advance_resyncs_the_requester_alone() {
        let (coordinator, registry) = coordinator_with_registry(8);
        coordinator
            .seed(vec!["a.mp3".to_string(), "b.mp3".to_string()])
            .await;

        let (voter, mut voter_rx) = registry.attach().await;
        for _ in 0..3 {
            coordinator.handle_event(voter, vote("a.mp3")).await;
        }
        coordinator.handle_event(voter, vote("b.mp3")).await;

        let (joiner, mut joiner_rx) = registry.attach().await;
        coordinator.handle_event(joiner, next("")).await;

        // Both listeners see the announcement: a.mp3 at its selection score.
        for _ in 0..4 {
            let _ = recv_json(&mut voter_rx);
        }
        let play_voter = recv_json(&mut voter_rx);
        let play_joiner = recv_json(&mut joiner_rx);
        for play in [&play_voter, &play_joiner] {
            assert_eq!(play["command"], "play");
            assert_eq!(play["song"]["name"], "a.mp3");
            assert_eq!(play["song"]["score"], 3);
        }
        let announced_time = play_joiner["time"].as_i64().unwrap();

        // A stale request for a different track does not advance; only the
        // requester is re-announced, with the reset score and the original
        // selection timestamp.
        coordinator.handle_event(voter, next("b.mp3")).await;

        let resync = recv_json(&mut voter_rx);
        assert_eq!(resync["command"], "play");
        assert_eq!(resync["song"]["name"], "a.mp3");
        assert_eq!(resync["song"]["score"], 0);
        assert_eq!(resync["time"].as_i64().unwrap(), announced_time);
        assert!(joiner_rx.try_recv().is_err());

        let playing = coordinator.now_playing().await.unwrap();
        assert_eq!(playing.name, "a.mp3");
    }

    #[tokio::test]
    async fn advance_with_no_known_tracks_is_a_guarded_noop() {
        let (coordinator, registry) = coordinator_with_registry(8);
        let (listener, mut rx) = registry.attach().await;

        coordinator.handle_event(listener, next("")).await;

        assert!(rx.try_recv().is_err());
        assert!(coordinator.now_playing().await.is_none());
    }

    #[tokio::test]
    async fn concurrent_votes_serialize_to_their_sum() {
        let (coordinator, registry) = coordinator_with_registry(8);
        coordinator.seed(vec!["a.mp3".to_string()]).await;

        let mut tasks = Vec::new();
        for i in 0..20 {
            let coordinator = coordinator.clone();
            let registry = registry.clone();
            tasks.push(tokio::spawn(async move {
                let (listener, _rx) = registry.attach().await;
                let event = if i % 4 == 0 {
                    InboundEvent::Minus {
                        song: Song::new("a.mp3", 0),
                    }
                } else {
                    vote("a.mp3")
                };
                coordinator.handle_event(listener, event).await;
                registry.detach(listener).await;
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        // 15 upvotes, 5 downvotes.
        let (tracks, _) = coordinator.snapshot().await;
        let a = tracks.iter().find(|s| s.name == "a.mp3").unwrap();
        assert_eq!(a.score, 10);
    }
}
