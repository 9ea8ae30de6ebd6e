pub mod broadcaster;
pub mod catalog;
pub mod coordinator;
pub mod registry;
pub mod selector;
pub mod vote_store;

pub use broadcaster::Broadcaster;
pub use catalog::{FsCatalog, TrackCatalog};
pub use coordinator::SessionCoordinator;
pub use registry::{ConnectionId, ConnectionRegistry};
pub use selector::PlaybackSelector;
pub use vote_store::VoteStore;
