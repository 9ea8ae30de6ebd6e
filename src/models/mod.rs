pub mod event;
pub mod track;

pub use event::{InboundEvent, OutboundEvent, ParseError};
pub use track::{NowPlaying, Song};
