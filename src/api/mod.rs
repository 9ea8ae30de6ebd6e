pub mod session;
pub mod ws;

pub use session::{session_routes, AppState};
pub use ws::ws_handler;
