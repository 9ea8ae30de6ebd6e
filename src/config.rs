use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory scanned for playable tracks and served for byte-range
    /// audio requests.
    pub music_dir: PathBuf,
    pub server_host: String,
    pub server_port: u16,
    /// Bound of each listener's outbound queue. A listener that falls this
    /// many events behind is disconnected rather than stalling broadcasts.
    pub outbound_queue_capacity: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let outbound_queue_capacity = env::var("OUTBOUND_QUEUE_CAPACITY")
            .unwrap_or_else(|_| "32".to_string())
            .parse()
            .unwrap_or(32);
        if outbound_queue_capacity == 0 {
            return Err(anyhow::anyhow!(
                "OUTBOUND_QUEUE_CAPACITY must be at least 1"
            ));
        }

        Ok(Config {
            music_dir: env::var("MUSIC_DIR")
                .unwrap_or_else(|_| "Music".to_string())
                .into(),
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .unwrap_or(8000),
            outbound_queue_capacity,
        })
    }
}
