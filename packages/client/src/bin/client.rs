//! Atelier collaboration client.
//!
//! Joins the room of an exercise, prints the roster and the activity of the
//! other members, and sends comments and solution updates typed at the
//! prompt. Reconnects automatically when the connection drops.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin atelier-client -- --user-id 1 --username alice --exercise-id 42
//! ATELIER_ORIGIN=https://atelier.example.com cargo run --bin atelier-client -- -i 2 -n bob -e 42
//! ```

use std::time::Duration;

use atelier_client::{
    config::{DEFAULT_MAX_RECONNECT_ATTEMPTS, SessionConfig, endpoint_url},
    runner::run_client,
};
use atelier_shared::logger::setup_logger;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "atelier-client")]
#[command(about = "Join an exercise room and collaborate in real time", long_about = None)]
struct Args {
    /// Numeric ID of the user
    #[arg(short = 'i', long, env = "ATELIER_USER_ID")]
    user_id: u64,

    /// Display name shown to other members
    #[arg(short = 'n', long, env = "ATELIER_USERNAME")]
    username: String,

    /// Numeric ID of the exercise whose room to join
    #[arg(short = 'e', long, env = "ATELIER_EXERCISE_ID")]
    exercise_id: u64,

    /// Application origin; the WebSocket endpoint is derived from it
    #[arg(short = 'o', long, env = "ATELIER_ORIGIN", default_value = "http://127.0.0.1:8080")]
    origin: String,

    /// WebSocket endpoint URL (overrides --origin)
    #[arg(short = 'u', long)]
    url: Option<String>,

    /// Milliseconds to wait before each reconnection attempt
    #[arg(long, env = "ATELIER_RECONNECT_INTERVAL_MS", default_value = "3000")]
    reconnect_interval_ms: u64,

    /// Reconnection attempts before giving up
    #[arg(long, env = "ATELIER_MAX_RECONNECT_ATTEMPTS", default_value_t = DEFAULT_MAX_RECONNECT_ATTEMPTS)]
    max_reconnect_attempts: u32,

    /// Seconds between keepalive pings
    #[arg(long, env = "ATELIER_KEEPALIVE_SECS", default_value = "30")]
    keepalive_secs: u64,
}

impl Args {
    fn session_config(&self) -> Result<SessionConfig, atelier_client::error::ClientError> {
        let url = match &self.url {
            Some(url) => url.clone(),
            None => endpoint_url(&self.origin)?,
        };

        let mut config = SessionConfig::new(url, self.user_id, &self.username, self.exercise_id);
        config.reconnect_interval = Duration::from_millis(self.reconnect_interval_ms);
        config.max_reconnect_attempts = self.max_reconnect_attempts;
        config.keepalive_interval = Duration::from_secs(self.keepalive_secs.max(1));
        Ok(config)
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();
    let config = match args.session_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(2);
        }
    };

    // Run the client
    if let Err(e) = run_client(config).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
