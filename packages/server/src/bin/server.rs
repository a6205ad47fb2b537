//! Atelier session gateway.
//!
//! Learners working on the same exercise join a room and see each other's
//! solution updates and comments in real time.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin atelier-server
//! cargo run --bin atelier-server -- --host 0.0.0.0 --port 3000
//! ATELIER_KEEPALIVE_SECS=10 cargo run --bin atelier-server
//! ```

use std::{sync::Arc, time::Duration};

use atelier_server::{
    config::{DEFAULT_MISSED_KEEPALIVES, GatewayConfig},
    infrastructure::{message_pusher::WebSocketMessagePusher, repository::InMemoryRoomRepository},
    ui::{AppState, Server},
};
use atelier_shared::{logger::setup_logger, time::SystemClock};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "atelier-server")]
#[command(about = "Real-time collaboration gateway for exercise rooms", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "ATELIER_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "ATELIER_PORT", default_value = "8080")]
    port: u16,

    /// Interval (seconds) at which clients are expected to send a keepalive ping
    #[arg(long, env = "ATELIER_KEEPALIVE_SECS", default_value = "30")]
    keepalive_secs: u64,

    /// Number of missed keepalives after which a member is evicted
    #[arg(long, env = "ATELIER_MISSED_KEEPALIVES", default_value_t = DEFAULT_MISSED_KEEPALIVES)]
    missed_keepalives: u32,

    /// Interval (seconds) between liveness sweeps
    #[arg(long, env = "ATELIER_SWEEP_SECS", default_value = "10")]
    sweep_secs: u64,
}

impl Args {
    fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            keepalive_interval: Duration::from_secs(self.keepalive_secs.max(1)),
            missed_keepalives: self.missed_keepalives,
            sweep_interval: Duration::from_secs(self.sweep_secs.max(1)),
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();
    let config = args.gateway_config();
    tracing::info!(
        "Evicting members after {:?} without activity (sweep every {:?})",
        config.liveness_timeout(),
        config.sweep_interval
    );

    // Initialize dependencies in order:
    // 1. Repository
    // 2. MessagePusher
    // 3. UseCases (AppState)
    // 4. Server

    // 1. Create Repository (in-memory room registry)
    let repository = Arc::new(InMemoryRoomRepository::new());

    // 2. Create MessagePusher (WebSocket implementation)
    let message_pusher = Arc::new(WebSocketMessagePusher::new());

    // 3. Create UseCases
    let state = AppState::new(repository, message_pusher, Arc::new(SystemClock), &config);

    // 4. Create and run the server
    let server = Server::new(state, config.sweep_interval);
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
