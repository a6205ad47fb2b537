//! Server execution logic.

use std::{future::Future, sync::Arc, time::Duration};

use axum::{Router, routing::get};
use tokio::{net::TcpListener, task::JoinHandle};
use tower_http::trace::TraceLayer;

use super::{
    handler::{get_room_detail, get_rooms, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Shortest sweep period; `tokio::time::interval` rejects zero
const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(1);

/// Session Gateway server
///
/// # Example
///
/// ```ignore
/// let state = AppState::new(repository, message_pusher, clock, &config);
/// let server = Server::new(state, config.sweep_interval);
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
    /// 期限切れの参加者を探す間隔
    sweep_interval: Duration,
}

impl Server {
    pub fn new(state: AppState, sweep_interval: Duration) -> Self {
        Self {
            state: Arc::new(state),
            sweep_interval: sweep_interval.max(MIN_SWEEP_INTERVAL),
        }
    }

    /// ルーティングを定義
    pub fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/rooms", get(get_rooms))
            .route("/api/rooms/{exercise_id}", get(get_room_detail))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Run the gateway until Ctrl+C or SIGTERM
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 8080)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Session gateway listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }

    /// 受け付け済みの listener で gateway を動かす。`shutdown` が完了すると停止する。
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        let sweeper = spawn_liveness_sweeper(self.state.clone(), self.sweep_interval);

        let result = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await;

        sweeper.abort();
        result
    }
}

/// 一定間隔で期限切れの参加者を削除するタスクを起動
fn spawn_liveness_sweeper(state: Arc<AppState>, sweep_interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let departures = state.evict_stale_members_usecase.execute().await;
            if !departures.is_empty() {
                tracing::info!("Liveness sweep evicted {} member(s)", departures.len());
            }
        }
    })
}
