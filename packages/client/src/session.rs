//! Client session manager.
//!
//! [`CollabSession`] owns one connection to the collaboration endpoint for a
//! single user and exercise. A background session loop opens the transport,
//! joins the room, keeps the connection alive, reconnects after unexpected
//! closes and folds inbound envelopes into the roster and activity log.
//!
//! ## State machine
//!
//! ```text
//! Closed -> Connecting -> Open -> Closing -> Closed        (disconnect)
//!                          |
//!                          +--> Closed -> Connecting ...   (lost, retried)
//!                                           |
//!                                           +--> Failed    (retries exhausted)
//!
//! Connecting -> Closed                                     (disconnect before open)
//! ```
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - 接続・join・受信イベントの反映・送信・切断・再接続
//!
//! ### なぜこのテストが必要か
//! - 再接続の回数が上限どおりであることを保証（最初の接続 + 上限回）
//! - 接続していないときの送信がキューされずにエラーになることを保証
//! - 名簿とアクティビティログが受信したエンベロープどおりに更新されることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：接続・join・受信・送信・切断
//! - 異常系：接続先に到達できない、接続が途中で切れる
//! - エッジケース：再接続成功後の回数リセット、不明なメッセージ

use std::sync::Arc;

use atelier_shared::{
    protocol::{
        ClientEnvelope, CommentSubmission, Heartbeat, Identity, RosterEntry, ServerEnvelope,
        SolutionSubmission,
    },
    time::get_timestamp,
};
use tokio::{
    sync::{Mutex, mpsc},
    task::JoinHandle,
    time::{Duration, Instant},
};

use crate::{
    activity::ActivityLog,
    config::SessionConfig,
    error::ClientError,
    reconnect::should_attempt_reconnect,
    transport::{Connector, OutboundFrame, TransportEvent, TransportHandle},
};

/// Notice emitted when a send is attempted while not connected
pub const NOT_CONNECTED_NOTICE: &str = "cannot send message, not connected";

/// Terminal notice emitted when every reconnection attempt failed
pub const RECONNECT_EXHAUSTED_NOTICE: &str =
    "connection lost, could not reconnect — refresh to try again";

/// Shortest keepalive period; `tokio::time::interval` rejects zero
const MIN_KEEPALIVE_INTERVAL: Duration = Duration::from_millis(1);

/// How long `disconnect` waits for the transport to confirm the close
const CLOSE_GRACE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Closed,
    Connecting,
    Open,
    Closing,
    /// 再接続の上限に達した（終端状態）
    Failed,
}

/// セッションから UI へ届くイベント
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    StateChanged(ConnectionState),
    /// 名簿が置き換えられた
    RosterChanged(Vec<RosterEntry>),
    /// アクティビティログに追加された
    Activity(ServerEnvelope),
    /// 利用者に表示するお知らせ
    Notice(String),
}

#[derive(Debug)]
enum Command {
    Send(String),
    Disconnect,
}

/// How a single open connection ended
enum ConnectionEnd {
    /// `disconnect` was requested
    Disconnected,
    /// The transport closed unexpectedly
    Lost,
    /// Every `CollabSession` handle was dropped
    Abandoned,
}

enum ConnectAttempt {
    Opened(TransportHandle),
    Failed(ClientError),
    /// `disconnect` was requested or every handle was dropped
    Cancelled,
}

struct Snapshot {
    state: ConnectionState,
    roster: Vec<RosterEntry>,
    activity: ActivityLog,
}

/// Shared view of the session and the event sink
#[derive(Clone)]
struct SessionShared {
    snapshot: Arc<Mutex<Snapshot>>,
    events: mpsc::UnboundedSender<SessionEvent>,
}

impl SessionShared {
    fn emit(&self, event: SessionEvent) {
        // The UI may have stopped listening
        let _ = self.events.send(event);
    }

    fn notice(&self, message: impl Into<String>) {
        self.emit(SessionEvent::Notice(message.into()));
    }

    async fn state(&self) -> ConnectionState {
        self.snapshot.lock().await.state
    }

    async fn set_state(&self, state: ConnectionState) {
        let mut snapshot = self.snapshot.lock().await;
        if snapshot.state != state {
            tracing::debug!("Session state {:?} -> {:?}", snapshot.state, state);
            snapshot.state = state;
            self.emit(SessionEvent::StateChanged(state));
        }
    }

    async fn replace_roster(&self, roster: Vec<RosterEntry>) {
        self.snapshot.lock().await.roster = roster.clone();
        self.emit(SessionEvent::RosterChanged(roster));
    }

    async fn append_activity(&self, envelope: ServerEnvelope) {
        self.snapshot.lock().await.activity.push(envelope.clone());
        self.emit(SessionEvent::Activity(envelope));
    }
}

/// Owned collaboration session for one user in one exercise room
pub struct CollabSession {
    identity: Identity,
    commands: mpsc::UnboundedSender<Command>,
    shared: SessionShared,
    task: JoinHandle<()>,
}

impl CollabSession {
    /// Start the session loop and begin connecting.
    ///
    /// # Returns
    ///
    /// The session handle and the stream of [`SessionEvent`]s.
    pub fn start(
        config: SessionConfig,
        connector: Arc<dyn Connector>,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();

        let shared = SessionShared {
            snapshot: Arc::new(Mutex::new(Snapshot {
                state: ConnectionState::Closed,
                roster: Vec::new(),
                activity: ActivityLog::new(config.activity_capacity),
            })),
            events: events_tx,
        };
        let identity = Identity {
            user_id: config.user_id,
            username: config.username.clone(),
            exercise_id: config.exercise_id,
        };

        let session_loop = SessionLoop {
            config,
            identity: identity.clone(),
            connector,
            commands: commands_rx,
            shared: shared.clone(),
        };
        let task = tokio::spawn(session_loop.run());

        (
            Self {
                identity,
                commands: commands_tx,
                shared,
                task,
            },
            events_rx,
        )
    }

    pub async fn state(&self) -> ConnectionState {
        self.shared.state().await
    }

    /// 現在の名簿
    pub async fn roster(&self) -> Vec<RosterEntry> {
        self.shared.snapshot.lock().await.roster.clone()
    }

    /// アクティビティログ（古い順）
    pub async fn activity(&self) -> Vec<ServerEnvelope> {
        self.shared.snapshot.lock().await.activity.entries()
    }

    /// 解答の更新を送信
    pub async fn send_solution(&self, solution: impl Into<String>) -> Result<(), ClientError> {
        self.send(ClientEnvelope::UpdateSolution(SolutionSubmission {
            identity: self.identity.clone(),
            solution: solution.into(),
            timestamp: Some(get_timestamp()),
        }))
        .await
    }

    /// コメントを送信
    pub async fn send_comment(&self, comment: impl Into<String>) -> Result<(), ClientError> {
        self.send(ClientEnvelope::Comment(CommentSubmission {
            identity: self.identity.clone(),
            comment: comment.into(),
            timestamp: Some(get_timestamp()),
        }))
        .await
    }

    /// 任意のエンベロープを送信
    ///
    /// 送信者情報とクライアント側の時刻はこのセッションのものに置き換える。
    /// 接続が開いていない場合は送信せず（キューもしない）`NotConnected` を返す。
    pub async fn send(&self, envelope: ClientEnvelope) -> Result<(), ClientError> {
        if self.shared.state().await != ConnectionState::Open {
            self.shared.notice(NOT_CONNECTED_NOTICE);
            return Err(ClientError::NotConnected);
        }

        let envelope = self.stamp(envelope);
        let text = serde_json::to_string(&envelope)
            .map_err(|e| ClientError::EncodeFailed(e.to_string()))?;
        self.commands.send(Command::Send(text)).map_err(|_| {
            self.shared.notice(NOT_CONNECTED_NOTICE);
            ClientError::NotConnected
        })
    }

    fn stamp(&self, envelope: ClientEnvelope) -> ClientEnvelope {
        let identity = self.identity.clone();
        let timestamp = Some(get_timestamp());
        match envelope {
            ClientEnvelope::Join(_) => ClientEnvelope::Join(identity),
            ClientEnvelope::Leave(_) => ClientEnvelope::Leave(identity),
            ClientEnvelope::UpdateSolution(submission) => {
                ClientEnvelope::UpdateSolution(SolutionSubmission {
                    identity,
                    solution: submission.solution,
                    timestamp,
                })
            }
            ClientEnvelope::Comment(submission) => ClientEnvelope::Comment(CommentSubmission {
                identity,
                comment: submission.comment,
                timestamp,
            }),
            ClientEnvelope::Ping(_) => ClientEnvelope::Ping(Heartbeat { timestamp }),
        }
    }

    /// leave を送ってから接続を閉じる。再接続は行わない。
    pub async fn disconnect(&self) {
        if self.commands.send(Command::Disconnect).is_err() {
            tracing::debug!("Session loop already stopped");
        }
    }

    /// セッションループの終了を待つ
    pub async fn wait(self) {
        let Self { commands, task, .. } = self;
        // Keep the command channel open so that the loop is not abandoned
        let _commands = commands;
        if let Err(e) = task.await {
            tracing::warn!("Session loop ended abnormally: {}", e);
        }
    }
}

struct SessionLoop {
    config: SessionConfig,
    identity: Identity,
    connector: Arc<dyn Connector>,
    commands: mpsc::UnboundedReceiver<Command>,
    shared: SessionShared,
}

impl SessionLoop {
    async fn run(mut self) {
        let mut reconnect_attempts: u32 = 0;

        loop {
            self.shared.set_state(ConnectionState::Connecting).await;
            tracing::info!(
                "Connecting to {} as user {} in exercise {}",
                self.config.url,
                self.identity.user_id,
                self.identity.exercise_id
            );

            match self.connect_or_cancel().await {
                ConnectAttempt::Cancelled => {
                    tracing::info!("Connect cancelled");
                    self.shared.set_state(ConnectionState::Closed).await;
                    return;
                }
                ConnectAttempt::Opened(handle) => {
                    reconnect_attempts = 0;
                    match self.run_connection(handle).await {
                        ConnectionEnd::Disconnected => {
                            self.shared.set_state(ConnectionState::Closed).await;
                            tracing::info!("Session closed");
                            return;
                        }
                        ConnectionEnd::Abandoned => {
                            self.shared.set_state(ConnectionState::Closed).await;
                            return;
                        }
                        ConnectionEnd::Lost => {
                            tracing::warn!("Connection lost");
                            self.shared.set_state(ConnectionState::Closed).await;
                        }
                    }
                }
                ConnectAttempt::Failed(e) => {
                    tracing::warn!("Failed to connect: {}", e);
                    self.shared.set_state(ConnectionState::Closed).await;
                }
            }

            if !should_attempt_reconnect(reconnect_attempts, self.config.max_reconnect_attempts) {
                tracing::error!(
                    "{}",
                    ClientError::ReconnectExhausted {
                        attempts: reconnect_attempts
                    }
                );
                self.shared.set_state(ConnectionState::Failed).await;
                self.shared.notice(RECONNECT_EXHAUSTED_NOTICE);
                return;
            }
            reconnect_attempts += 1;

            tracing::info!(
                "Reconnecting in {:?}... (attempt {}/{})",
                self.config.reconnect_interval,
                reconnect_attempts,
                self.config.max_reconnect_attempts
            );
            if !self.wait_before_reconnect().await {
                self.shared.set_state(ConnectionState::Closed).await;
                return;
            }
        }
    }

    /// 接続を試みる。完了前に切断を要求されたら接続を諦める。
    async fn connect_or_cancel(&mut self) -> ConnectAttempt {
        let connector = self.connector.clone();
        let connect = connector.connect(&self.config.url);
        tokio::pin!(connect);

        loop {
            tokio::select! {
                result = &mut connect => return match result {
                    Ok(handle) => ConnectAttempt::Opened(handle),
                    Err(e) => ConnectAttempt::Failed(e),
                },
                command = self.commands.recv() => match command {
                    Some(Command::Send(_)) => {
                        tracing::debug!("Dropping message while connecting");
                    }
                    Some(Command::Disconnect) | None => return ConnectAttempt::Cancelled,
                },
            }
        }
    }

    /// 再接続までの待ち時間を過ごす。その間に切断を要求されたら `false`。
    async fn wait_before_reconnect(&mut self) -> bool {
        let delay = tokio::time::sleep(self.config.reconnect_interval);
        tokio::pin!(delay);

        loop {
            tokio::select! {
                _ = &mut delay => return true,
                command = self.commands.recv() => match command {
                    Some(Command::Send(_)) => {
                        tracing::debug!("Dropping message while reconnecting");
                    }
                    Some(Command::Disconnect) | None => return false,
                },
            }
        }
    }

    async fn run_connection(&mut self, handle: TransportHandle) -> ConnectionEnd {
        let TransportHandle {
            outbound,
            mut inbound,
        } = handle;

        let join = ClientEnvelope::Join(self.identity.clone());
        if !self.transmit(&outbound, &join) {
            return ConnectionEnd::Lost;
        }
        self.shared.set_state(ConnectionState::Open).await;

        let period = self.config.keepalive_interval.max(MIN_KEEPALIVE_INTERVAL);
        let mut keepalive = tokio::time::interval_at(Instant::now() + period, period);

        loop {
            tokio::select! {
                event = inbound.recv() => match event {
                    Some(TransportEvent::Message(text)) => self.dispatch(&text).await,
                    Some(TransportEvent::Error(e)) => {
                        tracing::warn!("Transport error: {}", e);
                        self.shared.notice(format!("connection error: {}", e));
                    }
                    Some(TransportEvent::Closed) | None => return ConnectionEnd::Lost,
                },
                command = self.commands.recv() => match command {
                    Some(Command::Send(text)) => {
                        if outbound.send(OutboundFrame::Text(text)).is_err() {
                            tracing::warn!("Failed to send message: transport is gone");
                        }
                    }
                    Some(Command::Disconnect) => {
                        self.close(&outbound, &mut inbound).await;
                        return ConnectionEnd::Disconnected;
                    }
                    None => {
                        self.close(&outbound, &mut inbound).await;
                        return ConnectionEnd::Abandoned;
                    }
                },
                _ = keepalive.tick() => {
                    let ping = ClientEnvelope::Ping(Heartbeat {
                        timestamp: Some(get_timestamp()),
                    });
                    self.transmit(&outbound, &ping);
                }
            }
        }
    }

    /// leave を送り、接続を閉じる
    async fn close(
        &self,
        outbound: &mpsc::UnboundedSender<OutboundFrame>,
        inbound: &mut mpsc::UnboundedReceiver<TransportEvent>,
    ) {
        self.shared.set_state(ConnectionState::Closing).await;
        self.transmit(outbound, &ClientEnvelope::Leave(self.identity.clone()));
        let _ = outbound.send(OutboundFrame::Close);

        let confirmed = tokio::time::timeout(CLOSE_GRACE, async {
            while let Some(event) = inbound.recv().await {
                if event == TransportEvent::Closed {
                    break;
                }
            }
        })
        .await;
        if confirmed.is_err() {
            tracing::debug!("Transport did not confirm close within {:?}", CLOSE_GRACE);
        }
    }

    fn transmit(
        &self,
        outbound: &mpsc::UnboundedSender<OutboundFrame>,
        envelope: &ClientEnvelope,
    ) -> bool {
        let text = match serde_json::to_string(envelope) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!("Failed to serialize '{}': {}", envelope.kind(), e);
                return false;
            }
        };
        outbound.send(OutboundFrame::Text(text)).is_ok()
    }

    /// 受信したエンベロープを名簿とアクティビティログに反映する
    async fn dispatch(&self, text: &str) {
        let envelope = match serde_json::from_str::<ServerEnvelope>(text) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!("Ignoring unrecognized message: {}", e);
                return;
            }
        };

        match &envelope {
            ServerEnvelope::Joined(snapshot) => {
                self.shared.replace_roster(snapshot.users.clone()).await;
            }
            ServerEnvelope::UserJoined(change) | ServerEnvelope::UserLeft(change) => {
                self.shared.replace_roster(change.users.clone()).await;
                self.shared.append_activity(envelope).await;
            }
            ServerEnvelope::SolutionUpdated(_) | ServerEnvelope::NewComment(_) => {
                self.shared.append_activity(envelope).await;
            }
            ServerEnvelope::Pong => {
                tracing::trace!("pong");
            }
        }
    }
}
