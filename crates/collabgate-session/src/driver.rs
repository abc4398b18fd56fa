//! Session driver: an isolated Tokio task that supervises one channel.
//!
//! Each open room gets a driver task. The driver owns the [`Session`]
//! record, the open channel (if any), and the session's timer. The outside
//! world talks to it through a [`SessionHandle`]: commands go in over an
//! mpsc channel, state snapshots come out over a watch channel.
//!
//! Because one task owns everything, transitions within a session are
//! strictly sequential. Closing the session (or dropping every handle)
//! ends the task, which drops the timer with it.

use std::sync::Arc;

use collabgate_room::{ChannelAddress, RoomId};
use collabgate_transport::{Channel, CloseSignal, Connector};
use tokio::sync::{mpsc, oneshot, watch};

use crate::session::Recovery;
use crate::timer::{SessionTimer, TimerKind};
use crate::{
    CollabStatus, Session, SessionConfig, SessionError, SessionSnapshot,
    SessionState,
};

/// Command channel size. Only `Close` is ever queued, so this is plenty.
const COMMAND_CHANNEL_SIZE: usize = 8;

/// Commands sent to a session driver.
enum SessionCommand {
    /// Close the session and reply once it is `Closed`.
    Close { reply: oneshot::Sender<()> },
}

// ---------------------------------------------------------------------------
// SessionHandle
// ---------------------------------------------------------------------------

/// Handle to a running session. Used to observe and close it.
///
/// Cheap to clone. The driver keeps running until the session is closed
/// or every handle is dropped.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    room: RoomId,
    commands: mpsc::Sender<SessionCommand>,
    state: watch::Receiver<SessionSnapshot>,
}

impl SessionHandle {
    /// The room this session belongs to.
    pub fn room(&self) -> &RoomId {
        &self.room
    }

    /// The latest published state and attempt count.
    pub fn snapshot(&self) -> SessionSnapshot {
        *self.state.borrow()
    }

    pub fn state(&self) -> SessionState {
        self.snapshot().state
    }

    pub fn attempts(&self) -> u32 {
        self.snapshot().attempts
    }

    /// Whether the session is `Failed` or `Closed`.
    pub fn is_terminal(&self) -> bool {
        self.state().is_terminal()
    }

    /// The coarse status for the UI.
    ///
    /// Reports [`CollabStatus::Unknown`] if the driver disappeared without
    /// publishing a terminal state (it panicked, or the runtime shut down).
    pub fn status(&self) -> CollabStatus {
        let snapshot = self.snapshot();
        let driver_gone = self.state.has_changed().is_err();
        if driver_gone && !snapshot.state.is_terminal() {
            return CollabStatus::Unknown;
        }
        snapshot.state.status()
    }

    /// A receiver that observes every state change of this session.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.clone()
    }

    /// Waits until the channel is connected.
    ///
    /// # Errors
    /// - [`SessionError::RetryExhausted`] if the session gave up
    /// - [`SessionError::Closed`] if the session was closed first
    /// - [`SessionError::Unavailable`] if the driver is gone
    pub async fn connected(&self) -> Result<(), SessionError> {
        let mut rx = self.state.clone();
        let state = rx
            .wait_for(|s| {
                matches!(s.state, SessionState::Connected)
                    || s.state.is_terminal()
            })
            .await
            .map_err(|_| SessionError::Unavailable(self.room.clone()))?
            .state;

        match state {
            SessionState::Connected => Ok(()),
            SessionState::Failed => {
                Err(SessionError::RetryExhausted(self.room.clone()))
            }
            _ => Err(SessionError::Closed(self.room.clone())),
        }
    }

    /// Closes the session: cancels any pending timer, closes the channel,
    /// and moves to `Closed`.
    ///
    /// Idempotent. Closing an already-closed session does nothing.
    pub async fn close(&self) {
        let (reply_tx, reply_rx) = oneshot::channel();
        if self
            .commands
            .send(SessionCommand::Close { reply: reply_tx })
            .await
            .is_err()
        {
            // Driver already stopped: nothing left to close.
            return;
        }
        let _ = reply_rx.await;
    }
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// Starts a driver for `room` and returns its handle.
///
/// The session is already `Connecting` when this returns. Must be called
/// from within a Tokio runtime.
pub(crate) fn spawn_session<C: Connector>(
    room: RoomId,
    address: ChannelAddress,
    config: SessionConfig,
    connector: Arc<C>,
) -> SessionHandle {
    let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
    let session = Session::new(room.clone(), config.max_reconnect_attempts);
    let (state_tx, state_rx) = watch::channel(session.snapshot());

    let mut driver = SessionDriver {
        session,
        address,
        config,
        connector,
        channel: None,
        timer: SessionTimer::new(),
        commands: cmd_rx,
        state: state_tx,
    };
    driver.start_attempt();
    tokio::spawn(driver.run());

    SessionHandle {
        room,
        commands: cmd_tx,
        state: state_rx,
    }
}

/// The internal driver state. Runs inside a Tokio task.
struct SessionDriver<C: Connector> {
    session: Session,
    address: ChannelAddress,
    config: SessionConfig,
    connector: Arc<C>,
    channel: Option<C::Channel>,
    timer: SessionTimer,
    commands: mpsc::Receiver<SessionCommand>,
    state: watch::Sender<SessionSnapshot>,
}

impl<C: Connector> SessionDriver<C> {
    /// Runs the driver until the session is closed or abandoned.
    async fn run(mut self) {
        tracing::info!(room = %self.session.room(), address = %self.address, "session opened");

        loop {
            let keep_running = match self.session.state() {
                SessionState::Connecting => self.drive_connecting().await,
                SessionState::Connected => self.drive_connected().await,
                SessionState::Disconnected => self.drive_waiting().await,
                SessionState::Failed => self.drive_failed().await,
                SessionState::Closed => false,
            };
            if !keep_running {
                break;
            }
        }

        tracing::debug!(room = %self.session.room(), "session driver stopped");
    }

    /// One connect attempt, bounded by the connection timeout.
    async fn drive_connecting(&mut self) -> bool {
        let connector = Arc::clone(&self.connector);
        let address = self.address.clone();
        let connect = async move { connector.connect(&address).await };
        tokio::pin!(connect);

        tokio::select! {
            biased;
            cmd = self.commands.recv() => {
                self.shutdown(cmd).await;
                false
            }
            _ = self.timer.fired() => {
                tracing::warn!(
                    room = %self.session.room(),
                    timeout_ms = self.config.connection_timeout.as_millis() as u64,
                    "connect attempt timed out"
                );
                self.connection_lost();
                true
            }
            result = &mut connect => {
                match result {
                    Ok(channel) => self.on_connected(channel),
                    Err(e) => {
                        tracing::warn!(
                            room = %self.session.room(),
                            error = %e,
                            "connect attempt failed"
                        );
                        self.connection_lost();
                    }
                }
                true
            }
        }
    }

    /// Waits for the open channel to go away.
    async fn drive_connected(&mut self) -> bool {
        tokio::select! {
            biased;
            cmd = self.commands.recv() => {
                self.shutdown(cmd).await;
                false
            }
            signal = wait_closed(&mut self.channel) => {
                match signal {
                    CloseSignal::Remote => tracing::warn!(
                        room = %self.session.room(),
                        "channel closed by server"
                    ),
                    CloseSignal::Lost(e) => tracing::warn!(
                        room = %self.session.room(),
                        error = %e,
                        "channel lost"
                    ),
                }
                self.channel = None;
                self.connection_lost();
                true
            }
        }
    }

    /// Waits for the retry timer.
    async fn drive_waiting(&mut self) -> bool {
        tokio::select! {
            biased;
            cmd = self.commands.recv() => {
                self.shutdown(cmd).await;
                false
            }
            kind = self.timer.fired() => {
                debug_assert_eq!(kind, TimerKind::Retry);
                self.start_attempt();
                true
            }
        }
    }

    /// Terminal until closed. Nothing is scheduled; only a command (or the
    /// last handle going away) can end this.
    async fn drive_failed(&mut self) -> bool {
        let cmd = self.commands.recv().await;
        self.shutdown(cmd).await;
        false
    }

    /// `Disconnected → Connecting` and arm the connection timeout.
    fn start_attempt(&mut self) {
        if !self.session.begin_connect() {
            return;
        }
        self.timer
            .arm(TimerKind::ConnectTimeout, self.config.connection_timeout);
        tracing::debug!(
            room = %self.session.room(),
            attempt = self.session.attempts(),
            "connecting"
        );
        self.publish();
    }

    fn on_connected(&mut self, channel: C::Channel) {
        self.timer.cancel();
        tracing::info!(
            room = %self.session.room(),
            id = %channel.id(),
            "session connected"
        );
        self.channel = Some(channel);
        self.session.mark_connected();
        self.publish();
    }

    /// Failure, timeout, or abnormal close: retry or give up.
    fn connection_lost(&mut self) {
        self.timer.cancel();
        match self.session.connection_lost() {
            Recovery::Retry { attempt } => {
                tracing::info!(
                    room = %self.session.room(),
                    attempt,
                    max = self.config.max_reconnect_attempts,
                    "scheduling reconnect"
                );
                self.timer
                    .arm(TimerKind::Retry, self.config.reconnect_interval);
            }
            Recovery::Exhausted => {
                tracing::error!(
                    room = %self.session.room(),
                    max = self.config.max_reconnect_attempts,
                    "reconnect attempts exhausted, giving up"
                );
            }
            Recovery::Ignored => {}
        }
        self.publish();
    }

    /// Closes everything down. `cmd` is `None` when every handle was
    /// dropped; the session is disposed the same way.
    async fn shutdown(&mut self, cmd: Option<SessionCommand>) {
        self.timer.cancel();

        if let Some(mut channel) = self.channel.take() {
            if let Err(e) = channel.close().await {
                tracing::debug!(
                    room = %self.session.room(),
                    error = %e,
                    "error closing channel"
                );
            }
        }

        if self.session.close() {
            tracing::info!(room = %self.session.room(), "session closed");
            self.publish();
        }

        if let Some(SessionCommand::Close { reply }) = cmd {
            let _ = reply.send(());
        }
    }

    fn publish(&self) {
        // `send_replace` never fails, even with no receivers left.
        self.state.send_replace(self.session.snapshot());
    }
}

/// Resolves when the open channel closes; pends forever without one.
async fn wait_closed<T: Channel>(channel: &mut Option<T>) -> CloseSignal {
    match channel {
        Some(channel) => channel.closed().await,
        None => std::future::pending().await,
    }
}
