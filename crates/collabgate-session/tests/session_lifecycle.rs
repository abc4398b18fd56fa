//! Integration tests for the session lifecycle using a scripted connector.
//!
//! Time is paused (`start_paused = true`), so connection timeouts and retry
//! delays resolve instantly and deterministically once every task is idle.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use collabgate_room::{ChannelAddress, RoomConfig, RoomId};
use collabgate_session::{
    CollabStatus, SessionConfig, SessionError, SessionManager, SessionState,
};
use collabgate_transport::{
    Channel, CloseSignal, ConnectionId, Connector, TransportError,
};
use tokio::sync::mpsc;

// =========================================================================
// Scripted connector
// =========================================================================

/// What the next `connect` call does.
enum Outcome {
    /// Fail immediately.
    Fail,
    /// Never resolve (the connection timeout must fire).
    Hang,
    /// Open a channel. It stays open until the paired sender sends a
    /// signal or is dropped.
    Open(mpsc::UnboundedReceiver<CloseSignal>),
}

/// Counters shared between the test and the connector.
#[derive(Default)]
struct Counters {
    connects: AtomicU32,
    closes: AtomicU32,
}

/// A connector that plays back a script. Once the script runs out, every
/// further attempt fails.
struct ScriptedConnector {
    script: Mutex<VecDeque<Outcome>>,
    counters: Arc<Counters>,
}

impl ScriptedConnector {
    fn new(script: Vec<Outcome>) -> (Self, Arc<Counters>) {
        let counters = Arc::new(Counters::default());
        let connector = Self {
            script: Mutex::new(script.into()),
            counters: Arc::clone(&counters),
        };
        (connector, counters)
    }
}

impl Connector for ScriptedConnector {
    type Channel = ScriptedChannel;

    fn connect(
        &self,
        _address: &ChannelAddress,
    ) -> impl Future<Output = Result<ScriptedChannel, TransportError>> + Send
    {
        let n = self.counters.connects.fetch_add(1, Ordering::SeqCst) + 1;
        let outcome = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Outcome::Fail);
        let counters = Arc::clone(&self.counters);

        async move {
            match outcome {
                Outcome::Fail => {
                    Err(TransportError::ConnectFailed("refused".into()))
                }
                Outcome::Hang => std::future::pending().await,
                Outcome::Open(signals) => Ok(ScriptedChannel {
                    id: ConnectionId::new(u64::from(n)),
                    signals,
                    counters,
                }),
            }
        }
    }
}

struct ScriptedChannel {
    id: ConnectionId,
    signals: mpsc::UnboundedReceiver<CloseSignal>,
    counters: Arc<Counters>,
}

impl Channel for ScriptedChannel {
    async fn closed(&mut self) -> CloseSignal {
        self.signals.recv().await.unwrap_or(CloseSignal::Remote)
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.counters.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}

// =========================================================================
// Helpers
// =========================================================================

fn room(doc: &str) -> RoomId {
    RoomId::new("filecollab", doc)
}

fn manager(script: Vec<Outcome>) -> (SessionManager<ScriptedConnector>, Arc<Counters>) {
    let (connector, counters) = ScriptedConnector::new(script);
    let manager = SessionManager::new(
        connector,
        RoomConfig::default(),
        SessionConfig::default(),
    );
    (manager, counters)
}

/// An `Open` outcome plus the sender that controls the channel.
fn open_channel() -> (Outcome, mpsc::UnboundedSender<CloseSignal>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Outcome::Open(rx), tx)
}

// =========================================================================
// open()
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_open_starts_connecting_then_connects() {
    let (outcome, _keep_open) = open_channel();
    let (mut mgr, counters) = manager(vec![outcome]);

    let handle = mgr.open(room("a"), None).expect("should open").clone();
    assert_eq!(handle.state(), SessionState::Connecting);
    assert_eq!(handle.status(), CollabStatus::Connecting);

    handle.connected().await.expect("should connect");

    assert_eq!(handle.state(), SessionState::Connected);
    assert_eq!(handle.attempts(), 0);
    assert_eq!(mgr.status(&room("a")), CollabStatus::Connected);
    assert_eq!(counters.connects.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_open_same_room_twice_is_rejected() {
    let (outcome, _keep_open) = open_channel();
    let (mut mgr, _) = manager(vec![outcome]);

    mgr.open(room("a"), None).unwrap();
    let result = mgr.open(room("a"), None);

    assert!(
        matches!(result, Err(SessionError::AlreadyOpen(ref r)) if *r == room("a")),
        "only one session per room"
    );
    assert_eq!(mgr.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_open_rooms_with_same_key_is_rejected() {
    let (outcome, _keep_open) = open_channel();
    let (mut mgr, _) = manager(vec![outcome]);

    // Both join to "a-b-c" and would dial the same channel.
    mgr.open(RoomId::new("a-b", "c"), None).unwrap();
    let result = mgr.open(RoomId::new("a", "b-c"), None);

    assert!(matches!(result, Err(SessionError::AlreadyOpen(_))));
    assert_eq!(mgr.len(), 1);
    assert!(mgr.get(&RoomId::new("a", "b-c")).is_some());
}

#[tokio::test(start_paused = true)]
async fn test_open_document_uses_default_room_name() {
    let (outcome, _keep_open) = open_channel();
    let (mut mgr, _) = manager(vec![outcome]);

    let handle = mgr.open_document("doc-7", None).unwrap();

    assert_eq!(handle.room().key(), "filecollab-doc-7");
}

#[tokio::test(start_paused = true)]
async fn test_status_without_session_is_disconnected() {
    let (mgr, _) = manager(vec![]);
    assert_eq!(mgr.status(&room("nobody")), CollabStatus::Disconnected);
}

#[test]
fn test_status_after_runtime_shutdown_is_unknown() {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .start_paused(true)
        .build()
        .unwrap();
    let (mut mgr, _) = manager(vec![Outcome::Hang]);

    let handle = rt.block_on(async { mgr.open(room("a"), None).unwrap().clone() });
    assert_eq!(handle.status(), CollabStatus::Connecting);

    // The driver is dropped with the runtime, mid-connect.
    drop(rt);

    assert_eq!(handle.state(), SessionState::Connecting);
    assert_eq!(handle.status(), CollabStatus::Unknown);
    assert_eq!(mgr.status(&room("a")), CollabStatus::Unknown);
}

// =========================================================================
// Retry policy
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_six_failures_with_ceiling_five_ends_failed() {
    // Script is empty, so every attempt fails.
    let (mut mgr, counters) = manager(vec![]);
    let handle = mgr.open(room("a"), None).unwrap().clone();

    let result = handle.connected().await;

    assert!(matches!(result, Err(SessionError::RetryExhausted(_))));
    assert_eq!(handle.state(), SessionState::Failed);
    assert_eq!(handle.attempts(), 5);
    // Initial attempt + 5 retries.
    assert_eq!(counters.connects.load(Ordering::SeqCst), 6);
    assert_eq!(handle.status(), CollabStatus::Disconnected);

    // Nothing else is scheduled, no matter how long we wait.
    tokio::time::sleep(Duration::from_secs(3600)).await;
    assert_eq!(counters.connects.load(Ordering::SeqCst), 6);
    assert_eq!(handle.state(), SessionState::Failed);
}

#[tokio::test(start_paused = true)]
async fn test_retries_are_spaced_by_fixed_interval() {
    let (mut mgr, _) = manager(vec![]);
    let start = tokio::time::Instant::now();
    let handle = mgr.open(room("a"), None).unwrap().clone();

    let _ = handle.connected().await;

    // Five 1-second gaps, no backoff growth.
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(5), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_secs(6), "elapsed {elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn test_attempt_count_never_exceeds_ceiling() {
    let (mut mgr, _) = manager(vec![]);
    let handle = mgr.open(room("a"), None).unwrap().clone();
    let mut rx = handle.subscribe();

    let mut max_seen = 0;
    loop {
        let snapshot = *rx.borrow_and_update();
        max_seen = max_seen.max(snapshot.attempts);
        if snapshot.state == SessionState::Failed {
            break;
        }
        rx.changed().await.expect("driver alive until failed");
    }

    assert_eq!(max_seen, 5);
}

#[tokio::test(start_paused = true)]
async fn test_connect_timeout_counts_as_failure() {
    let (mut mgr, counters) = manager(vec![Outcome::Hang]);
    let start = tokio::time::Instant::now();
    let handle = mgr.open(room("a"), None).unwrap().clone();
    let mut rx = handle.subscribe();

    rx.wait_for(|s| s.attempts == 1).await.unwrap();

    assert!(start.elapsed() >= Duration::from_secs(10));
    assert_eq!(counters.connects.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_hanging_attempts_still_exhaust() {
    let script = (0..6).map(|_| Outcome::Hang).collect();
    let (mut mgr, counters) = manager(script);
    let handle = mgr.open(room("a"), None).unwrap().clone();

    let result = handle.connected().await;

    assert!(matches!(result, Err(SessionError::RetryExhausted(_))));
    assert_eq!(counters.connects.load(Ordering::SeqCst), 6);
}

#[tokio::test(start_paused = true)]
async fn test_successful_connect_resets_attempts() {
    let (outcome, _keep_open) = open_channel();
    let (mut mgr, _) =
        manager(vec![Outcome::Fail, Outcome::Fail, outcome]);
    let handle = mgr.open(room("a"), None).unwrap().clone();

    handle.connected().await.unwrap();

    assert_eq!(handle.attempts(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_abnormal_close_reconnects() {
    let (first, first_ctl) = open_channel();
    let (second, _keep_open) = open_channel();
    let (mut mgr, counters) = manager(vec![first, second]);
    let handle = mgr.open(room("a"), None).unwrap().clone();
    handle.connected().await.unwrap();
    let mut rx = handle.subscribe();

    first_ctl
        .send(CloseSignal::Lost(TransportError::ConnectionLost(
            "reset".into(),
        )))
        .unwrap();

    rx.wait_for(|s| s.state == SessionState::Disconnected)
        .await
        .unwrap();
    assert_eq!(handle.attempts(), 1);

    rx.wait_for(|s| s.state == SessionState::Connected)
        .await
        .unwrap();
    assert_eq!(handle.attempts(), 0);
    assert_eq!(counters.connects.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_reopen_after_failed_starts_fresh() {
    let (mut mgr, counters) = manager(vec![]);
    let handle = mgr.open(room("a"), None).unwrap().clone();
    let _ = handle.connected().await;
    assert_eq!(handle.state(), SessionState::Failed);

    let reopened = mgr.open(room("a"), None).expect("failed rooms reopen");

    assert_eq!(reopened.state(), SessionState::Connecting);
    assert_eq!(reopened.attempts(), 0);
    assert_eq!(mgr.len(), 1);
    assert!(counters.connects.load(Ordering::SeqCst) >= 6);
}

// =========================================================================
// close()
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_close_connected_session_closes_channel() {
    let (outcome, _keep_open) = open_channel();
    let (mut mgr, counters) = manager(vec![outcome]);
    let handle = mgr.open(room("a"), None).unwrap().clone();
    handle.connected().await.unwrap();

    handle.close().await;

    assert_eq!(handle.state(), SessionState::Closed);
    assert_eq!(handle.status(), CollabStatus::Disconnected);
    assert_eq!(counters.closes.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_close_twice_is_noop() {
    let (outcome, _keep_open) = open_channel();
    let (mut mgr, counters) = manager(vec![outcome]);
    let handle = mgr.open(room("a"), None).unwrap().clone();
    handle.connected().await.unwrap();

    handle.close().await;
    handle.close().await;

    assert_eq!(handle.state(), SessionState::Closed);
    assert_eq!(counters.closes.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_close_cancels_pending_retry() {
    let (mut mgr, counters) = manager(vec![Outcome::Fail]);
    let handle = mgr.open(room("a"), None).unwrap().clone();
    let mut rx = handle.subscribe();

    // First attempt fails; a retry is now pending.
    rx.wait_for(|s| s.state == SessionState::Disconnected)
        .await
        .unwrap();
    handle.close().await;

    // Well past the retry interval: the stale timer must not fire.
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(counters.connects.load(Ordering::SeqCst), 1);
    assert_eq!(handle.state(), SessionState::Closed);
}

#[tokio::test(start_paused = true)]
async fn test_close_while_connecting_cancels_timeout() {
    let (mut mgr, counters) = manager(vec![Outcome::Hang]);
    let handle = mgr.open(room("a"), None).unwrap().clone();

    handle.close().await;
    tokio::time::sleep(Duration::from_secs(60)).await;

    assert_eq!(handle.state(), SessionState::Closed);
    assert_eq!(handle.attempts(), 0);
    assert!(counters.connects.load(Ordering::SeqCst) <= 1);
}

#[tokio::test(start_paused = true)]
async fn test_connected_after_close_reports_closed() {
    let (mut mgr, _) = manager(vec![Outcome::Hang]);
    let handle = mgr.open(room("a"), None).unwrap().clone();

    handle.close().await;

    assert!(matches!(
        handle.connected().await,
        Err(SessionError::Closed(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_manager_close_removes_session_and_is_idempotent() {
    let (outcome, _keep_open) = open_channel();
    let (mut mgr, _) = manager(vec![outcome]);
    let handle = mgr.open(room("a"), None).unwrap().clone();
    handle.connected().await.unwrap();

    mgr.close(&room("a")).await;
    mgr.close(&room("a")).await;

    assert!(mgr.is_empty());
    assert_eq!(handle.state(), SessionState::Closed);
    assert_eq!(mgr.status(&room("a")), CollabStatus::Disconnected);
}

#[tokio::test(start_paused = true)]
async fn test_close_all_closes_every_session() {
    let (a, _keep_a) = open_channel();
    let (b, _keep_b) = open_channel();
    let (mut mgr, counters) = manager(vec![a, b]);
    let ha = mgr.open(room("a"), None).unwrap().clone();
    let hb = mgr.open(room("b"), None).unwrap().clone();
    ha.connected().await.unwrap();
    hb.connected().await.unwrap();

    mgr.close_all().await;

    assert!(mgr.is_empty());
    assert_eq!(ha.state(), SessionState::Closed);
    assert_eq!(hb.state(), SessionState::Closed);
    assert_eq!(counters.closes.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_sessions_are_independent() {
    let (a, a_ctl) = open_channel();
    let (b, _keep_b) = open_channel();
    let (mut mgr, _) = manager(vec![a, b]);
    let ha = mgr.open(room("a"), None).unwrap().clone();
    let hb = mgr.open(room("b"), None).unwrap().clone();
    ha.connected().await.unwrap();
    hb.connected().await.unwrap();

    // Room a drops; the script is exhausted so it will eventually fail.
    drop(a_ctl);
    let mut rx = ha.subscribe();
    rx.wait_for(|s| s.state == SessionState::Failed).await.unwrap();

    assert_eq!(hb.state(), SessionState::Connected);
}
