mod mock_capture;

pub use memory_transport::{MemoryTransport, TransportProbe};
pub use mock_capture::{MockAudioCapture, MockTrack};
pub use mock_peer::{BackendCall, BackendProbe, MockPeerBackend};

use std::time::Duration;

use huddle_client::SessionEvent;
use tokio::sync::mpsc;

pub const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

/// Next session event, or panic after a generous timeout.
pub async fn next_event(events: &mut mpsc::Receiver<SessionEvent>) -> SessionEvent {
    tokio::time::timeout(EVENT_TIMEOUT, events.recv())
        .await
        .expect("timed out waiting for a session event")
        .expect("session event stream ended")
}

/// Skips events until one matches the predicate.
pub async fn wait_for(
    events: &mut mpsc::Receiver<SessionEvent>,
    predicate: impl Fn(&SessionEvent) -> bool,
) -> SessionEvent {
    loop {
        let event = next_event(events).await;
        if predicate(&event) {
            return event;
        }
    }
}

/// Polls the backend probe until the given call shows up.
pub async fn wait_for_call(probe: &BackendProbe, call: BackendCall) {
    let deadline = tokio::time::Instant::now() + EVENT_TIMEOUT;
    loop {
        if probe.calls().contains(&call) {
            return;
        }
        if tokio::time::Instant::now() > deadline {
            panic!("timed out waiting for backend call {call:?}");
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

/// Polls the transport probe until the predicate matches one sent message.
pub async fn wait_for_sent(
    probe: &TransportProbe,
    predicate: impl Fn(&huddle_core::SignalMessage) -> bool,
) {
    let deadline = tokio::time::Instant::now() + EVENT_TIMEOUT;
    loop {
        if probe.sent().iter().any(&predicate) {
            return;
        }
        if tokio::time::Instant::now() > deadline {
            panic!("timed out waiting for an outbound signal");
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}
