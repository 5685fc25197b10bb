mod ws;

pub use ws::WsTransport;

use async_trait::async_trait;
use huddle_core::SignalMessage;

/// What the relay link reports upward. Events arrive in wire order; this
/// layer never reorders or deduplicates.
#[derive(Debug)]
pub enum TransportEvent {
    /// One decoded control message from the relay.
    Signal(SignalMessage),
    /// The link is gone. There is no automatic reconnect; the session ends
    /// and a fresh join has to be made.
    Closed,
}

/// Duplex message channel to the signaling relay.
#[async_trait]
pub trait SignalTransport: Send + 'static {
    /// Fire-and-forget. A send on a dropped link is logged and discarded,
    /// never an error to the caller.
    fn send(&self, message: SignalMessage);

    /// Whether the link is currently usable.
    fn is_open(&self) -> bool;

    /// Closes the link. Safe to call more than once.
    async fn close(&mut self);
}
