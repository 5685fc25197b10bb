use huddle_core::RoomCodeError;

/// Everything that can go wrong on the client, by the boundary that produced
/// it. None of these terminate the process; each is caught where it occurs
/// and surfaced as a single session event.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed room code, rejected before any network I/O.
    #[error("invalid room code: {0}")]
    Validation(#[from] RoomCodeError),

    /// Relay unreachable or the link dropped. The session aborts back to its
    /// pre-join state; nothing reconnects automatically.
    #[error("relay connection failed: {0}")]
    Connection(String),

    /// Microphone unavailable. The session continues degraded; text chat
    /// stays usable.
    #[error("could not access the microphone: {0}")]
    MediaAccess(String),

    /// Malformed or incompatible description/candidate. Logged; the state
    /// machine stalls but the session survives.
    #[error("negotiation failed: {0}")]
    Negotiation(String),

    /// Chat send while the relay link is down. Local history is untouched.
    #[error("not connected to a room")]
    NotConnected,
}

pub type Result<T> = std::result::Result<T, Error>;
