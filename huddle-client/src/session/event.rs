use huddle_core::{ChatEntry, ParticipantRole};

use crate::error::Error;
use crate::negotiation::NegotiationState;

/// Notifications the session surfaces to the embedding UI. This is the only
/// outward-facing channel; errors arrive here as single notifications and
/// never as panics.
#[derive(Debug)]
pub enum SessionEvent {
    /// The relay acknowledged the join and assigned our role.
    RoleAssigned(ParticipantRole),
    /// The other occupant arrived.
    PeerJoined { username: String },
    /// The other occupant left.
    PeerLeft { username: String },
    /// One chat entry, own or remote, in history order.
    Chat(ChatEntry),
    /// The negotiation engine moved to a new phase.
    NegotiationStateChanged(NegotiationState),
    /// A boundary failure, already handled; informational for the user.
    Error(Error),
    /// The session finished tearing down.
    Left,
}
