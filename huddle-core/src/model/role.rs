/// The two fixed roles of a two-party negotiation. The relay's `start`
/// acknowledgment carries the arrival index: the first joiner waits, the
/// second one opens the media offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipantRole {
    /// First joiner. Waits for the peer's offer and answers it.
    Responder,
    /// Second joiner. Sends the offer that starts media negotiation.
    Initiator,
}

impl ParticipantRole {
    /// Maps the relay's player index onto a role. Anything past the second
    /// joiner is unsupported and yields `None`.
    pub fn from_player_id(player_id: u8) -> Option<Self> {
        match player_id {
            0 => Some(Self::Responder),
            1 => Some(Self::Initiator),
            _ => None,
        }
    }

    pub fn is_initiator(self) -> bool {
        matches!(self, Self::Initiator)
    }
}
