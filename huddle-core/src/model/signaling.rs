use serde::{Deserialize, Serialize};

/// Control messages exchanged with the relay, JSON text frames tagged by
/// `type`. The relay never looks past the tag: everything after `join` is
/// forwarded verbatim to the other occupant of the room.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SignalMessage {
    /// Client -> relay, first frame on the wire.
    Join {
        #[serde(rename = "roomId")]
        room_id: String,
        username: String,
    },
    /// Relay -> client, acknowledges the join. The player index decides who
    /// initiates media negotiation.
    Start {
        #[serde(rename = "playerId")]
        player_id: u8,
    },
    /// Bridged to the peer: local session description proposing a call.
    Offer { offer: SessionDescription },
    /// Bridged to the peer: session description accepting an offer.
    Answer { answer: SessionDescription },
    /// Bridged to the peer: one network path proposal.
    Ice { candidate: CandidateInit },
    /// Text chat, bridged to the peer. `timestamp` is epoch milliseconds.
    Message {
        text: String,
        username: String,
        timestamp: u64,
    },
    /// Relay -> client: the other occupant arrived.
    UserJoined { username: String },
    /// Relay -> client: the other occupant is gone.
    UserLeft { username: String },
}

/// Serialized offer or answer, shaped like the session-description objects
/// the browser API produces.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionDescription {
    #[serde(rename = "type")]
    pub kind: SdpKind,
    pub sdp: String,
}

impl SessionDescription {
    pub fn offer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Offer,
            sdp: sdp.into(),
        }
    }

    pub fn answer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Answer,
            sdp: sdp.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SdpKind {
    Offer,
    Answer,
}

/// One ICE candidate as gathered by the peer-connection primitive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CandidateInit {
    pub candidate: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdp_mid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdp_m_line_index: Option<u16>,
}

impl CandidateInit {
    pub fn new(candidate: impl Into<String>) -> Self {
        Self {
            candidate: candidate.into(),
            sdp_mid: None,
            sdp_m_line_index: None,
        }
    }
}
