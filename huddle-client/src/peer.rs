use std::sync::Arc;

use async_trait::async_trait;

use huddle_core::{CandidateInit, SessionDescription};

use crate::error::Result;
use crate::media::{AudioTrack, RemoteMediaHandle};

/// What the peer-connection primitive reports back to the session loop.
#[derive(Debug)]
pub enum PeerEvent {
    /// A locally discovered ICE candidate, forwarded to the relay as soon as
    /// it appears.
    CandidateGathered(CandidateInit),
    /// ICE/DTLS finished: media is actually flowing, as opposed to the
    /// signaling exchange merely being complete.
    Established,
    /// The established link was lost.
    ConnectionLost,
    /// Remote audio arrived and can be routed to playback.
    RemoteTrack(RemoteMediaHandle),
}

/// The peer-connection-negotiation primitive, implemented outside this
/// crate. Events are delivered on the channel handed over at construction
/// time, in the order the underlying connection produces them.
///
/// `create_offer`/`create_answer` are expected to store the produced
/// description locally before returning it, mirroring the create-and-set
/// sequence of the underlying API.
#[async_trait]
pub trait PeerBackend: Send + 'static {
    async fn add_track(&mut self, track: Arc<dyn AudioTrack>) -> Result<()>;

    async fn create_offer(&mut self) -> Result<SessionDescription>;

    async fn create_answer(&mut self) -> Result<SessionDescription>;

    async fn set_remote_description(&mut self, description: SessionDescription) -> Result<()>;

    async fn add_ice_candidate(&mut self, candidate: CandidateInit) -> Result<()>;

    /// Tears the connection down. Safe to call more than once.
    async fn close(&mut self);
}
