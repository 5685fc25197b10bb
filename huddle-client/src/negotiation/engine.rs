use huddle_core::{CandidateInit, ParticipantRole, SdpKind, SessionDescription, SignalMessage};
use tracing::{debug, warn};

/// Connection-establishment phases. `Connected` means media is flowing over
/// the established transport, not merely that offer and answer were
/// exchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationState {
    New,
    AwaitingLocalAudio,
    HaveLocalOffer,
    HaveRemoteOffer,
    Connected,
    Disconnected,
    Closed,
}

/// Everything the engine reacts to: remote signals routed by the session,
/// plus completions reported by the peer backend.
#[derive(Debug)]
pub enum NegotiationEvent {
    /// Session start.
    Start,
    /// Local audio is captured and attached.
    LocalAudioReady,
    /// The backend finished building a local description (offer or answer)
    /// and stored it.
    LocalDescriptionReady(SessionDescription),
    /// The backend discovered a local ICE candidate.
    LocalCandidate(CandidateInit),
    /// Peer's offer, via the relay.
    RemoteOffer(SessionDescription),
    /// Peer's answer, via the relay.
    RemoteAnswer(SessionDescription),
    /// Peer's ICE candidate, via the relay.
    RemoteCandidate(CandidateInit),
    /// The underlying transport finished establishing.
    TransportEstablished,
    /// The underlying transport dropped.
    TransportLost,
    /// Explicit leave.
    Close,
}

/// Side effects for the session loop to execute against the peer backend and
/// the relay transport. The engine itself performs no I/O, which is what
/// makes the handshake testable without a network or a microphone.
#[derive(Debug, PartialEq)]
pub enum NegotiationEffect {
    /// Ask the backend for a local offer; completion comes back as
    /// [`NegotiationEvent::LocalDescriptionReady`].
    CreateOffer,
    /// Apply the remote offer and ask the backend for an answer; completion
    /// comes back as [`NegotiationEvent::LocalDescriptionReady`].
    ApplyRemoteOffer(SessionDescription),
    /// Apply the remote answer.
    ApplyRemoteAnswer(SessionDescription),
    /// Apply one remote ICE candidate.
    ApplyCandidate(CandidateInit),
    /// Forward a control message to the relay.
    Send(SignalMessage),
    /// Tear the peer connection down.
    CloseBackend,
}

/// The offer/answer/ICE state machine for one session.
///
/// Candidates and descriptions race over the wire: a candidate may arrive
/// before the description it belongs to. Candidates received early are
/// buffered and replayed in arrival order the moment the remote description
/// is set. That is the one exception to "ignore out-of-order input".
///
/// A handshake that stalls (the answer never arrives) stays in its last
/// state indefinitely; there is no timeout.
pub struct NegotiationEngine {
    role: ParticipantRole,
    state: NegotiationState,
    remote_description_set: bool,
    pending_candidates: Vec<CandidateInit>,
}

impl NegotiationEngine {
    pub fn new(role: ParticipantRole) -> Self {
        Self {
            role,
            state: NegotiationState::New,
            remote_description_set: false,
            pending_candidates: Vec::new(),
        }
    }

    pub fn role(&self) -> ParticipantRole {
        self.role
    }

    pub fn state(&self) -> NegotiationState {
        self.state
    }

    /// Advances the machine by one event and returns the side effects to
    /// run, in order. Events inconsistent with the current state are logged
    /// and ignored; they never corrupt it.
    pub fn handle(&mut self, event: NegotiationEvent) -> Vec<NegotiationEffect> {
        use NegotiationEffect as Effect;
        use NegotiationEvent as Event;
        use NegotiationState as State;

        match event {
            Event::Start => match self.state {
                State::New => {
                    self.state = State::AwaitingLocalAudio;
                    Vec::new()
                }
                _ => self.ignored("start"),
            },

            Event::LocalAudioReady => match (self.state, self.role) {
                (State::AwaitingLocalAudio, ParticipantRole::Initiator) => {
                    vec![Effect::CreateOffer]
                }
                // the responder keeps waiting for the peer's offer
                (State::AwaitingLocalAudio, ParticipantRole::Responder) => Vec::new(),
                _ => self.ignored("local audio"),
            },

            Event::LocalDescriptionReady(description) => {
                match (self.state, description.kind) {
                    (State::AwaitingLocalAudio, SdpKind::Offer) => {
                        self.state = State::HaveLocalOffer;
                        vec![Effect::Send(SignalMessage::Offer { offer: description })]
                    }
                    (State::HaveRemoteOffer, SdpKind::Answer) => {
                        vec![Effect::Send(SignalMessage::Answer {
                            answer: description,
                        })]
                    }
                    _ => self.ignored("local description"),
                }
            }

            Event::LocalCandidate(candidate) => match self.state {
                State::Closed | State::Disconnected => Vec::new(),
                // forwarded the moment it exists, no batching
                _ => vec![Effect::Send(SignalMessage::Ice { candidate })],
            },

            Event::RemoteOffer(description) => match (self.state, self.role) {
                (State::AwaitingLocalAudio, ParticipantRole::Responder) => {
                    self.state = State::HaveRemoteOffer;
                    self.remote_description_set = true;
                    let mut effects = vec![Effect::ApplyRemoteOffer(description)];
                    effects.extend(self.flush_candidates());
                    effects
                }
                _ => self.ignored("offer"),
            },

            Event::RemoteAnswer(description) => match self.state {
                State::HaveLocalOffer if !self.remote_description_set => {
                    self.remote_description_set = true;
                    let mut effects = vec![Effect::ApplyRemoteAnswer(description)];
                    effects.extend(self.flush_candidates());
                    effects
                }
                _ => self.ignored("answer"),
            },

            Event::RemoteCandidate(candidate) => match self.state {
                State::Closed | State::Disconnected => self.ignored("candidate"),
                _ if self.remote_description_set => vec![Effect::ApplyCandidate(candidate)],
                _ => {
                    debug!("buffering candidate until the remote description is set");
                    self.pending_candidates.push(candidate);
                    Vec::new()
                }
            },

            Event::TransportEstablished => match self.state {
                State::HaveLocalOffer | State::HaveRemoteOffer => {
                    self.state = State::Connected;
                    Vec::new()
                }
                _ => self.ignored("establishment"),
            },

            Event::TransportLost => match self.state {
                State::New | State::Closed => Vec::new(),
                _ => {
                    self.state = State::Disconnected;
                    Vec::new()
                }
            },

            Event::Close => match self.state {
                State::Closed => Vec::new(),
                _ => {
                    self.state = State::Closed;
                    vec![Effect::CloseBackend]
                }
            },
        }
    }

    fn flush_candidates(&mut self) -> Vec<NegotiationEffect> {
        if !self.pending_candidates.is_empty() {
            debug!(
                count = self.pending_candidates.len(),
                "flushing buffered candidates"
            );
        }
        self.pending_candidates
            .drain(..)
            .map(NegotiationEffect::ApplyCandidate)
            .collect()
    }

    fn ignored(&self, what: &str) -> Vec<NegotiationEffect> {
        warn!(state = ?self.state, "ignoring out-of-order {what}");
        Vec::new()
    }
}
