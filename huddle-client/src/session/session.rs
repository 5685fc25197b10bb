use std::collections::VecDeque;

use huddle_core::{ParticipantRole, RoomCode, RoomIdentity, SignalMessage};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::chat::ChatLog;
use crate::error::{Error, Result};
use crate::media::{AudioCapture, AudioConstraints, MediaLifecycle};
use crate::negotiation::{NegotiationEffect, NegotiationEngine, NegotiationEvent};
use crate::peer::{PeerBackend, PeerEvent};
use crate::session::{SessionCommand, SessionEvent};
use crate::transport::{SignalTransport, TransportEvent, WsTransport};

/// Caller's side of a running session. Cheap to clone; all methods are
/// fire-and-forget and harmless after the session has finished, which is
/// what makes `leave` idempotent from the outside.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    pub async fn send_chat(&self, text: impl Into<String>) {
        let _ = self
            .commands
            .send(SessionCommand::SendChat(text.into()))
            .await;
    }

    pub async fn set_muted(&self, muted: bool) {
        let _ = self.commands.send(SessionCommand::SetMuted(muted)).await;
    }

    pub async fn set_deafened(&self, deafened: bool) {
        let _ = self
            .commands
            .send(SessionCommand::SetDeafened(deafened))
            .await;
    }

    pub async fn set_output_gain(&self, gain: f32) {
        let _ = self
            .commands
            .send(SessionCommand::SetOutputGain(gain))
            .await;
    }

    pub async fn leave(&self) {
        let _ = self.commands.send(SessionCommand::Leave).await;
    }
}

/// One voice-room session: owns the relay link, the negotiation engine, the
/// media lifecycle and the chat history, and drives all of them from a
/// single event loop so signaling messages are processed strictly in
/// arrival order.
pub struct Session<T, P, C> {
    identity: RoomIdentity,
    transport: T,
    transport_rx: mpsc::Receiver<TransportEvent>,
    backend: P,
    peer_rx: mpsc::Receiver<PeerEvent>,
    peer_gone: bool,
    media: MediaLifecycle<C>,
    chat: ChatLog,
    engine: Option<NegotiationEngine>,
    commands: mpsc::Receiver<SessionCommand>,
    events: mpsc::Sender<SessionEvent>,
    transport_open: bool,
    left: bool,
}

impl<T, P, C> Session<T, P, C>
where
    T: SignalTransport,
    P: PeerBackend,
    C: AudioCapture,
{
    /// Assembles a session from an already-connected transport and the
    /// externally implemented media/peer primitives. Nothing happens until
    /// [`Session::run`] is spawned.
    pub fn new(
        identity: RoomIdentity,
        transport: T,
        transport_rx: mpsc::Receiver<TransportEvent>,
        backend: P,
        peer_rx: mpsc::Receiver<PeerEvent>,
        capture: C,
    ) -> (Self, SessionHandle, mpsc::Receiver<SessionEvent>) {
        let (command_tx, command_rx) = mpsc::channel(16);
        let (event_tx, event_rx) = mpsc::channel(64);

        let chat = ChatLog::new(identity.display_name.clone());
        let session = Self {
            identity,
            transport,
            transport_rx,
            backend,
            peer_rx,
            peer_gone: false,
            media: MediaLifecycle::new(capture),
            chat,
            engine: None,
            commands: command_rx,
            events: event_tx,
            transport_open: true,
            left: false,
        };

        (
            session,
            SessionHandle {
                commands: command_tx,
            },
            event_rx,
        )
    }

    /// Joins the room and runs until `leave` or the relay link drops.
    pub async fn run(mut self) {
        info!(room = %self.identity.room, "session joining");
        self.transport.send(SignalMessage::Join {
            room_id: self.identity.room.as_str().to_owned(),
            username: self.identity.display_name.clone(),
        });

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => {
                        if !self.handle_command(command).await {
                            break;
                        }
                    }
                    None => {
                        self.teardown().await;
                        break;
                    }
                },

                event = self.transport_rx.recv() => match event {
                    Some(TransportEvent::Signal(message)) => self.dispatch(message).await,
                    Some(TransportEvent::Closed) | None => {
                        self.transport_open = false;
                        self.notify(SessionEvent::Error(Error::Connection(
                            "the relay closed the connection".into(),
                        )))
                        .await;
                        self.teardown().await;
                        break;
                    }
                },

                event = self.peer_rx.recv(), if !self.peer_gone => match event {
                    Some(event) => self.handle_peer_event(event).await,
                    None => self.peer_gone = true,
                },
            }
        }

        info!("session finished");
    }

    /// Routes one relay message by tag: negotiation signals into the engine,
    /// chat into the message channel, everything else is presence or noise.
    async fn dispatch(&mut self, message: SignalMessage) {
        match message {
            SignalMessage::Start { player_id } => self.on_start(player_id).await,
            SignalMessage::Offer { offer } => {
                self.drive(NegotiationEvent::RemoteOffer(offer)).await;
            }
            SignalMessage::Answer { answer } => {
                self.drive(NegotiationEvent::RemoteAnswer(answer)).await;
            }
            SignalMessage::Ice { candidate } => {
                self.drive(NegotiationEvent::RemoteCandidate(candidate)).await;
            }
            SignalMessage::Message {
                text,
                username,
                timestamp,
            } => {
                let entry = self.chat.receive(username, text, timestamp);
                self.notify(SessionEvent::Chat(entry)).await;
            }
            SignalMessage::UserJoined { username } => {
                info!(%username, "peer joined the room");
                self.notify(SessionEvent::PeerJoined { username }).await;
            }
            SignalMessage::UserLeft { username } => {
                info!(%username, "peer left the room");
                self.notify(SessionEvent::PeerLeft { username }).await;
            }
            other => debug!(?other, "ignoring unexpected relay message"),
        }
    }

    /// The relay's join acknowledgment: fixes our role, starts the engine,
    /// and brings up local audio. A failed microphone leaves the session
    /// degraded but alive; chat keeps working.
    async fn on_start(&mut self, player_id: u8) {
        let Some(role) = ParticipantRole::from_player_id(player_id) else {
            warn!(player_id, "unsupported player index, ignoring start");
            return;
        };
        if self.engine.is_some() {
            warn!("duplicate start acknowledgment");
            return;
        }

        info!(?role, "join acknowledged");
        let mut engine = NegotiationEngine::new(role);
        engine.handle(NegotiationEvent::Start);
        self.engine = Some(engine);
        self.notify(SessionEvent::RoleAssigned(role)).await;

        match self.media.acquire(&AudioConstraints::default()).await {
            Ok(()) => {
                for track in self.media.local_tracks() {
                    if let Err(e) = self.backend.add_track(track).await {
                        warn!("failed to attach local track: {e}");
                        self.notify(SessionEvent::Error(e)).await;
                    }
                }
                self.drive(NegotiationEvent::LocalAudioReady).await;
            }
            Err(e) => {
                warn!("audio acquisition failed: {e}");
                self.notify(SessionEvent::Error(e)).await;
            }
        }
    }

    /// Feeds one event through the engine and executes the resulting
    /// effects. Backend completions (a finished offer or answer) become
    /// follow-up events, processed before anything new from the network.
    async fn drive(&mut self, event: NegotiationEvent) {
        let mut queue = VecDeque::from([event]);

        while let Some(event) = queue.pop_front() {
            let Some(engine) = self.engine.as_mut() else {
                debug!("negotiation signal before the join acknowledgment, dropping");
                return;
            };

            let before = engine.state();
            let effects = engine.handle(event);
            let after = engine.state();

            if after != before {
                self.notify(SessionEvent::NegotiationStateChanged(after)).await;
            }

            for effect in effects {
                if let Some(follow_up) = self.apply_effect(effect).await {
                    queue.push_back(follow_up);
                }
            }
        }
    }

    async fn apply_effect(&mut self, effect: NegotiationEffect) -> Option<NegotiationEvent> {
        match effect {
            NegotiationEffect::CreateOffer => match self.backend.create_offer().await {
                Ok(description) => Some(NegotiationEvent::LocalDescriptionReady(description)),
                Err(e) => {
                    self.report_negotiation_failure(e).await;
                    None
                }
            },

            NegotiationEffect::ApplyRemoteOffer(description) => {
                if let Err(e) = self.backend.set_remote_description(description).await {
                    self.report_negotiation_failure(e).await;
                    return None;
                }
                match self.backend.create_answer().await {
                    Ok(description) => Some(NegotiationEvent::LocalDescriptionReady(description)),
                    Err(e) => {
                        self.report_negotiation_failure(e).await;
                        None
                    }
                }
            }

            NegotiationEffect::ApplyRemoteAnswer(description) => {
                if let Err(e) = self.backend.set_remote_description(description).await {
                    self.report_negotiation_failure(e).await;
                }
                None
            }

            NegotiationEffect::ApplyCandidate(candidate) => {
                // a single bad candidate stalls nothing else
                if let Err(e) = self.backend.add_ice_candidate(candidate).await {
                    warn!("failed to apply remote candidate: {e}");
                }
                None
            }

            NegotiationEffect::Send(message) => {
                self.transport.send(message);
                None
            }

            NegotiationEffect::CloseBackend => {
                self.backend.close().await;
                None
            }
        }
    }

    /// A failed negotiation step stalls the handshake but never the
    /// session; the user hears about it once.
    async fn report_negotiation_failure(&mut self, error: Error) {
        warn!("negotiation step failed: {error}");
        self.notify(SessionEvent::Error(error)).await;
    }

    async fn handle_peer_event(&mut self, event: PeerEvent) {
        match event {
            PeerEvent::CandidateGathered(candidate) => {
                self.drive(NegotiationEvent::LocalCandidate(candidate)).await;
            }
            PeerEvent::Established => self.drive(NegotiationEvent::TransportEstablished).await,
            PeerEvent::ConnectionLost => self.drive(NegotiationEvent::TransportLost).await,
            PeerEvent::RemoteTrack(handle) => {
                debug!("remote audio attached");
                self.media.add_remote(handle);
            }
        }
    }

    /// Returns `false` when the session should stop.
    async fn handle_command(&mut self, command: SessionCommand) -> bool {
        match command {
            SessionCommand::SendChat(text) => {
                self.send_chat(text).await;
                true
            }
            SessionCommand::SetMuted(muted) => {
                self.media.set_muted(muted);
                true
            }
            SessionCommand::SetDeafened(deafened) => {
                self.media.set_deafened(deafened);
                true
            }
            SessionCommand::SetOutputGain(gain) => {
                self.media.set_output_gain(gain);
                true
            }
            SessionCommand::Leave => {
                self.teardown().await;
                false
            }
        }
    }

    async fn send_chat(&mut self, text: String) {
        let text = text.trim().to_owned();
        if text.is_empty() {
            return;
        }
        if !self.transport_open || !self.transport.is_open() {
            self.notify(SessionEvent::Error(Error::NotConnected)).await;
            return;
        }

        let (entry, message) = self.chat.compose(text);
        self.transport.send(message);
        self.notify(SessionEvent::Chat(entry)).await;
    }

    /// Unwinds whatever exists: engine, peer connection, media, transport.
    /// Safe in any state and on repeat calls.
    async fn teardown(&mut self) {
        if self.left {
            return;
        }
        self.left = true;

        if let Some(mut engine) = self.engine.take() {
            engine.handle(NegotiationEvent::Close);
        }
        self.backend.close().await;
        self.media.release();
        self.chat.clear();
        self.transport.close().await;
        self.transport_open = false;

        self.notify(SessionEvent::Left).await;
    }

    async fn notify(&self, event: SessionEvent) {
        if self.events.send(event).await.is_err() {
            debug!("session event receiver dropped");
        }
    }
}

impl<P, C> Session<WsTransport, P, C>
where
    P: PeerBackend,
    C: AudioCapture,
{
    /// Connects to the relay over WebSocket and assembles a session around
    /// the link. Fails with [`Error::Connection`] if the relay is
    /// unreachable; nothing is retried.
    pub async fn connect(
        endpoint: &str,
        identity: RoomIdentity,
        backend: P,
        peer_rx: mpsc::Receiver<PeerEvent>,
        capture: C,
    ) -> Result<(Self, SessionHandle, mpsc::Receiver<SessionEvent>)> {
        let (transport, transport_rx) = WsTransport::connect(endpoint).await?;
        Ok(Self::new(
            identity,
            transport,
            transport_rx,
            backend,
            peer_rx,
            capture,
        ))
    }

    /// Joins a room from a raw user-typed code. The code is validated
    /// before anything touches the network, so a typo fails with
    /// [`Error::Validation`] and no connection attempt.
    pub async fn join(
        endpoint: &str,
        code: &str,
        display_name: impl Into<String>,
        backend: P,
        peer_rx: mpsc::Receiver<PeerEvent>,
        capture: C,
    ) -> Result<(Self, SessionHandle, mpsc::Receiver<SessionEvent>)> {
        let room = RoomCode::parse(code)?;
        Self::connect(
            endpoint,
            RoomIdentity::new(room, display_name),
            backend,
            peer_rx,
            capture,
        )
        .await
    }
}
