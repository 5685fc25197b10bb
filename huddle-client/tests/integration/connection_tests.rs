use huddle_client::SessionEvent;
use huddle_client::negotiation::NegotiationState;
use huddle_core::{ParticipantRole, SessionDescription, SignalMessage};

use crate::integration::spawn_session;
use crate::utils::{BackendCall, wait_for, wait_for_call, wait_for_sent};
use huddle_core::{CandidateInit, SdpKind};

fn remote_offer() -> SignalMessage {
    SignalMessage::Offer {
        offer: SessionDescription::offer("v=0\r\no=- remote offer"),
    }
}

fn remote_answer() -> SignalMessage {
    SignalMessage::Answer {
        answer: SessionDescription::answer("v=0\r\no=- remote answer"),
    }
}

#[tokio::test]
async fn a_malformed_code_is_rejected_before_any_network_io() {
    use crate::utils::{MockAudioCapture, MockPeerBackend};
    use huddle_client::Session;

    let (backend, peer_rx, _probe) = MockPeerBackend::new();
    let (capture, _track) = MockAudioCapture::new();

    // nothing listens on this endpoint, so reaching the network would fail
    // with a connection error, not a validation error
    let result =
        Session::join("ws://127.0.0.1:1/", "nope", "ada", backend, peer_rx, capture).await;
    assert!(matches!(
        result.map(|_| ()),
        Err(huddle_client::Error::Validation(_))
    ));
}

#[tokio::test]
async fn join_is_the_first_frame_on_the_wire() {
    let session = spawn_session();

    wait_for_sent(&session.transport, |m| {
        matches!(m, SignalMessage::Join { room_id, username }
            if room_id == "AB12C9" && username == "ada")
    })
    .await;
}

#[tokio::test]
async fn first_joiner_becomes_the_responder_and_answers_once() {
    let mut session = spawn_session();

    session
        .transport
        .deliver(SignalMessage::Start { player_id: 0 })
        .await;
    let event = wait_for(&mut session.events, |e| {
        matches!(e, SessionEvent::RoleAssigned(_))
    })
    .await;
    assert!(matches!(
        event,
        SessionEvent::RoleAssigned(ParticipantRole::Responder)
    ));

    session.transport.deliver(remote_offer()).await;
    wait_for(&mut session.events, |e| {
        matches!(
            e,
            SessionEvent::NegotiationStateChanged(NegotiationState::HaveRemoteOffer)
        )
    })
    .await;

    wait_for_sent(&session.transport, |m| {
        matches!(m, SignalMessage::Answer { .. })
    })
    .await;

    // a duplicate offer is a benign no-op: still exactly one answer
    session.transport.deliver(remote_offer()).await;
    session.backend.establish().await;
    wait_for(&mut session.events, |e| {
        matches!(
            e,
            SessionEvent::NegotiationStateChanged(NegotiationState::Connected)
        )
    })
    .await;

    let answers = session
        .transport
        .sent()
        .iter()
        .filter(|m| matches!(m, SignalMessage::Answer { .. }))
        .count();
    assert_eq!(answers, 1);
    assert_eq!(session.backend.count(&BackendCall::CreateAnswer), 1);
    assert_eq!(session.backend.count(&BackendCall::CreateOffer), 0);
}

#[tokio::test]
async fn second_joiner_initiates_with_exactly_one_offer() {
    let mut session = spawn_session();

    session
        .transport
        .deliver(SignalMessage::Start { player_id: 1 })
        .await;
    let event = wait_for(&mut session.events, |e| {
        matches!(e, SessionEvent::RoleAssigned(_))
    })
    .await;
    assert!(matches!(
        event,
        SessionEvent::RoleAssigned(ParticipantRole::Initiator)
    ));

    wait_for_sent(&session.transport, |m| {
        matches!(m, SignalMessage::Offer { .. })
    })
    .await;
    wait_for(&mut session.events, |e| {
        matches!(
            e,
            SessionEvent::NegotiationStateChanged(NegotiationState::HaveLocalOffer)
        )
    })
    .await;

    session.transport.deliver(remote_answer()).await;
    wait_for_call(&session.backend, BackendCall::SetRemote(SdpKind::Answer)).await;

    session.backend.establish().await;
    wait_for(&mut session.events, |e| {
        matches!(
            e,
            SessionEvent::NegotiationStateChanged(NegotiationState::Connected)
        )
    })
    .await;

    let sent = session.transport.sent();
    let offers = sent
        .iter()
        .filter(|m| matches!(m, SignalMessage::Offer { .. }))
        .count();
    let answers = sent
        .iter()
        .filter(|m| matches!(m, SignalMessage::Answer { .. }))
        .count();
    assert_eq!(offers, 1);
    assert_eq!(answers, 0);
    assert_eq!(session.backend.count(&BackendCall::CreateOffer), 1);
}

#[tokio::test]
async fn candidates_ahead_of_the_offer_are_buffered_in_order() {
    let mut session = spawn_session();

    session
        .transport
        .deliver(SignalMessage::Start { player_id: 0 })
        .await;
    wait_for(&mut session.events, |e| {
        matches!(e, SessionEvent::RoleAssigned(_))
    })
    .await;

    // the peer's candidates race ahead of its offer
    for n in 1..=2 {
        session
            .transport
            .deliver(SignalMessage::Ice {
                candidate: CandidateInit::new(format!("candidate:{n}")),
            })
            .await;
    }

    session.transport.deliver(remote_offer()).await;
    wait_for_call(&session.backend, BackendCall::AddCandidate("candidate:2".into())).await;

    let candidate_calls: Vec<_> = session
        .backend
        .calls()
        .into_iter()
        .filter(|c| matches!(c, BackendCall::AddCandidate(_)))
        .collect();
    assert_eq!(
        candidate_calls,
        vec![
            BackendCall::AddCandidate("candidate:1".into()),
            BackendCall::AddCandidate("candidate:2".into()),
        ]
    );

    // with the description in place, candidates now apply immediately
    session
        .transport
        .deliver(SignalMessage::Ice {
            candidate: CandidateInit::new("candidate:3"),
        })
        .await;
    wait_for_call(&session.backend, BackendCall::AddCandidate("candidate:3".into())).await;
}

#[tokio::test]
async fn local_candidates_are_forwarded_immediately() {
    let mut session = spawn_session();

    session
        .transport
        .deliver(SignalMessage::Start { player_id: 1 })
        .await;
    wait_for(&mut session.events, |e| {
        matches!(e, SessionEvent::RoleAssigned(_))
    })
    .await;

    session.backend.gather("candidate:local-1").await;
    wait_for_sent(&session.transport, |m| {
        matches!(m, SignalMessage::Ice { candidate } if candidate.candidate == "candidate:local-1")
    })
    .await;
}

#[tokio::test]
async fn a_rejected_description_stalls_without_killing_the_session() {
    use crate::utils::{MemoryTransport, MockAudioCapture, MockPeerBackend};
    use huddle_client::Session;
    use huddle_core::{RoomCode, RoomIdentity};

    crate::integration::init_tracing();

    let (transport, transport_probe, transport_rx) = MemoryTransport::new();
    let (backend, peer_rx, _backend_probe) = MockPeerBackend::failing_remote_description();
    let (capture, _track) = MockAudioCapture::new();
    let identity = RoomIdentity::new(RoomCode::parse("AB12C9").unwrap(), "ada");
    let (session, handle, mut events) =
        Session::new(identity, transport, transport_rx, backend, peer_rx, capture);
    tokio::spawn(session.run());

    transport_probe
        .deliver(SignalMessage::Start { player_id: 0 })
        .await;
    transport_probe.deliver(remote_offer()).await;

    wait_for(&mut events, |e| {
        matches!(
            e,
            SessionEvent::Error(huddle_client::Error::Negotiation(_))
        )
    })
    .await;

    // no answer went out, but chat is still alive
    handle.send_chat("still here").await;
    wait_for(&mut events, |e| {
        matches!(e, SessionEvent::Chat(entry) if entry.text == "still here")
    })
    .await;
    assert!(
        !transport_probe
            .sent()
            .iter()
            .any(|m| matches!(m, SignalMessage::Answer { .. }))
    );
}
