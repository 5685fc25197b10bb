pub mod model;
mod names;

pub use model::{
    CandidateInit, ChatEntry, ParticipantRole, RoomCode, RoomCodeError, RoomIdentity, SdpKind,
    SessionDescription, SignalMessage,
};
pub use names::random_display_name;
