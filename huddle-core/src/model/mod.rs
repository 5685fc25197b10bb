mod chat;
mod identity;
mod role;
mod room;
mod signaling;

pub use chat::ChatEntry;
pub use identity::RoomIdentity;
pub use role::ParticipantRole;
pub use room::{ROOM_CODE_LEN, RoomCode, RoomCodeError};
pub use signaling::{CandidateInit, SdpKind, SessionDescription, SignalMessage};
