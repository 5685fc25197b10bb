use crate::model::room::RoomCode;
use crate::names::random_display_name;

/// Who we are in which room. Built locally before any network activity and
/// immutable for the lifetime of a session.
#[derive(Debug, Clone)]
pub struct RoomIdentity {
    pub room: RoomCode,
    pub display_name: String,
}

impl RoomIdentity {
    pub fn new(room: RoomCode, display_name: impl Into<String>) -> Self {
        Self {
            room,
            display_name: display_name.into(),
        }
    }

    /// Identity with a generated display name, for callers that don't ask
    /// the user for one.
    pub fn anonymous(room: RoomCode) -> Self {
        Self::new(room, random_display_name())
    }
}
