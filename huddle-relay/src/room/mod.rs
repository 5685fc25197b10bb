mod registry;

pub use registry::{JoinError, RoomRegistry};
pub(crate) use registry::{ConnId, Occupant, encode};
