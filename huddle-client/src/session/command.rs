/// Commands from the owning application into the session loop.
#[derive(Debug)]
pub enum SessionCommand {
    /// Send a chat line. Fails with `NotConnected` when the relay link is
    /// down; local history is not touched in that case.
    SendChat(String),
    /// Toggle the local microphone tracks. Never renegotiates.
    SetMuted(bool),
    /// Silence all remote playback, independent of mute.
    SetDeafened(bool),
    /// Playback volume in `0.0..=1.0`, restored when deafen is lifted.
    SetOutputGain(f32),
    /// Tear everything down. Idempotent.
    Leave,
}
