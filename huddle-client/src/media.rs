use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::Result;

/// Microphone constraints requested at acquisition time.
#[derive(Debug, Clone)]
pub struct AudioConstraints {
    pub echo_cancellation: bool,
    pub noise_suppression: bool,
    pub auto_gain_control: bool,
}

impl Default for AudioConstraints {
    fn default() -> Self {
        Self {
            echo_cancellation: true,
            noise_suppression: true,
            auto_gain_control: true,
        }
    }
}

/// One captured audio track. Enabling and disabling is cheap, symmetric and
/// never renegotiates the peer connection.
pub trait AudioTrack: Send + Sync {
    fn set_enabled(&self, enabled: bool);
    fn is_enabled(&self) -> bool;
    /// Stops capture permanently. Stopped tracks cannot be re-enabled.
    fn stop(&self);
}

/// Playback sink for one remote audio stream.
pub trait AudioSink: Send + Sync {
    /// Gain in `0.0..=1.0`; zero is silence.
    fn set_gain(&self, gain: f32);
}

/// The media-capture primitive, implemented outside this crate.
#[async_trait]
pub trait AudioCapture: Send + 'static {
    /// Requests microphone access. Fails with [`crate::Error::MediaAccess`]
    /// when permission is denied or no device exists; the caller surfaces
    /// that to the user and does not retry.
    async fn acquire(&mut self, constraints: &AudioConstraints) -> Result<LocalMediaHandle>;
}

/// Owns the captured audio source. Tracks are shared with the negotiation
/// engine (attached, not moved) for the session's lifetime.
pub struct LocalMediaHandle {
    tracks: Vec<Arc<dyn AudioTrack>>,
    released: bool,
}

impl LocalMediaHandle {
    pub fn new(tracks: Vec<Arc<dyn AudioTrack>>) -> Self {
        Self {
            tracks,
            released: false,
        }
    }

    pub fn tracks(&self) -> &[Arc<dyn AudioTrack>] {
        &self.tracks
    }

    pub fn set_enabled(&self, enabled: bool) {
        for track in &self.tracks {
            track.set_enabled(enabled);
        }
    }

    /// Stops every track. Guarded so a second call is a no-op.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        for track in &self.tracks {
            track.stop();
        }
    }
}

impl fmt::Debug for LocalMediaHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalMediaHandle")
            .field("tracks", &self.tracks.len())
            .field("released", &self.released)
            .finish()
    }
}

/// Inbound audio once negotiation completes, routed to a playback sink.
pub struct RemoteMediaHandle {
    sink: Arc<dyn AudioSink>,
}

impl RemoteMediaHandle {
    pub fn new(sink: Arc<dyn AudioSink>) -> Self {
        Self { sink }
    }
}

impl fmt::Debug for RemoteMediaHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteMediaHandle").finish_non_exhaustive()
    }
}

/// Tracks the local microphone and remote playback for one session: mute is
/// a track-enable toggle, deafen zeroes playback gain, and the two never
/// interact with signaling.
pub struct MediaLifecycle<C> {
    capture: C,
    local: Option<LocalMediaHandle>,
    remote: Vec<RemoteMediaHandle>,
    muted: bool,
    deafened: bool,
    output_gain: f32,
}

impl<C: AudioCapture> MediaLifecycle<C> {
    pub fn new(capture: C) -> Self {
        Self {
            capture,
            local: None,
            remote: Vec::new(),
            muted: false,
            deafened: false,
            output_gain: 1.0,
        }
    }

    pub async fn acquire(&mut self, constraints: &AudioConstraints) -> Result<()> {
        let handle = self.capture.acquire(constraints).await?;
        debug!(tracks = handle.tracks().len(), "local audio acquired");
        handle.set_enabled(!self.muted);
        self.local = Some(handle);
        Ok(())
    }

    pub fn has_local_audio(&self) -> bool {
        self.local.is_some()
    }

    pub fn local_tracks(&self) -> Vec<Arc<dyn AudioTrack>> {
        self.local
            .as_ref()
            .map(|handle| handle.tracks().to_vec())
            .unwrap_or_default()
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn is_deafened(&self) -> bool {
        self.deafened
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        match &self.local {
            Some(handle) => handle.set_enabled(!muted),
            None => warn!("mute toggled with no local audio"),
        }
    }

    pub fn set_deafened(&mut self, deafened: bool) {
        self.deafened = deafened;
        self.apply_output_gain();
    }

    /// Playback volume for all remote sinks, remembered across deafen.
    pub fn set_output_gain(&mut self, gain: f32) {
        self.output_gain = gain.clamp(0.0, 1.0);
        self.apply_output_gain();
    }

    /// New remote streams pick up the current gain, so arriving audio while
    /// deafened stays silent.
    pub fn add_remote(&mut self, handle: RemoteMediaHandle) {
        handle.sink.set_gain(self.effective_gain());
        self.remote.push(handle);
    }

    /// Stops local tracks and drops remote playback. Idempotent; called on
    /// leave and on relay disconnect.
    pub fn release(&mut self) {
        if let Some(mut handle) = self.local.take() {
            handle.release();
        }
        self.remote.clear();
    }

    fn effective_gain(&self) -> f32 {
        if self.deafened { 0.0 } else { self.output_gain }
    }

    fn apply_output_gain(&self) {
        let gain = self.effective_gain();
        for handle in &self.remote {
            handle.sink.set_gain(gain);
        }
    }
}
