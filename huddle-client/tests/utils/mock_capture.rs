use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use huddle_client::error::{Error, Result};
use huddle_client::media::{AudioCapture, AudioConstraints, AudioTrack, LocalMediaHandle};

/// One fake microphone track with observable enable/stop state.
#[derive(Default)]
pub struct MockTrack {
    enabled: AtomicBool,
    stops: AtomicUsize,
}

impl MockTrack {
    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

impl AudioTrack for MockTrack {
    fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

/// Capture primitive that either hands out a single mock track or fails the
/// way a denied permission prompt does.
pub struct MockAudioCapture {
    track: Arc<MockTrack>,
    fail: bool,
}

impl MockAudioCapture {
    pub fn new() -> (Self, Arc<MockTrack>) {
        let track = Arc::new(MockTrack::default());
        (
            Self {
                track: track.clone(),
                fail: false,
            },
            track,
        )
    }

    pub fn failing() -> Self {
        Self {
            track: Arc::new(MockTrack::default()),
            fail: true,
        }
    }
}

#[async_trait]
impl AudioCapture for MockAudioCapture {
    async fn acquire(&mut self, _constraints: &AudioConstraints) -> Result<LocalMediaHandle> {
        if self.fail {
            return Err(Error::MediaAccess("permission denied".into()));
        }
        Ok(LocalMediaHandle::new(vec![self.track.clone()]))
    }
}
