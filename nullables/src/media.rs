//! Nullable camera: canned frames and observable track counts.

use async_trait::async_trait;
use attest_capture::{Frame, MediaSource, MediaStream, PlatformError, VideoConstraints};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A camera that hands out streams of pre-configured frames.
///
/// Live tracks across every stream it opened are counted in one shared
/// counter, so a test can check that nothing was left running.
pub struct NullMediaSource {
    frames: Vec<Frame>,
    failure: Option<PlatformError>,
    live_tracks: Arc<AtomicUsize>,
    requests: Mutex<Vec<VideoConstraints>>,
}

impl NullMediaSource {
    /// A camera producing `frames` in order, repeating the last one.
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames,
            failure: None,
            live_tracks: Arc::new(AtomicUsize::new(0)),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A camera whose frames are solid squares of increasing shade.
    pub fn shaded(count: u8) -> Self {
        Self::new((1..=count).map(|shade| solid_frame(4, 4, shade)).collect())
    }

    /// Permission refused.
    pub fn denied() -> Self {
        Self::failing(PlatformError::Denied("NotAllowedError".into()))
    }

    /// No camera on this host.
    pub fn unsupported() -> Self {
        Self::failing(PlatformError::Unsupported)
    }

    pub fn failing(error: PlatformError) -> Self {
        let mut source = Self::new(Vec::new());
        source.failure = Some(error);
        source
    }

    /// Tracks currently running across all opened streams.
    pub fn live_tracks(&self) -> usize {
        self.live_tracks.load(Ordering::SeqCst)
    }

    /// Constraints of every open request, in order.
    pub fn requests(&self) -> Vec<VideoConstraints> {
        self.requests.lock().unwrap().clone()
    }
}

/// A `width` x `height` frame with every channel set to `shade`.
pub fn solid_frame(width: u32, height: u32, shade: u8) -> Frame {
    Frame {
        width,
        height,
        rgba: vec![shade; (width * height * 4) as usize],
    }
}

#[async_trait]
impl MediaSource for NullMediaSource {
    async fn open(
        &self,
        constraints: &VideoConstraints,
    ) -> Result<Box<dyn MediaStream>, PlatformError> {
        self.requests.lock().unwrap().push(constraints.clone());
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        self.live_tracks.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(NullStream {
            frames: self.frames.clone(),
            next: 0,
            tracks: 1,
            live_tracks: self.live_tracks.clone(),
        }))
    }

    fn name(&self) -> &str {
        "null-camera"
    }
}

/// One video track over canned frames.
pub struct NullStream {
    frames: Vec<Frame>,
    next: usize,
    tracks: usize,
    live_tracks: Arc<AtomicUsize>,
}

impl MediaStream for NullStream {
    fn current_frame(&mut self) -> Option<Frame> {
        if self.tracks == 0 || self.frames.is_empty() {
            return None;
        }
        let frame = self.frames[self.next.min(self.frames.len() - 1)].clone();
        self.next += 1;
        Some(frame)
    }

    fn active_tracks(&self) -> usize {
        self.tracks
    }

    fn stop_all_tracks(&mut self) {
        self.live_tracks.fetch_sub(self.tracks, Ordering::SeqCst);
        self.tracks = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stopping_a_stream_releases_its_track() {
        let camera = NullMediaSource::shaded(2);
        let mut stream = camera.open(&VideoConstraints::default()).await.unwrap();
        assert_eq!(camera.live_tracks(), 1);

        assert_eq!(stream.current_frame().unwrap().rgba[0], 1);
        assert_eq!(stream.current_frame().unwrap().rgba[0], 2);
        assert_eq!(stream.current_frame().unwrap().rgba[0], 2);

        stream.stop_all_tracks();
        stream.stop_all_tracks();
        assert_eq!(camera.live_tracks(), 0);
        assert!(stream.current_frame().is_none());
    }

    #[tokio::test]
    async fn denied_camera_records_the_request() {
        let camera = NullMediaSource::denied();
        assert!(camera.open(&VideoConstraints::default()).await.is_err());
        assert_eq!(camera.requests().len(), 1);
        assert_eq!(camera.live_tracks(), 0);
    }
}
