//! Face capture: camera lifecycle and still encoding.
//!
//! ```text
//! Idle ─request─▶ Requesting ─ok─▶ Streaming ─▶ Stabilizing ─delay─▶ Ready ─take─▶ Captured
//!                     │                                               ▲             │
//!                     └─err─▶ Denied                                  └────retake───┘
//! any state ─close─▶ Closed
//! ```
//!
//! The first frames after a stream starts are usually under-exposed or out
//! of focus, so stills are only taken once the stabilization delay has
//! elapsed. The stream is released on every exit path: explicit close,
//! denial, and drop of the controller.

use attest_types::{FaceImage, SessionRecord};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::{CaptureError, PlatformError};
use crate::platform::{Frame, MediaSource, MediaStream, VideoConstraints};

pub const DEFAULT_STABILIZATION: Duration = Duration::from_secs(2);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraState {
    Idle,
    Requesting,
    Streaming,
    Stabilizing,
    Ready,
    Captured,
    Closed,
    Denied,
}

impl CameraState {
    /// A stream is attached.
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            Self::Streaming | Self::Stabilizing | Self::Ready | Self::Captured
        )
    }

    /// Stills may be taken.
    pub fn can_capture(&self) -> bool {
        matches!(self, Self::Ready | Self::Captured)
    }
}

pub struct FaceCaptureController {
    source: Arc<dyn MediaSource>,
    constraints: VideoConstraints,
    stabilization: Duration,
    state: CameraState,
    ready_at: Option<Instant>,
    stream: Option<Box<dyn MediaStream>>,
}

impl FaceCaptureController {
    pub fn new(source: Arc<dyn MediaSource>, constraints: VideoConstraints) -> Self {
        Self {
            source,
            constraints,
            stabilization: DEFAULT_STABILIZATION,
            state: CameraState::Idle,
            ready_at: None,
            stream: None,
        }
    }

    pub fn with_stabilization(mut self, delay: Duration) -> Self {
        self.stabilization = delay;
        self
    }

    /// Current state, counting an elapsed stabilization delay as `Ready`.
    pub fn state(&self) -> CameraState {
        match (self.state, self.ready_at) {
            (CameraState::Stabilizing, Some(at)) if Instant::now() >= at => CameraState::Ready,
            (state, _) => state,
        }
    }

    /// Tracks still live on the owned stream; zero when none is held.
    pub fn active_tracks(&self) -> usize {
        self.stream.as_ref().map_or(0, |s| s.active_tracks())
    }

    /// Open the front camera and start the stabilization delay.
    ///
    /// A no-op while a stream is already open. Reopening after `Closed` or
    /// `Denied` starts a fresh capture session.
    pub async fn request_capture(&mut self) -> Result<(), CaptureError> {
        if self.state().is_open() {
            debug!(state = ?self.state, "camera already open");
            return Ok(());
        }

        self.state = CameraState::Requesting;
        debug!(source = self.source.name(), constraints = ?self.constraints, "requesting camera");

        match self.source.open(&self.constraints).await {
            Ok(stream) => {
                self.stream = Some(stream);
                self.state = CameraState::Streaming;
                debug!("camera stream attached to preview");
                self.ready_at = Some(Instant::now() + self.stabilization);
                self.state = CameraState::Stabilizing;
                Ok(())
            }
            Err(e) => {
                self.release();
                self.state = CameraState::Denied;
                warn!(source = self.source.name(), error = %e, "camera request failed");
                Err(match e {
                    PlatformError::Unsupported => CaptureError::Unavailable(e.to_string()),
                    other => CaptureError::Denied(other.to_string()),
                })
            }
        }
    }

    /// Suspend until the stabilization delay has elapsed.
    pub async fn wait_until_ready(&mut self) -> CameraState {
        if let (CameraState::Stabilizing, Some(at)) = (self.state, self.ready_at) {
            tokio::time::sleep_until(at).await;
        }
        self.promote_if_stable();
        self.state
    }

    /// Render the current frame to PNG and store it in the record.
    ///
    /// Returns `Ok(false)` without touching the record unless the camera is
    /// `Ready` or `Captured`. Each call replaces the previous still.
    pub fn take_photo(&mut self, record: &mut SessionRecord) -> Result<bool, CaptureError> {
        self.promote_if_stable();
        if !self.state.can_capture() {
            debug!(state = ?self.state, "take_photo ignored");
            return Ok(false);
        }

        let frame = self
            .stream
            .as_mut()
            .and_then(|s| s.current_frame())
            .ok_or(CaptureError::NoFrame)?;
        let png = encode_png(&frame)?;

        record.set_face_image(FaceImage::from_png(&png));
        self.state = CameraState::Captured;
        info!(
            width = frame.width,
            height = frame.height,
            bytes = png.len(),
            "face still captured"
        );
        Ok(true)
    }

    /// Stop every track and move to `Closed`. Valid from any state.
    pub fn close(&mut self) {
        self.release();
        self.ready_at = None;
        if self.state != CameraState::Closed {
            debug!(from = ?self.state, "camera closed");
        }
        self.state = CameraState::Closed;
    }

    fn promote_if_stable(&mut self) {
        if self.state == CameraState::Stabilizing && self.state() == CameraState::Ready {
            self.state = CameraState::Ready;
            self.ready_at = None;
            debug!("camera ready");
        }
    }

    fn release(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop_all_tracks();
        }
    }
}

impl Drop for FaceCaptureController {
    fn drop(&mut self) {
        self.close();
    }
}

/// Encode an RGBA frame as an 8-bit PNG.
pub fn encode_png(frame: &Frame) -> Result<Vec<u8>, CaptureError> {
    if frame.width == 0 || frame.height == 0 {
        return Err(CaptureError::NoFrame);
    }
    let expected = frame.width as usize * frame.height as usize * 4;
    if frame.rgba.len() != expected {
        return Err(CaptureError::Encode(format!(
            "frame buffer holds {} bytes, expected {expected}",
            frame.rgba.len()
        )));
    }

    let mut png = Vec::new();
    let mut encoder = png::Encoder::new(&mut png, frame.width, frame.height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder
        .write_header()
        .map_err(|e| CaptureError::Encode(e.to_string()))?;
    writer
        .write_image_data(&frame.rgba)
        .map_err(|e| CaptureError::Encode(e.to_string()))?;
    writer
        .finish()
        .map_err(|e| CaptureError::Encode(e.to_string()))?;
    Ok(png)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use attest_types::Flow;
    use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

    /// Camera whose frames are solid squares of an incrementing shade.
    struct Camera {
        deny: Option<PlatformError>,
        live_tracks: Arc<AtomicUsize>,
        shade: Arc<AtomicU8>,
    }

    struct Stream {
        live_tracks: Arc<AtomicUsize>,
        shade: Arc<AtomicU8>,
        stopped: bool,
    }

    impl MediaStream for Stream {
        fn current_frame(&mut self) -> Option<Frame> {
            let shade = self.shade.fetch_add(1, Ordering::SeqCst);
            Some(Frame {
                width: 2,
                height: 2,
                rgba: vec![shade; 16],
            })
        }

        fn active_tracks(&self) -> usize {
            if self.stopped {
                0
            } else {
                1
            }
        }

        fn stop_all_tracks(&mut self) {
            if !self.stopped {
                self.stopped = true;
                self.live_tracks.fetch_sub(1, Ordering::SeqCst);
            }
        }
    }

    #[async_trait]
    impl MediaSource for Camera {
        async fn open(
            &self,
            _constraints: &VideoConstraints,
        ) -> Result<Box<dyn MediaStream>, PlatformError> {
            if let Some(e) = &self.deny {
                return Err(e.clone());
            }
            self.live_tracks.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(Stream {
                live_tracks: self.live_tracks.clone(),
                shade: self.shade.clone(),
                stopped: false,
            }))
        }

        fn name(&self) -> &str {
            "test-camera"
        }
    }

    fn controller(deny: Option<PlatformError>) -> (Arc<AtomicUsize>, FaceCaptureController) {
        let live_tracks = Arc::new(AtomicUsize::new(0));
        let camera = Arc::new(Camera {
            deny,
            live_tracks: live_tracks.clone(),
            shade: Arc::new(AtomicU8::new(1)),
        });
        (
            live_tracks,
            FaceCaptureController::new(camera, VideoConstraints::default()),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn photo_is_ignored_until_stabilized() {
        let (_, mut camera) = controller(None);
        let mut record = SessionRecord::new(Flow::CheckIn);

        assert!(!camera.take_photo(&mut record).unwrap());
        camera.request_capture().await.unwrap();
        assert_eq!(camera.state(), CameraState::Stabilizing);

        tokio::time::advance(Duration::from_millis(1999)).await;
        assert!(!camera.take_photo(&mut record).unwrap());
        assert!(record.face_image().is_none());

        tokio::time::advance(Duration::from_millis(1)).await;
        assert_eq!(camera.state(), CameraState::Ready);
        assert!(camera.take_photo(&mut record).unwrap());
        assert_eq!(camera.state(), CameraState::Captured);

        let png = record.face_image().unwrap().to_png().unwrap();
        assert_eq!(png[..8], PNG_SIGNATURE);
    }

    #[tokio::test(start_paused = true)]
    async fn retake_overwrites_previous_still() {
        let (_, mut camera) = controller(None);
        let mut record = SessionRecord::new(Flow::CheckIn);
        camera.request_capture().await.unwrap();
        assert_eq!(camera.wait_until_ready().await, CameraState::Ready);

        camera.take_photo(&mut record).unwrap();
        let first = record.face_image().cloned().unwrap();
        camera.take_photo(&mut record).unwrap();
        let second = record.face_image().cloned().unwrap();

        assert_ne!(first, second);
        let decoded = png::Decoder::new(std::io::Cursor::new(second.to_png().unwrap()));
        let mut reader = decoded.read_info().unwrap();
        let mut buf = vec![0; reader.output_buffer_size()];
        reader.next_frame(&mut buf).unwrap();
        assert!(buf.iter().all(|&b| b == 2), "second frame shade expected");
    }

    fn assert_released(live: &AtomicUsize, camera: &FaceCaptureController) {
        assert_eq!(live.load(Ordering::SeqCst), 0);
        assert_eq!(camera.active_tracks(), 0);
        assert_eq!(camera.state(), CameraState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn close_releases_stream_in_every_reachable_state() {
        let (live, mut camera) = controller(None);
        camera.request_capture().await.unwrap();
        assert_eq!(camera.state(), CameraState::Stabilizing);
        assert_eq!(live.load(Ordering::SeqCst), 1);
        assert_eq!(camera.active_tracks(), 1);
        camera.close();
        assert_released(&live, &camera);

        camera.request_capture().await.unwrap();
        assert_eq!(camera.wait_until_ready().await, CameraState::Ready);
        assert_eq!(camera.active_tracks(), 1);
        camera.close();
        assert_released(&live, &camera);

        camera.request_capture().await.unwrap();
        camera.wait_until_ready().await;
        camera.take_photo(&mut SessionRecord::new(Flow::CheckIn)).unwrap();
        assert_eq!(camera.state(), CameraState::Captured);
        camera.close();
        assert_released(&live, &camera);

        let (live, mut denied) = controller(Some(PlatformError::Denied("NotAllowedError".into())));
        denied.request_capture().await.unwrap_err();
        assert_eq!(denied.state(), CameraState::Denied);
        denied.close();
        assert_released(&live, &denied);

        // Idle and already-closed controllers close cleanly too.
        let (live, mut idle) = controller(None);
        idle.close();
        idle.close();
        assert_released(&live, &idle);
    }

    #[tokio::test(start_paused = true)]
    async fn close_cancels_pending_stabilization() {
        let (_, mut camera) = controller(None);
        camera.request_capture().await.unwrap();
        camera.close();
        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(camera.state(), CameraState::Closed);
        assert!(!camera.take_photo(&mut SessionRecord::new(Flow::CheckIn)).unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn drop_releases_stream() {
        let (live, mut camera) = controller(None);
        camera.request_capture().await.unwrap();
        drop(camera);
        assert_eq!(live.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn denial_and_absence_map_to_distinct_errors() {
        let (live, mut camera) = controller(Some(PlatformError::Denied("NotAllowedError".into())));
        let err = camera.request_capture().await.unwrap_err();
        assert!(matches!(err, CaptureError::Denied(_)));
        assert_eq!(err.user_message(), "Unable to access camera.");
        assert_eq!(camera.state(), CameraState::Denied);
        assert_eq!(live.load(Ordering::SeqCst), 0);

        let (_, mut camera) = controller(Some(PlatformError::Unsupported));
        let err = camera.request_capture().await.unwrap_err();
        assert!(matches!(err, CaptureError::Unavailable(_)));
        assert_eq!(err.user_message(), "Camera not supported on this device.");
    }

    #[test]
    fn encode_rejects_mismatched_buffers() {
        let frame = Frame {
            width: 2,
            height: 2,
            rgba: vec![0; 15],
        };
        assert!(matches!(encode_png(&frame), Err(CaptureError::Encode(_))));
        let empty = Frame {
            width: 0,
            height: 0,
            rgba: Vec::new(),
        };
        assert!(matches!(encode_png(&empty), Err(CaptureError::NoFrame)));
    }
}
