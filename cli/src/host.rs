//! Host capabilities for a terminal: a still image for the camera, a
//! location and Wi-Fi reading from flags, and a console presence prompt for
//! the authenticator.

use async_trait::async_trait;
use attest_capture::biometric::digest16;
use attest_capture::{
    CredentialCreationOptions, Frame, GeolocationSource, MediaSource, MediaStream,
    NetworkInfoSource, PlatformAuthenticator, PlatformCredential, PlatformError, VideoConstraints,
    WifiReading,
};
use attest_types::Coordinates;
use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader as AsyncBufReader};
use tracing::debug;

// ── Camera ─────────────────────────────────────────────────────────────

/// A camera that streams one still image read from a PNG file.
pub struct StillImageCamera {
    path: PathBuf,
}

impl StillImageCamera {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl MediaSource for StillImageCamera {
    async fn open(
        &self,
        constraints: &VideoConstraints,
    ) -> Result<Box<dyn MediaStream>, PlatformError> {
        let frame = load_png(&self.path)?;
        if frame.width > constraints.max_width || frame.height > constraints.max_height {
            debug!(
                width = frame.width,
                height = frame.height,
                "still image exceeds the requested resolution"
            );
        }
        Ok(Box::new(StillStream {
            frame: Some(frame),
        }))
    }

    fn name(&self) -> &str {
        "still-image"
    }
}

struct StillStream {
    frame: Option<Frame>,
}

impl MediaStream for StillStream {
    fn current_frame(&mut self) -> Option<Frame> {
        self.frame.clone()
    }

    fn active_tracks(&self) -> usize {
        usize::from(self.frame.is_some())
    }

    fn stop_all_tracks(&mut self) {
        self.frame = None;
    }
}

/// Decode a PNG file into an 8-bit RGBA frame.
pub fn load_png(path: &Path) -> Result<Frame, PlatformError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => PlatformError::Unsupported,
        _ => PlatformError::Failed(format!("{}: {e}", path.display())),
    })?;

    let mut decoder = png::Decoder::new(BufReader::new(file));
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder
        .read_info()
        .map_err(|e| PlatformError::Failed(format!("png header: {e}")))?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| PlatformError::Failed(format!("png data: {e}")))?;
    let bytes = &buf[..info.buffer_size()];

    let rgba = match info.color_type {
        png::ColorType::Rgba => bytes.to_vec(),
        png::ColorType::Rgb => bytes
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], u8::MAX])
            .collect(),
        png::ColorType::Grayscale => bytes.iter().flat_map(|&g| [g, g, g, u8::MAX]).collect(),
        png::ColorType::GrayscaleAlpha => bytes
            .chunks_exact(2)
            .flat_map(|p| [p[0], p[0], p[0], p[1]])
            .collect(),
        png::ColorType::Indexed => {
            return Err(PlatformError::Failed("indexed png was not expanded".into()))
        }
    };

    Ok(Frame {
        width: info.width,
        height: info.height,
        rgba,
    })
}

// ── Location and Wi-Fi ─────────────────────────────────────────────────

/// Coordinates supplied on the command line, or none at all.
pub struct FixedLocation(pub Option<Coordinates>);

#[async_trait]
impl GeolocationSource for FixedLocation {
    async fn current_position(&self) -> Result<Coordinates, PlatformError> {
        self.0.ok_or(PlatformError::Unsupported)
    }

    fn name(&self) -> &str {
        "command-line"
    }
}

/// SSID and MAC supplied on the command line.
pub struct FixedWifi(pub WifiReading);

#[async_trait]
impl NetworkInfoSource for FixedWifi {
    async fn read(&self) -> Result<WifiReading, PlatformError> {
        Ok(self.0.clone())
    }

    fn name(&self) -> &str {
        "command-line"
    }
}

// ── Authenticator ──────────────────────────────────────────────────────

/// Asks the person at the terminal to confirm presence.
pub struct ConsoleAuthenticator {
    assume_yes: bool,
}

impl ConsoleAuthenticator {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

#[async_trait]
impl PlatformAuthenticator for ConsoleAuthenticator {
    fn is_supported(&self) -> bool {
        true
    }

    async fn create_credential(
        &self,
        options: &CredentialCreationOptions<'_>,
    ) -> Result<Option<PlatformCredential>, PlatformError> {
        if !self.assume_yes {
            eprint!(
                "{}: confirm presence for {} ({}) [y/N] ",
                options.relying_party, options.user.display_name, options.user.name
            );
            let mut lines = AsyncBufReader::new(tokio::io::stdin()).lines();
            let answer = tokio::time::timeout(options.timeout, lines.next_line())
                .await
                .map_err(|_| PlatformError::TimedOut)?
                .map_err(|e| PlatformError::Failed(e.to_string()))?
                .unwrap_or_default();
            if !matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
                return Err(PlatformError::Denied("presence not confirmed".into()));
            }
        }

        Ok(Some(PlatformCredential {
            id: digest16(options.challenge).to_vec(),
        }))
    }

    fn name(&self) -> &str {
        "console"
    }
}
