//! Captured factors: the face still and the biometric proof token.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::TypesError;

/// A captured face still.
///
/// Holds the losslessly encoded (PNG) image as standard base64 without a
/// data-URL prefix, which is the form the backend expects in `faceData`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FaceImage(String);

impl FaceImage {
    /// Wrap raw PNG bytes.
    pub fn from_png(png: &[u8]) -> Self {
        Self(STANDARD.encode(png))
    }

    /// Wrap an already base64-encoded image.
    pub fn from_base64(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn as_base64(&self) -> &str {
        &self.0
    }

    /// Decode back to the PNG bytes.
    pub fn to_png(&self) -> Result<Vec<u8>, TypesError> {
        STANDARD
            .decode(&self.0)
            .map_err(|e| TypesError::InvalidBase64(e.to_string()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// Face bytes never end up in logs.
impl fmt::Debug for FaceImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FaceImage({} base64 chars)", self.0.len())
    }
}

/// Opaque evidence that a platform biometric ceremony completed.
///
/// The client never inspects the token; only its presence counts as proof.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProofToken(String);

impl ProofToken {
    /// Marker the backend recognises as a completed ceremony.
    pub const VERIFIED_MARKER: &'static str = "fingerprint_verified";

    /// The base64-encoded verified marker.
    pub fn verified() -> Self {
        Self(STANDARD.encode(Self::VERIFIED_MARKER))
    }

    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn face_image_decodes_to_original_png() {
        let png = [0x89, b'P', b'N', b'G', 0x0d, 0x0a];
        let image = FaceImage::from_png(&png);
        assert_eq!(image.to_png().unwrap(), png.to_vec());
    }

    #[test]
    fn face_image_debug_hides_payload() {
        let image = FaceImage::from_base64("aGVsbG8=");
        assert_eq!(format!("{image:?}"), "FaceImage(8 base64 chars)");
    }

    #[test]
    fn invalid_base64_is_reported() {
        let image = FaceImage::from_base64("not base64!");
        assert!(matches!(image.to_png(), Err(TypesError::InvalidBase64(_))));
    }

    #[test]
    fn verified_token_is_encoded_marker() {
        assert_eq!(ProofToken::verified().as_str(), "ZmluZ2VycHJpbnRfdmVyaWZpZWQ=");
    }

    #[test]
    fn tokens_serialize_as_plain_strings() {
        let json = serde_json::to_string(&ProofToken::new("abc")).unwrap();
        assert_eq!(json, "\"abc\"");
    }
}
