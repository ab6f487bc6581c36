//! Image codec capability.
//!
//! The [`ImageCodec`] trait is the seam between size resolution (pure math)
//! and pixel work. The resize pipeline is generic over it, so environments
//! without image support simply never construct one — there is no global
//! "is the image library loaded" probe. The production implementation is
//! [`RustCodec`](crate::rust_codec::RustCodec); tests use the recording mock
//! in [`tests`].

use crate::resolve::Dimensions;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("processing failed: {0}")]
    ProcessingFailed(String),
}

/// Encoded image format, detected at decode and reused at encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Jpeg,
    Png,
    Gif,
    WebP,
}

/// Quality setting for lossy encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Canvas background for pad compositing. Defaults to white, matching the
/// classic attachment thumbnail look.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Background(pub [u8; 3]);

impl Default for Background {
    fn default() -> Self {
        Self([0xFF, 0xFF, 0xFF])
    }
}

/// Trait for image codecs.
///
/// `Image` is the codec's decoded handle; the pipeline never inspects it
/// beyond [`dimensions`](Self::dimensions), so a mock can use a bare struct.
pub trait ImageCodec {
    type Image;

    /// Decode image bytes, reporting the detected format.
    fn decode(&self, bytes: &[u8]) -> Result<(Self::Image, Format), CodecError>;

    /// Current pixel dimensions of a decoded image.
    fn dimensions(&self, image: &Self::Image) -> Dimensions;

    /// Resize to exact target dimensions (codec thumbnail convention).
    fn resize(&self, image: &Self::Image, target: Dimensions) -> Result<Self::Image, CodecError>;

    /// Resize to fill the target, center-cropping overflow to exact dimensions.
    fn crop_to_fill(
        &self,
        image: &Self::Image,
        target: Dimensions,
    ) -> Result<Self::Image, CodecError>;

    /// Center `overlay` on a background-filled canvas of `canvas` size,
    /// compositing with "over" semantics.
    fn composite_centered(
        &self,
        overlay: &Self::Image,
        canvas: Dimensions,
        background: Background,
    ) -> Result<Self::Image, CodecError>;

    /// Drop embedded metadata and color profiles.
    fn strip(&self, image: Self::Image) -> Self::Image;

    /// Encode to bytes in the given format.
    fn encode(
        &self,
        image: &Self::Image,
        format: Format,
        quality: Quality,
    ) -> Result<Vec<u8>, CodecError>;
}
