//! Pure Rust codec on the `image` crate — zero external dependencies.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, GIF, WebP) | `image::load_from_memory_with_format` |
//! | Thumbnail resize | `DynamicImage::thumbnail_exact` (fast sampling) |
//! | Crop-to-fill | `DynamicImage::resize_to_fill` with `Lanczos3` |
//! | Pad composite | `image::imageops::overlay` on an RGB canvas |
//! | Encode | `JpegEncoder` (quality-aware) / `write_to` for the rest |
//!
//! Decoding through the `image` crate discards EXIF and ICC data up front, so
//! [`strip`](ImageCodec::strip) has nothing left to remove and is the
//! identity here. A codec that carries profiles through decode would drop
//! them in `strip` instead.

use crate::codec::{Background, CodecError, Format, ImageCodec, Quality};
use crate::resolve::Dimensions;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

/// Production codec backed by the `image` crate.
#[derive(Debug, Default)]
pub struct RustCodec;

impl RustCodec {
    pub fn new() -> Self {
        Self
    }
}

fn detect_format(bytes: &[u8]) -> Result<Format, CodecError> {
    let guessed =
        image::guess_format(bytes).map_err(|e| CodecError::Decode(e.to_string()))?;
    match guessed {
        ImageFormat::Jpeg => Ok(Format::Jpeg),
        ImageFormat::Png => Ok(Format::Png),
        ImageFormat::Gif => Ok(Format::Gif),
        ImageFormat::WebP => Ok(Format::WebP),
        other => Err(CodecError::UnsupportedFormat(format!("{other:?}"))),
    }
}

fn to_image_format(format: Format) -> ImageFormat {
    match format {
        Format::Jpeg => ImageFormat::Jpeg,
        Format::Png => ImageFormat::Png,
        Format::Gif => ImageFormat::Gif,
        Format::WebP => ImageFormat::WebP,
    }
}

impl ImageCodec for RustCodec {
    type Image = DynamicImage;

    fn decode(&self, bytes: &[u8]) -> Result<(DynamicImage, Format), CodecError> {
        let format = detect_format(bytes)?;
        let image = image::load_from_memory_with_format(bytes, to_image_format(format))
            .map_err(|e| CodecError::Decode(e.to_string()))?;
        Ok((image, format))
    }

    fn dimensions(&self, image: &DynamicImage) -> Dimensions {
        Dimensions {
            width: image.width(),
            height: image.height(),
        }
    }

    fn resize(&self, image: &DynamicImage, target: Dimensions) -> Result<DynamicImage, CodecError> {
        Ok(image.thumbnail_exact(target.width, target.height))
    }

    fn crop_to_fill(
        &self,
        image: &DynamicImage,
        target: Dimensions,
    ) -> Result<DynamicImage, CodecError> {
        Ok(image.resize_to_fill(target.width, target.height, FilterType::Lanczos3))
    }

    fn composite_centered(
        &self,
        overlay: &DynamicImage,
        canvas: Dimensions,
        background: Background,
    ) -> Result<DynamicImage, CodecError> {
        let mut base = RgbImage::from_pixel(canvas.width, canvas.height, Rgb(background.0));
        let top = overlay.to_rgb8();
        let x = (canvas.width as i64 - top.width() as i64) / 2;
        let y = (canvas.height as i64 - top.height() as i64) / 2;
        image::imageops::overlay(&mut base, &top, x, y);
        Ok(DynamicImage::ImageRgb8(base))
    }

    fn strip(&self, image: DynamicImage) -> DynamicImage {
        image
    }

    fn encode(
        &self,
        image: &DynamicImage,
        format: Format,
        quality: Quality,
    ) -> Result<Vec<u8>, CodecError> {
        let mut buf = Vec::new();
        match format {
            Format::Jpeg => {
                let rgb = image.to_rgb8();
                JpegEncoder::new_with_quality(&mut buf, quality.value() as u8)
                    .encode(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
                    .map_err(|e| {
                        CodecError::ProcessingFailed(format!("JPEG encode failed: {e}"))
                    })?;
            }
            Format::Png => {
                image
                    .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
                    .map_err(|e| CodecError::ProcessingFailed(format!("PNG encode failed: {e}")))?;
            }
            // GIF and (lossless) WebP encoders want RGBA input.
            Format::Gif | Format::WebP => {
                DynamicImage::ImageRgba8(image.to_rgba8())
                    .write_to(&mut Cursor::new(&mut buf), to_image_format(format))
                    .map_err(|e| {
                        CodecError::ProcessingFailed(format!("{format:?} encode failed: {e}"))
                    })?;
            }
        }
        Ok(buf)
    }
}
