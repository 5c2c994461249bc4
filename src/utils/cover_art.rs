//! Cover art processing before embedding
//!
//! Artwork is decoded, shrunk so its longest side fits [`MAX_COVER_SIZE`]
//! and re-encoded as JPEG.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::io::Cursor;
use tracing::debug;

use crate::error::TagError;

/// Maximum dimension for embedded cover art (width or height)
pub const MAX_COVER_SIZE: u32 = 512;

/// JPEG quality (0-100)
const JPEG_QUALITY: u8 = 90;

/// Decode, bound and re-encode cover art as JPEG
pub fn process_cover_art(data: &[u8]) -> Result<Vec<u8>, TagError> {
    let decoded = ImageReader::new(Cursor::new(data))
        .with_guessed_format()?
        .decode()?;

    // JPEG has no alpha channel
    let rgb = resize_to_fit(decoded).into_rgb8();

    let mut jpeg = Vec::with_capacity(data.len().min(256 * 1024));
    JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY).encode_image(&rgb)?;

    debug!("Encoded {}x{} cover as {} byte JPEG", rgb.width(), rgb.height(), jpeg.len());
    Ok(jpeg)
}

/// Shrink so neither side exceeds [`MAX_COVER_SIZE`]; never upscales
fn resize_to_fit(img: DynamicImage) -> DynamicImage {
    if img.width() <= MAX_COVER_SIZE && img.height() <= MAX_COVER_SIZE {
        return img;
    }

    let resized = img.resize(MAX_COVER_SIZE, MAX_COVER_SIZE, FilterType::Lanczos3);
    debug!(
        "Shrunk cover art {}x{} to {}x{}",
        img.width(),
        img.height(),
        resized.width(),
        resized.height()
    );
    resized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::png_fixture;

    #[test]
    fn test_small_cover_untouched() {
        let resized = resize_to_fit(DynamicImage::new_rgb8(300, 120));
        assert_eq!((resized.width(), resized.height()), (300, 120));
    }

    #[test]
    fn test_resize_wide_image() {
        let resized = resize_to_fit(DynamicImage::new_rgb8(1500, 1000));
        assert_eq!((resized.width(), resized.height()), (MAX_COVER_SIZE, 341));
    }

    #[test]
    fn test_resize_tall_image() {
        let resized = resize_to_fit(DynamicImage::new_rgb8(640, 1280));
        assert_eq!((resized.width(), resized.height()), (256, MAX_COVER_SIZE));
    }

    #[test]
    fn test_process_outputs_bounded_jpeg() {
        let jpeg = process_cover_art(&png_fixture(1024, 768)).unwrap();

        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!(image::guess_format(&jpeg).unwrap(), image::ImageFormat::Jpeg);
        assert_eq!((decoded.width(), decoded.height()), (512, 384));
    }

    #[test]
    fn test_process_rejects_garbage() {
        assert!(matches!(
            process_cover_art(b"definitely not an image"),
            Err(TagError::Image(_)) | Err(TagError::Io(_))
        ));
    }
}
