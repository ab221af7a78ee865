//! Image acquisition domain: public API.
//!
//! Turns the two ways a user can supply a photo into a data URI:
//! - an image file (picked or dropped), via `load_image_file`
//! - a frame sampled from a live camera stream, via `camera::CameraSession`

pub mod camera;
mod data_uri;

pub use camera::{CameraDevice, CameraSession, CameraStream};
pub use data_uri::DataUri;

use crate::error::CaptureError;
use image::{DynamicImage, ImageFormat};
use std::path::Path;

/// Largest accepted upload.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Formats accepted from files, mirroring what a browser file picker
/// restricted to `image/png, image/jpeg, image/webp` would allow.
fn accepted_mime(format: ImageFormat) -> Option<&'static str> {
    match format {
        ImageFormat::Png => Some("image/png"),
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::WebP => Some("image/webp"),
        _ => None,
    }
}

/// Read an image file into a data URI.
///
/// The format is sniffed from the bytes, not the extension, and the image
/// is decoded once so a corrupt file fails here instead of at the model.
pub fn load_image_file(path: &Path) -> Result<DataUri, CaptureError> {
    let start = std::time::Instant::now();
    let bytes = std::fs::read(path)?;
    let uri = image_bytes_to_data_uri(&bytes)?;
    log::info!(
        "[CAPTURE] Loaded {} ({} bytes, {}) in {}ms",
        path.display(),
        bytes.len(),
        uri.mime_type(),
        start.elapsed().as_millis()
    );
    Ok(uri)
}

/// Validate in-memory image bytes and wrap them as a data URI.
pub fn image_bytes_to_data_uri(bytes: &[u8]) -> Result<DataUri, CaptureError> {
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(CaptureError::TooLarge {
            size: bytes.len(),
            limit: MAX_IMAGE_BYTES,
        });
    }
    let format = image::guess_format(bytes).map_err(|_| CaptureError::UnsupportedFormat)?;
    let mime = accepted_mime(format).ok_or(CaptureError::UnsupportedFormat)?;
    let decoded = image::load_from_memory_with_format(bytes, format)?;
    log::info!(
        "[CAPTURE] Image {}x{} ({})",
        decoded.width(),
        decoded.height(),
        mime
    );
    Ok(DataUri::from_bytes(mime, bytes))
}

/// Encode a captured frame as a PNG data URI. No disk I/O.
pub fn encode_frame(frame: &DynamicImage) -> Result<DataUri, CaptureError> {
    let encode_start = std::time::Instant::now();
    let mut png_bytes = Vec::new();
    frame.write_to(&mut std::io::Cursor::new(&mut png_bytes), ImageFormat::Png)?;
    log::info!(
        "[CAPTURE] PNG encode: {}ms ({} bytes)",
        encode_start.elapsed().as_millis(),
        png_bytes.len()
    );
    Ok(DataUri::from_bytes("image/png", &png_bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn tiny_png() -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 3, Rgb([30, 120, 40])));
        let mut bytes = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn png_bytes_become_png_data_uri() {
        let uri = image_bytes_to_data_uri(&tiny_png()).unwrap();
        assert_eq!(uri.mime_type(), "image/png");
        assert_eq!(uri.decode().unwrap(), tiny_png());
    }

    #[test]
    fn rejects_unknown_bytes() {
        let err = image_bytes_to_data_uri(b"definitely not an image").unwrap_err();
        assert!(matches!(err, CaptureError::UnsupportedFormat));
    }

    #[test]
    fn rejects_oversized_upload() {
        let bytes = vec![0u8; MAX_IMAGE_BYTES + 1];
        let err = image_bytes_to_data_uri(&bytes).unwrap_err();
        assert!(matches!(err, CaptureError::TooLarge { .. }));
    }

    #[test]
    fn load_image_file_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leaf.png");
        std::fs::write(&path, tiny_png()).unwrap();
        let uri = load_image_file(&path).unwrap();
        assert!(uri.to_string().starts_with("data:image/png;base64,"));
    }

    #[test]
    fn encode_frame_produces_decodable_png() {
        let frame = DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 2, Rgb([0, 0, 255])));
        let uri = encode_frame(&frame).unwrap();
        let decoded = image::load_from_memory(&uri.decode().unwrap()).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (2, 2));
    }
}
