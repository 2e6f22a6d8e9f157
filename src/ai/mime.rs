//! Media type helpers for reference images.

use image::ImageFormat;
use std::path::Path;

/// Sniff an image media type from its magic bytes, falling back to PNG.
pub fn detect_image_mime(bytes: &[u8]) -> &'static str {
    match image::guess_format(bytes) {
        Ok(format) => format.to_mime_type(),
        Err(_) => {
            tracing::warn!(
                "Unrecognized image format (first 4 bytes: {:02X?}), falling back to image/png",
                &bytes[..bytes.len().min(4)]
            );
            "image/png"
        }
    }
}

/// Media type implied by a file extension, if it names a known image format.
pub fn mime_from_extension(path: &Path) -> Option<String> {
    ImageFormat::from_path(path)
        .ok()
        .map(|format| format.to_mime_type().to_string())
}
