//! Binary encoder for reference images.
//!
//! Reads an image resource and turns it into a base64 inline-data part.

use crate::ai::mime::detect_image_mime;
use crate::ai::Part;
use crate::models::ReferenceImage;
use crate::{Error, Result};
use base64::Engine as _;

/// Read `image` from disk and encode it losslessly as an inline-data part.
pub async fn encode_image(image: &ReferenceImage) -> Result<Part> {
    let bytes = tokio::fs::read(&image.path)
        .await
        .map_err(|source| Error::Encoding {
            name: image.name.clone(),
            source,
        })?;

    let mime_type = if image.mime_type.is_empty() {
        detect_image_mime(&bytes).to_string()
    } else {
        image.mime_type.clone()
    };

    tracing::debug!(
        "Encoding reference image: {} ({}, {} bytes)",
        image.name,
        mime_type,
        bytes.len()
    );

    Ok(Part::inline_data(mime_type, encode_bytes(&bytes)))
}

pub fn encode_bytes(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

pub fn decode_payload(data: &str) -> Result<Vec<u8>> {
    Ok(base64::engine::general_purpose::STANDARD.decode(data)?)
}
