//! Response extractor: finds the generated image in a model response.

use crate::ai::{GenerateContentResponse, Part};
use crate::models::GeneratedImage;
use crate::{Error, Result};

/// Take the first inline payload of the first candidate.
///
/// Later parts and candidates are ignored. A response with no candidates, no
/// content, or only text parts yields [`Error::NoImageProduced`].
pub fn extract_image(response: &GenerateContentResponse) -> Result<GeneratedImage> {
    let inline_data = response
        .candidates
        .first()
        .and_then(|candidate| candidate.content.as_ref())
        .and_then(|content| {
            content.parts.iter().find_map(|part| match part {
                Part::InlineData { inline_data } if !inline_data.data.is_empty() => {
                    Some(inline_data)
                }
                _ => None,
            })
        })
        .ok_or(Error::NoImageProduced)?;

    if inline_data.mime_type != GeneratedImage::MIME_TYPE {
        tracing::warn!(
            "Model returned {} but the image is labeled {}",
            inline_data.mime_type,
            GeneratedImage::MIME_TYPE
        );
    }

    Ok(GeneratedImage::from_base64(
        &inline_data.data,
        inline_data.mime_type.clone(),
    ))
}
