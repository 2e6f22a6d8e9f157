//! The generation pipeline: assemble, call the model, extract.

use crate::ai::ImageModel;
use crate::assembler::{assemble_parts, output_config};
use crate::extractor::extract_image;
use crate::models::{DesignConfig, GeneratedImage};
use crate::Result;
use tracing::{debug, info};

/// Run one submission end to end.
///
/// Reference images are read one after another, then the model is called
/// exactly once. Any failure ends the submission; there are no retries.
pub async fn generate_design(
    model: &dyn ImageModel,
    config: &DesignConfig,
) -> Result<GeneratedImage> {
    debug!(
        "Prompt: {} ({} reference image(s), {}, {})",
        config.prompt,
        config.reference_images.len(),
        config.aspect_ratio,
        config.resolution
    );

    let parts = assemble_parts(config).await?;
    let response = model.generate(&parts, &output_config(config)).await?;
    let image = extract_image(&response)?;

    info!(
        "Received generated image ({} base64 chars, reported as {})",
        image.payload().len(),
        image.source_mime_type()
    );
    Ok(image)
}
