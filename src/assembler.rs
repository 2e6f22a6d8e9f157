//! Request assembler: turns a design config into ordered content parts.

use crate::ai::{ImageOutputConfig, Part};
use crate::encoder::encode_image;
use crate::models::DesignConfig;
use crate::prompts;
use crate::Result;

/// Encode every reference image in submission order, then append the
/// synthesized instruction as the final text part.
pub async fn assemble_parts(config: &DesignConfig) -> Result<Vec<Part>> {
    let mut parts = Vec::with_capacity(config.reference_images.len() + 1);

    if config.reference_images.is_empty() {
        tracing::debug!("No reference images provided");
    }
    for image in &config.reference_images {
        parts.push(encode_image(image).await?);
    }

    let enhanced_prompt = prompts::enhance_prompt(&config.prompt, config.reference_images.len());
    tracing::debug!("Enhanced prompt: {}", enhanced_prompt);
    parts.push(Part::text(enhanced_prompt));

    Ok(parts)
}

pub fn output_config(config: &DesignConfig) -> ImageOutputConfig {
    ImageOutputConfig {
        aspect_ratio: config.aspect_ratio,
        image_size: config.resolution,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::decode_payload;
    use crate::models::{AspectRatio, ReferenceImage, Resolution};
    use crate::Error;
    use tempfile::tempdir;

    fn write_refs(dir: &std::path::Path, count: usize) -> Vec<ReferenceImage> {
        (0..count)
            .map(|idx| {
                let path = dir.join(format!("ref-{}.png", idx));
                std::fs::write(&path, format!("image-{}", idx)).unwrap();
                ReferenceImage::new(path, "image/png")
            })
            .collect()
    }

    #[tokio::test]
    async fn test_text_only_request_has_single_part() {
        let parts = assemble_parts(&DesignConfig::new("sunlit studio"))
            .await
            .unwrap();

        assert_eq!(parts.len(), 1);
        match &parts[0] {
            Part::Text { text } => {
                assert!(text.contains("sunlit studio"));
                assert!(!text.contains("CRITICAL INSTRUCTION"));
            }
            other => panic!("expected text part, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_images_precede_text_in_submission_order() {
        let dir = tempdir().unwrap();
        for count in [1usize, 2, 5] {
            let mut config = DesignConfig::new("meeting room");
            config.reference_images = write_refs(dir.path(), count);

            let parts = assemble_parts(&config).await.unwrap();
            assert_eq!(parts.len(), count + 1);

            for (idx, part) in parts[..count].iter().enumerate() {
                match part {
                    Part::InlineData { inline_data } => {
                        let bytes = decode_payload(&inline_data.data).unwrap();
                        assert_eq!(bytes, format!("image-{}", idx).into_bytes());
                    }
                    other => panic!("expected image part at {}, got {:?}", idx, other),
                }
            }

            match parts.last().unwrap() {
                Part::Text { text } => {
                    assert!(text.contains(&format!("provided {} reference image(s)", count)));
                }
                other => panic!("expected trailing text part, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_unreadable_image_aborts_assembly() {
        let dir = tempdir().unwrap();
        let mut config = DesignConfig::new("lobby");
        config.reference_images = write_refs(dir.path(), 1);
        config
            .reference_images
            .push(ReferenceImage::new(dir.path().join("gone.png"), "image/png"));

        let err = assemble_parts(&config).await.unwrap_err();
        assert!(matches!(err, Error::Encoding { .. }));
    }

    #[test]
    fn test_output_config_copies_parameters() {
        let config = DesignConfig::new("x")
            .with_aspect_ratio(AspectRatio::Tall)
            .with_resolution(Resolution::OneK);
        let output = output_config(&config);
        assert_eq!(output.aspect_ratio, AspectRatio::Tall);
        assert_eq!(output.image_size, Resolution::OneK);
    }
}
