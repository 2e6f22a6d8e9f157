//! Editable design form state.
//!
//! Holds the prompt, the ordered reference list and the output parameters
//! between submissions, keeping one preview handle per reference image.

use crate::models::{AspectRatio, DesignConfig, ReferenceImage, Resolution};
use crate::preview::{PreviewRegistry, PreviewSet};
use crate::prompts;
use rand::Rng;

pub struct DesignForm {
    pub prompt: String,
    pub aspect_ratio: AspectRatio,
    pub resolution: Resolution,
    reference_images: Vec<ReferenceImage>,
    previews: PreviewSet,
}

impl DesignForm {
    pub fn new(previews: PreviewRegistry) -> Self {
        Self {
            prompt: String::new(),
            aspect_ratio: AspectRatio::default(),
            resolution: Resolution::default(),
            reference_images: Vec::new(),
            previews: PreviewSet::new(previews),
        }
    }

    /// Replace the prompt with one of the built-in samples.
    pub fn randomize_prompt<R: Rng + ?Sized>(&mut self, rng: &mut R) -> &str {
        self.prompt = prompts::random_sample_prompt(rng).to_string();
        &self.prompt
    }

    pub fn reference_images(&self) -> &[ReferenceImage] {
        &self.reference_images
    }

    /// Append images after the ones already selected.
    pub fn add_reference_images(&mut self, images: impl IntoIterator<Item = ReferenceImage>) {
        let before = self.reference_images.len();
        self.reference_images.extend(images);
        tracing::debug!(
            "Reference images: {} -> {}",
            before,
            self.reference_images.len()
        );
        self.previews.sync(&self.reference_images);
    }

    pub fn remove_reference_image(&mut self, index: usize) -> Option<ReferenceImage> {
        if index >= self.reference_images.len() {
            return None;
        }
        let removed = self.reference_images.remove(index);
        self.previews.sync(&self.reference_images);
        Some(removed)
    }

    pub fn clear_reference_images(&mut self) {
        self.reference_images.clear();
        self.previews.clear();
    }

    pub fn preview_uris(&self) -> Vec<String> {
        self.previews.uris()
    }

    /// Snapshot the form into an immutable submission.
    pub fn to_config(&self) -> DesignConfig {
        DesignConfig {
            prompt: self.prompt.clone(),
            reference_images: self.reference_images.clone(),
            aspect_ratio: self.aspect_ratio,
            resolution: self.resolution,
        }
    }
}
