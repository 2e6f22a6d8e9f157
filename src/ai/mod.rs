//! AI service integration for design image generation
//!
//! Provides the model-client seam used by the generation pipeline, the Gemini
//! implementation behind it, credential resolution, and in-memory mocks.

pub mod credentials;
pub mod gemini;
pub mod mime;
pub mod mock;

pub use credentials::{CredentialResolver, CredentialStore, KeyFileStore};
pub use gemini::types::{
    Candidate, Content, GenerateContentResponse, ImageOutputConfig, InlineData, Part,
};
pub use gemini::GeminiImageClient;
pub use mock::{MockCredentialStore, MockImageModel};

use crate::Result;
use async_trait::async_trait;

/// A hosted model that turns ordered content parts into a raw response.
#[async_trait]
pub trait ImageModel: Send + Sync {
    async fn generate(
        &self,
        parts: &[Part],
        output: &ImageOutputConfig,
    ) -> Result<GenerateContentResponse>;
}
