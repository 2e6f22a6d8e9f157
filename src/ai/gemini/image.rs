use super::client::GeminiHttpClient;
use super::types::{GenerateContentResponse, ImageOutputConfig, Part};
use crate::ai::{CredentialResolver, ImageModel};
use crate::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: ImageGenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: &'a [Part],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageGenerationConfig {
    image_config: ImageOutputConfig,
}

/// Model client for Gemini image generation.
pub struct GeminiImageClient {
    http: GeminiHttpClient,
    credentials: CredentialResolver,
}

impl GeminiImageClient {
    pub fn new(model: String, credentials: CredentialResolver) -> Self {
        Self::new_with_client(
            model,
            credentials,
            reqwest::Client::new(),
            Duration::from_secs(120),
        )
    }

    pub fn new_with_client(
        model: String,
        credentials: CredentialResolver,
        client: reqwest::Client,
        timeout: Duration,
    ) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(model, timeout, client),
            credentials,
        }
    }

    pub fn model(&self) -> &str {
        self.http.model()
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }
}

#[async_trait]
impl ImageModel for GeminiImageClient {
    async fn generate(
        &self,
        parts: &[Part],
        output: &ImageOutputConfig,
    ) -> Result<GenerateContentResponse> {
        let api_key = self.credentials.resolve().await?;

        tracing::debug!(
            model = self.http.model(),
            parts = parts.len(),
            aspect_ratio = %output.aspect_ratio,
            image_size = %output.image_size,
            "Sending image generation request to Gemini"
        );

        let request = ImageRequest {
            contents: vec![RequestContent { parts }],
            generation_config: ImageGenerationConfig {
                image_config: *output,
            },
        };

        self.http.generate_content(&api_key, &request).await
    }
}
