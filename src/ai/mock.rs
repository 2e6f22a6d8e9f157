use super::{CredentialStore, GenerateContentResponse, ImageModel, ImageOutputConfig, Part};
use crate::{Error, Result};
use async_trait::async_trait;
use base64::Engine as _;
use std::sync::{Arc, Mutex};

/// 1x1 PNG returned when no response has been configured.
pub const TINY_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, // PNG signature
    0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52, // IHDR chunk
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, // 1x1 pixel
    0x08, 0x02, 0x00, 0x00, 0x00, 0x90, 0x77, 0x53, 0xDE, 0x00, 0x00, 0x00, 0x0C, 0x49, 0x44,
    0x41, // IDAT chunk
    0x54, 0x08, 0x99, 0x63, 0xF8, 0xCF, 0xC0, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0xE2, 0x25,
    0x00, 0xBC, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, // IEND chunk
    0x44, 0xAE, 0x42, 0x60, 0x82,
];

#[derive(Debug, Clone)]
enum MockReply {
    Response(GenerateContentResponse),
    RemoteError(String),
    MissingCredential,
}

/// A request the mock model received.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub parts: Vec<Part>,
    pub output: ImageOutputConfig,
}

/// In-memory [`ImageModel`] that cycles through configured replies.
#[derive(Clone, Default)]
pub struct MockImageModel {
    replies: Arc<Mutex<Vec<MockReply>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockImageModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, response: GenerateContentResponse) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push(MockReply::Response(response));
        self
    }

    /// Reply with one candidate carrying `bytes` as inline data.
    pub fn with_image_response(self, mime_type: &str, bytes: &[u8]) -> Self {
        let data = base64::engine::general_purpose::STANDARD.encode(bytes);
        self.with_response(GenerateContentResponse::with_parts(vec![Part::inline_data(
            mime_type, data,
        )]))
    }

    /// Reply with one candidate carrying only text.
    pub fn with_text_response(self, text: &str) -> Self {
        self.with_response(GenerateContentResponse::with_parts(vec![Part::text(text)]))
    }

    pub fn with_remote_error(self, message: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push(MockReply::RemoteError(message.to_string()));
        self
    }

    /// Fail the way a model client does when no key can be resolved.
    pub fn with_missing_credential(self) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push(MockReply::MissingCredential);
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn recorded_requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageModel for MockImageModel {
    async fn generate(
        &self,
        parts: &[Part],
        output: &ImageOutputConfig,
    ) -> Result<GenerateContentResponse> {
        let count = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(RecordedRequest {
                parts: parts.to_vec(),
                output: *output,
            });
            requests.len()
        };

        let replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            let data = base64::engine::general_purpose::STANDARD.encode(TINY_PNG);
            return Ok(GenerateContentResponse::with_parts(vec![
                Part::inline_data("image/png", data),
            ]));
        }

        match &replies[(count - 1) % replies.len()] {
            MockReply::Response(response) => Ok(response.clone()),
            MockReply::RemoteError(message) => Err(Error::RemoteService(message.clone())),
            MockReply::MissingCredential => Err(Error::MissingCredential),
        }
    }
}

/// In-memory [`CredentialStore`].
#[derive(Clone, Default)]
pub struct MockCredentialStore {
    selected: Arc<Mutex<Option<String>>>,
    key_to_select: Option<String>,
    fail_status: bool,
    fail_select: bool,
    select_calls: Arc<Mutex<usize>>,
}

impl MockCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_selected_key(self, key: &str) -> Self {
        *self.selected.lock().unwrap() = Some(key.to_string());
        self
    }

    /// Key that `select_credential` stores when called.
    pub fn selecting_key(mut self, key: &str) -> Self {
        self.key_to_select = Some(key.to_string());
        self
    }

    pub fn failing_status(mut self) -> Self {
        self.fail_status = true;
        self
    }

    pub fn failing_select(mut self) -> Self {
        self.fail_select = true;
        self
    }

    pub fn get_select_count(&self) -> usize {
        *self.select_calls.lock().unwrap()
    }
}

#[async_trait]
impl CredentialStore for MockCredentialStore {
    async fn has_selected_credential(&self) -> Result<bool> {
        if self.fail_status {
            return Err(Error::Config("key status unavailable".to_string()));
        }
        Ok(self.selected.lock().unwrap().is_some())
    }

    async fn select_credential(&self) -> Result<()> {
        *self.select_calls.lock().unwrap() += 1;
        if self.fail_select {
            return Err(Error::InvalidRequest("key selection cancelled".to_string()));
        }
        let key = self
            .key_to_select
            .clone()
            .unwrap_or_else(|| "mock-key".to_string());
        *self.selected.lock().unwrap() = Some(key);
        Ok(())
    }

    async fn selected_credential(&self) -> Result<Option<String>> {
        Ok(self.selected.lock().unwrap().clone())
    }
}
