//! Generation controller: the lifecycle state machine around the pipeline.
//!
//! The controller is the only place that awaits [`generate_design`] and the
//! only place that changes [`AppState`]. Transitions:
//!
//! - `Idle | Error --submit--> Generating` (non-blank prompt only)
//! - `Generating --> Complete | Error`
//! - `Complete --reset--> Idle`
//! - `Complete --regenerate--> Generating` (same config as last time)

use crate::ai::{CredentialResolver, ImageModel};
use crate::models::{AppState, DesignConfig, GeneratedImage};
use crate::pipeline::generate_design;
use crate::{Error, Result};
use std::sync::Arc;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

pub const REAUTHENTICATE_MESSAGE: &str =
    "API Key verification failed. Please select your key again.";
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong while generating the design.";

/// What the presentation layer should show. Exactly one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View<'a> {
    IdleForm,
    Loading,
    Result(&'a GeneratedImage),
    /// The form is shown again with this message under it.
    ErrorBanner(&'a str),
}

pub struct GenerationController {
    model: Arc<dyn ImageModel>,
    credentials: CredentialResolver,
    state: AppState,
    result: Option<GeneratedImage>,
    error: Option<String>,
    last_config: Option<DesignConfig>,
    has_credential: bool,
}

impl GenerationController {
    pub fn new(model: Arc<dyn ImageModel>, credentials: CredentialResolver) -> Self {
        Self {
            model,
            credentials,
            state: AppState::Idle,
            result: None,
            error: None,
            last_config: None,
            has_credential: false,
        }
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    pub fn result(&self) -> Option<&GeneratedImage> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn last_config(&self) -> Option<&DesignConfig> {
        self.last_config.as_ref()
    }

    /// Cached answer to "is a credential available?"; false until checked.
    pub fn has_credential(&self) -> bool {
        self.has_credential
    }

    pub fn view(&self) -> View<'_> {
        match (self.state, &self.result, &self.error) {
            (AppState::Generating, _, _) => View::Loading,
            (AppState::Complete, Some(image), _) => View::Result(image),
            (AppState::Error, _, Some(message)) => View::ErrorBanner(message),
            _ => View::IdleForm,
        }
    }

    /// Whether the submit affordance should be enabled for `config`.
    pub fn can_submit(&self, config: &DesignConfig) -> bool {
        matches!(self.state, AppState::Idle | AppState::Error) && config.has_prompt()
    }

    /// Refresh the cached credential flag. Lookup failures count as "no credential".
    pub async fn check_credential_status(&mut self) -> bool {
        self.has_credential = match self.credentials.has_credential().await {
            Ok(available) => available,
            Err(e) => {
                error!("Failed to check API key status: {}", e);
                false
            }
        };
        self.has_credential
    }

    /// Ask the key-management collaborator for a credential.
    pub async fn select_credential(&mut self) -> bool {
        self.has_credential = match self.credentials.select().await {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to select API key: {}", e);
                false
            }
        };
        self.has_credential
    }

    /// Submit a fresh config from the form.
    pub async fn submit(&mut self, config: DesignConfig) -> Result<AppState> {
        match self.state {
            AppState::Generating => {
                return Err(Error::InvalidRequest(
                    "a generation is already in flight".to_string(),
                ))
            }
            AppState::Complete => {
                return Err(Error::InvalidTransition(
                    "reset or regenerate the completed design before submitting".to_string(),
                ))
            }
            AppState::Idle | AppState::Error => {}
        }

        if !config.has_prompt() {
            warn!("Ignoring submission with an empty prompt");
            return Err(Error::InvalidRequest("prompt must not be empty".to_string()));
        }

        Ok(self.run(config).await)
    }

    /// Run the last submitted config again.
    pub async fn regenerate(&mut self) -> Result<AppState> {
        if self.state != AppState::Complete {
            return Err(Error::InvalidTransition(format!(
                "regenerate requires a completed design (state is {:?})",
                self.state
            )));
        }

        let config = self.last_config.clone().ok_or_else(|| {
            Error::InvalidTransition("no previous design to regenerate".to_string())
        })?;
        Ok(self.run(config).await)
    }

    /// Discard a completed result and return to the form.
    pub fn reset(&mut self) -> Result<()> {
        if self.state != AppState::Complete {
            return Err(Error::InvalidTransition(format!(
                "reset requires a completed design (state is {:?})",
                self.state
            )));
        }

        self.state = AppState::Idle;
        self.result = None;
        self.error = None;
        Ok(())
    }

    async fn run(&mut self, config: DesignConfig) -> AppState {
        self.state = AppState::Generating;
        self.error = None;
        self.result = None;
        self.last_config = Some(config.clone());

        let model = Arc::clone(&self.model);
        let span = info_span!("generation", id = %Uuid::new_v4());
        let outcome = async {
            info!(
                "Generating design with {} reference image(s)",
                config.reference_images.len()
            );
            generate_design(model.as_ref(), &config).await
        }
        .instrument(span)
        .await;

        match outcome {
            Ok(image) => {
                info!("Generation complete");
                self.result = Some(image);
                self.state = AppState::Complete;
            }
            Err(e) => {
                error!("Generation failed: {}", e);
                let message = self.failure_message(&e);
                self.error = Some(message);
                self.state = AppState::Error;
            }
        }

        self.state
    }

    /// Map a pipeline error to the message shown to the user.
    fn failure_message(&mut self, err: &Error) -> String {
        if err.is_credential_rejection() {
            self.has_credential = false;
            return REAUTHENTICATE_MESSAGE.to_string();
        }

        match err {
            Error::MissingCredential => {
                self.has_credential = false;
                err.to_string()
            }
            Error::Encoding { .. } => GENERIC_FAILURE_MESSAGE.to_string(),
            _ => {
                let message = err.to_string();
                if message.trim().is_empty() {
                    GENERIC_FAILURE_MESSAGE.to_string()
                } else {
                    message
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{MockCredentialStore, MockImageModel};
    use crate::models::ReferenceImage;
    use tempfile::tempdir;

    fn controller_with(model: MockImageModel, store: MockCredentialStore) -> GenerationController {
        GenerationController::new(Arc::new(model), CredentialResolver::new(None, Arc::new(store)))
    }

    fn keyed_store() -> MockCredentialStore {
        MockCredentialStore::new().with_selected_key("key")
    }

    #[tokio::test]
    async fn test_blank_prompt_never_leaves_idle() {
        let model = MockImageModel::new();
        let mut controller = controller_with(model.clone(), keyed_store());

        for prompt in ["", "   ", "\n\t "] {
            let err = controller
                .submit(DesignConfig::new(prompt))
                .await
                .unwrap_err();
            assert!(matches!(err, Error::InvalidRequest(_)));
            assert_eq!(controller.state(), AppState::Idle);
            assert_eq!(controller.view(), View::IdleForm);
        }
        assert_eq!(model.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_successful_submission_completes() {
        let model = MockImageModel::new().with_image_response("image/png", b"png-bytes");
        let mut controller = controller_with(model, keyed_store());

        let state = controller.submit(DesignConfig::new("loft")).await.unwrap();

        assert_eq!(state, AppState::Complete);
        let image = controller.result().unwrap();
        assert_eq!(image.decode().unwrap(), b"png-bytes");
        assert_eq!(controller.view(), View::Result(image));
        assert!(controller.error().is_none());
    }

    #[tokio::test]
    async fn test_no_image_produced_is_error_state() {
        let model = MockImageModel::new().with_text_response("just words");
        let mut controller = controller_with(model, keyed_store());

        let state = controller.submit(DesignConfig::new("loft")).await.unwrap();

        assert_eq!(state, AppState::Error);
        assert!(controller.result().is_none());
        assert_eq!(
            controller.view(),
            View::ErrorBanner(
                "No image was generated. The model might have returned text instead."
            )
        );
    }

    #[tokio::test]
    async fn test_credential_rejection_clears_flag_and_remaps_message() {
        let model = MockImageModel::new().with_remote_error(
            "Gemini API error (status 404): Requested entity was not found.",
        );
        let mut controller = controller_with(model, keyed_store());
        assert!(controller.check_credential_status().await);

        controller.submit(DesignConfig::new("loft")).await.unwrap();

        assert_eq!(controller.state(), AppState::Error);
        assert!(!controller.has_credential());
        assert_eq!(controller.error(), Some(REAUTHENTICATE_MESSAGE));
    }

    #[tokio::test]
    async fn test_other_remote_errors_pass_through() {
        let model = MockImageModel::new().with_remote_error("Gemini API error (status 500): boom");
        let mut controller = controller_with(model, keyed_store());
        controller.check_credential_status().await;

        controller.submit(DesignConfig::new("loft")).await.unwrap();

        assert!(controller.has_credential());
        assert_eq!(
            controller.error(),
            Some("Gemini API error (status 500): boom")
        );
    }

    #[tokio::test]
    async fn test_blank_remote_message_falls_back_to_generic() {
        let model = MockImageModel::new().with_remote_error("  ");
        let mut controller = controller_with(model, keyed_store());

        controller.submit(DesignConfig::new("loft")).await.unwrap();
        assert_eq!(controller.error(), Some(GENERIC_FAILURE_MESSAGE));
    }

    #[tokio::test]
    async fn test_encoding_error_uses_generic_message() {
        let dir = tempdir().unwrap();
        let mut controller = controller_with(MockImageModel::new(), keyed_store());
        let config = DesignConfig::new("loft")
            .with_reference_image(ReferenceImage::new(dir.path().join("gone.jpg"), "image/jpeg"));

        controller.submit(config).await.unwrap();

        assert_eq!(controller.state(), AppState::Error);
        assert_eq!(controller.error(), Some(GENERIC_FAILURE_MESSAGE));
    }

    #[tokio::test]
    async fn test_error_state_accepts_new_submission() {
        let model = MockImageModel::new()
            .with_remote_error("temporary outage")
            .with_image_response("image/png", b"ok");
        let mut controller = controller_with(model, keyed_store());

        assert_eq!(
            controller.submit(DesignConfig::new("a")).await.unwrap(),
            AppState::Error
        );
        assert!(controller.can_submit(&DesignConfig::new("b")));
        assert_eq!(
            controller.submit(DesignConfig::new("b")).await.unwrap(),
            AppState::Complete
        );
        assert!(controller.error().is_none());
    }

    #[tokio::test]
    async fn test_complete_rejects_submit_but_allows_reset() {
        let mut controller = controller_with(MockImageModel::new(), keyed_store());
        controller.submit(DesignConfig::new("a")).await.unwrap();

        assert!(!controller.can_submit(&DesignConfig::new("b")));
        assert!(matches!(
            controller.submit(DesignConfig::new("b")).await,
            Err(Error::InvalidTransition(_))
        ));

        controller.reset().unwrap();
        assert_eq!(controller.state(), AppState::Idle);
        assert!(controller.result().is_none());
        assert!(matches!(controller.reset(), Err(Error::InvalidTransition(_))));
    }

    #[tokio::test]
    async fn test_regenerate_requires_complete() {
        let mut controller = controller_with(MockImageModel::new(), keyed_store());
        assert!(matches!(
            controller.regenerate().await,
            Err(Error::InvalidTransition(_))
        ));
    }

    #[tokio::test]
    async fn test_regenerate_reuses_last_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ref.png");
        std::fs::write(&path, b"ref").unwrap();

        let model = MockImageModel::new();
        let mut controller = controller_with(model.clone(), keyed_store());
        let config = DesignConfig::new("corner office")
            .with_reference_image(ReferenceImage::new(&path, "image/png"))
            .with_aspect_ratio(crate::models::AspectRatio::Portrait)
            .with_resolution(crate::models::Resolution::OneK);

        controller.submit(config.clone()).await.unwrap();
        let state = controller.regenerate().await.unwrap();

        assert_eq!(state, AppState::Complete);
        assert_eq!(controller.last_config(), Some(&config));

        let requests = model.recorded_requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0], requests[1]);
    }

    #[tokio::test]
    async fn test_missing_credential_clears_flag() {
        let model = MockImageModel::new().with_missing_credential();
        let mut controller = controller_with(model, keyed_store());
        assert!(controller.check_credential_status().await);

        controller.submit(DesignConfig::new("loft")).await.unwrap();

        assert_eq!(controller.state(), AppState::Error);
        assert!(!controller.has_credential());
        assert_eq!(
            controller.error(),
            Some("API Key not selected. Please select an API key to proceed.")
        );
    }

    #[tokio::test]
    async fn test_status_check_failure_downgrades_to_no_credential() {
        let mut controller =
            controller_with(MockImageModel::new(), keyed_store().failing_status());
        assert!(!controller.check_credential_status().await);
        assert!(!controller.has_credential());
    }

    #[tokio::test]
    async fn test_select_credential_updates_flag() {
        let store = MockCredentialStore::new();
        let mut controller = controller_with(MockImageModel::new(), store.clone());

        assert!(!controller.check_credential_status().await);
        assert!(controller.select_credential().await);
        assert!(controller.has_credential());
        assert_eq!(store.get_select_count(), 1);

        let mut failing = controller_with(
            MockImageModel::new(),
            MockCredentialStore::new().failing_select(),
        );
        assert!(!failing.select_credential().await);
    }
}
