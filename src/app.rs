//! Application orchestration for generating and exporting designs.

use crate::ai::{CredentialResolver, GeminiImageClient, ImageModel, KeyFileStore};
use crate::controller::{GenerationController, GENERIC_FAILURE_MESSAGE};
use crate::download::export_image;
use crate::form::DesignForm;
use crate::gate::LocalGate;
use crate::models::{AppState, AspectRatio, Config, ReferenceImage, Resolution};
use crate::preview::PreviewRegistry;
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Drives the gate, credential checks, the controller and exports for a session.
pub struct App {
    controller: GenerationController,
    gate: LocalGate,
    previews: PreviewRegistry,
    output_dir: PathBuf,
}

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    pub model: Arc<dyn ImageModel>,
    pub credentials: CredentialResolver,
}

/// One `generate` invocation: a design plus how many variations to export.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub prompt: String,
    pub reference_paths: Vec<PathBuf>,
    pub aspect_ratio: AspectRatio,
    pub resolution: Resolution,
    pub variations: u32,
    pub password: Option<String>,
    pub output_dir: Option<PathBuf>,
}

impl GenerateRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            reference_paths: Vec::new(),
            aspect_ratio: AspectRatio::default(),
            resolution: Resolution::default(),
            variations: 1,
            password: None,
            output_dir: None,
        }
    }
}

impl App {
    /// Build an app from concrete service dependencies.
    ///
    /// This is primarily useful for integration tests and local harnesses that
    /// need to inject mocks.
    pub fn with_services(services: AppServices, gate: LocalGate, output_dir: PathBuf) -> Self {
        Self {
            controller: GenerationController::new(services.model, services.credentials),
            gate,
            previews: PreviewRegistry::new(),
            output_dir,
        }
    }

    /// Construct an app from environment configuration (`Config::from_env`).
    pub async fn new() -> Result<Self> {
        let config = Config::from_env()?;

        let store = KeyFileStore::new(config.key_file.clone());
        let credentials = CredentialResolver::new(config.api_key.clone(), Arc::new(store));
        if credentials.has_process_credential() {
            info!("Using API key from the environment");
        } else {
            info!("Using API key file: {}", config.key_file.display());
        }

        let model = GeminiImageClient::new_with_client(
            config.image_model.clone(),
            credentials.clone(),
            reqwest::Client::new(),
            config.request_timeout,
        );
        info!("Image model: {}", model.model());

        Ok(Self::with_services(
            AppServices {
                model: Arc::new(model),
                credentials,
            },
            LocalGate::new(config.site_password),
            config.output_dir,
        ))
    }

    pub fn controller(&self) -> &GenerationController {
        &self.controller
    }

    pub fn previews(&self) -> &PreviewRegistry {
        &self.previews
    }

    pub fn unlock(&mut self, password: Option<&str>) -> Result<()> {
        self.gate.require(password)
    }

    /// Run interactive key selection behind the gate.
    pub async fn select_key(&mut self, password: Option<&str>) -> Result<()> {
        self.gate.require(password)?;
        if self.controller.select_credential().await {
            info!("API key selected");
            Ok(())
        } else {
            Err(Error::MissingCredential)
        }
    }

    /// Generate `request.variations` images and export each one.
    pub async fn generate(&mut self, request: GenerateRequest) -> Result<Vec<PathBuf>> {
        self.gate.require(request.password.as_deref())?;

        if request.variations == 0 {
            return Err(Error::InvalidRequest(
                "variations must be at least 1".to_string(),
            ));
        }

        if !self.controller.check_credential_status().await {
            warn!("No API key available, starting key selection");
            if !self.controller.select_credential().await {
                return Err(Error::MissingCredential);
            }
        }

        let mut form = DesignForm::new(self.previews.clone());
        form.prompt = request.prompt;
        form.aspect_ratio = request.aspect_ratio;
        form.resolution = request.resolution;
        form.add_reference_images(
            request
                .reference_paths
                .iter()
                .map(|path| ReferenceImage::from_path(path)),
        );
        debug!("Reference previews: {:?}", form.preview_uris());

        let output_dir = request
            .output_dir
            .unwrap_or_else(|| self.output_dir.clone());

        self.controller.submit(form.to_config()).await?;
        let exported = self.export_variations(request.variations, &output_dir).await;

        if self.controller.state() == AppState::Complete {
            self.controller.reset()?;
        }
        exported
    }

    /// Export every variation. Once an image is on disk, a later failure is
    /// reported as [`Error::PartialExport`] carrying the saved paths.
    async fn export_variations(&mut self, variations: u32, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::with_capacity(variations as usize);

        for variation in 0..variations {
            match self.export_variation(variation, variations, dir).await {
                Ok(path) => paths.push(path),
                Err(e) if paths.is_empty() => return Err(e),
                Err(e) => {
                    warn!(
                        "Variation {}/{} failed after {} image(s) were saved",
                        variation + 1,
                        variations,
                        paths.len()
                    );
                    return Err(Error::PartialExport {
                        saved: paths,
                        source: Box::new(e),
                    });
                }
            }
        }

        Ok(paths)
    }

    async fn export_variation(
        &mut self,
        variation: u32,
        variations: u32,
        dir: &Path,
    ) -> Result<PathBuf> {
        if variation > 0 {
            info!("Regenerating variation {}/{}", variation + 1, variations);
            self.controller.regenerate().await?;
        }

        let image = match self.controller.result() {
            Some(image) if self.controller.state() == AppState::Complete => image,
            _ => {
                let message = self
                    .controller
                    .error()
                    .unwrap_or(GENERIC_FAILURE_MESSAGE)
                    .to_string();
                return Err(Error::GenerationFailed(message));
            }
        };

        export_image(image, dir).await
    }
}
