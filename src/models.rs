//! Data models and structures
//!
//! Defines the design request, its output parameters, the generation
//! lifecycle states and the environment configuration.

use crate::ai::mime;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_IMAGE_MODEL: &str = "gemini-3-pro-image-preview";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "16:9")]
    Widescreen,
    #[serde(rename = "4:3")]
    Standard,
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "3:4")]
    Portrait,
    #[serde(rename = "9:16")]
    Tall,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 5] = [
        AspectRatio::Widescreen,
        AspectRatio::Standard,
        AspectRatio::Square,
        AspectRatio::Portrait,
        AspectRatio::Tall,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Widescreen => "16:9",
            AspectRatio::Standard => "4:3",
            AspectRatio::Square => "1:1",
            AspectRatio::Portrait => "3:4",
            AspectRatio::Tall => "9:16",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|ratio| ratio.as_str() == s.trim())
            .ok_or_else(|| {
                Error::InvalidRequest(format!(
                    "Unsupported aspect ratio '{}'. Expected one of: 16:9, 4:3, 1:1, 3:4, 9:16",
                    s
                ))
            })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Resolution {
    #[serde(rename = "1K")]
    OneK,
    #[default]
    #[serde(rename = "2K")]
    TwoK,
}

impl Resolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::OneK => "1K",
            Resolution::TwoK => "2K",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resolution {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "1K" => Ok(Resolution::OneK),
            "2K" => Ok(Resolution::TwoK),
            _ => Err(Error::InvalidRequest(format!(
                "Unsupported resolution '{}'. Expected 1K or 2K",
                s
            ))),
        }
    }
}

/// A reference image on disk, consumed only by the binary encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceImage {
    pub path: PathBuf,
    pub name: String,
    /// Declared media type; empty means "detect from content".
    pub mime_type: String,
}

impl ReferenceImage {
    pub fn new(path: impl Into<PathBuf>, mime_type: impl Into<String>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Self {
            path,
            name,
            mime_type: mime_type.into(),
        }
    }

    /// Build a reference from a path, declaring the media type implied by its extension.
    pub fn from_path(path: &Path) -> Self {
        let mime_type = mime::mime_from_extension(path).unwrap_or_default();
        Self::new(path, mime_type)
    }
}

/// Everything one submission needs. Built fresh from the form per submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesignConfig {
    pub prompt: String,
    pub reference_images: Vec<ReferenceImage>,
    pub aspect_ratio: AspectRatio,
    pub resolution: Resolution,
}

impl DesignConfig {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            reference_images: Vec::new(),
            aspect_ratio: AspectRatio::default(),
            resolution: Resolution::default(),
        }
    }

    pub fn with_reference_image(mut self, image: ReferenceImage) -> Self {
        self.reference_images.push(image);
        self
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: AspectRatio) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn has_prompt(&self) -> bool {
        !self.prompt.trim().is_empty()
    }
}

/// A generated image, held as a displayable data URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    data_uri: String,
    source_mime_type: String,
}

impl GeneratedImage {
    pub const MIME_TYPE: &'static str = "image/png";
    const DATA_URI_PREFIX: &'static str = "data:image/png;base64,";

    /// Wrap a base64 payload. The label is always PNG, whatever the model reported.
    pub fn from_base64(data: &str, source_mime_type: impl Into<String>) -> Self {
        Self {
            data_uri: format!("{}{}", Self::DATA_URI_PREFIX, data),
            source_mime_type: source_mime_type.into(),
        }
    }

    pub fn data_uri(&self) -> &str {
        &self.data_uri
    }

    /// The base64 payload without the data URI prefix.
    pub fn payload(&self) -> &str {
        &self.data_uri[Self::DATA_URI_PREFIX.len()..]
    }

    /// Media type the model reported for the payload.
    pub fn source_mime_type(&self) -> &str {
        &self.source_mime_type
    }

    pub fn decode(&self) -> Result<Vec<u8>> {
        crate::encoder::decode_payload(self.payload())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppState {
    #[default]
    Idle,
    Generating,
    Complete,
    Error,
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub image_model: String,
    pub site_password: Option<String>,
    pub key_file: PathBuf,
    pub output_dir: PathBuf,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let request_timeout = match non_empty_var("REQUEST_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(raw.parse().map_err(|_| {
                Error::Config(format!("REQUEST_TIMEOUT_SECS must be an integer, got '{}'", raw))
            })?),
            None => Duration::from_secs(120),
        };

        Ok(Self {
            api_key: non_empty_var("GEMINI_API_KEY").or_else(|| non_empty_var("API_KEY")),
            image_model: non_empty_var("IMAGE_MODEL")
                .unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string()),
            site_password: non_empty_var("SITE_PASSWORD"),
            key_file: non_empty_var("KEY_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".design-studio").join("api_key")),
            output_dir: non_empty_var("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("output")),
            request_timeout,
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
