//! Credential resolution for the remote model.
//!
//! A process-level key (from the environment) always wins. Otherwise the key
//! comes from a [`CredentialStore`], the key-management collaborator that
//! remembers a previously selected key.

use crate::{Error, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn has_selected_credential(&self) -> Result<bool>;
    async fn select_credential(&self) -> Result<()>;
    async fn selected_credential(&self) -> Result<Option<String>>;
}

/// Combines the process-level key with a credential store.
#[derive(Clone)]
pub struct CredentialResolver {
    process_key: Option<String>,
    store: Arc<dyn CredentialStore>,
}

impl CredentialResolver {
    pub fn new(process_key: Option<String>, store: Arc<dyn CredentialStore>) -> Self {
        let process_key = process_key.filter(|key| !key.trim().is_empty());
        Self { process_key, store }
    }

    pub fn has_process_credential(&self) -> bool {
        self.process_key.is_some()
    }

    pub async fn has_credential(&self) -> Result<bool> {
        if self.has_process_credential() {
            return Ok(true);
        }
        self.store.has_selected_credential().await
    }

    pub async fn select(&self) -> Result<()> {
        self.store.select_credential().await
    }

    /// Resolve the key for a call, failing fast when none is available.
    pub async fn resolve(&self) -> Result<String> {
        if let Some(key) = &self.process_key {
            return Ok(key.clone());
        }

        if !self.store.has_selected_credential().await? {
            return Err(Error::MissingCredential);
        }

        self.store
            .selected_credential()
            .await?
            .ok_or(Error::MissingCredential)
    }
}

/// Keeps the selected API key in a local file.
pub struct KeyFileStore {
    path: PathBuf,
}

impl KeyFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_key(&self) -> Result<Option<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => {
                let key = contents.trim();
                Ok((!key.is_empty()).then(|| key.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Persist a key as the selected credential.
    pub async fn store_credential(&self, key: &str) -> Result<()> {
        let key = key.trim();
        if key.is_empty() {
            return Err(Error::InvalidRequest("API key must not be empty".to_string()));
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);
        let mut file = options.open(&self.path).await?;

        // Creation mode does not apply to a file that already exists.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))
                .await?;
        }

        file.write_all(format!("{}\n", key).as_bytes()).await?;
        file.flush().await?;

        tracing::info!("Stored API key at {}", self.path.display());
        Ok(())
    }

    /// Read one line from `reader` and store it as the selected key.
    pub async fn select_credential_from<R>(&self, reader: R) -> Result<()>
    where
        R: AsyncBufRead + Unpin + Send,
    {
        let mut line = String::new();
        let mut reader = reader;
        reader.read_line(&mut line).await?;
        self.store_credential(&line).await
    }
}

#[async_trait]
impl CredentialStore for KeyFileStore {
    async fn has_selected_credential(&self) -> Result<bool> {
        Ok(self.read_key().await?.is_some())
    }

    async fn select_credential(&self) -> Result<()> {
        eprintln!("Paste your Gemini API key and press Enter:");
        self.select_credential_from(BufReader::new(tokio::io::stdin()))
            .await
    }

    async fn selected_credential(&self) -> Result<Option<String>> {
        self.read_key().await
    }
}
