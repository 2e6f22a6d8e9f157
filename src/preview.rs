//! Scoped preview handles for reference images.
//!
//! A handle is a revocable `preview:<uuid>` reference to an image path. It is
//! live from acquisition until it is dropped, so replacing or clearing a
//! [`PreviewSet`] releases every handle it held.

use crate::models::ReferenceImage;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

const URI_SCHEME: &str = "preview:";

/// Table of live preview handles.
#[derive(Clone, Default)]
pub struct PreviewRegistry {
    live: Arc<Mutex<HashMap<Uuid, PathBuf>>>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<Uuid, PathBuf>> {
        self.live.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn acquire(&self, image: &ReferenceImage) -> PreviewHandle {
        let id = Uuid::new_v4();
        self.entries().insert(id, image.path.clone());
        PreviewHandle {
            id,
            registry: self.clone(),
        }
    }

    /// Path behind a live handle URI; `None` once the handle is released.
    pub fn resolve(&self, uri: &str) -> Option<PathBuf> {
        let id = Uuid::parse_str(uri.strip_prefix(URI_SCHEME)?).ok()?;
        self.entries().get(&id).cloned()
    }

    pub fn live_count(&self) -> usize {
        self.entries().len()
    }

    fn release(&self, id: Uuid) {
        self.entries().remove(&id);
    }
}

pub struct PreviewHandle {
    id: Uuid,
    registry: PreviewRegistry,
}

impl PreviewHandle {
    pub fn uri(&self) -> String {
        format!("{}{}", URI_SCHEME, self.id)
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.registry.release(self.id);
    }
}

/// The handles backing one ordered list of reference images.
pub struct PreviewSet {
    registry: PreviewRegistry,
    handles: Vec<PreviewHandle>,
}

impl PreviewSet {
    pub fn new(registry: PreviewRegistry) -> Self {
        Self {
            registry,
            handles: Vec::new(),
        }
    }

    /// Release every current handle, then acquire one per image.
    pub fn sync(&mut self, images: &[ReferenceImage]) {
        self.handles.clear();
        self.handles = images
            .iter()
            .map(|image| self.registry.acquire(image))
            .collect();
    }

    pub fn clear(&mut self) {
        self.handles.clear();
    }

    pub fn uris(&self) -> Vec<String> {
        self.handles.iter().map(PreviewHandle::uri).collect()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
