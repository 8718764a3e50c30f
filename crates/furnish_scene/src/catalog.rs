//! Model catalog - the ordered list of placeable furniture
//!
//! Each entry resolves in the background through a [`ModelLoader`]. The
//! catalog is polled once per frame; placement with an entry that is still
//! loading (or failed) simply declines.

use crossbeam_channel::{Receiver, TryRecvError};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::graph::ModelLoader;
use crate::handle::ModelId;

/// A placeable model type
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Display name
    pub name: String,
    /// Asset location
    pub source: String,
    /// Fixed per-type scale applied to every placed instance
    #[serde(default = "unit_scale")]
    pub scale: [f32; 3],
}

fn unit_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

impl ModelSpec {
    pub fn new(name: impl Into<String>, source: impl Into<String>, scale: f32) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            scale: [scale; 3],
        }
    }

    /// Scale factor as a vector
    pub fn scale_vec(&self) -> Vec3 {
        Vec3::from_array(self.scale)
    }
}

/// Resolution state of a catalog entry
#[derive(Debug)]
pub enum ModelState {
    /// Not requested yet
    NotLoaded,
    /// Waiting on the loader
    Loading(Receiver<Result<ModelId>>),
    /// Ready to instantiate
    Ready(ModelId),
    /// Loader reported a failure
    Failed(String),
}

impl ModelState {
    pub fn is_ready(&self) -> bool {
        matches!(self, ModelState::Ready(_))
    }
}

/// A catalog entry: what to load and how far along it is
#[derive(Debug)]
pub struct CatalogEntry {
    pub spec: ModelSpec,
    pub state: ModelState,
}

/// Ordered list of placeable models
#[derive(Debug, Default)]
pub struct ModelCatalog {
    entries: Vec<CatalogEntry>,
}

impl ModelCatalog {
    pub fn new(specs: impl IntoIterator<Item = ModelSpec>) -> Self {
        Self {
            entries: specs
                .into_iter()
                .map(|spec| CatalogEntry {
                    spec,
                    state: ModelState::NotLoaded,
                })
                .collect(),
        }
    }

    /// Ask the loader for every entry that has not been requested yet
    pub fn request_all<L: ModelLoader + ?Sized>(&mut self, loader: &mut L) {
        for entry in &mut self.entries {
            if matches!(entry.state, ModelState::NotLoaded) {
                log::debug!("Requesting model '{}' from {}", entry.spec.name, entry.spec.source);
                entry.state = ModelState::Loading(loader.load(&entry.spec));
            }
        }
    }

    /// Apply any finished loads. Returns the number of entries that changed state.
    pub fn poll(&mut self) -> usize {
        let mut changed = 0;
        for entry in &mut self.entries {
            let next = match &entry.state {
                ModelState::Loading(rx) => match rx.try_recv() {
                    Ok(Ok(id)) => {
                        log::info!("Model '{}' ready as {}", entry.spec.name, id);
                        Some(ModelState::Ready(id))
                    }
                    Ok(Err(e)) => {
                        log::warn!("Model '{}' failed to load: {}", entry.spec.name, e);
                        Some(ModelState::Failed(e.to_string()))
                    }
                    Err(TryRecvError::Empty) => None,
                    Err(TryRecvError::Disconnected) => {
                        log::warn!("Loader dropped request for model '{}'", entry.spec.name);
                        Some(ModelState::Failed("loader dropped the request".to_string()))
                    }
                },
                _ => None,
            };

            if let Some(state) = next {
                entry.state = state;
                changed += 1;
            }
        }
        changed
    }

    /// Resolved model and its scale, if the entry is ready
    pub fn ready(&self, index: usize) -> Option<(ModelId, Vec3)> {
        let entry = self.entries.get(index)?;
        match entry.state {
            ModelState::Ready(id) => Some((id, entry.spec.scale_vec())),
            _ => None,
        }
    }

    pub fn get(&self, index: usize) -> Option<&CatalogEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether every entry has resolved successfully
    pub fn all_ready(&self) -> bool {
        self.entries.iter().all(|e| e.state.is_ready())
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }
}
