//! # furnish_scene - Scene collaborators for the furniture placer
//!
//! Geometry for picking, the camera view, and the traits the interaction
//! core drives: [`SceneGraph`], [`Raycast`] and [`ModelLoader`].
//! [`MemoryScene`] implements all three without a renderer.

pub mod camera;
pub mod catalog;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod handle;
pub mod memory;

pub use camera::CameraView;
pub use catalog::{CatalogEntry, ModelCatalog, ModelSpec, ModelState};
pub use error::{Result, SceneError};
pub use geometry::{ray_aabb, Aabb, Ray, Transform};
pub use graph::{ModelLoader, RayHit, Raycast, SceneGraph, Shape};
pub use handle::{ModelId, ObjectHandle};
pub use memory::{MemoryScene, ModelAsset};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::camera::CameraView;
    pub use crate::catalog::{ModelCatalog, ModelSpec};
    pub use crate::error::{Result, SceneError};
    pub use crate::geometry::{Aabb, Ray, Transform};
    pub use crate::graph::{ModelLoader, RayHit, Raycast, SceneGraph, Shape};
    pub use crate::handle::{ModelId, ObjectHandle};
}
