//! Collaborator traits the interaction core drives.
//!
//! The scene graph owns nodes, the raycaster finds what a screen ray hits,
//! and the loader resolves model assets in the background.

use crossbeam_channel::Receiver;
use glam::Vec3;

use crate::camera::CameraView;
use crate::catalog::ModelSpec;
use crate::error::Result;
use crate::geometry::{Aabb, Ray, Transform};
use crate::handle::{ModelId, ObjectHandle};

/// Procedural shapes for markers and overlays
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    /// Flat ring lying in the local XZ plane
    Ring { inner_radius: f32, outer_radius: f32 },
    /// Line segment between two local points
    Segment { from: Vec3, to: Vec3 },
}

impl Shape {
    /// Local-space bounds of the shape
    pub fn bounds(&self) -> Aabb {
        match *self {
            Shape::Ring { outer_radius, .. } => Aabb::new(
                Vec3::new(-outer_radius, 0.0, -outer_radius),
                Vec3::new(outer_radius, 0.0, outer_radius),
            ),
            Shape::Segment { from, to } => Aabb::new(from.min(to), from.max(to)),
        }
    }
}

/// A single ray intersection
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// The node whose geometry was hit (may be a sub-part of a candidate)
    pub object: ObjectHandle,
    /// Distance along the ray
    pub distance: f32,
}

/// Scene graph operations.
pub trait SceneGraph {
    /// Instantiate a resolved model at `transform`.
    fn spawn(&mut self, model: ModelId, transform: Transform) -> Result<ObjectHandle>;

    /// Create a procedural shape node.
    fn spawn_shape(&mut self, shape: Shape, transform: Transform) -> ObjectHandle;

    /// Remove a node and everything below it. Returns whether it existed.
    fn remove(&mut self, handle: ObjectHandle) -> bool;

    /// Parent `child` under `parent`, keeping the child's local transform.
    fn attach_child(&mut self, parent: ObjectHandle, child: ObjectHandle) -> Result<()>;

    /// Detach `child` from `parent`, leaving it at the scene root.
    fn detach_child(&mut self, parent: ObjectHandle, child: ObjectHandle) -> Result<()>;

    /// Whether the handle refers to a live node
    fn contains(&self, handle: ObjectHandle) -> bool;

    /// Local transform of a node
    fn transform(&self, handle: ObjectHandle) -> Option<Transform>;

    /// Replace the local transform of a node
    fn set_transform(&mut self, handle: ObjectHandle, transform: Transform) -> Result<()>;

    /// Show or hide a node and its children
    fn set_visible(&mut self, handle: ObjectHandle, visible: bool) -> Result<()>;

    /// Whether a node is visible
    fn is_visible(&self, handle: ObjectHandle) -> bool;

    /// World-space bounds of the model geometry under a node
    fn world_bounds(&self, handle: ObjectHandle) -> Option<Aabb>;

    /// Bounds of the model geometry under a node in its own space, before
    /// the node's transform (and therefore its scale) is applied
    fn local_bounds(&self, handle: ObjectHandle) -> Option<Aabb>;

    /// The node and every node below it
    fn descendants(&self, handle: ObjectHandle) -> Vec<ObjectHandle>;

    /// Draw the current frame
    fn render(&mut self, camera: &CameraView);
}

/// Ray intersection against scene nodes.
pub trait Raycast {
    /// Intersect `ray` with `candidates` (and, when `recursive`, everything
    /// below them). Hits are ordered nearest first.
    fn intersect(&self, ray: &Ray, candidates: &[ObjectHandle], recursive: bool) -> Vec<RayHit>;
}

/// Background model resolution.
pub trait ModelLoader {
    /// Start resolving a model; the result arrives on the returned channel.
    fn load(&mut self, spec: &ModelSpec) -> Receiver<Result<ModelId>>;
}
