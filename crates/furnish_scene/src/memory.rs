//! In-memory scene graph.
//!
//! Implements every scene collaborator without a renderer: nodes carry
//! transforms and visibility, models are built from registered box parts,
//! and picking intersects those parts in their local space. Used by the
//! headless runtime and by tests.

use std::collections::{HashMap, HashSet};

use crossbeam_channel::{bounded, Receiver, Sender};
use glam::{Mat4, Vec3};

use crate::camera::CameraView;
use crate::catalog::ModelSpec;
use crate::error::{Result, SceneError};
use crate::geometry::{ray_aabb, Aabb, Ray, Transform};
use crate::graph::{ModelLoader, Raycast, RayHit, SceneGraph, Shape};
use crate::handle::{ModelId, ObjectHandle};

/// Geometry template for a model: a set of boxes in model space
#[derive(Clone, Debug, PartialEq)]
pub struct ModelAsset {
    pub parts: Vec<Aabb>,
}

impl ModelAsset {
    pub fn new(parts: Vec<Aabb>) -> Self {
        Self { parts }
    }

    /// Single box standing on the origin plane
    pub fn boxed(size: Vec3) -> Self {
        Self {
            parts: vec![Aabb::from_footprint(size)],
        }
    }
}

#[derive(Clone, Debug)]
enum NodeKind {
    Model(ModelId),
    Part(Aabb),
    Shape(Shape),
}

#[derive(Clone, Debug)]
struct Node {
    parent: Option<ObjectHandle>,
    children: Vec<ObjectHandle>,
    local: Transform,
    visible: bool,
    kind: NodeKind,
}

impl Node {
    fn new(kind: NodeKind, local: Transform) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            local,
            visible: true,
            kind,
        }
    }
}

/// Scene graph, raycaster and model loader backed by plain collections
#[derive(Default)]
pub struct MemoryScene {
    nodes: HashMap<ObjectHandle, Node>,
    next_handle: u64,
    assets: HashMap<String, ModelAsset>,
    models: Vec<ModelAsset>,
    resolved: HashMap<String, ModelId>,
    deferred: bool,
    pending_loads: Vec<(ModelSpec, Sender<Result<ModelId>>)>,
    frames_rendered: u64,
    last_camera: Option<CameraView>,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold load requests until [`MemoryScene::complete_loads`] is called
    pub fn with_deferred_loading(mut self) -> Self {
        self.deferred = true;
        self
    }

    /// Make a model template available to the loader under `name`
    pub fn register_asset(&mut self, name: impl Into<String>, asset: ModelAsset) {
        self.assets.insert(name.into(), asset);
    }

    /// Resolve every held load request. Returns how many were answered.
    pub fn complete_loads(&mut self) -> usize {
        let pending = std::mem::take(&mut self.pending_loads);
        let count = pending.len();
        for (spec, tx) in pending {
            let result = self.resolve(&spec);
            // Receiver may have been dropped with its catalog
            let _ = tx.send(result);
        }
        count
    }

    /// Number of load requests waiting on [`MemoryScene::complete_loads`]
    pub fn pending_load_count(&self) -> usize {
        self.pending_loads.len()
    }

    /// Number of live nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn parent(&self, handle: ObjectHandle) -> Option<ObjectHandle> {
        self.nodes.get(&handle).and_then(|n| n.parent)
    }

    pub fn children(&self, handle: ObjectHandle) -> &[ObjectHandle] {
        self.nodes
            .get(&handle)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Shape of a procedural node
    pub fn shape(&self, handle: ObjectHandle) -> Option<Shape> {
        match self.nodes.get(&handle)?.kind {
            NodeKind::Shape(shape) => Some(shape),
            _ => None,
        }
    }

    /// Model a node was spawned from
    pub fn model_of(&self, handle: ObjectHandle) -> Option<ModelId> {
        match self.nodes.get(&handle)?.kind {
            NodeKind::Model(id) => Some(id),
            _ => None,
        }
    }

    /// Local-to-world matrix of a node
    pub fn world_matrix(&self, handle: ObjectHandle) -> Option<Mat4> {
        let mut node = self.nodes.get(&handle)?;
        let mut matrix = node.local.to_matrix();
        while let Some(parent) = node.parent {
            node = self.nodes.get(&parent)?;
            matrix = node.local.to_matrix() * matrix;
        }
        Some(matrix)
    }

    /// Frames drawn so far
    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Camera of the most recent frame
    pub fn last_camera(&self) -> Option<&CameraView> {
        self.last_camera.as_ref()
    }

    fn allocate(&mut self, node: Node) -> ObjectHandle {
        self.next_handle += 1;
        let handle = ObjectHandle::from_raw(self.next_handle);
        self.nodes.insert(handle, node);
        handle
    }

    fn resolve(&mut self, spec: &ModelSpec) -> Result<ModelId> {
        if let Some(id) = self.resolved.get(&spec.name) {
            return Ok(*id);
        }

        let asset = self
            .assets
            .get(&spec.name)
            .cloned()
            .ok_or_else(|| SceneError::LoadFailed {
                name: spec.name.clone(),
                reason: format!("no asset registered for {}", spec.source),
            })?;

        let id = ModelId(self.models.len() as u32);
        self.models.push(asset);
        self.resolved.insert(spec.name.clone(), id);
        Ok(id)
    }

    /// Matrix from `node` space into `ancestor` space, excluding the
    /// ancestor's own transform
    fn relative_matrix(&self, ancestor: ObjectHandle, node: ObjectHandle) -> Option<Mat4> {
        let mut matrix = Mat4::IDENTITY;
        let mut current = node;
        while current != ancestor {
            let n = self.nodes.get(&current)?;
            matrix = n.local.to_matrix() * matrix;
            current = n.parent?;
        }
        Some(matrix)
    }

    /// Parts under `handle` with their boxes
    fn parts_under(&self, handle: ObjectHandle) -> impl Iterator<Item = (ObjectHandle, Aabb)> + '_ {
        self.descendants(handle).into_iter().filter_map(move |h| {
            match self.nodes.get(&h)?.kind {
                NodeKind::Part(aabb) => Some((h, aabb)),
                _ => None,
            }
        })
    }

    fn is_ancestor(&self, ancestor: ObjectHandle, node: ObjectHandle) -> bool {
        let mut current = Some(node);
        while let Some(h) = current {
            if h == ancestor {
                return true;
            }
            current = self.nodes.get(&h).and_then(|n| n.parent);
        }
        false
    }

    fn node_mut(&mut self, handle: ObjectHandle) -> Result<&mut Node> {
        self.nodes
            .get_mut(&handle)
            .ok_or(SceneError::UnknownHandle(handle))
    }
}

impl SceneGraph for MemoryScene {
    fn spawn(&mut self, model: ModelId, transform: Transform) -> Result<ObjectHandle> {
        let parts = self
            .models
            .get(model.0 as usize)
            .map(|asset| asset.parts.clone())
            .ok_or(SceneError::UnknownModel(model))?;

        let root = self.allocate(Node::new(NodeKind::Model(model), transform));
        for aabb in parts {
            let mut part = Node::new(NodeKind::Part(aabb), Transform::IDENTITY);
            part.parent = Some(root);
            let handle = self.allocate(part);
            self.node_mut(root)?.children.push(handle);
        }

        log::trace!("Spawned {} as {}", model, root);
        Ok(root)
    }

    fn spawn_shape(&mut self, shape: Shape, transform: Transform) -> ObjectHandle {
        self.allocate(Node::new(NodeKind::Shape(shape), transform))
    }

    fn remove(&mut self, handle: ObjectHandle) -> bool {
        let Some(parent) = self.nodes.get(&handle).map(|n| n.parent) else {
            return false;
        };

        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.retain(|c| *c != handle);
        }

        for h in self.descendants(handle) {
            self.nodes.remove(&h);
        }
        true
    }

    fn attach_child(&mut self, parent: ObjectHandle, child: ObjectHandle) -> Result<()> {
        if !self.nodes.contains_key(&parent) {
            return Err(SceneError::UnknownHandle(parent));
        }
        if !self.nodes.contains_key(&child) {
            return Err(SceneError::UnknownHandle(child));
        }
        if self.is_ancestor(child, parent) {
            return Err(SceneError::Cycle { parent, child });
        }

        if let Some(old) = self.nodes.get(&child).and_then(|n| n.parent) {
            if let Some(old) = self.nodes.get_mut(&old) {
                old.children.retain(|c| *c != child);
            }
        }

        self.node_mut(parent)?.children.push(child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    fn detach_child(&mut self, parent: ObjectHandle, child: ObjectHandle) -> Result<()> {
        let current = self
            .nodes
            .get(&child)
            .ok_or(SceneError::UnknownHandle(child))?
            .parent;
        if current != Some(parent) {
            return Err(SceneError::NotAChild { parent, child });
        }

        self.node_mut(parent)?.children.retain(|c| *c != child);
        self.node_mut(child)?.parent = None;
        Ok(())
    }

    fn contains(&self, handle: ObjectHandle) -> bool {
        self.nodes.contains_key(&handle)
    }

    fn transform(&self, handle: ObjectHandle) -> Option<Transform> {
        self.nodes.get(&handle).map(|n| n.local)
    }

    fn set_transform(&mut self, handle: ObjectHandle, transform: Transform) -> Result<()> {
        self.node_mut(handle)?.local = transform;
        Ok(())
    }

    fn set_visible(&mut self, handle: ObjectHandle, visible: bool) -> Result<()> {
        self.node_mut(handle)?.visible = visible;
        Ok(())
    }

    fn is_visible(&self, handle: ObjectHandle) -> bool {
        let mut current = Some(handle);
        while let Some(h) = current {
            match self.nodes.get(&h) {
                Some(node) if node.visible => current = node.parent,
                _ => return false,
            }
        }
        true
    }

    fn world_bounds(&self, handle: ObjectHandle) -> Option<Aabb> {
        let bounds = self
            .parts_under(handle)
            .filter_map(|(h, aabb)| Some(aabb.transform(&self.world_matrix(h)?)))
            .fold(Aabb::EMPTY, |acc, b| acc.union(&b));
        bounds.is_valid().then_some(bounds)
    }

    fn local_bounds(&self, handle: ObjectHandle) -> Option<Aabb> {
        let bounds = self
            .parts_under(handle)
            .filter_map(|(h, aabb)| {
                Some(aabb.transform(&self.relative_matrix(handle, h)?))
            })
            .fold(Aabb::EMPTY, |acc, b| acc.union(&b));
        bounds.is_valid().then_some(bounds)
    }

    fn descendants(&self, handle: ObjectHandle) -> Vec<ObjectHandle> {
        if !self.nodes.contains_key(&handle) {
            return Vec::new();
        }

        let mut out = Vec::new();
        let mut stack = vec![handle];
        while let Some(h) = stack.pop() {
            out.push(h);
            if let Some(node) = self.nodes.get(&h) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    fn render(&mut self, camera: &CameraView) {
        self.frames_rendered += 1;
        self.last_camera = Some(*camera);
        log::trace!("Rendered frame {} with {} nodes", self.frames_rendered, self.nodes.len());
    }
}

impl Raycast for MemoryScene {
    fn intersect(&self, ray: &Ray, candidates: &[ObjectHandle], recursive: bool) -> Vec<RayHit> {
        if !ray.is_valid() {
            return Vec::new();
        }

        let mut visited = HashSet::new();
        let mut hits = Vec::new();

        for &candidate in candidates {
            let nodes = if recursive {
                self.descendants(candidate)
            } else {
                vec![candidate]
            };

            for h in nodes {
                if !visited.insert(h) || !self.is_visible(h) {
                    continue;
                }
                let Some(NodeKind::Part(aabb)) = self.nodes.get(&h).map(|n| &n.kind) else {
                    continue;
                };
                let Some(world) = self.world_matrix(h) else {
                    continue;
                };

                // Unnormalized local direction keeps t in world units
                let local_ray = ray.transform(&world.inverse());
                if let Some(distance) = ray_aabb(&local_ray, aabb) {
                    hits.push(RayHit { object: h, distance });
                }
            }
        }

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}

impl ModelLoader for MemoryScene {
    fn load(&mut self, spec: &ModelSpec) -> Receiver<Result<ModelId>> {
        let (tx, rx) = bounded(1);
        if self.deferred {
            self.pending_loads.push((spec.clone(), tx));
        } else {
            let result = self.resolve(spec);
            let _ = tx.send(result);
        }
        rx
    }
}
