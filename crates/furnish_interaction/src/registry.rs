//! Placed objects and the ownership index used for picking

use std::collections::HashMap;
use std::fmt;

use furnish_scene::{ModelId, ObjectHandle, Ray, RayHit, Raycast, SceneGraph, Transform};
use furnish_xr::Pose;
use glam::{Quat, Vec3};

/// Registry-issued identifier of a placed object
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(u64);

impl ObjectId {
    pub const fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "object {}", self.0)
    }
}

/// A furniture instance placed by the user
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedObject {
    pub id: ObjectId,
    /// Scene node of the model root
    pub handle: ObjectHandle,
    pub model: ModelId,
    /// Surface pose the object was placed at
    pub pose: Pose,
    /// Rotation about the surface normal, applied on top of `pose`
    pub yaw: f32,
    /// Per-model scale factor
    pub scale: Vec3,
}

impl PlacedObject {
    pub fn orientation(&self) -> Quat {
        self.pose.orientation * Quat::from_rotation_y(self.yaw)
    }

    pub fn position(&self) -> Vec3 {
        self.pose.position
    }

    /// Scene transform of the model root
    pub fn transform(&self) -> Transform {
        Transform::new(self.pose.position, self.orientation(), self.scale)
    }
}

/// Placed objects in placement order.
///
/// Every scene node below a placed object maps back to that object, so a
/// ray hit on any sub-part resolves to exactly one top-level entry.
#[derive(Debug, Default)]
pub struct ObjectRegistry {
    objects: Vec<PlacedObject>,
    owners: HashMap<ObjectHandle, ObjectId>,
    next_id: u64,
}

impl ObjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly spawned model root
    pub fn insert<S: SceneGraph + ?Sized>(
        &mut self,
        scene: &S,
        handle: ObjectHandle,
        model: ModelId,
        pose: Pose,
        scale: Vec3,
    ) -> ObjectId {
        self.next_id += 1;
        let id = ObjectId(self.next_id);

        for node in scene.descendants(handle) {
            self.owners.insert(node, id);
        }

        self.objects.push(PlacedObject {
            id,
            handle,
            model,
            pose,
            yaw: 0.0,
            scale,
        });
        id
    }

    /// Remove an object from the registry and the scene
    pub fn remove<S: SceneGraph + ?Sized>(&mut self, scene: &mut S, id: ObjectId) -> Option<PlacedObject> {
        let position = self.objects.iter().position(|o| o.id == id)?;
        let object = self.objects.remove(position);

        self.owners.retain(|_, owner| *owner != id);
        if !scene.remove(object.handle) {
            log::warn!("{} was already gone from the scene", id);
        }
        Some(object)
    }

    /// Remove every object
    pub fn clear<S: SceneGraph + ?Sized>(&mut self, scene: &mut S) {
        for object in self.objects.drain(..) {
            scene.remove(object.handle);
        }
        self.owners.clear();
    }

    pub fn get(&self, id: ObjectId) -> Option<&PlacedObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut PlacedObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Objects in placement order
    pub fn iter(&self) -> impl Iterator<Item = &PlacedObject> {
        self.objects.iter()
    }

    /// Root handles of every object, the candidate set for raycasts
    pub fn handles(&self) -> Vec<ObjectHandle> {
        self.objects.iter().map(|o| o.handle).collect()
    }

    /// Owner of a scene node, if it belongs to a placed object
    pub fn owner_of(&self, handle: ObjectHandle) -> Option<ObjectId> {
        self.owners.get(&handle).copied()
    }

    /// First hit (nearest first) that belongs to a placed object
    pub fn resolve_hits(&self, hits: &[RayHit]) -> Option<ObjectId> {
        hits.iter().find_map(|hit| self.owner_of(hit.object))
    }

    /// Frontmost placed object along `ray`
    pub fn pick<R: Raycast + ?Sized>(&self, raycaster: &R, ray: &Ray) -> Option<ObjectId> {
        if self.objects.is_empty() {
            return None;
        }
        let hits = raycaster.intersect(ray, &self.handles(), true);
        self.resolve_hits(&hits)
    }

    /// Set an object's yaw and push the new transform to the scene
    pub fn set_yaw<S: SceneGraph + ?Sized>(&mut self, scene: &mut S, id: ObjectId, yaw: f32) -> bool {
        let Some(object) = self.get_mut(id) else {
            return false;
        };
        object.yaw = yaw;
        let (handle, transform) = (object.handle, object.transform());

        match scene.set_transform(handle, transform) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Failed to rotate {}: {}", id, e);
                false
            }
        }
    }
}
