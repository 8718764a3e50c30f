//! Selection controller
//!
//! Holds at most one selected object and keeps its visual feedback in sync:
//! a ring indicator at the object's base, sized from its world bounds, and
//! an optional three-segment dimension overlay attached to the object node.

use furnish_scene::{CameraView, ObjectHandle, SceneGraph, Shape, Transform};
use glam::{Vec2, Vec3};

use crate::config::SelectionConfig;
use crate::registry::{ObjectId, ObjectRegistry};

/// Result of a [`SelectionController::select`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectionChange {
    /// Object that lost the selection
    pub deselected: Option<ObjectId>,
    /// Object that gained it
    pub selected: Option<ObjectId>,
}

impl SelectionChange {
    pub fn is_empty(&self) -> bool {
        self.deselected.is_none() && self.selected.is_none()
    }
}

/// Exclusive single selection with indicator and overlay.
#[derive(Debug)]
pub struct SelectionController {
    selected: Option<ObjectId>,
    indicator: ObjectHandle,
    indicator_radius: f32,
    overlay: Vec<ObjectHandle>,
    config: SelectionConfig,
}

impl SelectionController {
    /// Spawn the (hidden) indicator ring
    pub fn new<S: SceneGraph + ?Sized>(scene: &mut S, config: SelectionConfig) -> Self {
        let ring = Shape::Ring {
            inner_radius: config.indicator_ring_ratio,
            outer_radius: 1.0,
        };
        let indicator = scene.spawn_shape(ring, Transform::IDENTITY);
        if let Err(e) = scene.set_visible(indicator, false) {
            log::warn!("Could not hide selection indicator: {}", e);
        }

        Self {
            selected: None,
            indicator,
            indicator_radius: 0.0,
            overlay: Vec::new(),
            config,
        }
    }

    pub fn selected(&self) -> Option<ObjectId> {
        self.selected
    }

    pub fn is_selected(&self, id: ObjectId) -> bool {
        self.selected == Some(id)
    }

    /// Scene node of the indicator ring
    pub fn indicator(&self) -> ObjectHandle {
        self.indicator
    }

    /// World radius of the indicator for the current selection
    pub fn indicator_radius(&self) -> f32 {
        self.indicator_radius
    }

    /// Dimension overlay segments attached to the current selection
    pub fn overlay(&self) -> &[ObjectHandle] {
        &self.overlay
    }

    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    /// Select `id`, deselecting any previous selection first
    pub fn select<S: SceneGraph + ?Sized>(
        &mut self,
        scene: &mut S,
        registry: &ObjectRegistry,
        id: ObjectId,
    ) -> SelectionChange {
        if self.selected == Some(id) {
            return SelectionChange::default();
        }
        let Some(object) = registry.get(id) else {
            log::warn!("Ignoring selection of unknown {}", id);
            return SelectionChange::default();
        };

        let deselected = self.deselect(scene, registry);

        self.indicator_radius = match scene.world_bounds(object.handle) {
            Some(bounds) => {
                let size = bounds.size();
                size.x.max(size.z) * self.config.indicator_radius_factor
            }
            None => {
                log::warn!("{} has no bounds; using a unit indicator", id);
                self.config.indicator_radius_factor
            }
        };

        let transform = Transform::new(
            object.position(),
            object.orientation(),
            Vec3::splat(self.indicator_radius),
        );
        if let Err(e) = scene
            .set_transform(self.indicator, transform)
            .and_then(|_| scene.set_visible(self.indicator, true))
        {
            log::warn!("Could not show selection indicator: {}", e);
        }

        if self.config.dimension_overlay {
            self.attach_overlay(scene, object.handle);
        }

        self.selected = Some(id);
        log::info!("Selected {}", id);
        SelectionChange {
            deselected,
            selected: Some(id),
        }
    }

    /// Clear the selection. Returns the object that was selected, if any.
    pub fn deselect<S: SceneGraph + ?Sized>(
        &mut self,
        scene: &mut S,
        registry: &ObjectRegistry,
    ) -> Option<ObjectId> {
        let previous = self.selected.take()?;

        let owner = registry
            .get(previous)
            .map(|o| o.handle)
            .filter(|handle| scene.contains(*handle));

        for segment in self.overlay.drain(..) {
            if let Some(handle) = owner {
                if let Err(e) = scene.detach_child(handle, segment) {
                    log::warn!("Could not detach dimension overlay: {}", e);
                }
            }
            scene.remove(segment);
        }

        if owner.is_none() {
            log::debug!("Deselecting {} which no longer exists", previous);
        }

        if let Err(e) = scene.set_visible(self.indicator, false) {
            log::warn!("Could not hide selection indicator: {}", e);
        }
        self.indicator_radius = 0.0;

        log::info!("Deselected {}", previous);
        Some(previous)
    }

    /// Move the indicator onto the selected object. Runs every frame.
    ///
    /// Returns the selection dropped because its object disappeared.
    pub fn refresh<S: SceneGraph + ?Sized>(
        &mut self,
        scene: &mut S,
        registry: &ObjectRegistry,
    ) -> Option<ObjectId> {
        let id = self.selected?;
        let Some(object) = registry.get(id) else {
            return self.deselect(scene, registry);
        };

        let transform = Transform::new(
            object.position(),
            object.orientation(),
            Vec3::splat(self.indicator_radius),
        );
        if let Err(e) = scene.set_transform(self.indicator, transform) {
            log::warn!("Could not move selection indicator: {}", e);
        }
        None
    }

    /// Whether `point` lies within the near-miss radius of the selected
    /// object's projected screen position
    pub fn within_tolerance(
        &self,
        registry: &ObjectRegistry,
        camera: &CameraView,
        point: Vec2,
    ) -> bool {
        let Some(radius) = self.config.proximity_radius() else {
            return false;
        };
        self.selected
            .and_then(|id| registry.get(id))
            .and_then(|object| camera.project_to_screen(object.position()))
            .is_some_and(|screen| screen.distance(point) < radius)
    }

    fn attach_overlay<S: SceneGraph + ?Sized>(&mut self, scene: &mut S, handle: ObjectHandle) {
        let Some(bounds) = scene.local_bounds(handle) else {
            return;
        };
        let (min, max) = (bounds.min, bounds.max);
        let axes = [
            Vec3::new(max.x, min.y, min.z),
            Vec3::new(min.x, max.y, min.z),
            Vec3::new(min.x, min.y, max.z),
        ];

        for to in axes {
            let segment = scene.spawn_shape(Shape::Segment { from: min, to }, Transform::IDENTITY);
            match scene.attach_child(handle, segment) {
                Ok(()) => self.overlay.push(segment),
                Err(e) => {
                    log::warn!("Could not attach dimension overlay: {}", e);
                    scene.remove(segment);
                }
            }
        }
    }
}
