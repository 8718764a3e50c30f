//! AR session context
//!
//! [`ArSession`] owns everything that lives for one AR session: the input
//! normalizer, gesture disambiguator, object registry, selection, frame
//! coordinator and model catalog, along with the scene and probe
//! collaborators. Input is dispatched through [`ArSession::handle_input`];
//! the host calls [`ArSession::frame`] once per rendered frame.

use furnish_input::{InputNormalizer, RawInput};
use furnish_scene::{CameraView, ModelCatalog, ModelLoader, Raycast, SceneGraph, Transform};
use furnish_xr::{SessionState, SurfaceProbe};
use glam::Vec2;

use crate::config::InteractionConfig;
use crate::frame::{FrameCoordinator, FrameInput, FrameReport, TrackingState};
use crate::gesture::{GestureContext, GestureDisambiguator, GestureOutcome, GestureState};
use crate::registry::{ObjectId, ObjectRegistry, PlacedObject};
use crate::selection::SelectionController;

/// A change to the placed objects or the selection
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionAction {
    /// New object placed and selected
    Placed {
        id: ObjectId,
        model_index: usize,
        /// Selection it replaced
        replaced: Option<ObjectId>,
    },
    Selected {
        id: ObjectId,
        replaced: Option<ObjectId>,
    },
    Deselected(ObjectId),
    /// Selected object removed from the scene
    Deleted(ObjectId),
    /// New absolute yaw of the selected object
    Rotated { id: ObjectId, yaw: f32 },
}

/// State of one AR session
pub struct ArSession<S, P: SurfaceProbe> {
    config: InteractionConfig,
    scene: S,
    probe: P,
    input: InputNormalizer,
    gestures: GestureDisambiguator,
    registry: ObjectRegistry,
    selection: SelectionController,
    frames: FrameCoordinator<P::Source>,
    catalog: ModelCatalog,
    camera: CameraView,
    model_index: usize,
    state: SessionState,
}

impl<S, P> ArSession<S, P>
where
    S: SceneGraph + Raycast,
    P: SurfaceProbe,
{
    /// Start a session, resolving the catalog through `loader`
    pub fn new<L: ModelLoader + ?Sized>(config: InteractionConfig, scene: S, probe: P, loader: &mut L) -> Self {
        let mut session = Self::build(config, scene, probe);
        session.catalog.request_all(loader);
        session
    }

    fn build(config: InteractionConfig, mut scene: S, probe: P) -> Self {
        let selection = SelectionController::new(&mut scene, config.selection.clone());
        let frames = FrameCoordinator::new(&mut scene, config.surface.clone());
        let camera = CameraView::default();

        log::info!("AR session started with {} models", config.models.len());
        Self {
            input: InputNormalizer::new(camera.center()),
            gestures: GestureDisambiguator::new(config.gesture.clone()),
            registry: ObjectRegistry::new(),
            catalog: ModelCatalog::new(config.models.iter().cloned()),
            selection,
            frames,
            camera,
            config,
            scene,
            probe,
            model_index: 0,
            state: SessionState::Running,
        }
    }

    /// Dispatch one raw input event
    pub fn handle_input(&mut self, raw: RawInput) -> Option<SessionAction> {
        if self.state != SessionState::Running {
            return None;
        }
        let event = self.input.normalize(&raw)?;
        let ctx = self.gesture_context();
        let outcome = self.gestures.handle(&event, &ctx);
        self.resolve(outcome)
    }

    /// Run one frame
    pub fn frame(&mut self, input: FrameInput) -> FrameReport {
        if self.state != SessionState::Running {
            return FrameReport::default();
        }

        self.camera = input.camera;
        self.input.set_select_point(input.camera.center());

        let ctx = self.gesture_context();
        let outcome = self.gestures.tick(input.timing.time, &ctx);
        let due = self.resolve(outcome);

        self.catalog.poll();

        let mut report = self.frames.run(
            &mut self.scene,
            &mut self.probe,
            &mut self.selection,
            &self.registry,
            &input,
        );
        if let Some(action) = due {
            report.actions.insert(0, action);
        }
        report
    }

    /// Switch the model placed by the next double tap. Drops any selection.
    pub fn choose_model(&mut self, index: usize) -> Option<SessionAction> {
        if index >= self.catalog.len() {
            log::warn!("No model at index {}", index);
            return None;
        }
        self.model_index = index;
        if let Some(entry) = self.catalog.get(index) {
            log::info!("Placing '{}' next", entry.spec.name);
        }
        self.deselect()
    }

    /// End the session: drop the probe source, the selection and any
    /// in-flight gesture
    pub fn end_session(&mut self) -> Option<SessionAction> {
        if self.state != SessionState::Running {
            return None;
        }
        self.frames.end_session(&mut self.scene, &mut self.probe);
        let action = self.deselect();
        self.gestures.reset();
        self.input.reset();
        self.state = SessionState::Ended;
        log::info!("AR session ended with {} objects placed", self.registry.len());
        action
    }

    /// Resume after [`ArSession::end_session`]; the next frame requests a
    /// new probe source
    pub fn restart(&mut self) {
        if self.state == SessionState::Ended {
            log::info!("AR session restarted");
            self.state = SessionState::Running;
        }
    }

    pub fn registry(&self) -> &ObjectRegistry {
        &self.registry
    }

    pub fn selected(&self) -> Option<&PlacedObject> {
        self.selection.selected().and_then(|id| self.registry.get(id))
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }

    pub fn probe_mut(&mut self) -> &mut P {
        &mut self.probe
    }

    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    pub fn gesture_state(&self) -> &GestureState {
        self.gestures.state()
    }

    pub fn tracking_state(&self) -> TrackingState {
        self.frames.state()
    }

    pub fn camera(&self) -> &CameraView {
        &self.camera
    }

    pub fn model_index(&self) -> usize {
        self.model_index
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    fn gesture_context(&self) -> GestureContext {
        GestureContext {
            selected_yaw: self.selected().map(|o| o.yaw),
        }
    }

    fn resolve(&mut self, outcome: GestureOutcome) -> Option<SessionAction> {
        match outcome {
            GestureOutcome::LongPress { point } => self.long_press(point),
            GestureOutcome::DoubleTap { .. } => self.place(),
            GestureOutcome::Rotate { yaw } => {
                let id = self.selection.selected()?;
                self.registry
                    .set_yaw(&mut self.scene, id, yaw)
                    .then_some(SessionAction::Rotated { id, yaw })
            }
            GestureOutcome::Tap => {
                log::debug!("Single tap; waiting for a second");
                None
            }
            GestureOutcome::Cancelled => {
                log::debug!("Press dropped");
                None
            }
            GestureOutcome::RotationStarted | GestureOutcome::RotationEnded | GestureOutcome::None => None,
        }
    }

    fn long_press(&mut self, point: Vec2) -> Option<SessionAction> {
        let ray = self.camera.screen_ray(point);

        match self.registry.pick(&self.scene, &ray) {
            Some(id) if self.selection.is_selected(id) => {
                self.selection.deselect(&mut self.scene, &self.registry);
                self.registry.remove(&mut self.scene, id)?;
                log::info!("Deleted {}", id);
                Some(SessionAction::Deleted(id))
            }
            Some(id) => {
                let change = self.selection.select(&mut self.scene, &self.registry, id);
                change.selected.map(|id| SessionAction::Selected {
                    id,
                    replaced: change.deselected,
                })
            }
            None => {
                if self.selection.within_tolerance(&self.registry, &self.camera, point) {
                    log::debug!("Long press near the selection; keeping it");
                    return None;
                }
                self.deselect()
            }
        }
    }

    fn place(&mut self) -> Option<SessionAction> {
        let Some(pose) = self.frames.reticle_pose() else {
            log::debug!("Double tap with no surface under the reticle");
            return None;
        };
        let Some((model, scale)) = self.catalog.ready(self.model_index) else {
            log::info!("Model {} is not ready yet", self.model_index);
            return None;
        };

        let transform = Transform::new(pose.position, pose.orientation, scale);
        let handle = match self.scene.spawn(model, transform) {
            Ok(handle) => handle,
            Err(e) => {
                log::warn!("Failed to place model {}: {}", self.model_index, e);
                return None;
            }
        };

        let id = self.registry.insert(&self.scene, handle, model, pose, scale);
        log::info!("Placed {} at {:?}", id, pose.position);

        let change = self.selection.select(&mut self.scene, &self.registry, id);
        Some(SessionAction::Placed {
            id,
            model_index: self.model_index,
            replaced: change.deselected,
        })
    }

    fn deselect(&mut self) -> Option<SessionAction> {
        self.selection
            .deselect(&mut self.scene, &self.registry)
            .map(SessionAction::Deselected)
    }
}

impl<S, P> ArSession<S, P>
where
    S: SceneGraph + Raycast + ModelLoader,
    P: SurfaceProbe,
{
    /// Start a session whose scene also resolves the models
    pub fn with_scene_loader(config: InteractionConfig, scene: S, probe: P) -> Self {
        let mut session = Self::build(config, scene, probe);
        session.catalog.request_all(&mut session.scene);
        session
    }
}
