//! Frame loop coordination
//!
//! Once per rendered frame: acquire the surface probe source (once, without
//! blocking), query it, move the placement reticle, count consecutive
//! detections, refresh the selection indicator and render.

use crossbeam_channel::{Receiver, TryRecvError};
use furnish_scene::{CameraView, ObjectHandle, SceneGraph, Shape, Transform};
use furnish_xr::{FrameTiming, Pose, SurfaceProbe, XrError};

use crate::config::{SurfaceConfig, TrackingLossPolicy};
use crate::registry::ObjectRegistry;
use crate::selection::SelectionController;
use crate::session::SessionAction;

/// Probe acquisition state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackingState {
    #[default]
    AwaitingSurfaceSource,
    Tracking,
}

/// Per-frame input from the host
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameInput {
    pub timing: FrameTiming,
    pub camera: CameraView,
}

impl FrameInput {
    pub fn new(timing: FrameTiming, camera: CameraView) -> Self {
        Self { timing, camera }
    }
}

/// What one frame produced, for status display and logging
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    pub tracking: TrackingState,
    pub reticle_visible: bool,
    /// Consecutive detections counted so far
    pub detection_count: u32,
    /// Detection count has reached the acquisition threshold
    pub surface_acquired: bool,
    /// Actions resolved during the frame (due long presses, stale selections)
    pub actions: Vec<SessionAction>,
}

/// Drives the surface probe and the per-frame scene updates
pub struct FrameCoordinator<Src> {
    state: TrackingState,
    source: Option<Src>,
    requested: bool,
    pending: Option<Receiver<Result<Src, XrError>>>,
    reticle: ObjectHandle,
    reticle_pose: Option<Pose>,
    detections: u32,
    acquired: bool,
    config: SurfaceConfig,
}

impl<Src> FrameCoordinator<Src> {
    /// Spawn the (hidden) reticle
    pub fn new<S: SceneGraph + ?Sized>(scene: &mut S, config: SurfaceConfig) -> Self {
        let ring = Shape::Ring {
            inner_radius: config.reticle_inner_radius,
            outer_radius: config.reticle_outer_radius,
        };
        let reticle = scene.spawn_shape(ring, Transform::IDENTITY);
        if let Err(e) = scene.set_visible(reticle, false) {
            log::warn!("Could not hide reticle: {}", e);
        }

        Self {
            state: TrackingState::AwaitingSurfaceSource,
            source: None,
            requested: false,
            pending: None,
            reticle,
            reticle_pose: None,
            detections: 0,
            acquired: false,
            config,
        }
    }

    pub fn state(&self) -> TrackingState {
        self.state
    }

    /// Scene node of the reticle
    pub fn reticle(&self) -> ObjectHandle {
        self.reticle
    }

    /// Surface pose of the most recent frame, if one was found
    pub fn reticle_pose(&self) -> Option<Pose> {
        self.reticle_pose
    }

    pub fn detection_count(&self) -> u32 {
        self.detections
    }

    pub fn surface_acquired(&self) -> bool {
        self.acquired
    }

    /// Whether a source request has been made and not yet cleared
    pub fn source_requested(&self) -> bool {
        self.requested
    }

    /// Run one frame
    pub fn run<S, P>(
        &mut self,
        scene: &mut S,
        probe: &mut P,
        selection: &mut SelectionController,
        registry: &ObjectRegistry,
        input: &FrameInput,
    ) -> FrameReport
    where
        S: SceneGraph + ?Sized,
        P: SurfaceProbe<Source = Src> + ?Sized,
    {
        self.acquire(probe);
        self.track(scene, probe, &input.timing);

        let mut actions = Vec::new();
        if let Some(dropped) = selection.refresh(scene, registry) {
            actions.push(SessionAction::Deselected(dropped));
        }

        scene.render(&input.camera);

        FrameReport {
            tracking: self.state,
            reticle_visible: self.reticle_pose.is_some(),
            detection_count: self.detections,
            surface_acquired: self.acquired,
            actions,
        }
    }

    /// Forget the probe source so the next session requests a fresh one
    pub fn end_session<S, P>(&mut self, scene: &mut S, probe: &mut P)
    where
        S: SceneGraph + ?Sized,
        P: SurfaceProbe<Source = Src> + ?Sized,
    {
        if self.source.is_some() || self.pending.is_some() {
            probe.release_source();
        }
        self.source = None;
        self.pending = None;
        self.requested = false;
        self.state = TrackingState::AwaitingSurfaceSource;
        self.detections = 0;
        self.acquired = false;
        self.hide_reticle(scene);
    }

    fn acquire<P>(&mut self, probe: &mut P)
    where
        P: SurfaceProbe<Source = Src> + ?Sized,
    {
        if self.source.is_some() {
            return;
        }
        if !self.requested {
            log::debug!("Requesting surface probe source");
            self.pending = Some(probe.request_source());
            self.requested = true;
        }

        let Some(pending) = &self.pending else {
            return;
        };
        let result = match pending.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => Err(XrError::RequestDropped),
        };
        self.pending = None;

        match result {
            Ok(source) => {
                log::info!("Surface probe source acquired");
                self.source = Some(source);
                self.state = TrackingState::Tracking;
            }
            Err(e) => {
                // Clear the guard so a later frame asks again
                log::warn!("Surface probe source failed: {}", e);
                self.requested = false;
            }
        }
    }

    fn track<S, P>(&mut self, scene: &mut S, probe: &mut P, timing: &FrameTiming)
    where
        S: SceneGraph + ?Sized,
        P: SurfaceProbe<Source = Src> + ?Sized,
    {
        let Some(source) = &self.source else {
            return;
        };

        match probe.query(source, timing) {
            Some(pose) => {
                let transform = Transform::from_position_rotation(pose.position, pose.orientation);
                if let Err(e) = scene
                    .set_transform(self.reticle, transform)
                    .and_then(|_| scene.set_visible(self.reticle, true))
                {
                    log::warn!("Could not move reticle: {}", e);
                }
                self.reticle_pose = Some(pose);
                self.detections = self.detections.saturating_add(1);
            }
            None => {
                self.hide_reticle(scene);
                if self.config.on_tracking_loss == TrackingLossPolicy::Reset {
                    self.detections = 0;
                }
            }
        }

        let acquired = self.detections >= self.config.acquired_after_frames;
        if acquired != self.acquired {
            if acquired {
                log::info!("Surface acquired after {} detections", self.detections);
            } else {
                log::info!("Surface lost");
            }
            self.acquired = acquired;
        }
    }

    fn hide_reticle<S: SceneGraph + ?Sized>(&mut self, scene: &mut S) {
        self.reticle_pose = None;
        if let Err(e) = scene.set_visible(self.reticle, false) {
            log::warn!("Could not hide reticle: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use furnish_scene::MemoryScene;
    use furnish_xr::ScriptedSurfaceProbe;
    use glam::Vec3;
    use std::time::Duration;

    use crate::config::SelectionConfig;

    struct Fixture {
        scene: MemoryScene,
        probe: ScriptedSurfaceProbe,
        selection: SelectionController,
        registry: ObjectRegistry,
        frames: FrameCoordinator<furnish_xr::ScriptedSource>,
        index: u64,
    }

    impl Fixture {
        fn new(probe: ScriptedSurfaceProbe, config: SurfaceConfig) -> Self {
            let mut scene = MemoryScene::new();
            let selection = SelectionController::new(&mut scene, SelectionConfig::default());
            let frames = FrameCoordinator::new(&mut scene, config);
            Self {
                scene,
                probe,
                selection,
                registry: ObjectRegistry::new(),
                frames,
                index: 0,
            }
        }

        fn frame(&mut self) -> FrameReport {
            self.index += 1;
            let input = FrameInput::new(
                FrameTiming::at(self.index, Duration::from_millis(self.index * 16), 0.016),
                CameraView::default(),
            );
            self.frames.run(
                &mut self.scene,
                &mut self.probe,
                &mut self.selection,
                &self.registry,
                &input,
            )
        }
    }

    fn floor() -> Pose {
        Pose::from_position(Vec3::new(0.0, -1.2, -1.0))
    }

    #[test]
    fn test_source_requested_once() {
        let mut fx = Fixture::new(ScriptedSurfaceProbe::new(), SurfaceConfig::default());
        fx.probe.set_pose(floor());

        for _ in 0..5 {
            let report = fx.frame();
            assert_eq!(report.tracking, TrackingState::AwaitingSurfaceSource);
            assert!(!report.reticle_visible);
        }
        assert_eq!(fx.probe.request_count(), 1);
        assert_eq!(fx.probe.query_count(), 0);

        fx.probe.resolve_pending();
        let report = fx.frame();
        assert_eq!(report.tracking, TrackingState::Tracking);
        assert!(report.reticle_visible);
        assert_eq!(fx.frames.reticle_pose(), Some(floor()));
        assert!(fx.scene.is_visible(fx.frames.reticle()));
    }

    #[test]
    fn test_failed_request_is_retried() {
        let mut fx = Fixture::new(ScriptedSurfaceProbe::new(), SurfaceConfig::default());
        fx.frame();
        fx.probe.fail_pending("no hit-test support");
        fx.frame();
        assert!(!fx.frames.source_requested());

        fx.frame();
        assert_eq!(fx.probe.request_count(), 2);
    }

    #[test]
    fn test_detection_counter_pauses_on_loss() {
        let config = SurfaceConfig {
            acquired_after_frames: 3,
            ..SurfaceConfig::default()
        };
        let mut fx = Fixture::new(ScriptedSurfaceProbe::immediate(), config);

        fx.probe.set_pose(floor());
        fx.frame();
        fx.frame();
        fx.probe.clear_pose();
        let lost = fx.frame();
        assert!(!lost.reticle_visible);
        assert_eq!(lost.detection_count, 2);
        assert!(!fx.scene.is_visible(fx.frames.reticle()));

        fx.probe.set_pose(floor());
        let report = fx.frame();
        assert_eq!(report.detection_count, 3);
        assert!(report.surface_acquired);
    }

    #[test]
    fn test_detection_counter_resets_on_loss() {
        let config = SurfaceConfig {
            acquired_after_frames: 3,
            on_tracking_loss: TrackingLossPolicy::Reset,
            ..SurfaceConfig::default()
        };
        let mut fx = Fixture::new(ScriptedSurfaceProbe::immediate(), config);

        fx.probe.set_pose(floor());
        fx.frame();
        fx.frame();
        fx.probe.clear_pose();
        assert_eq!(fx.frame().detection_count, 0);

        fx.probe.set_pose(floor());
        let report = fx.frame();
        assert_eq!(report.detection_count, 1);
        assert!(!report.surface_acquired);
    }

    #[test]
    fn test_end_session_clears_source_and_guard() {
        let mut fx = Fixture::new(ScriptedSurfaceProbe::immediate(), SurfaceConfig::default());
        fx.probe.set_pose(floor());
        fx.frame();
        assert_eq!(fx.frames.state(), TrackingState::Tracking);

        fx.frames.end_session(&mut fx.scene, &mut fx.probe);
        assert_eq!(fx.frames.state(), TrackingState::AwaitingSurfaceSource);
        assert!(!fx.frames.source_requested());
        assert_eq!(fx.frames.reticle_pose(), None);

        fx.frame();
        assert_eq!(fx.probe.request_count(), 2);
    }

    #[test]
    fn test_every_frame_renders() {
        let mut fx = Fixture::new(ScriptedSurfaceProbe::new(), SurfaceConfig::default());
        fx.frame();
        fx.frame();
        assert_eq!(fx.scene.frames_rendered(), 2);
    }
}
