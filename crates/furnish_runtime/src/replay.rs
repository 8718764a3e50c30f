//! Script replay over a headless session

use std::time::Duration;

use furnish_interaction::prelude::*;
use furnish_scene::{MemoryScene, ModelAsset};
use furnish_xr::ScriptedSurfaceProbe;
use glam::Vec3;

use crate::script::{Script, Step};

/// Frame interval of the replay clock
pub const FRAME_MS: u64 = 16;

/// Counts gathered over a replay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub frames: u64,
    pub placed: usize,
    pub deleted: usize,
    pub rotations: usize,
    /// Objects still in the scene
    pub remaining: usize,
}

/// Drives an [`ArSession`] from a [`Script`]
pub struct Replay {
    session: ArSession<MemoryScene, ScriptedSurfaceProbe>,
    camera: CameraView,
    now: u64,
    frame_index: u64,
    last_report: FrameReport,
    actions: Vec<SessionAction>,
}

impl Replay {
    pub fn new(config: InteractionConfig, script: &Script) -> Self {
        let mut scene = MemoryScene::new();
        let size = Vec3::from(script.model_size);
        for model in &config.models {
            scene.register_asset(model.name.clone(), ModelAsset::boxed(size));
        }

        let mut probe = ScriptedSurfaceProbe::immediate();
        probe.set_pose(Pose::from_position(Vec3::from(script.floor)));

        Self {
            session: ArSession::with_scene_loader(config, scene, probe),
            camera: script.camera.view(),
            now: 0,
            frame_index: 0,
            last_report: FrameReport::default(),
            actions: Vec::new(),
        }
    }

    pub fn run(&mut self, steps: &[Step]) {
        for step in steps {
            self.step(step);
        }
    }

    pub fn step(&mut self, step: &Step) {
        if let Some(raw) = step.raw(self.now) {
            if let Some(action) = self.session.handle_input(raw) {
                self.record(action);
            }
            return;
        }

        match *step {
            Step::Wait { ms } => self.advance(ms),
            Step::Floor { x, y, z } => {
                log::info!("Floor moved to ({}, {}, {})", x, y, z);
                self.session
                    .probe_mut()
                    .set_pose(Pose::from_position(Vec3::new(x, y, z)));
            }
            Step::LoseFloor => {
                log::info!("Floor out of view");
                self.session.probe_mut().clear_pose();
            }
            Step::Choose { model } => {
                if let Some(action) = self.session.choose_model(model) {
                    self.record(action);
                }
            }
            Step::End => {
                if let Some(action) = self.session.end_session() {
                    self.record(action);
                }
            }
            Step::Restart => self.session.restart(),
            _ => {}
        }
    }

    /// Run frames until `ms` have passed
    pub fn advance(&mut self, ms: u64) {
        let end = self.now + ms;
        while self.now < end {
            self.now = (self.now + FRAME_MS).min(end);
            self.frame();
        }
    }

    fn frame(&mut self) {
        self.frame_index += 1;
        let timing = FrameTiming::at(
            self.frame_index,
            Duration::from_millis(self.now),
            FRAME_MS as f32 / 1000.0,
        );
        let report = self.session.frame(FrameInput::new(timing, self.camera));

        if report.tracking != self.last_report.tracking {
            log::info!("Tracking: {:?}", report.tracking);
        }
        if report.reticle_visible != self.last_report.reticle_visible {
            log::info!("Reticle {}", if report.reticle_visible { "shown" } else { "hidden" });
        }
        if report.surface_acquired != self.last_report.surface_acquired {
            log::info!(
                "Surface {} after {} detections",
                if report.surface_acquired { "acquired" } else { "lost" },
                report.detection_count
            );
        }

        for action in report.actions.iter().copied() {
            self.record(action);
        }
        self.last_report = report;
    }

    fn record(&mut self, action: SessionAction) {
        let at = self.now;
        match action {
            SessionAction::Placed { id, model_index, replaced } => {
                let name = self
                    .session
                    .catalog()
                    .get(model_index)
                    .map(|entry| entry.spec.name.as_str())
                    .unwrap_or("?");
                match replaced {
                    Some(previous) => log::info!("[{}ms] placed {} ({}), replacing {}", at, id, name, previous),
                    None => log::info!("[{}ms] placed {} ({})", at, id, name),
                }
            }
            SessionAction::Selected { id, replaced } => match replaced {
                Some(previous) => log::info!("[{}ms] selected {}, replacing {}", at, id, previous),
                None => log::info!("[{}ms] selected {}", at, id),
            },
            SessionAction::Deselected(id) => log::info!("[{}ms] deselected {}", at, id),
            SessionAction::Deleted(id) => log::info!("[{}ms] deleted {}", at, id),
            SessionAction::Rotated { id, yaw } => log::debug!("[{}ms] {} yaw {:.3}", at, id, yaw),
        }
        self.actions.push(action);
    }

    /// Every action resolved so far, in order
    pub fn actions(&self) -> &[SessionAction] {
        &self.actions
    }

    pub fn session(&self) -> &ArSession<MemoryScene, ScriptedSurfaceProbe> {
        &self.session
    }

    pub fn summary(&self) -> Summary {
        let count = |f: fn(&SessionAction) -> bool| self.actions.iter().filter(|a| f(a)).count();
        Summary {
            frames: self.frame_index,
            placed: count(|a| matches!(a, SessionAction::Placed { .. })),
            deleted: count(|a| matches!(a, SessionAction::Deleted(_))),
            rotations: count(|a| matches!(a, SessionAction::Rotated { .. })),
            remaining: self.session.registry().len(),
        }
    }
}
